//! Crate-wide error aliases and the tagging used to classify command failures.

use serde::{Deserialize, Serialize};
use std::process::ExitCode;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad class of a failure that is reported to the user. Attached to an error as context by
/// [`IntoResult::pub_result`] so that `main` can recover it with `downcast_ref`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or `config.json` is missing or invalid.
    Config,
    /// A command needs a logged-in student and there is none.
    Session,
    /// A read or write against the local store failed.
    Database,
    /// The arguments were understood but cannot be satisfied, e.g. an unknown id.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

impl ErrorType {
    /// The process exit code used when a command fails with this type of error.
    pub fn exit_code(self) -> ExitCode {
        match self {
            ErrorType::Config => ExitCode::from(2),
            ErrorType::Session => ExitCode::from(3),
            ErrorType::Database => ExitCode::from(4),
            ErrorType::Request => ExitCode::from(5),
        }
    }
}

/// Tags an error with an [`ErrorType`] before it leaves the public command API.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

/// Finds the [`ErrorType`] tag, if any, in the error's context chain.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}
