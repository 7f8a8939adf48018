//! Command handlers for the campus CLI.
//!
//! This module contains implementations for all CLI subcommands. Every handler returns an
//! [`Out`] so that the outcome can be printed consistently by `main` and inspected by tests.

mod attendance;
mod chat;
mod grade;
mod init;
mod login;
mod render;
mod report;
mod schedule;
mod transaction;

use crate::config::Session;
use crate::db::Db;
use crate::error::{ErrorType, IntoResult};
use crate::repo::{Entity, ListParams, Repository};
use crate::{Config, Result};
use anyhow::anyhow;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use attendance::{attendance_add, attendance_delete, attendance_list};
pub use chat::{chat, chat_history};
pub use grade::{grade_add, grade_delete, grade_list, grade_update};
pub use init::init;
pub use login::{login, logout, whoami};
pub use render::Rows;
pub use report::{report_academic, report_ledger, AcademicReport};
pub use schedule::{schedule_add, schedule_delete, schedule_list, schedule_update};
pub use transaction::{transaction_add, transaction_delete, transaction_list, transaction_update};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data and text meant for stdout.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// Rendered output, such as a table, that is written to stdout.
    #[serde(skip)]
    rows: Option<Rows>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            rows: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            rows: None,
        }
    }

    pub(crate) fn with_rows(mut self, rows: Rows) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Get the rendered output, if the command produces any.
    pub fn rows(&self) -> Option<&Rows> {
        self.rows.as_ref()
    }

    /// Print the message to `info!`, the rendered rows (if any) to stdout and the structured data
    /// (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(rows) = self.rows() {
            println!("{rows}");
        }
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// `s` when `count` is not 1.
fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// List parameters scoped to the logged-in student.
fn list_params(session: &Session) -> ListParams {
    ListParams::new(&session.student_id)
}

/// Fetches a record that belongs to the logged-in student. Records of other students are
/// reported as not found.
async fn owned<E>(config: &Config, session: &Session, id: &str) -> Result<E>
where
    E: Entity,
    Db: Repository<E>,
{
    let found = Repository::<E>::get(config.db(), id)
        .await
        .pub_result(ErrorType::Database)?;
    match found {
        Some(entity) if entity.owner() == session.student_id => Ok(entity),
        _ => Err(anyhow!("No {} found with id '{id}'", E::NAME)).pub_result(ErrorType::Request),
    }
}
