//! Session command handlers.
//!
//! - `campus login` creates the student on first use, renames them when the name changed, and
//!   records the session in `config.json`
//! - `campus logout` clears the session
//! - `campus whoami` shows it

use crate::args::LoginArgs;
use crate::commands::Out;
use crate::config::Session;
use crate::error::{ErrorType, IntoResult};
use crate::model::Student;
use crate::repo::StudentStore;
use crate::{Config, Result};
use anyhow::ensure;
use tracing::debug;

/// Logs in as the student with the given NIM.
///
/// There is no password. If no student has the NIM yet they are created. If one exists under a
/// different name, the stored name is replaced with the given one.
pub async fn login(mut config: Config, args: LoginArgs) -> Result<Out<Student>> {
    let nim = args.nim().trim();
    let name = args.name().trim();
    ensure_filled(nim, name).pub_result(ErrorType::Request)?;

    let db = config.db();
    let existing = db.find_by_nim(nim).await.pub_result(ErrorType::Database)?;
    let (student, message) = match existing {
        None => {
            let student = db
                .insert_student(nim, name)
                .await
                .pub_result(ErrorType::Database)?;
            let message = format!("Welcome, {}! Your account has been created", student.name());
            (student, message)
        }
        Some(student) if student.name() != name => {
            debug!("Renaming {} from '{}' to '{name}'", nim, student.name());
            let student = db
                .rename_student(student.id(), name)
                .await
                .pub_result(ErrorType::Database)?;
            let message = format!("Welcome back, {}! Your name has been updated", student.name());
            (student, message)
        }
        Some(student) => {
            let message = format!("Welcome back, {}!", student.name());
            (student, message)
        }
    };

    config
        .set_session(Session::from(&student))
        .await
        .pub_result(ErrorType::Config)?;
    Ok(Out::new(message, student))
}

fn ensure_filled(nim: &str, name: &str) -> Result<()> {
    ensure!(!nim.is_empty(), "The NIM cannot be empty");
    ensure!(!name.is_empty(), "The name cannot be empty");
    Ok(())
}

/// Forgets the logged-in student. Logging out when nobody is logged in is not an error.
pub async fn logout(mut config: Config) -> Result<Out<()>> {
    let previous = config.clear_session().await.pub_result(ErrorType::Config)?;
    Ok(match previous {
        Some(session) => format!("Goodbye, {}!", session.name).into(),
        None => "Nobody was logged in".into(),
    })
}

/// Shows the logged-in student.
pub async fn whoami(config: Config) -> Result<Out<Session>> {
    let session = config.session()?.clone();
    Ok(Out::new(
        format!("Logged in as {} ({})", session.name, session.nim),
        session,
    ))
}
