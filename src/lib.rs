//! smart-campus: a student's course schedule, grades, attendance and personal finances, kept in a
//! local SQLite database and driven from the `campus` command line.
//!
//! The pure engines ([`grade`], [`ledger`], [`academic`] and [`chat`]) hold the domain rules and
//! can be used without a database. [`commands`] ties them to storage for the CLI.

pub mod academic;
pub mod args;
pub mod chat;
pub mod commands;
mod config;
mod db;
pub mod error;
pub mod grade;
pub mod ledger;
pub mod model;
pub mod repo;
mod utils;

#[cfg(test)]
mod test;

pub use config::{Config, Session};
pub use error::{Error, ErrorType, Result};
