//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::config::Session;
use crate::model::{ScheduleDraft, ScheduleEntry};
use crate::repo::{Repository, StudentStore};
use crate::Config;
use chrono::{NaiveTime, Weekday};
use std::path::Path;
use tempfile::TempDir;

pub const NIM: &str = "2021001";
pub const NAME: &str = "Sari";

/// Test environment that sets up a campus home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and an initialized database. Nobody is logged in.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("campus");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Creates a test environment where the student `NIM`/`NAME` exists and is logged in.
    pub async fn logged_in() -> Self {
        let mut env = Self::new().await;
        let student = env.config.db().insert_student(NIM, NAME).await.unwrap();
        env.config.set_session(Session::from(&student)).await.unwrap();
        env
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Reloads the Config from disk, picking up session changes made by commands.
    pub async fn reload(&self) -> Config {
        Config::load(self.root()).await.unwrap()
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    pub fn session(&self) -> Session {
        self.config.session().unwrap().clone()
    }

    /// Adds a Monday 08:00-09:40 course for the logged-in student.
    pub async fn add_course(&self, name: &str, credits: u32) -> ScheduleEntry {
        let draft = ScheduleDraft::new(
            name,
            Weekday::Mon,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 40, 0).unwrap(),
        )
        .with_credits(credits);
        self.config
            .db()
            .insert(&self.session().student_id, draft)
            .await
            .unwrap()
    }

    /// Creates another student and a session for them, without logging them in.
    pub async fn other_student(&self, nim: &str) -> Session {
        let student = self
            .config
            .db()
            .insert_student(nim, "Budi")
            .await
            .unwrap();
        Session::from(&student)
    }
}
