//! Configuration file handling for the campus home directory.
//!
//! The configuration file is stored at `$CAMPUS_HOME/config.json`. Besides identifying the
//! directory as a campus home it records the session, i.e. the student that is logged in.

use crate::db::Db;
use crate::error::{ErrorType, IntoResult};
use crate::model::Student;
use crate::{utils, Result};
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "campus";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const CAMPUS_SQLITE: &str = "campus.sqlite";

/// The `Config` object represents the state of the app. You instantiate it by providing the path
/// to `$CAMPUS_HOME` and from there it loads `$CAMPUS_HOME/config.json` and opens the database.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the campus home directory, an initial `config.json` with no session, and an
    /// empty database.
    ///
    /// # Errors
    /// - Returns an error if the directory already holds a campus home or any file operation
    ///   fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the campus home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let sqlite_path = root.join(CAMPUS_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;
        debug!("Created campus home at {}", root.display());

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `campus_home` and its config file exist
    /// - load the config file
    /// - open the database, migrating it if needed
    pub async fn load(campus_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = campus_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Campus Home is missing, run `campus init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(CAMPUS_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    /// The logged-in student, or a `Session` error if nobody is logged in.
    pub fn session(&self) -> Result<&Session> {
        self.config_file
            .session
            .as_ref()
            .ok_or_else(|| anyhow!("Nobody is logged in, run `campus login` first"))
            .pub_result(ErrorType::Session)
    }

    /// Records `session` and saves `config.json`.
    pub async fn set_session(&mut self, session: Session) -> Result<()> {
        self.config_file.session = Some(session);
        self.config_file.save(&self.config_path).await
    }

    /// Forgets the session and saves `config.json`. Returns the session that was cleared.
    pub async fn clear_session(&mut self) -> Result<Option<Session>> {
        let previous = self.config_file.session.take();
        self.config_file.save(&self.config_path).await?;
        Ok(previous)
    }
}

/// The student a command acts on behalf of.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Session {
    pub student_id: String,
    pub nim: String,
    pub name: String,
}

impl From<&Student> for Session {
    fn from(student: &Student) -> Self {
        Self {
            student_id: student.id().to_string(),
            nim: student.nim().to_string(),
            name: student.name().to_string(),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "campus",
///   "config_version": 1,
///   "session": {
///     "student_id": "3f2b8c1e-5d7a-4c49-9a0e-1b6f2d8e4c71",
///     "nim": "2021001",
///     "name": "Sari"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "campus"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    session: Option<Session>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            session: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
