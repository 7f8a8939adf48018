//! Schema migrations for the campus database.
//!
//! Each migration is a pair of SQL files in this directory:
//! - `migration_NN_up.sql` takes the schema from version `NN-1` to `NN`
//! - `migration_NN_down.sql` takes it from `NN` back to `NN-1`
//!
//! The current version is the single row of the `schema_version` table.

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::Result;

/// The schema version this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

struct Migration {
    /// The version reached by running `up`.
    version: i32,
    up: &'static str,
    down: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up: include_str!("migration_01_up.sql"),
    down: include_str!("migration_01_down.sql"),
}];

/// Creates the `schema_version` table at version 0 in a brand new database.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);
         INSERT INTO schema_version (version) SELECT 0 WHERE NOT EXISTS (SELECT 1 FROM schema_version);",
    )
    .await
    .context("Failed to create the schema_version table")?;
    Ok(())
}

/// Reads the schema version recorded in the database.
pub(crate) async fn version(pool: &SqlitePool) -> Result<i32> {
    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to read the schema version")?;
    row.0.context("The schema_version table is empty")
}

/// Moves the schema from `from` to `to`, one version at a time, in either direction. Every step
/// runs in its own transaction together with the `schema_version` update. All steps are checked
/// for availability before the first one runs.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Result<()> {
    if from == to {
        debug!("Schema is at version {to}, nothing to migrate");
        return Ok(());
    }
    check_available(from, to)?;

    if from < to {
        for version in (from + 1)..=to {
            debug!("Running migration {version:02} up");
            step(pool, find(version)?.up, version).await?;
        }
    } else {
        for version in ((to + 1)..=from).rev() {
            debug!("Running migration {version:02} down");
            step(pool, find(version)?.down, version - 1).await?;
        }
    }

    debug!("Schema migrated from version {from} to {to}");
    Ok(())
}

fn find(version: i32) -> Result<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("Migration {version} not found"))
}

async fn step(pool: &SqlitePool, sql: &str, new_version: i32) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    tx.execute(sql)
        .await
        .context("Failed to execute migration SQL")?;

    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")
}

fn check_available(from: i32, to: i32) -> Result<()> {
    let (low, high) = if from < to { (from + 1, to) } else { (to + 1, from) };
    for version in low..=high {
        if !MIGRATIONS.iter().any(|m| m.version == version) {
            bail!("Migration {version} is missing but required to migrate from version {from} to {to}");
        }
    }
    Ok(())
}
