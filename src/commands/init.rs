use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the campus home directory with:
/// - an initial `config.json` with nobody logged in
/// - an empty SQLite database with the current schema
///
/// # Arguments
/// - `campus_home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/campus`
///
/// # Errors
/// - Returns an error if the directory is already initialized or any file operation fails.
pub async fn init(campus_home: &Path) -> Result<Out<()>> {
    let config = Config::create(campus_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the campus directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("campus");
        let out = init(&home).await.unwrap();
        assert!(out.message().contains("Successfully created"));
        assert!(Config::load(&home).await.is_ok());
    }

    #[tokio::test]
    async fn test_init_twice() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).await.unwrap();
        let err = init(dir.path()).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Config));
    }
}
