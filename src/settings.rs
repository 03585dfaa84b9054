use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    /// Documents parsed in parallel before each database write.
    pub chunk_size: usize,
}

impl Settings {
    /// Defaults, overridden by `CONTACTS_*` environment variables.
    pub fn load() -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("db_path", "data/contacts.sqlite")?
            .set_default("chunk_size", 500_i64)?
            .add_source(Environment::with_prefix("CONTACTS"))
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        Ok(Settings {
            chunk_size: settings.chunk_size.max(1),
            ..settings
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        let s = Settings::load().unwrap();
        if std::env::var_os("CONTACTS_DB_PATH").is_none() {
            assert_eq!(s.db_path, PathBuf::from("data/contacts.sqlite"));
        }
        if std::env::var_os("CONTACTS_CHUNK_SIZE").is_none() {
            assert_eq!(s.chunk_size, 500);
        }
    }
}
