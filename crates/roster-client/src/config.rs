//! Client configuration loaded from environment variables.

use std::path::PathBuf;

use roster_core::SidebarConfig;
use roster_store::{Database, StoreError};

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub sidebar: SidebarConfig,

    /// Location of the settings database.
    /// Env: `ROSTER_DB_PATH`
    /// Default: the platform data directory (`roster.db`)
    pub db_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            sidebar: SidebarConfig::from_lookup(&lookup),
            db_path: lookup("ROSTER_DB_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Open the configured database, or the default one.
    pub fn open_database(&self) -> Result<Database, StoreError> {
        match &self.db_path {
            Some(path) => Database::open_at(path),
            None => Database::new(),
        }
    }
}
