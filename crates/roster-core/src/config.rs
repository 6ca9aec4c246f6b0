//! Sidebar configuration loaded from environment variables.
//!
//! All settings have defaults so the engine runs with zero configuration.

use serde::{Deserialize, Serialize};

use crate::sort::{SortBy, SortOptions};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarConfig {
    /// Sort strategy for entries inside a workspace.
    /// Env: `ROSTER_SORT_BY` (`asc` | `lastUpdated` | `unreadFirst`)
    /// Default: `lastUpdated`
    pub sort_by: SortBy,

    /// Hide channels that have an association but were never joined.
    /// Env: `ROSTER_HIDE_UNJOINED` (true/false)
    /// Default: `false`
    pub hide_unjoined: bool,

    /// Sort pending entries after joined ones.
    /// Env: `ROSTER_PENDING_LAST` (true/false)
    /// Default: `false`
    pub pending_last: bool,
}

impl SidebarConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("ROSTER_SORT_BY") {
            match value.parse::<SortBy>() {
                Ok(sort_by) => config.sort_by = sort_by,
                Err(e) => {
                    tracing::warn!(value = %value, error = %e, "Invalid ROSTER_SORT_BY, using default");
                }
            }
        }

        if let Some(value) = lookup("ROSTER_HIDE_UNJOINED") {
            config.hide_unjoined = parse_flag(&value);
        }

        if let Some(value) = lookup("ROSTER_PENDING_LAST") {
            config.pending_last = parse_flag(&value);
        }

        config
    }

    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            sort_by: self.sort_by,
            pending_last: self.pending_last,
        }
    }
}

pub fn parse_flag(value: &str) -> bool {
    value != "false" && value != "0" && !value.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SidebarConfig::from_lookup(lookup(&[]));
        assert_eq!(config, SidebarConfig::default());
        assert_eq!(config.sort_by, SortBy::LastUpdated);
        assert!(!config.hide_unjoined);
    }

    #[test]
    fn test_env_overrides() {
        let config = SidebarConfig::from_lookup(lookup(&[
            ("ROSTER_SORT_BY", "asc"),
            ("ROSTER_HIDE_UNJOINED", "true"),
            ("ROSTER_PENDING_LAST", "1"),
        ]));
        assert_eq!(config.sort_by, SortBy::Alphabetical);
        assert!(config.hide_unjoined);
        assert!(config.sort_options().pending_last);
    }

    #[test]
    fn test_invalid_sort_keeps_default() {
        let config = SidebarConfig::from_lookup(lookup(&[
            ("ROSTER_SORT_BY", "shuffle"),
            ("ROSTER_HIDE_UNJOINED", "0"),
        ]));
        assert_eq!(config.sort_by, SortBy::LastUpdated);
        assert!(!config.hide_unjoined);
    }
}
