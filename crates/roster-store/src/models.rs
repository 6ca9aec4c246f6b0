//! Rows persisted in the local database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single settings entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Setting {
    /// Settings key, e.g. `groupSorter.order`.
    pub key: String,
    /// Opaque value; callers choose the encoding (JSON for the group order).
    pub value: String,
    /// When the value was last written.
    pub updated_at: DateTime<Utc>,
}
