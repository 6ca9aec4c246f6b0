//! CRUD operations for [`Setting`] records.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use roster_shared::KeyValueStore;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Setting;

impl Database {
    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single setting by key, `None` if it was never written.
    pub fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        self.conn()
            .query_row(
                "SELECT key, value, updated_at FROM settings WHERE key = ?1",
                params![key],
                row_to_setting,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }

    /// List all settings, ordered by key.
    pub fn list_settings(&self) -> Result<Vec<Setting>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT key, value, updated_at FROM settings ORDER BY key ASC")?;
        let rows = stmt.query_map([], row_to_setting)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    // ------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------

    /// Insert or replace the value stored under `key`.
    pub fn put_setting(&self, key: &str, value: &str) -> Result<Setting> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now.to_rfc3339()],
        )?;

        tracing::debug!(key, len = value.len(), "setting written");

        Ok(Setting {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: now,
        })
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a setting.  Returns `true` if a row was deleted.
    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> roster_shared::Result<Option<String>> {
        Ok(self.get_setting(key)?.map(|s| s.value))
    }

    fn put(&self, key: &str, value: &str) -> roster_shared::Result<()> {
        self.put_setting(key, value)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Setting`].
fn row_to_setting(row: &rusqlite::Row<'_>) -> rusqlite::Result<Setting> {
    let key: String = row.get(0)?;
    let value: String = row.get(1)?;
    let updated_str: String = row.get(2)?;

    let updated_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&updated_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Setting {
        key,
        value,
        updated_at,
    })
}
