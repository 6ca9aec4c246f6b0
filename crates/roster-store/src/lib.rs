//! # roster-store
//!
//! Local settings storage for Roster, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and implements the [`roster_shared::KeyValueStore`]
//! contract the sidebar engine persists its group order through.

pub mod database;
pub mod migrations;
pub mod models;
pub mod settings;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
