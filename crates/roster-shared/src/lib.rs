//! Types shared by every Roster crate: resource identifiers, workspace and
//! application tags, the error taxonomy and the key-value store contract.

pub mod constants;
pub mod error;
pub mod kv;
pub mod types;

pub use error::{Result, RosterError};
pub use kv::{KeyValueStore, MemoryStore};
pub use types::{AppTag, Direction, JoinProgress, ResourceId, Workspace};
