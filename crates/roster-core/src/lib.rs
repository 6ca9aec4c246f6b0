//! # roster-core
//!
//! The sidebar engine: turns snapshots of associations, memberships,
//! pending joins and unread state into ordered, deduplicated entry lists
//! for each workspace, and maintains the user's group order.
//!
//! All computation is synchronous and pure over [`Sources`]. The only
//! side effect is the group order write, which goes through the
//! [`roster_shared::KeyValueStore`] handed to [`Sidebar::new`].

pub mod config;
pub mod cycle;
pub mod entries;
pub mod models;
pub mod order;
pub mod order_store;
pub mod pending;
pub mod sidebar;
pub mod sort;
pub mod unreads;

pub use config::SidebarConfig;
pub use cycle::CycleTarget;
pub use models::{SnapshotUpdate, Sources};
pub use order::{GroupOrder, OrderItem};
pub use order_store::OrderStore;
pub use pending::{PendingScope, PendingSet};
pub use sidebar::{
    PendingGroup, PendingGroupStatus, Section, Selection, Sidebar, SidebarEntry, SidebarLayout,
};
pub use sort::{SortBy, SortOptions};
pub use unreads::{UnreadIndex, UnreadSummary};
