//! Resolution of "not yet joined" identifiers.
//!
//! Pending DMs, join requests and invitations are folded into a single
//! [`PendingSet`]. Anything already joined is dropped here, so the rest of
//! the engine can treat joined and pending as mutually exclusive.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use roster_shared::constants::SHIP_PREFIX;
use roster_shared::{AppTag, JoinProgress, ResourceId};

use crate::models::Sources;

/// One raw pending record, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRecord {
    Dm {
        peer: String,
    },
    Join {
        resource: ResourceId,
        app: AppTag,
        progress: JoinProgress,
        group: Option<ResourceId>,
    },
    Invite {
        resource: ResourceId,
        app: AppTag,
        group: Option<ResourceId>,
    },
}

/// Where a resolved pending entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "progress", rename_all = "lowercase")]
pub enum PendingSource {
    Dm,
    Join(JoinProgress),
    Invite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingEntry {
    pub source: PendingSource,
    /// Group the pending resource will land in, when known.
    pub target_group: Option<ResourceId>,
}

/// Which pending records are relevant, and what counts as joined for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingScope {
    /// Channels and DMs shown inside a workspace.
    Channels,
    /// Whole groups shown as top-level rows.
    Groups,
}

impl PendingScope {
    fn app(self) -> AppTag {
        match self {
            Self::Channels => AppTag::Graph,
            Self::Groups => AppTag::Groups,
        }
    }

    /// Identifiers that are already joined for this scope.
    pub fn joined(self, sources: &Sources) -> BTreeSet<ResourceId> {
        match self {
            Self::Channels => sources
                .graph_keys
                .iter()
                .map(|key| ResourceId::new(format!("{SHIP_PREFIX}{key}")))
                .chain(sources.direct_messages.iter().map(|p| ResourceId::dm(p)))
                .chain(sources.groups.keys().cloned())
                .collect(),
            Self::Groups => sources
                .groups
                .keys()
                .chain(sources.associations.groups.keys())
                .cloned()
                .collect(),
        }
    }
}

/// Deduplicated pending identifiers, disjoint from the joined set they were
/// resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSet {
    entries: BTreeMap<ResourceId, PendingEntry>,
}

impl PendingSet {
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &ResourceId) -> Option<&PendingEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &PendingEntry)> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.entries.keys()
    }

    fn insert(&mut self, id: ResourceId, entry: PendingEntry) {
        match self.entries.entry(id) {
            // A join request carries progress, so it wins over an invitation.
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get_mut();
                if matches!(entry.source, PendingSource::Join(_)) {
                    existing.source = entry.source;
                }
                if existing.target_group.is_none() {
                    existing.target_group = entry.target_group;
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }
    }
}

/// Flatten the three pending collections of `sources` into tagged records.
pub fn pending_records(sources: &Sources) -> Vec<PendingRecord> {
    let dms = sources
        .pending_dms
        .iter()
        .map(|peer| PendingRecord::Dm { peer: peer.clone() });

    let joins = sources
        .pending_joins
        .iter()
        .map(|(resource, join)| PendingRecord::Join {
            resource: resource.clone(),
            app: join.app.clone(),
            progress: join.progress,
            group: join.group.clone(),
        });

    let invites = sources.invites.values().map(|invite| PendingRecord::Invite {
        resource: invite.resource.clone(),
        app: invite.app.clone(),
        group: invite.group.clone(),
    });

    dms.chain(joins).chain(invites).collect()
}

/// Resolve `records` into a pending set, excluding everything in `joined`.
pub fn resolve_pending(
    records: &[PendingRecord],
    joined: &BTreeSet<ResourceId>,
    scope: PendingScope,
) -> PendingSet {
    let app = scope.app();
    let mut set = PendingSet::default();

    for record in records {
        let (id, entry) = match record {
            PendingRecord::Dm { peer } => {
                if scope != PendingScope::Channels {
                    continue;
                }
                (
                    ResourceId::dm(peer),
                    PendingEntry {
                        source: PendingSource::Dm,
                        target_group: None,
                    },
                )
            }
            PendingRecord::Join {
                resource,
                app: record_app,
                progress,
                group,
            } => {
                if *record_app != app || progress.is_aborted() {
                    continue;
                }
                (
                    resource.clone(),
                    PendingEntry {
                        source: PendingSource::Join(*progress),
                        target_group: group.clone(),
                    },
                )
            }
            PendingRecord::Invite {
                resource,
                app: record_app,
                group,
            } => {
                if *record_app != app {
                    continue;
                }
                (
                    resource.clone(),
                    PendingEntry {
                        source: PendingSource::Invite,
                        target_group: group.clone(),
                    },
                )
            }
        };

        if joined.contains(&id) {
            continue;
        }
        set.insert(id, entry);
    }

    set
}

/// Resolve the pending set of `scope` straight from a snapshot.
pub fn pending_for(sources: &Sources, scope: PendingScope) -> PendingSet {
    resolve_pending(&pending_records(sources), &scope.joined(sources), scope)
}
