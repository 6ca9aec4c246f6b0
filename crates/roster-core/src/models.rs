//! Point-in-time snapshots of the collections the sidebar is built from.
//!
//! Every struct derives `Serialize` and `Deserialize` so snapshots can be fed
//! in from whatever subscription layer owns the transport.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roster_shared::{AppTag, JoinProgress, ResourceId};

// ---------------------------------------------------------------------------
// Associations
// ---------------------------------------------------------------------------

/// What kind of resource an association describes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetadataConfig {
    /// A channel backed by a graph; `module` is the channel type (chat, link, ...).
    Graph { module: String },
    /// The group itself.
    Group,
    #[default]
    Unset,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub config: MetadataConfig,
}

/// Metadata bound to a resource, and the group that resource lives in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Association {
    pub resource: ResourceId,
    pub group: ResourceId,
    pub metadata: Metadata,
}

impl Association {
    /// Channel type, if this association points at a navigable channel.
    pub fn channel_module(&self) -> Option<&str> {
        match &self.metadata.config {
            MetadataConfig::Graph { module } => Some(module),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Associations {
    /// Channel associations keyed by resource.
    #[serde(default)]
    pub graph: BTreeMap<ResourceId, Association>,
    /// Group associations keyed by group.
    #[serde(default)]
    pub groups: BTreeMap<ResourceId, Association>,
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Membership record for a joined group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    #[serde(default)]
    pub members: BTreeSet<String>,
    /// Hidden groups back unmanaged channels and never get a sidebar section.
    #[serde(default)]
    pub hidden: bool,
}

// ---------------------------------------------------------------------------
// Pending
// ---------------------------------------------------------------------------

/// A join request that has not completed yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingJoin {
    pub app: AppTag,
    pub progress: JoinProgress,
    /// Group the resource belongs to, when the preview already told us.
    #[serde(default)]
    pub group: Option<ResourceId>,
}

/// An invitation that has not been accepted or declined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invite {
    pub resource: ResourceId,
    pub app: AppTag,
    #[serde(default)]
    pub group: Option<ResourceId>,
    #[serde(default)]
    pub inviter: Option<String>,
}

// ---------------------------------------------------------------------------
// Unreads
// ---------------------------------------------------------------------------

/// Raw unread state for one resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadRecord {
    #[serde(default)]
    pub count: u64,
    /// Thread markers with unread replies.
    #[serde(default)]
    pub each: Vec<String>,
    /// Time of the latest activity on the resource.
    #[serde(default)]
    pub last: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Latest snapshot of every source collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sources {
    #[serde(default)]
    pub associations: Associations,
    #[serde(default)]
    pub groups: BTreeMap<ResourceId, Group>,
    /// Graph keys (`~host/name`) of joined channels.
    #[serde(default)]
    pub graph_keys: BTreeSet<String>,
    /// Resources shown in the home workspace.
    #[serde(default)]
    pub inbox: Vec<ResourceId>,
    /// Peers with an existing DM thread, without the sigil.
    #[serde(default)]
    pub direct_messages: BTreeSet<String>,
    /// Peers with a DM thread being set up, without the sigil.
    #[serde(default)]
    pub pending_dms: BTreeSet<String>,
    #[serde(default)]
    pub pending_joins: BTreeMap<ResourceId, PendingJoin>,
    #[serde(default)]
    pub invites: BTreeMap<Uuid, Invite>,
    /// Unread records keyed by unread-index path.
    #[serde(default)]
    pub unreads: BTreeMap<String, UnreadRecord>,
    /// Notification flags keyed by unread-index path.
    #[serde(default)]
    pub notifications: BTreeMap<String, bool>,
}

impl Sources {
    /// Whether the channel behind `id` has been joined.
    pub fn is_joined_channel(&self, id: &ResourceId) -> bool {
        self.graph_keys.contains(id.graph_key())
    }

    /// Groups that are both joined and described by a group association.
    pub fn live_groups(&self) -> BTreeSet<ResourceId> {
        self.associations
            .groups
            .values()
            .filter(|a| self.groups.get(&a.group).is_some_and(|g| !g.hidden))
            .map(|a| a.group.clone())
            .collect()
    }

    /// Title to display and sort by; falls back to the identifier.
    pub fn title_of(&self, id: &ResourceId) -> String {
        self.associations
            .graph
            .get(id)
            .or_else(|| self.associations.groups.get(id))
            .map(|a| a.metadata.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(id.as_str())
            .to_string()
    }

    /// Replace one collection wholesale.
    pub fn apply(&mut self, update: SnapshotUpdate) -> UpdateEffect {
        match update {
            SnapshotUpdate::Associations(a) => {
                self.associations = a;
                UpdateEffect::Membership
            }
            SnapshotUpdate::Groups(g) => {
                self.groups = g;
                UpdateEffect::Membership
            }
            SnapshotUpdate::GraphKeys(k) => {
                self.graph_keys = k;
                UpdateEffect::Entries
            }
            SnapshotUpdate::Inbox(i) => {
                self.inbox = i;
                UpdateEffect::Entries
            }
            SnapshotUpdate::DirectMessages(d) => {
                self.direct_messages = d;
                UpdateEffect::Entries
            }
            SnapshotUpdate::PendingDms(p) => {
                self.pending_dms = p;
                UpdateEffect::Entries
            }
            SnapshotUpdate::PendingJoins(p) => {
                self.pending_joins = p;
                UpdateEffect::Entries
            }
            SnapshotUpdate::Invites(i) => {
                self.invites = i;
                UpdateEffect::Entries
            }
            SnapshotUpdate::Unreads {
                records,
                notifications,
            } => {
                self.unreads = records;
                self.notifications = notifications;
                UpdateEffect::Entries
            }
            SnapshotUpdate::Full(sources) => {
                *self = *sources;
                UpdateEffect::Membership
            }
        }
    }
}

/// A fresh value for one source collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum SnapshotUpdate {
    Associations(Associations),
    Groups(BTreeMap<ResourceId, Group>),
    GraphKeys(BTreeSet<String>),
    Inbox(Vec<ResourceId>),
    DirectMessages(BTreeSet<String>),
    PendingDms(BTreeSet<String>),
    PendingJoins(BTreeMap<ResourceId, PendingJoin>),
    Invites(BTreeMap<Uuid, Invite>),
    Unreads {
        records: BTreeMap<String, UnreadRecord>,
        notifications: BTreeMap<String, bool>,
    },
    Full(Box<Sources>),
}

/// What an applied update may have invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEffect {
    /// Only derived entry lists.
    Entries,
    /// Group membership: the group order needs reconciling.
    Membership,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn channel(resource: &str, group: &str, title: &str) -> Association {
        Association {
            resource: ResourceId::new(resource),
            group: ResourceId::new(group),
            metadata: Metadata {
                title: title.to_string(),
                config: MetadataConfig::Graph {
                    module: "chat".to_string(),
                },
                ..Metadata::default()
            },
        }
    }

    pub fn group_assoc(group: &str, title: &str) -> Association {
        Association {
            resource: ResourceId::new(group),
            group: ResourceId::new(group),
            metadata: Metadata {
                title: title.to_string(),
                config: MetadataConfig::Group,
                ..Metadata::default()
            },
        }
    }

    /// Joined group `group` titled `title`.
    pub fn join_group(sources: &mut Sources, group: &str, title: &str) {
        sources
            .associations
            .groups
            .insert(ResourceId::new(group), group_assoc(group, title));
        sources.groups.insert(ResourceId::new(group), Group::default());
    }

    pub fn add_channel(sources: &mut Sources, resource: &str, group: &str, title: &str) {
        sources
            .associations
            .graph
            .insert(ResourceId::new(resource), channel(resource, group, title));
    }
}
