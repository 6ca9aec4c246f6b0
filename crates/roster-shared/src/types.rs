use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::constants::{DM_SIGIL, GRAPH_PREFIX, SHIP_PREFIX};

// Resource identifier: group path, graph association path, or `~peer`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the identifier of a direct-message thread with `peer`.
    ///
    /// A leading sigil on `peer` is tolerated so that both `zod` and `~zod`
    /// yield `~zod`.
    pub fn dm(peer: &str) -> Self {
        Self(format!("{DM_SIGIL}{}", peer.trim_start_matches(DM_SIGIL)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_dm(&self) -> bool {
        self.0.starts_with(DM_SIGIL)
    }

    /// Key under which unread and notification records for this resource
    /// are published: association paths use `/ship/`, the unread index uses
    /// `/graph/`.
    pub fn unread_key(&self) -> String {
        match self.0.strip_prefix(SHIP_PREFIX) {
            Some(rest) => format!("{GRAPH_PREFIX}{rest}"),
            None => self.0.clone(),
        }
    }

    /// The `~host/name` part of an association path, as stored in the set
    /// of joined graph keys.
    pub fn graph_key(&self) -> &str {
        self.0
            .strip_prefix(SHIP_PREFIX)
            .or_else(|| self.0.strip_prefix(GRAPH_PREFIX))
            .unwrap_or(&self.0)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Application that originated a join request or invitation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppTag {
    /// Channel-level (graph) resources.
    Graph,
    /// Whole groups.
    Groups,
    #[serde(other)]
    Other,
}

/// Progress of a pending join request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JoinProgress {
    Requested,
    Syncing,
    Done,
    Abort,
}

impl JoinProgress {
    pub fn is_aborted(self) -> bool {
        matches!(self, Self::Abort)
    }

    /// Still in flight: neither finished nor aborted.
    pub fn is_joining(self) -> bool {
        matches!(self, Self::Requested | Self::Syncing)
    }
}

/// Navigation context the sidebar is showing entries for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "group", rename_all = "lowercase")]
pub enum Workspace {
    Home,
    Messages,
    Group(ResourceId),
}

impl Workspace {
    pub fn group(&self) -> Option<&ResourceId> {
        match self {
            Self::Group(g) => Some(g),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}
