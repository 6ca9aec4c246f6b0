//! The user's manual group order and the pure operations on it.
//!
//! A [`GroupOrder`] is a top-level sequence of leaves and folders. Folders
//! can nest. Reconciliation works on the flattened leaf set; reordering
//! works on the top-level sequence, moving a folder as a unit.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use roster_shared::{ResourceId, Result, RosterError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawItem")]
#[serde(untagged)]
pub enum OrderItem {
    Leaf(ResourceId),
    Folder { name: String, groups: Vec<OrderItem> },
}

// Accepted on read: strings, `{name, groups}` objects, and bare nested arrays.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawItem {
    Leaf(ResourceId),
    Folder {
        #[serde(default)]
        name: String,
        groups: Vec<RawItem>,
    },
    Nested(Vec<RawItem>),
}

impl From<RawItem> for OrderItem {
    fn from(raw: RawItem) -> Self {
        match raw {
            RawItem::Leaf(id) => OrderItem::Leaf(id),
            RawItem::Folder { name, groups } => OrderItem::Folder {
                name,
                groups: groups.into_iter().map(OrderItem::from).collect(),
            },
            RawItem::Nested(groups) => OrderItem::Folder {
                name: String::new(),
                groups: groups.into_iter().map(OrderItem::from).collect(),
            },
        }
    }
}

impl OrderItem {
    pub fn leaf(id: impl Into<ResourceId>) -> Self {
        Self::Leaf(id.into())
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ResourceId>) {
        match self {
            Self::Leaf(id) => out.push(id),
            Self::Folder { groups, .. } => {
                for item in groups {
                    item.collect_leaves(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupOrder(pub Vec<OrderItem>);

impl GroupOrder {
    pub fn new(items: Vec<OrderItem>) -> Self {
        Self(items)
    }

    pub fn from_leaves<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceId>,
    {
        Self(ids.into_iter().map(OrderItem::leaf).collect())
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every leaf, depth first, in display order.
    pub fn leaves(&self) -> Vec<&ResourceId> {
        let mut out = Vec::new();
        for item in &self.0 {
            item.collect_leaves(&mut out);
        }
        out
    }

    pub fn mentioned(&self) -> BTreeSet<ResourceId> {
        self.leaves().into_iter().cloned().collect()
    }

    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Drop every leaf that occurs again later in display order, so the
    /// last occurrence wins. Returns the dropped identifiers.
    pub fn dedupe(&mut self) -> Vec<ResourceId> {
        let mut seen = BTreeSet::new();
        let mut dropped = Vec::new();

        // Walk back to front so the first sighting is the last occurrence.
        fn walk(
            items: &mut Vec<OrderItem>,
            seen: &mut BTreeSet<ResourceId>,
            dropped: &mut Vec<ResourceId>,
        ) {
            let mut kept = Vec::with_capacity(items.len());
            for mut item in items.drain(..).rev() {
                match &mut item {
                    OrderItem::Leaf(id) => {
                        if !seen.insert(id.clone()) {
                            dropped.push(id.clone());
                            continue;
                        }
                    }
                    OrderItem::Folder { groups, .. } => walk(groups, seen, dropped),
                }
                kept.push(item);
            }
            kept.reverse();
            *items = kept;
        }

        walk(&mut self.0, &mut seen, &mut dropped);
        dropped.reverse();
        dropped
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub order: GroupOrder,
    /// Identifiers appended to the top level, in append order.
    pub appended: Vec<ResourceId>,
}

impl Reconciled {
    pub fn changed(&self) -> bool {
        !self.appended.is_empty()
    }
}

/// Append every live group the order does not mention yet.
///
/// Append-only: identifiers absent from `live` are kept, since one snapshot
/// missing a group says nothing about whether the user left it.
pub fn reconcile(order: &GroupOrder, live: &BTreeSet<ResourceId>) -> Reconciled {
    let mentioned = order.mentioned();
    let appended: Vec<ResourceId> = live.difference(&mentioned).cloned().collect();

    let mut next = order.clone();
    next.0
        .extend(appended.iter().cloned().map(OrderItem::Leaf));

    Reconciled {
        order: next,
        appended,
    }
}

/// Remove leaves that are not in `live`, and folders left empty by that.
/// Returns the removed identifiers.
pub fn prune(order: &GroupOrder, live: &BTreeSet<ResourceId>) -> (GroupOrder, Vec<ResourceId>) {
    fn keep(items: &[OrderItem], live: &BTreeSet<ResourceId>, removed: &mut Vec<ResourceId>) -> Vec<OrderItem> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                OrderItem::Leaf(id) if live.contains(id) => out.push(item.clone()),
                OrderItem::Leaf(id) => removed.push(id.clone()),
                OrderItem::Folder { name, groups } => {
                    let groups = keep(groups, live, removed);
                    if !groups.is_empty() {
                        out.push(OrderItem::Folder {
                            name: name.clone(),
                            groups,
                        });
                    }
                }
            }
        }
        out
    }

    let mut removed = Vec::new();
    let items = keep(&order.0, live, &mut removed);
    (GroupOrder(items), removed)
}

// ---------------------------------------------------------------------------
// Reordering
// ---------------------------------------------------------------------------

/// Move the top-level item at `source` to `destination`.
///
/// `None` means the drop landed outside any target and nothing changes.
pub fn move_item(
    order: &GroupOrder,
    source: usize,
    destination: Option<usize>,
) -> Result<Option<GroupOrder>> {
    let Some(destination) = destination else {
        debug!(source, "drop outside a target, ignoring");
        return Ok(None);
    };

    let len = order.len();
    for index in [source, destination] {
        if index >= len {
            warn!(index, len, "reorder index out of range");
            return Err(RosterError::IndexOutOfRange { index, len });
        }
    }

    if source == destination {
        return Ok(None);
    }

    let mut items = order.0.clone();
    let item = items.remove(source);
    items.insert(destination, item);
    Ok(Some(GroupOrder(items)))
}
