//! Candidate entries of a workspace, before sorting.

use std::collections::BTreeSet;

use tracing::debug;

use roster_shared::{ResourceId, Workspace};

use crate::models::Sources;
use crate::pending::{PendingSet, PendingSource};

/// Collects identifiers in insertion order, ignoring repeats.
#[derive(Default)]
struct UniqueList {
    seen: BTreeSet<ResourceId>,
    items: Vec<ResourceId>,
}

impl UniqueList {
    fn push(&mut self, id: ResourceId) {
        if self.seen.insert(id.clone()) {
            self.items.push(id);
        } else {
            debug!(id = %id, "dropping repeated candidate");
        }
    }
}

/// Unordered, duplicate-free candidate list for `workspace`.
///
/// Joined forms are collected before pending ones, so an identifier present
/// in both keeps its joined form.
pub fn select_entries(
    workspace: &Workspace,
    sources: &Sources,
    pending: &PendingSet,
) -> Vec<ResourceId> {
    let mut list = UniqueList::default();

    match workspace {
        Workspace::Home => {
            for id in &sources.inbox {
                list.push(id.clone());
            }
            for (id, entry) in pending.iter() {
                if entry.source != PendingSource::Dm && entry.target_group.is_none() {
                    list.push(id.clone());
                }
            }
        }
        Workspace::Messages => {
            for peer in &sources.direct_messages {
                list.push(ResourceId::dm(peer));
            }
            for (id, entry) in pending.iter() {
                if entry.source == PendingSource::Dm {
                    list.push(id.clone());
                }
            }
        }
        Workspace::Group(group) => {
            for association in sources.associations.graph.values() {
                if &association.group == group {
                    list.push(association.resource.clone());
                }
            }
            for (id, entry) in pending.iter() {
                if entry.target_group.as_ref() == Some(group) {
                    list.push(id.clone());
                }
            }
        }
    }

    list.items
}
