//! The sidebar engine as seen by the rendering layer.
//!
//! [`Sidebar`] owns the latest snapshot of every source collection, the
//! group order and the current selection. Everything it returns is computed
//! on demand from those three; only [`Sidebar::apply`], [`Sidebar::reorder`]
//! and [`Sidebar::prune_stale`] ever write the order.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use roster_shared::constants::{HOME_TITLE, MESSAGES_TITLE};
use roster_shared::{Direction, JoinProgress, KeyValueStore, ResourceId, RosterError, Workspace};

use crate::config::SidebarConfig;
use crate::cycle::{self, CycleTarget};
use crate::entries::select_entries;
use crate::models::{SnapshotUpdate, Sources, UpdateEffect};
use crate::order::GroupOrder;
use crate::order_store::OrderStore;
use crate::pending::{pending_for, PendingScope, PendingSource};
use crate::sort::{sort_entries, SortContext};
use crate::unreads::{UnreadIndex, UnreadSummary};

/// One row inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarEntry {
    pub id: ResourceId,
    pub title: String,
    pub is_pending: bool,
    pub unread_count: u64,
    pub has_notification: bool,
}

/// Header of a workspace: home, messages, or one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub workspace: Workspace,
    pub title: String,
    pub unread_count: u64,
    pub has_notification: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "progress", rename_all = "lowercase")]
pub enum PendingGroupStatus {
    Invited,
    Joining(JoinProgress),
    /// The join finished but membership has not caught up yet.
    Joined,
}

/// A group the user is invited to or joining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingGroup {
    pub id: ResourceId,
    pub title: String,
    pub status: PendingGroupStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarLayout {
    pub sections: Vec<Section>,
    pub pending_groups: Vec<PendingGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub workspace: Workspace,
    pub id: ResourceId,
}

pub struct Sidebar<S> {
    config: SidebarConfig,
    sources: Sources,
    orders: OrderStore<S>,
    selection: Option<Selection>,
}

impl<S: KeyValueStore> Sidebar<S> {
    /// Load the persisted order from `kv` and start with empty sources.
    pub fn new(config: SidebarConfig, kv: S) -> Self {
        Self {
            config,
            sources: Sources::default(),
            orders: OrderStore::load(kv),
            selection: None,
        }
    }

    pub fn config(&self) -> &SidebarConfig {
        &self.config
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn order(&self) -> &GroupOrder {
        self.orders.order()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Replace one source collection. Membership changes reconcile the
    /// group order; returns whether the order changed.
    pub fn apply(&mut self, update: SnapshotUpdate) -> bool {
        match self.sources.apply(update) {
            UpdateEffect::Membership => {
                let live = self.sources.live_groups();
                !self.orders.reconcile(&live).is_empty()
            }
            UpdateEffect::Entries => false,
        }
    }

    /// Live groups sorted by lowercase title, then identifier.
    pub fn groups_alphabetical(&self) -> Vec<ResourceId> {
        let mut groups: Vec<(String, ResourceId)> = self
            .sources
            .live_groups()
            .into_iter()
            .map(|g| (self.sources.title_of(&g).to_lowercase(), g))
            .collect();
        groups.sort();
        groups.into_iter().map(|(_, g)| g).collect()
    }

    /// The order a drag-and-drop editor should start from.
    pub fn sortable_order(&self) -> GroupOrder {
        if self.order().is_empty() {
            GroupOrder::from_leaves(self.groups_alphabetical())
        } else {
            self.order().clone()
        }
    }

    /// Sorted identifiers of `workspace`.
    pub fn ordered_ids(&self, workspace: &Workspace) -> Vec<ResourceId> {
        let pending = pending_for(&self.sources, PendingScope::Channels);
        let mut candidates = select_entries(workspace, &self.sources, &pending);

        if self.config.hide_unjoined {
            candidates.retain(|id| {
                id.is_dm()
                    || pending.contains(id)
                    || !self.sources.associations.graph.contains_key(id)
                    || self.sources.is_joined_channel(id)
            });
        }

        sort_entries(
            &candidates,
            SortContext {
                sources: &self.sources,
                pending: &pending,
            },
            self.config.sort_options(),
        )
    }

    /// Sorted entries of `workspace`, ready to render.
    pub fn ordered_entries(&self, workspace: &Workspace) -> Vec<SidebarEntry> {
        let pending = pending_for(&self.sources, PendingScope::Channels);
        let unreads = UnreadIndex::new(&self.sources);

        self.ordered_ids(workspace)
            .into_iter()
            .map(|id| {
                let summary = unreads.summary(&id);
                SidebarEntry {
                    title: self.sources.title_of(&id),
                    is_pending: pending.contains(&id),
                    unread_count: summary.unread_count,
                    has_notification: summary.has_notification,
                    id,
                }
            })
            .collect()
    }

    /// Every section in display order, followed by pending groups.
    pub fn layout(&self) -> SidebarLayout {
        let unreads = UnreadIndex::new(&self.sources);
        let mut sections = Vec::new();

        let home = self.ordered_ids(&Workspace::Home);
        sections.push(section(Workspace::Home, HOME_TITLE.to_string(), unreads.total(&home)));

        let messages = self.ordered_ids(&Workspace::Messages);
        sections.push(section(
            Workspace::Messages,
            MESSAGES_TITLE.to_string(),
            unreads.total(&messages),
        ));

        for group in self.section_groups() {
            let title = self.sources.title_of(&group);
            let summary = unreads.group_summary(&group);
            sections.push(section(Workspace::Group(group), title, summary));
        }

        let pending_groups = pending_for(&self.sources, PendingScope::Groups)
            .iter()
            .map(|(id, entry)| PendingGroup {
                id: id.clone(),
                title: self.sources.title_of(id),
                status: match entry.source {
                    PendingSource::Join(progress) if progress.is_joining() => {
                        PendingGroupStatus::Joining(progress)
                    }
                    PendingSource::Join(_) => PendingGroupStatus::Joined,
                    PendingSource::Invite | PendingSource::Dm => PendingGroupStatus::Invited,
                },
            })
            .collect();

        SidebarLayout {
            sections,
            pending_groups,
        }
    }

    // Groups that get a section: the order's leaves (folders flattened) that
    // still have a group association, or every live group alphabetically
    // when nothing has been customized.
    fn section_groups(&self) -> Vec<ResourceId> {
        if self.order().is_empty() {
            return self.groups_alphabetical();
        }

        let mut seen = BTreeSet::new();
        self.order()
            .leaves()
            .into_iter()
            .filter(|id| self.sources.associations.groups.contains_key(*id))
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect()
    }

    pub fn select(&mut self, workspace: Workspace, id: ResourceId) {
        debug!(workspace = ?workspace, id = %id, "selection changed");
        self.selection = Some(Selection { workspace, id });
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Step the selection through the current workspace. Returns the new
    /// target, or `None` when cycling is not possible from here.
    pub fn cycle(&mut self, direction: Direction) -> Option<CycleTarget> {
        let Some(selection) = self.selection.as_ref() else {
            debug!("cycle requested with nothing selected");
            return None;
        };

        let ordered = self.ordered_ids(&selection.workspace);
        match cycle::cycle(
            &ordered,
            Some(&selection.id),
            direction,
            &selection.workspace,
            &self.sources,
        ) {
            Ok(target) => {
                debug!(target = %target.id(), "cycled selection");
                let workspace = selection.workspace.clone();
                self.selection = Some(Selection {
                    workspace,
                    id: target.id().clone(),
                });
                Some(target)
            }
            Err(e @ RosterError::MissingChannelConfig(_)) => {
                warn!(error = %e, "cycle target is not navigable");
                None
            }
            Err(e) => {
                debug!(error = %e, "cycle skipped");
                None
            }
        }
    }

    /// Drag-and-drop move of a top-level order item. Returns whether the
    /// order changed.
    pub fn reorder(&mut self, source: usize, destination: Option<usize>) -> bool {
        let seed = GroupOrder::from_leaves(self.groups_alphabetical());
        match self.orders.reorder(source, destination, move || seed) {
            Ok(changed) => changed,
            Err(e) => {
                warn!(error = %e, source, destination = ?destination, "reorder ignored");
                false
            }
        }
    }

    /// Drop groups from the order that are no longer live.
    pub fn prune_stale(&mut self) -> Vec<ResourceId> {
        let live = self.sources.live_groups();
        self.orders.prune(&live)
    }
}

fn section(workspace: Workspace, title: String, summary: UnreadSummary) -> Section {
    Section {
        workspace,
        title,
        unread_count: summary.unread_count,
        has_notification: summary.has_notification,
    }
}
