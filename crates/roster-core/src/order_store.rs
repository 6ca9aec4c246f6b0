//! Owner of the persisted group order.
//!
//! [`OrderStore`] holds the in-memory [`GroupOrder`] and writes it through a
//! [`KeyValueStore`] after every mutation. The in-memory value is updated
//! first; a failed write is logged and the next mutation writes again.

use std::collections::BTreeSet;

use tracing::{debug, error, info, warn};

use roster_shared::constants::GROUP_ORDER_KEY;
use roster_shared::{KeyValueStore, ResourceId, Result, RosterError};

use crate::order::{self, GroupOrder};

pub struct OrderStore<S> {
    kv: S,
    order: GroupOrder,
}

impl<S: KeyValueStore> OrderStore<S> {
    /// Read the persisted order once.
    ///
    /// A missing value or unparseable JSON yields an empty order. Duplicate
    /// identifiers are repaired (last occurrence wins) and written back.
    pub fn load(kv: S) -> Self {
        let order = match kv.get(GROUP_ORDER_KEY) {
            Ok(Some(json)) => match GroupOrder::parse(&json) {
                Ok(order) => order,
                Err(e) => {
                    warn!(error = %e, "persisted group order unreadable, starting empty");
                    GroupOrder::default()
                }
            },
            Ok(None) => GroupOrder::default(),
            Err(e) => {
                warn!(error = %e, "failed to read group order, starting empty");
                GroupOrder::default()
            }
        };

        let mut store = Self { kv, order };

        let dropped = store.order.dedupe();
        if !dropped.is_empty() {
            for id in &dropped {
                error!(error = %RosterError::DuplicateIdentifier(id.clone()), "repairing group order");
            }
            store.persist();
        }

        debug!(items = store.order.len(), "group order loaded");
        store
    }

    pub fn order(&self) -> &GroupOrder {
        &self.order
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Append live groups the order does not mention yet. Writes only when
    /// something was appended. Returns the appended identifiers.
    ///
    /// An empty order is left alone: nothing has been customized yet and the
    /// sidebar falls back to alphabetical group order.
    pub fn reconcile(&mut self, live: &BTreeSet<ResourceId>) -> Vec<ResourceId> {
        if self.order.is_empty() {
            return Vec::new();
        }

        let reconciled = order::reconcile(&self.order, live);
        if reconciled.changed() {
            info!(appended = ?reconciled.appended, "appending newly joined groups to order");
            self.commit(reconciled.order);
        }
        reconciled.appended
    }

    /// Remove groups absent from `live`. Never triggered by snapshot
    /// updates; callers decide when a missing group is really gone.
    pub fn prune(&mut self, live: &BTreeSet<ResourceId>) -> Vec<ResourceId> {
        let (pruned, removed) = order::prune(&self.order, live);
        if !removed.is_empty() {
            info!(removed = ?removed, "pruning stale groups from order");
            self.commit(pruned);
        }
        removed
    }

    /// Move a top-level item. `seed` is used as the starting order when
    /// nothing has been persisted yet. Returns whether the order changed.
    pub fn reorder(
        &mut self,
        source: usize,
        destination: Option<usize>,
        seed: impl FnOnce() -> GroupOrder,
    ) -> Result<bool> {
        let base = if self.order.is_empty() {
            seed()
        } else {
            self.order.clone()
        };

        match order::move_item(&base, source, destination)? {
            Some(next) => {
                info!(source, destination = ?destination, "group order rearranged");
                self.commit(next);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Swap in `next` and write it out.
    fn commit(&mut self, next: GroupOrder) {
        self.order = next;
        self.persist();
    }

    fn persist(&self) {
        let json = match self.order.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialize group order");
                return;
            }
        };
        if let Err(e) = self.kv.put(GROUP_ORDER_KEY, &json) {
            warn!(error = %e, "failed to persist group order");
        }
    }
}
