//! Task that owns the [`Sidebar`] and serializes every access to it.
//!
//! Snapshot updates, queries and user actions all arrive as
//! [`SidebarCommand`]s on one channel, so reconciliation and reordering never
//! interleave. Side effects the UI must react to go out as
//! [`SidebarNotification`]s.

use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use roster_core::{
    CycleTarget, GroupOrder, Sidebar, SidebarConfig, SidebarEntry, SidebarLayout, SnapshotUpdate,
};
use roster_shared::{Direction, KeyValueStore, ResourceId, Workspace};

/// Commands sent *to* the sidebar task.
#[derive(Debug)]
pub enum SidebarCommand {
    /// Replace one source collection.
    Update(SnapshotUpdate),
    GetEntries(Workspace, oneshot::Sender<Vec<SidebarEntry>>),
    GetLayout(oneshot::Sender<SidebarLayout>),
    GetSortableOrder(oneshot::Sender<GroupOrder>),
    Select {
        workspace: Workspace,
        id: ResourceId,
    },
    Cycle(Direction, oneshot::Sender<Option<CycleTarget>>),
    Reorder {
        source: usize,
        destination: Option<usize>,
        reply: oneshot::Sender<bool>,
    },
    PruneStale(oneshot::Sender<Vec<ResourceId>>),
    /// Stop the task.
    Shutdown,
}

/// Notifications sent *from* the sidebar task.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarNotification {
    /// The group order was rewritten.
    OrderChanged(GroupOrder),
    /// A cycle step picked a new entry.
    Navigate(CycleTarget),
}

/// Spawn the sidebar task on the current runtime.
pub fn spawn_sidebar<S>(
    config: SidebarConfig,
    kv: S,
) -> (
    mpsc::Sender<SidebarCommand>,
    mpsc::Receiver<SidebarNotification>,
)
where
    S: KeyValueStore + Send + 'static,
{
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<SidebarCommand>(256);
    let (notif_tx, notif_rx) = mpsc::channel::<SidebarNotification>(256);

    tokio::spawn(async move {
        let mut sidebar = Sidebar::new(config, kv);
        info!(groups = sidebar.order().len(), "Sidebar task started");

        loop {
            match cmd_rx.recv().await {
                Some(SidebarCommand::Update(update)) => {
                    if sidebar.apply(update) {
                        notify(&notif_tx, SidebarNotification::OrderChanged(sidebar.order().clone()));
                    }
                }
                Some(SidebarCommand::GetEntries(workspace, reply)) => {
                    let _ = reply.send(sidebar.ordered_entries(&workspace));
                }
                Some(SidebarCommand::GetLayout(reply)) => {
                    let _ = reply.send(sidebar.layout());
                }
                Some(SidebarCommand::GetSortableOrder(reply)) => {
                    let _ = reply.send(sidebar.sortable_order());
                }
                Some(SidebarCommand::Select { workspace, id }) => {
                    sidebar.select(workspace, id);
                }
                Some(SidebarCommand::Cycle(direction, reply)) => {
                    let target = sidebar.cycle(direction);
                    if let Some(target) = &target {
                        notify(&notif_tx, SidebarNotification::Navigate(target.clone()));
                    }
                    let _ = reply.send(target);
                }
                Some(SidebarCommand::Reorder {
                    source,
                    destination,
                    reply,
                }) => {
                    let changed = sidebar.reorder(source, destination);
                    if changed {
                        notify(&notif_tx, SidebarNotification::OrderChanged(sidebar.order().clone()));
                    }
                    let _ = reply.send(changed);
                }
                Some(SidebarCommand::PruneStale(reply)) => {
                    let removed = sidebar.prune_stale();
                    if !removed.is_empty() {
                        notify(&notif_tx, SidebarNotification::OrderChanged(sidebar.order().clone()));
                    }
                    let _ = reply.send(removed);
                }
                Some(SidebarCommand::Shutdown) => {
                    info!("Sidebar shutdown requested");
                    break;
                }
                None => {
                    info!("Command channel closed, stopping sidebar task");
                    break;
                }
            }
        }
    });

    (cmd_tx, notif_rx)
}

/// Queue `notification` without waiting. A full queue drops it.
fn notify(notif_tx: &mpsc::Sender<SidebarNotification>, notification: SidebarNotification) {
    match notif_tx.try_send(notification) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!(notification = ?dropped, "Notification queue full, dropping");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("Notification receiver gone");
        }
    }
}

/// Forward every update of `updates` into the sidebar task. Returns how
/// many were delivered before the stream ended or the task went away.
pub async fn pump_updates<St>(updates: St, cmd_tx: &mpsc::Sender<SidebarCommand>) -> usize
where
    St: Stream<Item = SnapshotUpdate>,
{
    let mut updates = std::pin::pin!(updates);
    let mut delivered = 0;

    while let Some(update) = updates.next().await {
        if cmd_tx.send(SidebarCommand::Update(update)).await.is_err() {
            debug!(delivered, "Sidebar task gone, dropping remaining updates");
            break;
        }
        delivered += 1;
    }

    delivered
}

pub async fn request_entries(
    cmd_tx: &mpsc::Sender<SidebarCommand>,
    workspace: Workspace,
) -> anyhow::Result<Vec<SidebarEntry>> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(SidebarCommand::GetEntries(workspace, reply))
        .await
        .map_err(|_| anyhow::anyhow!("Sidebar command channel closed"))?;
    rx.await
        .map_err(|_| anyhow::anyhow!("Sidebar task dropped the reply"))
}

pub async fn request_layout(
    cmd_tx: &mpsc::Sender<SidebarCommand>,
) -> anyhow::Result<SidebarLayout> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(SidebarCommand::GetLayout(reply))
        .await
        .map_err(|_| anyhow::anyhow!("Sidebar command channel closed"))?;
    rx.await
        .map_err(|_| anyhow::anyhow!("Sidebar task dropped the reply"))
}

pub async fn request_cycle(
    cmd_tx: &mpsc::Sender<SidebarCommand>,
    direction: Direction,
) -> anyhow::Result<Option<CycleTarget>> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(SidebarCommand::Cycle(direction, reply))
        .await
        .map_err(|_| anyhow::anyhow!("Sidebar command channel closed"))?;
    rx.await
        .map_err(|_| anyhow::anyhow!("Sidebar task dropped the reply"))
}

pub async fn request_reorder(
    cmd_tx: &mpsc::Sender<SidebarCommand>,
    source: usize,
    destination: Option<usize>,
) -> anyhow::Result<bool> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(SidebarCommand::Reorder {
            source,
            destination,
            reply,
        })
        .await
        .map_err(|_| anyhow::anyhow!("Sidebar command channel closed"))?;
    rx.await
        .map_err(|_| anyhow::anyhow!("Sidebar task dropped the reply"))
}

pub async fn request_sortable_order(
    cmd_tx: &mpsc::Sender<SidebarCommand>,
) -> anyhow::Result<GroupOrder> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(SidebarCommand::GetSortableOrder(reply))
        .await
        .map_err(|_| anyhow::anyhow!("Sidebar command channel closed"))?;
    rx.await
        .map_err(|_| anyhow::anyhow!("Sidebar task dropped the reply"))
}

pub async fn request_prune_stale(
    cmd_tx: &mpsc::Sender<SidebarCommand>,
) -> anyhow::Result<Vec<ResourceId>> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(SidebarCommand::PruneStale(reply))
        .await
        .map_err(|_| anyhow::anyhow!("Sidebar command channel closed"))?;
    rx.await
        .map_err(|_| anyhow::anyhow!("Sidebar task dropped the reply"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::models::{Association, Associations, Group, Metadata, MetadataConfig};
    use roster_shared::constants::GROUP_ORDER_KEY;
    use roster_shared::MemoryStore;
    use std::collections::BTreeMap;

    fn association(resource: &str, group: &str, title: &str, config: MetadataConfig) -> Association {
        Association {
            resource: ResourceId::new(resource),
            group: ResourceId::new(group),
            metadata: Metadata {
                title: title.to_string(),
                config,
                ..Metadata::default()
            },
        }
    }

    fn associations(groups: &[(&str, &str)]) -> Associations {
        let mut associations = Associations::default();
        for (group, title) in groups {
            associations.groups.insert(
                ResourceId::new(*group),
                association(group, group, title, MetadataConfig::Group),
            );
        }
        associations
    }

    fn memberships(groups: &[&str]) -> BTreeMap<ResourceId, Group> {
        groups
            .iter()
            .map(|g| (ResourceId::new(*g), Group::default()))
            .collect()
    }

    #[tokio::test]
    async fn test_new_group_appends_and_notifies() {
        let kv = MemoryStore::with_entry(GROUP_ORDER_KEY, r#"["/ship/~zod/a"]"#);
        let (tx, mut notif_rx) = spawn_sidebar(SidebarConfig::default(), kv);

        let updates = futures::stream::iter(vec![
            SnapshotUpdate::Associations(associations(&[("/ship/~zod/a", "A"), ("/ship/~zod/b", "B")])),
            SnapshotUpdate::Groups(memberships(&["/ship/~zod/a", "/ship/~zod/b"])),
        ]);
        assert_eq!(pump_updates(updates, &tx).await, 2);

        match notif_rx.recv().await {
            Some(SidebarNotification::OrderChanged(order)) => {
                assert_eq!(order, GroupOrder::from_leaves(["/ship/~zod/a", "/ship/~zod/b"]));
            }
            other => panic!("unexpected notification: {other:?}"),
        }

        let layout = request_layout(&tx).await.unwrap();
        let titles: Vec<_> = layout.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["My Channels", "Messages", "A", "B"]);

        tx.send(SidebarCommand::Shutdown).await.unwrap();
    }

    #[tokio::test]
    async fn test_reorder_round_trip() {
        let (tx, mut notif_rx) = spawn_sidebar(SidebarConfig::default(), MemoryStore::new());
        pump_updates(
            futures::stream::iter(vec![
                SnapshotUpdate::Associations(associations(&[("/ship/~zod/a", "A"), ("/ship/~zod/b", "B")])),
                SnapshotUpdate::Groups(memberships(&["/ship/~zod/a", "/ship/~zod/b"])),
            ]),
            &tx,
        )
        .await;

        assert!(request_reorder(&tx, 0, Some(1)).await.unwrap());
        assert_eq!(
            notif_rx.recv().await,
            Some(SidebarNotification::OrderChanged(GroupOrder::from_leaves([
                "/ship/~zod/b",
                "/ship/~zod/a",
            ])))
        );

        assert!(!request_reorder(&tx, 1, None).await.unwrap());
        assert!(!request_reorder(&tx, 7, Some(0)).await.unwrap());
    }

    #[tokio::test]
    async fn test_cycle_navigates_between_dms() {
        let (tx, mut notif_rx) = spawn_sidebar(SidebarConfig::default(), MemoryStore::new());
        let peers = ["bus", "nec", "zod"].iter().map(|p| p.to_string()).collect();
        pump_updates(
            futures::stream::iter(vec![SnapshotUpdate::DirectMessages(peers)]),
            &tx,
        )
        .await;

        let entries = request_entries(&tx, Workspace::Messages).await.unwrap();
        assert_eq!(entries.len(), 3);

        tx.send(SidebarCommand::Select {
            workspace: Workspace::Messages,
            id: ResourceId::dm("nec"),
        })
        .await
        .unwrap();

        let target = request_cycle(&tx, Direction::Forward).await.unwrap();
        let expected = CycleTarget::Dm {
            peer: ResourceId::dm("bus"),
        };
        assert_eq!(target, Some(expected.clone()));
        assert_eq!(
            notif_rx.recv().await,
            Some(SidebarNotification::Navigate(expected))
        );
    }

    #[tokio::test]
    async fn test_requests_fail_after_shutdown() {
        let (tx, _notif_rx) = spawn_sidebar(SidebarConfig::default(), MemoryStore::new());
        tx.send(SidebarCommand::Shutdown).await.unwrap();

        assert!(request_layout(&tx).await.is_err());
        assert_eq!(pump_updates(futures::stream::iter(vec![SnapshotUpdate::Inbox(Vec::new())]), &tx).await, 0);
    }

    #[tokio::test]
    async fn test_prune_stale_drops_left_groups() {
        let kv = MemoryStore::with_entry(GROUP_ORDER_KEY, r#"["/ship/~zod/a","/ship/~zod/b"]"#);
        let (tx, mut notif_rx) = spawn_sidebar(SidebarConfig::default(), kv);
        pump_updates(
            futures::stream::iter(vec![
                SnapshotUpdate::Associations(associations(&[("/ship/~zod/a", "A"), ("/ship/~zod/b", "B")])),
                SnapshotUpdate::Groups(memberships(&["/ship/~zod/a", "/ship/~zod/b"])),
                SnapshotUpdate::Groups(memberships(&["/ship/~zod/a"])),
            ]),
            &tx,
        )
        .await;

        assert_eq!(
            request_sortable_order(&tx).await.unwrap(),
            GroupOrder::from_leaves(["/ship/~zod/a", "/ship/~zod/b"])
        );

        let removed = request_prune_stale(&tx).await.unwrap();
        assert_eq!(removed, vec![ResourceId::new("/ship/~zod/b")]);
        assert_eq!(
            notif_rx.recv().await,
            Some(SidebarNotification::OrderChanged(GroupOrder::from_leaves(["/ship/~zod/a"])))
        );

        assert!(request_prune_stale(&tx).await.unwrap().is_empty());
        assert_eq!(
            request_sortable_order(&tx).await.unwrap(),
            GroupOrder::from_leaves(["/ship/~zod/a"])
        );
    }

    #[tokio::test]
    async fn test_ignored_notifications_do_not_block_commands() {
        let (tx, _notif_rx) = spawn_sidebar(SidebarConfig::default(), MemoryStore::new());
        pump_updates(
            futures::stream::iter(vec![
                SnapshotUpdate::Associations(associations(&[("/ship/~zod/a", "A"), ("/ship/~zod/b", "B")])),
                SnapshotUpdate::Groups(memberships(&["/ship/~zod/a", "/ship/~zod/b"])),
            ]),
            &tx,
        )
        .await;

        let moves = async {
            for _ in 0..300 {
                assert!(request_reorder(&tx, 0, Some(1)).await.unwrap());
            }
            request_layout(&tx).await.unwrap()
        };
        let layout = tokio::time::timeout(std::time::Duration::from_secs(10), moves)
            .await
            .expect("sidebar task stalled on a full notification queue");
        assert_eq!(layout.sections.len(), 4);
    }
}
