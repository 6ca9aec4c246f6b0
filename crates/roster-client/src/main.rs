//! # roster-client
//!
//! Feeds a recorded stream of snapshot updates through the sidebar engine
//! and prints the resulting layout and per-workspace entries as JSON.
//!
//! Usage: `roster-client <updates.json>` where the file holds a JSON array
//! of snapshot updates. Order changes are printed as event lines while the
//! updates are applied.

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use roster_client::bridge::{pump_updates, request_entries, request_layout};
use roster_client::{banner, events, init_tracing, spawn_sidebar, ClientConfig, SidebarCommand};
use roster_core::{SidebarEntry, SnapshotUpdate};
use roster_shared::Workspace;

#[derive(Serialize)]
struct WorkspaceDump {
    workspace: Workspace,
    entries: Vec<SidebarEntry>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting {}", banner());

    let path = std::env::args()
        .nth(1)
        .context("usage: roster-client <updates.json>")?;

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let updates: Vec<SnapshotUpdate> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;

    let db = config.open_database().context("opening settings database")?;
    let (cmd_tx, mut notif_rx) = spawn_sidebar(config.sidebar.clone(), db);

    let printer = tokio::spawn(async move {
        while let Some(notification) = notif_rx.recv().await {
            events::emit_event(&notification);
        }
    });

    let delivered = pump_updates(futures::stream::iter(updates), &cmd_tx).await;
    info!(delivered, "Snapshot updates applied");

    let layout = request_layout(&cmd_tx).await?;
    println!("{}", serde_json::to_string_pretty(&layout)?);

    for section in &layout.sections {
        let entries = request_entries(&cmd_tx, section.workspace.clone()).await?;
        let dump = WorkspaceDump {
            workspace: section.workspace.clone(),
            entries,
        };
        println!("{}", serde_json::to_string_pretty(&dump)?);
    }

    cmd_tx
        .send(SidebarCommand::Shutdown)
        .await
        .map_err(|_| anyhow::anyhow!("Sidebar command channel closed"))?;
    drop(cmd_tx);
    printer.await?;

    Ok(())
}
