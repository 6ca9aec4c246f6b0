//! Sidebar sort strategies.
//!
//! Every strategy is a total order: whatever the primary key, ties fall
//! through to the lowercase title and finally to the identifier itself.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use roster_shared::ResourceId;

use crate::models::Sources;
use crate::pending::PendingSet;
use crate::unreads::{UnreadIndex, UnreadSummary};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[serde(rename = "asc")]
    Alphabetical,
    #[default]
    #[serde(rename = "lastUpdated")]
    LastUpdated,
    #[serde(rename = "unreadFirst")]
    UnreadFirst,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "alphabetical" => Ok(Self::Alphabetical),
            "lastUpdated" | "last-updated" => Ok(Self::LastUpdated),
            "unreadFirst" | "unread-first" => Ok(Self::UnreadFirst),
            other => Err(format!("unknown sort strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub sort_by: SortBy,
    /// Put every pending entry after every joined one.
    pub pending_last: bool,
}

/// Everything a sort key is derived from.
#[derive(Debug, Clone, Copy)]
pub struct SortContext<'a> {
    pub sources: &'a Sources,
    pub pending: &'a PendingSet,
}

struct Keyed {
    id: ResourceId,
    title: String,
    unread: UnreadSummary,
    pending: bool,
}

/// Order `candidates` under `options`. The result is a permutation of the
/// input and depends on nothing but the arguments.
pub fn sort_entries(
    candidates: &[ResourceId],
    ctx: SortContext<'_>,
    options: SortOptions,
) -> Vec<ResourceId> {
    let unreads = UnreadIndex::new(ctx.sources);

    let mut keyed: Vec<Keyed> = candidates
        .iter()
        .map(|id| Keyed {
            id: id.clone(),
            title: ctx.sources.title_of(id).to_lowercase(),
            unread: unreads.summary(id),
            pending: ctx.pending.contains(id),
        })
        .collect();

    keyed.sort_by(|a, b| {
        let demoted = if options.pending_last {
            a.pending.cmp(&b.pending)
        } else {
            Ordering::Equal
        };
        demoted.then_with(|| compare(options.sort_by, a, b))
    });

    keyed.into_iter().map(|k| k.id).collect()
}

fn compare(sort_by: SortBy, a: &Keyed, b: &Keyed) -> Ordering {
    match sort_by {
        SortBy::Alphabetical => alphabetical(a, b),
        SortBy::LastUpdated => last_updated(a, b),
        SortBy::UnreadFirst => b
            .unread
            .has_notification
            .cmp(&a.unread.has_notification)
            .then_with(|| b.unread.has_unread().cmp(&a.unread.has_unread()))
            .then_with(|| last_updated(a, b)),
    }
}

fn alphabetical(a: &Keyed, b: &Keyed) -> Ordering {
    a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id))
}

// Newest first; entries without activity sink.
fn last_updated(a: &Keyed, b: &Keyed) -> Ordering {
    b.unread
        .last_activity
        .cmp(&a.unread.last_activity)
        .then_with(|| alphabetical(a, b))
}
