//! Unread aggregation per resource, per group and per workspace.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use roster_shared::ResourceId;

use crate::models::Sources;

/// Aggregated unread state exposed to sorting and rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnreadSummary {
    /// `count` plus the number of distinct unread thread markers.
    pub unread_count: u64,
    pub has_notification: bool,
    pub last_activity: Option<DateTime<Utc>>,
}

impl UnreadSummary {
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }

    fn merge(&mut self, other: UnreadSummary) {
        self.unread_count = self.unread_count.saturating_add(other.unread_count);
        self.has_notification |= other.has_notification;
        self.last_activity = self.last_activity.max(other.last_activity);
    }
}

/// Read-only view over the unread and notification collections.
#[derive(Debug, Clone, Copy)]
pub struct UnreadIndex<'a> {
    sources: &'a Sources,
}

impl<'a> UnreadIndex<'a> {
    pub fn new(sources: &'a Sources) -> Self {
        Self { sources }
    }

    /// Unread state of a single resource. Zero when no record exists.
    pub fn summary(&self, id: &ResourceId) -> UnreadSummary {
        let key = id.unread_key();
        let has_notification = self.has_notification(&key);

        let Some(record) = self
            .sources
            .unreads
            .get(&key)
            .or_else(|| self.sources.unreads.get(id.as_str()))
        else {
            return UnreadSummary {
                has_notification,
                ..UnreadSummary::default()
            };
        };

        let distinct_threads = record.each.iter().collect::<BTreeSet<_>>().len() as u64;

        UnreadSummary {
            unread_count: record.count.saturating_add(distinct_threads),
            has_notification,
            last_activity: record.last,
        }
    }

    pub fn unread_count(&self, id: &ResourceId) -> u64 {
        self.summary(id).unread_count
    }

    /// Sum of the summaries of `ids`.
    pub fn total<'i>(&self, ids: impl IntoIterator<Item = &'i ResourceId>) -> UnreadSummary {
        let mut total = UnreadSummary::default();
        for id in ids {
            total.merge(self.summary(id));
        }
        total
    }

    /// Unread state of every channel association belonging to `group`.
    pub fn group_summary(&self, group: &ResourceId) -> UnreadSummary {
        self.total(
            self.sources
                .associations
                .graph
                .values()
                .filter(|a| &a.group == group)
                .map(|a| &a.resource),
        )
    }

    fn has_notification(&self, key: &str) -> bool {
        let mention = format!("{key}/mention");
        self.sources.notifications.get(key).copied().unwrap_or(false)
            || self.sources.notifications.get(&mention).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;
    use crate::models::UnreadRecord;

    fn record(count: u64, each: &[&str]) -> UnreadRecord {
        UnreadRecord {
            count,
            each: each.iter().map(|s| s.to_string()).collect(),
            last: None,
        }
    }

    #[test]
    fn count_adds_thread_markers() {
        let mut sources = Sources::default();
        sources.unreads.insert("r".to_string(), record(2, &["t1"]));

        let index = UnreadIndex::new(&sources);
        assert_eq!(index.unread_count(&ResourceId::new("r")), 3);
    }

    #[test]
    fn duplicate_thread_markers_count_once() {
        let mut sources = Sources::default();
        sources
            .unreads
            .insert("r".to_string(), record(0, &["t1", "t1", "t2"]));

        let index = UnreadIndex::new(&sources);
        assert_eq!(index.unread_count(&ResourceId::new("r")), 2);
    }

    #[test]
    fn missing_record_is_zero() {
        let sources = Sources::default();
        let summary = UnreadIndex::new(&sources).summary(&ResourceId::new("/ship/~zod/chat"));
        assert_eq!(summary, UnreadSummary::default());
        assert!(!summary.has_unread());
    }

    #[test]
    fn ship_paths_read_graph_keyed_records() {
        let mut sources = Sources::default();
        sources
            .unreads
            .insert("/graph/~zod/chat".to_string(), record(4, &[]));
        sources
            .notifications
            .insert("/graph/~zod/chat/mention".to_string(), true);

        let summary = UnreadIndex::new(&sources).summary(&ResourceId::new("/ship/~zod/chat"));
        assert_eq!(summary.unread_count, 4);
        assert!(summary.has_notification);
    }

    #[test]
    fn group_summary_sums_its_channels_only() {
        let mut sources = Sources::default();
        add_channel(&mut sources, "/ship/~zod/a", "/ship/~zod/g", "A");
        add_channel(&mut sources, "/ship/~zod/b", "/ship/~zod/g", "B");
        add_channel(&mut sources, "/ship/~zod/c", "/ship/~zod/other", "C");
        sources.unreads.insert("/graph/~zod/a".to_string(), record(1, &[]));
        sources.unreads.insert("/graph/~zod/b".to_string(), record(2, &["x"]));
        sources.unreads.insert("/graph/~zod/c".to_string(), record(10, &[]));
        sources.notifications.insert("/graph/~zod/b".to_string(), true);

        let summary = UnreadIndex::new(&sources).group_summary(&ResourceId::new("/ship/~zod/g"));
        assert_eq!(summary.unread_count, 4);
        assert!(summary.has_notification);
    }
}
