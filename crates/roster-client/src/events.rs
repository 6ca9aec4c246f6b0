use serde::Serialize;

use roster_core::{CycleTarget, GroupOrder};

use crate::bridge::SidebarNotification;

pub const EVENT_ORDER_CHANGED: &str = "order-changed";
pub const EVENT_NAVIGATE: &str = "navigate";

#[derive(Debug, Clone, Serialize)]
pub struct OrderChangedPayload<'a> {
    pub order: &'a GroupOrder,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigatePayload<'a> {
    pub target: &'a CycleTarget,
}

#[derive(Debug, Clone, Serialize)]
struct Envelope<'a, P> {
    event: &'a str,
    payload: P,
}

/// One JSON line describing `notification`, for consumers reading stdout.
pub fn event_line(notification: &SidebarNotification) -> serde_json::Result<String> {
    match notification {
        SidebarNotification::OrderChanged(order) => serde_json::to_string(&Envelope {
            event: EVENT_ORDER_CHANGED,
            payload: OrderChangedPayload { order },
        }),
        SidebarNotification::Navigate(target) => serde_json::to_string(&Envelope {
            event: EVENT_NAVIGATE,
            payload: NavigatePayload { target },
        }),
    }
}

pub fn emit_event(notification: &SidebarNotification) {
    match event_line(notification) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialize event"),
    }
}
