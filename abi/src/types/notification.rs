use serde::{Deserialize, Serialize};

use crate::{ItemId, RequestId, RequestTarget};

/// What the dispatcher is told after a transition commits. Delivery is
/// best-effort and never gates the transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A new request landed in the admin's inbox.
    RequestSubmitted {
        request_id: RequestId,
        requester_id: String,
        target: RequestTarget,
        quantity: i32,
    },
    RequestApproved {
        request_id: RequestId,
        requester_id: String,
    },
    RequestDeclined {
        request_id: RequestId,
        requester_id: String,
        reason: Option<String>,
    },
    ItemIssued {
        request_id: RequestId,
        requester_id: String,
        item_id: ItemId,
        quantity: i32,
    },
    ItemReturned {
        request_id: RequestId,
        requester_id: String,
        item_id: ItemId,
        quantity: i32,
    },
}

impl NotificationEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            NotificationEvent::RequestSubmitted { .. } => "request_submitted",
            NotificationEvent::RequestApproved { .. } => "request_approved",
            NotificationEvent::RequestDeclined { .. } => "request_declined",
            NotificationEvent::ItemIssued { .. } => "item_issued",
            NotificationEvent::ItemReturned { .. } => "item_returned",
        }
    }
}
