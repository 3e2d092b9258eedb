use std::sync::Arc;

use abi::NotificationEvent;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::ReservationEngine;

/// Transition observer. Invoked after a transition commits; delivery is
/// best-effort and never gates the transition's result.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &NotificationEvent) -> anyhow::Result<()>;
}

/// Default dispatcher: writes the event to the log and nothing else.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &NotificationEvent) -> anyhow::Result<()> {
        info!(event = event.name(), payload = ?event, "notification");
        Ok(())
    }
}

impl ReservationEngine {
    /// Fire-and-forget dispatch. Failures are logged, not retried, and never
    /// reach the caller of the transition.
    pub(crate) fn dispatch(&self, event: NotificationEvent) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&event).await {
                warn!(event = event.name(), error = %e, "notification dispatch failed");
            }
        });
    }
}
