//! Notification port implementations.

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::domain::events::Notification;
use crate::ports::outbound::{NotificationPort, NotifyError};

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

impl NotificationPort for NoOpNotifier {
    fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Emits each notification as a structured log line with a JSON payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationPort for TracingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(&notification.event).map_err(|e| {
            warn!(error = %e, "Failed to encode notification");
            NotifyError::Delivery(e.to_string())
        })?;

        let recipients: Vec<&str> = notification
            .recipients
            .iter()
            .map(|account| account.as_str())
            .collect();
        info!(
            correlation_id = %notification.correlation_id,
            actor = %notification.actor,
            recipients = ?recipients,
            event = %payload,
            "Registry notification"
        );
        Ok(())
    }
}

/// Keeps every notification in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }

    /// Drains and returns everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn last(&self) -> Option<Notification> {
        self.sent.lock().last().cloned()
    }
}

impl NotificationPort for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}
