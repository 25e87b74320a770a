//! Outbound (Driven) ports for the seal registry.
//!
//! Everything the registry needs from its host: account existence, key
//! hashing, the clock and notification delivery.

use thiserror::Error;

use crate::domain::events::Notification;
use crate::domain::value_objects::{AccountName, Fingerprint, PublicKey, Timestamp};

/// Answers whether a named account exists on the host.
pub trait AccountDirectory: Send + Sync {
    fn account_exists(&self, account: &AccountName) -> bool;
}

/// Hashes a public key into the fingerprint used for global uniqueness.
pub trait KeyFingerprinter: Send + Sync {
    fn fingerprint(&self, public_key: &PublicKey) -> Fingerprint;
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current unix time in seconds.
    fn now(&self) -> Timestamp;
}

/// Notification delivery failures. Never fatal to the operation that
/// produced the notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    Closed,

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// One-way signal to the accounts interested in a committed change.
pub trait NotificationPort: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}
