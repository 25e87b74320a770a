//! Adapters for the outbound ports.
//!
//! In-memory and host-independent implementations; an embedding swaps in
//! its own for account lookup and notification delivery.

pub mod accounts;
pub mod clock;
pub mod fingerprint;
pub mod notifier;

pub use accounts::InMemoryAccountDirectory;
pub use clock::{ManualClock, SystemTimeSource};
pub use fingerprint::Sha256Fingerprinter;
pub use notifier::{NoOpNotifier, RecordingNotifier, TracingNotifier};
