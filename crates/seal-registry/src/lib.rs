//! # Seal Registry
//!
//! Registry for cryptographically-signed seals. An issuer registers public
//! keys, each valid over a contiguous range of sequence numbers; seals are
//! created against a covered, non-revoked sequence number, grouped into
//! workflows naming a transit and a recipient, advanced through
//! issuer-defined statuses and finally deleted or reaped on expiry.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): entities, ordered stores and invariants, no I/O
//!   - `IssuerDirectory`: issuer id to owning account
//!   - `KeyIntervalStore`: disjoint per-issuer key intervals, revocation
//!   - `WorkflowStore`: workflows and their live-seal counters
//!   - `SealStore`: seals indexed by sequence key and by expiry
//!   - `ExpiryReaper`: bounded bulk expiry
//! - **Ports** (`ports/`): `SealRegistryApi` inbound; `AccountDirectory`,
//!   `KeyFingerprinter`, `TimeSource`, `NotificationPort` outbound
//! - **Adapters** (`adapters/`): in-memory accounts, SHA-256 fingerprints,
//!   system and manual clocks, notifiers
//! - **Application** (`application/`): `SealRegistryService`
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Intervals of an issuer never overlap | `KeyIntervalStore::add_explicit` |
//! | A public key is registered once | fingerprint index |
//! | One seal per `(issuer, sequence)` | `SealStore::insert` |
//! | `live_seal_count` equals referencing seals | seal lifecycle, reaper |
//! | Revocation does not touch existing seals | `SealRegistryService::create_seal` |
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use seal_registry::*;
//!
//! let accounts = Arc::new(InMemoryAccountDirectory::with_accounts(["alice", "truckco", "carol"]));
//! let mut registry =
//!     SealRegistryService::new(RegistryConfig::default(), accounts, Arc::new(SystemTimeSource));
//!
//! let alice = AccountName::from("alice");
//! registry.add_issuer(&alice, &alice, 100)?;
//! let interval = registry.add_key_auto(&alice, 100, 5, public_key)?;
//! assert_eq!((interval.seq_start, interval.seq_end), (0, 4));
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{
    InMemoryAccountDirectory, ManualClock, NoOpNotifier, RecordingNotifier, Sha256Fingerprinter,
    SystemTimeSource, TracingNotifier,
};
pub use application::SealRegistryService;
pub use config::{ConfigError, RegistryConfig, RegistryConfigBuilder};
pub use domain::entities::*;
pub use domain::errors::{ErrorKind, RegistryError};
pub use domain::events::{Notification, RegistryEvent};
pub use domain::value_objects::*;
pub use ports::inbound::{CreateSealRequest, CreateWorkflowRequest, SealRegistryApi};
pub use ports::outbound::{
    AccountDirectory, KeyFingerprinter, NotificationPort, NotifyError, TimeSource,
};
