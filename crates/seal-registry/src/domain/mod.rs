//! Domain layer for the seal registry
//!
//! Entities, value objects, the four ordered stores, the reaper and the
//! authorization and notification rules. No I/O.

pub mod authorization;
pub mod entities;
pub mod errors;
pub mod events;
pub mod invariants;
pub mod issuers;
pub mod key_intervals;
pub mod reaper;
pub mod seals;
pub mod value_objects;
pub mod workflows;

pub use authorization::{can_update_status, require_auth};
pub use entities::*;
pub use errors::*;
pub use events::{interested_accounts, Notification, RegistryEvent};
pub use issuers::IssuerDirectory;
pub use key_intervals::KeyIntervalStore;
pub use reaper::ExpiryReaper;
pub use seals::{NewSeal, SealStore};
pub use value_objects::*;
pub use workflows::WorkflowStore;
