//! Ports for the seal registry
//!
//! Inbound (API) and outbound (SPI) traits.

pub mod inbound;
pub mod outbound;

pub use inbound::{CreateSealRequest, CreateWorkflowRequest, SealRegistryApi};
pub use outbound::{AccountDirectory, KeyFingerprinter, NotificationPort, NotifyError, TimeSource};
