//! # Registry Telemetry
//!
//! Logging setup shared by the seal registry crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registry_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `seal-registry` | Service name in log lines |
//! | `SR_LOG_LEVEL` | `info` | Log level filter |
//! | `SR_JSON_LOGS` | `false` | JSON output (defaults on in containers) |
//! | `SR_CONSOLE_OUTPUT` | `true` | Disable to drop all console output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
