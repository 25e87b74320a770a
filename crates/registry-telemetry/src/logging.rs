//! Structured logging setup.
//!
//! Log lines carry consistent fields so that seal lifecycle events can be
//! filtered by issuer and sequence number:
//! - `issuer_id`: Issuer identifier
//! - `sequence_number`: Sequence number within the issuer
//! - `message`: Log message
//! - Additional context fields

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global `tracing` subscriber described by `config`.
///
/// Fails with [`TelemetryError::AlreadyInitialized`] when a global subscriber
/// is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))?;

    // JSON output for containers/production
    let json_layer = (config.console_output && config.json_logs).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    // Pretty output for development
    let pretty_layer = (config.console_output && !config.json_logs).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Structured logging initialized"
    );

    Ok(())
}

/// Install a test-friendly subscriber that writes through the libtest
/// capture. Safe to call from every test; only the first call installs.
pub fn init_test_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init()
        .is_ok()
}

/// Log a seal-related event with standard fields.
///
/// ```rust,ignore
/// log_seal_event!(info, "Seal created", issuer_id, sequence_number, workflow_id = 7);
/// ```
#[macro_export]
macro_rules! log_seal_event {
    ($level:ident, $msg:expr, $issuer_id:expr, $sequence_number:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            issuer_id = $issuer_id,
            sequence_number = $sequence_number,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let config = TelemetryConfig::default().with_log_level("warn");
        assert!(init_logging(&config).is_ok());

        let again = init_logging(&config);
        assert!(matches!(again, Err(TelemetryError::AlreadyInitialized(_))));
        assert!(!init_test_logging());

        // Macro expands against the re-exported tracing crate.
        log_seal_event!(debug, "macro smoke test", 1u64, 2u64, memo = "ok");
    }
}
