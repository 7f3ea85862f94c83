//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! Log records describe what the scrubber did (methods, sources, counts,
//! text sizes). They never carry identifier values or the text being
//! scrubbed.
//!
//! # Example
//!
//! ```no_run
//! use phiscrub::logging::init_logging;
//! use phiscrub::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging(&config).expect("Failed to initialize logging");
//!
//! tracing::info!("Scrubbing started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log an identifier that could not be turned into a rule
///
/// # Example
///
/// ```no_run
/// use phiscrub::log_identifier_skipped;
/// use phiscrub::domain::{IdentifierSource, ScrubMethod};
///
/// log_identifier_skipped!(ScrubMethod::Numeric, IdentifierSource::Patient, "no digits");
/// ```
#[macro_export]
macro_rules! log_identifier_skipped {
    ($method:expr, $source:expr, $reason:expr) => {
        tracing::warn!(
            method = %$method,
            source = ?$source,
            reason = %$reason,
            "Identifier value skipped"
        );
    };
}

/// Log the completion of a scrub call
///
/// # Example
///
/// ```no_run
/// use phiscrub::log_scrub_complete;
/// use std::time::Duration;
///
/// log_scrub_complete!(2048, 3, Duration::from_millis(4));
/// ```
#[macro_export]
macro_rules! log_scrub_complete {
    ($text_bytes:expr, $substitutions:expr, $duration:expr) => {
        tracing::debug!(
            text_bytes = $text_bytes,
            substitutions = $substitutions,
            duration_us = $duration.as_micros() as u64,
            "Scrub completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use phiscrub::log_error_with_context;
/// use phiscrub::domain::ScrubError;
///
/// let error = ScrubError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
