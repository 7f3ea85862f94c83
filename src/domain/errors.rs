//! Domain error types
//!
//! This module defines the error hierarchy for the scrubber.
//! All errors are domain-specific and don't expose third-party types.

use crate::domain::identifier::ScrubMethod;
use thiserror::Error;

/// Main scrubber error type
///
/// Per-identifier problems (`InvalidIdentifierValue`, and `PatternCompilation`
/// raised while building one rule) are absorbed by
/// [`PersonalizedScrubber::add`](crate::scrub::PersonalizedScrubber::add) and
/// reported as a skipped outcome. Whole-call failures from scrubbing propagate
/// to the caller as `RedactionFailure`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrubError {
    /// Configuration-related errors (rejected at load time)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An identifier value that is blank or degenerate after normalisation
    #[error("Invalid identifier value for {method} scrubbing: {reason}")]
    InvalidIdentifierValue {
        /// Scrub method the value was declared with
        method: ScrubMethod,
        /// Why the value cannot produce a rule
        reason: String,
    },

    /// A generated pattern could not be compiled
    #[error("Pattern compilation error: {0}")]
    PatternCompilation(String),

    /// Scrubbing a text block failed
    #[error("Redaction failed for {context}: {reason}")]
    RedactionFailure {
        /// Patient/field identity of the failing text
        context: String,
        /// Failure detail
        reason: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl ScrubError {
    /// Creates an `InvalidIdentifierValue` error
    pub fn invalid_value(method: ScrubMethod, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifierValue {
            method,
            reason: reason.into(),
        }
    }

    /// Whether the error only affects a single identifier and processing can continue
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifierValue { .. } | Self::PatternCompilation(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ScrubError {
    fn from(err: std::io::Error) -> Self {
        ScrubError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ScrubError {
    fn from(err: serde_json::Error) -> Self {
        ScrubError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ScrubError {
    fn from(err: toml::de::Error) -> Self {
        ScrubError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from regex build errors
impl From<regex::Error> for ScrubError {
    fn from(err: regex::Error) -> Self {
        ScrubError::PatternCompilation(err.to_string())
    }
}
