//! Domain models and types for the scrubber.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifying values** ([`IdentifierValue`], [`ScrubMethod`], [`IdentifierSource`], [`RawValue`])
//! - **Strongly-typed identifiers** ([`PatientId`], [`FieldName`]) and the [`ScrubContext`] they form
//! - **Error types** ([`ScrubError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ScrubError>`]:
//!
//! ```rust
//! use phiscrub::domain::{ScrubError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = phiscrub::config::ScrubberConfig::default();
//!     config.validate().map_err(ScrubError::Configuration)?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod identifier;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::ScrubError;
pub use identifier::{IdentifierSource, IdentifierValue, RawValue, ScrubMethod};
pub use ids::{FieldName, PatientId, ScrubContext};
pub use result::Result;
