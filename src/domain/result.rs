//! Result type alias for the scrubber
//!
//! This module provides a convenient Result type alias that uses ScrubError
//! as the error type.

use super::errors::ScrubError;

/// Result type alias for scrubber operations
///
/// # Examples
///
/// ```
/// use phiscrub::domain::result::Result;
/// use phiscrub::domain::errors::ScrubError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ScrubError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ScrubError>;
