//! Configuration management for the scrubber.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - Overrides through `PHISCRUB_<SECTION>_<KEY>` environment variables
//! - Validation on load, so degenerate settings never reach a scrubber
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use phiscrub::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("phiscrub.toml")?;
//! println!("Fuzzy budget: {}", config.scrubber.string_max_regex_errors);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ScrubberConfig`] - Matching behaviour and replacement tags
//! - [`NonspecificConfig`] - Generic rules applied to every patient
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [scrubber]
//! string_max_regex_errors = 1
//! at_word_boundaries_only_words = true
//! alternative_words = [["street", "st"], ["road", "rd"]]
//! allowlist = ["hospital"]
//!
//! [nonspecific]
//! scrub_all_uk_postcodes = true
//! scrub_all_numbers_of_n_digits = [10]
//!
//! [logging]
//! log_level = "info"
//! local_enabled = true
//! local_path = "/var/log/phiscrub"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str};
pub use schema::{
    LoggingConfig, NonspecificConfig, ScrubConfig, ScrubberConfig, MAX_FUZZY_ERRORS,
};
