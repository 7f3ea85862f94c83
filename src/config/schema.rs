//! Configuration schema types
//!
//! This module defines the configuration structure for the scrubber. Every
//! field has a default so that a partial TOML file (or none at all) yields a
//! usable configuration.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Largest fuzzy edit budget accepted at configuration time
pub const MAX_FUZZY_ERRORS: u32 = 3;

/// Longest run of digits accepted by `scrub_all_numbers_of_n_digits`
pub const MAX_NONSPECIFIC_DIGITS: usize = 32;

/// Root configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrubConfig {
    /// Personalized scrubber settings
    #[serde(default)]
    pub scrubber: ScrubberConfig,

    /// Generic rules applied to every patient
    #[serde(default)]
    pub nonspecific: NonspecificConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScrubConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.scrubber.validate()?;
        self.nonspecific.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Settings that shape the rules built from a patient's identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubberConfig {
    /// Only match WORDS/PHRASE values at word boundaries
    pub at_word_boundaries_only_words: bool,

    /// Only match DATE values at word boundaries
    pub at_word_boundaries_only_dates: bool,

    /// Only match NUMERIC values at word boundaries
    pub at_word_boundaries_only_numbers: bool,

    /// Only match CODE values at word boundaries
    pub at_word_boundaries_only_codes: bool,

    /// Never match numbers or dates glued to further digits
    pub at_numeric_boundaries_only: bool,

    /// Fuzzy edit budget for WORDS fragments
    pub string_max_regex_errors: u32,

    /// Fragments shorter than this are matched exactly
    pub min_string_length_for_errors: usize,

    /// Fragments shorter than this are not used at all
    pub min_string_length_to_scrub_with: usize,

    /// Also match dates written without separators (`19800101`)
    pub allow_no_separator_dates: bool,

    /// Optional suffixes allowed after a WORDS/PHRASE match
    pub string_suffixes: Vec<String>,

    /// Groups of interchangeable words used when building PHRASE matchers
    pub alternative_words: Vec<Vec<String>>,

    /// Words that are never redacted, whatever rule matches them
    pub allowlist: Vec<String>,

    /// Replacement for patient identifiers
    pub replacement_text_patient: String,

    /// Replacement for third-party identifiers
    pub replacement_text_thirdparty: String,

    /// Replacement for generic (non-patient-specific) matches
    pub replacement_text_nonspecific: String,

    /// Maximum number of compiled matchers kept for reuse
    pub matcher_cache_capacity: u64,

    /// Largest text block accepted by a single scrub call (0 = unlimited)
    pub max_text_bytes: usize,
}

impl Default for ScrubberConfig {
    fn default() -> Self {
        Self {
            at_word_boundaries_only_words: false,
            at_word_boundaries_only_dates: false,
            at_word_boundaries_only_numbers: false,
            at_word_boundaries_only_codes: true,
            at_numeric_boundaries_only: true,
            string_max_regex_errors: 0,
            min_string_length_for_errors: 4,
            min_string_length_to_scrub_with: 2,
            allow_no_separator_dates: true,
            string_suffixes: vec!["s".to_string()],
            alternative_words: Vec::new(),
            allowlist: Vec::new(),
            replacement_text_patient: "[__PPP__]".to_string(),
            replacement_text_thirdparty: "[__TTT__]".to_string(),
            replacement_text_nonspecific: "[~~~]".to_string(),
            matcher_cache_capacity: 10_000,
            max_text_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ScrubberConfig {
    /// Validates the scrubber settings
    ///
    /// Rejects settings that would produce over-matching or pathological
    /// matchers, rather than adjusting them.
    pub fn validate(&self) -> Result<(), String> {
        if self.string_max_regex_errors > MAX_FUZZY_ERRORS {
            return Err(format!(
                "string_max_regex_errors = {} exceeds the maximum of {}",
                self.string_max_regex_errors, MAX_FUZZY_ERRORS
            ));
        }

        if self.string_max_regex_errors > 0
            && self.min_string_length_for_errors <= self.string_max_regex_errors as usize
        {
            return Err(format!(
                "min_string_length_for_errors ({}) must be greater than string_max_regex_errors ({})",
                self.min_string_length_for_errors, self.string_max_regex_errors
            ));
        }

        if self.min_string_length_to_scrub_with == 0 {
            return Err("min_string_length_to_scrub_with must be at least 1".to_string());
        }

        let tags = [
            ("replacement_text_patient", &self.replacement_text_patient),
            ("replacement_text_thirdparty", &self.replacement_text_thirdparty),
            ("replacement_text_nonspecific", &self.replacement_text_nonspecific),
        ];
        for (name, tag) in &tags {
            if tag.trim().is_empty() {
                return Err(format!("{name} cannot be empty"));
            }
        }
        for (i, (name, tag)) in tags.iter().enumerate() {
            if let Some((other, _)) = tags[i + 1..].iter().find(|(_, t)| t == tag) {
                return Err(format!("{name} and {other} must differ"));
            }
        }

        if self.string_suffixes.iter().any(|s| s.trim().is_empty()) {
            return Err("string_suffixes cannot contain blank entries".to_string());
        }

        if self.allowlist.iter().any(|w| w.trim().is_empty()) {
            return Err("allowlist cannot contain blank entries".to_string());
        }

        for group in &self.alternative_words {
            if group.len() < 2 {
                return Err(format!(
                    "alternative_words group {group:?} must list at least two words"
                ));
            }
            if group.iter().any(|w| w.trim().is_empty()) {
                return Err(format!(
                    "alternative_words group {group:?} contains a blank entry"
                ));
            }
        }

        if self.matcher_cache_capacity == 0 {
            return Err("matcher_cache_capacity must be at least 1".to_string());
        }

        Ok(())
    }

    /// Whether WORDS fragments of `len` characters get fuzzy tolerance
    pub fn fuzzy_budget_for(&self, len: usize) -> u32 {
        if self.string_max_regex_errors > 0 && len >= self.min_string_length_for_errors {
            self.string_max_regex_errors
        } else {
            0
        }
    }

    /// Hex SHA-256 of the settings that influence generated matchers
    ///
    /// Replacement texts and resource limits are excluded: they change what
    /// a match is replaced with, not what matches.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        let shape = (
            self.at_word_boundaries_only_words,
            self.at_word_boundaries_only_dates,
            self.at_word_boundaries_only_numbers,
            self.at_word_boundaries_only_codes,
            self.at_numeric_boundaries_only,
            self.string_max_regex_errors,
            self.min_string_length_for_errors,
            self.min_string_length_to_scrub_with,
            self.allow_no_separator_dates,
            &self.string_suffixes,
            &self.alternative_words,
        );
        hasher.update(format!("{shape:?}").as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Generic rules that are not tied to any patient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonspecificConfig {
    /// Redact anything shaped like a UK postcode
    pub scrub_all_uk_postcodes: bool,

    /// Redact every standalone number with exactly this many digits
    pub scrub_all_numbers_of_n_digits: Vec<usize>,

    /// Redact anything shaped like an e-mail address
    pub scrub_all_email_addresses: bool,

    /// Words always redacted, for every patient
    pub denylist: Vec<String>,
}

impl NonspecificConfig {
    fn validate(&self) -> Result<(), String> {
        for &n in &self.scrub_all_numbers_of_n_digits {
            if n == 0 || n > MAX_NONSPECIFIC_DIGITS {
                return Err(format!(
                    "scrub_all_numbers_of_n_digits entry {n} must be between 1 and {MAX_NONSPECIFIC_DIGITS}"
                ));
            }
        }
        if self.denylist.iter().any(|w| w.trim().is_empty()) {
            return Err("denylist cannot contain blank entries".to_string());
        }
        Ok(())
    }

    /// Whether any generic rule is enabled
    pub fn is_empty(&self) -> bool {
        !self.scrub_all_uk_postcodes
            && self.scrub_all_numbers_of_n_digits.is_empty()
            && !self.scrub_all_email_addresses
            && self.denylist.is_empty()
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("local_path cannot be empty when local_enabled = true".to_string());
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
