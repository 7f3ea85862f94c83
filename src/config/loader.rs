//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ScrubConfig;
use crate::domain::errors::ScrubError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ScrubConfig
/// 4. Applies environment variable overrides (PHISCRUB_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails (including a negative or non-integer fuzzy budget)
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use phiscrub::config::loader::load_config;
///
/// let config = load_config("phiscrub.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ScrubConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ScrubError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ScrubError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Parses configuration from TOML text
///
/// Applies the same substitution, override and validation steps as
/// [`load_config`].
pub fn load_config_from_str(contents: &str) -> Result<ScrubConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ScrubConfig = toml::from_str(&contents)
        .map_err(|e| ScrubError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ScrubError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(ScrubError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Parses an override value, naming the variable on failure
fn parse_override<T: std::str::FromStr>(name: &str, val: &str) -> Result<T> {
    val.trim().parse().map_err(|_| {
        ScrubError::Configuration(format!("Invalid value '{val}' for environment variable {name}"))
    })
}

/// Splits a comma-separated override into trimmed, non-empty items
fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Applies environment variable overrides using PHISCRUB_* prefix
///
/// Environment variables follow the pattern: PHISCRUB_<SECTION>_<KEY>
/// For example: PHISCRUB_SCRUBBER_STRING_MAX_REGEX_ERRORS,
/// PHISCRUB_LOGGING_LOG_LEVEL
fn apply_env_overrides(config: &mut ScrubConfig) -> Result<()> {
    let env = |key: &str| std::env::var(key).ok();

    // Scrubber overrides
    let scrubber = &mut config.scrubber;
    let bools: [(&str, &mut bool); 6] = [
        (
            "PHISCRUB_SCRUBBER_AT_WORD_BOUNDARIES_ONLY_WORDS",
            &mut scrubber.at_word_boundaries_only_words,
        ),
        (
            "PHISCRUB_SCRUBBER_AT_WORD_BOUNDARIES_ONLY_DATES",
            &mut scrubber.at_word_boundaries_only_dates,
        ),
        (
            "PHISCRUB_SCRUBBER_AT_WORD_BOUNDARIES_ONLY_NUMBERS",
            &mut scrubber.at_word_boundaries_only_numbers,
        ),
        (
            "PHISCRUB_SCRUBBER_AT_WORD_BOUNDARIES_ONLY_CODES",
            &mut scrubber.at_word_boundaries_only_codes,
        ),
        (
            "PHISCRUB_SCRUBBER_AT_NUMERIC_BOUNDARIES_ONLY",
            &mut scrubber.at_numeric_boundaries_only,
        ),
        (
            "PHISCRUB_SCRUBBER_ALLOW_NO_SEPARATOR_DATES",
            &mut scrubber.allow_no_separator_dates,
        ),
    ];
    for (name, slot) in bools {
        if let Some(val) = env(name) {
            *slot = parse_override(name, &val)?;
        }
    }

    if let Some(val) = env("PHISCRUB_SCRUBBER_STRING_MAX_REGEX_ERRORS") {
        scrubber.string_max_regex_errors =
            parse_override("PHISCRUB_SCRUBBER_STRING_MAX_REGEX_ERRORS", &val)?;
    }
    if let Some(val) = env("PHISCRUB_SCRUBBER_MIN_STRING_LENGTH_FOR_ERRORS") {
        scrubber.min_string_length_for_errors =
            parse_override("PHISCRUB_SCRUBBER_MIN_STRING_LENGTH_FOR_ERRORS", &val)?;
    }
    if let Some(val) = env("PHISCRUB_SCRUBBER_MIN_STRING_LENGTH_TO_SCRUB_WITH") {
        scrubber.min_string_length_to_scrub_with =
            parse_override("PHISCRUB_SCRUBBER_MIN_STRING_LENGTH_TO_SCRUB_WITH", &val)?;
    }
    if let Some(val) = env("PHISCRUB_SCRUBBER_STRING_SUFFIXES") {
        scrubber.string_suffixes = parse_list(&val);
    }
    if let Some(val) = env("PHISCRUB_SCRUBBER_ALLOWLIST") {
        scrubber.allowlist = parse_list(&val);
    }
    if let Some(val) = env("PHISCRUB_SCRUBBER_REPLACEMENT_TEXT_PATIENT") {
        scrubber.replacement_text_patient = val;
    }
    if let Some(val) = env("PHISCRUB_SCRUBBER_REPLACEMENT_TEXT_THIRDPARTY") {
        scrubber.replacement_text_thirdparty = val;
    }
    if let Some(val) = env("PHISCRUB_SCRUBBER_REPLACEMENT_TEXT_NONSPECIFIC") {
        scrubber.replacement_text_nonspecific = val;
    }
    if let Some(val) = env("PHISCRUB_SCRUBBER_MATCHER_CACHE_CAPACITY") {
        scrubber.matcher_cache_capacity =
            parse_override("PHISCRUB_SCRUBBER_MATCHER_CACHE_CAPACITY", &val)?;
    }
    if let Some(val) = env("PHISCRUB_SCRUBBER_MAX_TEXT_BYTES") {
        scrubber.max_text_bytes = parse_override("PHISCRUB_SCRUBBER_MAX_TEXT_BYTES", &val)?;
    }

    // Nonspecific overrides
    if let Some(val) = env("PHISCRUB_NONSPECIFIC_SCRUB_ALL_UK_POSTCODES") {
        config.nonspecific.scrub_all_uk_postcodes =
            parse_override("PHISCRUB_NONSPECIFIC_SCRUB_ALL_UK_POSTCODES", &val)?;
    }
    if let Some(val) = env("PHISCRUB_NONSPECIFIC_SCRUB_ALL_EMAIL_ADDRESSES") {
        config.nonspecific.scrub_all_email_addresses =
            parse_override("PHISCRUB_NONSPECIFIC_SCRUB_ALL_EMAIL_ADDRESSES", &val)?;
    }
    if let Some(val) = env("PHISCRUB_NONSPECIFIC_SCRUB_ALL_NUMBERS_OF_N_DIGITS") {
        config.nonspecific.scrub_all_numbers_of_n_digits = parse_list(&val)
            .iter()
            .map(|n| parse_override("PHISCRUB_NONSPECIFIC_SCRUB_ALL_NUMBERS_OF_N_DIGITS", n))
            .collect::<Result<Vec<usize>>>()?;
    }
    if let Some(val) = env("PHISCRUB_NONSPECIFIC_DENYLIST") {
        config.nonspecific.denylist = parse_list(&val);
    }

    // Logging overrides
    if let Some(val) = env("PHISCRUB_LOGGING_LOG_LEVEL") {
        config.logging.log_level = val;
    }
    if let Some(val) = env("PHISCRUB_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("PHISCRUB_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = env("PHISCRUB_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("PHISCRUB_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("PHISCRUB_TEST_TAG_VAR", "[X]");
        let input = "replacement_text_patient = \"${PHISCRUB_TEST_TAG_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "replacement_text_patient = \"[X]\"");
        std::env::remove_var("PHISCRUB_TEST_TAG_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("PHISCRUB_TEST_MISSING_VAR");
        let input = "allowlist = [\"${PHISCRUB_TEST_MISSING_VAR}\"]";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("PHISCRUB_TEST_COMMENTED_VAR");
        let input = "# uses ${PHISCRUB_TEST_COMMENTED_VAR}\nmax_text_bytes = 10";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("s, es ,,"), vec!["s".to_string(), "es".to_string()]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-phiscrub.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[scrubber]
string_max_regex_errors = 1
at_word_boundaries_only_words = true
string_suffixes = ["s", "es"]
alternative_words = [["street", "st"], ["road", "rd"]]

[nonspecific]
scrub_all_uk_postcodes = true
scrub_all_numbers_of_n_digits = [10]

[logging]
log_level = "debug"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.scrubber.string_max_regex_errors, 1);
        assert!(config.scrubber.at_word_boundaries_only_words);
        assert_eq!(config.scrubber.alternative_words.len(), 2);
        assert!(config.nonspecific.scrub_all_uk_postcodes);
        assert_eq!(config.logging.log_level, "debug");
        // Unspecified fields keep their defaults
        assert_eq!(config.scrubber.replacement_text_patient, "[__PPP__]");
    }

    #[test]
    fn test_negative_fuzzy_budget_rejected() {
        let result = load_config_from_str("[scrubber]\nstring_max_regex_errors = -1\n");
        assert!(matches!(result, Err(ScrubError::Configuration(_))));
    }

    #[test]
    fn test_non_integer_fuzzy_budget_rejected() {
        let result = load_config_from_str("[scrubber]\nstring_max_regex_errors = \"two\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_fuzzy_budget_rejected() {
        let err = load_config_from_str("[scrubber]\nstring_max_regex_errors = 7\n").unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, ScrubConfig::default());
    }
}
