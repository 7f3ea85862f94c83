//! Pattern construction from identifier values
//!
//! [`build`] turns one [`IdentifierValue`] into a [`Blueprint`]: its rule
//! key, the [`Fragment`] describing every tolerated surface form, and the
//! boundary policy and limits to compile it with. Each scrub method has its
//! own submodule:
//!
//! - [`words`] - each word matched separately, optionally fuzzy
//! - [`phrase`] - the whole value as one flexible multi-word unit
//! - [`numeric`] - the digits, whatever separates them
//! - [`date`] - every common textual representation of the calendar date
//! - [`code`] - alphanumeric codes, with partial UK postcodes
//!
//! # Examples
//!
//! ```
//! use phiscrub::config::ScrubberConfig;
//! use phiscrub::domain::{IdentifierValue, ScrubMethod};
//! use phiscrub::scrub::builder;
//!
//! let config = ScrubberConfig::default();
//! let value = IdentifierValue::patient("0122312 3456", ScrubMethod::Numeric);
//! let blueprint = builder::build(&value, &config).unwrap();
//! assert_eq!(blueprint.key.value, "01223123456");
//!
//! let matcher = blueprint.compile().unwrap();
//! assert!(matcher.is_match("call (01223) 123456"));
//! ```

pub mod code;
pub mod date;
pub mod numeric;
pub mod phrase;
pub mod words;

use super::fragment::Fragment;
use super::matcher::{Boundary, CompiledMatcher};
use super::rule::RuleKey;
use crate::config::ScrubberConfig;
use crate::domain::{IdentifierValue, RawValue, Result, ScrubError, ScrubMethod};

/// Everything needed to compile one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    pub key: RuleKey,
    pub fragment: Fragment,
    pub boundary: Boundary,
    pub fuzzy_error_budget: u32,
    pub min_length_to_apply: usize,
}

impl Blueprint {
    /// Compiles the fragment under the blueprint's boundary policy
    pub fn compile(&self) -> Result<CompiledMatcher> {
        CompiledMatcher::compile(self.fragment.clone(), self.boundary)
    }
}

/// Builds the blueprint for one identifier value
///
/// # Errors
///
/// Returns `InvalidIdentifierValue` if the value is blank, unparseable or
/// too short after normalisation.
pub fn build(value: &IdentifierValue, config: &ScrubberConfig) -> Result<Blueprint> {
    let method = value.scrub_method;
    let normalised = normalise(&value.value, method)?;

    if method != ScrubMethod::Words && method != ScrubMethod::Date {
        let significant = normalised.chars().filter(|c| c.is_alphanumeric()).count();
        if significant < config.min_string_length_to_scrub_with {
            return Err(ScrubError::invalid_value(
                method,
                format!(
                    "{significant} significant characters, below min_string_length_to_scrub_with ({})",
                    config.min_string_length_to_scrub_with
                ),
            ));
        }
    }

    let fragment = match method {
        ScrubMethod::Words => words::build(&normalised, config)?,
        ScrubMethod::Phrase => phrase::build(&normalised, config)?,
        ScrubMethod::Numeric => numeric::build(&normalised),
        ScrubMethod::Date => date::build(&normalised, config)?,
        ScrubMethod::Code => code::build(&normalised),
    };

    Ok(Blueprint {
        fuzzy_error_budget: max_errors(&fragment),
        boundary: boundary_for(method, config),
        min_length_to_apply: config.min_string_length_to_scrub_with,
        key: RuleKey::new(method, normalised),
        fragment,
    })
}

/// Canonical form of a raw value for a scrub method
///
/// - WORDS, PHRASE: whitespace collapsed, lowercased
/// - NUMERIC: digits only
/// - DATE: `YYYY-MM-DD`
/// - CODE: letters and digits only, uppercased
///
/// # Errors
///
/// Returns `InvalidIdentifierValue` if nothing usable remains.
pub fn normalise(value: &RawValue, method: ScrubMethod) -> Result<String> {
    let normalised = match method {
        ScrubMethod::Words | ScrubMethod::Phrase => {
            let text = collapse_whitespace(&value.to_text()).to_lowercase();
            if !text.chars().any(char::is_alphanumeric) {
                return Err(ScrubError::invalid_value(method, "blank after normalisation"));
            }
            text
        }
        ScrubMethod::Numeric => {
            let digits: String = match value {
                RawValue::Integer(n) => n.unsigned_abs().to_string(),
                other => other.to_text().chars().filter(char::is_ascii_digit).collect(),
            };
            if digits.is_empty() {
                return Err(ScrubError::invalid_value(method, "no digits"));
            }
            digits
        }
        ScrubMethod::Date => {
            let parsed = match value {
                RawValue::Date(d) => Some(*d),
                other => date::parse_date_text(&other.to_text()),
            };
            parsed
                .ok_or_else(|| ScrubError::invalid_value(method, "not a recognisable date"))?
                .format("%Y-%m-%d")
                .to_string()
        }
        ScrubMethod::Code => {
            let code: String = value
                .to_text()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_uppercase)
                .collect();
            if code.is_empty() {
                return Err(ScrubError::invalid_value(method, "no letters or digits"));
            }
            code
        }
    };
    Ok(normalised)
}

/// Boundary policy configured for a scrub method
pub fn boundary_for(method: ScrubMethod, config: &ScrubberConfig) -> Boundary {
    let numeric_or_none = if config.at_numeric_boundaries_only {
        Boundary::Numeric
    } else {
        Boundary::None
    };
    match method {
        ScrubMethod::Words | ScrubMethod::Phrase if config.at_word_boundaries_only_words => {
            Boundary::Word
        }
        ScrubMethod::Words | ScrubMethod::Phrase => Boundary::None,
        ScrubMethod::Numeric if config.at_word_boundaries_only_numbers => Boundary::Word,
        ScrubMethod::Date if config.at_word_boundaries_only_dates => Boundary::Word,
        ScrubMethod::Numeric | ScrubMethod::Date => numeric_or_none,
        ScrubMethod::Code if config.at_word_boundaries_only_codes => Boundary::Word,
        ScrubMethod::Code => Boundary::None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn max_errors(fragment: &Fragment) -> u32 {
    match fragment {
        Fragment::FuzzyWord { max_errors, .. } => *max_errors,
        Fragment::Alternation(items) | Fragment::Sequence(items) => {
            items.iter().map(max_errors).max().unwrap_or(0)
        }
        Fragment::Optional(inner) => max_errors(inner),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_normalise_words_collapses_and_lowercases() {
        let raw = RawValue::from("  Ronald \t MacDonald ");
        assert_eq!(
            normalise(&raw, ScrubMethod::Words).unwrap(),
            "ronald macdonald"
        );
    }

    #[test]
    fn test_normalise_rejects_blank_values() {
        for method in [ScrubMethod::Words, ScrubMethod::Phrase, ScrubMethod::Code] {
            let err = normalise(&RawValue::from("  -  "), method).unwrap_err();
            assert!(matches!(err, ScrubError::InvalidIdentifierValue { .. }));
        }
        assert!(normalise(&RawValue::from("n/a"), ScrubMethod::Numeric).is_err());
        assert!(normalise(&RawValue::from("someday"), ScrubMethod::Date).is_err());
    }

    #[test]
    fn test_normalise_numeric_forms() {
        assert_eq!(
            normalise(&RawValue::from("0122312 3456"), ScrubMethod::Numeric).unwrap(),
            "01223123456"
        );
        assert_eq!(
            normalise(&RawValue::Integer(-42), ScrubMethod::Numeric).unwrap(),
            "42"
        );
    }

    #[test]
    fn test_normalise_dates_from_any_raw_form() {
        let date = NaiveDate::from_ymd_opt(1911, 11, 11).unwrap();
        for raw in [
            RawValue::Date(date),
            RawValue::from("11 November 1911"),
            RawValue::Integer(19111111),
        ] {
            assert_eq!(normalise(&raw, ScrubMethod::Date).unwrap(), "1911-11-11");
        }
    }

    #[test]
    fn test_normalise_code() {
        assert_eq!(
            normalise(&RawValue::from("cb2 0qq"), ScrubMethod::Code).unwrap(),
            "CB20QQ"
        );
    }

    #[test]
    fn test_short_numbers_rejected() {
        let config = ScrubberConfig {
            min_string_length_to_scrub_with: 3,
            ..Default::default()
        };
        let value = IdentifierValue::patient("42", ScrubMethod::Numeric);
        assert!(build(&value, &config).is_err());
    }

    #[test]
    fn test_boundary_policies() {
        let config = ScrubberConfig::default();
        assert_eq!(boundary_for(ScrubMethod::Words, &config), Boundary::None);
        assert_eq!(boundary_for(ScrubMethod::Numeric, &config), Boundary::Numeric);
        assert_eq!(boundary_for(ScrubMethod::Date, &config), Boundary::Numeric);
        assert_eq!(boundary_for(ScrubMethod::Code, &config), Boundary::Word);

        let strict = ScrubberConfig {
            at_word_boundaries_only_words: true,
            at_word_boundaries_only_dates: true,
            at_numeric_boundaries_only: false,
            ..Default::default()
        };
        assert_eq!(boundary_for(ScrubMethod::Phrase, &strict), Boundary::Word);
        assert_eq!(boundary_for(ScrubMethod::Date, &strict), Boundary::Word);
        assert_eq!(boundary_for(ScrubMethod::Numeric, &strict), Boundary::None);
    }

    #[test]
    fn test_blueprint_records_fuzzy_budget() {
        let config = ScrubberConfig {
            string_max_regex_errors: 1,
            ..Default::default()
        };
        let value = IdentifierValue::patient("Ron MacDonald", ScrubMethod::Words);
        let blueprint = build(&value, &config).unwrap();
        assert_eq!(blueprint.fuzzy_error_budget, 1);
        assert_eq!(blueprint.key, RuleKey::new(ScrubMethod::Words, "ron macdonald"));
    }
}
