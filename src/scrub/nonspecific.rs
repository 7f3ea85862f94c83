//! Generic rules not tied to any patient
//!
//! These catch identifiers whose shape alone is identifying: any UK
//! postcode, any standalone number of a given length (NHS numbers,
//! telephone numbers), any e-mail address, and configured denylist words.
//! They are built once and shared by every patient's scrubber, and rank
//! below patient and third-party rules when matches overlap.

use super::fragment::{CharClass, Fragment};
use super::matcher::{Boundary, CompiledMatcher};
use super::rule::{RuleSource, ScrubberRule};
use crate::config::NonspecificConfig;
use crate::domain::Result;
use sha2::{Digest, Sha256};
use std::sync::Arc;

fn class(class: CharClass, min: usize, max: Option<usize>) -> Fragment {
    Fragment::Class { class, min, max }
}

/// Any UK postcode, with or without the space
pub fn uk_postcode_fragment() -> Fragment {
    Fragment::Sequence(vec![
        class(CharClass::AsciiLetter, 1, Some(2)),
        class(CharClass::Digit, 1, Some(1)),
        Fragment::Optional(Box::new(class(CharClass::AsciiAlnum, 1, Some(1)))),
        class(CharClass::Whitespace, 0, Some(2)),
        class(CharClass::Digit, 1, Some(1)),
        class(CharClass::AsciiLetter, 2, Some(2)),
    ])
}

/// Exactly `n` consecutive digits
pub fn digits_fragment(n: usize) -> Fragment {
    class(CharClass::Digit, n, Some(n))
}

/// Any e-mail address
pub fn email_fragment() -> Fragment {
    Fragment::Sequence(vec![
        class(CharClass::EmailLocal, 1, None),
        Fragment::Literal("@".to_string()),
        class(CharClass::EmailDomain, 1, None),
        Fragment::Literal(".".to_string()),
        class(CharClass::AsciiLetter, 2, None),
    ])
}

/// Denylist words, each matched whole
pub fn denylist_fragment(words: &[String]) -> Option<Fragment> {
    let mut words: Vec<String> = words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();
    Some(Fragment::Alternation(
        words.into_iter().map(Fragment::Literal).collect(),
    ))
}

/// Shared generic rules plus a digest of the settings that produced them
#[derive(Debug, Clone, Default)]
pub struct NonspecificRules {
    rules: Arc<Vec<ScrubberRule>>,
    signature: String,
}

impl NonspecificRules {
    /// Compiles the generic rules enabled in `config`
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` if a generated pattern fails to compile.
    pub fn build(config: &NonspecificConfig, replacement_tag: &str) -> Result<Self> {
        let mut matchers: Vec<(Fragment, Boundary)> = Vec::new();

        if config.scrub_all_uk_postcodes {
            matchers.push((uk_postcode_fragment(), Boundary::Word));
        }
        let mut lengths = config.scrub_all_numbers_of_n_digits.clone();
        lengths.sort_unstable();
        lengths.dedup();
        for n in lengths {
            matchers.push((digits_fragment(n), Boundary::Numeric));
        }
        if config.scrub_all_email_addresses {
            matchers.push((email_fragment(), Boundary::None));
        }
        if let Some(fragment) = denylist_fragment(&config.denylist) {
            matchers.push((fragment, Boundary::Word));
        }

        let rules = matchers
            .into_iter()
            .map(|(fragment, boundary)| {
                let matcher = CompiledMatcher::compile(fragment, boundary)?;
                Ok(ScrubberRule::new(
                    RuleSource::Nonspecific,
                    replacement_tag,
                    Arc::new(matcher),
                    1,
                    0,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(rule_count = rules.len(), "Built nonspecific rules");

        Ok(Self {
            rules: Arc::new(rules),
            signature: Self::digest(config)?,
        })
    }

    /// An empty rule set
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[ScrubberRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Digest of the configuration the rules were built from (empty if none)
    pub fn signature(&self) -> &str {
        &self.signature
    }

    fn digest(config: &NonspecificConfig) -> Result<String> {
        if config.is_empty() {
            return Ok(String::new());
        }
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(config)?);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(rules: &NonspecificRules, text: &str) -> Vec<String> {
        let mut found: Vec<String> = rules
            .rules()
            .iter()
            .flat_map(|r| r.find_spans(text))
            .map(|r| text[r].to_string())
            .collect();
        found.sort();
        found
    }

    #[test]
    fn test_empty_config_builds_no_rules() {
        let rules = NonspecificRules::build(&NonspecificConfig::default(), "[~~~]").unwrap();
        assert!(rules.is_empty());
        assert_eq!(rules.signature(), "");
    }

    #[test]
    fn test_uk_postcodes() {
        let config = NonspecificConfig {
            scrub_all_uk_postcodes: true,
            ..Default::default()
        };
        let rules = NonspecificRules::build(&config, "[~~~]").unwrap();
        assert_eq!(
            matched(&rules, "from CB2 0QQ to w1a1aa, not AB12"),
            vec!["CB2 0QQ", "w1a1aa"]
        );
    }

    #[test]
    fn test_numbers_of_n_digits() {
        let config = NonspecificConfig {
            scrub_all_numbers_of_n_digits: vec![10],
            ..Default::default()
        };
        let rules = NonspecificRules::build(&config, "[~~~]").unwrap();
        assert_eq!(
            matched(&rules, "NHS 4505577104, ref 12345678901, id 123"),
            vec!["4505577104"]
        );
    }

    #[test]
    fn test_email_addresses() {
        let config = NonspecificConfig {
            scrub_all_email_addresses: true,
            ..Default::default()
        };
        let rules = NonspecificRules::build(&config, "[~~~]").unwrap();
        assert_eq!(
            matched(&rules, "mail r.mac@example.co.uk today"),
            vec!["r.mac@example.co.uk"]
        );
    }

    #[test]
    fn test_denylist_words() {
        let config = NonspecificConfig {
            denylist: vec!["Addenbrooke".to_string()],
            ..Default::default()
        };
        let rules = NonspecificRules::build(&config, "[~~~]").unwrap();
        assert_eq!(
            matched(&rules, "seen at Addenbrooke today"),
            vec!["Addenbrooke"]
        );
        assert_eq!(rules.rules()[0].source(), RuleSource::Nonspecific);
        assert_ne!(rules.signature(), "");
    }
}
