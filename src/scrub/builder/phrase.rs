//! PHRASE: the whole value matched as one unit

use crate::config::ScrubberConfig;
use crate::domain::{Result, ScrubError, ScrubMethod};
use crate::scrub::fragment::{Fragment, Separator};

/// Builds the PHRASE fragment
///
/// Words are joined by flexible separators, so `"10 High St"` also matches
/// `"10, High St."`. A word listed in an `alternative_words` group matches
/// any word of its group. The last word may carry a configured suffix.
pub fn build(normalised: &str, config: &ScrubberConfig) -> Result<Fragment> {
    let words: Vec<&str> = normalised
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return Err(ScrubError::invalid_value(
            ScrubMethod::Phrase,
            "no words after normalisation",
        ));
    }

    let mut sequence = Vec::with_capacity(words.len() * 2 + 1);
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            sequence.push(Fragment::Separator(Separator::Flexible));
        }
        sequence.push(word_fragment(word, &config.alternative_words));
    }

    let suffixes: Vec<Fragment> = config
        .string_suffixes
        .iter()
        .map(|s| Fragment::Literal(s.to_lowercase()))
        .collect();
    if !suffixes.is_empty() {
        sequence.push(Fragment::Optional(Box::new(Fragment::Alternation(suffixes))));
    }

    Ok(Fragment::Sequence(sequence))
}

fn word_fragment(word: &str, alternative_words: &[Vec<String>]) -> Fragment {
    let group = alternative_words
        .iter()
        .find(|group| group.iter().any(|w| w.trim().eq_ignore_ascii_case(word)));

    match group {
        Some(group) => {
            let mut options: Vec<String> = group.iter().map(|w| w.trim().to_lowercase()).collect();
            options.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            options.dedup();
            Fragment::Alternation(options.into_iter().map(Fragment::Literal).collect())
        }
        None => Fragment::Literal(word.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrub::matcher::{Boundary, CompiledMatcher};

    fn matcher(value: &str, config: &ScrubberConfig) -> CompiledMatcher {
        CompiledMatcher::compile(build(value, config).unwrap(), Boundary::Word).unwrap()
    }

    #[test]
    fn test_flexible_separators() {
        let m = matcher("10 high street", &ScrubberConfig::default());
        assert!(m.is_match("lives at 10, High  Street."));
        assert!(m.is_match("10-HIGH-STREET"));
        assert!(!m.is_match("10 High Road"));
    }

    #[test]
    fn test_alternative_words() {
        let config = ScrubberConfig {
            alternative_words: vec![vec!["Street".to_string(), "St".to_string()]],
            ..Default::default()
        };
        let m = matcher("10 high street", &config);
        assert!(m.is_match("10 High St."));
        assert!(m.is_match("10 High Street"));
    }

    #[test]
    fn test_words_must_appear_together() {
        let m = matcher("mill road", &ScrubberConfig::default());
        assert!(!m.is_match("the mill by the road"));
    }

    #[test]
    fn test_punctuation_only_rejected() {
        assert!(build("--", &ScrubberConfig::default()).is_err());
    }
}
