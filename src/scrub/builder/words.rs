//! WORDS: each word of the value matched on its own

use crate::config::ScrubberConfig;
use crate::domain::{Result, ScrubError, ScrubMethod};
use crate::scrub::fragment::Fragment;

/// Splits a normalised value into the fragments worth matching
///
/// Tokens are split on whitespace; a token with internal punctuation also
/// contributes its parts (`smith-jones` gives `smith-jones`, `smith` and
/// `jones`). Fragments shorter than `min_length` characters are dropped.
/// Longer fragments come first so that they win over their own parts.
pub fn fragments(normalised: &str, min_length: usize) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut push = |s: &str| {
        if !s.is_empty() && !found.iter().any(|f| f == s) {
            found.push(s.to_string());
        }
    };

    for token in normalised.split_whitespace() {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        push(token);
        if token.chars().any(|c| !c.is_alphanumeric()) {
            for part in token.split(|c: char| !c.is_alphanumeric()) {
                push(part);
            }
        }
    }

    found.retain(|f| f.chars().count() >= min_length);
    found.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    found
}

/// Builds the WORDS fragment: an alternation of (possibly fuzzy) words
pub fn build(normalised: &str, config: &ScrubberConfig) -> Result<Fragment> {
    let words = fragments(normalised, config.min_string_length_to_scrub_with);
    if words.is_empty() {
        return Err(ScrubError::invalid_value(
            ScrubMethod::Words,
            format!(
                "no word has at least {} characters",
                config.min_string_length_to_scrub_with
            ),
        ));
    }

    let alternatives = words
        .into_iter()
        .map(|word| Fragment::FuzzyWord {
            max_errors: config.fuzzy_budget_for(word.chars().count()),
            suffixes: config.string_suffixes.clone(),
            word,
        })
        .collect();
    Ok(Fragment::Alternation(alternatives))
}
