//! Bounded edit-distance matching
//!
//! [`FuzzyMatcher`] finds substrings within `k` insertions, deletions or
//! substitutions of a word. It simulates a Levenshtein automaton one text
//! character at a time as a single row of the edit-distance table, so the
//! work per candidate start is bounded by `(m + k) * m` for a word of `m`
//! characters, whatever the input.
//!
//! Matching is greedy and left to right: at each candidate start the longest
//! acceptable end is taken, and the search resumes after it. A consequence is
//! that a fuzzy word may consume part of a neighbouring distinct word
//! ("Ronald" matching the "Donald" of "MacDonald"); overlap resolution in the
//! engine only mitigates this when the neighbouring word has its own rule.

use super::matcher::Boundary;
use crate::domain::{Result, ScrubError};
use std::ops::Range;

/// Case-folded character with its byte offset in the original text
#[derive(Debug, Clone, Copy)]
struct FoldedChar {
    offset: usize,
    ch: char,
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Edit-distance matcher for one word
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    pattern: Vec<char>,
    max_errors: usize,
    /// Folded suffixes, longest first
    suffixes: Vec<Vec<char>>,
}

impl FuzzyMatcher {
    /// Creates a matcher for `word` tolerating `max_errors` edits
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` if the word is empty or the budget is at
    /// least the word's length (the matcher could then accept any text).
    pub fn new(word: &str, max_errors: u32, suffixes: &[String]) -> Result<Self> {
        let pattern: Vec<char> = word.chars().map(fold).collect();
        let max_errors = max_errors as usize;
        if pattern.is_empty() {
            return Err(ScrubError::PatternCompilation(
                "fuzzy word is empty".to_string(),
            ));
        }
        if max_errors >= pattern.len() {
            return Err(ScrubError::PatternCompilation(format!(
                "edit budget {max_errors} is not smaller than the word length {}",
                pattern.len()
            )));
        }

        let mut suffixes: Vec<Vec<char>> = suffixes
            .iter()
            .map(|s| s.chars().map(fold).collect::<Vec<char>>())
            .filter(|s| !s.is_empty())
            .collect();
        suffixes.sort_by(|a, b| b.len().cmp(&a.len()));

        Ok(Self {
            pattern,
            max_errors,
            suffixes,
        })
    }

    /// Maximum number of edits tolerated
    pub fn max_errors(&self) -> u32 {
        self.max_errors as u32
    }

    /// Finds non-overlapping matches as byte ranges, left to right
    pub fn find_spans(&self, text: &str, boundary: Boundary) -> Vec<Range<usize>> {
        let chars: Vec<FoldedChar> = text
            .char_indices()
            .map(|(offset, c)| FoldedChar { offset, ch: fold(c) })
            .collect();
        let byte_at = |i: usize| chars.get(i).map_or(text.len(), |c| c.offset);

        let mut spans = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let prev = start.checked_sub(1).map(|i| chars[i].ch);
            if !chars[start].ch.is_alphanumeric() || !boundary.allows(prev) {
                start += 1;
                continue;
            }
            match self.longest_match_from(&chars, start, boundary) {
                Some(end) => {
                    spans.push(byte_at(start)..byte_at(end));
                    start = end;
                }
                None => start += 1,
            }
        }
        spans
    }

    /// Longest acceptable end (exclusive, in characters) for a match at `start`
    fn longest_match_from(
        &self,
        chars: &[FoldedChar],
        start: usize,
        boundary: Boundary,
    ) -> Option<usize> {
        let m = self.pattern.len();
        let k = self.max_errors;
        let limit = (start + m + k).min(chars.len());

        let mut row: Vec<usize> = (0..=m).collect();
        let mut next = vec![0; m + 1];
        let mut best = None;

        for t in start..limit {
            let c = chars[t].ch;
            next[0] = t - start + 1;
            for j in 1..=m {
                let substitution = row[j - 1] + usize::from(self.pattern[j - 1] != c);
                next[j] = (row[j] + 1).min(next[j - 1] + 1).min(substitution);
            }
            std::mem::swap(&mut row, &mut next);

            if row[m] <= k && c.is_alphanumeric() {
                if let Some(end) = self.accept_end(chars, t + 1, boundary) {
                    best = best.max(Some(end));
                }
            }
            if row.iter().all(|&d| d > k) {
                break;
            }
        }
        best
    }

    /// Extends `end` over a suffix where possible and checks the boundary
    fn accept_end(&self, chars: &[FoldedChar], end: usize, boundary: Boundary) -> Option<usize> {
        let next_char = |i: usize| chars.get(i).map(|c| c.ch);
        for suffix in &self.suffixes {
            let stop = end + suffix.len();
            if stop <= chars.len()
                && chars[end..stop].iter().map(|c| c.ch).eq(suffix.iter().copied())
                && boundary.allows(next_char(stop))
            {
                return Some(stop);
            }
        }
        boundary.allows(next_char(end)).then_some(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched<'a>(text: &'a str, spans: &[Range<usize>]) -> Vec<&'a str> {
        spans.iter().map(|r| &text[r.clone()]).collect()
    }

    #[test]
    fn test_exact_match_with_zero_budget() {
        let matcher = FuzzyMatcher::new("ronald", 0, &[]).unwrap();
        let text = "Ronald and RONALD but not Ronold";
        let spans = matcher.find_spans(text, Boundary::None);
        assert_eq!(matched(text, &spans), vec!["Ronald", "RONALD"]);
    }

    #[test]
    fn test_single_substitution() {
        let matcher = FuzzyMatcher::new("ronald", 1, &[]).unwrap();
        let text = "seen by Ronold today";
        let spans = matcher.find_spans(text, Boundary::Word);
        assert_eq!(matched(text, &spans), vec!["Ronold"]);
    }

    #[test]
    fn test_insertion_and_deletion() {
        let matcher = FuzzyMatcher::new("macdonald", 1, &[]).unwrap();
        let text = "MacDonnald, McDonald";
        let spans = matcher.find_spans(text, Boundary::Word);
        assert_eq!(matched(text, &spans), vec!["MacDonnald", "McDonald"]);
    }

    #[test]
    fn test_budget_exceeded() {
        let matcher = FuzzyMatcher::new("ronald", 1, &[]).unwrap();
        assert!(matcher
            .find_spans("Rolnad attended", Boundary::Word)
            .is_empty());
    }

    #[test]
    fn test_word_boundary_blocks_embedded_match() {
        let matcher = FuzzyMatcher::new("ronald", 1, &[]).unwrap();
        assert!(matcher.find_spans("MacDonald", Boundary::Word).is_empty());
        let spans = matcher.find_spans("MacDonald", Boundary::None);
        assert_eq!(matched("MacDonald", &spans), vec!["Donald"]);
    }

    #[test]
    fn test_suffix_extension() {
        let matcher = FuzzyMatcher::new("smith", 1, &["s".to_string()]).unwrap();
        let text = "the Smiths' house";
        let spans = matcher.find_spans(text, Boundary::Word);
        assert_eq!(matched(text, &spans), vec!["Smiths"]);
    }

    #[test]
    fn test_match_never_ends_on_punctuation() {
        let matcher = FuzzyMatcher::new("ronald", 1, &[]).unwrap();
        let text = "Ronald.";
        let spans = matcher.find_spans(text, Boundary::None);
        assert_eq!(matched(text, &spans), vec!["Ronald"]);
    }

    #[test]
    fn test_multibyte_offsets() {
        let matcher = FuzzyMatcher::new("zoe", 0, &[]).unwrap();
        let text = "café zoe";
        let spans = matcher.find_spans(text, Boundary::Word);
        assert_eq!(matched(text, &spans), vec!["zoe"]);
    }

    #[test]
    fn test_budget_must_be_below_word_length() {
        assert!(FuzzyMatcher::new("ab", 2, &[]).is_err());
        assert!(FuzzyMatcher::new("", 0, &[]).is_err());
        assert!(FuzzyMatcher::new("abc", 2, &[]).is_ok());
    }
}
