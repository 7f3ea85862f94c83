//! Compiled matchers
//!
//! A [`CompiledMatcher`] is the executable form of a [`Fragment`]. Exact
//! alternatives are compiled into one case-insensitive regex (the `regex`
//! crate guarantees linear-time search); fuzzy words become
//! [`FuzzyMatcher`]s. Boundary policies are checked on each candidate match,
//! since the regex engine has no look-around. A candidate the boundary
//! rejects is retried at the same start with shorter ends, so `1911-11-11`
//! is still found in `1911-11-11 10:20am` when the time cannot be taken.

use super::fragment::Fragment;
use super::fuzzy::FuzzyMatcher;
use crate::domain::{Result, ScrubError};
use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// Upper bound on the compiled size of a single generated regex
const REGEX_SIZE_LIMIT: usize = 32 * (1 << 20);

/// What may sit immediately before and after a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Boundary {
    /// Anything
    #[default]
    None,
    /// No letter or digit
    Word,
    /// No digit
    Numeric,
}

impl Boundary {
    /// Whether `neighbour` (the character next to a match, if any) is acceptable
    pub fn allows(self, neighbour: Option<char>) -> bool {
        match (self, neighbour) {
            (_, None) | (Self::None, _) => true,
            (Self::Word, Some(c)) => !c.is_alphanumeric(),
            (Self::Numeric, Some(c)) => !c.is_numeric(),
        }
    }

    /// Checks both sides of the byte range `start..end` of `text`
    pub fn accepts(self, text: &str, start: usize, end: usize) -> bool {
        self.allows(text[..start].chars().next_back()) && self.allows(text[end..].chars().next())
    }
}

#[derive(Debug, Clone)]
enum MatcherPart {
    Regex(RegexPart),
    Fuzzy(FuzzyMatcher),
}

/// A searching regex plus an anchored copy for testing shorter candidates
#[derive(Debug, Clone)]
struct RegexPart {
    search: Regex,
    whole: Regex,
}

impl RegexPart {
    fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            search: build_regex(pattern)?,
            whole: build_regex(&format!("^(?:{pattern})$"))?,
        })
    }
}

fn build_regex(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()?)
}

/// Executable matcher for one rule
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    parts: Vec<MatcherPart>,
    boundary: Boundary,
}

impl CompiledMatcher {
    /// Compiles a fragment under a boundary policy
    ///
    /// Top-level fuzzy words are split out for the edit-distance automaton;
    /// everything else is rendered into a single regex.
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` if the fragment is empty, could match the
    /// empty string, or the generated regex fails to compile.
    pub fn compile(fragment: Fragment, boundary: Boundary) -> Result<Self> {
        let (fuzzy, exact): (Vec<Fragment>, Vec<Fragment>) = fragment
            .into_alternatives()
            .into_iter()
            .partition(Fragment::is_fuzzy);

        let mut parts = Vec::with_capacity(fuzzy.len() + 1);

        if !exact.is_empty() {
            let mut exact = exact;
            let exact = if exact.len() == 1 {
                exact.remove(0)
            } else {
                Fragment::Alternation(exact)
            };
            let pattern = exact.to_regex()?;
            parts.push(MatcherPart::Regex(RegexPart::new(&pattern)?));
        }

        for word in fuzzy {
            if let Fragment::FuzzyWord {
                word,
                max_errors,
                suffixes,
            } = word
            {
                parts.push(MatcherPart::Fuzzy(FuzzyMatcher::new(
                    &word, max_errors, &suffixes,
                )?));
            }
        }

        if parts.is_empty() {
            return Err(ScrubError::PatternCompilation(
                "matcher has no alternatives".to_string(),
            ));
        }

        Ok(Self { parts, boundary })
    }

    /// Boundary policy applied to every match
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Number of independently searched parts
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Whether any part tolerates edits
    pub fn is_fuzzy(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, MatcherPart::Fuzzy(_)))
    }

    /// All non-empty match spans as byte ranges
    ///
    /// Spans from one part never overlap each other; spans from different
    /// parts may.
    pub fn find_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        for part in &self.parts {
            match part {
                MatcherPart::Regex(regex) => self.regex_spans(regex, text, &mut spans),
                MatcherPart::Fuzzy(fuzzy) => spans.extend(fuzzy.find_spans(text, self.boundary)),
            }
        }
        spans
    }

    /// Whether the matcher finds anything in `text`
    pub fn is_match(&self, text: &str) -> bool {
        !self.find_spans(text).is_empty()
    }

    fn regex_spans(&self, part: &RegexPart, text: &str, spans: &mut Vec<Range<usize>>) {
        let mut pos = 0;
        while pos <= text.len() {
            let Some(m) = part.search.find_at(text, pos) else {
                break;
            };
            if m.is_empty() {
                pos = next_char_boundary(text, m.end());
            } else if self.boundary.accepts(text, m.start(), m.end()) {
                spans.push(m.range());
                pos = m.end();
            } else if let Some(end) = self.shorter_end(part, text, m.start(), m.end()) {
                spans.push(m.start()..end);
                pos = end;
            } else {
                pos = next_char_boundary(text, m.start());
            }
        }
    }

    /// Longest end before `end` giving a whole match the boundary accepts
    fn shorter_end(&self, part: &RegexPart, text: &str, start: usize, end: usize) -> Option<usize> {
        if !self.boundary.allows(text[..start].chars().next_back()) {
            return None;
        }
        text[start..end]
            .char_indices()
            .skip(1)
            .map(|(i, _)| start + i)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .find(|&stop| {
                self.boundary.allows(text[stop..].chars().next())
                    && part.whole.is_match(&text[start..stop])
            })
    }
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    pos + text[pos..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrub::fragment::Separator;

    fn word(w: &str, max_errors: u32) -> Fragment {
        Fragment::FuzzyWord {
            word: w.to_string(),
            max_errors,
            suffixes: vec![],
        }
    }

    fn matched<'a>(text: &'a str, matcher: &CompiledMatcher) -> Vec<&'a str> {
        matcher
            .find_spans(text)
            .into_iter()
            .map(|r| &text[r])
            .collect()
    }

    #[test]
    fn test_boundary_allows() {
        assert!(Boundary::Word.allows(Some(' ')));
        assert!(!Boundary::Word.allows(Some('x')));
        assert!(Boundary::Numeric.allows(Some('x')));
        assert!(!Boundary::Numeric.allows(Some('7')));
        assert!(Boundary::Numeric.allows(None));
        assert!(Boundary::None.allows(Some('7')));
    }

    #[test]
    fn test_regex_part_is_case_insensitive() {
        let matcher = CompiledMatcher::compile(word("smith", 0), Boundary::Word).unwrap();
        assert_eq!(matched("SMITH and Smith", &matcher), vec!["SMITH", "Smith"]);
        assert!(!matcher.is_fuzzy());
    }

    #[test]
    fn test_word_boundary_filters_embedded_matches() {
        let matcher = CompiledMatcher::compile(word("ann", 0), Boundary::Word).unwrap();
        assert_eq!(matched("Annual review for Ann.", &matcher), vec!["Ann"]);

        let loose = CompiledMatcher::compile(word("ann", 0), Boundary::None).unwrap();
        assert_eq!(matched("Annual review for Ann.", &loose).len(), 2);
    }

    #[test]
    fn test_numeric_boundary_rejects_longer_digit_runs() {
        let matcher = CompiledMatcher::compile(
            Fragment::DigitGroup("1234".to_string()),
            Boundary::Numeric,
        )
        .unwrap();
        assert!(matched("ref 912345", &matcher).is_empty());
        assert_eq!(matched("ref 12-34.", &matcher), vec!["12-34"]);
        assert_eq!(matched("ref x1234y", &matcher), vec!["1234"]);
    }

    #[test]
    fn test_rejected_match_falls_back_to_shorter_alternative() {
        let fragment = Fragment::Alternation(vec![
            Fragment::Literal("smith-jones".to_string()),
            Fragment::Literal("jones".to_string()),
            Fragment::Literal("smith".to_string()),
        ]);
        let matcher = CompiledMatcher::compile(fragment, Boundary::Word).unwrap();
        assert_eq!(matched("from Smith-Jonesville", &matcher), vec!["Smith"]);
        assert_eq!(matched("Smith-Jones.", &matcher), vec!["Smith-Jones"]);
    }

    #[test]
    fn test_rejected_match_falls_back_to_shorter_optional_tail() {
        let fragment = Fragment::Sequence(vec![
            Fragment::Literal("1911".to_string()),
            Fragment::Optional(Box::new(Fragment::Literal(" 10:20".to_string()))),
        ]);
        let matcher = CompiledMatcher::compile(fragment, Boundary::Word).unwrap();
        assert_eq!(matched("in 1911 10:20am", &matcher), vec!["1911"]);
        assert_eq!(matched("in 1911 10:20 am", &matcher), vec!["1911 10:20"]);
        assert!(matched("in x1911 10:20", &matcher).is_empty());
    }

    #[test]
    fn test_mixed_fuzzy_and_exact_parts() {
        let fragment = Fragment::Alternation(vec![word("macdonald", 1), word("ron", 0)]);
        let matcher = CompiledMatcher::compile(fragment, Boundary::Word).unwrap();
        assert_eq!(matcher.part_count(), 2);
        assert!(matcher.is_fuzzy());
        let mut found = matched("Ron McDonald", &matcher);
        found.sort();
        assert_eq!(found, vec!["McDonald", "Ron"]);
    }

    #[test]
    fn test_empty_matching_fragment_rejected() {
        let result = CompiledMatcher::compile(Fragment::Separator(Separator::Code), Boundary::None);
        assert!(matches!(result, Err(ScrubError::PatternCompilation(_))));
    }
}
