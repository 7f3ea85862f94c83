//! Scrubber rules
//!
//! A [`ScrubberRule`] is one compiled matcher plus the metadata that decides
//! how its matches are replaced and ranked during overlap resolution.

use super::matcher::CompiledMatcher;
use crate::domain::{IdentifierSource, ScrubMethod};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Where a rule came from, in overlap priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    Patient,
    ThirdParty,
    /// Generic rules not tied to any patient
    Nonspecific,
}

impl RuleSource {
    /// Overlap priority; lower wins
    pub fn priority(self) -> u8 {
        match self {
            Self::Patient => 0,
            Self::ThirdParty => 1,
            Self::Nonspecific => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::ThirdParty => "third_party",
            Self::Nonspecific => "nonspecific",
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<IdentifierSource> for RuleSource {
    fn from(source: IdentifierSource) -> Self {
        match source {
            IdentifierSource::Patient => Self::Patient,
            IdentifierSource::ThirdParty => Self::ThirdParty,
        }
    }
}

/// Identity of a patient rule: scrub method plus normalised value
///
/// Two identifier values with equal keys produce the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub method: ScrubMethod,
    pub value: String,
}

impl RuleKey {
    pub fn new(method: ScrubMethod, value: impl Into<String>) -> Self {
        Self {
            method,
            value: value.into(),
        }
    }
}

/// A single compiled matcher with its replacement metadata
///
/// Rules are immutable; changing a rule's source produces a new rule sharing
/// the same compiled matcher.
#[derive(Debug, Clone)]
pub struct ScrubberRule {
    source: RuleSource,
    replacement_tag: String,
    matcher: Arc<CompiledMatcher>,
    min_length_to_apply: usize,
    fuzzy_error_budget: u32,
}

impl ScrubberRule {
    pub fn new(
        source: RuleSource,
        replacement_tag: impl Into<String>,
        matcher: Arc<CompiledMatcher>,
        min_length_to_apply: usize,
        fuzzy_error_budget: u32,
    ) -> Self {
        Self {
            source,
            replacement_tag: replacement_tag.into(),
            matcher,
            min_length_to_apply,
            fuzzy_error_budget,
        }
    }

    pub fn source(&self) -> RuleSource {
        self.source
    }

    /// Tag substituted for matches unless the caller overrides it
    pub fn replacement_tag(&self) -> &str {
        &self.replacement_tag
    }

    pub fn matcher(&self) -> &Arc<CompiledMatcher> {
        &self.matcher
    }

    /// Matches shorter than this many characters are ignored
    pub fn min_length_to_apply(&self) -> usize {
        self.min_length_to_apply
    }

    pub fn fuzzy_error_budget(&self) -> u32 {
        self.fuzzy_error_budget
    }

    /// Same matcher under a different source and tag
    pub fn with_source(&self, source: RuleSource, replacement_tag: impl Into<String>) -> Self {
        Self {
            source,
            replacement_tag: replacement_tag.into(),
            ..self.clone()
        }
    }

    /// Match spans long enough to apply, as byte ranges
    pub fn find_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = self.matcher.find_spans(text);
        spans.retain(|r| text[r.clone()].chars().count() >= self.min_length_to_apply);
        spans
    }
}
