//! Text redaction
//!
//! [`TextRedactionEngine`] applies a set of rules to one block of text in
//! three steps:
//!
//! 1. **Collect** every non-empty match span from every rule, dropping
//!    matches whose text is allowlisted.
//! 2. **Resolve** overlaps greedily. Candidates are ranked by length
//!    (longest first), then source priority (patient, third party,
//!    nonspecific), then start offset (leftmost first), then rule order. A
//!    candidate is accepted if it does not intersect an accepted span.
//!    Touching spans do not intersect.
//! 3. **Substitute** the accepted spans left to right with the replacement
//!    tag for each span's source.
//!
//! Text with no accepted span is returned borrowed and untouched.

use super::rule::{RuleSource, ScrubberRule};
use crate::domain::{Result, ScrubContext, ScrubError};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

/// Replacement tags chosen by the caller
///
/// A `None` tag falls back to the tag stored on each rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Replacements<'a> {
    pub patient: Option<&'a str>,
    pub third_party: Option<&'a str>,
    pub nonspecific: Option<&'a str>,
}

impl<'a> Replacements<'a> {
    /// Use the tags stored on the rules
    pub fn rule_tags() -> Self {
        Self::default()
    }

    /// Override the patient and third-party tags
    pub fn new(patient: &'a str, third_party: &'a str) -> Self {
        Self {
            patient: Some(patient),
            third_party: Some(third_party),
            nonspecific: None,
        }
    }

    fn tag_for<'r>(&'r self, rule: &'r ScrubberRule) -> &'r str {
        let chosen = match rule.source() {
            RuleSource::Patient => self.patient,
            RuleSource::ThirdParty => self.third_party,
            RuleSource::Nonspecific => self.nonspecific,
        };
        chosen.unwrap_or_else(|| rule.replacement_tag())
    }
}

/// Substitutions made, by rule source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub patient: usize,
    pub third_party: usize,
    pub nonspecific: usize,
}

impl SourceCounts {
    fn record(&mut self, source: RuleSource) {
        match source {
            RuleSource::Patient => self.patient += 1,
            RuleSource::ThirdParty => self.third_party += 1,
            RuleSource::Nonspecific => self.nonspecific += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.patient + self.third_party + self.nonspecific
    }
}

/// Result of scrubbing one text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction<'t> {
    /// Scrubbed text; borrowed from the input when nothing was replaced
    pub text: Cow<'t, str>,
    pub counts: SourceCounts,
}

impl<'t> Redaction<'t> {
    fn unchanged(text: &'t str) -> Self {
        Self {
            text: Cow::Borrowed(text),
            counts: SourceCounts::default(),
        }
    }

    /// Total number of substitutions
    pub fn substitutions(&self) -> usize {
        self.counts.total()
    }

    /// Whether the input was returned untouched
    pub fn is_unchanged(&self) -> bool {
        matches!(self.text, Cow::Borrowed(_))
    }

    pub fn into_string(self) -> String {
        self.text.into_owned()
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    span: Range<usize>,
    priority: u8,
    rule_index: usize,
}

/// Applies rules to text; holds only the allowlist and size limit
#[derive(Debug, Clone, Default)]
pub struct TextRedactionEngine {
    allowlist: Arc<HashSet<String>>,
    max_text_bytes: usize,
}

impl TextRedactionEngine {
    /// Creates an engine
    ///
    /// # Arguments
    ///
    /// * `allowlist` - words never redacted, compared case-insensitively
    /// * `max_text_bytes` - largest accepted text, `0` for no limit
    pub fn new<I, S>(allowlist: I, max_text_bytes: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowlist = allowlist
            .into_iter()
            .map(|w| normalise_match(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            allowlist: Arc::new(allowlist),
            max_text_bytes,
        }
    }

    /// Redacts `text` using `rules`, earlier rules winning exact ties
    ///
    /// # Errors
    ///
    /// Returns `RedactionFailure`, tagged with `context`, if the text exceeds
    /// the configured size limit.
    pub fn redact<'t>(
        &self,
        text: &'t str,
        rules: &[&ScrubberRule],
        replacements: &Replacements<'_>,
        context: &ScrubContext,
    ) -> Result<Redaction<'t>> {
        if self.max_text_bytes > 0 && text.len() > self.max_text_bytes {
            return Err(ScrubError::RedactionFailure {
                context: context.to_string(),
                reason: format!(
                    "text of {} bytes exceeds max_text_bytes ({})",
                    text.len(),
                    self.max_text_bytes
                ),
            });
        }
        if rules.is_empty() || text.is_empty() {
            return Ok(Redaction::unchanged(text));
        }

        let candidates = self.collect(text, rules);
        let accepted = resolve(candidates);
        if accepted.is_empty() {
            return Ok(Redaction::unchanged(text));
        }

        let mut out = String::with_capacity(text.len());
        let mut counts = SourceCounts::default();
        let mut last = 0;
        for (&start, &(end, rule_index)) in &accepted {
            let rule = rules[rule_index];
            out.push_str(&text[last..start]);
            out.push_str(replacements.tag_for(rule));
            counts.record(rule.source());
            last = end;
        }
        out.push_str(&text[last..]);

        Ok(Redaction {
            text: Cow::Owned(out),
            counts,
        })
    }

    fn collect(&self, text: &str, rules: &[&ScrubberRule]) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for (rule_index, rule) in rules.iter().enumerate() {
            for span in rule.find_spans(text) {
                if span.is_empty() || self.is_allowlisted(&text[span.clone()]) {
                    continue;
                }
                candidates.push(Candidate {
                    span,
                    priority: rule.source().priority(),
                    rule_index,
                });
            }
        }
        candidates
    }

    fn is_allowlisted(&self, matched: &str) -> bool {
        !self.allowlist.is_empty() && self.allowlist.contains(&normalise_match(matched))
    }
}

/// Greedy overlap resolution; returns accepted spans as start -> (end, rule)
fn resolve(mut candidates: Vec<Candidate>) -> BTreeMap<usize, (usize, usize)> {
    candidates.sort_by(|a, b| {
        b.span
            .len()
            .cmp(&a.span.len())
            .then(a.priority.cmp(&b.priority))
            .then(a.span.start.cmp(&b.span.start))
            .then(a.rule_index.cmp(&b.rule_index))
    });

    let mut accepted: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
    for candidate in candidates {
        let Range { start, end } = candidate.span;
        // Accepted spans are disjoint, so only the last one starting before
        // `end` can intersect.
        let overlaps = accepted
            .range(..end)
            .next_back()
            .is_some_and(|(_, &(accepted_end, _))| accepted_end > start);
        if !overlaps {
            accepted.insert(start, (end, candidate.rule_index));
        }
    }
    accepted
}

fn normalise_match(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
