//! Scrubber signatures
//!
//! A signature is a hex SHA-256 digest of what a scrubber would redact: its
//! rule keys and sources, the fingerprint of the configuration that shaped
//! the matchers, and the generic rule settings. It depends only on content,
//! never on insertion order or object identity, so a driver can compare it
//! with a stored value to skip re-scrubbing a patient whose identifiers have
//! not changed.

use super::rule::{RuleKey, RuleSource};
use sha2::{Digest, Sha256};

/// Computes a scrubber signature
///
/// # Examples
///
/// ```
/// use phiscrub::domain::ScrubMethod;
/// use phiscrub::scrub::rule::{RuleKey, RuleSource};
/// use phiscrub::scrub::signature::compute;
///
/// let a = RuleKey::new(ScrubMethod::Words, "ronald");
/// let b = RuleKey::new(ScrubMethod::Date, "1911-11-11");
/// let one = compute([(&a, RuleSource::Patient), (&b, RuleSource::Patient)], "cfg", "");
/// let two = compute([(&b, RuleSource::Patient), (&a, RuleSource::Patient)], "cfg", "");
/// assert_eq!(one, two);
/// assert_eq!(one.len(), 64);
/// ```
pub fn compute<'a, I>(rules: I, config_fingerprint: &str, nonspecific_signature: &str) -> String
where
    I: IntoIterator<Item = (&'a RuleKey, RuleSource)>,
{
    let mut lines: Vec<String> = rules
        .into_iter()
        .map(|(key, source)| format!("{}\t{}\t{}", source, key.method, key.value))
        .collect();
    lines.sort();

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"\0config\t");
    hasher.update(config_fingerprint.as_bytes());
    hasher.update(b"\0nonspecific\t");
    hasher.update(nonspecific_signature.as_bytes());
    format!("{:x}", hasher.finalize())
}
