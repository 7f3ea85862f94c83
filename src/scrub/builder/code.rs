//! CODE: alphanumeric codes with optional internal spacing

use crate::scrub::fragment::Fragment;
use once_cell::sync::Lazy;
use regex::Regex;

/// Outward and inward parts of a compact UK postcode
static UK_POSTCODE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([A-Z]{1,2}[0-9][A-Z0-9]?)([0-9][A-Z]{2})$").ok());

/// Splits a compact uppercase code into UK postcode outward and inward parts
pub fn split_uk_postcode(code: &str) -> Option<(&str, &str)> {
    let captures = UK_POSTCODE.as_ref()?.captures(code)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

/// Builds the CODE fragment from a normalised code
///
/// Spaces, hyphens, dots or slashes may appear between any two characters.
/// A UK postcode also matches its outward part alone (`CB2` for `CB2 0QQ`).
pub fn build(code: &str) -> Fragment {
    match split_uk_postcode(code) {
        Some((outward, _)) => Fragment::Alternation(vec![
            Fragment::Code(code.to_string()),
            Fragment::Code(outward.to_string()),
        ]),
        None => Fragment::Code(code.to_string()),
    }
}
