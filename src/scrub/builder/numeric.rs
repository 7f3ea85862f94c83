//! NUMERIC: digits with any separators between them

use crate::scrub::fragment::{Fragment, Separator};

/// Builds the NUMERIC fragment from canonical digits
///
/// Up to three non-alphanumeric characters may sit between any two digits,
/// so grouping conventions (`01223 123456`, `01223-123-456`) do not matter.
/// A leading group in brackets, as in `(01223) 123456`, is matched together
/// with its opening bracket.
pub fn build(digits: &str) -> Fragment {
    let split_points: Vec<usize> = digits.char_indices().skip(1).map(|(i, _)| i).collect();
    let mut alternatives: Vec<Fragment> = split_points
        .into_iter()
        .map(|at| {
            Fragment::Sequence(vec![
                Fragment::Literal("(".to_string()),
                Fragment::DigitGroup(digits[..at].to_string()),
                Fragment::Literal(")".to_string()),
                Fragment::Separator(Separator::Numeric),
                Fragment::DigitGroup(digits[at..].to_string()),
            ])
        })
        .collect();
    alternatives.push(Fragment::DigitGroup(digits.to_string()));
    Fragment::Alternation(alternatives)
}
