//! Pattern fragments
//!
//! Matchers are described as a tree of [`Fragment`]s and rendered to regular
//! expression syntax in one place. Builders never concatenate regex strings
//! themselves, so escaping and grouping are handled uniformly and fragment
//! construction can be tested without compiling anything.
//!
//! # Examples
//!
//! ```
//! use phiscrub::scrub::fragment::{Fragment, Separator};
//!
//! let fragment = Fragment::Sequence(vec![
//!     Fragment::Literal("high".to_string()),
//!     Fragment::Separator(Separator::Flexible),
//!     Fragment::Literal("street".to_string()),
//! ]);
//! assert_eq!(fragment.to_regex().unwrap(), r"high[^\p{L}\p{N}]+street");
//! ```

use crate::domain::{Result, ScrubError};
use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt::Write;

/// Month names, full then abbreviated forms
const MONTH_NAMES: [&[&str]; 12] = [
    &["january", "jan"],
    &["february", "feb"],
    &["march", "mar"],
    &["april", "apr"],
    &["may"],
    &["june", "jun"],
    &["july", "jul"],
    &["august", "aug"],
    &["september", "sept", "sep"],
    &["october", "oct"],
    &["november", "nov"],
    &["december", "dec"],
];

const ORDINAL_SUFFIX: &str = "(?:st|nd|rd|th)?";

const TIME_SUFFIX: &str =
    r"(?:[T ][0-9]{1,2}:[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?(?:Z|[+\-][0-9]{2}:?[0-9]{2})?)?";

/// Runs of non-alphanumeric characters allowed between matched components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// One or more non-alphanumeric characters (between phrase words)
    Flexible,
    /// Up to three non-alphanumeric characters, possibly none (between digits)
    Numeric,
    /// One to three non-alphanumeric characters (between date components)
    Date,
    /// An optional single space, hyphen, dot or slash (inside codes)
    Code,
}

impl Separator {
    /// Regex syntax for the separator
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Flexible => r"[^\p{L}\p{N}]+",
            Self::Numeric => r"[^\p{L}\p{N}]{0,3}",
            Self::Date => r"[^\p{L}\p{N}]{1,3}",
            Self::Code => r"[\s\-./]?",
        }
    }

    fn matches_empty(self) -> bool {
        matches!(self, Self::Numeric | Self::Code)
    }
}

/// Character classes used by generic rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Digit,
    AsciiLetter,
    AsciiAlnum,
    Whitespace,
    /// Characters allowed before the `@` of an e-mail address
    EmailLocal,
    /// Characters allowed in an e-mail domain
    EmailDomain,
}

impl CharClass {
    fn pattern(self) -> &'static str {
        match self {
            Self::Digit => "[0-9]",
            Self::AsciiLetter => "[A-Za-z]",
            Self::AsciiAlnum => "[A-Za-z0-9]",
            Self::Whitespace => r"\s",
            Self::EmailLocal => r"[A-Za-z0-9._%+\-]",
            Self::EmailDomain => r"[A-Za-z0-9.\-]",
        }
    }
}

/// Surface layout of a calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateLayout {
    /// `11/11/1911`, `11-11-11`
    NumericDmy,
    /// `11/30/1911`
    NumericMdy,
    /// `1911-11-11`, optionally followed by an ISO 8601 time
    NumericYmd,
    /// `Saturday 11th of November 1911`, `11 Nov. 1911`
    TextDmy,
    /// `November 11, 1911`
    TextMdy,
    /// `19111111`
    CompactYmd,
    /// `11111911`
    CompactDmy,
}

impl DateLayout {
    /// Every layout, most specific first
    pub const ALL: [DateLayout; 7] = [
        Self::TextDmy,
        Self::TextMdy,
        Self::NumericYmd,
        Self::NumericDmy,
        Self::NumericMdy,
        Self::CompactYmd,
        Self::CompactDmy,
    ];

    /// Whether the layout has no separators between components
    pub fn is_compact(self) -> bool {
        matches!(self, Self::CompactYmd | Self::CompactDmy)
    }
}

/// One textual representation of a specific date
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateForm {
    pub date: NaiveDate,
    pub layout: DateLayout,
}

impl DateForm {
    fn render(&self, out: &mut String) {
        let sep = Separator::Date.pattern();
        let day = self.date.day();
        let month = self.date.month();
        let year = self.date.year();
        let year4 = format!("{year:04}");
        let year_any = format!("(?:{year4}|{:02})", year.rem_euclid(100));

        let _ = match self.layout {
            DateLayout::NumericDmy => write!(
                out,
                "{}{sep}{}{sep}{year_any}",
                optional_zero(day),
                optional_zero(month)
            ),
            DateLayout::NumericMdy => write!(
                out,
                "{}{sep}{}{sep}{year_any}",
                optional_zero(month),
                optional_zero(day)
            ),
            DateLayout::NumericYmd => write!(
                out,
                "{year4}{sep}{}{sep}{}{TIME_SUFFIX}",
                optional_zero(month),
                optional_zero(day)
            ),
            DateLayout::TextDmy => write!(
                out,
                "{}{}{ORDINAL_SUFFIX}{sep}(?:of{sep})?{}{sep}{year_any}",
                weekday_prefix(self.date.weekday()),
                optional_zero(day),
                month_name(month)
            ),
            DateLayout::TextMdy => write!(
                out,
                "{}{}{sep}{}{ORDINAL_SUFFIX}{sep}{year_any}",
                weekday_prefix(self.date.weekday()),
                month_name(month),
                optional_zero(day)
            ),
            DateLayout::CompactYmd => write!(out, "{year4}{month:02}{day:02}"),
            DateLayout::CompactDmy => write!(out, "{day:02}{month:02}{year4}"),
        };
    }
}

fn optional_zero(n: u32) -> String {
    if n < 10 {
        format!("0?{n}")
    } else {
        n.to_string()
    }
}

fn month_name(month: u32) -> String {
    let names = MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or(&[]);
    format!(r"(?:{})\.?", names.join("|"))
}

fn weekday_prefix(weekday: Weekday) -> String {
    let full = match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    };
    format!(r"(?:(?:{full}|{})\.?{})?", &full[..3], Separator::Date.pattern())
}

/// A composable description of what a matcher accepts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fragment {
    /// Exact text, matched case-insensitively
    Literal(String),
    /// Fragments matched one after another
    Sequence(Vec<Fragment>),
    /// Any one of the fragments; earlier entries win at the same position
    Alternation(Vec<Fragment>),
    /// The fragment or nothing
    Optional(Box<Fragment>),
    Separator(Separator),
    /// Between `min` and `max` characters of a class (`max = None` is unbounded)
    Class {
        class: CharClass,
        min: usize,
        max: Option<usize>,
    },
    /// A word tolerating up to `max_errors` edits, optionally followed by a suffix
    ///
    /// Only exact words (`max_errors == 0`) can be rendered as a regex. Fuzzy
    /// words must sit at the top level of a matcher, where they are handed to
    /// the edit-distance automaton instead.
    FuzzyWord {
        word: String,
        max_errors: u32,
        suffixes: Vec<String>,
    },
    /// A digit string with numeric separators tolerated between digits
    DigitGroup(String),
    DateForm(DateForm),
    /// An alphanumeric code with code separators tolerated between characters
    Code(String),
}

impl Fragment {
    /// Renders the fragment to regex syntax
    ///
    /// # Errors
    ///
    /// Returns `PatternCompilation` if the fragment contains a fuzzy word,
    /// an empty alternation, or could match the empty string.
    pub fn to_regex(&self) -> Result<String> {
        if self.matches_empty() {
            return Err(ScrubError::PatternCompilation(
                "pattern fragment would match the empty string".to_string(),
            ));
        }
        let mut out = String::new();
        self.render(&mut out)?;
        Ok(out)
    }

    /// Whether this is a word needing the edit-distance automaton
    pub fn is_fuzzy(&self) -> bool {
        matches!(self, Self::FuzzyWord { max_errors, .. } if *max_errors > 0)
    }

    /// Top-level alternatives of the fragment
    pub fn into_alternatives(self) -> Vec<Fragment> {
        match self {
            Self::Alternation(items) => items,
            other => vec![other],
        }
    }

    /// Whether some input of length zero satisfies the fragment
    pub fn matches_empty(&self) -> bool {
        match self {
            Self::Literal(s) | Self::DigitGroup(s) | Self::Code(s) => s.is_empty(),
            Self::FuzzyWord { word, .. } => word.is_empty(),
            Self::Sequence(items) => items.iter().all(Fragment::matches_empty),
            Self::Alternation(items) => items.iter().any(Fragment::matches_empty),
            Self::Optional(_) => true,
            Self::Separator(sep) => sep.matches_empty(),
            Self::Class { min, .. } => *min == 0,
            Self::DateForm(_) => false,
        }
    }

    fn render(&self, out: &mut String) -> Result<()> {
        match self {
            Self::Literal(s) => out.push_str(&regex::escape(s)),
            Self::Sequence(items) => {
                for item in items {
                    item.render(out)?;
                }
            }
            Self::Alternation(items) => {
                if items.is_empty() {
                    return Err(ScrubError::PatternCompilation(
                        "empty alternation".to_string(),
                    ));
                }
                out.push_str("(?:");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    item.render(out)?;
                }
                out.push(')');
            }
            Self::Optional(inner) => {
                out.push_str("(?:");
                inner.render(out)?;
                out.push_str(")?");
            }
            Self::Separator(sep) => out.push_str(sep.pattern()),
            Self::Class { class, min, max } => {
                out.push_str(class.pattern());
                let _ = match max {
                    Some(max) if max == min => write!(out, "{{{min}}}"),
                    Some(max) => write!(out, "{{{min},{max}}}"),
                    None => write!(out, "{{{min},}}"),
                };
            }
            Self::FuzzyWord {
                word,
                max_errors,
                suffixes,
            } => {
                if *max_errors > 0 {
                    return Err(ScrubError::PatternCompilation(
                        "fuzzy words must be top-level alternatives".to_string(),
                    ));
                }
                out.push_str(&regex::escape(word));
                render_suffixes(suffixes, out);
            }
            Self::DigitGroup(digits) => {
                render_interleaved(digits, Separator::Numeric, out);
            }
            Self::DateForm(form) => form.render(out),
            Self::Code(code) => render_interleaved(code, Separator::Code, out),
        }
        Ok(())
    }
}

fn render_suffixes(suffixes: &[String], out: &mut String) {
    let escaped: Vec<String> = suffixes
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| regex::escape(s))
        .collect();
    if !escaped.is_empty() {
        let _ = write!(out, "(?:{})?", escaped.join("|"));
    }
}

fn render_interleaved(chars: &str, sep: Separator, out: &mut String) {
    for (i, c) in chars.chars().enumerate() {
        if i > 0 {
            out.push_str(sep.pattern());
        }
        out.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4])));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_literal_is_escaped() {
        let fragment = Fragment::Literal("o'neil (jr.)".to_string());
        assert_eq!(fragment.to_regex().unwrap(), r"o'neil \(jr\.\)");
    }

    #[test]
    fn test_exact_word_with_suffixes() {
        let fragment = Fragment::FuzzyWord {
            word: "smith".to_string(),
            max_errors: 0,
            suffixes: vec!["s".to_string(), "'s".to_string()],
        };
        assert_eq!(fragment.to_regex().unwrap(), "smith(?:s|'s)?");
    }

    #[test]
    fn test_nested_fuzzy_word_is_rejected() {
        let fragment = Fragment::Sequence(vec![Fragment::FuzzyWord {
            word: "ronald".to_string(),
            max_errors: 1,
            suffixes: vec![],
        }]);
        assert!(matches!(
            fragment.to_regex(),
            Err(ScrubError::PatternCompilation(_))
        ));
    }

    #[test]
    fn test_empty_fragments_are_rejected() {
        assert!(Fragment::Literal(String::new()).to_regex().is_err());
        assert!(Fragment::DigitGroup(String::new()).to_regex().is_err());
        assert!(Fragment::Optional(Box::new(Fragment::Literal("a".into())))
            .to_regex()
            .is_err());
        assert!(Fragment::Alternation(vec![]).to_regex().is_err());
        assert!(Fragment::Separator(Separator::Numeric).to_regex().is_err());
    }

    #[test]
    fn test_digit_group_interleaves_separators() {
        let fragment = Fragment::DigitGroup("123".to_string());
        assert_eq!(
            fragment.to_regex().unwrap(),
            r"1[^\p{L}\p{N}]{0,3}2[^\p{L}\p{N}]{0,3}3"
        );
    }

    #[test]
    fn test_code_interleaves_separators() {
        let fragment = Fragment::Code("CB2".to_string());
        assert_eq!(fragment.to_regex().unwrap(), r"C[\s\-./]?B[\s\-./]?2");
    }

    #[test]
    fn test_class_repetition() {
        let exact = Fragment::Class {
            class: CharClass::Digit,
            min: 10,
            max: Some(10),
        };
        assert_eq!(exact.to_regex().unwrap(), "[0-9]{10}");
        let open = Fragment::Class {
            class: CharClass::AsciiLetter,
            min: 2,
            max: None,
        };
        assert_eq!(open.to_regex().unwrap(), "[A-Za-z]{2,}");
    }

    #[test]
    fn test_compact_date_forms() {
        let ymd = Fragment::DateForm(DateForm {
            date: date(1911, 11, 11),
            layout: DateLayout::CompactYmd,
        });
        assert_eq!(ymd.to_regex().unwrap(), "19111111");
        let dmy = Fragment::DateForm(DateForm {
            date: date(1980, 1, 5),
            layout: DateLayout::CompactDmy,
        });
        assert_eq!(dmy.to_regex().unwrap(), "05011980");
    }

    #[test]
    fn test_numeric_date_allows_missing_zero() {
        let form = Fragment::DateForm(DateForm {
            date: date(1980, 1, 5),
            layout: DateLayout::NumericDmy,
        });
        let pattern = form.to_regex().unwrap();
        assert!(pattern.starts_with("0?5"));
        assert!(pattern.ends_with("(?:1980|80)"));
    }

    #[test]
    fn test_text_date_uses_month_names_and_weekday() {
        let form = Fragment::DateForm(DateForm {
            date: date(1911, 11, 11),
            layout: DateLayout::TextDmy,
        });
        let pattern = form.to_regex().unwrap();
        assert!(pattern.contains("november|nov"));
        assert!(pattern.contains("saturday|sat"));
        assert!(pattern.contains(ORDINAL_SUFFIX));
    }

    #[test]
    fn test_into_alternatives() {
        let alt = Fragment::Alternation(vec![
            Fragment::Literal("a".into()),
            Fragment::Literal("b".into()),
        ]);
        assert_eq!(alt.into_alternatives().len(), 2);
        assert_eq!(Fragment::Literal("a".into()).into_alternatives().len(), 1);
    }
}
