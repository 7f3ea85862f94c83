//! DATE: every common representation of one calendar date
//!
//! The matcher is generated from the parsed date rather than the text it was
//! supplied as, so `11 November 1911` also catches `1911-11-11`, `11/11/11`,
//! `19111111` and `Saturday 11th Nov. 1911`.

use crate::config::ScrubberConfig;
use crate::domain::{Result, ScrubError, ScrubMethod};
use crate::scrub::fragment::{DateForm, DateLayout, Fragment};
use chrono::{Datelike, NaiveDate};

/// Formats tried, after ordinals, weekdays and "of" are removed
const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%b %d %Y",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Parses a date supplied as text
///
/// Accepts ISO dates (with or without a time component), day-first numeric
/// dates, compact `YYYYMMDD`, and month-name forms such as
/// `Saturday, 11th of November 1911`.
///
/// # Examples
///
/// ```
/// use phiscrub::scrub::builder::date::parse_date_text;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(1911, 11, 11);
/// assert_eq!(parse_date_text("11th Nov 1911"), expected);
/// assert_eq!(parse_date_text("1911-11-11T09:30:00"), expected);
/// ```
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let (Some(head), Some(rest)) = (text.get(..10), text.get(10..)) {
        if rest.starts_with(['T', 't', ' ']) {
            if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }

    let cleaned = text.replace(',', " ");
    let tokens: Vec<String> = cleaned
        .split_whitespace()
        .filter(|t| !t.eq_ignore_ascii_case("of"))
        .filter(|t| !is_weekday(t))
        .map(clean_token)
        .collect();
    let joined = tokens.join(" ");

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&joined, format).ok())
}

fn is_weekday(token: &str) -> bool {
    let token = token.trim_end_matches('.').to_lowercase();
    token.len() >= 3 && WEEKDAYS.iter().any(|day| day.starts_with(&token))
}

/// Removes ordinal suffixes (`11th`) and abbreviation dots (`Nov.`)
fn clean_token(token: &str) -> String {
    let lower = token.to_lowercase();
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(number) = lower.strip_suffix(suffix) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return number.to_string();
            }
        }
    }
    if token.chars().any(char::is_alphabetic) {
        return token.trim_end_matches('.').to_string();
    }
    token.to_string()
}

/// Builds the DATE fragment from a normalised `YYYY-MM-DD` value
pub fn build(normalised: &str, config: &ScrubberConfig) -> Result<Fragment> {
    let date = NaiveDate::parse_from_str(normalised, "%Y-%m-%d")
        .map_err(|e| ScrubError::invalid_value(ScrubMethod::Date, e.to_string()))?;
    Ok(Fragment::Alternation(forms(date, config.allow_no_separator_dates)))
}

/// Date forms for `date`, most specific first
pub fn forms(date: NaiveDate, allow_no_separator_dates: bool) -> Vec<Fragment> {
    DateLayout::ALL
        .into_iter()
        .filter(|layout| allow_no_separator_dates || !layout.is_compact())
        .filter(|layout| !(*layout == DateLayout::NumericMdy && date.day() == date.month()))
        .map(|layout| Fragment::DateForm(DateForm { date, layout }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrub::matcher::{Boundary, CompiledMatcher};
    use test_case::test_case;

    fn armistice() -> NaiveDate {
        NaiveDate::from_ymd_opt(1911, 11, 11).unwrap()
    }

    fn matcher(config: &ScrubberConfig) -> CompiledMatcher {
        CompiledMatcher::compile(build("1911-11-11", config).unwrap(), Boundary::Numeric).unwrap()
    }

    #[test_case("11 November 1911")]
    #[test_case("11th November 1911")]
    #[test_case("Saturday, 11th of November, 1911")]
    #[test_case("11 Nov. 1911")]
    #[test_case("November 11, 1911")]
    #[test_case("1911-11-11")]
    #[test_case("1911-11-11 08:15")]
    #[test_case("11/11/1911")]
    #[test_case("19111111")]
    fn test_parse_date_text(text: &str) {
        assert_eq!(parse_date_text(text), Some(armistice()));
    }

    #[test]
    fn test_parse_date_text_rejects_nonsense() {
        assert_eq!(parse_date_text("next Tuesday"), None);
        assert_eq!(parse_date_text("31/02/1911"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test_case("Born 1911-11-11." ; "iso")]
    #[test_case("seen 1911-11-11T10:20:30Z" ; "iso with time")]
    #[test_case("dob 19111111" ; "compact")]
    #[test_case("dob 11/11/1911" ; "day first")]
    #[test_case("dob 11.11.11" ; "two digit year")]
    #[test_case("Born 11 Nov 1911." ; "abbreviated month")]
    #[test_case("Born Sat 11th of November 1911" ; "weekday and ordinal")]
    #[test_case("November 11th, 1911" ; "month first")]
    fn test_date_forms_match(text: &str) {
        assert!(matcher(&ScrubberConfig::default()).is_match(text));
    }

    #[test]
    fn test_weekday_prefix_is_part_of_match() {
        let text = "on Saturday 11 November 1911 at";
        let spans = matcher(&ScrubberConfig::default()).find_spans(text);
        assert_eq!(&text[spans[0].clone()], "Saturday 11 November 1911");
    }

    #[test]
    fn test_time_suffix_is_part_of_match() {
        let text = "at 1911-11-11T10:20:30 ok";
        let spans = matcher(&ScrubberConfig::default()).find_spans(text);
        assert_eq!(&text[spans[0].clone()], "1911-11-11T10:20:30");
    }

    #[test]
    fn test_no_separator_dates_can_be_disabled() {
        let config = ScrubberConfig {
            allow_no_separator_dates: false,
            ..Default::default()
        };
        assert!(!matcher(&config).is_match("dob 19111111"));
        assert!(matcher(&config).is_match("dob 11/11/1911"));
    }

    #[test]
    fn test_other_dates_do_not_match() {
        let m = matcher(&ScrubberConfig::default());
        assert!(!m.is_match("12/11/1911"));
        assert!(!m.is_match("11 December 1911"));
        assert!(!m.is_match("111/11/1911"));
    }

    #[test]
    fn test_mdy_form_skipped_when_day_equals_month() {
        assert_eq!(forms(armistice(), true).len(), 6);
        let other = NaiveDate::from_ymd_opt(1980, 1, 5).unwrap();
        assert_eq!(forms(other, true).len(), 7);
        assert_eq!(forms(other, false).len(), 5);
    }
}
