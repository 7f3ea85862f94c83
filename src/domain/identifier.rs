//! Identifying values supplied for one patient
//!
//! An [`IdentifierValue`] is a single raw value (a forename, a date of birth,
//! a telephone number...) together with the method used to scrub it and
//! whose identity it reveals. The driver collects these from the source
//! database; the scrubber turns each into at most one rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of matching logic applied to an identifier value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrubMethod {
    /// Each word scrubbed independently (names)
    Words,
    /// Whole value scrubbed as one multi-word unit (addresses, places)
    Phrase,
    /// Digits only, any separators (telephone numbers, NHS numbers)
    Numeric,
    /// Calendar date in any textual representation
    Date,
    /// Alphanumeric code with optional internal spacing (postcodes)
    Code,
}

impl ScrubMethod {
    /// Lowercase name used in configuration files and signatures
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Words => "words",
            Self::Phrase => "phrase",
            Self::Numeric => "numeric",
            Self::Date => "date",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for ScrubMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrubMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "words" => Ok(Self::Words),
            "phrase" => Ok(Self::Phrase),
            "numeric" | "number" => Ok(Self::Numeric),
            "date" => Ok(Self::Date),
            "code" => Ok(Self::Code),
            other => Err(format!("Unknown scrub method: {other}")),
        }
    }
}

/// Whose identity a value reveals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierSource {
    /// The patient themself
    Patient,
    /// A relative, carer or other person named in the patient's record
    ThirdParty,
}

/// Raw value as read from the source database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Free text (also accepted for dates and numbers)
    Text(String),
    /// Already-parsed calendar date
    Date(NaiveDate),
    /// Integer column
    Integer(i64),
}

impl RawValue {
    /// Textual form of the value, before normalisation
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Integer(n) => n.to_string(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A single identifying value belonging to a patient or a third party
///
/// # Examples
///
/// ```
/// use phiscrub::domain::{IdentifierValue, IdentifierSource, ScrubMethod};
///
/// let surname = IdentifierValue::patient("MacDonald", ScrubMethod::Words).defining();
/// assert_eq!(surname.source, IdentifierSource::Patient);
/// assert!(surname.is_patient_defining);
///
/// let carer = IdentifierValue::third_party("Jean Smith", ScrubMethod::Words);
/// assert_eq!(carer.source, IdentifierSource::ThirdParty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierValue {
    /// Raw value
    pub value: RawValue,

    /// How the value is turned into a matcher
    pub scrub_method: ScrubMethod,

    /// Whose identity the value reveals
    pub source: IdentifierSource,

    /// Marks a value that identifies the primary patient among third parties
    #[serde(default)]
    pub is_patient_defining: bool,
}

impl IdentifierValue {
    /// Creates a new identifier value
    pub fn new(
        value: impl Into<RawValue>,
        scrub_method: ScrubMethod,
        source: IdentifierSource,
    ) -> Self {
        Self {
            value: value.into(),
            scrub_method,
            source,
            is_patient_defining: false,
        }
    }

    /// Creates a value belonging to the patient
    pub fn patient(value: impl Into<RawValue>, scrub_method: ScrubMethod) -> Self {
        Self::new(value, scrub_method, IdentifierSource::Patient)
    }

    /// Creates a value belonging to a third party
    pub fn third_party(value: impl Into<RawValue>, scrub_method: ScrubMethod) -> Self {
        Self::new(value, scrub_method, IdentifierSource::ThirdParty)
    }

    /// Marks the value as patient-defining
    pub fn defining(mut self) -> Self {
        self.is_patient_defining = true;
        self
    }
}
