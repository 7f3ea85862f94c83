//! Domain identifier types with validation
//!
//! Newtype wrappers naming the patient and the free-text field being scrubbed,
//! so that scrub failures can be reported against a specific record without
//! mixing the two kinds of identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient identifier newtype wrapper
///
/// Holds the source system's patient identifier (PID) as supplied by the
/// driver. The scrubber only uses it to tag errors and log records.
///
/// # Examples
///
/// ```
/// use phiscrub::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let pid = PatientId::from_str("M1234567").unwrap();
/// assert_eq!(pid.as_str(), "M1234567");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId from a string
    ///
    /// Returns `Err` if the identifier is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Free-text field name newtype wrapper
///
/// Conventionally `table.column`, but any non-blank label is accepted.
///
/// # Examples
///
/// ```
/// use phiscrub::domain::ids::FieldName;
/// use std::str::FromStr;
///
/// let field = FieldName::from_str("notes.note_text").unwrap();
/// assert_eq!(field.table(), Some("notes"));
/// assert_eq!(field.column(), "note_text");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldName(String);

impl FieldName {
    /// Creates a new FieldName from a string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Field name cannot be empty".to_string());
        }
        Ok(Self(name))
    }

    /// Returns the field name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Table part of a `table.column` name
    pub fn table(&self) -> Option<&str> {
        self.0.split_once('.').map(|(table, _)| table)
    }

    /// Column part of a `table.column` name (the whole name otherwise)
    pub fn column(&self) -> &str {
        self.0
            .split_once('.')
            .map(|(_, column)| column)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identity of the text being scrubbed, attached to scrub failures
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScrubContext {
    /// Patient whose scrubber is in use
    pub patient_id: Option<PatientId>,

    /// Field the text came from
    pub field: Option<FieldName>,
}

impl ScrubContext {
    /// Creates an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the patient ID
    pub fn with_patient(mut self, patient_id: PatientId) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    /// Sets the field name
    pub fn with_field(mut self, field: FieldName) -> Self {
        self.field = Some(field);
        self
    }
}

impl fmt::Display for ScrubContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patient = self.patient_id.as_ref().map_or("unknown", |p| p.as_str());
        let field = self.field.as_ref().map_or("unknown", |f| f.as_str());
        write!(f, "patient={patient} field={field}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_rejects_blank() {
        assert!(PatientId::new("").is_err());
        assert!(PatientId::new("   ").is_err());
        assert!(PatientId::new("P1").is_ok());
    }

    #[test]
    fn test_field_name_without_table() {
        let field = FieldName::new("note").unwrap();
        assert_eq!(field.table(), None);
        assert_eq!(field.column(), "note");
    }

    #[test]
    fn test_scrub_context_display() {
        let ctx = ScrubContext::new()
            .with_patient(PatientId::new("P42").unwrap())
            .with_field(FieldName::new("notes.text").unwrap());
        assert_eq!(ctx.to_string(), "patient=P42 field=notes.text");
        assert_eq!(ScrubContext::new().to_string(), "patient=unknown field=unknown");
    }
}
