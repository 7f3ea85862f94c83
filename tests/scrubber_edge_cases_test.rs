//! Edge case tests for the scrubber

use chrono::NaiveDate;
use phiscrub::config::{ScrubConfig, ScrubberConfig};
use phiscrub::domain::{
    FieldName, IdentifierValue, PatientId, RawValue, ScrubError, ScrubMethod,
};
use phiscrub::scrub::{AddOutcome, PersonalizedScrubber, ScrubberFactory};

fn scrubber() -> PersonalizedScrubber {
    PersonalizedScrubber::new(ScrubberConfig::default()).expect("Failed to create scrubber")
}

#[test]
fn test_blank_values_never_create_rules() {
    let mut scrubber = scrubber();
    let blanks = [
        IdentifierValue::patient("", ScrubMethod::Words),
        IdentifierValue::patient("   ", ScrubMethod::Phrase),
        IdentifierValue::patient(" - / ", ScrubMethod::Numeric),
        IdentifierValue::patient("..", ScrubMethod::Code),
        IdentifierValue::patient("", ScrubMethod::Date),
        IdentifierValue::third_party("\t\n", ScrubMethod::Words),
    ];
    for value in blanks {
        let outcome = scrubber.add(value);
        assert!(
            matches!(
                outcome,
                AddOutcome::Skipped(ScrubError::InvalidIdentifierValue { .. })
            ),
            "unexpected outcome {outcome:?}"
        );
    }
    assert!(scrubber.is_empty());

    let text = "Any text at all, 123 456, a b c.";
    let redaction = scrubber.scrub_default(text).unwrap();
    assert!(redaction.is_unchanged());
    assert_eq!(redaction.text, text);
}

#[test]
fn test_values_below_minimum_length_are_skipped() {
    let mut scrubber = PersonalizedScrubber::new(ScrubberConfig {
        min_string_length_to_scrub_with: 3,
        ..Default::default()
    })
    .unwrap();
    assert!(scrubber
        .add(IdentifierValue::patient("Jo", ScrubMethod::Words))
        .is_skipped());
    assert!(scrubber
        .add(IdentifierValue::patient("42", ScrubMethod::Numeric))
        .is_skipped());
    assert!(scrubber
        .add(IdentifierValue::patient("A1", ScrubMethod::Code))
        .is_skipped());

    // Short words inside a longer value are dropped, the rest kept
    assert_eq!(
        scrubber.add(IdentifierValue::patient("Jo Bloggs", ScrubMethod::Words)),
        AddOutcome::Added
    );
    assert_eq!(
        scrubber.scrub_default("Jo Bloggs").unwrap().text,
        "Jo [__PPP__]"
    );
}

#[test]
fn test_unparseable_date_is_skipped_and_others_kept() {
    let mut scrubber = scrubber();
    let outcomes = scrubber.add_all(vec![
        IdentifierValue::patient("the thirty-second of Smarch", ScrubMethod::Date),
        IdentifierValue::patient("Ronald", ScrubMethod::Words),
    ]);
    assert!(outcomes[0].is_skipped());
    assert_eq!(outcomes[1], AddOutcome::Added);
    assert_eq!(scrubber.len(), 1);
}

#[test]
fn test_typed_raw_values() {
    let mut scrubber = scrubber();
    scrubber.add(IdentifierValue::patient(
        NaiveDate::from_ymd_opt(1962, 3, 4).unwrap(),
        ScrubMethod::Date,
    ));
    scrubber.add(IdentifierValue::patient(RawValue::Integer(4505577104), ScrubMethod::Numeric));
    let redaction = scrubber
        .scrub_default("DOB 4/3/62, NHS 450 557 7104")
        .unwrap();
    assert_eq!(redaction.text, "DOB [__PPP__], NHS [__PPP__]");
}

#[test]
fn test_empty_text() {
    let mut scrubber = scrubber();
    scrubber.add(IdentifierValue::patient("Ronald", ScrubMethod::Words));
    let redaction = scrubber.scrub_default("").unwrap();
    assert!(redaction.is_unchanged());
    assert_eq!(redaction.substitutions(), 0);
}

#[test]
fn test_unicode_names_and_offsets() {
    let mut scrubber = scrubber();
    scrubber.add(IdentifierValue::patient("Zoë Ørsted", ScrubMethod::Words));
    assert_eq!(
        scrubber.scrub_default("café: ZOË ørsted, ok").unwrap().text,
        "café: [__PPP__] [__PPP__], ok"
    );
}

#[test]
fn test_apostrophe_and_hyphenated_names() {
    let mut scrubber = scrubber();
    scrubber.add(IdentifierValue::patient("O'Neil Smith-Jones", ScrubMethod::Words));
    assert_eq!(
        scrubber
            .scrub_default("Mrs O'Neil Smith-Jones; Ms Jones")
            .unwrap()
            .text,
        "Mrs [__PPP__] [__PPP__]; Ms [__PPP__]"
    );
}

#[test]
fn test_allowlisted_words_survive() {
    let mut scrubber = PersonalizedScrubber::new(ScrubberConfig {
        allowlist: vec!["Hospital".to_string()],
        ..Default::default()
    })
    .unwrap();
    scrubber.add(IdentifierValue::third_party("Hospital", ScrubMethod::Words));
    scrubber.add(IdentifierValue::third_party("Jean", ScrubMethod::Words));
    assert_eq!(
        scrubber.scrub_default("Jean at the hospital").unwrap().text,
        "[__TTT__] at the hospital"
    );
}

#[test]
fn test_oversized_text_fails_with_context() {
    let config = ScrubConfig {
        scrubber: ScrubberConfig {
            max_text_bytes: 16,
            ..Default::default()
        },
        ..Default::default()
    };
    let factory = ScrubberFactory::new(&config).unwrap();
    let mut scrubber = factory.scrubber_for(PatientId::new("M1234567").unwrap());
    scrubber.add(IdentifierValue::patient("Ronald", ScrubMethod::Words));

    let field = FieldName::new("clinical_notes.note_text").unwrap();
    let err = scrubber
        .scrub_field("Ronald was seen in clinic today", &field)
        .unwrap_err();
    assert!(!err.is_local());
    match err {
        ScrubError::RedactionFailure { context, .. } => {
            assert_eq!(context, "patient=M1234567 field=clinical_notes.note_text")
        }
        other => panic!("unexpected error: {other}"),
    }

    // Text within the limit still scrubs
    assert_eq!(
        scrubber.scrub_field("Ronald seen", &field).unwrap().text,
        "[__PPP__] seen"
    );
}

#[test]
fn test_replacement_tags_must_differ() {
    let config = ScrubberConfig {
        replacement_text_thirdparty: "[__PPP__]".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        PersonalizedScrubber::new(config),
        Err(ScrubError::Configuration(_))
    ));
}

#[test]
fn test_fuzzy_budget_is_capped_at_load() {
    let config = ScrubConfig {
        scrubber: ScrubberConfig {
            string_max_regex_errors: 10,
            ..Default::default()
        },
        ..Default::default()
    };
    let err = ScrubberFactory::new(&config).unwrap_err();
    assert!(err.to_string().contains("string_max_regex_errors"));
}

#[test]
fn test_short_words_stay_exact_under_fuzzy_budget() {
    let mut scrubber = PersonalizedScrubber::new(ScrubberConfig {
        string_max_regex_errors: 1,
        min_string_length_for_errors: 5,
        ..Default::default()
    })
    .unwrap();
    scrubber.add(IdentifierValue::patient("Ann", ScrubMethod::Words));
    // "And" is one edit from "Ann" but the word is too short for fuzzy matching
    assert!(scrubber.scrub_default("And then").unwrap().is_unchanged());
}
