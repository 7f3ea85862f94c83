//! Personalized scrubbers
//!
//! A [`PersonalizedScrubber`] holds the rules built from one patient's
//! identifying values plus the shared generic rules. Its life has two
//! phases: assembly, where [`add`](PersonalizedScrubber::add) needs
//! `&mut self`, and use, where scrubbing only needs `&self`. Calling
//! [`freeze`](PersonalizedScrubber::freeze) ends assembly and returns an
//! `Arc` that worker threads can share.
//!
//! A [`ScrubberFactory`] carries what every patient's scrubber shares: the
//! validated configuration, the compiled generic rules and the matcher cache.
//!
//! # Examples
//!
//! ```
//! use phiscrub::config::ScrubConfig;
//! use phiscrub::domain::{IdentifierValue, ScrubMethod};
//! use phiscrub::scrub::ScrubberFactory;
//!
//! let factory = ScrubberFactory::new(&ScrubConfig::default()).unwrap();
//! let mut scrubber = factory.scrubber();
//! scrubber.add(IdentifierValue::patient("Ronald MacDonald", ScrubMethod::Words));
//! scrubber.add(IdentifierValue::patient("1911-11-11", ScrubMethod::Date));
//! let scrubber = scrubber.freeze();
//!
//! let redaction = scrubber
//!     .scrub("Ronald MacDonald, born 11 Nov 1911", "[P]", "[T]")
//!     .unwrap();
//! assert_eq!(redaction.text, "[P] [P], born [P]");
//! ```

use super::builder::{self, Blueprint};
use super::cache::{MatcherCache, MatcherCacheKey};
use super::engine::{Redaction, Replacements, TextRedactionEngine};
use super::matcher::CompiledMatcher;
use super::nonspecific::NonspecificRules;
use super::rule::{RuleKey, RuleSource, ScrubberRule};
use super::signature;
use crate::config::{ScrubConfig, ScrubberConfig};
use crate::domain::{
    FieldName, IdentifierValue, PatientId, Result, ScrubContext, ScrubError,
};
use crate::{log_identifier_skipped, log_scrub_complete};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// What [`PersonalizedScrubber::add`] did with a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new rule was created
    Added,
    /// An equal (method, normalised value) rule already existed
    Duplicate,
    /// An existing third-party rule now belongs to the patient
    Promoted,
    /// No rule could be built; the scrubber is unchanged
    Skipped(ScrubError),
}

impl AddOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Whether the rule set changed
    pub fn changed(&self) -> bool {
        matches!(self, Self::Added | Self::Promoted)
    }
}

/// Shared state for building many patients' scrubbers
///
/// # Thread Safety
///
/// The factory is `Send + Sync`; the generic rules and the matcher cache are
/// shared by every scrubber it creates.
#[derive(Debug, Clone)]
pub struct ScrubberFactory {
    config: Arc<ScrubberConfig>,
    fingerprint: Arc<str>,
    nonspecific: NonspecificRules,
    engine: TextRedactionEngine,
    cache: Arc<MatcherCache>,
}

impl ScrubberFactory {
    /// Creates a factory from a full configuration
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if validation fails, or `PatternCompilation`
    /// if a generic rule cannot be compiled.
    pub fn new(config: &ScrubConfig) -> Result<Self> {
        config.validate().map_err(|e| {
            ScrubError::Configuration(format!("Configuration validation failed: {e}"))
        })?;

        let scrubber = &config.scrubber;
        let nonspecific =
            NonspecificRules::build(&config.nonspecific, &scrubber.replacement_text_nonspecific)?;

        tracing::info!(
            nonspecific_rules = nonspecific.len(),
            fuzzy_errors = scrubber.string_max_regex_errors,
            cache_capacity = scrubber.matcher_cache_capacity,
            "Scrubber factory ready"
        );

        Ok(Self {
            fingerprint: Arc::from(scrubber.fingerprint()),
            engine: TextRedactionEngine::new(&scrubber.allowlist, scrubber.max_text_bytes),
            cache: Arc::new(MatcherCache::new(scrubber.matcher_cache_capacity)),
            config: Arc::new(scrubber.clone()),
            nonspecific,
        })
    }

    /// An empty scrubber for an unnamed patient
    pub fn scrubber(&self) -> PersonalizedScrubber {
        PersonalizedScrubber {
            config: Arc::clone(&self.config),
            fingerprint: Arc::clone(&self.fingerprint),
            rules: BTreeMap::new(),
            nonspecific: self.nonspecific.clone(),
            engine: self.engine.clone(),
            cache: Some(Arc::clone(&self.cache)),
            patient_id: None,
            patient_defining: 0,
        }
    }

    /// An empty scrubber whose errors name `patient_id`
    pub fn scrubber_for(&self, patient_id: PatientId) -> PersonalizedScrubber {
        let mut scrubber = self.scrubber();
        scrubber.patient_id = Some(patient_id);
        scrubber
    }

    /// Builds a scrubber from a patient's values in one step
    pub fn build<I>(&self, patient_id: Option<PatientId>, values: I) -> PersonalizedScrubber
    where
        I: IntoIterator<Item = IdentifierValue>,
    {
        let mut scrubber = self.scrubber();
        scrubber.patient_id = patient_id;
        scrubber.add_all(values);
        scrubber
    }

    pub fn config(&self) -> &ScrubberConfig {
        &self.config
    }

    pub fn nonspecific_rules(&self) -> &NonspecificRules {
        &self.nonspecific
    }

    pub fn cache(&self) -> &MatcherCache {
        &self.cache
    }
}

/// The rules for one patient
#[derive(Debug, Clone)]
pub struct PersonalizedScrubber {
    config: Arc<ScrubberConfig>,
    fingerprint: Arc<str>,
    rules: BTreeMap<RuleKey, ScrubberRule>,
    nonspecific: NonspecificRules,
    engine: TextRedactionEngine,
    cache: Option<Arc<MatcherCache>>,
    patient_id: Option<PatientId>,
    patient_defining: usize,
}

impl PersonalizedScrubber {
    /// Creates a standalone scrubber with no generic rules and no shared cache
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the configuration is invalid.
    pub fn new(config: ScrubberConfig) -> Result<Self> {
        config.validate().map_err(|e| {
            ScrubError::Configuration(format!("Configuration validation failed: {e}"))
        })?;
        Ok(Self {
            fingerprint: Arc::from(config.fingerprint()),
            engine: TextRedactionEngine::new(&config.allowlist, config.max_text_bytes),
            config: Arc::new(config),
            rules: BTreeMap::new(),
            nonspecific: NonspecificRules::empty(),
            cache: None,
            patient_id: None,
            patient_defining: 0,
        })
    }

    /// Names the patient in scrub failures
    pub fn with_patient_id(mut self, patient_id: PatientId) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    /// Adds one identifying value
    ///
    /// The value is normalised and turned into a rule. A value whose
    /// (method, normalised value) is already present adds nothing, except
    /// that a patient value promotes an existing third-party rule. Values that
    /// cannot produce a rule are skipped with a warning; the error is
    /// returned in [`AddOutcome::Skipped`] and the scrubber is unchanged.
    pub fn add(&mut self, value: IdentifierValue) -> AddOutcome {
        let blueprint = match builder::build(&value, &self.config) {
            Ok(blueprint) => blueprint,
            Err(e) => return self.skip(&value, e),
        };
        if value.is_patient_defining {
            self.patient_defining += 1;
        }

        let source = RuleSource::from(value.source);
        if let Some(existing) = self.rules.get_mut(&blueprint.key) {
            if source == RuleSource::Patient && existing.source() == RuleSource::ThirdParty {
                *existing = existing.with_source(source, &self.config.replacement_text_patient);
                tracing::debug!(method = %blueprint.key.method, "Promoted third-party rule to patient");
                return AddOutcome::Promoted;
            }
            return AddOutcome::Duplicate;
        }

        let matcher = match self.compile(&blueprint) {
            Ok(matcher) => matcher,
            Err(e) => return self.skip(&value, e),
        };

        tracing::debug!(
            method = %blueprint.key.method,
            source = %source,
            fuzzy_errors = blueprint.fuzzy_error_budget,
            parts = matcher.part_count(),
            "Added scrubber rule"
        );

        let rule = ScrubberRule::new(
            source,
            self.tag_for(source),
            matcher,
            blueprint.min_length_to_apply,
            blueprint.fuzzy_error_budget,
        );
        self.rules.insert(blueprint.key, rule);
        AddOutcome::Added
    }

    /// Adds several values, returning one outcome per value
    pub fn add_all<I>(&mut self, values: I) -> Vec<AddOutcome>
    where
        I: IntoIterator<Item = IdentifierValue>,
    {
        values.into_iter().map(|v| self.add(v)).collect()
    }

    /// Ends assembly
    pub fn freeze(self) -> Arc<Self> {
        tracing::info!(
            rules = self.rules.len(),
            nonspecific_rules = self.nonspecific.len(),
            patient_defining = self.patient_defining,
            "Scrubber frozen"
        );
        Arc::new(self)
    }

    /// Number of patient and third-party rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether any patient-defining value has been added
    pub fn has_patient_defining(&self) -> bool {
        self.patient_defining > 0
    }

    pub fn patient_id(&self) -> Option<&PatientId> {
        self.patient_id.as_ref()
    }

    pub fn config(&self) -> &ScrubberConfig {
        &self.config
    }

    /// Patient and third-party rules in key order
    pub fn rules(&self) -> impl Iterator<Item = (&RuleKey, &ScrubberRule)> {
        self.rules.iter()
    }

    /// Source of the rule for `key`, if present
    pub fn source_of(&self, key: &RuleKey) -> Option<RuleSource> {
        self.rules.get(key).map(ScrubberRule::source)
    }

    /// Content digest of the rule set
    ///
    /// Equal for any two scrubbers holding the same (method, normalised
    /// value, source) rules under the same matching configuration, whatever
    /// order the values were added in.
    pub fn signature(&self) -> String {
        signature::compute(
            self.rules.iter().map(|(key, rule)| (key, rule.source())),
            &self.fingerprint,
            self.nonspecific.signature(),
        )
    }

    /// Scrubs `text` with caller-chosen patient and third-party tags
    ///
    /// # Errors
    ///
    /// Returns `RedactionFailure` if the text cannot be scrubbed.
    pub fn scrub<'t>(
        &self,
        text: &'t str,
        patient_replacement: &str,
        thirdparty_replacement: &str,
    ) -> Result<Redaction<'t>> {
        self.run(
            text,
            &Replacements::new(patient_replacement, thirdparty_replacement),
            &self.context(None),
        )
    }

    /// Scrubs `text` with the configured tags
    pub fn scrub_default<'t>(&self, text: &'t str) -> Result<Redaction<'t>> {
        self.run(text, &Replacements::rule_tags(), &self.context(None))
    }

    /// Scrubs one field's text with the configured tags
    ///
    /// Failures name this scrubber's patient and `field`.
    pub fn scrub_field<'t>(&self, text: &'t str, field: &FieldName) -> Result<Redaction<'t>> {
        self.run(text, &Replacements::rule_tags(), &self.context(Some(field)))
    }

    fn run<'t>(
        &self,
        text: &'t str,
        replacements: &Replacements<'_>,
        context: &ScrubContext,
    ) -> Result<Redaction<'t>> {
        let started = Instant::now();
        let rules: Vec<&ScrubberRule> = self
            .rules
            .values()
            .chain(self.nonspecific.rules())
            .collect();
        let redaction = self.engine.redact(text, &rules, replacements, context)?;
        log_scrub_complete!(text.len(), redaction.substitutions(), started.elapsed());
        Ok(redaction)
    }

    fn context(&self, field: Option<&FieldName>) -> ScrubContext {
        ScrubContext {
            patient_id: self.patient_id.clone(),
            field: field.cloned(),
        }
    }

    fn tag_for(&self, source: RuleSource) -> &str {
        match source {
            RuleSource::Patient => &self.config.replacement_text_patient,
            RuleSource::ThirdParty => &self.config.replacement_text_thirdparty,
            RuleSource::Nonspecific => &self.config.replacement_text_nonspecific,
        }
    }

    fn compile(&self, blueprint: &Blueprint) -> Result<Arc<CompiledMatcher>> {
        match &self.cache {
            Some(cache) => cache.get_or_compile(
                MatcherCacheKey {
                    rule: blueprint.key.clone(),
                    config_fingerprint: Arc::clone(&self.fingerprint),
                },
                || blueprint.compile(),
            ),
            None => blueprint.compile().map(Arc::new),
        }
    }

    fn skip(&self, value: &IdentifierValue, error: ScrubError) -> AddOutcome {
        log_identifier_skipped!(value.scrub_method, value.source, error);
        AddOutcome::Skipped(error)
    }
}
