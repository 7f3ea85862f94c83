//! Identifier scrubbing
//!
//! # Architecture
//!
//! ```text
//! IdentifierValue ─► builder ─► Fragment ─► CompiledMatcher ─► ScrubberRule
//!                                              ▲ (MatcherCache)      │
//!                                              │                     ▼
//!             NonspecificConfig ─► NonspecificRules ─► TextRedactionEngine ─► Redaction
//! ```
//!
//! - [`builder`] normalises identifier values and describes their surface
//!   forms as [`Fragment`]s
//! - [`matcher`] compiles fragments into regex and fuzzy parts with a
//!   boundary policy
//! - [`engine`] collects matches, resolves overlaps and substitutes tags
//! - [`scrubber`] assembles everything per patient
//!
//! # Example
//!
//! ```
//! use phiscrub::config::ScrubberConfig;
//! use phiscrub::domain::{IdentifierValue, ScrubMethod};
//! use phiscrub::scrub::PersonalizedScrubber;
//!
//! let mut scrubber = PersonalizedScrubber::new(ScrubberConfig::default()).unwrap();
//! scrubber.add(IdentifierValue::patient("01223 123456", ScrubMethod::Numeric));
//! scrubber.add(IdentifierValue::third_party("Jean Smith", ScrubMethod::Words));
//!
//! let redaction = scrubber
//!     .scrub_default("Jean rang on 01223-123-456")
//!     .unwrap();
//! assert_eq!(redaction.text, "[__TTT__] rang on [__PPP__]");
//! ```

pub mod builder;
pub mod cache;
pub mod engine;
pub mod fragment;
pub mod fuzzy;
pub mod matcher;
pub mod nonspecific;
pub mod rule;
pub mod scrubber;
pub mod signature;

pub use cache::{MatcherCache, MatcherCacheKey};
pub use engine::{Redaction, Replacements, SourceCounts, TextRedactionEngine};
pub use fragment::Fragment;
pub use matcher::{Boundary, CompiledMatcher};
pub use nonspecific::NonspecificRules;
pub use rule::{RuleKey, RuleSource, ScrubberRule};
pub use scrubber::{AddOutcome, PersonalizedScrubber, ScrubberFactory};
