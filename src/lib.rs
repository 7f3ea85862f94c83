// phiscrub - Personalized identifier scrubbing for clinical free text
// Copyright (c) 2025 Atlas Contributors
// Licensed under the MIT License

//! # phiscrub - Personalized Clinical Text Scrubbing
//!
//! phiscrub removes identifying information from clinical free text. Given
//! what is known about one patient (names, dates of birth, telephone numbers,
//! hospital numbers, postcodes) and the people around them (relatives, GPs),
//! it builds a scrubber that finds every common surface form of those values
//! in a note and replaces them with a marker.
//!
//! ## Overview
//!
//! This library provides:
//! - **Pattern construction** from identifier values, one strategy per scrub
//!   method (words, phrase, numeric, date, code), with optional fuzzy matching
//! - **Generic rules** for identifiers whose shape alone identifies them
//!   (UK postcodes, n-digit numbers, e-mail addresses, denylist words)
//! - **Redaction** with deterministic overlap resolution and per-source
//!   replacement tags
//! - **Signatures** so a driver can skip patients whose identifiers have not
//!   changed
//!
//! ## Architecture
//!
//! - [`domain`] - Identifier values, scrub methods and error types
//! - [`scrub`] - Builders, matchers, the redaction engine and the scrubber
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust
//! use phiscrub::config::ScrubConfig;
//! use phiscrub::domain::{IdentifierValue, ScrubMethod};
//! use phiscrub::scrub::ScrubberFactory;
//!
//! # fn main() -> phiscrub::domain::Result<()> {
//! let factory = ScrubberFactory::new(&ScrubConfig::default())?;
//!
//! let mut scrubber = factory.scrubber();
//! scrubber.add(IdentifierValue::patient("Ronald MacDonald", ScrubMethod::Words));
//! scrubber.add(IdentifierValue::patient("CB2 0QQ", ScrubMethod::Code));
//! let scrubber = scrubber.freeze();
//!
//! let redaction = scrubber.scrub_default("Mr MacDonald of CB2 0QQ")?;
//! assert_eq!(redaction.text, "Mr [__PPP__] of [__PPP__]");
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Scrubbers are assembled with `&mut self` and used with `&self`. A frozen
//! scrubber is an `Arc` that any number of threads may scrub with at once.
//! Compiled matchers are shared across patients through a bounded cache.
//!
//! ## Error Handling
//!
//! phiscrub uses the [`domain::ScrubError`] type for all errors:
//!
//! ```rust,no_run
//! use phiscrub::domain::ScrubError;
//!
//! fn example() -> Result<(), ScrubError> {
//!     let config = phiscrub::config::load_config("phiscrub.toml")?;
//!     let factory = phiscrub::scrub::ScrubberFactory::new(&config)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! phiscrub uses structured logging with the `tracing` crate. Log records
//! never contain identifier values or scrubbed text.

pub mod config;
pub mod domain;
pub mod logging;
pub mod scrub;

pub use config::ScrubConfig;
pub use domain::{IdentifierSource, IdentifierValue, ScrubError, ScrubMethod};
pub use scrub::{PersonalizedScrubber, Redaction, ScrubberFactory};
