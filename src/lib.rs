//! # Civic Eye
//!
//! Forensic trust scoring for photographs submitted as evidence in citizen
//! reports. Given one image, the crate estimates how likely it is to be
//! unmanipulated (a trust score from 0 to 100) and combines that score with
//! the report's issue type into a review severity.
//!
//! # Architecture: One-Way Pipeline
//!
//! ```text
//! 1. Decode     bytes     →  ImageBuffer + Option<ExifRecord>
//! 2. Analyze    buffer    →  [ELA, Metadata, Shadow] SignalResults   (parallel)
//! 3. Fuse       signals   →  trust score
//! 4. Classify   score     →  severity
//! ```
//!
//! Every stage after decoding is a pure function of its inputs and the
//! configuration. Nothing is cached or shared between invocations, so two
//! assessments of the same bytes at the same reference time are identical.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Entry points: [`pipeline::assess`], [`pipeline::assess_at`], [`pipeline::assess_decoded`] |
//! | [`imaging`] | Decoding, size limits, normalization, JPEG recompression, pixel math |
//! | [`exif`] | EXIF and XMP extraction into an [`exif::ExifRecord`] |
//! | [`analysis`] | The three signal extractors behind the [`analysis::Analyzer`] trait |
//! | [`fusion`] | Confidence-weighted trust fusion |
//! | [`severity`] | Issue types and the severity lookup table |
//! | [`config`] | TOML configuration: defaults, merging, validation, stock file |
//! | [`types`] | Result records serialized across the library boundary |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Degrade, Don't Fail
//!
//! Only input problems are errors ([`imaging::InputError`]): undecodable
//! bytes, formats other than JPEG and PNG, and images over the configured
//! size limits. Everything an analyzer can run into after that (stripped
//! metadata, featureless content, a recompression hiccup) is reported as a
//! low-confidence signal, and fusion gives low-confidence signals little
//! say. With no confident signal at all the trust score is neutral.
//!
//! ## Configuration as Data
//!
//! Every weight, threshold, grid size and the severity table itself live in
//! [`config::ForensicsConfig`]. Defaults are compiled in; a sparse TOML file
//! overrides only what it names. Run `civic-eye gen-config` for a documented
//! file.
//!
//! ## Pure-Rust Codecs
//!
//! Decoding and JPEG recompression use the `image` crate, EXIF parsing uses
//! `kamadak-exif`. No system libraries are required.

pub mod analysis;
pub mod config;
pub mod exif;
pub mod fusion;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod severity;
pub mod types;

pub use config::ForensicsConfig;
pub use imaging::InputError;
pub use pipeline::{assess, assess_at, assess_decoded};
pub use severity::IssueType;
pub use types::{Assessment, SignalKind, SignalResult, TrustResult};

#[cfg(test)]
pub(crate) mod test_helpers;
