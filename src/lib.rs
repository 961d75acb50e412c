//! Batch validation of audio files in a folder tree.
//!
//! The engine walks a folder, reads each audio file at most once per
//! granularity (header or full samples) and runs a selected set of checks,
//! collecting the findings into a [`Report`].
//!
//! ```no_run
//! use soundchecker::{CheckConfig, CheckSelection, Validator};
//! use std::path::Path;
//!
//! let selection = CheckSelection::parse(&["format", "naming"]).unwrap();
//! let validator = Validator::new(&CheckConfig::default(), selection).unwrap();
//! let report = validator.run(Path::new("samples")).unwrap();
//!
//! for finding in &report.findings {
//!     println!("{finding}");
//! }
//! ```

pub mod audio;
pub mod check;
pub mod command;
pub mod config;
pub mod error;
pub mod report;
pub mod utils;
pub mod validator;

pub use check::{CheckId, CheckSelection};
pub use config::{CheckConfig, LoudnessMeasure};
pub use error::{ConfigError, DecodeError};
pub use report::{CheckSummary, Finding, FindingKind, Measurement, Report, Severity};
pub use utils::{AudioFileRef, WalkError};
pub use validator::{FileOutcome, Validator};

pub const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "flac", "mp3", "aac", "m4a", "ogg", "oga", "aiff", "aif", "caf", "mka", "webm",
];
