//! Check library: one stateless rule per module.
//!
//! Every check takes the file reference, whatever metadata it needs and its
//! own config, and returns zero or more findings.

pub mod consistency;
pub mod format;
pub mod loudness;
pub mod naming;
pub mod silence;
pub mod size;

use crate::error::ConfigError;

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Check identifiers, declared in the order checks run for each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckId {
    Format,
    Consistency,
    Naming,
    Loudness,
    Silence,
    Size,
}

impl CheckId {
    pub const ALL: [CheckId; 6] = [
        CheckId::Format,
        CheckId::Consistency,
        CheckId::Naming,
        CheckId::Loudness,
        CheckId::Silence,
        CheckId::Size,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Consistency => "consistency",
            Self::Naming => "naming",
            Self::Loudness => "loudness",
            Self::Silence => "silence",
            Self::Size => "size",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Format => "File opens as a valid stream of its container",
            Self::Consistency => "Sample rate, sample width and channel count match",
            Self::Naming => "File name matches the naming pattern",
            Self::Loudness => "Overall level lies within the loudness range",
            Self::Silence => "Silent passages stay below the allowed share",
            Self::Size => "File size lies within the size bounds",
        }
    }

    /// Needs the header-only read
    pub fn needs_header(&self) -> bool {
        matches!(self, Self::Format | Self::Consistency)
    }

    /// Needs the full sample decode
    pub fn needs_samples(&self) -> bool {
        matches!(self, Self::Loudness | Self::Silence)
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CheckId::ALL
            .into_iter()
            .find(|check| check.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownCheck(s.to_string()))
    }
}

/// A non-empty set of checks, iterated in run order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSelection {
    checks: BTreeSet<CheckId>,
}

impl CheckSelection {
    pub fn all() -> Self {
        Self {
            checks: CheckId::ALL.into_iter().collect(),
        }
    }

    pub fn new(checks: impl IntoIterator<Item = CheckId>) -> Result<Self, ConfigError> {
        let checks: BTreeSet<CheckId> = checks.into_iter().collect();
        if checks.is_empty() {
            return Err(ConfigError::EmptySelection);
        }
        Ok(Self { checks })
    }

    /// Parses identifiers such as `["format", "naming"]` or `["all"]`.
    ///
    /// Any unknown identifier rejects the whole selection.
    pub fn parse<S: AsRef<str>>(ids: &[S]) -> Result<Self, ConfigError> {
        let mut checks = BTreeSet::new();
        for id in ids {
            let id = id.as_ref();
            if id.trim().eq_ignore_ascii_case("all") {
                checks.extend(CheckId::ALL);
            } else {
                checks.insert(id.parse::<CheckId>()?);
            }
        }
        Self::new(checks)
    }

    pub fn iter(&self) -> impl Iterator<Item = CheckId> + '_ {
        self.checks.iter().copied()
    }

    pub fn contains(&self, check: CheckId) -> bool {
        self.checks.contains(&check)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn needs_header(&self) -> bool {
        self.iter().any(|check| check.needs_header())
    }

    pub fn needs_samples(&self) -> bool {
        self.iter().any(|check| check.needs_samples())
    }
}

impl Default for CheckSelection {
    fn default() -> Self {
        Self::all()
    }
}
