use super::CheckId;
use crate::error::ConfigError;
use crate::report::{Finding, FindingKind};
use crate::utils::AudioFileRef;

use regex::Regex;

/// Naming pattern compiled to match whole file names only.
#[derive(Debug, Clone)]
pub struct NamingRule {
    pattern: String,
    regex: Regex,
}

impl NamingRule {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        // Anchor both ends so a substring match is not enough
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Matches the base name, never the full path.
pub fn check(file: &AudioFileRef, rule: &NamingRule) -> Vec<Finding> {
    if rule.matches(&file.name) {
        return Vec::new();
    }
    vec![Finding::new(
        file,
        CheckId::Naming,
        FindingKind::NamingViolation,
        "name does not match naming pattern",
    )
    .with_measurement(&file.name, "!~", rule.pattern())]
}
