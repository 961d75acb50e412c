//! Per-check parameters and their validation.

use crate::check::naming::NamingRule;
use crate::check::{CheckId, CheckSelection};
use crate::error::{ConfigError, Result};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_SAMPLE_WIDTH: u16 = 2;
pub const DEFAULT_CHANNELS: u16 = 2;
pub const DEFAULT_NAMING_PATTERN: &str = r"^file\d+_[A-Za-z0-9_]+\.wav$";
pub const DEFAULT_MIN_DBFS: f64 = -20.0;
pub const DEFAULT_MAX_DBFS: f64 = -3.0;
pub const DEFAULT_SILENCE_THRESHOLD_DBFS: f64 = -60.0;
pub const DEFAULT_SILENCE_WINDOW: usize = 1024;
pub const DEFAULT_MIN_SILENCE_SECONDS: f64 = 1.0;
pub const DEFAULT_MAX_SILENCE_RATIO: f64 = 0.25;
/// Smallest canonical WAV header
pub const DEFAULT_MIN_BYTES: u64 = 44;
/// RIFF sizes are 32-bit
pub const DEFAULT_MAX_BYTES: u64 = u32::MAX as u64;

/// How the loudness check measures overall level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoudnessMeasure {
    /// RMS level in dBFS
    #[default]
    Rms,
    /// EBU R128 integrated loudness in LUFS
    Lufs,
}

impl LoudnessMeasure {
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Rms => "dBFS",
            Self::Lufs => "LUFS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    /// Expected sample rate in Hz
    pub sample_rate: u32,
    /// Expected sample width in bytes
    pub sample_width: u16,
    pub channels: u16,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            sample_width: DEFAULT_SAMPLE_WIDTH,
            channels: DEFAULT_CHANNELS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Regular expression the whole base name must match
    pub pattern: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_NAMING_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoudnessConfig {
    pub min_dbfs: f64,
    pub max_dbfs: f64,
    pub measure: LoudnessMeasure,
}

impl Default for LoudnessConfig {
    fn default() -> Self {
        Self {
            min_dbfs: DEFAULT_MIN_DBFS,
            max_dbfs: DEFAULT_MAX_DBFS,
            measure: LoudnessMeasure::Rms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilenceConfig {
    /// Windows whose RMS level is below this are silent
    pub threshold_dbfs: f64,
    /// Frames per analysis window
    pub window_size: usize,
    /// Shortest silent run that counts, in seconds
    pub min_duration: f64,
    /// Largest tolerated share of counted silence, 0.0 to 1.0
    pub max_ratio: f64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            threshold_dbfs: DEFAULT_SILENCE_THRESHOLD_DBFS,
            window_size: DEFAULT_SILENCE_WINDOW,
            min_duration: DEFAULT_MIN_SILENCE_SECONDS,
            max_ratio: DEFAULT_MAX_SILENCE_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeConfig {
    pub min_bytes: u64,
    pub max_bytes: u64,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            min_bytes: DEFAULT_MIN_BYTES,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Parameters for every check; only the selected ones are validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    pub consistency: ConsistencyConfig,
    pub naming: NamingConfig,
    pub loudness: LoudnessConfig,
    pub silence: SilenceConfig,
    pub size: SizeConfig,
}

/// A config that passed validation, with the naming pattern compiled.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub consistency: ConsistencyConfig,
    pub naming: Option<NamingRule>,
    pub loudness: LoudnessConfig,
    pub silence: SilenceConfig,
    pub size: SizeConfig,
}

fn require(ok: bool, parameter: &'static str, reason: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: reason.to_string(),
        })
    }
}

fn require_range<T: PartialOrd + ToString>(parameter: &'static str, min: T, max: T) -> Result<()> {
    if min > max {
        return Err(ConfigError::InvalidRange {
            parameter,
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

impl ConsistencyConfig {
    pub fn validate(&self) -> Result<()> {
        require(self.sample_rate > 0, "sample rate", "must be positive")?;
        require(self.sample_width > 0, "sample width", "must be positive")?;
        require(self.channels > 0, "channel count", "must be positive")
    }
}

impl LoudnessConfig {
    pub fn validate(&self) -> Result<()> {
        require(self.min_dbfs.is_finite(), "minimum loudness", "must be finite")?;
        require(self.max_dbfs.is_finite(), "maximum loudness", "must be finite")?;
        require_range("loudness", self.min_dbfs, self.max_dbfs)
    }
}

impl SilenceConfig {
    pub fn validate(&self) -> Result<()> {
        require(
            self.threshold_dbfs.is_finite(),
            "silence threshold",
            "must be finite",
        )?;
        require(self.window_size > 0, "silence window", "must be at least one frame")?;
        require(
            self.min_duration.is_finite() && self.min_duration >= 0.0,
            "minimum silence duration",
            "must be zero or more seconds",
        )?;
        require(
            (0.0..=1.0).contains(&self.max_ratio),
            "maximum silence ratio",
            "must be between 0 and 1",
        )
    }
}

impl SizeConfig {
    pub fn validate(&self) -> Result<()> {
        require_range("file size", self.min_bytes, self.max_bytes)
    }
}

impl CheckConfig {
    /// Validates the parameters of each selected check.
    ///
    /// Fails on the first contradiction so that no file is scanned against a
    /// range that cannot be satisfied.
    pub fn validate(&self, selection: &CheckSelection) -> Result<ValidatedConfig> {
        let mut naming = None;
        for check in selection.iter() {
            match check {
                CheckId::Format => {}
                CheckId::Consistency => self.consistency.validate()?,
                CheckId::Naming => naming = Some(NamingRule::new(&self.naming.pattern)?),
                CheckId::Loudness => self.loudness.validate()?,
                CheckId::Silence => self.silence.validate()?,
                CheckId::Size => self.size.validate()?,
            }
        }

        Ok(ValidatedConfig {
            consistency: self.consistency.clone(),
            naming,
            loudness: self.loudness.clone(),
            silence: self.silence.clone(),
            size: self.size.clone(),
        })
    }
}
