//! Format-parameter consistency.
//!
//! Parameters are compared in a fixed order (sample rate, sample width,
//! channel count) and only the first mismatch is reported, so a file that
//! differs in several parameters still yields a single finding.

use super::CheckId;
use crate::audio::AudioHeader;
use crate::config::ConsistencyConfig;
use crate::error::DecodeError;
use crate::report::{Finding, FindingKind};
use crate::utils::AudioFileRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    SampleRate,
    SampleWidth,
    Channels,
}

impl Parameter {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SampleRate => "sample rate",
            Self::SampleWidth => "sample width",
            Self::Channels => "channel count",
        }
    }

    fn describe(&self, value: u32) -> String {
        match self {
            Self::SampleRate => format!("{} Hz", value),
            Self::SampleWidth => format!("{} bytes", value),
            Self::Channels => format!("{} channels", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub parameter: Parameter,
    pub actual: u32,
    pub expected: u32,
}

/// (parameter, actual, expected) in evaluation order.
///
/// `actual` is `None` when the stream has no such parameter (sample width of
/// a lossy codec); that comparison is then not evaluated.
fn comparisons(
    header: &AudioHeader,
    config: &ConsistencyConfig,
) -> [(Parameter, Option<u32>, u32); 3] {
    [
        (
            Parameter::SampleRate,
            Some(header.sample_rate),
            config.sample_rate,
        ),
        (
            Parameter::SampleWidth,
            header.sample_width().map(u32::from),
            config.sample_width as u32,
        ),
        (
            Parameter::Channels,
            Some(header.channels as u32),
            config.channels as u32,
        ),
    ]
}

pub fn first_mismatch(header: &AudioHeader, config: &ConsistencyConfig) -> Option<Mismatch> {
    comparisons(header, config)
        .into_iter()
        .find_map(|(parameter, actual, expected)| match actual {
            Some(actual) if actual != expected => Some(Mismatch {
                parameter,
                actual,
                expected,
            }),
            _ => None,
        })
}

pub fn check(
    file: &AudioFileRef,
    header: &Result<AudioHeader, DecodeError>,
    config: &ConsistencyConfig,
) -> Vec<Finding> {
    let header = match header {
        Ok(header) => header,
        Err(err) => {
            return vec![Finding::skipped(
                file,
                CheckId::Consistency,
                format!("header unavailable: {}", err.reason()),
            )]
        }
    };

    first_mismatch(header, config)
        .map(|m| {
            Finding::new(
                file,
                CheckId::Consistency,
                FindingKind::ParameterMismatch,
                format!("{} mismatch", m.parameter.label()),
            )
            .with_measurement(
                m.parameter.describe(m.actual),
                "!=",
                m.parameter.describe(m.expected),
            )
        })
        .into_iter()
        .collect()
}
