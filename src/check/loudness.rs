use super::CheckId;
use crate::audio::AudioSamples;
use crate::config::{LoudnessConfig, LoudnessMeasure};
use crate::error::DecodeError;
use crate::report::{Finding, FindingKind};
use crate::utils::detection::{amplitude_to_dbfs, calculate_rms};
use crate::utils::AudioFileRef;

use ebur128::{EbuR128, Mode};

/// Overall level of the decoded audio in the unit of `measure`.
pub fn measure(samples: &AudioSamples, measure: LoudnessMeasure) -> Result<f64, String> {
    match measure {
        LoudnessMeasure::Rms => Ok(amplitude_to_dbfs(calculate_rms(&samples.samples))),
        LoudnessMeasure::Lufs => {
            let mut meter = EbuR128::new(samples.channels as u32, samples.sample_rate, Mode::I)
                .map_err(|e| format!("EBU R128 setup failed: {:?}", e))?;
            meter
                .add_frames_f32(&samples.samples)
                .map_err(|e| format!("EBU R128 analysis failed: {:?}", e))?;
            meter
                .loudness_global()
                .map_err(|e| format!("EBU R128 analysis failed: {:?}", e))
        }
    }
}

/// Returns the decoded samples, or the skip finding explaining why there are
/// none to measure. Shared with the silence check.
pub(crate) fn usable_samples<'a>(
    file: &AudioFileRef,
    check: CheckId,
    samples: &'a Result<AudioSamples, DecodeError>,
) -> Result<&'a AudioSamples, Finding> {
    if let Some(reason) = &file.stat_error {
        return Err(Finding::skipped(
            file,
            check,
            format!("cannot read file: {}", reason),
        ));
    }
    if file.size == 0 {
        return Err(Finding::skipped(file, check, "empty file"));
    }
    match samples {
        Ok(samples) if samples.is_empty() => {
            Err(Finding::skipped(file, check, "no audio frames"))
        }
        Ok(samples) => Ok(samples),
        Err(err) => Err(Finding::skipped(
            file,
            check,
            format!("cannot decode: {}", err.reason()),
        )),
    }
}

fn format_level(level: f64, unit: &str) -> String {
    if level.is_finite() {
        format!("{:.1} {}", level, unit)
    } else {
        format!("-inf {}", unit)
    }
}

pub fn check(
    file: &AudioFileRef,
    samples: &Result<AudioSamples, DecodeError>,
    config: &LoudnessConfig,
) -> Vec<Finding> {
    let samples = match usable_samples(file, CheckId::Loudness, samples) {
        Ok(samples) => samples,
        Err(skip) => return vec![skip],
    };

    let level = match measure(samples, config.measure) {
        Ok(level) => level,
        Err(reason) => return vec![Finding::skipped(file, CheckId::Loudness, reason)],
    };
    if level.is_nan() {
        return vec![Finding::skipped(
            file,
            CheckId::Loudness,
            "level is not a number",
        )];
    }

    let unit = config.measure.unit();
    if level < config.min_dbfs {
        vec![
            Finding::new(file, CheckId::Loudness, FindingKind::TooQuiet, "too quiet")
                .with_measurement(
                    format_level(level, unit),
                    "<",
                    format_level(config.min_dbfs, unit),
                ),
        ]
    } else if level > config.max_dbfs {
        vec![
            Finding::new(file, CheckId::Loudness, FindingKind::TooLoud, "too loud")
                .with_measurement(
                    format_level(level, unit),
                    ">",
                    format_level(config.max_dbfs, unit),
                ),
        ]
    } else {
        Vec::new()
    }
}
