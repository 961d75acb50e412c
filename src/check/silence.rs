use super::loudness::usable_samples;
use super::CheckId;
use crate::audio::AudioSamples;
use crate::config::SilenceConfig;
use crate::error::DecodeError;
use crate::report::{Finding, FindingKind};
use crate::utils::detection::{dbfs_to_amplitude, SilenceDetection, SilenceProfile};
use crate::utils::AudioFileRef;

pub fn detector(config: &SilenceConfig) -> SilenceDetection {
    SilenceDetection {
        threshold: dbfs_to_amplitude(config.threshold_dbfs),
        window_size: config.window_size,
        min_duration: config.min_duration,
    }
}

pub fn profile(samples: &AudioSamples, config: &SilenceConfig) -> SilenceProfile {
    detector(config).analyze(&samples.samples, samples.channels, samples.sample_rate)
}

pub fn check(
    file: &AudioFileRef,
    samples: &Result<AudioSamples, DecodeError>,
    config: &SilenceConfig,
) -> Vec<Finding> {
    let samples = match usable_samples(file, CheckId::Silence, samples) {
        Ok(samples) => samples,
        Err(skip) => return vec![skip],
    };

    let profile = profile(samples, config);
    if profile.nan_windows > 0 {
        return vec![Finding::skipped(
            file,
            CheckId::Silence,
            "level is not a number",
        )];
    }
    let ratio = profile.ratio();
    if ratio <= config.max_ratio {
        return Vec::new();
    }

    vec![Finding::new(
        file,
        CheckId::Silence,
        FindingKind::ExcessiveSilence,
        format!(
            "excessive silence, longest run {:.2} s of {:.2} s",
            profile.longest_run, profile.total_seconds
        ),
    )
    .with_measurement(
        format!("{:.1}%", ratio * 100.0),
        ">",
        format!("{:.1}%", config.max_ratio * 100.0),
    )]
}
