//! Level measurement and window-based silence detection.

#[derive(Clone, Debug)]
pub struct SilenceDetection {
    pub threshold: f32,    // 無音とみなす振幅のスレッショルド値（リニア）
    pub window_size: usize, // 1ウィンドウあたりのフレーム数
    pub min_duration: f64, // 無音区間として数える最小持続時間（秒）
}

/// Result of scanning a buffer for silent runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SilenceProfile {
    /// Total length of runs at least `min_duration` long
    pub silent_seconds: f64,
    /// Longest silent run of any length
    pub longest_run: f64,
    pub total_seconds: f64,
    /// Windows whose RMS is NaN
    pub nan_windows: usize,
}

impl SilenceProfile {
    /// Fraction of the audio covered by qualifying silent runs
    pub fn ratio(&self) -> f64 {
        if self.total_seconds <= 0.0 {
            return 0.0;
        }
        (self.silent_seconds / self.total_seconds).min(1.0)
    }
}

impl SilenceDetection {
    /// Marks each window of `window_size` frames as silent or not.
    ///
    /// A window is silent when its RMS level is below the threshold. The last
    /// window may be shorter than the others.
    pub fn silent_windows<'a>(
        &'a self,
        samples: &'a [f32],
        channels: usize,
    ) -> impl Iterator<Item = (usize, bool)> + 'a {
        self.window_levels(samples, channels)
            .map(move |(frames, rms)| (frames, rms < self.threshold))
    }

    // (フレーム数, RMS) をウィンドウごとに返す
    fn window_levels<'a>(
        &self,
        samples: &'a [f32],
        channels: usize,
    ) -> impl Iterator<Item = (usize, f32)> + 'a {
        let channels = channels.max(1);
        samples
            .chunks(self.window_size.max(1) * channels)
            .map(move |window| (window.len() / channels, calculate_rms(window)))
    }

    pub fn analyze(&self, samples: &[f32], channels: u16, sample_rate: u32) -> SilenceProfile {
        if sample_rate == 0 {
            return SilenceProfile::default();
        }
        let rate = sample_rate as f64;
        let mut profile = SilenceProfile {
            total_seconds: samples.len() as f64 / channels.max(1) as f64 / rate,
            ..SilenceProfile::default()
        };

        let mut run_frames = 0usize;
        let close_run = |run_frames: &mut usize, profile: &mut SilenceProfile| {
            let seconds = *run_frames as f64 / rate;
            if seconds >= self.min_duration && *run_frames > 0 {
                profile.silent_seconds += seconds;
            }
            profile.longest_run = profile.longest_run.max(seconds);
            *run_frames = 0;
        };

        for (frames, rms) in self.window_levels(samples, channels as usize) {
            if rms.is_nan() {
                profile.nan_windows += 1;
                close_run(&mut run_frames, &mut profile);
            } else if rms < self.threshold {
                run_frames += frames;
            } else if run_frames > 0 {
                close_run(&mut run_frames, &mut profile);
            }
        }
        close_run(&mut run_frames, &mut profile);

        profile
    }
}

// RMSエネルギーを計算する関数
pub fn calculate_rms(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = window.iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum_squares / window.len() as f64).sqrt() as f32
}

pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}

/// Linear amplitude to dBFS; digital silence maps to negative infinity
pub fn amplitude_to_dbfs(amplitude: f32) -> f64 {
    if amplitude <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * (amplitude as f64).log10()
    }
}

pub fn dbfs_to_amplitude(dbfs: f64) -> f32 {
    10f64.powf(dbfs / 20.0) as f32
}
