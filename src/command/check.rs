use super::{open_output, Verdict};
use crate::check::CheckSelection;
use crate::config::{
    CheckConfig, ConsistencyConfig, LoudnessConfig, LoudnessMeasure, NamingConfig, SilenceConfig,
    SizeConfig, DEFAULT_CHANNELS, DEFAULT_MAX_BYTES, DEFAULT_MAX_DBFS, DEFAULT_MAX_SILENCE_RATIO,
    DEFAULT_MIN_BYTES, DEFAULT_MIN_DBFS, DEFAULT_MIN_SILENCE_SECONDS, DEFAULT_NAMING_PATTERN,
    DEFAULT_SAMPLE_RATE, DEFAULT_SAMPLE_WIDTH, DEFAULT_SILENCE_THRESHOLD_DBFS,
    DEFAULT_SILENCE_WINDOW,
};
use crate::report::Report;
use crate::validator::Validator;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Folder to validate
    #[arg(short, long)]
    pub input: PathBuf,

    /// Checks to run (format,consistency,naming,loudness,silence,size or all)
    #[arg(short, long, value_delimiter = ',', default_value = "all")]
    pub checks: Vec<String>,

    /// Expected sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Expected sample width in bytes
    #[arg(long, default_value_t = DEFAULT_SAMPLE_WIDTH)]
    pub sample_width: u16,

    /// Expected channel count
    #[arg(long, default_value_t = DEFAULT_CHANNELS)]
    pub channels: u16,

    /// Regular expression the whole file name must match
    #[arg(long, default_value = DEFAULT_NAMING_PATTERN)]
    pub pattern: String,

    /// Lower loudness bound
    #[arg(long, default_value_t = DEFAULT_MIN_DBFS, allow_negative_numbers = true)]
    pub min_dbfs: f64,

    /// Upper loudness bound
    #[arg(long, default_value_t = DEFAULT_MAX_DBFS, allow_negative_numbers = true)]
    pub max_dbfs: f64,

    /// Loudness measure used for the bounds
    #[arg(long, value_enum, default_value_t = LoudnessMeasure::Rms)]
    pub measure: LoudnessMeasure,

    /// Level below which a window counts as silent, in dBFS
    #[arg(long, default_value_t = DEFAULT_SILENCE_THRESHOLD_DBFS, allow_negative_numbers = true)]
    pub silence_threshold: f64,

    /// Frames per silence analysis window
    #[arg(long, default_value_t = DEFAULT_SILENCE_WINDOW)]
    pub silence_window: usize,

    /// Shortest silent run that counts, in seconds
    #[arg(long, default_value_t = DEFAULT_MIN_SILENCE_SECONDS)]
    pub min_silence: f64,

    /// Largest tolerated share of silence (0.0 - 1.0)
    #[arg(long, default_value_t = DEFAULT_MAX_SILENCE_RATIO)]
    pub max_silence_ratio: f64,

    /// Smallest accepted file size in bytes
    #[arg(long, default_value_t = DEFAULT_MIN_BYTES)]
    pub min_size: u64,

    /// Largest accepted file size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    pub max_size: u64,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Output file for the report
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CheckArgs {
    pub fn to_config(&self) -> CheckConfig {
        CheckConfig {
            consistency: ConsistencyConfig {
                sample_rate: self.sample_rate,
                sample_width: self.sample_width,
                channels: self.channels,
            },
            naming: NamingConfig {
                pattern: self.pattern.clone(),
            },
            loudness: LoudnessConfig {
                min_dbfs: self.min_dbfs,
                max_dbfs: self.max_dbfs,
                measure: self.measure,
            },
            silence: SilenceConfig {
                threshold_dbfs: self.silence_threshold,
                window_size: self.silence_window,
                min_duration: self.min_silence,
                max_ratio: self.max_silence_ratio,
            },
            size: SizeConfig {
                min_bytes: self.min_size,
                max_bytes: self.max_size,
            },
        }
    }
}

pub fn write_report(report: &Report, format: ReportFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        ReportFormat::Text => out.write_all(report.render_text().as_bytes())?,
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report).context("Failed to serialize report")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

// Validate the folder and print the report
pub fn run_checks(args: &CheckArgs) -> Result<Verdict> {
    let selection = CheckSelection::parse(args.checks.as_slice())?;
    let validator = Validator::new(&args.to_config(), selection)?;
    let report = validator.run(&args.input)?;

    let mut out = open_output(args.output.as_ref())?;
    write_report(&report, args.format, out.as_mut())?;
    out.flush()?;

    Ok(if report.has_errors() {
        Verdict::Violations
    } else {
        Verdict::Clean
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: CheckArgs,
    }

    #[test]
    fn test_defaults_match_library_defaults() {
        let cli = TestCli::try_parse_from(["soundchecker", "--input", "."]).unwrap();
        assert_eq!(cli.args.to_config(), CheckConfig::default());
        assert_eq!(cli.args.checks, vec!["all"]);
    }

    #[test]
    fn test_negative_bounds_and_check_list() {
        let cli = TestCli::try_parse_from([
            "soundchecker",
            "-i",
            "music",
            "-c",
            "format,naming",
            "--min-dbfs",
            "-30",
            "--max-dbfs",
            "-1.5",
            "--measure",
            "lufs",
        ])
        .unwrap();
        let config = cli.args.to_config();
        assert_eq!(cli.args.checks, vec!["format", "naming"]);
        assert_eq!(config.loudness.min_dbfs, -30.0);
        assert_eq!(config.loudness.max_dbfs, -1.5);
        assert_eq!(config.loudness.measure, LoudnessMeasure::Lufs);
    }

    #[test]
    fn test_run_checks_reports_config_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = TestCli::try_parse_from([
            "soundchecker",
            "-i",
            dir.path().to_str().unwrap(),
            "-c",
            "volume",
        ])
        .unwrap();
        assert!(run_checks(&cli.args).is_err());
    }
}
