//! Validation orchestrator.
//!
//! Enumerates the folder once and, per audio file, reads the header and the
//! samples at most once each, only when a selected check needs them. Both
//! are dropped before the next file is visited.

use crate::audio::DecoderRegistry;
use crate::check::{consistency, format, loudness, naming, silence, size};
use crate::check::{CheckId, CheckSelection};
use crate::config::{CheckConfig, ValidatedConfig};
use crate::error::ConfigError;
use crate::report::{Finding, Report};
use crate::utils::{walk_files, AudioFileRef, WalkError};

use std::cell::OnceCell;
use std::path::Path;
use tracing::{debug, info};

/// Findings of every selected check for one file, in run order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: AudioFileRef,
    pub results: Vec<(CheckId, Vec<Finding>)>,
}

pub struct Validator {
    config: ValidatedConfig,
    selection: CheckSelection,
    decoders: DecoderRegistry,
}

impl Validator {
    /// Validates the config of every selected check up front.
    pub fn new(config: &CheckConfig, selection: CheckSelection) -> Result<Self, ConfigError> {
        let config = config.validate(&selection)?;
        Ok(Self {
            config,
            selection,
            decoders: DecoderRegistry::default(),
        })
    }

    /// Replaces the decoder set, e.g. to add a container format.
    pub fn with_decoders(mut self, decoders: DecoderRegistry) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn selection(&self) -> &CheckSelection {
        &self.selection
    }

    /// Lazily validates each audio file under `root`.
    ///
    /// Entries the walk could not read come through as `Err` and the scan
    /// carries on. Dropping the iterator early stops the scan; nothing is
    /// left half written.
    pub fn scan<'a>(
        &'a self,
        root: &Path,
    ) -> Result<impl Iterator<Item = Result<FileOutcome, WalkError>> + 'a, ConfigError> {
        let entries = walk_files(root)?;
        Ok(entries.filter_map(move |entry| match entry {
            Ok(file) if self.decoders.supports(&file) => Some(Ok(self.validate_file(file))),
            Ok(file) => {
                debug!("Ignoring non-audio file {}", file.relative.display());
                None
            }
            Err(err) => Some(Err(err)),
        }))
    }

    /// Runs the selected checks against one file in fixed order.
    pub fn validate_file(&self, file: AudioFileRef) -> FileOutcome {
        let header = OnceCell::new();
        let samples = OnceCell::new();

        let results = self
            .selection
            .iter()
            .map(|check| {
                let findings = match check {
                    CheckId::Format => {
                        format::check(&file, header.get_or_init(|| self.decoders.read_header(&file)))
                    }
                    CheckId::Consistency => consistency::check(
                        &file,
                        header.get_or_init(|| self.decoders.read_header(&file)),
                        &self.config.consistency,
                    ),
                    CheckId::Naming => match &self.config.naming {
                        Some(rule) => naming::check(&file, rule),
                        None => Vec::new(),
                    },
                    CheckId::Loudness => loudness::check(
                        &file,
                        samples.get_or_init(|| self.decoders.read_samples(&file)),
                        &self.config.loudness,
                    ),
                    CheckId::Silence => silence::check(
                        &file,
                        samples.get_or_init(|| self.decoders.read_samples(&file)),
                        &self.config.silence,
                    ),
                    CheckId::Size => size::check(&file, &self.config.size),
                };
                (check, findings)
            })
            .collect();

        debug!("Checked {}", file.relative.display());
        FileOutcome { file, results }
    }

    /// Validates every audio file under `root` and collects a report.
    pub fn run(&self, root: &Path) -> Result<Report, ConfigError> {
        let checks: Vec<&str> = self.selection.iter().map(|c| c.as_str()).collect();
        info!("Validating {} ({})", root.display(), checks.join(", "));

        let mut report = Report::new(root, &self.selection);
        for entry in self.scan(root)? {
            match entry {
                Ok(outcome) => report.record(outcome),
                Err(err) => report.record_walk_error(err),
            }
        }

        info!(
            "Scanned {} audio file(s), {} error(s)",
            report.files_scanned,
            report.error_count()
        );
        Ok(report)
    }
}

/// One-call entry point: parse the check identifiers, validate, run.
pub fn validate_folder<S: AsRef<str>>(
    root: &Path,
    checks: &[S],
    config: &CheckConfig,
) -> Result<Report, ConfigError> {
    let selection = CheckSelection::parse(checks)?;
    Validator::new(config, selection)?.run(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioDecoder, AudioHeader, AudioSamples};
    use crate::error::DecodeError;
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Fake backend that counts how often it is asked to read.
    struct CountingDecoder {
        headers: Rc<Cell<usize>>,
        decodes: Rc<Cell<usize>>,
    }

    impl AudioDecoder for CountingDecoder {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn handles(&self, ext: &str) -> bool {
            ext == "wav"
        }

        fn read_header(&self, _path: &Path) -> Result<AudioHeader, DecodeError> {
            self.headers.set(self.headers.get() + 1);
            Ok(AudioHeader {
                container: "wav".to_string(),
                channels: 2,
                sample_rate: 44100,
                bits_per_sample: Some(16),
                frames: 4,
            })
        }

        fn read_samples(&self, _path: &Path) -> Result<AudioSamples, DecodeError> {
            self.decodes.set(self.decodes.get() + 1);
            Ok(AudioSamples {
                channels: 2,
                sample_rate: 44100,
                samples: vec![0.3; 8],
            })
        }
    }

    fn counting_validator(checks: &[&str]) -> (Validator, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let headers = Rc::new(Cell::new(0));
        let decodes = Rc::new(Cell::new(0));
        let mut registry = DecoderRegistry::new();
        registry.register(Box::new(CountingDecoder {
            headers: headers.clone(),
            decodes: decodes.clone(),
        }));
        let validator = Validator::new(
            &CheckConfig::default(),
            CheckSelection::parse(checks).unwrap(),
        )
        .unwrap()
        .with_decoders(registry);
        (validator, headers, decodes)
    }

    #[test]
    fn test_each_granularity_is_read_once_per_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("file1_a.wav"), vec![1u8; 64]).unwrap();
        fs::write(dir.path().join("file2_b.wav"), vec![1u8; 64]).unwrap();

        let (validator, headers, decodes) = counting_validator(&["all"]);
        let report = validator.run(dir.path()).unwrap();

        assert_eq!(report.files_scanned, 2);
        assert_eq!(headers.get(), 2);
        assert_eq!(decodes.get(), 2);
    }

    #[test]
    fn test_header_only_checks_never_decode() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("file1_a.wav"), vec![1u8; 64]).unwrap();

        let (validator, headers, decodes) = counting_validator(&["format", "consistency"]);
        validator.run(dir.path()).unwrap();
        assert_eq!(headers.get(), 1);
        assert_eq!(decodes.get(), 0);

        let (validator, headers, decodes) = counting_validator(&["naming", "size"]);
        validator.run(dir.path()).unwrap();
        assert_eq!(headers.get(), 0);
        assert_eq!(decodes.get(), 0);
    }

    #[test]
    fn test_non_audio_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        fs::write(dir.path().join("file1_a.wav"), vec![1u8; 64]).unwrap();

        let (validator, _, _) = counting_validator(&["all"]);
        let report = validator.run(dir.path()).unwrap();
        assert_eq!(report.files_scanned, 1);
        assert!(report.findings.iter().all(|f| f.name == "file1_a.wav"));
    }

    #[test]
    fn test_results_follow_check_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.wav"), vec![1u8; 64]).unwrap();

        let (validator, _, _) = counting_validator(&["size", "naming", "format"]);
        let outcome = validator.scan(dir.path()).unwrap().next().unwrap().unwrap();
        let order: Vec<CheckId> = outcome.results.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, vec![CheckId::Format, CheckId::Naming, CheckId::Size]);
    }

    #[test]
    fn test_scan_can_stop_early() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("file{i}_a.wav")), vec![1u8; 64]).unwrap();
        }
        let (validator, headers, _) = counting_validator(&["format"]);
        let taken: Vec<FileOutcome> = validator
            .scan(dir.path())
            .unwrap()
            .take(2)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(taken.len(), 2);
        assert_eq!(headers.get(), 2);
    }

    #[test]
    fn test_bad_root_fails_before_scanning() {
        let dir = TempDir::new().unwrap();
        let (validator, headers, _) = counting_validator(&["all"]);
        let err = validator.run(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ConfigError::NotADirectory(_)));
        assert_eq!(headers.get(), 0);
    }

    #[test]
    fn test_validate_folder_rejects_unknown_check() {
        let dir = TempDir::new().unwrap();
        let err = validate_folder(dir.path(), &["format", "bogus"], &CheckConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCheck(_)));
    }
}
