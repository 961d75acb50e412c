//! Findings and the per-run report.

use crate::check::{CheckId, CheckSelection};
use crate::utils::{AudioFileRef, WalkError};
use crate::validator::FileOutcome;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Whether a finding is a violation or a file that could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Could not check
    Skip,
    /// Checked and failed
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FindingKind {
    FormatError,
    SkippedFile,
    ParameterMismatch,
    NamingViolation,
    TooQuiet,
    TooLoud,
    ExcessiveSilence,
    SizeViolation,
}

impl FindingKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::SkippedFile => Severity::Skip,
            _ => Severity::Error,
        }
    }
}

/// Measured value against the bound it violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measurement {
    pub measured: String,
    pub comparator: String,
    pub expected: String,
}

/// One reported outcome for one file and one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Path relative to the scan root
    pub file: PathBuf,
    pub name: String,
    pub check: CheckId,
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement: Option<Measurement>,
}

impl Finding {
    pub fn new(
        file: &AudioFileRef,
        check: CheckId,
        kind: FindingKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.relative.clone(),
            name: file.name.clone(),
            check,
            kind,
            severity: kind.severity(),
            message: message.into(),
            measurement: None,
        }
    }

    /// A file the check could not evaluate
    pub fn skipped(file: &AudioFileRef, check: CheckId, reason: impl Into<String>) -> Self {
        Self::new(file, check, FindingKind::SkippedFile, reason)
    }

    pub fn with_measurement(
        mut self,
        measured: impl fmt::Display,
        comparator: &str,
        expected: impl fmt::Display,
    ) -> Self {
        self.measurement = Some(Measurement {
            measured: measured.to_string(),
            comparator: comparator.to_string(),
            expected: expected.to_string(),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "ERROR",
            Severity::Skip => "SKIP",
        };
        write!(f, "{}: {} {}", label, self.file.display(), self.message)?;
        if let Some(m) = &self.measurement {
            write!(f, " ({} {} {})", m.measured, m.comparator, m.expected)?;
        }
        Ok(())
    }
}

/// Counts for one check over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    /// Files the check produced a verdict for
    pub evaluated: usize,
    /// Files the check could not evaluate
    pub skipped: usize,
    /// Error findings
    pub errors: usize,
}

/// Ordered findings of one run plus summary counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub root: PathBuf,
    pub checks: Vec<CheckId>,
    /// Audio files visited
    pub files_scanned: usize,
    pub findings: Vec<Finding>,
    pub summary: BTreeMap<CheckId, CheckSummary>,
    /// Directory entries the walk could not read; their contents were not checked
    pub unreadable: Vec<WalkError>,
}

impl Report {
    pub fn new(root: &Path, selection: &CheckSelection) -> Self {
        Self {
            root: root.to_path_buf(),
            checks: selection.iter().collect(),
            files_scanned: 0,
            findings: Vec::new(),
            summary: selection
                .iter()
                .map(|check| (check, CheckSummary::default()))
                .collect(),
            unreadable: Vec::new(),
        }
    }

    /// Appends the results of one file, keeping check order.
    pub fn record(&mut self, outcome: FileOutcome) {
        self.files_scanned += 1;
        for (check, findings) in outcome.results {
            let summary = self.summary.entry(check).or_default();
            if findings.iter().any(|f| f.severity == Severity::Skip) {
                summary.skipped += 1;
            } else {
                summary.evaluated += 1;
            }
            summary.errors += findings.iter().filter(|f| f.is_error()).count();
            self.findings.extend(findings);
        }
    }

    pub fn record_walk_error(&mut self, err: WalkError) {
        self.unreadable.push(err);
    }

    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    pub fn findings_for(&self, check: CheckId) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.check == check)
    }

    /// Human-readable rendering: one line per finding, then the summary.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for finding in &self.findings {
            out.push_str(&finding.to_string());
            out.push('\n');
        }
        for entry in &self.unreadable {
            out.push_str(&format!(
                "SKIP: {} unreadable: {}\n",
                entry.path.display(),
                entry.reason
            ));
        }
        if !self.findings.is_empty() || !self.unreadable.is_empty() {
            out.push('\n');
        }

        out.push_str(&format!(
            "Scanned {} audio file(s) in {}: {} error(s)\n",
            self.files_scanned,
            self.root.display(),
            self.error_count()
        ));
        if !self.unreadable.is_empty() {
            out.push_str(&format!(
                "  {} unreadable entr{} not scanned\n",
                self.unreadable.len(),
                if self.unreadable.len() == 1 { "y" } else { "ies" }
            ));
        }
        for (check, summary) in &self.summary {
            out.push_str(&format!(
                "  {:<12} errors: {:<4} skipped: {:<4} evaluated: {}\n",
                check.as_str(),
                summary.errors,
                summary.skipped,
                summary.evaluated
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> AudioFileRef {
        AudioFileRef::new(Path::new("/music/sub").join(name), Path::new("/music"), 100)
    }

    #[test]
    fn test_error_line_format() {
        let finding = Finding::new(
            &file("file1_x.wav"),
            CheckId::Consistency,
            FindingKind::ParameterMismatch,
            "sample rate mismatch",
        )
        .with_measurement("22050 Hz", "!=", "44100 Hz");

        let expected = format!(
            "ERROR: {} sample rate mismatch (22050 Hz != 44100 Hz)",
            Path::new("sub").join("file1_x.wav").display()
        );
        assert_eq!(finding.to_string(), expected);
        assert!(finding.is_error());
    }

    #[test]
    fn test_skip_line_format() {
        let finding = Finding::skipped(&file("a.wav"), CheckId::Loudness, "empty file");
        assert_eq!(finding.severity, Severity::Skip);
        assert_eq!(finding.kind, FindingKind::SkippedFile);
        assert!(finding.to_string().starts_with("SKIP: "));
        assert!(finding.to_string().ends_with("a.wav empty file"));
    }

    #[test]
    fn test_record_updates_summary() {
        let selection = CheckSelection::parse(&["format", "loudness"]).unwrap();
        let mut report = Report::new(Path::new("/music"), &selection);

        let a = file("a.wav");
        report.record(FileOutcome {
            results: vec![
                (
                    CheckId::Format,
                    vec![Finding::new(&a, CheckId::Format, FindingKind::FormatError, "bad")],
                ),
                (
                    CheckId::Loudness,
                    vec![Finding::skipped(&a, CheckId::Loudness, "unreadable")],
                ),
            ],
            file: a,
        });
        let b = file("b.wav");
        report.record(FileOutcome {
            results: vec![(CheckId::Format, vec![]), (CheckId::Loudness, vec![])],
            file: b,
        });

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.error_count(), 1);
        assert!(report.has_errors());
        assert_eq!(
            report.summary[&CheckId::Format],
            CheckSummary {
                evaluated: 2,
                skipped: 0,
                errors: 1
            }
        );
        assert_eq!(
            report.summary[&CheckId::Loudness],
            CheckSummary {
                evaluated: 1,
                skipped: 1,
                errors: 0
            }
        );
        assert_eq!(report.findings_for(CheckId::Loudness).count(), 1);

        let text = report.render_text();
        assert!(text.contains("Scanned 2 audio file(s)"));
        assert!(text.contains("format"));
    }

    #[test]
    fn test_walk_errors_are_listed_but_not_errors() {
        let selection = CheckSelection::parse(&["format"]).unwrap();
        let mut report = Report::new(Path::new("/music"), &selection);
        report.record_walk_error(WalkError {
            path: PathBuf::from("locked"),
            reason: "Permission denied (os error 13)".to_string(),
        });

        assert!(!report.has_errors());
        assert_eq!(report.unreadable.len(), 1);
        let text = report.render_text();
        assert!(text.starts_with("SKIP: locked unreadable: Permission denied (os error 13)\n"));
        assert!(text.contains("1 unreadable entry not scanned"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unreadable"][0]["path"], "locked");
    }

    #[test]
    fn test_report_serializes_to_json() {
        let selection = CheckSelection::parse(&["size"]).unwrap();
        let report = Report::new(Path::new("/music"), &selection);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files_scanned"], 0);
        assert_eq!(json["checks"][0], "size");
        assert_eq!(json["summary"]["size"]["errors"], 0);
    }
}
