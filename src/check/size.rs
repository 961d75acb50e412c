use super::CheckId;
use crate::config::SizeConfig;
use crate::report::{Finding, FindingKind};
use crate::utils::AudioFileRef;

pub fn check(file: &AudioFileRef, config: &SizeConfig) -> Vec<Finding> {
    if let Some(reason) = &file.stat_error {
        return vec![Finding::skipped(
            file,
            CheckId::Size,
            format!("cannot read file size: {}", reason),
        )];
    }

    let (message, comparator, bound) = if file.size < config.min_bytes {
        ("file too small", "<", config.min_bytes)
    } else if file.size > config.max_bytes {
        ("file too large", ">", config.max_bytes)
    } else {
        return Vec::new();
    };

    vec![
        Finding::new(file, CheckId::Size, FindingKind::SizeViolation, message).with_measurement(
            format!("{} bytes", file.size),
            comparator,
            format!("{} bytes", bound),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn file(size: u64) -> AudioFileRef {
        AudioFileRef::new("/in/a.wav", Path::new("/in"), size)
    }

    fn bounds(min_bytes: u64, max_bytes: u64) -> SizeConfig {
        SizeConfig {
            min_bytes,
            max_bytes,
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(check(&file(100), &bounds(100, 200)).is_empty());
        assert!(check(&file(200), &bounds(100, 200)).is_empty());
    }

    #[test]
    fn test_too_small() {
        let findings = check(&file(10), &bounds(44, 1000));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::SizeViolation);
        assert_eq!(
            findings[0].to_string(),
            "ERROR: a.wav file too small (10 bytes < 44 bytes)"
        );
    }

    #[test]
    fn test_too_large() {
        let findings = check(&file(2000), &bounds(44, 1000));
        assert_eq!(findings[0].message, "file too large");
        assert_eq!(findings[0].measurement.as_ref().unwrap().comparator, ">");
    }

    #[test]
    fn test_stat_failure_is_skipped() {
        let unreadable = file(0).with_stat_error("permission denied");
        let findings = check(&unreadable, &SizeConfig::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::SkippedFile);
        assert!(!findings[0].is_error());
    }

    #[test]
    fn test_default_rejects_empty_file() {
        assert_eq!(check(&file(0), &SizeConfig::default()).len(), 1);
    }
}
