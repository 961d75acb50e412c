use super::CheckId;
use crate::audio::AudioHeader;
use crate::error::DecodeError;
use crate::report::{Finding, FindingKind};
use crate::utils::AudioFileRef;

/// Passes when the header read succeeded.
pub fn check(file: &AudioFileRef, header: &Result<AudioHeader, DecodeError>) -> Vec<Finding> {
    match header {
        Ok(_) => Vec::new(),
        Err(DecodeError::Invalid(reason)) => vec![Finding::new(
            file,
            CheckId::Format,
            FindingKind::FormatError,
            format!("invalid {} file: {}", container(file), reason),
        )],
        Err(DecodeError::Unreadable(reason)) => {
            vec![Finding::skipped(file, CheckId::Format, reason.clone())]
        }
    }
}

fn container(file: &AudioFileRef) -> String {
    file.extension()
        .map(|ext| ext.to_uppercase())
        .unwrap_or_else(|| "audio".to_string())
}
