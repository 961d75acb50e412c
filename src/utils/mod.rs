pub mod detection;

use crate::error::ConfigError;
use crate::AUDIO_EXTENSIONS;

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// One enumerated file under the scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioFileRef {
    /// Path as walked (root joined with the relative part)
    pub path: PathBuf,
    /// Path relative to the scan root, used for display
    pub relative: PathBuf,
    /// Base file name
    pub name: String,
    /// Size in bytes, 0 when the file could not be stat'ed
    pub size: u64,
    /// Why the file's metadata could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stat_error: Option<String>,
}

impl AudioFileRef {
    pub fn new(path: impl Into<PathBuf>, root: &Path, size: u64) -> Self {
        let path = path.into();
        let relative = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            path,
            relative,
            name,
            size,
            stat_error: None,
        }
    }

    /// Marks a file whose metadata could not be read.
    pub fn with_stat_error(mut self, reason: impl Into<String>) -> Self {
        self.stat_error = Some(reason.into());
        self
    }

    /// Lowercased extension, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// A directory entry the walk could not read, e.g. a subdirectory without
/// permission. Its contents are missing from the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkError {
    /// Path relative to the scan root
    pub path: PathBuf,
    pub reason: String,
}

impl WalkError {
    fn new(err: walkdir::Error, root: &Path) -> Self {
        let path = err
            .path()
            .map(|path| path.strip_prefix(root).unwrap_or(path).to_path_buf())
            .unwrap_or_default();
        let reason = match err.io_error() {
            Some(io) => io.to_string(),
            None => err.to_string(),
        };
        Self { path, reason }
    }
}

// Depth-first walk with a stable sibling order; links are not followed
fn get_walker(input: &Path) -> walkdir::IntoIter {
    WalkDir::new(input)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
}

/// Lazily yields every regular file under `root`, recursively, along with
/// the entries that could not be read.
///
/// Fails up front when `root` does not exist or is not a directory.
pub fn walk_files(
    root: &Path,
) -> Result<impl Iterator<Item = Result<AudioFileRef, WalkError>>, ConfigError> {
    if !root.is_dir() {
        return Err(ConfigError::NotADirectory(root.to_path_buf()));
    }

    let root = root.to_path_buf();
    Ok(get_walker(&root).filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                return Some(Err(WalkError::new(err, &root)));
            }
        };
        if !entry.file_type().is_file() {
            return None;
        }
        let file = match entry.metadata() {
            Ok(metadata) => AudioFileRef::new(entry.into_path(), &root, metadata.len()),
            Err(err) => {
                warn!("Cannot stat {}: {}", entry.path().display(), err);
                let reason = err.to_string();
                AudioFileRef::new(entry.into_path(), &root, 0).with_stat_error(reason)
            }
        };
        Some(Ok(file))
    }))
}

/// Like [`walk_files`], with unreadable entries logged and dropped.
pub fn enumerate_files(root: &Path) -> Result<impl Iterator<Item = AudioFileRef>, ConfigError> {
    Ok(walk_files(root)?.filter_map(|entry| entry.ok()))
}

/// Total number of regular files under `root`
pub fn count_files(root: &Path) -> Result<usize, ConfigError> {
    Ok(enumerate_files(root)?.count())
}

// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return format!("0 {}", UNITS[0]);
    }

    let base = 1024_f64;
    let exp = (bytes as f64).ln() / base.ln();
    let unit_index = exp.floor() as usize;

    if unit_index >= UNITS.len() {
        return format!("{} {}", bytes, UNITS[0]);
    }

    let size = bytes as f64 / base.powi(unit_index as i32);
    format!("{:.2} {} ({} bytes)", size, UNITS[unit_index], bytes)
}

// Check if file extension matches supported audio formats
pub fn is_audio_file(ext: &str) -> bool {
    AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            enumerate_files(&missing),
            Err(ConfigError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_file_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.wav");
        fs::write(&file, b"x").unwrap();
        assert!(enumerate_files(&file).is_err());
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(count_files(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_only_subdirectories_yields_nothing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::create_dir_all(dir.path().join("d")).unwrap();
        assert_eq!(count_files(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_nested_files_are_all_yielded() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("top.wav"), b"1").unwrap();
        fs::write(dir.path().join("notes.txt"), b"22").unwrap();
        fs::write(dir.path().join("sub/mid.WAV"), b"333").unwrap();
        fs::write(dir.path().join("sub/deeper/low.flac"), b"").unwrap();

        let files: Vec<AudioFileRef> = enumerate_files(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 4);

        let mid = files.iter().find(|f| f.name == "mid.WAV").unwrap();
        assert_eq!(mid.size, 3);
        assert_eq!(mid.relative, Path::new("sub").join("mid.WAV"));
        assert_eq!(mid.extension().as_deref(), Some("wav"));
    }

    #[test]
    fn test_enumeration_order_is_stable() {
        let dir = TempDir::new().unwrap();
        for name in ["c.wav", "a.wav", "b.wav"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let first: Vec<String> = enumerate_files(dir.path()).unwrap().map(|f| f.name).collect();
        let second: Vec<String> = enumerate_files(dir.path()).unwrap().map(|f| f.name).collect();
        assert_eq!(first, vec!["a.wav", "b.wav", "c.wav"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(2048), "2.00 KB (2048 bytes)");
    }

    #[test]
    fn test_is_audio_file_ignores_case() {
        assert!(is_audio_file("WAV"));
        assert!(is_audio_file("flac"));
        assert!(!is_audio_file("txt"));
    }
}
