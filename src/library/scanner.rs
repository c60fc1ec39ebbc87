//! Recursive directory scanning for supported audio files.
//!
//! Scanning is synchronous and runs on the UI thread: working sets are small
//! and local, and the list is rebuilt right after every scan anyway.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extensions picked up by the scanner (compared ASCII case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "flac"];

pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|e| ext.eq_ignore_ascii_case(e))
}

pub fn is_supported_audio_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(is_supported_extension)
        .unwrap_or(false)
}

/// Source of file paths for the working set.
pub trait Scanner {
    /// All supported audio files below `root`, in no particular order.
    ///
    /// A missing or unreadable root yields an empty vector.
    fn scan(&self, root: &Path) -> Vec<PathBuf>;
}

/// [`Scanner`] backed by `walkdir`.  Symlinks are not followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkDirScanner;

impl Scanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> Vec<PathBuf> {
        if !root.is_dir() {
            log::debug!("scan: {} is not a directory", root.display());
            return Vec::new();
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            match entry {
                Ok(e) => {
                    if e.file_type().is_file() && is_supported_audio_path(e.path()) {
                        found.push(e.into_path());
                    }
                }
                Err(err) => log::debug!("scan: skipping unreadable entry: {err}"),
            }
        }

        log::info!("scan: {} audio files under {}", found.len(), root.display());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn extension_matching() {
        assert!(is_supported_extension("wav"));
        assert!(is_supported_extension("MP3"));
        assert!(is_supported_extension("Flac"));
        assert!(!is_supported_extension("ogg"));
        assert!(!is_supported_audio_path(Path::new("notes.txt")));
        assert!(!is_supported_audio_path(Path::new("wav")));
    }

    #[test]
    fn finds_each_supported_file_once() {
        let dir = tempdir().expect("temp dir");
        let nested = dir.path().join("day1").join("mic2");
        fs::create_dir_all(&nested).unwrap();

        for name in ["a.wav", "b.mp3", "c.flac"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::write(nested.join("d.WAV"), b"x").unwrap();
        fs::write(nested.join("readme.txt"), b"x").unwrap();
        fs::create_dir_all(dir.path().join("folder.wav")).unwrap();

        let mut found = WalkDirScanner.scan(dir.path());
        found.sort();

        let mut expected = vec![
            dir.path().join("a.wav"),
            dir.path().join("b.mp3"),
            dir.path().join("c.flac"),
            nested.join("d.WAV"),
        ];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn missing_root_yields_empty() {
        let dir = tempdir().expect("temp dir");
        assert!(WalkDirScanner.scan(&dir.path().join("absent")).is_empty());
    }
}
