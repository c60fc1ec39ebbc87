//! Cross-platform location of `config.toml`, using the `dirs` crate.
//!
//! Lookup order:
//!
//! 1. An explicit path passed on the command line (`--config`).
//! 2. `./config.toml` in the working directory, when it exists.
//! 3. The platform config directory:
//!    Windows: %APPDATA%\audio-classifier\config.toml
//!    macOS:   ~/Library/Application Support/audio-classifier/config.toml
//!    Linux:   ~/.config/audio-classifier/config.toml

use std::path::{Path, PathBuf};

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Platform directory holding `config.toml`.
    pub config_dir: PathBuf,
    /// Full path to the platform `config.toml`.
    pub settings_file: PathBuf,
    /// `config.toml` relative to the working directory.
    pub local_settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "audio-classifier";
    const FILE_NAME: &'static str = "config.toml";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join(Self::FILE_NAME);

        Self {
            config_dir,
            settings_file,
            local_settings_file: PathBuf::from(Self::FILE_NAME),
        }
    }

    /// Pick the configuration file to load, honouring an explicit override.
    pub fn resolve(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if self.local_settings_file.exists() {
            return self.local_settings_file.clone();
        }
        self.settings_file.clone()
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "config.toml"));
        assert!(paths.settings_file.ends_with("audio-classifier/config.toml"));
    }

    #[test]
    fn explicit_path_wins() {
        let paths = AppPaths::new();
        let explicit = PathBuf::from("/tmp/some/where/custom.toml");
        assert_eq!(paths.resolve(Some(&explicit)), explicit);
    }
}
