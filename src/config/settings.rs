//! Application settings, validation and TOML persistence.
//!
//! The settings file is loaded once at startup into an owned [`AppConfig`].
//! Every key except `auto_play_sound` is required; a missing key or an
//! unparsable value aborts startup.
//!
//! `auto_play_sound` is the only field written back during a session.
//! [`ConfigStore::update_auto_play`] performs a whole-document
//! read-modify-write so every other key (including keys this crate does not
//! know about) survives the round trip.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors raised while loading or persisting the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid resolution {0:?} (expected WIDTHxHEIGHT, optionally +X+Y)")]
    InvalidResolution(String),
}

// ---------------------------------------------------------------------------
// QuickAction
// ---------------------------------------------------------------------------

/// One-click operations shown above the label buttons.
///
/// Stored in the settings file as plain strings; names the app does not
/// recognise are kept as [`QuickAction::Other`] and rendered as a neutral
/// button.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum QuickAction {
    Play,
    AcceptDefault,
    Unknown,
    Next,
    Previous,
    Other(String),
}

impl QuickAction {
    /// Name as written in the settings file.
    pub fn name(&self) -> &str {
        match self {
            QuickAction::Play => "play",
            QuickAction::AcceptDefault => "accept_default",
            QuickAction::Unknown => "unknown",
            QuickAction::Next => "next",
            QuickAction::Previous => "previous",
            QuickAction::Other(name) => name,
        }
    }

    /// Button caption: the name with its first letter capitalised.
    pub fn caption(&self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<String> for QuickAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "play" => QuickAction::Play,
            "accept_default" => QuickAction::AcceptDefault,
            "unknown" => QuickAction::Unknown,
            "next" => QuickAction::Next,
            "previous" => QuickAction::Previous,
            _ => QuickAction::Other(value),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// One axis of a window position: distance from the left/top screen edge
/// (`+N`) or from the right/bottom edge (`-N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    FromStart(u32),
    FromEnd(u32),
}

impl Offset {
    /// `+N` or `-N`.
    fn parse(text: &str) -> Option<Self> {
        fn digits(text: &str) -> Option<u32> {
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            text.parse().ok()
        }

        match text.strip_prefix('+') {
            Some(rest) => digits(rest).map(Offset::FromStart),
            None => digits(text.strip_prefix('-')?).map(Offset::FromEnd),
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::FromStart(v) => write!(f, "+{v}"),
            Offset::FromEnd(v) => write!(f, "-{v}"),
        }
    }
}

/// Window geometry parsed from the `resolution` setting.
///
/// Accepts `"WIDTHxHEIGHT"` with an optional `"[+-]X[+-]Y"` position suffix,
/// e.g. `"1400x900"`, `"1400x900+40+20"` or `"1400x900-0+0"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub width: f32,
    pub height: f32,
    pub position: Option<(Offset, Offset)>,
}

impl Resolution {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidResolution(text.to_string());
        let trimmed = text.trim();

        let (size, position) = match trimmed.find(['+', '-']) {
            Some(idx) => (&trimmed[..idx], Some(&trimmed[idx..])),
            None => (trimmed, None),
        };

        let (w, h) = size.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }

        let position = match position {
            Some(pos) => {
                // The y sign is the first `+`/`-` after the x sign.
                let split = pos[1..].find(['+', '-']).ok_or_else(invalid)? + 1;
                let x = Offset::parse(&pos[..split]).ok_or_else(invalid)?;
                let y = Offset::parse(&pos[split..]).ok_or_else(invalid)?;
                Some((x, y))
            }
            None => None,
        };

        Ok(Self {
            width: width as f32,
            height: height as f32,
            position,
        })
    }

    /// Top-left corner in screen coordinates, when both offsets count from
    /// the left/top edge.  Edge-relative positions need the monitor size,
    /// which is unknown before the window exists.
    pub fn top_left(&self) -> Option<(f32, f32)> {
        match self.position? {
            (Offset::FromStart(x), Offset::FromStart(y)) => Some((x as f32, y as f32)),
            _ => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some((x, y)) = self.position {
            write!(f, "{x}{y}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LabelConfig
// ---------------------------------------------------------------------------

/// The two label vocabularies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelConfig {
    /// Labels routed to `output_directory`.
    pub primary: Vec<String>,
    /// Labels routed to `secondary_output_directory`.
    pub secondary: Vec<String>,
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

fn default_auto_play() -> bool {
    true
}

/// Top-level application configuration, read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Directory scanned on startup (when it exists).
    pub input_directory: PathBuf,
    /// Root of the primary label folders; also listed as "classified".
    pub output_directory: PathBuf,
    /// Root of the secondary label folders.
    pub secondary_output_directory: PathBuf,
    /// Window geometry, see [`Resolution`].
    pub resolution: String,
    /// Initial width of the file list panel in pixels.
    pub file_panel_width: u32,
    /// Play every newly selected file automatically.
    #[serde(default = "default_auto_play")]
    pub auto_play_sound: bool,
    /// Ordered quick-action buttons.
    pub quick_actions: Vec<QuickAction>,
    /// Label button sets.
    pub labels: LabelConfig,
}

impl AppConfig {
    /// Parse and validate a settings document.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.window_resolution()?;
        Ok(config)
    }

    /// Load from an explicit path.  A missing file is an error: there is no
    /// sensible default for the input and output directories.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Parsed window geometry.
    pub fn window_resolution(&self) -> Result<Resolution, ConfigError> {
        Resolution::parse(&self.resolution)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, content).map_err(write_err)
}

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// An [`AppConfig`] together with the file it was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: AppConfig,
}

impl ConfigStore {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = AppConfig::load_from(path)?;
        log::info!("configuration loaded from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a new `auto_play_sound` value.
    ///
    /// Re-reads the backing file, replaces that one key, and writes the whole
    /// document back.  The in-memory value is only updated once the write
    /// succeeded.
    pub fn update_auto_play(&mut self, enabled: bool) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        let mut document: toml::Table =
            content.parse().map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;

        document.insert("auto_play_sound".into(), toml::Value::Boolean(enabled));
        write_file(&self.path, &toml::to_string_pretty(&document)?)?;

        self.config.auto_play_sound = enabled;
        log::info!(
            "auto_play_sound = {enabled} written to {}",
            self.path.display()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
