//! Configuration module for the audio classifier.
//!
//! Provides `AppConfig` (the owned settings record), `ConfigStore` (the record
//! plus its backing file, with the `auto_play_sound` write-back), and
//! `AppPaths` for locating `config.toml`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, ConfigError, ConfigStore, LabelConfig, Offset, QuickAction, Resolution,
};
