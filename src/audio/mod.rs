//! Audio I/O: decode, channel/rate conversion and playback.
//!
//! # Pipeline
//!
//! ```text
//! inspector:  file → symphonia decode → downmix to mono → Inspection
//! playback:   file → symphonia decode → volume → remix/resample → cpal stream
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use audio_classifier::audio::{CpalOutput, Player};
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let (player, mut events) = Player::new(runtime.handle().clone(), Arc::new(CpalOutput));
//! player.play(Path::new("clip.wav"), 100.0);
//!
//! while let Some(event) = events.blocking_recv() {
//!     println!("{event:?}");
//! }
//! ```

pub mod decode;
pub mod playback;
pub mod resample;

pub use decode::{decode, load, AudioError, DecodedAudio};
pub use playback::{apply_volume, AudioOutput, CpalOutput, PlaybackError, PlaybackEvent, Player};
pub use resample::{remix_channels, resample_interleaved, stereo_to_mono};
