//! Manual audio-file labelling: browse a directory of recordings, inspect
//! each one (waveform, MFCC, playback) and move it into a label folder.

pub mod app;
pub mod audio;
pub mod classify;
pub mod config;
pub mod inspect;
pub mod library;
pub mod shortcuts;
pub mod status;
