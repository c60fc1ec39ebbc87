//! Working set of audio files: directory scanning and the file list model.
//!
//! # Flow
//!
//! ```text
//! input root ─┐
//!             ├─ Scanner::scan ─▶ FileListModel::load / reconcile
//! output root ┘                     │  sort, display paths, selection,
//!                                   │  scroll heuristic
//!                                   ▼
//!                           SelectionChanged ─▶ inspector
//! ```

pub mod entry;
pub mod file_list;
pub mod scanner;

pub use entry::{display_path, AudioFile, ClassificationStatus, FileListEntry};
pub use file_list::{
    FileListModel, RefreshState, SelectionChanged, SortMode, SCROLL_RESTORE_TOLERANCE,
};
pub use scanner::{
    is_supported_audio_path, is_supported_extension, Scanner, WalkDirScanner,
    SUPPORTED_EXTENSIONS,
};
