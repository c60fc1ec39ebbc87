//! The file list model: working set, ordering, display mapping, selection
//! and scroll bookkeeping.
//!
//! # Refresh state machine
//!
//! ```text
//! Idle ──load / set_sort_mode / reconcile──▶ Refreshing ──rebuild done──▶ Idle
//! ```
//!
//! While `Refreshing`, selection changes are recorded but no
//! [`SelectionChanged`] is emitted.  When the refresh ends, at most one
//! notification describes the final selection, so the inspector never
//! reloads for an intermediate row.
//!
//! # Scroll preservation
//!
//! The UI reports the current scroll position as a fraction of the total
//! content height ([`FileListModel::set_scroll_fraction`]).  A rebuild keeps
//! that fraction when the entry count moved by at most
//! [`SCROLL_RESTORE_TOLERANCE`] since the previous load, and scrolls back to
//! the top otherwise.  The UI picks the request up with
//! [`FileListModel::take_scroll_request`].

use std::path::{Path, PathBuf};

use super::entry::{display_path, AudioFile, FileListEntry};
use super::scanner::Scanner;

/// Largest change in entry count for which the scroll offset is kept.
pub const SCROLL_RESTORE_TOLERANCE: usize = 2;

/// Ordering of the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// By basename, ties broken by full path.
    #[default]
    Name,
    /// By full path.
    Path,
}

/// Whether the list is in the middle of a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Refreshing,
}

/// Emitted when the selected file changes outside of a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged {
    pub index: usize,
    pub path: PathBuf,
}

/// Working set plus everything the file panel needs to render it.
#[derive(Debug)]
pub struct FileListModel {
    input_root: Option<PathBuf>,
    output_root: PathBuf,
    paths: Vec<PathBuf>,
    entries: Vec<FileListEntry>,
    sort_mode: SortMode,
    selected: Option<usize>,
    state: RefreshState,
    /// Entry count after the previous load, compared by the scroll heuristic.
    file_count: usize,
    scroll_fraction: f32,
    scroll_request: Option<f32>,
    last_notified: Option<PathBuf>,
}

impl FileListModel {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: None,
            output_root: output_root.into(),
            paths: Vec::new(),
            entries: Vec::new(),
            sort_mode: SortMode::default(),
            selected: None,
            state: RefreshState::Idle,
            file_count: 0,
            scroll_fraction: 0.0,
            scroll_request: None,
            last_notified: None,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn input_root(&self) -> Option<&Path> {
        self.input_root.as_deref()
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn entries(&self) -> &[FileListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&FileListEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selected_entry().map(FileListEntry::real_path)
    }

    /// Resolve a display string back to its real path.  Display strings are
    /// not guaranteed unique; the first matching row wins.
    pub fn real_path_for_display(&self, display: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.display == display)
            .map(FileListEntry::real_path)
    }

    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.real_path() == path)
    }

    // ── Scroll ──────────────────────────────────────────────────────────

    /// Record the current scroll position, as a fraction in `[0, 1]`.
    pub fn set_scroll_fraction(&mut self, fraction: f32) {
        if fraction.is_finite() {
            self.scroll_fraction = fraction.clamp(0.0, 1.0);
        }
    }

    pub fn scroll_fraction(&self) -> f32 {
        self.scroll_fraction
    }

    /// Scroll position the UI should jump to, if a rebuild asked for one.
    pub fn take_scroll_request(&mut self) -> Option<f32> {
        self.scroll_request.take()
    }

    // ── Loading and reconciliation ──────────────────────────────────────

    /// Scan `input_root` and the output root and rebuild the list.
    ///
    /// The first entry is selected and always reported, even when the same
    /// file was selected before the reload.
    pub fn load(&mut self, input_root: &Path, scanner: &dyn Scanner) -> Option<SelectionChanged> {
        self.begin_refresh();
        self.input_root = Some(input_root.to_path_buf());
        self.rescan(scanner);
        self.rebuild();
        self.file_count = self.entries.len();
        self.end_refresh(true)
    }

    /// Rebuild after the entry at `old_index` was classified.
    ///
    /// Rescans both roots, then selects `min(old_index + 1, new_len - 1)`.
    pub fn reconcile(&mut self, old_index: usize, scanner: &dyn Scanner) -> Option<SelectionChanged> {
        self.begin_refresh();
        self.rescan(scanner);
        self.rebuild();
        self.file_count = self.entries.len();
        if let Some(last) = self.entries.len().checked_sub(1) {
            self.select((old_index + 1).min(last));
        }
        self.end_refresh(true)
    }

    /// Change the ordering.  The selected file stays selected when present.
    pub fn set_sort_mode(&mut self, mode: SortMode) -> Option<SelectionChanged> {
        self.begin_refresh();
        let keep = self.selected_path().map(Path::to_path_buf);
        self.sort_mode = mode;
        self.rebuild();
        if let Some(path) = keep {
            self.select_path(&path);
        }
        self.end_refresh(false)
    }

    // ── Selection ───────────────────────────────────────────────────────

    /// Select the row at `index`.  Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> Option<SelectionChanged> {
        if index >= self.entries.len() {
            return None;
        }
        self.selected = Some(index);
        if self.state == RefreshState::Refreshing {
            return None;
        }
        self.notify(false)
    }

    pub fn select_path(&mut self, path: &Path) -> Option<SelectionChanged> {
        let index = self.position_of(path)?;
        self.select(index)
    }

    /// Move one row down; stays put on the last row.
    pub fn select_next(&mut self) -> Option<SelectionChanged> {
        let next = self.selected? + 1;
        self.select(next)
    }

    /// Move one row up; stays put on the first row.
    pub fn select_previous(&mut self) -> Option<SelectionChanged> {
        let prev = self.selected?.checked_sub(1)?;
        self.select(prev)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn begin_refresh(&mut self) {
        self.state = RefreshState::Refreshing;
    }

    fn end_refresh(&mut self, force: bool) -> Option<SelectionChanged> {
        self.state = RefreshState::Idle;
        self.notify(force)
    }

    fn notify(&mut self, force: bool) -> Option<SelectionChanged> {
        let index = self.selected?;
        let path = self.entries.get(index)?.real_path().to_path_buf();
        if !force && self.last_notified.as_deref() == Some(path.as_path()) {
            return None;
        }
        self.last_notified = Some(path.clone());
        Some(SelectionChanged { index, path })
    }

    fn rescan(&mut self, scanner: &dyn Scanner) {
        self.paths.clear();
        if let Some(root) = &self.input_root {
            self.paths.extend(scanner.scan(root));
        }
        self.paths.extend(scanner.scan(&self.output_root));
    }

    fn rebuild(&mut self) {
        let input_root = self.input_root.as_deref();
        let output_root = self.output_root.as_path();

        let mut entries: Vec<FileListEntry> = self
            .paths
            .iter()
            .map(|p| FileListEntry {
                display: display_path(p, input_root, output_root),
                file: AudioFile::new(p.clone(), output_root),
            })
            .collect();

        match self.sort_mode {
            SortMode::Name => entries.sort_by(|a, b| {
                a.real_path()
                    .file_name()
                    .cmp(&b.real_path().file_name())
                    .then_with(|| a.real_path().cmp(b.real_path()))
            }),
            SortMode::Path => entries.sort_by(|a, b| a.real_path().cmp(b.real_path())),
        }

        self.entries = entries;
        self.selected = if self.entries.is_empty() { None } else { Some(0) };

        let keep_scroll = !self.entries.is_empty()
            && self.entries.len().abs_diff(self.file_count) <= SCROLL_RESTORE_TOLERANCE;
        if !keep_scroll {
            self.scroll_fraction = 0.0;
        }
        self.scroll_request = Some(self.scroll_fraction);

        log::debug!(
            "file list rebuilt: {} entries, sort {:?}, scroll {:.3}",
            self.entries.len(),
            self.sort_mode,
            self.scroll_fraction
        );
    }
}
