//! Working-set records: [`AudioFile`] and the [`FileListEntry`] shown in the
//! file list.

use std::path::{Component, Path, PathBuf};

/// Whether a file has already been sorted into the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationStatus {
    Unclassified,
    /// Lies under the output root; `label` is the first directory below it
    /// (`None` when the file sits directly in the output root).
    Classified { label: Option<String> },
}

/// One discovered audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub path: PathBuf,
    pub status: ClassificationStatus,
}

impl AudioFile {
    pub fn new(path: PathBuf, output_root: &Path) -> Self {
        let status = match path.strip_prefix(output_root) {
            Ok(rel) => {
                let mut components = rel.components();
                let first = components.next();
                // A file directly under the root has only one component.
                let label = match (first, components.next()) {
                    (Some(Component::Normal(dir)), Some(_)) => {
                        Some(dir.to_string_lossy().into_owned())
                    }
                    _ => None,
                };
                ClassificationStatus::Classified { label }
            }
            Err(_) => ClassificationStatus::Unclassified,
        };
        Self { path, status }
    }

    /// Label folder the file was sorted into, if any.
    pub fn label(&self) -> Option<&str> {
        match &self.status {
            ClassificationStatus::Classified { label } => label.as_deref(),
            ClassificationStatus::Unclassified => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        matches!(self.status, ClassificationStatus::Classified { .. })
    }
}

/// A row of the file list: presentation string plus the real path it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListEntry {
    pub display: String,
    pub file: AudioFile,
}

impl FileListEntry {
    pub fn real_path(&self) -> &Path {
        &self.file.path
    }

    /// Rendered muted in the list.
    pub fn is_classified(&self) -> bool {
        self.file.is_classified()
    }

    /// Hover text for the row: the real path, plus the label once classified.
    pub fn tooltip(&self) -> String {
        let path = self.file.path.display();
        match self.file.label() {
            Some(label) => format!("{path}\nClassified as {label}"),
            None => path.to_string(),
        }
    }
}

/// Shorten `path` for display: relative to `input_root` when it lies below
/// it, otherwise relative to `output_root`, otherwise unchanged.
pub fn display_path(path: &Path, input_root: Option<&Path>, output_root: &Path) -> String {
    let relative = input_root
        .and_then(|root| path.strip_prefix(root).ok())
        .or_else(|| path.strip_prefix(output_root).ok())
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(path);
    relative.to_string_lossy().into_owned()
}
