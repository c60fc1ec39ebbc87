//! Moving a file into its label folder.
//!
//! [`Classifier::classify`] resolves `<root>/<label>/<basename>` and moves the
//! file there.  When the destination already exists the operator decides,
//! through a [`ConflictPrompt`], between overwriting it, discarding the
//! source, or leaving both files alone.
//!
//! [`Classifier::classify_unknown`] is the fast path behind the `unknown`
//! quick action: it never asks and replaces an existing destination.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

use super::ClassifyError;

/// Folder under the primary output root that receives unresolved files.
pub const UNKNOWN_LABEL: &str = "unknown";

// ---------------------------------------------------------------------------
// ConflictPrompt
// ---------------------------------------------------------------------------

/// Operator questions asked when a destination file already exists.
pub trait ConflictPrompt {
    /// Replace `destination` with the file being classified?
    fn confirm_overwrite(&self, destination: &Path) -> bool;

    /// Asked after an overwrite was declined: delete `source` outright?
    fn confirm_delete_original(&self, source: &Path) -> bool;
}

// ---------------------------------------------------------------------------
// ClassifyOutcome
// ---------------------------------------------------------------------------

/// What a classification did on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyOutcome {
    Moved { from: PathBuf, to: PathBuf },
    Overwritten { from: PathBuf, to: PathBuf },
    DeletedOriginal { path: PathBuf },
    /// Destination exists and the operator kept both files.
    Kept { source: PathBuf, destination: PathBuf },
    /// The file already lives in the destination folder.
    AlreadyInPlace { path: PathBuf, label: String },
    MarkedUnknown { from: PathBuf, to: PathBuf },
}

impl ClassifyOutcome {
    /// `true` when the working set needs a rescan.
    pub fn changed_filesystem(&self) -> bool {
        !matches!(
            self,
            ClassifyOutcome::Kept { .. } | ClassifyOutcome::AlreadyInPlace { .. }
        )
    }

    /// Text for the status line.
    pub fn status_message(&self) -> String {
        match self {
            ClassifyOutcome::Moved { from, to } => format!(
                "Success: File moved successfully.\n{} -> {}",
                from.display(),
                to.display()
            ),
            ClassifyOutcome::Overwritten { from, to } => format!(
                "Success: File overwritten successfully.\n{} -> {}",
                from.display(),
                to.display()
            ),
            ClassifyOutcome::DeletedOriginal { path } => format!(
                "Deleted: The original file has been deleted.\n{}",
                path.display()
            ),
            ClassifyOutcome::Kept { destination, .. } => format!(
                "Skipped: {} already exists; nothing changed.",
                destination.display()
            ),
            ClassifyOutcome::AlreadyInPlace { path, label } => format!(
                "Skipped: {} is already classified as {label}.",
                path.display()
            ),
            ClassifyOutcome::MarkedUnknown { from, to } => format!(
                "Unknown: File moved to the unknown folder.\n{} -> {}",
                from.display(),
                to.display()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Routes files into the primary or secondary label trees.
#[derive(Debug, Clone)]
pub struct Classifier {
    output_directory: PathBuf,
    secondary_output_directory: PathBuf,
}

impl Classifier {
    pub fn new(output_directory: PathBuf, secondary_output_directory: PathBuf) -> Self {
        Self {
            output_directory,
            secondary_output_directory,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.output_directory.clone(),
            config.secondary_output_directory.clone(),
        )
    }

    /// Folder a label resolves to.
    pub fn destination_dir(&self, label: &str, is_secondary: bool) -> PathBuf {
        let root = if is_secondary {
            &self.secondary_output_directory
        } else {
            &self.output_directory
        };
        root.join(label)
    }

    /// Move `file` into the folder for `label`, asking `prompt` on conflict.
    pub fn classify(
        &self,
        file: &Path,
        label: &str,
        is_secondary: bool,
        prompt: &dyn ConflictPrompt,
    ) -> Result<ClassifyOutcome, ClassifyError> {
        validate_label(label)?;
        let name = source_name(file)?;

        let dest_dir = self.destination_dir(label, is_secondary);
        create_dir(&dest_dir)?;
        let destination = dest_dir.join(name);

        if is_same_file(file, &destination) {
            return Ok(ClassifyOutcome::AlreadyInPlace {
                path: file.to_path_buf(),
                label: label.to_string(),
            });
        }

        let outcome = if !destination.exists() {
            move_file(file, &destination)?;
            ClassifyOutcome::Moved {
                from: file.to_path_buf(),
                to: destination,
            }
        } else if prompt.confirm_overwrite(&destination) {
            remove_file(&destination)?;
            move_file(file, &destination)?;
            ClassifyOutcome::Overwritten {
                from: file.to_path_buf(),
                to: destination,
            }
        } else if prompt.confirm_delete_original(file) {
            remove_file(file)?;
            ClassifyOutcome::DeletedOriginal {
                path: file.to_path_buf(),
            }
        } else {
            ClassifyOutcome::Kept {
                source: file.to_path_buf(),
                destination,
            }
        };

        log::info!("classify [{label}]: {outcome:?}");
        Ok(outcome)
    }

    /// Move `file` to `<output>/unknown/` without asking.  An existing file
    /// of the same name there is replaced.
    pub fn classify_unknown(&self, file: &Path) -> Result<ClassifyOutcome, ClassifyError> {
        let name = source_name(file)?;

        let dest_dir = self.destination_dir(UNKNOWN_LABEL, false);
        create_dir(&dest_dir)?;
        let destination = dest_dir.join(name);

        if is_same_file(file, &destination) {
            return Ok(ClassifyOutcome::AlreadyInPlace {
                path: file.to_path_buf(),
                label: UNKNOWN_LABEL.to_string(),
            });
        }

        if destination.exists() {
            log::warn!("replacing {} without confirmation", destination.display());
            remove_file(&destination)?;
        }
        move_file(file, &destination)?;

        log::info!("classify [unknown]: {} -> {}", file.display(), destination.display());
        Ok(ClassifyOutcome::MarkedUnknown {
            from: file.to_path_buf(),
            to: destination,
        })
    }
}

/// Label suggested by "Accept Default": the name of the file's parent folder.
pub fn default_label(file: &Path) -> Option<String> {
    file.parent()?
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

// ---------------------------------------------------------------------------
// Filesystem helpers
// ---------------------------------------------------------------------------

fn validate_label(label: &str) -> Result<(), ClassifyError> {
    let path = Path::new(label);
    let single_component = path.components().count() == 1 && path.file_name().is_some();
    if label.trim().is_empty() || !single_component {
        return Err(ClassifyError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

fn source_name(file: &Path) -> Result<&std::ffi::OsStr, ClassifyError> {
    if !file.is_file() {
        return Err(ClassifyError::SourceMissing(file.to_path_buf()));
    }
    file.file_name()
        .ok_or_else(|| ClassifyError::NoFileName(file.to_path_buf()))
}

fn create_dir(dir: &Path) -> Result<(), ClassifyError> {
    fs::create_dir_all(dir).map_err(|source| ClassifyError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn remove_file(path: &Path) -> Result<(), ClassifyError> {
    fs::remove_file(path).map_err(|source| ClassifyError::Remove {
        path: path.to_path_buf(),
        source,
    })
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Rename, falling back to copy + delete when rename is not possible (for
/// instance across filesystems).
fn move_file(from: &Path, to: &Path) -> Result<(), ClassifyError> {
    move_with(from, to, |a, b| fs::rename(a, b), |a, b| fs::copy(a, b))
}

/// [`move_file`] with the rename and copy steps supplied by the caller.
///
/// A failed copy never leaves a partial `to` behind; `from` is only removed
/// once the copy completed.
fn move_with<R, C>(from: &Path, to: &Path, rename: R, copy: C) -> Result<(), ClassifyError>
where
    R: FnOnce(&Path, &Path) -> io::Result<()>,
    C: FnOnce(&Path, &Path) -> io::Result<u64>,
{
    let move_err = |source: io::Error| ClassifyError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let rename_err = match rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    log::debug!("rename failed ({rename_err}); copying instead");

    if let Err(copy_err) = copy(from, to) {
        match fs::remove_file(to) {
            Ok(()) => log::warn!("removed partial copy {}", to.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("cannot remove partial copy {}: {e}", to.display()),
        }
        return Err(move_err(copy_err));
    }
    fs::remove_file(from).map_err(move_err)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{FileListModel, WalkDirScanner};
    use std::cell::Cell;
    use tempfile::{tempdir, TempDir};

    /// Prompt with canned answers that records how often it was asked.
    struct ScriptedPrompt {
        overwrite: bool,
        delete_original: bool,
        asked: Cell<u32>,
    }

    impl ScriptedPrompt {
        fn new(overwrite: bool, delete_original: bool) -> Self {
            Self {
                overwrite,
                delete_original,
                asked: Cell::new(0),
            }
        }
    }

    impl ConflictPrompt for ScriptedPrompt {
        fn confirm_overwrite(&self, _destination: &Path) -> bool {
            self.asked.set(self.asked.get() + 1);
            self.overwrite
        }

        fn confirm_delete_original(&self, _source: &Path) -> bool {
            self.asked.set(self.asked.get() + 1);
            self.delete_original
        }
    }

    struct Fixture {
        _dir: TempDir,
        input: PathBuf,
        output: PathBuf,
        secondary: PathBuf,
        classifier: Classifier,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        let secondary = dir.path().join("out2");
        fs::create_dir_all(&input).unwrap();
        let classifier = Classifier::new(output.clone(), secondary.clone());
        Fixture {
            _dir: dir,
            input,
            output,
            secondary,
            classifier,
        }
    }

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn moves_when_destination_is_free() {
        let fx = fixture();
        let src = fx.input.join("a.wav");
        touch(&src, "A");
        let prompt = ScriptedPrompt::new(false, false);

        let outcome = fx.classifier.classify(&src, "speech", false, &prompt).unwrap();

        let dst = fx.output.join("speech").join("a.wav");
        assert_eq!(
            outcome,
            ClassifyOutcome::Moved {
                from: src.clone(),
                to: dst.clone()
            }
        );
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "A");
        assert_eq!(prompt.asked.get(), 0);
        assert!(outcome.status_message().starts_with("Success: File moved successfully."));
    }

    #[test]
    fn secondary_labels_use_the_secondary_root() {
        let fx = fixture();
        let src = fx.input.join("a.wav");
        touch(&src, "A");

        fx.classifier
            .classify(&src, "male", true, &ScriptedPrompt::new(false, false))
            .unwrap();

        assert!(fx.secondary.join("male").join("a.wav").is_file());
        assert!(!fx.output.join("male").exists());
    }

    #[test]
    fn overwrite_replaces_destination() {
        let fx = fixture();
        let src = fx.input.join("a.wav");
        let dst = fx.output.join("speech").join("a.wav");
        touch(&src, "new");
        touch(&dst, "old");

        let outcome = fx
            .classifier
            .classify(&src, "speech", false, &ScriptedPrompt::new(true, false))
            .unwrap();

        assert!(matches!(outcome, ClassifyOutcome::Overwritten { .. }));
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
        assert_eq!(fs::read_dir(fx.output.join("speech")).unwrap().count(), 1);
    }

    #[test]
    fn declined_overwrite_can_delete_the_original() {
        let fx = fixture();
        let src = fx.input.join("a.wav");
        let dst = fx.output.join("speech").join("a.wav");
        touch(&src, "new");
        touch(&dst, "old");
        let prompt = ScriptedPrompt::new(false, true);

        let outcome = fx.classifier.classify(&src, "speech", false, &prompt).unwrap();

        assert_eq!(outcome, ClassifyOutcome::DeletedOriginal { path: src.clone() });
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");
        assert_eq!(prompt.asked.get(), 2);
        assert!(outcome.changed_filesystem());
    }

    #[test]
    fn declining_both_questions_changes_nothing() {
        let fx = fixture();
        let src = fx.input.join("a.wav");
        let dst = fx.output.join("speech").join("a.wav");
        touch(&src, "new");
        touch(&dst, "old");

        let outcome = fx
            .classifier
            .classify(&src, "speech", false, &ScriptedPrompt::new(false, false))
            .unwrap();

        assert!(matches!(outcome, ClassifyOutcome::Kept { .. }));
        assert!(!outcome.changed_filesystem());
        assert_eq!(fs::read_to_string(&src).unwrap(), "new");
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");
    }

    #[test]
    fn default_label_of_a_classified_file_is_a_no_op() {
        let fx = fixture();
        let file = fx.output.join("noise").join("n.wav");
        touch(&file, "N");
        let label = default_label(&file).unwrap();
        let prompt = ScriptedPrompt::new(true, true);

        let outcome = fx.classifier.classify(&file, &label, false, &prompt).unwrap();

        assert!(matches!(outcome, ClassifyOutcome::AlreadyInPlace { .. }));
        assert_eq!(prompt.asked.get(), 0);
        assert_eq!(fs::read_to_string(&file).unwrap(), "N");
    }

    #[test]
    fn unknown_never_prompts_and_replaces() {
        let fx = fixture();
        let src = fx.input.join("a.wav");
        let dst = fx.output.join(UNKNOWN_LABEL).join("a.wav");
        touch(&src, "new");
        touch(&dst, "old");

        let outcome = fx.classifier.classify_unknown(&src).unwrap();

        assert_eq!(
            outcome,
            ClassifyOutcome::MarkedUnknown {
                from: src.clone(),
                to: dst.clone()
            }
        );
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn errors_for_missing_source_and_bad_labels() {
        let fx = fixture();
        let prompt = ScriptedPrompt::new(false, false);
        let missing = fx.input.join("ghost.wav");

        assert!(matches!(
            fx.classifier.classify(&missing, "speech", false, &prompt),
            Err(ClassifyError::SourceMissing(_))
        ));

        let src = fx.input.join("a.wav");
        touch(&src, "A");
        for bad in ["", "  ", "a/b", ".."] {
            assert!(
                matches!(
                    fx.classifier.classify(&src, bad, false, &prompt),
                    Err(ClassifyError::InvalidLabel(_))
                ),
                "label {bad:?} accepted"
            );
        }
        assert!(src.exists());
    }

    #[test]
    fn default_label_is_parent_folder_name() {
        assert_eq!(
            default_label(Path::new("/data/in/speech/a.wav")).as_deref(),
            Some("speech")
        );
        assert_eq!(default_label(Path::new("a.wav")), None);
    }

    fn cross_device(_: &Path, _: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "cross-device link"))
    }

    #[test]
    fn move_falls_back_to_copy_when_rename_fails() {
        let fx = fixture();
        let src = fx.input.join("a.wav");
        let dst = fx.output.join("a.wav");
        touch(&src, "payload");
        create_dir(&fx.output).unwrap();

        move_with(&src, &dst, cross_device, |a, b| fs::copy(a, b)).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload");
    }

    #[test]
    fn failed_copy_leaves_no_partial_destination() {
        let fx = fixture();
        let src = fx.input.join("a.wav");
        let dst = fx.output.join("a.wav");
        touch(&src, "payload");
        create_dir(&fx.output).unwrap();

        // Writes part of the file, then runs out of space.
        let short_copy = |_: &Path, to: &Path| -> io::Result<u64> {
            fs::write(to, "pay")?;
            Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
        };
        let err = move_with(&src, &dst, cross_device, short_copy).unwrap_err();

        assert!(matches!(err, ClassifyError::Move { .. }));
        assert!(err.to_string().contains("no space left"), "{err}");
        assert!(!dst.exists(), "partial copy left behind");
        assert_eq!(fs::read_to_string(&src).unwrap(), "payload");
    }

    #[test]
    fn failed_copy_without_output_reports_error() {
        let fx = fixture();
        let src = fx.input.join("a.wav");
        touch(&src, "payload");

        let err = move_with(&src, &fx.output.join("a.wav"), cross_device, |_: &Path, _: &Path| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        })
        .unwrap_err();

        assert!(matches!(err, ClassifyError::Move { .. }));
        assert!(src.is_file());
    }

    #[test]
    fn classification_then_reconcile_selects_next_index() {
        let fx = fixture();
        for name in ["a.wav", "b.wav", "c.wav", "d.wav"] {
            touch(&fx.input.join(name), name);
        }
        let scanner = WalkDirScanner;
        let mut model = FileListModel::new(fx.output.clone());
        model.load(&fx.input, &scanner);
        model.select(1);
        let old_index = model.selected_index().unwrap();
        let current = model.selected_path().unwrap().to_path_buf();

        let outcome = fx
            .classifier
            .classify(&current, "music", false, &ScriptedPrompt::new(false, false))
            .unwrap();
        assert!(outcome.changed_filesystem());

        let change = model.reconcile(old_index, &scanner).expect("selection");

        // The moved file reappears as a classified entry under the output root.
        assert_eq!(model.len(), 4);
        let moved = model
            .position_of(&fx.output.join("music").join("b.wav"))
            .expect("classified entry listed");
        assert!(model.entries()[moved].is_classified());
        assert!(model.position_of(&current).is_none());
        assert_eq!(change.index, (old_index + 1).min(model.len() - 1));
    }
}
