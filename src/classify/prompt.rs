//! Native yes/no dialogs for destination conflicts.
//!
//! The dialogs are modal and block the UI thread until answered, which keeps
//! a classification a single synchronous step.

use std::path::Path;

use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use super::ConflictPrompt;

/// [`ConflictPrompt`] answered through `rfd` message boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogPrompt;

fn ask(title: &str, description: String) -> bool {
    let answer = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::YesNo)
        .show();
    matches!(answer, MessageDialogResult::Yes)
}

impl ConflictPrompt for DialogPrompt {
    fn confirm_overwrite(&self, destination: &Path) -> bool {
        ask(
            "File Exists",
            format!(
                "{} already exists. Do you want to overwrite it?",
                destination.display()
            ),
        )
    }

    fn confirm_delete_original(&self, source: &Path) -> bool {
        ask(
            "Delete Original",
            format!("Do you want to delete the original file?\n{}", source.display()),
        )
    }
}
