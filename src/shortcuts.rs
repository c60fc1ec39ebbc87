//! Fixed keyboard bindings.
//!
//! | Keys        | Action                      |
//! |-------------|-----------------------------|
//! | Ctrl+L      | Load directory              |
//! | Space       | Play audio                  |
//! | Right Arrow | Next file                   |
//! | Left Arrow  | Previous file               |
//! | Enter       | Classify as default         |
//! | Ctrl+U      | Classify as unknown         |
//! | Ctrl+A      | About                       |
//! | Ctrl+K      | Keyboard shortcuts help     |

use eframe::egui::{self, Key, Modifiers};

/// Actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    LoadDirectory,
    Play,
    Next,
    Previous,
    AcceptDefault,
    Unknown,
    About,
    ShowShortcuts,
}

/// One row of the binding table.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub shortcut: Shortcut,
    pub modifiers: Modifiers,
    pub key: Key,
    /// Human-readable key combination.
    pub keys: &'static str,
    pub description: &'static str,
}

pub const BINDINGS: [Binding; 8] = [
    Binding {
        shortcut: Shortcut::LoadDirectory,
        modifiers: Modifiers::CTRL,
        key: Key::L,
        keys: "Ctrl+L",
        description: "Load Directory",
    },
    Binding {
        shortcut: Shortcut::Play,
        modifiers: Modifiers::NONE,
        key: Key::Space,
        keys: "Space",
        description: "Play Audio",
    },
    Binding {
        shortcut: Shortcut::Next,
        modifiers: Modifiers::NONE,
        key: Key::ArrowRight,
        keys: "Right Arrow",
        description: "Next File",
    },
    Binding {
        shortcut: Shortcut::Previous,
        modifiers: Modifiers::NONE,
        key: Key::ArrowLeft,
        keys: "Left Arrow",
        description: "Previous File",
    },
    Binding {
        shortcut: Shortcut::AcceptDefault,
        modifiers: Modifiers::NONE,
        key: Key::Enter,
        keys: "Enter",
        description: "Classify as Default",
    },
    Binding {
        shortcut: Shortcut::Unknown,
        modifiers: Modifiers::CTRL,
        key: Key::U,
        keys: "Ctrl+U",
        description: "Classify as Unknown",
    },
    Binding {
        shortcut: Shortcut::About,
        modifiers: Modifiers::CTRL,
        key: Key::A,
        keys: "Ctrl+A",
        description: "About",
    },
    Binding {
        shortcut: Shortcut::ShowShortcuts,
        modifiers: Modifiers::CTRL,
        key: Key::K,
        keys: "Ctrl+K",
        description: "Keyboard Shortcuts Help",
    },
];

/// Find the action bound to `key` pressed with `modifiers`.
///
/// Ctrl must match exactly; Alt never matches.  Shift is ignored.
pub fn lookup(modifiers: Modifiers, key: Key) -> Option<Shortcut> {
    if modifiers.alt {
        return None;
    }
    BINDINGS
        .iter()
        .find(|b| b.key == key && b.modifiers.ctrl == modifiers.ctrl)
        .map(|b| b.shortcut)
}

/// Drain this frame's key presses that match a binding.
pub fn poll(ctx: &egui::Context) -> Vec<Shortcut> {
    ctx.input(|i| {
        i.events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => lookup(*modifiers, *key),
                _ => None,
            })
            .collect()
    })
}

/// Text for the shortcuts dialog.
pub fn help_text() -> String {
    let mut text = String::from("Keyboard Shortcuts:\n");
    for b in &BINDINGS {
        text.push_str(&format!("{}: {}\n", b.keys, b.description));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keys() {
        assert_eq!(lookup(Modifiers::NONE, Key::Space), Some(Shortcut::Play));
        assert_eq!(lookup(Modifiers::NONE, Key::ArrowRight), Some(Shortcut::Next));
        assert_eq!(lookup(Modifiers::NONE, Key::ArrowLeft), Some(Shortcut::Previous));
        assert_eq!(lookup(Modifiers::NONE, Key::Enter), Some(Shortcut::AcceptDefault));
    }

    #[test]
    fn ctrl_combinations() {
        assert_eq!(lookup(Modifiers::CTRL, Key::L), Some(Shortcut::LoadDirectory));
        assert_eq!(lookup(Modifiers::CTRL, Key::U), Some(Shortcut::Unknown));
        assert_eq!(lookup(Modifiers::CTRL, Key::A), Some(Shortcut::About));
        assert_eq!(lookup(Modifiers::CTRL, Key::K), Some(Shortcut::ShowShortcuts));
    }

    #[test]
    fn modifiers_must_match() {
        assert_eq!(lookup(Modifiers::NONE, Key::L), None);
        assert_eq!(lookup(Modifiers::CTRL, Key::Space), None);
        assert_eq!(lookup(Modifiers::ALT, Key::Space), None);
        assert_eq!(lookup(Modifiers::SHIFT, Key::Space), Some(Shortcut::Play));
    }

    #[test]
    fn every_action_is_bound_once() {
        for b in &BINDINGS {
            let count = BINDINGS.iter().filter(|o| o.shortcut == b.shortcut).count();
            assert_eq!(count, 1, "{:?} bound {count} times", b.shortcut);
            assert_eq!(lookup(b.modifiers, b.key), Some(b.shortcut));
        }
    }

    #[test]
    fn help_lists_every_binding() {
        let text = help_text();
        assert!(text.contains("Ctrl+L: Load Directory"));
        assert!(text.contains("Ctrl+K: Keyboard Shortcuts Help"));
        assert_eq!(text.lines().count(), BINDINGS.len() + 1);
    }
}
