//! Global hotkey dispatch.
//!
//! [`dispatch`] only maps a key press to a [`Command`]; the engine checks each
//! command's precondition (a selection, a filled clipboard, an open popover)
//! when it executes it, so an unmet precondition is a silent no-op.

#[cfg(test)]
#[path = "keyboard_test.rs"]
mod keyboard_test;

use crate::input::{Key, Modifiers};

/// An editor command bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Delete / Backspace.
    DeleteSelected,
    /// Ctrl/Cmd+C.
    CopySelected,
    /// Ctrl/Cmd+V.
    Paste,
    /// Space: open or close the settings popover for the selection.
    ToggleSettings,
    /// Escape: close the popover, or cancel text editing.
    Escape,
    /// Ctrl/Cmd+S: write pending updates now.
    Save,
}

/// Focus state the bindings depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyContext {
    /// Keystrokes are going to a text field.
    pub typing: bool,
}

/// Resolve a key press to a command.
///
/// Escape and save stay live while typing; everything else belongs to the
/// text field in that case.
#[must_use]
pub fn dispatch(key: &Key, modifiers: Modifiers, ctx: KeyContext) -> Option<Command> {
    if key.is("Escape") {
        return Some(Command::Escape);
    }
    if modifiers.command() && key.is("s") {
        return Some(Command::Save);
    }
    if ctx.typing {
        return None;
    }

    if modifiers.command() {
        return if key.is("c") {
            Some(Command::CopySelected)
        } else if key.is("v") {
            Some(Command::Paste)
        } else {
            None
        };
    }

    if key.is("Delete") || key.is("Backspace") {
        Some(Command::DeleteSelected)
    } else if key.0 == " " || key.is("Spacebar") {
        Some(Command::ToggleSettings)
    } else {
        None
    }
}
