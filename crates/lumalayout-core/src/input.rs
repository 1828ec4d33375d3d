//! Input event vocabulary for the editor.
//!
//! The shell translates its native events into these types; the core has no
//! windowing dependency.

use serde::{Deserialize, Serialize};

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Modifier key state accompanying an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether a click extends the selection instead of replacing it.
    pub fn additive(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Whether the platform command modifier is held.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Discrete editor commands, produced from keyboard shortcuts or menu
/// invocations by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Undo,
    Redo,
    Duplicate,
    Group,
    Ungroup,
    DeleteSelected,
    Escape,
    SelectTool,
    RoomTool,
    RectTool,
    CircleTool,
    TriangleTool,
}
