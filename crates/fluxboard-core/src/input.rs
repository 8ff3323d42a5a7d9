//! Input event types for unified mouse/touch/keyboard handling.
//!
//! The host maps its UI toolkit events (mouse or single-touch) onto these;
//! the engine never talks to a windowing system directly.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pointer button identifiers. Touch input maps to `Primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether the multi-select modifier is held.
    pub fn multi_select(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Pointer event, with positions in screen coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: PointerButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: PointerButton,
    },
    Scroll {
        position: Point,
        delta: Vec2,
    },
}

/// Keyboard actions the engine responds to. The host owns the actual
/// keybinding table and translates key chords into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorKey {
    Undo,
    Redo,
    Duplicate,
    Delete,
    Group,
    Escape,
    ResetZoom,
}
