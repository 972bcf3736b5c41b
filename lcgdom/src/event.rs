//! Raw input events as the host delivers them.

use crate::element::NodeId;

/// Kinds of events widgets subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    Click,
    ContextMenu,
    MouseOver,
    TouchStart,
    TouchMove,
    TouchEnd,
}

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Default::default()
        }
    }

    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            alt: false,
        }
    }

    pub fn none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A single input event travelling through the document.
///
/// Mirrors the parts of a DOM event the widgets look at: the target, the
/// legacy `which` key code, modifier flags, pointer position, the button
/// that produced a click and the click `detail` count. Handlers call
/// [`Event::prevent_default`] and [`Event::stop_propagation`] the same way
/// DOM handlers do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
    /// Legacy key code (`event.which`) for key events, 0 otherwise.
    pub key_code: u32,
    pub modifiers: Modifiers,
    pub page_x: i32,
    pub page_y: i32,
    /// Button for mouse events; `None` for clicks synthesized from touch
    /// or assistive technology.
    pub button: Option<MouseButton>,
    /// Click count for mouse clicks, 0 for synthesized clicks.
    pub detail: u32,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            key_code: 0,
            modifiers: Modifiers::NONE,
            page_x: 0,
            page_y: 0,
            button: None,
            detail: 0,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// A key press with the given legacy key code.
    pub fn key_down(target: NodeId, key_code: u32) -> Self {
        Self {
            key_code,
            ..Self::new(EventKind::KeyDown, target)
        }
    }

    /// A primary-button single click at the given page position.
    pub fn click_at(target: NodeId, page_x: i32, page_y: i32) -> Self {
        Self {
            page_x,
            page_y,
            button: Some(MouseButton::Left),
            detail: 1,
            ..Self::new(EventKind::Click, target)
        }
    }

    /// A primary-button single click at the page origin.
    pub fn click(target: NodeId) -> Self {
        Self::click_at(target, 0, 0)
    }

    /// A click not produced by a mouse (touch, screen reader, `element.click()`).
    pub fn synthetic_click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target)
    }

    /// A secondary-button `contextmenu` event.
    pub fn context_menu(target: NodeId, page_x: i32, page_y: i32) -> Self {
        Self {
            page_x,
            page_y,
            button: Some(MouseButton::Right),
            detail: 1,
            ..Self::new(EventKind::ContextMenu, target)
        }
    }

    pub fn mouse_over(target: NodeId) -> Self {
        Self::new(EventKind::MouseOver, target)
    }

    pub fn touch_start(target: NodeId) -> Self {
        Self::new(EventKind::TouchStart, target)
    }

    pub fn touch_move(target: NodeId) -> Self {
        Self::new(EventKind::TouchMove, target)
    }

    pub fn touch_end(target: NodeId) -> Self {
        Self::new(EventKind::TouchEnd, target)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Whether this is a plain primary-button single click.
    pub fn is_primary_click(&self) -> bool {
        self.kind == EventKind::Click && self.button == Some(MouseButton::Left) && self.detail == 1
    }
}
