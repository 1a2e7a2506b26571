//! Input events and dispatch phases.

use indextree::NodeId;

use crate::px::PxSize;

/// Keys the widgets react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Escape.
    Escape,
    /// Enter / Return.
    Enter,
    /// Down arrow.
    ArrowDown,
    /// Up arrow.
    ArrowUp,
    /// Any printable character.
    Character(char),
}

/// An event delivered through [`crate::page::Page::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Primary-button click on `target`.
    Click {
        /// The element that was clicked.
        target: NodeId,
    },
    /// A committed value change on a select, checkbox or input.
    Change {
        /// The element whose value changed.
        target: NodeId,
    },
    /// An edit inside a text field.
    Input {
        /// The edited field.
        target: NodeId,
    },
    /// A key press, optionally aimed at a focused element.
    KeyDown {
        /// The focused element, if any.
        target: Option<NodeId>,
        /// The key.
        key: Key,
    },
    /// The viewport changed size.
    Resize {
        /// The new viewport size.
        viewport: PxSize,
    },
    /// Something scrolled. Delivered in capture mode, so every scroll on the
    /// page reaches window listeners.
    Scroll {
        /// The scrolled element, or `None` for the document itself.
        target: Option<NodeId>,
    },
    /// A form is being submitted, by a submit button or Enter in a field.
    Submit {
        /// The form element.
        target: NodeId,
    },
    /// Timer heartbeat; widgets compare deadlines against the page clock.
    Tick,
    /// Requests that the floating surface rooted at `target` closes,
    /// regardless of its own toggle logic.
    ForceClose {
        /// The floating element to close.
        target: NodeId,
    },
}

impl UiEvent {
    /// The element the event is aimed at, if any.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            UiEvent::Click { target }
            | UiEvent::Change { target }
            | UiEvent::Input { target }
            | UiEvent::Submit { target }
            | UiEvent::ForceClose { target } => Some(*target),
            UiEvent::KeyDown { target, .. } | UiEvent::Scroll { target } => *target,
            UiEvent::Resize { .. } | UiEvent::Tick => None,
        }
    }
}

/// Where in the dispatch an event is being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// Handlers bound to the target element itself.
    Target,
    /// Document-level handlers; skipped once a target handler stops
    /// propagation.
    Document,
    /// Window-level handlers (resize, scroll, timers). Only subscribed
    /// widgets see resize and scroll.
    Window,
}

/// Returned by handlers to control propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFlow {
    /// Keep delivering.
    #[default]
    Continue,
    /// Do not deliver to the document phase.
    Stop,
}
