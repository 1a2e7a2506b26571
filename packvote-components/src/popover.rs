//! Floating surfaces anchored to a trigger element.
//!
//! A [`Popover`] owns the open/close lifecycle of one floating element: it
//! lifts the element into the overlay layer while shown, keeps it positioned
//! against its trigger with [`resolve_popover_position`], holds resize and
//! scroll subscriptions only while open, and takes part in page-wide mutual
//! exclusion through the [`PopoverCoordinator`].

use packvote_ui::{
    Display, Document, NodeId, PageContext, PointerEvents, Position, Px, PxPosition, PxRect,
    PxSize, UiEvent, WidgetId, WindowListener,
};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::PopoverConfig;

/// Class toggled on the popover while it sits above its trigger.
pub const FLIPPED_CLASS: &str = "bottom-up";
/// Class carried by the popover while open.
pub const OPEN_CLASS: &str = "is-open";
/// Class carried by the trigger's container while the popover is open.
pub const CONTAINER_OPEN_CLASS: &str = "open";

/// Which side of the trigger the popover ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopoverPlacement {
    /// Below the trigger (preferred).
    #[default]
    Below,
    /// Above the trigger.
    Above,
}

/// Result of a placement computation, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopoverPosition {
    /// Top edge of the popover.
    pub top: Px,
    /// Left edge of the popover.
    pub left: Px,
    /// Side of the trigger the popover is on.
    pub placement: PopoverPlacement,
}

/// Places a popover of `size` next to `trigger` inside `viewport`.
///
/// Below is preferred. The popover flips above when the room below cannot
/// hold it plus the safety margin and the room above can. When neither side
/// fits it stays below, pushed up just enough to end at the bottom padding
/// line but never above the top padding line. Horizontally it aligns with
/// the trigger's left edge, clamped into the padded viewport.
pub fn resolve_popover_position(
    trigger: PxRect,
    size: PxSize,
    viewport: PxSize,
    config: &PopoverConfig,
) -> PopoverPosition {
    let padding = config.padding_px();
    let gap = config.gap_px();
    let height = size.height;

    let space_below = viewport.height - trigger.bottom();
    let mut above = space_below < height + config.safety_margin_px()
        && trigger.top() - padding >= height;
    let mut top = trigger.bottom() + gap;

    if above {
        top = trigger.top() - height - gap;
        if top < padding {
            above = false;
            top = trigger.bottom() + gap;
        }
    }

    if !above && top + height > viewport.height - padding {
        let flipped_top = trigger.top() - height - gap;
        if flipped_top >= padding {
            above = true;
            top = flipped_top;
        } else {
            top = padding.max(viewport.height - height - padding);
        }
    }

    let min_left = padding;
    let max_left = viewport.width - size.width - padding;
    let left = trigger.left().max(min_left).min(min_left.max(max_left));

    PopoverPosition {
        top,
        left,
        placement: if above {
            PopoverPlacement::Above
        } else {
            PopoverPlacement::Below
        },
    }
}

/// Size to use for placement: the laid-out size, else the last size seen
/// while open, else the configured fallback. Each dimension falls back
/// independently.
pub fn measure_popover(bounds: PxSize, last_known: PxSize, config: &PopoverConfig) -> PxSize {
    let fallback = config.fallback_size();
    let pick = |measured: Px, last: Px, fallback: Px| {
        if measured > Px::ZERO {
            measured
        } else if last > Px::ZERO {
            last
        } else {
            fallback
        }
    };
    PxSize::new(
        pick(bounds.width, last_known.width, fallback.width),
        pick(bounds.height, last_known.height, fallback.height),
    )
}

/// Page-wide registry guaranteeing at most one open popover.
///
/// Shared through the page context: `cx.use_context::<PopoverCoordinator>()`.
#[derive(Debug, Default)]
pub struct PopoverCoordinator {
    open: Mutex<Option<NodeId>>,
}

impl PopoverCoordinator {
    /// Records `popover` as the open one, returning the popover it displaced.
    pub fn admit(&self, popover: NodeId) -> Option<NodeId> {
        let mut open = self.open.lock();
        let displaced = open.replace(popover);
        displaced.filter(|&previous| previous != popover)
    }

    /// Clears the slot if `popover` holds it. Returns whether it did.
    pub fn release(&self, popover: NodeId) -> bool {
        let mut open = self.open.lock();
        if *open == Some(popover) {
            *open = None;
            true
        } else {
            false
        }
    }

    /// The currently open popover.
    pub fn current(&self) -> Option<NodeId> {
        *self.open.lock()
    }
}

/// Lifts `popover` into the overlay layer, anchored at its parent, and gives
/// it fixed positioning. Returns `false` if it was already lifted.
pub fn lift_into_overlay(doc: &mut Document, popover: NodeId, config: &PopoverConfig) -> bool {
    let Some(anchor) = doc.parent(popover) else {
        return false;
    };
    if !doc.overlay_mut().push(popover, anchor, config.z_index) {
        return false;
    }
    doc.update(popover, |element| {
        element.set_data("portal", "true");
        let style = element.style_mut();
        style.position = Some(Position::Fixed);
        style.pointer_events = Some(PointerEvents::Auto);
        style.z_index = Some(config.z_index);
    });
    true
}

/// Returns `popover` from the overlay layer to the normal flow. Returns
/// `false` if it was not lifted.
pub fn restore_to_flow(doc: &mut Document, popover: NodeId) -> bool {
    if doc.overlay_mut().remove(popover).is_none() {
        return false;
    }
    doc.update(popover, |element| {
        element.set_data("portal", "false");
        let style = element.style_mut();
        style.position = None;
        style.pointer_events = None;
        style.z_index = None;
    });
    true
}

/// Lifecycle and placement state of one anchored popover.
#[derive(Debug, Clone)]
pub struct Popover {
    owner: WidgetId,
    node: NodeId,
    trigger: NodeId,
    container: Option<NodeId>,
    is_open: bool,
    position: Option<PopoverPosition>,
    last_size: PxSize,
}

impl Popover {
    /// Creates closed popover state for `node`, anchored to `trigger`.
    /// `container`, if any, gets [`CONTAINER_OPEN_CLASS`] while open.
    pub fn new(owner: WidgetId, node: NodeId, trigger: NodeId, container: Option<NodeId>) -> Self {
        Self {
            owner,
            node,
            trigger,
            container,
            is_open: false,
            position: None,
            last_size: PxSize::ZERO,
        }
    }

    /// The floating element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The trigger element.
    pub fn trigger(&self) -> NodeId {
        self.trigger
    }

    /// Whether the popover is shown.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// The last computed position; `None` while closed.
    pub fn position(&self) -> Option<PopoverPosition> {
        self.position
    }

    /// Whether `target` is inside the popover or its trigger.
    pub fn contains(&self, doc: &Document, target: NodeId) -> bool {
        doc.contains(self.node, target) || doc.contains(self.trigger, target)
    }

    /// Opens the popover. Any other open popover on the page is sent a
    /// [`UiEvent::ForceClose`]. Returns `false` if it was already open.
    pub fn open(&mut self, cx: &mut PageContext, config: &PopoverConfig) -> bool {
        if self.is_open {
            return false;
        }

        let coordinator = cx.use_context::<PopoverCoordinator>();
        if let Some(displaced) = coordinator.admit(self.node) {
            debug!(?displaced, "force-closing previously open popover");
            cx.post(UiEvent::ForceClose { target: displaced });
        }

        self.is_open = true;
        let doc = cx.document_mut();
        lift_into_overlay(doc, self.node, config);
        doc.update(self.node, |element| {
            element.style_mut().display = Some(Display::Block);
            element.add_class(OPEN_CLASS);
        });
        if let Some(container) = self.container {
            doc.update(container, |element| element.add_class(CONTAINER_OPEN_CLASS));
        }

        self.reposition(cx, config);
        let listeners = cx.listeners_mut();
        listeners.subscribe(self.owner, WindowListener::Resize);
        listeners.subscribe(self.owner, WindowListener::Scroll);
        debug!(popover = ?self.node, position = ?self.position, "popover opened");
        true
    }

    /// Closes the popover and releases everything `open` acquired. Returns
    /// `false` if it was already closed.
    pub fn close(&mut self, cx: &mut PageContext) -> bool {
        if !self.is_open {
            return false;
        }
        self.is_open = false;
        self.position = None;

        let listeners = cx.listeners_mut();
        listeners.unsubscribe(self.owner, WindowListener::Resize);
        listeners.unsubscribe(self.owner, WindowListener::Scroll);

        let doc = cx.document_mut();
        doc.update(self.node, |element| {
            let style = element.style_mut();
            style.display = Some(Display::None);
            style.top = None;
            style.left = None;
            element.remove_class(FLIPPED_CLASS);
            element.remove_class(OPEN_CLASS);
        });
        if let Some(container) = self.container {
            doc.update(container, |element| {
                element.remove_class(CONTAINER_OPEN_CLASS)
            });
        }
        restore_to_flow(doc, self.node);

        cx.use_context::<PopoverCoordinator>().release(self.node);
        debug!(popover = ?self.node, "popover closed");
        true
    }

    /// Recomputes and applies the position. Does nothing while closed.
    pub fn reposition(&mut self, cx: &mut PageContext, config: &PopoverConfig) {
        if !self.is_open {
            return;
        }
        let viewport = cx.viewport();
        let doc = cx.document_mut();
        let trigger = doc.bounding_rect(self.trigger);
        let measured = doc.bounding_rect(self.node).size();
        let size = measure_popover(measured, self.last_size, config);
        let position = resolve_popover_position(trigger, size, viewport, config);
        self.last_size = size;
        self.position = Some(position);

        doc.update(self.node, |element| {
            let style = element.style_mut();
            style.top = Some(position.top);
            style.left = Some(position.left);
            element.toggle_class(FLIPPED_CLASS, position.placement == PopoverPlacement::Above);
            element.set_bounds(PxRect::from_position_size(
                PxPosition::new(position.left, position.top),
                size,
            ));
        });
        trace!(popover = ?self.node, ?position, "popover positioned");
    }
}
