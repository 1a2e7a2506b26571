//! The page: an element tree, its mounted widgets and the event loop.
//!
//! Hosts translate their native input into [`UiEvent`]s and call
//! [`Page::dispatch`]. Dispatch is synchronous: the event and everything
//! handlers post while handling it are drained before `dispatch` returns.

use std::{collections::VecDeque, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime};
use indextree::NodeId;
use tracing::{debug, warn};

use crate::{
    clock::Clock,
    context::ContextMap,
    document::Document,
    event::{EventFlow, EventPhase, Key, UiEvent},
    listeners::{ListenerRegistry, WindowListener},
    px::{PxPosition, PxSize},
};

/// Upper bound on events drained by one `dispatch` call. Exceeding it means
/// handlers keep re-posting events to each other.
const MAX_EVENTS_PER_DISPATCH: usize = 1024;

/// Identifies a mounted widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Wraps a raw id. Pages allocate these; this is for tests and hosts that
    /// manage their own registries.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Something mounted on a page that reacts to events.
///
/// Widgets keep their own state behind interior mutability so that the page
/// and any handles returned to callers share it.
pub trait Widget: Send + Sync {
    /// Handles one event in one phase.
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent)
    -> EventFlow;
}

/// Everything a widget may touch while handling an event.
pub struct PageContext {
    document: Document,
    viewport: PxSize,
    listeners: ListenerRegistry,
    clock: Arc<dyn Clock>,
    contexts: ContextMap,
    queue: VecDeque<UiEvent>,
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("viewport", &self.viewport)
            .field("listeners", &self.listeners)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl PageContext {
    /// The element tree.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The element tree, mutably.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The current viewport size.
    pub fn viewport(&self) -> PxSize {
        self.viewport
    }

    /// Window-level subscriptions.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Window-level subscriptions, mutably.
    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    /// The page clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Shorthand for `clock().now()`.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Shorthand for `clock().today()`.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Queues an event to be delivered after the current one.
    pub fn post(&mut self, event: UiEvent) {
        self.queue.push_back(event);
    }

    /// Stores a shared value for other widgets on this page.
    pub fn provide_context<T>(&mut self, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.contexts.provide(value);
    }

    /// Reads a shared value, creating the default instance on first use.
    pub fn use_context<T>(&mut self) -> Arc<T>
    where
        T: Default + Send + Sync + 'static,
    {
        self.contexts.get_or_default::<T>()
    }
}

/// A page with mounted widgets.
pub struct Page {
    cx: PageContext,
    widgets: Vec<(WidgetId, Arc<dyn Widget>)>,
    next_widget_id: u64,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("cx", &self.cx)
            .field("widgets", &self.widgets.len())
            .finish()
    }
}

impl Page {
    /// Creates a page over `document` with the given viewport and clock.
    pub fn new(document: Document, viewport: PxSize, clock: Arc<dyn Clock>) -> Self {
        Self {
            cx: PageContext {
                document,
                viewport,
                listeners: ListenerRegistry::default(),
                clock,
                contexts: ContextMap::default(),
                queue: VecDeque::new(),
            },
            widgets: Vec::new(),
            next_widget_id: 1,
        }
    }

    /// The shared widget context.
    pub fn context(&self) -> &PageContext {
        &self.cx
    }

    /// The shared widget context, mutably.
    pub fn context_mut(&mut self) -> &mut PageContext {
        &mut self.cx
    }

    /// The element tree.
    pub fn document(&self) -> &Document {
        &self.cx.document
    }

    /// The element tree, mutably.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.cx.document
    }

    /// Reserves an id for a widget that is about to be mounted.
    pub fn allocate_widget_id(&mut self) -> WidgetId {
        let id = WidgetId(self.next_widget_id);
        self.next_widget_id += 1;
        id
    }

    /// Mounts a widget under a previously allocated id.
    pub fn mount(&mut self, id: WidgetId, widget: Arc<dyn Widget>) {
        debug!(?id, "widget mounted");
        self.widgets.push((id, widget));
    }

    /// Unmounts a widget and drops its window subscriptions.
    pub fn unmount(&mut self, id: WidgetId) -> bool {
        let before = self.widgets.len();
        self.widgets.retain(|(widget_id, _)| *widget_id != id);
        self.cx.listeners.unsubscribe_all(id);
        before != self.widgets.len()
    }

    /// Number of mounted widgets.
    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// Delivers `event` and then everything posted while handling it.
    pub fn dispatch(&mut self, event: UiEvent) {
        self.cx.queue.push_back(event);
        let mut delivered = 0;
        while let Some(event) = self.cx.queue.pop_front() {
            if delivered == MAX_EVENTS_PER_DISPATCH {
                warn!(
                    dropped = self.cx.queue.len() + 1,
                    "event queue did not settle, dropping remaining events"
                );
                self.cx.queue.clear();
                break;
            }
            self.deliver(&event);
            delivered += 1;
        }
    }

    fn deliver(&mut self, event: &UiEvent) {
        match event {
            UiEvent::Resize { viewport } => {
                self.cx.viewport = *viewport;
                self.deliver_window(WindowListener::Resize, event);
            }
            UiEvent::Scroll { .. } => self.deliver_window(WindowListener::Scroll, event),
            UiEvent::Tick => {
                for (_, widget) in &self.widgets {
                    widget.handle_event(&mut self.cx, EventPhase::Window, event);
                }
            }
            _ => {
                let mut flow = EventFlow::Continue;
                for (_, widget) in &self.widgets {
                    if widget.handle_event(&mut self.cx, EventPhase::Target, event)
                        == EventFlow::Stop
                    {
                        flow = EventFlow::Stop;
                    }
                }
                if flow == EventFlow::Continue {
                    for (_, widget) in &self.widgets {
                        widget.handle_event(&mut self.cx, EventPhase::Document, event);
                    }
                }
            }
        }
    }

    fn deliver_window(&mut self, kind: WindowListener, event: &UiEvent) {
        let subscribers = self.cx.listeners.subscribers(kind);
        for (id, widget) in &self.widgets {
            // A handler may unsubscribe others; re-check before each call.
            if subscribers.contains(id) && self.cx.listeners.is_subscribed(*id, kind) {
                widget.handle_event(&mut self.cx, EventPhase::Window, event);
            }
        }
    }

    /// Clicks `target`.
    pub fn click(&mut self, target: NodeId) {
        self.dispatch(UiEvent::Click { target });
    }

    /// Clicks whatever element is under `point`, returning it.
    pub fn click_at(&mut self, point: PxPosition) -> Option<NodeId> {
        let target = self.cx.document.hit_test(point)?;
        self.click(target);
        Some(target)
    }

    /// Sets a field's value as the user would and fires `change`.
    pub fn change_value(&mut self, target: NodeId, value: impl Into<String>) {
        let value = value.into();
        self.cx.document.update(target, |element| element.set_value(value));
        self.dispatch(UiEvent::Change { target });
    }

    /// Sets a checkbox's state as the user would and fires `change`.
    pub fn set_checked(&mut self, target: NodeId, checked: bool) {
        self.cx
            .document
            .update(target, |element| element.set_checked(checked));
        self.dispatch(UiEvent::Change { target });
    }

    /// Replaces a text field's content as the user would and fires `input`.
    pub fn type_text(&mut self, target: NodeId, text: impl Into<String>) {
        let text = text.into();
        self.cx.document.update(target, |element| element.set_value(text));
        self.dispatch(UiEvent::Input { target });
    }

    /// Submits the form `target`.
    pub fn submit(&mut self, target: NodeId) {
        self.dispatch(UiEvent::Submit { target });
    }

    /// Presses `key` with `target` focused.
    pub fn key_down(&mut self, target: Option<NodeId>, key: Key) {
        self.dispatch(UiEvent::KeyDown { target, key });
    }

    /// Resizes the viewport.
    pub fn resize(&mut self, viewport: PxSize) {
        self.dispatch(UiEvent::Resize { viewport });
    }

    /// Reports a scroll.
    pub fn scroll(&mut self, target: Option<NodeId>) {
        self.dispatch(UiEvent::Scroll { target });
    }

    /// Fires timers whose deadline has passed on the page clock.
    pub fn tick(&mut self) {
        self.dispatch(UiEvent::Tick);
    }
}
