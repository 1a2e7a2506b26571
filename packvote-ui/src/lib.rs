//! Headless runtime for the packvote front end.
//!
//! The crate models the small slice of a browser the packvote widgets depend
//! on: an element tree with ids, classes and form values ([`Document`]), an
//! overlay layer for floating surfaces, a synchronous event loop ([`Page`])
//! and a wall clock ([`Clock`]). Widgets live in `packvote-components`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use packvote_ui::{
//!     Document, Element, ElementKind, EventFlow, EventPhase, Page, PageContext, Px, PxSize,
//!     SystemClock, UiEvent, Widget,
//! };
//!
//! struct CountClicks(std::sync::atomic::AtomicUsize);
//!
//! impl Widget for CountClicks {
//!     fn handle_event(
//!         &self,
//!         _cx: &mut PageContext,
//!         phase: EventPhase,
//!         event: &UiEvent,
//!     ) -> EventFlow {
//!         if phase == EventPhase::Document && matches!(event, UiEvent::Click { .. }) {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
//!         }
//!         EventFlow::Continue
//!     }
//! }
//!
//! let mut document = Document::new();
//! let body = document.body();
//! let button = document
//!     .append(body, Element::new(ElementKind::Button).with_id("go"))
//!     .unwrap();
//!
//! let mut page = Page::new(document, PxSize::new(Px(800), Px(600)), Arc::new(SystemClock));
//! let counter = Arc::new(CountClicks(Default::default()));
//! let id = page.allocate_widget_id();
//! page.mount(id, counter.clone());
//!
//! page.click(button);
//! assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 1);
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod clock;
pub mod context;
pub mod document;
pub mod error;
pub mod event;
pub mod listeners;
pub mod logging;
pub mod overlay;
pub mod page;
pub mod px;

pub use chrono;
pub use indextree::NodeId;

pub use crate::{
    clock::{Clock, ManualClock, SystemClock},
    context::ContextMap,
    document::{
        Display, Document, Element, ElementKind, ElementStyle, InputType, PointerEvents, Position,
    },
    error::UiError,
    event::{EventFlow, EventPhase, Key, UiEvent},
    listeners::{ListenerRegistry, WindowListener},
    overlay::{OverlayEntry, OverlayLayer},
    page::{Page, PageContext, Widget, WidgetId},
    px::{Px, PxPosition, PxRect, PxSize},
};
