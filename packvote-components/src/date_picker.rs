//! Calendar popover for picking a trip date.
//!
//! ## Usage
//!
//! Bind a picker to markup that follows the id convention for a name prefix
//! (`{prefix}_trigger`, `{prefix}_dropdown`, `{prefix}_display`, `{prefix}`,
//! `{prefix}_month`, `{prefix}_year`, `{prefix}_days`), then drive the page.
//!
//! ```
//! use std::sync::Arc;
//!
//! use packvote_components::{
//!     config::ComponentsConfig,
//!     date_picker::{DatePicker, build_date_picker_markup},
//! };
//! use packvote_ui::{
//!     Document, ManualClock, Page, Px, PxRect, PxSize, chrono::NaiveDate,
//! };
//!
//! let mut document = Document::new();
//! let body = document.body();
//! let trigger_bounds = PxRect::new(Px(40), Px(80), Px(240), Px(40));
//! build_date_picker_markup(&mut document, body, "travel_date", trigger_bounds).unwrap();
//!
//! let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
//! let clock = Arc::new(ManualClock::at_midnight(today));
//! let mut page = Page::new(document, PxSize::new(Px(1280), Px(800)), clock);
//! let picker = DatePicker::initialize(&mut page, "travel_date", &ComponentsConfig::default())
//!     .expect("markup is complete");
//!
//! page.click(picker.trigger());
//! assert!(picker.is_open());
//!
//! let day = picker.day_cell(NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()).unwrap();
//! page.click(day);
//! assert!(!picker.is_open());
//! assert_eq!(picker.value(page.document()), "2025-06-20");
//! ```

pub mod calendar;

use std::{str::FromStr, sync::Arc};

use chrono::NaiveDate;
use packvote_ui::{
    Display, Document, Element, ElementKind, EventFlow, EventPhase, InputType, Key, NodeId, Page,
    PageContext, PxRect, UiError, UiEvent, Widget, WidgetId,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use tracing::{debug, warn};

use crate::{
    config::{ComponentsConfig, DatePickerConfig, MAX_YEAR_SPAN, PopoverConfig},
    popover::{Popover, PopoverPosition},
};

pub use calendar::{CalendarCursor, format_display, format_value, parse_value};
use calendar::{MONTH_NAMES, build_month_grid, is_month_disabled, year_options};

/// Class of the element wrapping trigger and popover.
pub const CONTAINER_CLASS: &str = "date-picker-container";
/// Class of every grid cell, blank or not.
pub const DAY_CLASS: &str = "date-picker-day";

/// The elements one picker instance is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DatePickerParts {
    trigger: NodeId,
    popover: NodeId,
    display: NodeId,
    value_field: NodeId,
    month_select: NodeId,
    year_select: NodeId,
    days: NodeId,
    container: Option<NodeId>,
}

impl DatePickerParts {
    fn resolve(doc: &Document, prefix: &str) -> Result<Self, UiError> {
        let trigger = doc.require(&format!("{prefix}_trigger"))?;
        Ok(Self {
            trigger,
            popover: doc.require(&format!("{prefix}_dropdown"))?,
            display: doc.require(&format!("{prefix}_display"))?,
            value_field: doc.require(prefix)?,
            month_select: doc.require(&format!("{prefix}_month"))?,
            year_select: doc.require(&format!("{prefix}_year"))?,
            days: doc.require(&format!("{prefix}_days"))?,
            container: doc.closest(trigger, CONTAINER_CLASS),
        })
    }
}

struct DatePickerState {
    prefix: String,
    parts: DatePickerParts,
    selected: Option<NaiveDate>,
    cursor: CalendarCursor,
    popover: Popover,
    day_cells: HashMap<NodeId, NaiveDate>,
    config: DatePickerConfig,
    popover_config: PopoverConfig,
}

/// A date picker bound to page markup.
///
/// Cloning yields another handle to the same picker.
#[derive(Clone)]
pub struct DatePicker {
    id: WidgetId,
    inner: Arc<RwLock<DatePickerState>>,
}

impl std::fmt::Debug for DatePicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read();
        f.debug_struct("DatePicker")
            .field("id", &self.id)
            .field("prefix", &state.prefix)
            .field("selected", &state.selected)
            .field("cursor", &state.cursor)
            .field("is_open", &state.popover.is_open())
            .finish()
    }
}

impl DatePicker {
    /// Binds a picker to the elements named after `prefix` and mounts it.
    ///
    /// Returns `None`, leaving the page untouched, when any required element
    /// is missing: not every page carries every date field.
    pub fn initialize(page: &mut Page, prefix: &str, config: &ComponentsConfig) -> Option<Self> {
        let parts = match DatePickerParts::resolve(page.document(), prefix) {
            Ok(parts) => parts,
            Err(err) => {
                debug!(prefix, %err, "date picker markup incomplete, skipping");
                return None;
            }
        };

        let id = page.allocate_widget_id();
        let today = page.context().today();
        let mut state = DatePickerState {
            prefix: prefix.to_string(),
            parts,
            selected: None,
            cursor: CalendarCursor::of(today),
            popover: Popover::new(id, parts.popover, parts.trigger, parts.container),
            day_cells: HashMap::default(),
            config: config.date_picker.clone(),
            popover_config: config.popover.clone(),
        };

        let cx = page.context_mut();
        {
            let doc = cx.document_mut();
            doc.update(parts.popover, |element| {
                element.style_mut().display = Some(Display::None);
            });
            if let Err(err) = state.ensure_month_options(doc) {
                warn!(prefix, %err, "failed to build month options");
            }
            let placeholder = state.config.placeholder.clone();
            doc.update(parts.display, |element| element.set_text(placeholder));
        }
        state.populate_years(cx);
        state.render(cx);

        let picker = Self {
            id,
            inner: Arc::new(RwLock::new(state)),
        };
        page.mount(id, Arc::new(picker.clone()));
        debug!(prefix, ?id, "date picker initialized");
        Some(picker)
    }

    /// Clears the selection, closes the popover and returns the grid to the
    /// current month.
    pub fn reset(&self, cx: &mut PageContext) {
        self.inner.write().reset(cx);
    }

    /// Closes the popover if open.
    pub fn close(&self, cx: &mut PageContext) {
        self.inner.write().close(cx);
    }

    /// The selected date.
    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.inner.read().selected
    }

    /// The month shown in the grid.
    pub fn cursor(&self) -> CalendarCursor {
        self.inner.read().cursor
    }

    /// Whether the calendar is shown.
    pub fn is_open(&self) -> bool {
        self.inner.read().popover.is_open()
    }

    /// Where the popover was last placed; `None` while closed.
    pub fn position(&self) -> Option<PopoverPosition> {
        self.inner.read().popover.position()
    }

    /// The name prefix the picker is bound to.
    pub fn prefix(&self) -> String {
        self.inner.read().prefix.clone()
    }

    /// The id the picker is mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }

    /// The trigger element.
    pub fn trigger(&self) -> NodeId {
        self.inner.read().parts.trigger
    }

    /// The floating calendar element.
    pub fn popover(&self) -> NodeId {
        self.inner.read().parts.popover
    }

    /// The month selector.
    pub fn month_select(&self) -> NodeId {
        self.inner.read().parts.month_select
    }

    /// The year selector.
    pub fn year_select(&self) -> NodeId {
        self.inner.read().parts.year_select
    }

    /// The current content of the hidden form field.
    pub fn value(&self, doc: &Document) -> String {
        let field = self.inner.read().parts.value_field;
        doc.element(field)
            .map(|element| element.value().to_string())
            .unwrap_or_default()
    }

    /// The clickable grid cell for `date`, if it is rendered and selectable.
    pub fn day_cell(&self, date: NaiveDate) -> Option<NodeId> {
        self.inner
            .read()
            .day_cells
            .iter()
            .find_map(|(&node, &cell)| (cell == date).then_some(node))
    }
}

impl Widget for DatePicker {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        let mut state = self.inner.write();
        let parts = state.parts;
        match (phase, event) {
            (EventPhase::Target, UiEvent::Click { target }) => {
                if cx.document().contains(parts.trigger, *target) {
                    state.toggle(cx);
                    return EventFlow::Stop;
                }
                if let Some(date) = state.day_cells.get(target).copied() {
                    state.select(cx, date);
                }
            }
            (EventPhase::Target, UiEvent::Change { target }) if *target == parts.month_select => {
                state.on_month_change(cx);
            }
            (EventPhase::Target, UiEvent::Change { target }) if *target == parts.year_select => {
                state.on_year_change(cx);
            }
            (EventPhase::Target, UiEvent::ForceClose { target }) if *target == parts.popover => {
                state.close(cx);
            }
            (EventPhase::Document, UiEvent::Click { target }) => {
                if state.popover.is_open() && !state.popover.contains(cx.document(), *target) {
                    state.close(cx);
                }
            }
            (
                EventPhase::Document,
                UiEvent::KeyDown {
                    key: Key::Escape, ..
                },
            ) if state.config.close_on_escape => {
                state.close(cx);
            }
            (EventPhase::Window, UiEvent::Resize { .. } | UiEvent::Scroll { .. }) => {
                let config = state.popover_config.clone();
                state.popover.reposition(cx, &config);
            }
            _ => {}
        }
        EventFlow::Continue
    }
}

impl DatePickerState {
    fn toggle(&mut self, cx: &mut PageContext) {
        if self.popover.is_open() {
            self.close(cx);
            return;
        }

        let seed = self.selected.unwrap_or_else(|| cx.today());
        self.cursor = CalendarCursor::of(seed);
        self.populate_years(cx);
        self.render(cx);
        let config = self.popover_config.clone();
        self.popover.open(cx, &config);
    }

    fn close(&mut self, cx: &mut PageContext) {
        self.popover.close(cx);
    }

    fn select(&mut self, cx: &mut PageContext, date: NaiveDate) {
        if date < cx.today() {
            return;
        }
        self.selected = Some(date);
        let value = format_value(date);
        let label = format_display(date);
        let doc = cx.document_mut();
        doc.update(self.parts.value_field, |element| element.set_value(value.clone()));
        doc.update(self.parts.display, |element| element.set_text(label));
        debug!(prefix = %self.prefix, %value, "date selected");
        self.close(cx);
        self.render(cx);
    }

    fn on_month_change(&mut self, cx: &mut PageContext) {
        let doc = cx.document();
        let Some(month) = select_value::<u32>(doc, self.parts.month_select) else {
            return;
        };
        let year = select_value::<i32>(doc, self.parts.year_select).unwrap_or(self.cursor.year());
        if let Some(cursor) = CalendarCursor::new(year, month) {
            self.cursor = cursor.clamp_to(cx.today());
        }
        self.render(cx);
    }

    fn on_year_change(&mut self, cx: &mut PageContext) {
        let Some(year) = select_value::<i32>(cx.document(), self.parts.year_select) else {
            return;
        };
        self.cursor = self.cursor.with_year(year);
        self.render(cx);
    }

    fn reset(&mut self, cx: &mut PageContext) {
        self.clear_selection(cx.document_mut());
        self.close(cx);
        self.cursor = CalendarCursor::of(cx.today());
        self.render(cx);
        debug!(prefix = %self.prefix, "date picker reset");
    }

    fn clear_selection(&mut self, doc: &mut Document) {
        self.selected = None;
        let placeholder = self.config.placeholder.clone();
        doc.update(self.parts.value_field, |element| element.set_value(""));
        doc.update(self.parts.display, |element| element.set_text(placeholder));
    }

    /// Snaps state to the current date, then rebuilds selectors and grid.
    fn render(&mut self, cx: &mut PageContext) {
        let today = cx.today();
        self.cursor = self.cursor.clamp_to(today);
        if self.selected.is_some_and(|date| date < today) {
            debug!(prefix = %self.prefix, "clearing selection that fell into the past");
            self.clear_selection(cx.document_mut());
        }

        let doc = cx.document_mut();
        self.sync_selectors(doc, today);
        if let Err(err) = self.render_days(doc, today) {
            warn!(prefix = %self.prefix, %err, "failed to render calendar grid");
        }
    }

    fn render_days(&mut self, doc: &mut Document, today: NaiveDate) -> Result<(), UiError> {
        let grid = build_month_grid(self.cursor, today, self.selected);
        doc.clear_children(self.parts.days)?;
        self.day_cells.clear();

        for _ in 0..grid.leading_blanks {
            doc.append(
                self.parts.days,
                Element::new(ElementKind::Div).with_class("date-picker-day disabled"),
            )?;
        }

        for cell in grid.days {
            let mut element = Element::new(ElementKind::Button)
                .with_class(DAY_CLASS)
                .with_text(cell.date.format("%-d").to_string());
            element.toggle_class("disabled", cell.is_past);
            element.toggle_class("today", cell.is_today);
            element.toggle_class("selected", cell.is_selected);
            element.set_disabled(cell.is_past);

            let node = doc.append(self.parts.days, element)?;
            if !cell.is_past {
                self.day_cells.insert(node, cell.date);
            }
        }
        Ok(())
    }

    fn ensure_month_options(&self, doc: &mut Document) -> Result<(), UiError> {
        let select = self.parts.month_select;
        if !doc.query_kind_within(select, ElementKind::SelectOption).is_empty() {
            return Ok(());
        }
        for (index, name) in MONTH_NAMES.iter().enumerate() {
            doc.append(
                select,
                Element::new(ElementKind::SelectOption)
                    .with_value(index.to_string())
                    .with_text(*name),
            )?;
        }
        Ok(())
    }

    fn populate_years(&self, cx: &mut PageContext) {
        let span = self.config.year_span.clamp(0, MAX_YEAR_SPAN);
        let years = year_options(cx.today(), span);
        let select = self.parts.year_select;
        let doc = cx.document_mut();
        let result = doc.clear_children(select).and_then(|()| {
            for year in years {
                doc.append(
                    select,
                    Element::new(ElementKind::SelectOption)
                        .with_value(year.to_string())
                        .with_text(year.to_string()),
                )?;
            }
            Ok(())
        });
        if let Err(err) = result {
            warn!(prefix = %self.prefix, %err, "failed to populate year options");
        }
    }

    /// Mirrors the cursor into both selectors and hides months before the
    /// minimum while the minimum year is selected.
    fn sync_selectors(&self, doc: &mut Document, today: NaiveDate) {
        let year = self.cursor.year();
        for option in doc.query_kind_within(self.parts.month_select, ElementKind::SelectOption) {
            doc.update(option, |element| {
                let disabled = element
                    .value()
                    .parse::<u32>()
                    .is_ok_and(|month| is_month_disabled(year, month, today));
                element.set_disabled(disabled);
                element.set_hidden(disabled);
            });
        }
        let month = self.cursor.month().to_string();
        doc.update(self.parts.month_select, |element| element.set_value(month));
        doc.update(self.parts.year_select, |element| {
            element.set_value(year.to_string())
        });
    }
}

fn select_value<T: FromStr>(doc: &Document, select: NodeId) -> Option<T> {
    doc.element(select)?.value().trim().parse().ok()
}

/// Builds the standard picker markup under `parent` and returns the
/// container. Used by hosts that render pages without a template.
pub fn build_date_picker_markup(
    doc: &mut Document,
    parent: NodeId,
    prefix: &str,
    trigger_bounds: PxRect,
) -> Result<NodeId, UiError> {
    let container = doc.append(parent, Element::new(ElementKind::Div).with_class(CONTAINER_CLASS))?;
    let trigger = doc.append(
        container,
        Element::new(ElementKind::Button)
            .with_id(format!("{prefix}_trigger"))
            .with_class("date-picker-trigger")
            .with_bounds(trigger_bounds),
    )?;
    doc.append(
        trigger,
        Element::new(ElementKind::Span)
            .with_id(format!("{prefix}_display"))
            .with_text(DatePickerConfig::default().placeholder)
            .with_bounds(trigger_bounds),
    )?;
    doc.append(
        container,
        Element::new(ElementKind::Input(InputType::Hidden))
            .with_id(prefix)
            .with_attr("name", prefix),
    )?;

    let dropdown = doc.append(
        container,
        Element::new(ElementKind::Div)
            .with_id(format!("{prefix}_dropdown"))
            .with_class("date-picker-dropdown"),
    )?;
    let header = doc.append(
        dropdown,
        Element::new(ElementKind::Div).with_class("date-picker-header"),
    )?;
    doc.append(
        header,
        Element::new(ElementKind::Select)
            .with_id(format!("{prefix}_month"))
            .with_class("date-picker-month-select"),
    )?;
    doc.append(
        header,
        Element::new(ElementKind::Select)
            .with_id(format!("{prefix}_year"))
            .with_class("date-picker-year-select"),
    )?;
    doc.append(
        dropdown,
        Element::new(ElementKind::Div)
            .with_id(format!("{prefix}_days"))
            .with_class("date-picker-days"),
    )?;
    Ok(container)
}
