//! Survey form controls: preference tiles, budget pills, the trip length
//! stepper and the phone field.
//!
//! Each control binds to markup by id when initialized and returns `None`
//! when that markup is absent, so a page can initialize everything it might
//! contain.

use std::sync::Arc;

use packvote_ui::{
    Display, Document, ElementKind, EventFlow, EventPhase, InputType, NodeId, Page, PageContext,
    UiEvent, Widget, WidgetId,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{config::StepperConfig, text::digits_only};

/// Class toggled on tiles and pills that are switched on.
pub const ACTIVE_CLASS: &str = "active";

/// Checkbox tiles (`.pref`) whose `active` class mirrors their checkbox.
#[derive(Clone)]
pub struct PreferenceTiles {
    id: WidgetId,
    grid: NodeId,
    tiles: Arc<RwLock<Vec<(NodeId, NodeId)>>>,
}

impl PreferenceTiles {
    /// Binds every `.pref` tile inside the element `grid_id`.
    pub fn initialize(page: &mut Page, grid_id: &str) -> Option<Self> {
        let grid = page.document().get_element_by_id(grid_id)?;
        let id = page.allocate_widget_id();
        let tiles = Self {
            id,
            grid,
            tiles: Arc::default(),
        };
        tiles.refresh(page.document_mut());
        page.mount(id, Arc::new(tiles.clone()));
        Some(tiles)
    }

    /// Re-scans the grid for tiles and syncs every tile's class. Call after
    /// the host adds or replaces tiles.
    pub fn refresh(&self, doc: &mut Document) {
        let found: Vec<(NodeId, NodeId)> = doc
            .query_class_within(self.grid, "pref")
            .into_iter()
            .filter_map(|tile| {
                doc.query_kind_within(tile, ElementKind::Input(InputType::Checkbox))
                    .first()
                    .map(|&checkbox| (tile, checkbox))
            })
            .collect();
        for &(tile, checkbox) in &found {
            sync_tile(doc, tile, checkbox);
        }
        debug!(grid = ?self.grid, tiles = found.len(), "preference tiles bound");
        *self.tiles.write() = found;
    }

    /// Unchecks every tile.
    pub fn clear(&self, doc: &mut Document) {
        for &(tile, checkbox) in self.tiles.read().iter() {
            doc.update(checkbox, |element| element.set_checked(false));
            sync_tile(doc, tile, checkbox);
        }
    }

    /// Values of the checked tiles' checkboxes, in document order.
    pub fn selected_values(&self, doc: &Document) -> Vec<String> {
        self.tiles
            .read()
            .iter()
            .filter_map(|&(_, checkbox)| doc.element(checkbox))
            .filter(|element| element.is_checked())
            .map(|element| element.value().to_string())
            .collect()
    }

    /// The id the tiles are mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }
}

fn sync_tile(doc: &mut Document, tile: NodeId, checkbox: NodeId) {
    let checked = doc
        .element(checkbox)
        .is_some_and(|element| element.is_checked());
    doc.update(tile, |element| element.toggle_class(ACTIVE_CLASS, checked));
}

impl Widget for PreferenceTiles {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        if phase != EventPhase::Target {
            return EventFlow::Continue;
        }
        let target = match event {
            UiEvent::Click { target } | UiEvent::Change { target } => *target,
            _ => return EventFlow::Continue,
        };
        let doc = cx.document_mut();
        for &(tile, checkbox) in self.tiles.read().iter() {
            if doc.contains(tile, target) {
                sync_tile(doc, tile, checkbox);
            }
        }
        EventFlow::Continue
    }
}

/// Error raised when the budget card's `data-budgets` map is unusable.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// The card has no `data-budgets` attribute.
    #[error("budget card has no data-budgets attribute")]
    Missing,
    /// The attribute is not a category map.
    #[error("malformed data-budgets map")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
struct BudgetCategory {
    range: serde_json::Value,
}

/// Parses a budget card's `data-budgets` attribute
/// (`{"<category>": {"range": [lo, hi]}, ...}`) into category → serialized
/// range.
pub fn parse_budget_map(raw: &str) -> Result<HashMap<String, String>, BudgetError> {
    let categories: HashMap<String, BudgetCategory> = serde_json::from_str(raw)?;
    categories
        .into_iter()
        .map(|(name, category)| -> Result<(String, String), BudgetError> {
            Ok((name, serde_json::to_string(&category.range)?))
        })
        .collect()
}

struct BudgetPillsState {
    pills: Vec<NodeId>,
    ranges: HashMap<String, String>,
    range_field: NodeId,
}

/// Mutually exclusive budget category pills that fill a hidden range field.
#[derive(Clone)]
pub struct BudgetPills {
    id: WidgetId,
    inner: Arc<RwLock<BudgetPillsState>>,
}

impl BudgetPills {
    /// Binds the `.pill` elements inside `pills_id` to the budget map on
    /// `card_id`, writing the chosen range into `range_field_id`.
    pub fn initialize(
        page: &mut Page,
        card_id: &str,
        pills_id: &str,
        range_field_id: &str,
    ) -> Option<Self> {
        let doc = page.document();
        let card = doc.get_element_by_id(card_id)?;
        let pills_container = doc.get_element_by_id(pills_id)?;
        let range_field = doc.get_element_by_id(range_field_id)?;

        let raw = doc.element(card).and_then(|element| element.data("budgets"));
        let ranges = match raw.ok_or(BudgetError::Missing).and_then(parse_budget_map) {
            Ok(ranges) => ranges,
            Err(err) => {
                warn!(card_id, %err, "budget pills disabled");
                return None;
            }
        };
        let pills = doc.query_class_within(pills_container, "pill");

        let id = page.allocate_widget_id();
        let budget = Self {
            id,
            inner: Arc::new(RwLock::new(BudgetPillsState {
                pills,
                ranges,
                range_field,
            })),
        };
        page.mount(id, Arc::new(budget.clone()));
        Some(budget)
    }

    /// The serialized range for `category`.
    pub fn range_for(&self, category: &str) -> Option<String> {
        self.inner.read().ranges.get(category).cloned()
    }

    /// Fills the range field from `category` if it is still empty. Used at
    /// submit time when a category was chosen without clicking a pill.
    pub fn ensure_range(&self, doc: &mut Document, category: &str) {
        let state = self.inner.read();
        let empty = doc
            .element(state.range_field)
            .is_some_and(|element| element.value().is_empty());
        if let (true, Some(range)) = (empty, state.ranges.get(category)) {
            let range = range.clone();
            doc.update(state.range_field, |element| element.set_value(range));
        }
    }

    /// Deactivates every pill, unchecks their radios and clears the range
    /// field.
    pub fn clear(&self, doc: &mut Document) {
        let state = self.inner.read();
        for &pill in &state.pills {
            doc.update(pill, |element| element.remove_class(ACTIVE_CLASS));
            set_radios(doc, pill, false);
        }
        doc.update(state.range_field, |element| element.set_value(""));
    }

    /// The id the pills are mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }
}

/// A pill is a label: clicking it checks the radio inside.
fn set_radios(doc: &mut Document, pill: NodeId, checked: bool) {
    for radio in doc.query_kind_within(pill, ElementKind::Input(InputType::Radio)) {
        doc.update(radio, |element| element.set_checked(checked));
    }
}

impl Widget for BudgetPills {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        let (EventPhase::Target, UiEvent::Click { target }) = (phase, event) else {
            return EventFlow::Continue;
        };
        let state = self.inner.read();
        let doc = cx.document_mut();
        let Some(&clicked) = state.pills.iter().find(|&&pill| doc.contains(pill, *target)) else {
            return EventFlow::Continue;
        };

        for &pill in &state.pills {
            doc.update(pill, |element| {
                element.toggle_class(ACTIVE_CLASS, pill == clicked)
            });
            set_radios(doc, pill, pill == clicked);
        }
        let category = doc
            .element(clicked)
            .and_then(|element| element.data("budget"))
            .unwrap_or_default()
            .to_string();
        match state.ranges.get(&category) {
            Some(range) => {
                let range = range.clone();
                doc.update(state.range_field, |element| element.set_value(range));
            }
            None => warn!(%category, "budget pill has no range in the budget map"),
        }
        EventFlow::Continue
    }
}

#[derive(Debug, Clone, Copy)]
struct StepperParts {
    minus: NodeId,
    plus: NodeId,
    input: NodeId,
}

/// Minus/plus buttons around an integer field, clamped to the field's
/// `min`/`max` attributes.
#[derive(Clone)]
pub struct Stepper {
    id: WidgetId,
    parts: StepperParts,
    config: StepperConfig,
}

impl Stepper {
    /// Binds `{prefix}minus`, `{prefix}plus` and `{prefix}travel_duration`.
    pub fn initialize(page: &mut Page, prefix: &str, config: &StepperConfig) -> Option<Self> {
        let doc = page.document();
        let parts = StepperParts {
            minus: doc.get_element_by_id(&format!("{prefix}minus"))?,
            plus: doc.get_element_by_id(&format!("{prefix}plus"))?,
            input: doc.get_element_by_id(&format!("{prefix}travel_duration"))?,
        };
        let id = page.allocate_widget_id();
        let stepper = Self {
            id,
            parts,
            config: config.clone(),
        };
        page.mount(id, Arc::new(stepper.clone()));
        Some(stepper)
    }

    /// The field's current value, falling back to its minimum.
    pub fn value(&self, doc: &Document) -> i64 {
        let Some(element) = doc.element(self.parts.input) else {
            return self.config.default_min;
        };
        parse_nonzero(element.value())
            .or_else(|| element.attr("min").and_then(parse_nonzero))
            .unwrap_or(1)
    }

    /// The inclusive bounds from the field's attributes.
    pub fn bounds(&self, doc: &Document) -> (i64, i64) {
        let attr = |name: &str| {
            doc.element(self.parts.input)
                .and_then(|element| element.attr(name))
                .and_then(parse_nonzero)
        };
        (
            attr("min").unwrap_or(self.config.default_min),
            attr("max").unwrap_or(self.config.default_max),
        )
    }

    /// Writes `value` clamped into the field's bounds and fires `change`.
    pub fn set_value(&self, cx: &mut PageContext, value: i64) {
        let (min, max) = self.bounds(cx.document());
        let clamped = value.max(min).min(max);
        cx.document_mut()
            .update(self.parts.input, |element| element.set_value(clamped.to_string()));
        cx.post(UiEvent::Change {
            target: self.parts.input,
        });
    }

    /// The id the stepper is mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }
}

/// Zero and unparsable values count as absent.
fn parse_nonzero(raw: &str) -> Option<i64> {
    leading_int(raw).filter(|&value| value != 0)
}

/// Parses a leading base-10 integer, ignoring trailing garbage (`"7 days"`).
fn leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let end = raw
        .char_indices()
        .find(|&(index, ch)| !(ch.is_ascii_digit() || (index == 0 && (ch == '-' || ch == '+'))))
        .map_or(raw.len(), |(index, _)| index);
    raw[..end].parse().ok()
}

impl Widget for Stepper {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        let (EventPhase::Target, UiEvent::Click { target }) = (phase, event) else {
            return EventFlow::Continue;
        };
        let doc = cx.document();
        let delta = if doc.contains(self.parts.minus, *target) {
            -1
        } else if doc.contains(self.parts.plus, *target) {
            1
        } else {
            return EventFlow::Continue;
        };
        let next = self.value(doc) + delta;
        self.set_value(cx, next);
        EventFlow::Continue
    }
}

/// Warning shown for a phone number with too many digits.
pub fn phone_warning(digit_count: usize) -> Option<String> {
    (digit_count > 10).then(|| {
        format!("Phone number has {digit_count} digits. Must be exactly 10 digits.")
    })
}

/// A phone field reduced to digits as the user types or pastes.
#[derive(Clone)]
pub struct PhoneField {
    id: WidgetId,
    input: NodeId,
    warning: Option<NodeId>,
}

impl PhoneField {
    /// Binds `input_id`, with an optional warning element `warning_id`.
    pub fn initialize(page: &mut Page, input_id: &str, warning_id: Option<&str>) -> Option<Self> {
        let doc = page.document();
        let input = doc.get_element_by_id(input_id)?;
        let warning = warning_id.and_then(|id| doc.get_element_by_id(id));
        let id = page.allocate_widget_id();
        let field = Self { id, input, warning };
        page.mount(id, Arc::new(field.clone()));
        Some(field)
    }

    /// Replaces the field with the digits of `pasted` and fires `input`.
    pub fn paste(&self, cx: &mut PageContext, pasted: &str) {
        let digits = digits_only(pasted);
        cx.document_mut()
            .update(self.input, |element| element.set_value(digits));
        cx.post(UiEvent::Input { target: self.input });
    }

    /// Empties the field and hides the warning.
    pub fn clear(&self, doc: &mut Document) {
        doc.update(self.input, |element| element.set_value(""));
        if let Some(node) = self.warning {
            doc.update(node, |element| element.style_mut().display = Some(Display::None));
        }
    }

    /// Whether the field holds exactly ten digits.
    pub fn is_valid(&self, doc: &Document) -> bool {
        doc.element(self.input)
            .is_some_and(|element| digits_only(element.value()).len() == 10)
    }

    /// The id the field is mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }

    fn normalize(&self, doc: &mut Document) {
        let Some(element) = doc.element(self.input) else {
            return;
        };
        let digits = digits_only(element.value());
        let warning = phone_warning(digits.len());
        doc.update(self.input, |element| element.set_value(digits));

        let Some(node) = self.warning else {
            return;
        };
        doc.update(node, |element| match warning {
            Some(text) => {
                element.style_mut().display = Some(Display::Block);
                element.set_text(text);
            }
            None => element.style_mut().display = Some(Display::None),
        });
    }
}

impl Widget for PhoneField {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        if let (EventPhase::Target, UiEvent::Input { target }) = (phase, event)
            && *target == self.input
        {
            self.normalize(cx.document_mut());
        }
        EventFlow::Continue
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use packvote_ui::{Element, ManualClock, Px, PxSize, chrono::NaiveDate};

    use super::*;

    fn page(doc: Document) -> Page {
        let clock = ManualClock::at_midnight(NaiveDate::from_ymd_opt(2025, 6, 15).expect("date"));
        Page::new(doc, PxSize::new(Px(800), Px(600)), Arc::new(clock))
    }

    #[test]
    fn preference_tiles_follow_their_checkbox() {
        let mut doc = Document::new();
        let body = doc.body();
        let grid = doc
            .append(body, Element::new(ElementKind::Div).with_id("pref-grid"))
            .expect("grid");
        let tile = doc
            .append(grid, Element::new(ElementKind::Label).with_class("pref"))
            .expect("tile");
        let checkbox = doc
            .append(
                tile,
                Element::new(ElementKind::Input(InputType::Checkbox))
                    .with_value("beach")
                    .with_checked(true),
            )
            .expect("checkbox");

        let mut page = page(doc);
        let tiles = PreferenceTiles::initialize(&mut page, "pref-grid").expect("tiles");
        let is_active = |page: &Page| {
            page.document()
                .element(tile)
                .is_some_and(|element| element.has_class(ACTIVE_CLASS))
        };
        assert!(is_active(&page));
        assert_eq!(tiles.selected_values(page.document()), vec!["beach".to_string()]);

        page.set_checked(checkbox, false);
        assert!(!is_active(&page));

        page.set_checked(checkbox, true);
        tiles.clear(page.document_mut());
        assert!(!is_active(&page));
    }

    #[test]
    fn budget_map_serializes_ranges() {
        let ranges = parse_budget_map(
            r#"{"budget": {"range": [0, 500]}, "luxury": {"range": [2000, null]}}"#,
        )
        .expect("map");
        assert_eq!(ranges.get("budget").map(String::as_str), Some("[0,500]"));
        assert_eq!(ranges.get("luxury").map(String::as_str), Some("[2000,null]"));
        assert!(parse_budget_map("[1, 2]").is_err());
    }

    fn pill(doc: &mut Document, pills: NodeId, category: &str) -> (NodeId, NodeId) {
        let pill = doc
            .append(
                pills,
                Element::new(ElementKind::Label)
                    .with_class("pill")
                    .with_data("budget", category),
            )
            .expect("pill");
        let radio = doc
            .append(
                pill,
                Element::new(ElementKind::Input(InputType::Radio))
                    .with_attr("name", "budget_category")
                    .with_value(category),
            )
            .expect("radio");
        (pill, radio)
    }

    #[test]
    fn budget_pills_are_exclusive() {
        let mut doc = Document::new();
        let body = doc.body();
        let budgets = r#"{"budget": {"range": [0, 500]}, "mid": {"range": [500, 1500]}}"#;
        doc.append(
            body,
            Element::new(ElementKind::Div)
                .with_id("budget-card")
                .with_data("budgets", budgets),
        )
        .expect("card");
        let pills = doc
            .append(body, Element::new(ElementKind::Div).with_id("budget-cards"))
            .expect("pills");
        let (cheap, cheap_radio) = pill(&mut doc, pills, "budget");
        let (mid, mid_radio) = pill(&mut doc, pills, "mid");
        let field = doc
            .append(
                body,
                Element::new(ElementKind::Input(InputType::Hidden)).with_id("budget_range"),
            )
            .expect("field");

        let mut page = page(doc);
        let budget =
            BudgetPills::initialize(&mut page, "budget-card", "budget-cards", "budget_range")
                .expect("pills");
        page.click(cheap);
        page.click(mid);

        let doc = page.document();
        assert!(!doc.element(cheap).is_some_and(|e| e.has_class(ACTIVE_CLASS)));
        assert!(doc.element(mid).is_some_and(|e| e.has_class(ACTIVE_CLASS)));
        assert!(!doc.element(cheap_radio).is_some_and(Element::is_checked));
        assert!(doc.element(mid_radio).is_some_and(Element::is_checked));
        assert_eq!(doc.element(field).map(Element::value), Some("[500,1500]"));

        budget.clear(page.document_mut());
        let doc = page.document();
        assert!(!doc.element(mid).is_some_and(|e| e.has_class(ACTIVE_CLASS)));
        assert!(!doc.element(mid_radio).is_some_and(Element::is_checked));
        assert_eq!(doc.element(field).map(Element::value), Some(""));

        budget.ensure_range(page.document_mut(), "budget");
        budget.ensure_range(page.document_mut(), "mid");
        assert_eq!(page.document().element(field).map(Element::value), Some("[0,500]"));
    }

    #[test]
    fn stepper_clamps_to_attributes() {
        let mut doc = Document::new();
        let body = doc.body();
        let minus = doc
            .append(body, Element::new(ElementKind::Button).with_id("minus"))
            .expect("minus");
        let plus = doc
            .append(body, Element::new(ElementKind::Button).with_id("plus"))
            .expect("plus");
        doc.append(
            body,
            Element::new(ElementKind::Input(InputType::Number))
                .with_id("travel_duration")
                .with_value("2")
                .with_attr("min", "2")
                .with_attr("max", "3"),
        )
        .expect("input");

        let mut page = page(doc);
        let stepper =
            Stepper::initialize(&mut page, "", &StepperConfig::default()).expect("stepper");
        page.click(minus);
        assert_eq!(stepper.value(page.document()), 2);
        page.click(plus);
        page.click(plus);
        assert_eq!(stepper.value(page.document()), 3);
        assert_eq!(stepper.bounds(page.document()), (2, 3));
    }

    #[test]
    fn integer_parsing_matches_form_semantics() {
        assert_eq!(leading_int("7 days"), Some(7));
        assert_eq!(leading_int("-3"), Some(-3));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(parse_nonzero("0"), None);
    }

    #[test]
    fn phone_field_strips_and_warns() {
        let mut doc = Document::new();
        let body = doc.body();
        let input = doc
            .append(
                body,
                Element::new(ElementKind::Input(InputType::Tel)).with_id("phone"),
            )
            .expect("input");
        let warning = doc
            .append(body, Element::new(ElementKind::Div).with_id("phone-warning"))
            .expect("warning");

        let mut page = page(doc);
        let field =
            PhoneField::initialize(&mut page, "phone", Some("phone-warning")).expect("field");

        page.type_text(input, "(555) 123-45678");
        let doc = page.document();
        assert_eq!(doc.element(input).map(Element::value), Some("55512345678"));
        let shown = doc.element(warning).expect("warning");
        assert_eq!(shown.style().display, Some(Display::Block));
        assert_eq!(
            shown.text(),
            "Phone number has 11 digits. Must be exactly 10 digits."
        );
        assert!(!field.is_valid(doc));

        field.paste(page.context_mut(), "555-123-4567");
        page.tick();
        let doc = page.document();
        assert!(field.is_valid(doc));
        assert_eq!(
            doc.element(warning).and_then(|e| e.style().display),
            Some(Display::None)
        );

        page.type_text(input, "5551234567890");
        field.clear(page.document_mut());
        let doc = page.document();
        assert_eq!(doc.element(input).map(Element::value), Some(""));
        assert_eq!(
            doc.element(warning).and_then(|e| e.style().display),
            Some(Display::None)
        );
    }
}
