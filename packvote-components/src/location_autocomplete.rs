//! Debounced place-name suggestions under a text field.
//!
//! Lookups go through a [`SuggestionSource`]; the widget never talks to the
//! network itself. Debouncing runs on the page clock: each keystroke pushes
//! the deadline back and [`UiEvent::Tick`] fires the lookup once it passes.

use std::sync::Arc;

use chrono::NaiveDateTime;
use packvote_ui::{
    Display, Document, Element, ElementKind, EventFlow, EventPhase, Key, NodeId, Page,
    PageContext, Position, UiError, UiEvent, Widget, WidgetId,
};
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::config::AutocompleteConfig;

/// Class of the generated dropdown.
pub const DROPDOWN_CLASS: &str = "location-autocomplete-dropdown";
/// Class of each suggestion row.
pub const ITEM_CLASS: &str = "location-autocomplete-item";
/// Class of the highlighted row.
pub const SELECTED_CLASS: &str = "selected";

/// One place suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Suggestion {
    /// Text written into the field when chosen.
    pub display_name: String,
}

impl Suggestion {
    /// Creates a suggestion.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

/// Errors from a suggestion lookup.
#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    /// The backend reported an error.
    #[error("suggestion backend error: {0}")]
    Backend(String),
    /// The response body was not JSON.
    #[error("malformed suggestion payload")]
    Payload(#[from] serde_json::Error),
}

/// Where suggestions come from.
pub trait SuggestionSource: Send + Sync {
    /// Looks up places matching `query`.
    fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, SuggestionError>;
}

impl<F> SuggestionSource for F
where
    F: Fn(&str) -> Result<Vec<Suggestion>, SuggestionError> + Send + Sync,
{
    fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, SuggestionError> {
        self(query)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionPayload {
    Error { error: String },
    List(Vec<Suggestion>),
    Other(serde_json::Value),
}

/// Decodes an autocomplete endpoint response body.
///
/// A JSON array is the suggestion list, `{"error": "..."}` is a backend
/// error, and any other JSON value means no suggestions.
pub fn parse_suggestions(body: &str) -> Result<Vec<Suggestion>, SuggestionError> {
    match serde_json::from_str(body)? {
        SuggestionPayload::Error { error } => Err(SuggestionError::Backend(error)),
        SuggestionPayload::List(list) => Ok(list),
        SuggestionPayload::Other(_) => Ok(Vec::new()),
    }
}

struct AutocompleteState {
    input: NodeId,
    scope: NodeId,
    dropdown: NodeId,
    suggestions: Vec<Suggestion>,
    items: Vec<NodeId>,
    highlighted: Option<usize>,
    pending: Option<(NaiveDateTime, String)>,
    suppress_input: bool,
}

/// Autocomplete bound to one text field.
#[derive(Clone)]
pub struct LocationAutocomplete {
    id: WidgetId,
    source: Arc<dyn SuggestionSource>,
    config: AutocompleteConfig,
    inner: Arc<RwLock<AutocompleteState>>,
}

impl LocationAutocomplete {
    /// Binds to `input_id`, adding the dropdown next to the field.
    pub fn initialize(
        page: &mut Page,
        input_id: &str,
        source: Arc<dyn SuggestionSource>,
        config: &AutocompleteConfig,
    ) -> Option<Self> {
        let doc = page.document_mut();
        let input = doc.get_element_by_id(input_id)?;
        let scope = doc.parent(input)?;
        let dropdown = match create_dropdown(doc, scope) {
            Ok(dropdown) => dropdown,
            Err(err) => {
                warn!(input_id, %err, "failed to create autocomplete dropdown");
                return None;
            }
        };

        let id = page.allocate_widget_id();
        let autocomplete = Self {
            id,
            source,
            config: config.clone(),
            inner: Arc::new(RwLock::new(AutocompleteState {
                input,
                scope,
                dropdown,
                suggestions: Vec::new(),
                items: Vec::new(),
                highlighted: None,
                pending: None,
                suppress_input: false,
            })),
        };
        page.mount(id, Arc::new(autocomplete.clone()));
        Some(autocomplete)
    }

    /// Whether the dropdown is shown.
    pub fn is_visible(&self, doc: &Document) -> bool {
        let dropdown = self.inner.read().dropdown;
        doc.element(dropdown).is_some_and(Element::is_displayed)
    }

    /// The rendered suggestion rows, in order.
    pub fn items(&self) -> Vec<NodeId> {
        self.inner.read().items.clone()
    }

    /// The highlighted row index.
    pub fn highlighted(&self) -> Option<usize> {
        self.inner.read().highlighted
    }

    /// The id the autocomplete is mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }

    fn run_lookup(&self, state: &mut AutocompleteState, doc: &mut Document, query: &str) {
        if query.chars().count() < self.config.min_query_len {
            state.suggestions.clear();
            state.hide(doc);
            return;
        }
        match self.source.suggest(query) {
            Ok(suggestions) => {
                debug!(query, count = suggestions.len(), "location suggestions received");
                state.suggestions = suggestions;
                if let Err(err) = state.render(doc) {
                    warn!(%err, "failed to render location suggestions");
                }
            }
            Err(err) => {
                warn!(query, %err, "location lookup failed");
                state.suggestions.clear();
                state.hide(doc);
            }
        }
    }
}

fn create_dropdown(doc: &mut Document, scope: NodeId) -> Result<NodeId, UiError> {
    doc.update(scope, |element| {
        element.style_mut().position = Some(Position::Relative)
    });
    let mut dropdown = Element::new(ElementKind::Div).with_class(DROPDOWN_CLASS);
    dropdown.style_mut().display = Some(Display::None);
    doc.append(scope, dropdown)
}

impl AutocompleteState {
    fn hide(&mut self, doc: &mut Document) {
        self.highlighted = None;
        doc.update(self.dropdown, |element| {
            element.style_mut().display = Some(Display::None)
        });
    }

    fn render(&mut self, doc: &mut Document) -> Result<(), UiError> {
        if self.suggestions.is_empty() {
            self.hide(doc);
            return Ok(());
        }
        doc.clear_children(self.dropdown)?;
        self.items.clear();
        for suggestion in &self.suggestions {
            let item = doc.append(
                self.dropdown,
                Element::new(ElementKind::Div)
                    .with_class(ITEM_CLASS)
                    .with_text(suggestion.display_name.clone()),
            )?;
            self.items.push(item);
        }
        doc.update(self.dropdown, |element| {
            element.style_mut().display = Some(Display::Block)
        });
        Ok(())
    }

    fn highlight(&mut self, doc: &mut Document, index: Option<usize>) {
        self.highlighted = index;
        for (position, &item) in self.items.iter().enumerate() {
            doc.update(item, |element| {
                element.toggle_class(SELECTED_CLASS, Some(position) == index)
            });
        }
    }

    fn apply(&mut self, cx: &mut PageContext, index: usize) {
        let Some(name) = self.suggestions.get(index).map(|s| s.display_name.clone()) else {
            return;
        };
        let doc = cx.document_mut();
        doc.update(self.input, |element| element.set_value(name));
        self.hide(doc);
        self.pending = None;
        // Re-announce the value for form validation without searching again.
        self.suppress_input = true;
        cx.post(UiEvent::Input { target: self.input });
    }
}

impl Widget for LocationAutocomplete {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        let mut guard = self.inner.write();
        let state = &mut *guard;
        match (phase, event) {
            (EventPhase::Target, UiEvent::Input { target }) if *target == state.input => {
                if std::mem::take(&mut state.suppress_input) {
                    return EventFlow::Continue;
                }
                let query = cx
                    .document()
                    .element(state.input)
                    .map(|element| element.value().trim().to_string())
                    .unwrap_or_default();
                state.highlighted = None;
                let now = cx.now();
                let deadline = now
                    .checked_add_signed(self.config.debounce())
                    .unwrap_or_else(|| {
                        warn!(
                            debounce_ms = self.config.debounce_ms,
                            "debounce deadline out of range, looking up on next tick"
                        );
                        now
                    });
                trace!(%query, %deadline, "location lookup scheduled");
                state.pending = Some((deadline, query));
            }
            (EventPhase::Window, UiEvent::Tick) => {
                let due = state
                    .pending
                    .as_ref()
                    .is_some_and(|(deadline, _)| *deadline <= cx.now());
                if due && let Some((_, query)) = state.pending.take() {
                    self.run_lookup(state, cx.document_mut(), &query);
                }
            }
            (EventPhase::Target, UiEvent::KeyDown { target, key })
                if *target == Some(state.input) =>
            {
                let visible = cx
                    .document()
                    .element(state.dropdown)
                    .is_some_and(Element::is_displayed);
                if !visible {
                    return EventFlow::Continue;
                }
                let last = state.items.len().saturating_sub(1);
                match key {
                    Key::ArrowDown => {
                        let next = state.highlighted.map_or(0, |index| (index + 1).min(last));
                        state.highlight(cx.document_mut(), Some(next));
                    }
                    Key::ArrowUp => {
                        let next = state.highlighted.and_then(|index| index.checked_sub(1));
                        state.highlight(cx.document_mut(), next);
                    }
                    Key::Enter => {
                        if let Some(index) = state.highlighted {
                            state.apply(cx, index);
                        }
                    }
                    Key::Escape => state.hide(cx.document_mut()),
                    Key::Character(_) => {}
                }
            }
            (EventPhase::Target, UiEvent::Click { target }) => {
                if let Some(index) = state.items.iter().position(|item| item == target) {
                    state.apply(cx, index);
                }
            }
            (EventPhase::Document, UiEvent::Click { target }) => {
                if !cx.document().contains(state.scope, *target) {
                    state.hide(cx.document_mut());
                }
            }
            _ => {}
        }
        EventFlow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_endpoint_payloads() {
        let list = parse_suggestions(r#"[{"display_name": "Lisbon, Portugal", "lat": "38.7"}]"#)
            .expect("list");
        assert_eq!(list, vec![Suggestion::new("Lisbon, Portugal")]);

        let err = parse_suggestions(r#"{"error": "rate limited"}"#).expect_err("backend error");
        assert!(matches!(err, SuggestionError::Backend(message) if message == "rate limited"));

        assert!(parse_suggestions(r#"{"status": "ok"}"#).expect("other").is_empty());
        assert!(matches!(
            parse_suggestions("<html>"),
            Err(SuggestionError::Payload(_))
        ));
    }
}
