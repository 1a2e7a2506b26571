use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use packvote_components::{
    ComponentsConfig, DatePicker, LocationAutocomplete, ParticipantModal, ProjectDraft,
    ProjectDraftError, ProjectModal, Suggestion, SuggestionError, SuggestionSource, SurveyDraft,
    SurveyDraftError, SurveyForm, SurveyLayout, config::AutocompleteConfig,
    date_picker::build_date_picker_markup, location_autocomplete::SELECTED_CLASS,
};
use packvote_ui::{
    Display, Document, Element, ElementKind, ElementStyle, InputType, Key, ManualClock, NodeId,
    Page, Px, PxRect, PxSize,
};
use parking_lot::Mutex;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

fn value_of(page: &Page, node: NodeId) -> String {
    page.document()
        .element(node)
        .map(|element| element.value().to_string())
        .unwrap_or_default()
}

#[derive(Default)]
struct RecordingSource {
    queries: Mutex<Vec<String>>,
}

impl SuggestionSource for RecordingSource {
    fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, SuggestionError> {
        self.queries.lock().push(query.to_string());
        if query == "boom" {
            return Err(SuggestionError::Backend("upstream timeout".to_string()));
        }
        Ok(["Lisbon, PT", "Lima, PE"]
            .into_iter()
            .filter(|name| name.to_lowercase().starts_with(&query.to_lowercase()))
            .map(Suggestion::new)
            .collect())
    }
}

struct AutocompleteFixture {
    page: Page,
    clock: ManualClock,
    input: NodeId,
    outside: NodeId,
    source: Arc<RecordingSource>,
    autocomplete: LocationAutocomplete,
}

fn autocomplete_fixture() -> AutocompleteFixture {
    autocomplete_fixture_with(&ComponentsConfig::default().autocomplete)
}

fn autocomplete_fixture_with(config: &AutocompleteConfig) -> AutocompleteFixture {
    let mut doc = Document::new();
    let body = doc.body();
    let group = doc
        .append(body, Element::new(ElementKind::Div).with_class("form-group"))
        .expect("group");
    let input = doc
        .append(
            group,
            Element::new(ElementKind::Input(InputType::Text)).with_id("location"),
        )
        .expect("input");
    let outside = doc
        .append(body, Element::new(ElementKind::Div))
        .expect("outside");

    let clock = ManualClock::at_midnight(today());
    let mut page = Page::new(doc, PxSize::new(Px(800), Px(600)), Arc::new(clock.clone()));
    let source = Arc::new(RecordingSource::default());
    let autocomplete =
        LocationAutocomplete::initialize(&mut page, "location", source.clone(), config)
            .expect("autocomplete");

    AutocompleteFixture {
        page,
        clock,
        input,
        outside,
        source,
        autocomplete,
    }
}

impl AutocompleteFixture {
    fn type_and_settle(&mut self, text: &str) {
        self.page.type_text(self.input, text);
        self.clock.advance(TimeDelta::milliseconds(300));
        self.page.tick();
    }

    fn visible(&self) -> bool {
        self.autocomplete.is_visible(self.page.document())
    }
}

#[test]
fn lookups_wait_for_the_debounce() {
    let mut f = autocomplete_fixture();
    f.page.type_text(f.input, "l");
    f.page.type_text(f.input, "li");
    f.clock.advance(TimeDelta::milliseconds(299));
    f.page.tick();
    assert!(f.source.queries.lock().is_empty());

    f.clock.advance(TimeDelta::milliseconds(1));
    f.page.tick();
    assert_eq!(f.source.queries.lock().as_slice(), &["li".to_string()]);
    assert!(f.visible());
    assert_eq!(f.autocomplete.items().len(), 2);

    // Nothing pending: further ticks do not search again.
    f.page.tick();
    assert_eq!(f.source.queries.lock().len(), 1);
}

#[test]
fn unrepresentable_debounce_looks_up_on_next_tick() {
    let mut f = autocomplete_fixture_with(&AutocompleteConfig {
        debounce_ms: u64::MAX,
        ..AutocompleteConfig::default()
    });
    f.page.type_text(f.input, "li");
    assert!(f.source.queries.lock().is_empty());

    f.page.tick();
    assert_eq!(f.source.queries.lock().as_slice(), &["li".to_string()]);
    assert!(f.visible());
}

#[test]
fn short_queries_and_failures_hide_the_list() {
    let mut f = autocomplete_fixture();
    f.type_and_settle("li");
    assert!(f.visible());

    f.type_and_settle("l");
    assert!(!f.visible());
    assert_eq!(f.source.queries.lock().len(), 1);

    f.type_and_settle("boom");
    assert!(!f.visible());
}

#[test]
fn keyboard_navigation_applies_a_suggestion() {
    let mut f = autocomplete_fixture();
    f.type_and_settle("li");
    let items = f.autocomplete.items();

    f.page.key_down(Some(f.input), Key::ArrowDown);
    f.page.key_down(Some(f.input), Key::ArrowDown);
    f.page.key_down(Some(f.input), Key::ArrowDown);
    assert_eq!(f.autocomplete.highlighted(), Some(1));
    assert!(
        f.page
            .document()
            .element(items[1])
            .is_some_and(|e| e.has_class(SELECTED_CLASS))
    );

    f.page.key_down(Some(f.input), Key::ArrowUp);
    f.page.key_down(Some(f.input), Key::ArrowUp);
    assert_eq!(f.autocomplete.highlighted(), None);

    f.page.key_down(Some(f.input), Key::ArrowDown);
    f.page.key_down(Some(f.input), Key::Enter);
    assert_eq!(value_of(&f.page, f.input), "Lisbon, PT");
    assert!(!f.visible());

    // Choosing does not trigger another lookup.
    f.clock.advance(TimeDelta::seconds(1));
    f.page.tick();
    assert_eq!(f.source.queries.lock().len(), 1);
}

#[test]
fn clicks_choose_or_dismiss() {
    let mut f = autocomplete_fixture();
    f.type_and_settle("li");
    let second = f.autocomplete.items()[1];
    f.page.click(second);
    assert_eq!(value_of(&f.page, f.input), "Lima, PE");
    assert!(!f.visible());

    f.type_and_settle("lis");
    assert!(f.visible());
    f.page.click(f.outside);
    assert!(!f.visible());

    f.page.key_down(Some(f.input), Key::ArrowDown);
    assert_eq!(f.autocomplete.highlighted(), None);
}

struct ModalFixture {
    page: Page,
    modal: ProjectModal,
    picker: DatePicker,
    name: NodeId,
    duration: NodeId,
    overlay: NodeId,
    content: NodeId,
    opener: NodeId,
    created: Arc<Mutex<Vec<ProjectDraft>>>,
}

fn modal_fixture() -> ModalFixture {
    let mut doc = Document::new();
    let body = doc.body();
    let opener = doc
        .append(
            body,
            Element::new(ElementKind::Button).with_id("create-first-project-btn"),
        )
        .expect("opener");
    let root = doc
        .append(
            body,
            Element::new(ElementKind::Div)
                .with_id("project-modal")
                .with_style(ElementStyle {
                    display: Some(Display::None),
                    ..ElementStyle::default()
                }),
        )
        .expect("modal");
    let overlay = doc
        .append(root, Element::new(ElementKind::Div).with_class("modal-overlay"))
        .expect("overlay");
    let content = doc
        .append(overlay, Element::new(ElementKind::Div).with_class("modal-content"))
        .expect("content");
    let name = doc
        .append(
            content,
            Element::new(ElementKind::Input(InputType::Text)).with_id("modal-project-name"),
        )
        .expect("name");
    build_date_picker_markup(
        &mut doc,
        content,
        "modal-travel_date",
        PxRect::new(Px(200), Px(200), Px(300), Px(40)),
    )
    .expect("picker markup");
    let duration = doc
        .append(
            content,
            Element::new(ElementKind::Input(InputType::Number)).with_id("modal-travel_duration"),
        )
        .expect("duration");
    doc.append(content, Element::new(ElementKind::Button).with_id("modal-create-btn"))
        .expect("create");
    doc.append(content, Element::new(ElementKind::Button).with_id("modal-cancel-btn"))
        .expect("cancel");

    let mut page = Page::new(
        doc,
        PxSize::new(Px(1280), Px(800)),
        Arc::new(ManualClock::at_midnight(today())),
    );
    let config = ComponentsConfig::default();
    let picker = DatePicker::initialize(&mut page, "modal-travel_date", &config).expect("picker");
    let created = Arc::new(Mutex::new(Vec::new()));
    let sink = created.clone();
    let modal = ProjectModal::initialize(
        &mut page,
        &config.modal,
        Some(picker.clone()),
        move |_, draft| sink.lock().push(draft),
    )
    .expect("modal");

    ModalFixture {
        page,
        modal,
        picker,
        name,
        duration,
        overlay,
        content,
        opener,
        created,
    }
}

#[test]
fn opening_the_modal_starts_fresh() {
    let mut f = modal_fixture();
    f.page.click(f.opener);
    assert!(f.modal.is_visible(f.page.document()));
    assert_eq!(value_of(&f.page, f.duration), "3");

    f.page.type_text(f.name, "Lisbon");
    f.page.click(f.picker.trigger());
    let cell = f.picker.day_cell(today()).expect("today");
    f.page.click(cell);
    assert_eq!(f.picker.selected_date(), Some(today()));

    f.page.key_down(None, Key::Escape);
    assert!(!f.modal.is_visible(f.page.document()));

    f.page.click(f.opener);
    assert_eq!(value_of(&f.page, f.name), "");
    assert_eq!(f.picker.selected_date(), None);
    assert_eq!(f.picker.value(f.page.document()), "");
}

#[test]
fn only_the_overlay_itself_dismisses() {
    let mut f = modal_fixture();
    f.page.click(f.opener);
    f.page.click(f.content);
    assert!(f.modal.is_visible(f.page.document()));
    f.page.click(f.overlay);
    assert!(!f.modal.is_visible(f.page.document()));
}

#[test]
fn enter_submits_a_valid_project() {
    let mut f = modal_fixture();
    f.page.click(f.opener);

    f.page.key_down(Some(f.name), Key::Enter);
    assert_eq!(f.modal.last_error(), Some(ProjectDraftError::MissingName));
    assert!(f.created.lock().is_empty());

    f.page.type_text(f.name, "  Lisbon 2025 ");
    f.page.key_down(Some(f.name), Key::Enter);
    assert_eq!(f.modal.last_error(), Some(ProjectDraftError::MissingTravelDate));

    f.page.click(f.picker.trigger());
    let day = today() + TimeDelta::days(3);
    let cell = f.picker.day_cell(day).expect("selectable day");
    f.page.click(cell);
    f.page.key_down(Some(f.name), Key::Enter);

    assert_eq!(f.modal.last_error(), None);
    assert_eq!(
        f.created.lock().as_slice(),
        &[ProjectDraft {
            name: "Lisbon 2025".to_string(),
            travel_date: day,
            travel_duration: 3,
        }]
    );
    assert!(!f.modal.is_visible(f.page.document()));
}

const BUDGETS: &str = r#"{"budget": {"range": [0, 500]}, "mid": {"range": [500, 1500]}}"#;

struct SurveyNodes {
    form: NodeId,
    project: NodeId,
    phone: NodeId,
    warning: NodeId,
    range: NodeId,
    /// (pill, radio) for "budget" then "mid".
    pills: [(NodeId, NodeId); 2],
    tile: NodeId,
    checkbox: NodeId,
}

fn survey_markup(doc: &mut Document, parent: NodeId, layout: SurveyLayout) -> SurveyNodes {
    let id = |name: &str| format!("{}{name}", layout.prefix);
    let form = doc
        .append(parent, Element::new(ElementKind::Form).with_id(layout.form))
        .expect("form");
    let project = doc
        .append(
            form,
            Element::new(ElementKind::Input(InputType::Hidden)).with_id(layout.project_field),
        )
        .expect("project");
    let phone = doc
        .append(
            form,
            Element::new(ElementKind::Input(InputType::Tel)).with_id(id("phone")),
        )
        .expect("phone");
    let warning = doc
        .append(
            form,
            Element::new(ElementKind::Div)
                .with_id(id("phone-warning"))
                .with_style(ElementStyle {
                    display: Some(Display::None),
                    ..ElementStyle::default()
                }),
        )
        .expect("warning");
    doc.append(
        form,
        Element::new(ElementKind::Div)
            .with_id(id("budget-card"))
            .with_data("budgets", BUDGETS),
    )
    .expect("card");
    let cards = doc
        .append(form, Element::new(ElementKind::Div).with_id(id("budget-cards")))
        .expect("cards");
    let pills = ["budget", "mid"].map(|category| {
        let pill = doc
            .append(
                cards,
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
    });
    let range = doc
        .append(
            form,
            Element::new(ElementKind::Input(InputType::Hidden)).with_id(id("budget_range")),
        )
        .expect("range");
    let grid = doc
        .append(form, Element::new(ElementKind::Div).with_id(id("pref-grid")))
        .expect("grid");
    let tile = doc
        .append(grid, Element::new(ElementKind::Label).with_class("pref"))
        .expect("tile");
    let checkbox = doc
        .append(
            tile,
            Element::new(ElementKind::Input(InputType::Checkbox)).with_value("beach"),
        )
        .expect("checkbox");
    SurveyNodes {
        form,
        project,
        phone,
        warning,
        range,
        pills,
        tile,
        checkbox,
    }
}

fn has_class(page: &Page, node: NodeId, class: &str) -> bool {
    page.document()
        .element(node)
        .is_some_and(|element| element.has_class(class))
}

fn is_checked(page: &Page, node: NodeId) -> bool {
    page.document()
        .element(node)
        .is_some_and(Element::is_checked)
}

#[test]
fn survey_form_checks_project_phone_then_category() {
    let mut doc = Document::new();
    let body = doc.body();
    let nodes = survey_markup(&mut doc, body, SurveyLayout::SURVEY);
    let mut page = Page::new(
        doc,
        PxSize::new(Px(1280), Px(800)),
        Arc::new(ManualClock::at_midnight(today())),
    );
    let submitted = Arc::new(Mutex::new(Vec::new()));
    let sink = submitted.clone();
    let form = SurveyForm::initialize(
        &mut page,
        SurveyLayout::SURVEY,
        &ComponentsConfig::default(),
        move |_, draft| sink.lock().push(draft),
    )
    .expect("survey form");

    page.submit(nodes.form);
    assert_eq!(form.last_error(), Some(SurveyDraftError::MissingProject));

    page.document_mut()
        .update(nodes.project, |element| element.set_value("Lisbon"));
    page.type_text(nodes.phone, "555-123-456");
    page.submit(nodes.form);
    assert_eq!(form.last_error(), Some(SurveyDraftError::InvalidPhone));

    page.type_text(nodes.phone, "(555) 123-4567");
    page.submit(nodes.form);
    assert_eq!(
        form.last_error(),
        Some(SurveyDraftError::MissingBudgetCategory)
    );
    assert!(submitted.lock().is_empty());

    // A radio checked without its pill being clicked leaves the range empty
    // until submit fills it.
    let (_, mid_radio) = nodes.pills[1];
    page.set_checked(mid_radio, true);
    page.set_checked(nodes.checkbox, true);
    assert_eq!(value_of(&page, nodes.range), "");
    page.submit(nodes.form);

    assert_eq!(form.last_error(), None);
    assert_eq!(value_of(&page, nodes.range), "[500,1500]");
    assert_eq!(
        submitted.lock().as_slice(),
        &[SurveyDraft {
            project: "Lisbon".to_string(),
            phone: Some("5551234567".to_string()),
            budget_category: "mid".to_string(),
            budget_range: Some("[500,1500]".to_string()),
            preferences: vec!["beach".to_string()],
        }]
    );
}

struct ParticipantFixture {
    page: Page,
    modal: ParticipantModal,
    nodes: SurveyNodes,
    project_item: NodeId,
    opener: NodeId,
    cancel: NodeId,
    overlay: NodeId,
    content: NodeId,
    submitted: Arc<Mutex<Vec<SurveyDraft>>>,
}

fn participant_fixture() -> ParticipantFixture {
    let mut doc = Document::new();
    let body = doc.body();
    let project_item = doc
        .append(
            body,
            Element::new(ElementKind::Div)
                .with_class("project-item")
                .with_data("project", "Lisbon 2025"),
        )
        .expect("project item");
    let opener = doc
        .append(
            body,
            Element::new(ElementKind::Button).with_id("add-participant-btn"),
        )
        .expect("opener");
    let root = doc
        .append(
            body,
            Element::new(ElementKind::Div)
                .with_id("participant-form-modal")
                .with_style(ElementStyle {
                    display: Some(Display::None),
                    ..ElementStyle::default()
                }),
        )
        .expect("modal");
    let overlay = doc
        .append(root, Element::new(ElementKind::Div).with_class("modal-overlay"))
        .expect("overlay");
    let content = doc
        .append(overlay, Element::new(ElementKind::Div).with_class("modal-content"))
        .expect("content");
    let nodes = survey_markup(&mut doc, content, SurveyLayout::PARTICIPANT);
    let cancel = doc
        .append(content, Element::new(ElementKind::Button).with_id("form-cancel-btn"))
        .expect("cancel");

    let mut page = Page::new(
        doc,
        PxSize::new(Px(1280), Px(800)),
        Arc::new(ManualClock::at_midnight(today())),
    );
    let submitted = Arc::new(Mutex::new(Vec::new()));
    let sink = submitted.clone();
    let modal = ParticipantModal::initialize(
        &mut page,
        &ComponentsConfig::default(),
        move |_, draft| sink.lock().push(draft),
    )
    .expect("participant modal");

    ParticipantFixture {
        page,
        modal,
        nodes,
        project_item,
        opener,
        cancel,
        overlay,
        content,
        submitted,
    }
}

impl ParticipantFixture {
    fn activate_project(&mut self) {
        self.page
            .document_mut()
            .update(self.project_item, |element| element.add_class("active"));
    }

    fn visible(&self) -> bool {
        self.modal.is_visible(self.page.document())
    }
}

#[test]
fn participant_modal_needs_an_active_project() {
    let mut f = participant_fixture();
    f.page.click(f.opener);
    assert!(!f.visible());
    assert_eq!(f.modal.last_error(), Some(SurveyDraftError::MissingProject));

    f.activate_project();
    f.page.click(f.opener);
    assert!(f.visible());
    assert_eq!(f.modal.last_error(), None);
    assert_eq!(value_of(&f.page, f.nodes.project), "Lisbon 2025");
}

#[test]
fn reopening_the_participant_modal_resets_the_form() {
    let mut f = participant_fixture();
    f.activate_project();
    f.page.click(f.opener);

    let (cheap, cheap_radio) = f.nodes.pills[0];
    f.page.click(cheap);
    f.page.set_checked(f.nodes.checkbox, true);
    f.page.type_text(f.nodes.phone, "555123456789");
    assert!(is_checked(&f.page, cheap_radio));
    assert_eq!(value_of(&f.page, f.nodes.range), "[0,500]");
    assert_eq!(
        f.page
            .document()
            .element(f.nodes.warning)
            .and_then(|e| e.style().display),
        Some(Display::Block)
    );

    f.page.click(f.cancel);
    assert!(!f.visible());
    f.page.click(f.opener);

    assert!(!has_class(&f.page, cheap, "active"));
    assert!(!is_checked(&f.page, cheap_radio));
    assert_eq!(value_of(&f.page, f.nodes.range), "");
    assert!(!is_checked(&f.page, f.nodes.checkbox));
    assert!(!has_class(&f.page, f.nodes.tile, "active"));
    assert_eq!(value_of(&f.page, f.nodes.phone), "");
    assert_eq!(
        f.page
            .document()
            .element(f.nodes.warning)
            .and_then(|e| e.style().display),
        Some(Display::None)
    );
}

#[test]
fn participant_modal_dismissal() {
    let mut f = participant_fixture();
    f.activate_project();
    f.page.click(f.opener);
    f.page.click(f.content);
    assert!(f.visible());
    f.page.click(f.overlay);
    assert!(!f.visible());

    f.page.click(f.opener);
    f.page.key_down(None, Key::Escape);
    assert!(!f.visible());
}

#[test]
fn valid_participant_is_handed_on_and_closes_the_modal() {
    let mut f = participant_fixture();
    f.activate_project();
    f.page.click(f.opener);

    f.page.type_text(f.nodes.phone, "555 123 4567");
    f.page.submit(f.nodes.form);
    assert_eq!(
        f.modal.last_error(),
        Some(SurveyDraftError::MissingBudgetCategory)
    );
    assert!(f.visible());

    let (mid, _) = f.nodes.pills[1];
    f.page.click(mid);
    f.page.submit(f.nodes.form);

    assert_eq!(f.modal.last_error(), None);
    assert!(!f.visible());
    assert_eq!(
        f.submitted.lock().as_slice(),
        &[SurveyDraft {
            project: "Lisbon 2025".to_string(),
            phone: Some("5551234567".to_string()),
            budget_category: "mid".to_string(),
            budget_range: Some("[500,1500]".to_string()),
            preferences: Vec::new(),
        }]
    );
}
