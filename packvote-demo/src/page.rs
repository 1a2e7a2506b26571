//! Markup for the demo page: a project sidebar, the survey form, the "add
//! participant" dialog and the project dialog, laid out on a 1280x800
//! viewport.

use anyhow::Result;
use packvote_components::date_picker::build_date_picker_markup;
use packvote_ui::{
    Display, Document, Element, ElementKind, ElementStyle, InputType, NodeId, Px, PxRect,
};

const PROJECTS: [(&str, &str); 2] = [
    ("lisbon_2025", "Lisbon 2025"),
    ("kyoto_spring", "Kyoto Spring"),
];

const BUDGETS: &str = r#"{
    "budget": {"range": [0, 500]},
    "moderate": {"range": [500, 1500]},
    "luxury": {"range": [1500, 5000]}
}"#;

fn rect(x: i32, y: i32, w: i32, h: i32) -> PxRect {
    PxRect::new(Px(x), Px(y), Px(w), Px(h))
}

fn hidden() -> ElementStyle {
    ElementStyle {
        display: Some(Display::None),
        ..ElementStyle::default()
    }
}

pub fn build_document() -> Result<Document> {
    let mut doc = Document::new();
    let body = doc.body();
    doc.update(body, |element| element.set_bounds(rect(0, 0, 1280, 800)));

    let sidebar = doc.append(
        body,
        Element::new(ElementKind::Div)
            .with_class("sidebar")
            .with_bounds(rect(0, 0, 280, 800)),
    )?;
    doc.append(
        sidebar,
        Element::new(ElementKind::Button)
            .with_id("new-project-btn")
            .with_text("New project")
            .with_bounds(rect(16, 16, 248, 40)),
    )?;
    for (index, (safe_name, name)) in PROJECTS.into_iter().enumerate() {
        let top = 72 + 48 * index as i32;
        let item = doc.append(
            sidebar,
            Element::new(ElementKind::Div)
                .with_id(format!("{safe_name}-item"))
                .with_class("project-item")
                .with_data("project", safe_name)
                .with_text(name)
                .with_bounds(rect(16, top, 248, 40)),
        )?;
        let menu = doc.append(
            item,
            Element::new(ElementKind::Div).with_class("dropdown-menu-container"),
        )?;
        doc.append(
            menu,
            Element::new(ElementKind::Button)
                .with_id(format!("{safe_name}-menu"))
                .with_class("dropdown-trigger")
                .with_bounds(rect(232, top + 8, 24, 24)),
        )?;
        doc.append(
            menu,
            Element::new(ElementKind::Button)
                .with_id(format!("{safe_name}-delete"))
                .with_class("dropdown-item delete-project")
                .with_data("project", safe_name)
                .with_data("project-name", name),
        )?;
    }
    doc.append(
        sidebar,
        Element::new(ElementKind::Button)
            .with_id("add-participant-btn")
            .with_text("Add participant")
            .with_bounds(rect(16, 744, 248, 40)),
    )?;

    let form = doc.append(
        body,
        Element::new(ElementKind::Form)
            .with_id("survey-form")
            .with_bounds(rect(300, 0, 980, 800)),
    )?;
    doc.append(
        form,
        Element::new(ElementKind::Input(InputType::Hidden)).with_id("project_name"),
    )?;
    build_date_picker_markup(&mut doc, form, "travel_date", rect(320, 120, 280, 44))?;

    let location_group = doc.append(form, Element::new(ElementKind::Div).with_class("form-group"))?;
    doc.append(
        location_group,
        Element::new(ElementKind::Input(InputType::Text))
            .with_id("location")
            .with_bounds(rect(320, 200, 400, 44)),
    )?;
    survey_fields(&mut doc, form, "", 280)?;

    build_participant_modal(&mut doc, body)?;
    build_project_modal(&mut doc, body)?;
    Ok(doc)
}

/// Preference tiles, budget pills, trip length stepper and phone field,
/// with every id prefixed by `prefix`.
fn survey_fields(doc: &mut Document, form: NodeId, prefix: &str, top: i32) -> Result<()> {
    let grid = doc.append(
        form,
        Element::new(ElementKind::Div).with_id(format!("{prefix}pref-grid")),
    )?;
    for (index, preference) in ["beach", "city", "hiking"].into_iter().enumerate() {
        let tile = doc.append(
            grid,
            Element::new(ElementKind::Label)
                .with_class("pref")
                .with_bounds(rect(320 + 140 * index as i32, top, 120, 80)),
        )?;
        doc.append(
            tile,
            Element::new(ElementKind::Input(InputType::Checkbox))
                .with_id(format!("{prefix}pref-{preference}"))
                .with_value(preference),
        )?;
    }

    doc.append(
        form,
        Element::new(ElementKind::Div)
            .with_id(format!("{prefix}budget-card"))
            .with_data("budgets", BUDGETS),
    )?;
    let pills = doc.append(
        form,
        Element::new(ElementKind::Div).with_id(format!("{prefix}budget-cards")),
    )?;
    for category in ["budget", "moderate", "luxury"] {
        let pill = doc.append(
            pills,
            Element::new(ElementKind::Label)
                .with_id(format!("{prefix}pill-{category}"))
                .with_class("pill")
                .with_data("budget", category),
        )?;
        doc.append(
            pill,
            Element::new(ElementKind::Input(InputType::Radio))
                .with_attr("name", "budget_category")
                .with_value(category),
        )?;
    }
    doc.append(
        form,
        Element::new(ElementKind::Input(InputType::Hidden))
            .with_id(format!("{prefix}budget_range")),
    )?;

    doc.append(
        form,
        Element::new(ElementKind::Button).with_id(format!("{prefix}minus")),
    )?;
    doc.append(
        form,
        Element::new(ElementKind::Input(InputType::Number))
            .with_id(format!("{prefix}travel_duration"))
            .with_value("3")
            .with_attr("min", "1")
            .with_attr("max", "60"),
    )?;
    doc.append(
        form,
        Element::new(ElementKind::Button).with_id(format!("{prefix}plus")),
    )?;

    doc.append(
        form,
        Element::new(ElementKind::Input(InputType::Tel)).with_id(format!("{prefix}phone")),
    )?;
    doc.append(
        form,
        Element::new(ElementKind::Div)
            .with_id(format!("{prefix}phone-warning"))
            .with_style(hidden()),
    )?;
    Ok(())
}

fn build_participant_modal(doc: &mut Document, body: NodeId) -> Result<()> {
    let modal = doc.append(
        body,
        Element::new(ElementKind::Div)
            .with_id("participant-form-modal")
            .with_style(hidden()),
    )?;
    let overlay = doc.append(
        modal,
        Element::new(ElementKind::Div)
            .with_class("modal-overlay")
            .with_bounds(rect(0, 0, 1280, 800)),
    )?;
    let content = doc.append(
        overlay,
        Element::new(ElementKind::Div)
            .with_class("modal-content")
            .with_bounds(rect(300, 40, 680, 720)),
    )?;
    let form = doc.append(
        content,
        Element::new(ElementKind::Form).with_id("participant-form"),
    )?;
    doc.append(
        form,
        Element::new(ElementKind::Input(InputType::Hidden)).with_id("form-project-name"),
    )?;
    survey_fields(doc, form, "form-", 120)?;
    // Near the bottom edge: this calendar has to open upwards.
    build_date_picker_markup(doc, form, "form-travel_date", rect(320, 700, 280, 44))?;
    doc.append(
        content,
        Element::new(ElementKind::Button)
            .with_id("form-cancel-btn")
            .with_bounds(rect(820, 700, 140, 40)),
    )?;
    Ok(())
}

fn build_project_modal(doc: &mut Document, body: NodeId) -> Result<()> {
    let modal = doc.append(
        body,
        Element::new(ElementKind::Div)
            .with_id("project-modal")
            .with_style(hidden()),
    )?;
    let overlay = doc.append(
        modal,
        Element::new(ElementKind::Div)
            .with_class("modal-overlay")
            .with_bounds(rect(0, 0, 1280, 800)),
    )?;
    let content = doc.append(
        overlay,
        Element::new(ElementKind::Div)
            .with_class("modal-content")
            .with_bounds(rect(390, 200, 500, 400)),
    )?;
    doc.append(
        content,
        Element::new(ElementKind::Input(InputType::Text))
            .with_id("modal-project-name")
            .with_bounds(rect(410, 240, 460, 44)),
    )?;
    build_date_picker_markup(doc, content, "modal-travel_date", rect(410, 300, 460, 44))?;
    doc.append(
        content,
        Element::new(ElementKind::Input(InputType::Number)).with_id("modal-travel_duration"),
    )?;
    doc.append(
        content,
        Element::new(ElementKind::Button)
            .with_id("modal-create-btn")
            .with_bounds(rect(730, 540, 140, 40)),
    )?;
    doc.append(
        content,
        Element::new(ElementKind::Button)
            .with_id("modal-cancel-btn")
            .with_bounds(rect(580, 540, 140, 40)),
    )?;
    Ok(())
}
