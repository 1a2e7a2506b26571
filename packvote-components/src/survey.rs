//! Survey submission: the main `survey-form` and the "add participant"
//! dialog.
//!
//! Both forms carry the same fields under ids that differ only by a prefix.
//! The survey form uses bare ids (`phone`, `budget-card`, `budget-cards`,
//! `budget_range`, `pref-grid`, `minus`/`plus`/`travel_duration`) and the
//! dialog prefixes each with `form-`. The survey form reads its project from
//! the `project_name` field; the dialog copies the active sidebar project
//! into `form-project-name`.

use std::sync::Arc;

use packvote_ui::{
    Display, Document, ElementKind, EventFlow, EventPhase, InputType, Key, NodeId, Page,
    PageContext, UiEvent, Widget, WidgetId,
};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    config::ComponentsConfig,
    forms::{ACTIVE_CLASS, BudgetPills, PhoneField, PreferenceTiles, Stepper},
    text::digits_only,
};

/// Class of the sidebar project entries. The selected one also carries
/// [`ACTIVE_CLASS`] and names itself in `data-project`.
pub const PROJECT_ITEM_CLASS: &str = "project-item";
/// `name` attribute shared by the budget category radios.
pub const BUDGET_CATEGORY_NAME: &str = "budget_category";

/// Validation failures for a survey response, worded for the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurveyDraftError {
    /// No project is selected.
    #[error("Please select a project from the sidebar first.")]
    MissingProject,
    /// The phone number does not have exactly ten digits.
    #[error("Phone number must be exactly 10 digits.")]
    InvalidPhone,
    /// No budget category radio is checked.
    #[error("Please choose a budget category first.")]
    MissingBudgetCategory,
}

/// A validated survey response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyDraft {
    /// The project the response belongs to.
    pub project: String,
    /// Ten digits, or `None` when the form has no phone field.
    pub phone: Option<String>,
    /// The checked budget category.
    pub budget_category: String,
    /// Serialized range of the category, once known.
    pub budget_range: Option<String>,
    /// Values of the checked preference tiles.
    pub preferences: Vec<String>,
}

impl SurveyDraft {
    /// Validates raw form values in the order the user is told about them:
    /// project, then phone, then budget category.
    pub fn validate(
        project: &str,
        phone: Option<&str>,
        budget_category: Option<&str>,
    ) -> Result<Self, SurveyDraftError> {
        let project = project.trim();
        if project.is_empty() {
            return Err(SurveyDraftError::MissingProject);
        }
        let phone = match phone.map(digits_only) {
            Some(digits) if digits.len() != 10 => return Err(SurveyDraftError::InvalidPhone),
            digits => digits,
        };
        let budget_category = budget_category
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .ok_or(SurveyDraftError::MissingBudgetCategory)?;
        Ok(Self {
            project: project.to_string(),
            phone,
            budget_category: budget_category.to_string(),
            budget_range: None,
            preferences: Vec::new(),
        })
    }
}

/// The `data-project` of the active sidebar entry.
pub fn active_project(doc: &Document) -> Option<String> {
    doc.query_class(PROJECT_ITEM_CLASS)
        .into_iter()
        .filter_map(|node| doc.element(node))
        .find(|element| element.has_class(ACTIVE_CLASS))
        .and_then(|element| element.data("project"))
        .filter(|project| !project.trim().is_empty())
        .map(str::to_string)
}

/// The value of the checked budget category radio inside `form`.
pub fn checked_budget_category(doc: &Document, form: NodeId) -> Option<String> {
    doc.query_kind_within(form, ElementKind::Input(InputType::Radio))
        .into_iter()
        .filter_map(|node| doc.element(node))
        .find(|element| {
            element.attr("name") == Some(BUDGET_CATEGORY_NAME) && element.is_checked()
        })
        .map(|element| element.value().to_string())
}

/// Which copy of the survey fields a [`SurveyForm`] binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyLayout {
    /// Id of the form element.
    pub form: &'static str,
    /// Prefix of every field id.
    pub prefix: &'static str,
    /// Id of the field carrying the project name.
    pub project_field: &'static str,
    /// Whether the project comes from the active sidebar entry rather than
    /// the project field.
    pub project_from_sidebar: bool,
}

impl SurveyLayout {
    /// The main survey form.
    pub const SURVEY: Self = Self {
        form: "survey-form",
        prefix: "",
        project_field: "project_name",
        project_from_sidebar: false,
    };

    /// The form inside the "add participant" dialog.
    pub const PARTICIPANT: Self = Self {
        form: "participant-form",
        prefix: "form-",
        project_field: "form-project-name",
        project_from_sidebar: true,
    };

    fn id(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }
}

#[derive(Debug, Clone, Copy)]
struct SurveyParts {
    form: NodeId,
    project_field: Option<NodeId>,
    phone: Option<NodeId>,
    range_field: Option<NodeId>,
}

type SubmitCallback = Arc<dyn Fn(&mut PageContext, SurveyDraft) + Send + Sync>;

/// A survey form and the controls inside it.
#[derive(Clone)]
pub struct SurveyForm {
    id: WidgetId,
    layout: SurveyLayout,
    parts: SurveyParts,
    preferences: Option<PreferenceTiles>,
    budget: Option<BudgetPills>,
    stepper: Option<Stepper>,
    phone: Option<PhoneField>,
    on_submit: SubmitCallback,
    last_error: Arc<RwLock<Option<SurveyDraftError>>>,
}

impl SurveyForm {
    /// Binds the form named by `layout` together with its preference tiles,
    /// budget pills, stepper and phone field. `on_submit` receives each
    /// validated draft.
    pub fn initialize<F>(
        page: &mut Page,
        layout: SurveyLayout,
        config: &ComponentsConfig,
        on_submit: F,
    ) -> Option<Self>
    where
        F: Fn(&mut PageContext, SurveyDraft) + Send + Sync + 'static,
    {
        let doc = page.document();
        let parts = SurveyParts {
            form: doc.get_element_by_id(layout.form)?,
            project_field: doc.get_element_by_id(layout.project_field),
            phone: doc.get_element_by_id(&layout.id("phone")),
            range_field: doc.get_element_by_id(&layout.id("budget_range")),
        };

        let preferences = PreferenceTiles::initialize(page, &layout.id("pref-grid"));
        let budget = BudgetPills::initialize(
            page,
            &layout.id("budget-card"),
            &layout.id("budget-cards"),
            &layout.id("budget_range"),
        );
        let stepper = Stepper::initialize(page, layout.prefix, &config.stepper);
        let warning = layout.id("phone-warning");
        let phone = PhoneField::initialize(page, &layout.id("phone"), Some(warning.as_str()));

        let id = page.allocate_widget_id();
        let form = Self {
            id,
            layout,
            parts,
            preferences,
            budget,
            stepper,
            phone,
            on_submit: Arc::new(on_submit),
            last_error: Arc::default(),
        };
        page.mount(id, Arc::new(form.clone()));
        debug!(form = layout.form, ?id, "survey form initialized");
        Some(form)
    }

    /// Validates the form and, on success, fills the budget range if still
    /// empty and hands the draft to the callback. Failures are kept for
    /// [`Self::last_error`].
    pub fn submit(&self, cx: &mut PageContext) -> Result<SurveyDraft, SurveyDraftError> {
        let project = self.project(cx);
        let doc = cx.document();
        let phone = self
            .parts
            .phone
            .and_then(|node| doc.element(node))
            .map(|element| element.value().to_string());
        let category = checked_budget_category(doc, self.parts.form);

        let result = SurveyDraft::validate(&project, phone.as_deref(), category.as_deref());
        let mut draft = match result {
            Ok(draft) => draft,
            Err(err) => {
                warn!(form = self.layout.form, %err, "survey form rejected");
                *self.last_error.write() = Some(err.clone());
                return Err(err);
            }
        };

        if let Some(budget) = &self.budget {
            budget.ensure_range(cx.document_mut(), &draft.budget_category);
        }
        let doc = cx.document();
        draft.budget_range = self
            .parts
            .range_field
            .and_then(|node| doc.element(node))
            .map(|element| element.value().to_string())
            .filter(|range| !range.is_empty());
        draft.preferences = self
            .preferences
            .as_ref()
            .map(|tiles| tiles.selected_values(doc))
            .unwrap_or_default();

        *self.last_error.write() = None;
        info!(
            form = self.layout.form,
            project = %draft.project,
            category = %draft.budget_category,
            "submitting survey"
        );
        (self.on_submit)(cx, draft.clone());
        Ok(draft)
    }

    /// Returns the form to a blank state: pills, range, preference tiles
    /// and phone are cleared and the project field is refreshed.
    pub fn reset(&self, cx: &mut PageContext) {
        let project = self.project(cx);
        let doc = cx.document_mut();
        if let Some(field) = self.parts.project_field {
            doc.update(field, |element| element.set_value(project));
        }
        if let Some(budget) = &self.budget {
            budget.clear(doc);
        }
        if let Some(tiles) = &self.preferences {
            tiles.clear(doc);
        }
        if let Some(phone) = &self.phone {
            phone.clear(doc);
        }
        *self.last_error.write() = None;
        debug!(form = self.layout.form, "survey form reset");
    }

    /// The message from the last rejected submission.
    pub fn last_error(&self) -> Option<SurveyDraftError> {
        self.last_error.read().clone()
    }

    /// The form element.
    pub fn form(&self) -> NodeId {
        self.parts.form
    }

    /// The budget pills, if the form has them.
    pub fn budget(&self) -> Option<&BudgetPills> {
        self.budget.as_ref()
    }

    /// The preference tiles, if the form has them.
    pub fn preferences(&self) -> Option<&PreferenceTiles> {
        self.preferences.as_ref()
    }

    /// The trip length stepper, if the form has one.
    pub fn stepper(&self) -> Option<&Stepper> {
        self.stepper.as_ref()
    }

    /// The phone field, if the form has one.
    pub fn phone(&self) -> Option<&PhoneField> {
        self.phone.as_ref()
    }

    /// The id the form is mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }

    /// The project name, copying the active sidebar entry into the project
    /// field first when the layout asks for it.
    fn project(&self, cx: &mut PageContext) -> String {
        if self.layout.project_from_sidebar {
            let project = active_project(cx.document()).unwrap_or_default();
            if let Some(field) = self.parts.project_field {
                let value = project.clone();
                cx.document_mut()
                    .update(field, |element| element.set_value(value));
            }
            return project;
        }
        self.parts
            .project_field
            .and_then(|node| cx.document().element(node))
            .map(|element| element.value().to_string())
            .unwrap_or_default()
    }
}

impl Widget for SurveyForm {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        if let (EventPhase::Target, UiEvent::Submit { target }) = (phase, event)
            && *target == self.parts.form
        {
            let _ = self.submit(cx);
        }
        EventFlow::Continue
    }
}

#[derive(Debug, Clone, Copy)]
struct ParticipantModalParts {
    root: NodeId,
    overlay: Option<NodeId>,
    opener: Option<NodeId>,
    cancel: Option<NodeId>,
}

impl ParticipantModalParts {
    fn resolve(doc: &Document) -> Option<Self> {
        let root = doc.get_element_by_id("participant-form-modal")?;
        Some(Self {
            root,
            overlay: doc.query_class_within(root, "modal-overlay").first().copied(),
            opener: doc.get_element_by_id("add-participant-btn"),
            cancel: doc.get_element_by_id("form-cancel-btn"),
        })
    }
}

fn set_display(doc: &mut Document, node: NodeId, display: Display) {
    doc.update(node, |element| element.style_mut().display = Some(display));
}

/// The "add participant" dialog around the `participant-form` survey.
///
/// Ids: `participant-form-modal` (root, required) and its `.modal-overlay`,
/// the opener `add-participant-btn` and `form-cancel-btn`.
#[derive(Clone)]
pub struct ParticipantModal {
    id: WidgetId,
    parts: ParticipantModalParts,
    form: SurveyForm,
    show_error: Arc<RwLock<Option<SurveyDraftError>>>,
}

impl ParticipantModal {
    /// Binds the dialog and its form. `on_submit` receives each validated
    /// draft; the dialog hides itself afterwards.
    pub fn initialize<F>(page: &mut Page, config: &ComponentsConfig, on_submit: F) -> Option<Self>
    where
        F: Fn(&mut PageContext, SurveyDraft) + Send + Sync + 'static,
    {
        let parts = ParticipantModalParts::resolve(page.document())?;
        let root = parts.root;
        let form = SurveyForm::initialize(
            page,
            SurveyLayout::PARTICIPANT,
            config,
            move |cx, draft| {
                on_submit(cx, draft);
                set_display(cx.document_mut(), root, Display::None);
                debug!("participant modal hidden after submit");
            },
        )?;
        let id = page.allocate_widget_id();
        let modal = Self {
            id,
            parts,
            form,
            show_error: Arc::default(),
        };
        page.mount(id, Arc::new(modal.clone()));
        Some(modal)
    }

    /// Shows the dialog with a reset form. Refuses while no sidebar project
    /// is active.
    pub fn show(&self, cx: &mut PageContext) -> Result<(), SurveyDraftError> {
        if active_project(cx.document()).is_none() {
            let err = SurveyDraftError::MissingProject;
            warn!(%err, "participant modal needs an active project");
            *self.show_error.write() = Some(err.clone());
            return Err(err);
        }
        *self.show_error.write() = None;
        set_display(cx.document_mut(), self.parts.root, Display::Flex);
        self.form.reset(cx);
        debug!("participant modal shown");
        Ok(())
    }

    /// Hides the dialog.
    pub fn hide(&self, cx: &mut PageContext) {
        set_display(cx.document_mut(), self.parts.root, Display::None);
        debug!("participant modal hidden");
    }

    /// Whether the dialog is shown.
    pub fn is_visible(&self, doc: &Document) -> bool {
        doc.element(self.parts.root)
            .is_some_and(|element| element.style().display != Some(Display::None))
    }

    /// The message from the last refused opening or rejected submission.
    pub fn last_error(&self) -> Option<SurveyDraftError> {
        self.show_error.read().clone().or_else(|| self.form.last_error())
    }

    /// The form inside the dialog.
    pub fn form(&self) -> &SurveyForm {
        &self.form
    }

    /// The id the dialog is mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }
}

impl Widget for ParticipantModal {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        let parts = self.parts;
        match (phase, event) {
            (EventPhase::Target, UiEvent::Click { target }) => {
                let target = Some(*target);
                if target == parts.opener {
                    let _ = self.show(cx);
                } else if target == parts.cancel || target == parts.overlay {
                    // Only a click on the overlay itself, not its content.
                    self.hide(cx);
                }
            }
            (
                EventPhase::Document,
                UiEvent::KeyDown {
                    key: Key::Escape, ..
                },
            ) if self.is_visible(cx.document()) => self.hide(cx),
            _ => {}
        }
        EventFlow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_checks_fields_in_order() {
        assert_eq!(
            SurveyDraft::validate(" ", Some("12"), None),
            Err(SurveyDraftError::MissingProject)
        );
        assert_eq!(
            SurveyDraft::validate("Lisbon", Some("555-123-456"), None),
            Err(SurveyDraftError::InvalidPhone)
        );
        assert_eq!(
            SurveyDraft::validate("Lisbon", Some("(555) 123-4567"), Some("  ")),
            Err(SurveyDraftError::MissingBudgetCategory)
        );
    }

    #[test]
    fn valid_draft_keeps_digits_only() {
        let draft = SurveyDraft::validate(" Lisbon ", Some("(555) 123-4567"), Some("mid"))
            .expect("valid");
        assert_eq!(draft.project, "Lisbon");
        assert_eq!(draft.phone.as_deref(), Some("5551234567"));
        assert_eq!(draft.budget_category, "mid");
        assert_eq!(draft.budget_range, None);

        let without_phone = SurveyDraft::validate("Lisbon", None, Some("mid")).expect("valid");
        assert_eq!(without_phone.phone, None);
        assert_eq!(
            SurveyDraftError::InvalidPhone.to_string(),
            "Phone number must be exactly 10 digits."
        );
    }

    #[test]
    fn layouts_prefix_field_ids() {
        assert_eq!(SurveyLayout::SURVEY.id("phone"), "phone");
        assert_eq!(SurveyLayout::PARTICIPANT.id("budget_range"), "form-budget_range");
    }
}
