//! The "create project" dialog.
//!
//! Ids the dialog binds to: `project-modal` (root, required), its
//! `.modal-overlay`, `modal-project-name`, `modal-travel_duration`,
//! `modal-create-btn`, `modal-cancel-btn`, and the openers
//! `create-first-project-btn` and `new-project-btn`. The travel date comes
//! from the `modal-travel_date` date picker.

use std::sync::Arc;

use chrono::NaiveDate;
use packvote_ui::{
    Display, Document, EventFlow, EventPhase, Key, NodeId, Page, PageContext, UiEvent, Widget,
    WidgetId,
};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    config::ModalConfig,
    date_picker::{DatePicker, parse_value},
};

/// Validation failures for a new project, worded for the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectDraftError {
    /// The name is empty after trimming.
    #[error("Please enter a project name")]
    MissingName,
    /// No date was picked.
    #[error("Please select a travel date")]
    MissingTravelDate,
    /// The date is unreadable or before today.
    #[error("Travel date cannot be in the past")]
    PastTravelDate,
    /// The duration field is empty.
    #[error("Please enter travel duration")]
    MissingDuration,
    /// The duration is not a positive whole number of days.
    #[error("Travel duration must be a positive number of days")]
    InvalidDuration,
}

/// A validated request to create a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    /// Project name, trimmed.
    pub name: String,
    /// First day of the trip.
    pub travel_date: NaiveDate,
    /// Trip length in days.
    pub travel_duration: u32,
}

impl ProjectDraft {
    /// Validates raw form values against `today`.
    pub fn validate(
        name: &str,
        travel_date: &str,
        travel_duration: &str,
        today: NaiveDate,
    ) -> Result<Self, ProjectDraftError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectDraftError::MissingName);
        }
        if travel_date.trim().is_empty() {
            return Err(ProjectDraftError::MissingTravelDate);
        }
        let travel_date = match parse_value(travel_date) {
            Some(date) if date >= today => date,
            _ => return Err(ProjectDraftError::PastTravelDate),
        };
        let travel_duration = travel_duration.trim();
        if travel_duration.is_empty() {
            return Err(ProjectDraftError::MissingDuration);
        }
        let travel_duration = travel_duration
            .parse::<u32>()
            .ok()
            .filter(|&days| days > 0)
            .ok_or(ProjectDraftError::InvalidDuration)?;
        Ok(Self {
            name: name.to_string(),
            travel_date,
            travel_duration,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct ModalParts {
    root: NodeId,
    overlay: Option<NodeId>,
    name: Option<NodeId>,
    duration: Option<NodeId>,
    travel_date: Option<NodeId>,
    create: Option<NodeId>,
    cancel: Option<NodeId>,
    openers: [Option<NodeId>; 2],
}

impl ModalParts {
    fn resolve(doc: &Document) -> Option<Self> {
        let root = doc.get_element_by_id("project-modal")?;
        Some(Self {
            root,
            overlay: doc.query_class_within(root, "modal-overlay").first().copied(),
            name: doc.get_element_by_id("modal-project-name"),
            duration: doc.get_element_by_id("modal-travel_duration"),
            travel_date: doc.get_element_by_id("modal-travel_date"),
            create: doc.get_element_by_id("modal-create-btn"),
            cancel: doc.get_element_by_id("modal-cancel-btn"),
            openers: [
                doc.get_element_by_id("create-first-project-btn"),
                doc.get_element_by_id("new-project-btn"),
            ],
        })
    }
}

type CreateCallback = Arc<dyn Fn(&mut PageContext, ProjectDraft) + Send + Sync>;

/// The project creation dialog.
#[derive(Clone)]
pub struct ProjectModal {
    id: WidgetId,
    parts: ModalParts,
    config: ModalConfig,
    date_picker: Option<DatePicker>,
    on_create: CreateCallback,
    last_error: Arc<RwLock<Option<ProjectDraftError>>>,
}

impl ProjectModal {
    /// Binds the dialog. `on_create` receives each validated draft; the
    /// dialog hides itself afterwards.
    pub fn initialize<F>(
        page: &mut Page,
        config: &ModalConfig,
        date_picker: Option<DatePicker>,
        on_create: F,
    ) -> Option<Self>
    where
        F: Fn(&mut PageContext, ProjectDraft) + Send + Sync + 'static,
    {
        let parts = ModalParts::resolve(page.document())?;
        let id = page.allocate_widget_id();
        let modal = Self {
            id,
            parts,
            config: config.clone(),
            date_picker,
            on_create: Arc::new(on_create),
            last_error: Arc::default(),
        };
        page.mount(id, Arc::new(modal.clone()));
        Some(modal)
    }

    /// Shows the dialog with a blank name, the default duration and a reset
    /// date picker.
    pub fn show(&self, cx: &mut PageContext) {
        let duration = self.config.default_duration.to_string();
        let doc = cx.document_mut();
        doc.update(self.parts.root, |element| {
            element.style_mut().display = Some(Display::Flex)
        });
        if let Some(name) = self.parts.name {
            doc.update(name, |element| element.set_value(""));
        }
        if let Some(field) = self.parts.duration {
            doc.update(field, |element| element.set_value(duration));
        }
        if let Some(picker) = &self.date_picker {
            picker.reset(cx);
        }
        *self.last_error.write() = None;
        debug!("project modal shown");
    }

    /// Hides the dialog.
    pub fn hide(&self, cx: &mut PageContext) {
        cx.document_mut().update(self.parts.root, |element| {
            element.style_mut().display = Some(Display::None)
        });
        debug!("project modal hidden");
    }

    /// Whether the dialog is shown.
    pub fn is_visible(&self, doc: &Document) -> bool {
        doc.element(self.parts.root)
            .is_some_and(|element| element.style().display != Some(Display::None))
    }

    /// Validates the form and, on success, hands the draft to the callback
    /// and hides the dialog. Failures are kept for [`Self::last_error`].
    pub fn submit(&self, cx: &mut PageContext) -> Result<ProjectDraft, ProjectDraftError> {
        let field = |node: Option<NodeId>| {
            node.and_then(|node| cx.document().element(node))
                .map(|element| element.value().to_string())
                .unwrap_or_default()
        };
        let result = ProjectDraft::validate(
            &field(self.parts.name),
            &field(self.parts.travel_date),
            &field(self.parts.duration),
            cx.today(),
        );
        match &result {
            Ok(draft) => {
                *self.last_error.write() = None;
                info!(name = %draft.name, date = %draft.travel_date, "creating project");
                (self.on_create)(cx, draft.clone());
                self.hide(cx);
            }
            Err(err) => {
                warn!(%err, "project form rejected");
                *self.last_error.write() = Some(err.clone());
            }
        }
        result
    }

    /// The message from the last rejected submission.
    pub fn last_error(&self) -> Option<ProjectDraftError> {
        self.last_error.read().clone()
    }

    /// The id the dialog is mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }
}

impl Widget for ProjectModal {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        let parts = self.parts;
        match (phase, event) {
            (EventPhase::Target, UiEvent::Click { target }) => {
                let target = Some(*target);
                if parts.openers.contains(&target) {
                    self.show(cx);
                } else if target == parts.cancel || target == parts.overlay {
                    // Only a click on the overlay itself, not its content.
                    self.hide(cx);
                } else if target == parts.create {
                    let _ = self.submit(cx);
                }
            }
            (
                EventPhase::Target,
                UiEvent::KeyDown {
                    target,
                    key: Key::Enter,
                },
            ) if target.is_some() && *target == parts.name => {
                let _ = self.submit(cx);
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
