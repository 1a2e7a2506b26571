//! Row action menus on project and participant lists.
//!
//! Menus are plain markup: a `.dropdown-menu-container` holding a
//! `.dropdown-trigger` and its items. The open menu carries the `active`
//! class, so the state lives in the document rather than in the widget.
//! Destructive items do not act on their own; they close their menu and hand
//! a [`MenuAction`] to the host, which confirms and performs the request.

use std::sync::Arc;

use packvote_ui::{
    Document, EventFlow, EventPhase, NodeId, Page, PageContext, UiEvent, Widget, WidgetId,
};
use tracing::debug;

/// Class of a menu's root element.
pub const CONTAINER_CLASS: &str = "dropdown-menu-container";
/// Class of the element that toggles a menu.
pub const TRIGGER_CLASS: &str = "dropdown-trigger";
/// Class carried by the open menu.
pub const ACTIVE_CLASS: &str = "active";

/// A request raised by a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Delete a project and all its participants.
    DeleteProject {
        /// URL-safe project identifier (`data-project`).
        project: String,
        /// Display name for the confirmation prompt (`data-project-name`).
        name: String,
    },
    /// Delete one participant's submission.
    DeleteParticipant {
        /// Participant identifier (`data-participant-id`).
        participant_id: String,
    },
}

type ActionCallback = Arc<dyn Fn(&mut PageContext, MenuAction) + Send + Sync>;

/// Page-wide handler for every dropdown menu.
#[derive(Clone)]
pub struct DropdownMenus {
    id: WidgetId,
    on_action: ActionCallback,
}

impl DropdownMenus {
    /// Mounts the menu handler. `on_action` receives delete requests.
    pub fn initialize<F>(page: &mut Page, on_action: F) -> Self
    where
        F: Fn(&mut PageContext, MenuAction) + Send + Sync + 'static,
    {
        let id = page.allocate_widget_id();
        let menus = Self {
            id,
            on_action: Arc::new(on_action),
        };
        page.mount(id, Arc::new(menus.clone()));
        menus
    }

    /// The id the handler is mounted under.
    pub fn widget_id(&self) -> WidgetId {
        self.id
    }

    /// The currently open menu, if any.
    pub fn active_menu(doc: &Document) -> Option<NodeId> {
        doc.query_class(CONTAINER_CLASS).into_iter().find(|&node| {
            doc.element(node)
                .is_some_and(|element| element.has_class(ACTIVE_CLASS))
        })
    }

    /// Closes every menu.
    pub fn close_all(doc: &mut Document) {
        for container in doc.query_class(CONTAINER_CLASS) {
            doc.update(container, |element| element.remove_class(ACTIVE_CLASS));
        }
    }

    fn on_click(&self, cx: &mut PageContext, target: NodeId) {
        let doc = cx.document_mut();
        if doc.closest(target, CONTAINER_CLASS).is_none() {
            Self::close_all(doc);
            return;
        }

        if let Some(trigger) = doc.closest(target, TRIGGER_CLASS) {
            let Some(container) = doc.closest(trigger, CONTAINER_CLASS) else {
                return;
            };
            let was_active = doc
                .element(container)
                .is_some_and(|element| element.has_class(ACTIVE_CLASS));
            Self::close_all(doc);
            if !was_active {
                doc.update(container, |element| element.add_class(ACTIVE_CLASS));
            }
            return;
        }

        let action = item_action(doc, target);
        if let Some((button, action)) = action {
            if let Some(container) = doc.closest(button, CONTAINER_CLASS) {
                doc.update(container, |element| element.remove_class(ACTIVE_CLASS));
            }
            debug!(?action, "menu action requested");
            (self.on_action)(cx, action);
        }
    }
}

fn item_action(doc: &Document, target: NodeId) -> Option<(NodeId, MenuAction)> {
    if let Some(button) = doc.closest(target, "delete-project") {
        let element = doc.element(button)?;
        return Some((
            button,
            MenuAction::DeleteProject {
                project: element.data("project").unwrap_or_default().to_string(),
                name: element.data("project-name").unwrap_or_default().to_string(),
            },
        ));
    }
    if let Some(button) = doc.closest(target, "delete-participant") {
        let element = doc.element(button)?;
        return Some((
            button,
            MenuAction::DeleteParticipant {
                participant_id: element
                    .data("participant-id")
                    .unwrap_or_default()
                    .to_string(),
            },
        ));
    }
    None
}

impl Widget for DropdownMenus {
    fn handle_event(&self, cx: &mut PageContext, phase: EventPhase, event: &UiEvent) -> EventFlow {
        if let (EventPhase::Document, UiEvent::Click { target }) = (phase, event) {
            self.on_click(cx, *target);
        }
        EventFlow::Continue
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use packvote_ui::{Document, Element, ElementKind, ManualClock, Px, PxSize, chrono::NaiveDate};
    use parking_lot::Mutex;

    use super::*;

    struct Fixture {
        page: Page,
        triggers: [NodeId; 2],
        containers: [NodeId; 2],
        delete_project: NodeId,
        outside: NodeId,
        actions: Arc<Mutex<Vec<MenuAction>>>,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        let mut triggers = Vec::new();
        let mut containers = Vec::new();
        for _ in 0..2 {
            let container = doc
                .append(body, Element::new(ElementKind::Div).with_class(CONTAINER_CLASS))
                .expect("container");
            let trigger = doc
                .append(container, Element::new(ElementKind::Button).with_class(TRIGGER_CLASS))
                .expect("trigger");
            containers.push(container);
            triggers.push(trigger);
        }
        let delete_project = doc
            .append(
                containers[0],
                Element::new(ElementKind::Button)
                    .with_class("dropdown-item delete-project")
                    .with_data("project", "lisbon_2025")
                    .with_data("project-name", "Lisbon 2025"),
            )
            .expect("item");
        let outside = doc
            .append(body, Element::new(ElementKind::Div))
            .expect("outside");

        let clock = ManualClock::at_midnight(NaiveDate::from_ymd_opt(2025, 6, 15).expect("date"));
        let mut page = Page::new(doc, PxSize::new(Px(800), Px(600)), Arc::new(clock));
        let actions = Arc::new(Mutex::new(Vec::new()));
        let sink = actions.clone();
        DropdownMenus::initialize(&mut page, move |_, action| sink.lock().push(action));

        Fixture {
            page,
            triggers: [triggers[0], triggers[1]],
            containers: [containers[0], containers[1]],
            delete_project,
            outside,
            actions,
        }
    }

    #[test]
    fn trigger_opens_one_menu_at_a_time() {
        let mut f = fixture();
        f.page.click(f.triggers[0]);
        assert_eq!(DropdownMenus::active_menu(f.page.document()), Some(f.containers[0]));

        f.page.click(f.triggers[1]);
        assert_eq!(DropdownMenus::active_menu(f.page.document()), Some(f.containers[1]));

        f.page.click(f.triggers[1]);
        assert_eq!(DropdownMenus::active_menu(f.page.document()), None);
    }

    #[test]
    fn outside_click_closes_menus() {
        let mut f = fixture();
        f.page.click(f.triggers[0]);
        f.page.click(f.outside);
        assert_eq!(DropdownMenus::active_menu(f.page.document()), None);
    }

    #[test]
    fn delete_item_closes_menu_and_reports_action() {
        let mut f = fixture();
        f.page.click(f.triggers[0]);
        f.page.click(f.delete_project);
        assert_eq!(DropdownMenus::active_menu(f.page.document()), None);
        assert_eq!(
            f.actions.lock().as_slice(),
            &[MenuAction::DeleteProject {
                project: "lisbon_2025".to_string(),
                name: "Lisbon 2025".to_string(),
            }]
        );
    }
}
