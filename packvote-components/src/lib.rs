//! Widgets for the packvote trip planner, built on `packvote-ui`.
//!
//! The centrepiece is [`DatePicker`], a calendar popover that floats above
//! the page and never offers a date before today. Around it sit the smaller
//! controls of the survey and project forms: row action menus, preference
//! tiles, budget pills, a trip length stepper, a phone field, a location
//! autocomplete, the project creation dialog, and the survey and "add
//! participant" forms that validate a response before handing it on.
//!
//! Every widget binds to existing markup by id or class and mounts itself on
//! a [`packvote_ui::Page`]. Widgets whose markup is absent are skipped, so a
//! host can initialize everything unconditionally.
#![deny(missing_docs, clippy::unwrap_used)]

pub mod config;
pub mod date_picker;
pub mod dropdown_menu;
pub mod forms;
pub mod location_autocomplete;
pub mod modal;
pub mod popover;
pub mod survey;
pub mod text;

pub use crate::{
    config::{ComponentsConfig, ConfigError},
    date_picker::{CalendarCursor, DatePicker},
    dropdown_menu::{DropdownMenus, MenuAction},
    forms::{BudgetPills, PhoneField, PreferenceTiles, Stepper},
    location_autocomplete::{LocationAutocomplete, Suggestion, SuggestionError, SuggestionSource},
    modal::{ProjectDraft, ProjectDraftError, ProjectModal},
    popover::{PopoverCoordinator, PopoverPlacement, PopoverPosition},
    survey::{ParticipantModal, SurveyDraft, SurveyDraftError, SurveyForm, SurveyLayout},
    text::{capitalize_text, digits_only},
};
