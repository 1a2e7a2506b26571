mod page;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, TimeDelta};
use clap::Parser;
use packvote_components::{
    ComponentsConfig, DatePicker, DropdownMenus, LocationAutocomplete, MenuAction,
    ParticipantModal, ProjectDraft, ProjectModal, Suggestion, SuggestionError, SuggestionSource,
    SurveyDraft, SurveyForm, SurveyLayout, capitalize_text,
};
use packvote_ui::{
    Clock, Key, ManualClock, NodeId, Page, PageContext, Px, PxSize, SystemClock,
    logging::init_tracing,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "packvote-demo")]
#[command(version, long_about = None)]
#[command(about = "Drive the packvote widgets through a scripted session")]
struct Cli {
    /// Widget configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
    /// Viewport height in pixels
    #[arg(long, default_value_t = 800)]
    height: i32,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ComponentsConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ComponentsConfig::default(),
    };
    // A manual clock lets the session step past the autocomplete debounce.
    let clock = match cli.today {
        Some(today) => ManualClock::at_midnight(today),
        None => ManualClock::new(SystemClock.now()),
    };

    let document = page::build_document()?;
    let mut page = Page::new(
        document,
        PxSize::new(Px(1280), Px(cli.height)),
        Arc::new(clock.clone()),
    );
    run_session(&mut page, &clock, &config)
}

fn places(query: &str) -> Result<Vec<Suggestion>, SuggestionError> {
    const KNOWN: [&str; 4] = [
        "lisbon, portugal",
        "lima, peru",
        "kyoto, japan",
        "austin, tx",
    ];
    let query = query.to_lowercase();
    Ok(KNOWN
        .iter()
        .filter(|place| place.starts_with(&query))
        .map(|place| Suggestion::new(capitalize_text(place)))
        .collect())
}

fn element_by_id(page: &Page, id: &str) -> Option<NodeId> {
    page.document().get_element_by_id(id)
}

fn log_survey(form: &'static str) -> impl Fn(&mut PageContext, SurveyDraft) + Send + Sync {
    move |_, draft| {
        info!(
            form,
            project = %draft.project,
            category = %draft.budget_category,
            range = ?draft.budget_range,
            preferences = ?draft.preferences,
            "would post survey response"
        );
    }
}

fn run_session(page: &mut Page, clock: &ManualClock, config: &ComponentsConfig) -> Result<()> {
    let survey = DatePicker::initialize(page, "travel_date", config)
        .ok_or_else(|| anyhow!("survey date picker markup missing"))?;
    let participant = DatePicker::initialize(page, "form-travel_date", config)
        .ok_or_else(|| anyhow!("participant date picker markup missing"))?;
    let modal_picker = DatePicker::initialize(page, "modal-travel_date", config);

    DropdownMenus::initialize(page, |_, action| match action {
        MenuAction::DeleteProject { project, name } => {
            info!(%project, %name, "would confirm and delete project");
        }
        MenuAction::DeleteParticipant { participant_id } => {
            info!(%participant_id, "would confirm and delete participant");
        }
    });
    let survey_form = SurveyForm::initialize(
        page,
        SurveyLayout::SURVEY,
        config,
        log_survey(SurveyLayout::SURVEY.form),
    )
    .ok_or_else(|| anyhow!("survey form markup missing"))?;
    let participant_modal =
        ParticipantModal::initialize(page, config, log_survey(SurveyLayout::PARTICIPANT.form));
    let source: Arc<dyn SuggestionSource> = Arc::new(places);
    let autocomplete =
        LocationAutocomplete::initialize(page, "location", source, &config.autocomplete);
    let modal = ProjectModal::initialize(
        page,
        &config.modal,
        modal_picker.clone(),
        |_, draft: ProjectDraft| {
            info!(
                name = %draft.name,
                date = %draft.travel_date,
                days = draft.travel_duration,
                "would create project"
            );
        },
    );

    let today = page.context().today();

    // Pick a date a week out on the survey form.
    page.click(survey.trigger());
    info!(position = ?survey.position(), "survey calendar open");
    let target = today + TimeDelta::days(7);
    if survey.day_cell(target).is_none() {
        // A week out can fall in the next month.
        let next = survey.cursor().month() + 1;
        if next < 12 {
            page.change_value(survey.month_select(), next.to_string());
        } else {
            let year = survey.cursor().year() + 1;
            page.change_value(survey.year_select(), year.to_string());
            page.change_value(survey.month_select(), "0");
        }
    }
    let cell = survey
        .day_cell(target)
        .ok_or_else(|| anyhow!("{target} is not selectable"))?;
    page.click(cell);
    info!(value = %survey.value(page.document()), "survey date picked");

    // Selecting a project in the sidebar.
    if let Some(item) = element_by_id(page, "lisbon_2025-item") {
        page.document_mut()
            .update(item, |element| element.add_class("active"));
    }
    if let Some(field) = element_by_id(page, "project_name") {
        page.document_mut()
            .update(field, |element| element.set_value("lisbon_2025"));
    }

    // Only one calendar stays open at a time.
    if let Some(opener) = element_by_id(page, "add-participant-btn") {
        page.click(opener);
    }
    page.click(participant.trigger());
    info!(position = ?participant.position(), "participant calendar open");
    page.click(survey.trigger());
    info!(
        survey_open = survey.is_open(),
        participant_open = participant.is_open(),
        "mutual exclusion"
    );
    page.key_down(None, Key::Escape);

    if let Some(menu) = element_by_id(page, "lisbon_2025-menu") {
        page.click(menu);
    }
    if let Some(delete) = element_by_id(page, "lisbon_2025-delete") {
        page.click(delete);
    }

    if let (Some(tiles), Some(beach)) =
        (survey_form.preferences(), element_by_id(page, "pref-beach"))
    {
        page.set_checked(beach, true);
        info!(selected = ?tiles.selected_values(page.document()), "preferences");
    }
    if let (Some(pills), Some(pill)) = (survey_form.budget(), element_by_id(page, "pill-moderate"))
    {
        page.click(pill);
        info!(range = ?pills.range_for("moderate"), "budget picked");
    }
    if let (Some(stepper), Some(plus)) = (survey_form.stepper(), element_by_id(page, "plus")) {
        page.click(plus);
        info!(days = stepper.value(page.document()), "duration stepped");
    }
    if let (Some(phone), Some(input)) = (survey_form.phone(), element_by_id(page, "phone")) {
        page.type_text(input, "(555) 123-4567");
        info!(valid = phone.is_valid(page.document()), "phone entered");
    }
    if let (Some(autocomplete), Some(input)) = (&autocomplete, element_by_id(page, "location")) {
        page.type_text(input, "li");
        clock.advance(config.autocomplete.debounce());
        page.tick();
        page.key_down(Some(input), Key::ArrowDown);
        page.key_down(Some(input), Key::Enter);
        let chosen = page
            .document()
            .element(input)
            .map(|element| element.value().to_string())
            .unwrap_or_default();
        info!(suggestions = autocomplete.items().len(), %chosen, "location chosen");
    }
    page.submit(survey_form.form());

    if let Some(modal) = &participant_modal {
        if let Err(err) = modal.show(page.context_mut()) {
            info!(%err, "participant form not opened");
        }
        if let Some(phone) = element_by_id(page, "form-phone") {
            page.type_text(phone, "555.987.6543");
        }
        if let Some(pill) = element_by_id(page, "form-pill-budget") {
            page.click(pill);
        }
        page.submit(modal.form().form());
        info!(
            visible = modal.is_visible(page.document()),
            error = ?modal.last_error(),
            "participant submitted"
        );
    }

    if let Some(modal) = &modal {
        modal.show(page.context_mut());
        if let Some(name) = element_by_id(page, "modal-project-name") {
            page.type_text(name, "Lisbon 2025");
        }
        if let Some(picker) = &modal_picker {
            page.click(picker.trigger());
            if let Some(cell) = picker.day_cell(today) {
                page.click(cell);
            }
        }
        if let Err(err) = modal.submit(page.context_mut()) {
            info!(%err, "project not created");
        }
    }

    println!("survey date:      {}", survey.value(page.document()));
    println!("participant open: {}", participant.is_open());
    println!("open listeners:   {}", page.context().listeners().count());
    Ok(())
}
