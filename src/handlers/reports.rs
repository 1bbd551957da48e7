use axum::extract::{Form, Query, State};
use axum::response::{Html, IntoResponse};
use serde::Deserialize;
use tracing::info;

use crate::api::{ActivityQuery, MedicationQuery};
use crate::errors::AppError;
use crate::filters::PetFilter;
use crate::forms::{ActivityForm, MedicationForm};
use crate::handlers::{confirm, form_failure, inline_message, now, PageResult};
use crate::loader;
use crate::session::Session;
use crate::state::AppState;
use crate::views::reports::{ReportsModal, ReportsPage};
use crate::views::ModalState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportsQuery {
    pub pet: Option<String>,
    pub modal: Option<String>,
}

pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReportsQuery>,
) -> PageResult {
    let filter = PetFilter::parse(query.pet.as_deref());
    let modal = match query.modal.as_deref() {
        Some("activity") => Some(ReportsModal::LogActivity(ModalState::blank())),
        Some("medication") => Some(ReportsModal::AddMedication(ModalState::blank())),
        _ => None,
    };
    Ok(Html(render(&state, &session, filter, modal).await?).into_response())
}

async fn render(
    state: &AppState,
    session: &Session,
    filter: PetFilter,
    modal: Option<ReportsModal>,
) -> Result<String, AppError> {
    let token = &session.token;
    let activities = ActivityQuery {
        limit: Some(loader::ACCOUNT_LIMIT),
        ..ActivityQuery::default()
    };
    let medications = MedicationQuery {
        active_only: Some(true),
        limit: Some(loader::ACCOUNT_LIMIT),
        ..MedicationQuery::default()
    };
    let (user, pets, activities, medications) = tokio::join!(
        loader::navbar_user(&state.api, token),
        loader::pets(&state.api, token),
        loader::activities(&state.api, token, &activities),
        loader::medications(&state.api, token, &medications),
    );
    let user = user?;
    let page = ReportsPage::build(&pets?, &activities?, &medications?, filter, now(), modal);
    Ok(page.render(user.as_ref()))
}

pub async fn log_activity(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ActivityForm>,
) -> PageResult {
    let failure = match form.payload() {
        Ok(activity) => match state.api.create_activity(&session.token, &activity).await {
            Ok(created) => {
                info!(activity_id = created.id, kind = %created.activity_type, "activity logged");
                return Ok(confirm(&state, "Activity logged successfully!", "/reports"));
            }
            Err(err) => inline_message(err)?,
        },
        Err(invalid) => invalid.to_string(),
    };
    let modal = ReportsModal::LogActivity(ModalState::failed(form, failure));
    Ok(form_failure(render(&state, &session, PetFilter::All, Some(modal)).await?))
}

pub async fn add_medication(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<MedicationForm>,
) -> PageResult {
    let failure = match form.payload(now().date()) {
        Ok(medication) => match state.api.create_medication(&session.token, &medication).await {
            Ok(created) => {
                info!(medication_id = created.id, "medication added");
                return Ok(confirm(&state, "Medication added successfully!", "/reports"));
            }
            Err(err) => inline_message(err)?,
        },
        Err(invalid) => invalid.to_string(),
    };
    let modal = ReportsModal::AddMedication(ModalState::failed(form, failure));
    Ok(form_failure(render(&state, &session, PetFilter::All, Some(modal)).await?))
}
