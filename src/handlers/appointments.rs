use axum::extract::{Form, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect};
use serde::Deserialize;
use tracing::info;

use crate::api::ReminderQuery;
use crate::errors::AppError;
use crate::filters::{appointments_only, AppointmentFilter};
use crate::forms::AppointmentForm;
use crate::handlers::{confirm, form_failure, inline_message, now, safe_next, PageResult, ReturnTo};
use crate::loader::{self, Collection};
use crate::models::ReminderUpdate;
use crate::session::Session;
use crate::state::AppState;
use crate::views::appointments::AppointmentsPage;
use crate::views::ModalState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppointmentsQuery {
    pub filter: String,
    pub modal: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<AppointmentsQuery>,
) -> PageResult {
    let filter = AppointmentFilter::parse(&query.filter);
    let add = (query.modal.as_deref() == Some("add")).then(ModalState::blank);
    Ok(Html(render(&state, &session, filter, add).await?).into_response())
}

async fn render(
    state: &AppState,
    session: &Session,
    filter: AppointmentFilter,
    add: Option<ModalState<AppointmentForm>>,
) -> Result<String, AppError> {
    let open = ReminderQuery {
        completed: Some(false),
    };
    let (user, reminders, pets) = tokio::join!(
        loader::navbar_user(&state.api, &session.token),
        loader::reminders(&state.api, &session.token, &open),
        loader::pets(&state.api, &session.token),
    );
    let (user, reminders, pets) = (user?, reminders?, pets?);
    let appointments = Collection {
        items: appointments_only(reminders.items),
        failed: reminders.failed,
    };
    let page = AppointmentsPage::build(&appointments, &pets, filter, now(), add);
    Ok(page.render(user.as_ref()))
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AppointmentForm>,
) -> PageResult {
    let failure = match form.payload() {
        Ok(reminder) => match state.api.create_reminder(&session.token, &reminder).await {
            Ok(created) => {
                info!(reminder_id = created.id, "appointment scheduled");
                return Ok(confirm(&state, "Appointment scheduled successfully!", "/appointments"));
            }
            Err(err) => inline_message(err)?,
        },
        Err(invalid) => invalid.to_string(),
    };
    let modal = Some(ModalState::failed(form, failure));
    Ok(form_failure(render(&state, &session, AppointmentFilter::All, modal).await?))
}

pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(back): Form<ReturnTo>,
) -> PageResult {
    let update = ReminderUpdate {
        is_completed: Some(true),
    };
    state.api.update_reminder(&session.token, id, &update).await?;
    info!(reminder_id = id, "appointment completed");
    Ok(Redirect::to(&safe_next(&back.next, "/appointments")).into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(back): Form<ReturnTo>,
) -> PageResult {
    state.api.delete_reminder(&session.token, id).await?;
    info!(reminder_id = id, "appointment deleted");
    Ok(Redirect::to(&safe_next(&back.next, "/appointments")).into_response())
}
