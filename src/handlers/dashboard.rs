use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};

use crate::api::ReminderQuery;
use crate::errors::AppError;
use crate::forms::PetForm;
use crate::handlers::{now, ModalQuery, PageResult};
use crate::loader;
use crate::session::Session;
use crate::state::AppState;
use crate::views::dashboard::DashboardPage;
use crate::views::ModalState;

pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ModalQuery>,
) -> PageResult {
    let add_pet = query.is("add-pet").then(ModalState::blank);
    Ok(Html(render(&state, &session, add_pet).await?).into_response())
}

pub(crate) async fn render(
    state: &AppState,
    session: &Session,
    add_pet: Option<ModalState<PetForm>>,
) -> Result<String, AppError> {
    let open = ReminderQuery {
        completed: Some(false),
    };
    let (user, pets, reminders) = tokio::join!(
        loader::navbar_user(&state.api, &session.token),
        loader::pets(&state.api, &session.token),
        loader::reminders(&state.api, &session.token, &open),
    );
    let user = user?;
    let page = DashboardPage::build(user.as_ref(), &pets?, &reminders?, now(), add_pet);
    Ok(page.render(user.as_ref()))
}
