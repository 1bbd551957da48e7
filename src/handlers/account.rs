use axum::extract::{Form, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::info;

use crate::api::{MedicationQuery, ReminderQuery};
use crate::errors::AppError;
use crate::forms::{PasswordForm, PreferencesForm, ProfileForm};
use crate::handlers::{chat, confirm, form_failure, inline_message, PageResult};
use crate::loader::{self, SnapshotQuery};
use crate::models::DataExport;
use crate::session::{self, Session};
use crate::state::AppState;
use crate::views::account::{AccountCounts, ProfilePage, SettingsPage};
use crate::views::ModalState;

pub async fn profile(State(state): State<AppState>, session: Session) -> PageResult {
    let page = profile_page(&state, &session).await?;
    Ok(Html(page.render()).into_response())
}

/// The profile page needs the account itself; without it there is nothing to edit.
async fn profile_page(state: &AppState, session: &Session) -> Result<ProfilePage, AppError> {
    let whole = SnapshotQuery::whole_account();
    let counts_query = SnapshotQuery {
        medications: MedicationQuery {
            active_only: Some(true),
            ..whole.medications
        },
        reminders: ReminderQuery {
            completed: Some(false),
        },
        activities: whole.activities,
    };
    let (user, snapshot) = tokio::join!(
        state.api.current_user(&session.token),
        loader::snapshot(&state.api, &session.token, &counts_query),
    );
    Ok(ProfilePage::new(user?, AccountCounts::from_snapshot(&snapshot?)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> PageResult {
    let failure = match form.payload() {
        Ok(update) => match state.api.update_profile(&session.token, &update).await {
            Ok(user) => {
                info!(user_id = %user.id, "profile updated");
                return Ok(confirm(&state, "Profile updated successfully!", "/profile"));
            }
            Err(err) => inline_message(err)?,
        },
        Err(invalid) => invalid.to_string(),
    };
    let mut page = profile_page(&state, &session).await?;
    let values = ProfileForm {
        password: String::new(),
        ..form
    };
    page.edit = ModalState::failed(values, failure);
    Ok(form_failure(page.render()))
}

pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PasswordForm>,
) -> PageResult {
    let failure = match form.payload() {
        Ok(change) => match state.api.change_password(&session.token, &change).await {
            Ok(()) => {
                info!("password changed");
                return Ok(confirm(&state, "Password changed successfully!", "/profile"));
            }
            Err(err) => inline_message(err)?,
        },
        Err(invalid) => invalid.to_string(),
    };
    let mut page = profile_page(&state, &session).await?;
    page.password_error = Some(failure);
    Ok(form_failure(page.render()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsQuery {
    pub saved: Option<String>,
    pub modal: Option<String>,
}

pub async fn settings(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SettingsQuery>,
) -> PageResult {
    let page = SettingsPage {
        preferences: session.preferences,
        saved: query.saved.is_some(),
        delete_account: (query.modal.as_deref() == Some("delete-account")).then(ModalState::blank),
    };
    let user = loader::navbar_user(&state.api, &session.token).await?;
    Ok(Html(page.render(user.as_ref())).into_response())
}

pub async fn save_settings(
    State(state): State<AppState>,
    _session: Session,
    Form(form): Form<PreferencesForm>,
) -> PageResult {
    let preferences = form.preferences();
    let cookie = preferences.cookie(state.config.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/settings?saved=1")).into_response())
}

/// Streams every record of the account back as a pretty-printed JSON download.
pub async fn export(State(state): State<AppState>, session: Session) -> PageResult {
    let snapshot = loader::snapshot(&state.api, &session.token, &SnapshotQuery::whole_account()).await?;
    let now = Utc::now();
    let export = DataExport {
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        pets: snapshot.pets.items,
        activities: snapshot.activities.items,
        medications: snapshot.medications.items,
        reminders: snapshot.reminders.items,
    };
    let body = serde_json::to_string_pretty(&export)?;
    let disposition = format!(
        "attachment; filename=\"petwell-data-export-{}.json\"",
        now.format("%Y-%m-%d")
    );
    info!(pets = export.pets.len(), "data exported");
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteAccountForm {
    pub confirm: String,
}

pub async fn delete_account(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DeleteAccountForm>,
) -> PageResult {
    let user = loader::navbar_user(&state.api, &session.token).await?;
    let failure = if form.confirm != "yes" {
        "Please confirm that you want to delete your account".to_string()
    } else {
        match state.api.delete_account(&session.token).await {
            Ok(()) => {
                info!(user_id = user.as_ref().map_or("", |user| user.id.as_str()), "account deleted");
                chat::forget(&state, &session, user.as_ref()).await;
                return Ok((
                    [(header::SET_COOKIE, session::clear_token_cookie())],
                    Redirect::to("/login?deleted=true"),
                )
                    .into_response());
            }
            Err(err) => inline_message(err)?,
        }
    };
    let page = SettingsPage {
        preferences: session.preferences,
        saved: false,
        delete_account: Some(ModalState::failed((), failure)),
    };
    Ok(form_failure(page.render(user.as_ref())))
}
