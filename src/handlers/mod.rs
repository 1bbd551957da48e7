//! Request handlers, one module per page area.
//!
//! Reads follow the same cycle on every request: guard, load, build the view
//! model, render. Writes call the backend, then either show a confirmation
//! that reloads the page or re-render the page with the form still open.

pub mod account;
pub mod appointments;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod pets;
pub mod reports;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;

use crate::errors::{ApiError, AppError};
use crate::session::{self, TOKEN_COOKIE};
use crate::state::AppState;
use crate::ui;

pub type PageResult = Result<Response, AppError>;

/// Hidden `next` field on action forms.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReturnTo {
    pub next: String,
}

/// `?modal=` on pages that host dialogs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModalQuery {
    pub modal: Option<String>,
}

impl ModalQuery {
    pub fn is(&self, name: &str) -> bool {
        self.modal.as_deref() == Some(name)
    }
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Same-site path to return to; anything else falls back.
pub fn safe_next(raw: &str, fallback: &str) -> String {
    let raw = raw.trim();
    let acceptable = raw.starts_with('/')
        && !raw.starts_with("//")
        && !raw.contains('\\')
        && !raw.chars().any(char::is_control);
    if acceptable {
        raw.to_string()
    } else {
        fallback.to_string()
    }
}

/// Transient success page that reloads `next` after the configured delay.
pub fn confirm(state: &AppState, message: &str, next: &str) -> Response {
    Html(ui::confirmation_page(message, next, state.config.confirm_delay)).into_response()
}

/// The page re-rendered around a rejected form.
pub fn form_failure(html: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response()
}

/// Message to show next to a form. An expired session still redirects.
pub fn inline_message(err: ApiError) -> Result<String, AppError> {
    match err {
        ApiError::Unauthorized => Err(AppError::unauthorized()),
        ApiError::Transport(ref source) => {
            tracing::error!(error = %source, "backend unreachable");
            Ok(err.user_message())
        }
        other => Ok(other.user_message()),
    }
}

pub async fn index(headers: HeaderMap) -> Redirect {
    let signed_in = session::read_cookie(&headers, TOKEN_COOKIE)
        .is_some_and(|token| session::is_plausible_token(&token));
    if signed_in {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

pub async fn health() -> &'static str {
    "ok"
}
