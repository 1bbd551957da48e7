use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;

use crate::session;
use crate::ui;

/// Failures talking to the PetWell backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, expired or rejected bearer token.
    #[error("not authenticated")]
    Unauthorized,

    /// Non-2xx answer; `message` is the server's own wording when it sent one.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Text safe to show inline next to a form.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Transport(_) => "Network error. Please try again.".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Rejected { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "not authenticated".to_string(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Self::unauthorized(),
            ApiError::Rejected { status, message } => Self { status, message },
            ApiError::Transport(err) => {
                tracing::error!(error = %err, "backend unreachable");
                Self {
                    status: StatusCode::BAD_GATEWAY,
                    message: "Unable to reach the PetWell service. Please try again.".to_string(),
                }
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::UNAUTHORIZED {
            return (
                [(header::SET_COOKIE, session::clear_token_cookie())],
                Redirect::to("/login"),
            )
                .into_response();
        }
        (self.status, Html(ui::render_error_page(self.status, &self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_redirects_to_login_and_clears_cookie() {
        let response = AppError::unauthorized().into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("token=;"));
    }

    #[test]
    fn rejected_keeps_backend_status_and_message() {
        let err: AppError = ApiError::Rejected {
            status: StatusCode::NOT_FOUND,
            message: "Pet not found".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Pet not found");
    }
}
