use std::time::Duration;

use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Redirect};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::ApiError;
use crate::forms::{LoginForm, RegisterForm};
use crate::handlers::{chat, form_failure, inline_message, PageResult};
use crate::session::{self, TOKEN_COOKIE};
use crate::state::AppState;
use crate::ui;
use crate::views::auth::{LoginNotice, LoginPage, RegisterPage};

const LOGIN_REDIRECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginQuery {
    pub username: String,
    pub deleted: Option<String>,
    pub registered: Option<String>,
}

impl LoginQuery {
    fn notice(&self) -> Option<LoginNotice> {
        if self.deleted.is_some() {
            Some(LoginNotice::AccountDeleted)
        } else if self.registered.is_some() {
            Some(LoginNotice::Registered)
        } else {
            None
        }
    }
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let page = LoginPage {
        notice: query.notice(),
        username: query.username,
        error: None,
    };
    Html(page.render())
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> PageResult {
    let failure = match form.payload() {
        Ok(credentials) => match state.api.login(&credentials).await {
            Ok(token) if session::is_plausible_token(&token.access_token) => {
                info!(username = %credentials.username, "login succeeded");
                let cookie = session::token_cookie(&token.access_token, state.config.secure_cookies);
                let html = ui::confirmation_page("Login successful! Redirecting...", "/dashboard", LOGIN_REDIRECT_DELAY);
                return Ok(([(header::SET_COOKIE, cookie)], Html(html)).into_response());
            }
            Ok(_) => {
                warn!("backend issued a token that cannot be stored in a cookie");
                "Login failed. Please try again.".to_string()
            }
            Err(ApiError::Transport(err)) => {
                tracing::error!(error = %err, "backend unreachable");
                "Network error. Please try again.".to_string()
            }
            Err(err) => {
                info!(username = %credentials.username, "login rejected");
                err.user_message()
            }
        },
        Err(invalid) => invalid.to_string(),
    };
    let page = LoginPage {
        username: form.username,
        notice: None,
        error: Some(failure),
    };
    Ok(form_failure(page.render()))
}

pub async fn register_page() -> Html<String> {
    Html(RegisterPage::default().render())
}

pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> PageResult {
    let failure = match form.payload() {
        Ok(registration) => match state.api.register(&registration).await {
            Ok(user) => {
                info!(user_id = %user.id, "account registered");
                let next = format!(
                    "/login?username={}&registered=1",
                    ui::encode_component(&user.username)
                );
                let html = ui::confirmation_page(
                    "Registration successful! Please log in.",
                    &next,
                    state.config.confirm_delay,
                );
                return Ok(Html(html).into_response());
            }
            Err(err) => inline_message(err)?,
        },
        Err(invalid) => invalid.to_string(),
    };
    let page = RegisterPage {
        form,
        error: Some(failure),
    };
    Ok(form_failure(page.render()))
}

/// Works with or without a live session; the cookie is cleared either way.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session::read_cookie(&headers, TOKEN_COOKIE) {
        state.chats.clear(&chat::token_key(&token)).await;
    }
    ([(header::SET_COOKIE, session::clear_token_cookie())], Redirect::to("/login"))
}
