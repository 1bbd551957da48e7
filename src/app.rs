use crate::handlers::{self, account, appointments, auth, chat, dashboard, pets, reports};
use crate::state::AppState;
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/dashboard", get(dashboard::show))
        .route("/pets-page", get(pets::list))
        .route("/pets-page/:id", get(pets::details))
        .route("/pets", post(pets::create))
        .route("/pets/:id/delete", post(pets::delete))
        .route("/pets/:id/regenerate-tips", post(pets::regenerate_tips))
        .route("/appointments", get(appointments::list).post(appointments::create))
        .route("/appointments/:id/complete", post(appointments::complete))
        .route("/appointments/:id/delete", post(appointments::delete))
        .route("/reports", get(reports::show))
        .route("/activities", post(reports::log_activity))
        .route("/medications", post(reports::add_medication))
        .route("/profile", get(account::profile).post(account::update_profile))
        .route("/profile/password", post(account::change_password))
        .route("/settings", get(account::settings).post(account::save_settings))
        .route("/settings/export", get(account::export))
        .route("/settings/delete-account", post(account::delete_account))
        .route("/chat", get(chat::show).post(chat::send))
        .route("/chat/clear", post(chat::clear))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
