pub mod api;
pub mod app;
pub mod chat;
pub mod config;
pub mod enrich;
pub mod errors;
pub mod filters;
pub mod forms;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod session;
pub mod state;
pub mod stats;
pub mod ui;
pub mod views;

pub use app::router;
pub use config::Config;
pub use state::AppState;
