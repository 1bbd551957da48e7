use crate::api::ApiClient;
use crate::chat::ChatSessions;
use crate::config::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub chats: ChatSessions,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            api: ApiClient::new(config.backend_url.clone()),
            chats: ChatSessions::default(),
            config: Arc::new(config),
        }
    }
}
