//! Typed client for the PetWell REST backend.
//!
//! Every authenticated call carries `Authorization: Bearer <token>`. A 401 on an
//! authenticated call becomes [`ApiError::Unauthorized`]; any other non-2xx becomes
//! [`ApiError::Rejected`] with the server's message. Nothing is retried.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::ApiError;
use crate::models::{
    Activity, ChatReply, ChatRequest, Credentials, Medication, NewActivity, NewMedication,
    NewPet, NewReminder, PasswordChange, Pet, PetId, ProfileUpdate, Registration, Reminder,
    ReminderUpdate, TokenResponse, User,
};

pub type ApiResult<T> = Result<T, ApiError>;

const NO_QUERY: [(&str, &str); 0] = [];

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ActivityQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<PetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MedicationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<PetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReminderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent(concat!("petwell-web/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn authed(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.request(method, path).bearer_auth(token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &impl Serialize,
    ) -> ApiResult<T> {
        debug!(path, "GET");
        let response = self.authed(Method::GET, path, token).query(query).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        token: &str,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        debug!(%method, path, "send");
        let response = self.authed(method, path, token).json(body).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// For endpoints whose success body is empty or irrelevant (DELETE, 204).
    async fn send_discard(&self, method: Method, token: &str, path: &str) -> ApiResult<()> {
        debug!(%method, path, "send");
        let response = self.authed(method, path, token).send().await?;
        check(response).await?;
        Ok(())
    }

    // Users

    pub async fn current_user(&self, token: &str) -> ApiResult<User> {
        self.get_json(token, "/users/me", &NO_QUERY).await
    }

    pub async fn register(&self, registration: &Registration) -> ApiResult<User> {
        let response = self
            .request(Method::POST, "/users/register")
            .json(registration)
            .send()
            .await?;
        Ok(check_anonymous(response).await?.json().await?)
    }

    /// Credentials go form-encoded; a 401 here is a bad password, not an expired session.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        let response = self
            .request(Method::POST, "/users/login")
            .form(credentials)
            .send()
            .await?;
        Ok(check_anonymous(response).await?.json().await?)
    }

    pub async fn change_password(&self, token: &str, change: &PasswordChange) -> ApiResult<()> {
        let response = self
            .authed(Method::POST, "/users/change-password", token)
            .json(change)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> ApiResult<User> {
        self.send_json(Method::PUT, token, "/users/me", update).await
    }

    pub async fn delete_account(&self, token: &str) -> ApiResult<()> {
        self.send_discard(Method::DELETE, token, "/users/me").await
    }

    // Pets

    pub async fn list_pets(&self, token: &str) -> ApiResult<Vec<Pet>> {
        self.get_json(token, "/pets", &NO_QUERY).await
    }

    pub async fn get_pet(&self, token: &str, id: PetId) -> ApiResult<Pet> {
        self.get_json(token, &format!("/pets/{id}"), &NO_QUERY).await
    }

    pub async fn create_pet(&self, token: &str, pet: &NewPet) -> ApiResult<Pet> {
        self.send_json(Method::POST, token, "/pets", pet).await
    }

    pub async fn delete_pet(&self, token: &str, id: PetId) -> ApiResult<()> {
        self.send_discard(Method::DELETE, token, &format!("/pets/{id}")).await
    }

    pub async fn regenerate_tips(&self, token: &str, id: PetId) -> ApiResult<Pet> {
        let path = format!("/pets/{id}/regenerate-tips");
        debug!(path = %path, "POST");
        let response = self.authed(Method::POST, &path, token).send().await?;
        Ok(check(response).await?.json().await?)
    }

    // Activities

    pub async fn list_activities(&self, token: &str, query: &ActivityQuery) -> ApiResult<Vec<Activity>> {
        self.get_json(token, "/activities", query).await
    }

    pub async fn create_activity(&self, token: &str, activity: &NewActivity) -> ApiResult<Activity> {
        self.send_json(Method::POST, token, "/activities", activity).await
    }

    // Medications

    pub async fn list_medications(
        &self,
        token: &str,
        query: &MedicationQuery,
    ) -> ApiResult<Vec<Medication>> {
        self.get_json(token, "/medications", query).await
    }

    pub async fn create_medication(
        &self,
        token: &str,
        medication: &NewMedication,
    ) -> ApiResult<Medication> {
        self.send_json(Method::POST, token, "/medications", medication).await
    }

    // Reminders

    pub async fn list_reminders(&self, token: &str, query: &ReminderQuery) -> ApiResult<Vec<Reminder>> {
        self.get_json(token, "/reminders", query).await
    }

    pub async fn create_reminder(&self, token: &str, reminder: &NewReminder) -> ApiResult<Reminder> {
        self.send_json(Method::POST, token, "/reminders", reminder).await
    }

    pub async fn update_reminder(
        &self,
        token: &str,
        id: i64,
        update: &ReminderUpdate,
    ) -> ApiResult<Reminder> {
        self.send_json(Method::PUT, token, &format!("/reminders/{id}"), update)
            .await
    }

    pub async fn delete_reminder(&self, token: &str, id: i64) -> ApiResult<()> {
        self.send_discard(Method::DELETE, token, &format!("/reminders/{id}"))
            .await
    }

    // Chat

    pub async fn vet_chat(&self, token: &str, request: &ChatRequest) -> ApiResult<ChatReply> {
        self.send_json(Method::POST, token, "/chat/vet", request).await
    }
}

async fn check(response: Response) -> ApiResult<Response> {
    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    check_anonymous(response).await
}

async fn check_anonymous(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Rejected {
        status,
        message: error_message(status, &body),
    })
}

/// Pulls the human-readable message out of an error body.
///
/// The backend answers `{"error": "..."}` from its own handlers and
/// `{"detail": ...}` from framework validation, where `detail` may be a list
/// of `{"msg": ...}` entries.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = || format!("Request failed ({})", status.as_u16());
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };

    for key in ["error", "detail"] {
        match value.get(key) {
            Some(serde_json::Value::String(message)) if !message.is_empty() => {
                return message.clone();
            }
            Some(serde_json::Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }
    fallback()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_error_then_detail() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error": "name: too short"}"#),
            "name: too short"
        );
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, r#"{"detail": "Please verify your email"}"#),
            "Please verify your email"
        );
    }

    #[test]
    fn error_message_joins_validation_lists() {
        let body = r#"{"detail": [{"loc": ["body", "age"], "msg": "too old"},
                                  {"loc": ["body", "name"], "msg": "required"}]}"#;
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, body),
            "too old; required"
        );
    }

    #[test]
    fn error_message_falls_back_on_unreadable_bodies() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "Request failed (502)"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error": ""}"#),
            "Request failed (400)"
        );
    }

    #[test]
    fn queries_skip_unset_parameters() {
        let query = MedicationQuery {
            active_only: Some(true),
            pet_id: None,
            limit: Some(1000),
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, serde_json::json!({"active_only": true, "limit": 1000}));
    }
}
