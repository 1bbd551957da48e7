//! Session guard and client-side preferences, both carried in cookies.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use crate::errors::AppError;

pub const TOKEN_COOKIE: &str = "token";
pub const PREFS_COOKIE: &str = "petwell_prefs";

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

/// Bearer tokens are JWTs; anything else is refused before it reaches a header.
pub fn is_plausible_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '+' | '/' | '='))
}

pub fn token_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_token_cookie() -> String {
    format!("{TOKEN_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// A signed-in request. Extraction fails with a redirect to `/login`.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub preferences: Preferences,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = read_cookie(&parts.headers, TOKEN_COOKIE)
            .filter(|token| is_plausible_token(token))
            .ok_or_else(AppError::unauthorized)?;
        let preferences = read_cookie(&parts.headers, PREFS_COOKIE)
            .map(|raw| Preferences::decode(&raw))
            .unwrap_or_default();
        Ok(Session { token, preferences })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailLevel {
    Brief,
    #[default]
    Balanced,
    Detailed,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 3] = [DetailLevel::Brief, DetailLevel::Balanced, DetailLevel::Detailed];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "brief" => Some(DetailLevel::Brief),
            "balanced" => Some(DetailLevel::Balanced),
            "detailed" => Some(DetailLevel::Detailed),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            DetailLevel::Brief => "brief",
            DetailLevel::Balanced => "balanced",
            DetailLevel::Detailed => "detailed",
        }
    }
}

/// Settings-page toggles. They live only in the browser, like the rest of the
/// client-side settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub email_notifications: bool,
    pub appointment_reminders: bool,
    pub medication_alerts: bool,
    pub save_chat_history: bool,
    pub include_pet_context: bool,
    pub ai_detail_level: DetailLevel,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            appointment_reminders: true,
            medication_alerts: true,
            save_chat_history: false,
            include_pet_context: true,
            ai_detail_level: DetailLevel::Balanced,
        }
    }
}

impl Preferences {
    /// `email:1|appointments:1|medications:1|history:0|context:1|detail:balanced`
    pub fn encode(&self) -> String {
        let flag = |on: bool| if on { "1" } else { "0" };
        format!(
            "email:{}|appointments:{}|medications:{}|history:{}|context:{}|detail:{}",
            flag(self.email_notifications),
            flag(self.appointment_reminders),
            flag(self.medication_alerts),
            flag(self.save_chat_history),
            flag(self.include_pet_context),
            self.ai_detail_level.key(),
        )
    }

    /// Unknown keys and malformed values keep their defaults.
    pub fn decode(raw: &str) -> Self {
        let mut prefs = Self::default();
        for (key, value) in raw.split('|').filter_map(|pair| pair.split_once(':')) {
            let flag = match value {
                "1" => Some(true),
                "0" => Some(false),
                _ => None,
            };
            match (key, flag) {
                ("email", Some(on)) => prefs.email_notifications = on,
                ("appointments", Some(on)) => prefs.appointment_reminders = on,
                ("medications", Some(on)) => prefs.medication_alerts = on,
                ("history", Some(on)) => prefs.save_chat_history = on,
                ("context", Some(on)) => prefs.include_pet_context = on,
                ("detail", _) => {
                    if let Some(level) = DetailLevel::parse(value) {
                        prefs.ai_detail_level = level;
                    }
                }
                _ => {}
            }
        }
        prefs
    }

    pub fn cookie(&self, secure: bool) -> String {
        let mut cookie = format!(
            "{PREFS_COOKIE}={}; Path=/; Max-Age=31536000; SameSite=Lax",
            self.encode()
        );
        if secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn read_cookie_finds_named_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; other=1"),
        );
        assert_eq!(read_cookie(&headers, "token").as_deref(), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn implausible_tokens_are_refused() {
        assert!(is_plausible_token("eyJhbGciOi.eyJzdWIiOi.sig-_"));
        assert!(!is_plausible_token(""));
        assert!(!is_plausible_token("abc\r\nSet-Cookie: x"));
        assert!(!is_plausible_token("a b"));
    }

    #[test]
    fn preferences_survive_encoding() {
        let prefs = Preferences {
            email_notifications: false,
            save_chat_history: true,
            ai_detail_level: DetailLevel::Detailed,
            ..Preferences::default()
        };
        assert_eq!(Preferences::decode(&prefs.encode()), prefs);
    }

    #[test]
    fn malformed_preferences_keep_defaults() {
        let prefs = Preferences::decode("email:maybe|detail:verbose|junk");
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn token_cookie_flags() {
        assert_eq!(token_cookie("t", false), "token=t; Path=/; HttpOnly; SameSite=Lax");
        assert!(token_cookie("t", true).ends_with("; Secure"));
    }
}
