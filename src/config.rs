use std::env;
use std::time::Duration;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CONFIRM_DELAY_SECS: u64 = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the PetWell REST backend, without a trailing slash.
    pub backend_url: String,
    /// How long a success confirmation stays up before the page reloads.
    pub confirm_delay: Duration,
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            confirm_delay: Duration::from_secs(DEFAULT_CONFIRM_DELAY_SECS),
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Reads the process environment; a `.env` file is loaded first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let backend_url = lookup("PETWELL_BACKEND_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.backend_url);
        let confirm_delay = lookup("PETWELL_CONFIRM_DELAY_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.confirm_delay);
        let secure_cookies = lookup("PETWELL_SECURE_COOKIES")
            .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
            .unwrap_or(defaults.secure_cookies);

        Self {
            port,
            backend_url,
            confirm_delay,
            secure_cookies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend_url, "http://127.0.0.1:8000");
        assert_eq!(config.confirm_delay, Duration::from_secs(2));
        assert!(!config.secure_cookies);
    }

    #[test]
    fn overrides_are_parsed_and_trailing_slash_dropped() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9090"),
            ("PETWELL_BACKEND_URL", "http://api.local:8000/"),
            ("PETWELL_CONFIRM_DELAY_SECS", "0"),
            ("PETWELL_SECURE_COOKIES", "true"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.backend_url, "http://api.local:8000");
        assert_eq!(config.confirm_delay, Duration::ZERO);
        assert!(config.secure_cookies);
    }

    #[test]
    fn garbage_values_fall_back() {
        let config = Config::from_lookup(lookup(&[("PORT", "eighty"), ("PETWELL_CONFIRM_DELAY_SECS", "-1")]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.confirm_delay, Duration::from_secs(2));
    }
}
