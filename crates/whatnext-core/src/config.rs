//! Application configuration model.
//!
//! Loaded from `config.toml` by `whatnext-infrastructure`; every field has a
//! default so a partial (or missing) file is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cards::OffsetDecay;
use crate::location::{Coordinates, NearbyQuery};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub chat: ChatConfig,
    pub cards: OffsetDecay,
    pub nearby: NearbyQuery,
}

/// Remote backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub chat_path: String,
    pub nearby_path: String,
    /// Request timeout; the transport default applies when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.whatnext.live".to_string(),
            chat_path: "/chatgpt_response".to_string(),
            nearby_path: "/nearby_locations".to_string(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.chat_path)
    }

    pub fn nearby_url(&self) -> String {
        join_url(&self.base_url, &self.nearby_path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Conversational search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub debounce_ms: u64,
    pub advisory_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            latitude: 32.88088,
            longitude: -117.23790,
            debounce_ms: 1000,
            advisory_ms: 2000,
        }
    }
}

impl ChatConfig {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn advisory_lifetime(&self) -> Duration {
        Duration::from_millis(self.advisory_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:8000/"

            [chat]
            user_id = "u-42"

            [cards]
            cap_rank = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.api.chat_url(), "http://localhost:8000/chatgpt_response");
        assert_eq!(config.api.nearby_url(), "http://localhost:8000/nearby_locations");
        assert_eq!(config.chat.user_id, "u-42");
        assert_eq!(config.chat.debounce(), Duration::from_millis(1000));
        assert_eq!(config.cards.cap_rank, 3);
        assert_eq!(config.cards.decay_factor, 0.9);
        assert_eq!(config.nearby.limit, 20);
    }

    #[test]
    fn default_round_trips_through_toml() {
        let text = toml::to_string(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
