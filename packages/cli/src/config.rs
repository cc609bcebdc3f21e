use comic_editor::{RemoteConfig, SessionConfig, DEFAULT_PAGE_SIZE, DEFAULT_SERVER_URL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "comic.config.json";

/// Comic client configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the comic server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,

    /// Tiles per page in the editing shell
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_notification_ttl_secs")]
    pub notification_ttl_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Raw `Cookie` header of an authenticated server session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_autosave_interval_secs() -> u64 {
    60
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_notification_ttl_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            autosave_interval: Duration::from_secs(self.autosave_interval_secs.max(1)),
            page_size: self.page_size,
            notification_ttl: Duration::from_secs(self.notification_ttl_secs),
        }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.server_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            session_cookie: self.session_cookie.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            autosave_interval_secs: default_autosave_interval_secs(),
            page_size: default_page_size(),
            notification_ttl_secs: default_notification_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            session_cookie: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "serverUrl": "https://comics.example.com",
            "autosaveIntervalSecs": 30,
            "pageSize": 4,
            "sessionCookie": "session=abc"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.server_url, "https://comics.example.com");
        assert_eq!(config.autosave_interval_secs, 30);
        assert_eq!(config.page_size, 4);
        assert_eq!(config.notification_ttl_secs, 5);
        assert_eq!(config.session_cookie, Some("session=abc".to_string()));

        let session = config.session_config();
        assert_eq!(session.autosave_interval, Duration::from_secs(30));
        assert_eq!(session.page_size, 4);

        let remote = config.remote_config();
        assert_eq!(remote.timeout, Duration::from_secs(120));
        assert_eq!(remote.session_cookie.as_deref(), Some("session=abc"));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.session_config(), SessionConfig::default());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();

        assert_eq!(Config::load(cwd).unwrap(), Config::default());

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "requestTimeoutSecs": 10 }"#,
        )
        .unwrap();
        let config = Config::load(cwd).unwrap();
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.autosave_interval_secs, 60);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ not json").unwrap();

        assert!(Config::load(dir.path().to_str().unwrap()).is_err());
    }
}
