use crate::error::ConfigError;
use crate::upload::OrchestratorConfig;
use reqwest::Url;
use std::env;
use std::time::Duration;

pub const SERVER_URL_VAR: &str = "QUESTION_SET_SERVER_URL";
pub const TIMEOUT_VAR: &str = "QUESTION_SET_REQUEST_TIMEOUT_SECS";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_url: Url,
    pub request_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server url is valid"),
            request_timeout: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(SERVER_URL_VAR) {
            config.server_url = parse_server_url(&value)?;
        }

        if let Some(value) = lookup(TIMEOUT_VAR) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Timeout(value.clone()))?;
            // 0 means "no limit", same as leaving the variable unset
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            request_timeout: self.request_timeout,
        }
    }
}

pub fn parse_server_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::ServerUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ServerUrl {
            value: value.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_local_server_without_timeout() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            (SERVER_URL_VAR, "https://quiz.example.com"),
            (TIMEOUT_VAR, "30"),
        ])
        .unwrap();
        assert_eq!(config.server_url.host_str(), Some("quiz.example.com"));
        assert_eq!(
            config.orchestrator().request_timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn zero_timeout_disables_the_limit() {
        let config = load(&[(TIMEOUT_VAR, "0")]).unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[(TIMEOUT_VAR, "soon")]),
            Err(ConfigError::Timeout(_))
        ));
        assert!(matches!(
            load(&[(SERVER_URL_VAR, "not a url")]),
            Err(ConfigError::ServerUrl { .. })
        ));
        assert!(matches!(
            load(&[(SERVER_URL_VAR, "ftp://files.example.com")]),
            Err(ConfigError::ServerUrl { .. })
        ));
    }
}
