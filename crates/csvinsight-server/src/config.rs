use csvinsight_ai::providers::openrouter::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use csvinsight_ai::OpenRouterConfig;
use csvinsight_storage::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV: &str = "OPENROUTER_MODEL";
pub const HTTP_PORT_ENV: &str = "HTTP_PORT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            database: DatabaseConfig::default(),
            ai: AiConfig::default(),
            reports: ReportsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Usually supplied through `OPENROUTER_API_KEY` instead of the file.
    #[serde(default)]
    pub api_key: Option<String>,
    /// `openrouter/auto` when unset
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default = "default_ai_title")]
    pub title: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            base_url: default_ai_base_url(),
            timeout_secs: default_ai_timeout_secs(),
            referer: None,
            title: default_ai_title(),
        }
    }
}

impl AiConfig {
    pub fn provider_config(&self) -> OpenRouterConfig {
        OpenRouterConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: Some(self.base_url.clone()),
            timeout_secs: Some(self.timeout_secs),
            referer: self.referer.clone(),
            title: self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Number of reports returned by `GET /reports`
    #[serde(default = "default_list_limit")]
    pub list_limit: u64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

fn default_http_port() -> u16 {
    8080
}

fn default_ai_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_ai_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_ai_title() -> Option<String> {
    Some("CSV Insights Dashboard".to_string())
}

fn default_list_limit() -> u64 {
    5
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    /// The environment is always applied on top.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::load(path)?
        } else {
            tracing::info!(path, "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlays environment values onto the file configuration. Empty values
    /// count as unset.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(DATABASE_URL_ENV) {
            self.database.url = Some(url);
        }
        if let Some(key) = get(API_KEY_ENV) {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = get(MODEL_ENV) {
            self.ai.model = Some(model);
        }
        if let Some(port) = get(HTTP_PORT_ENV) {
            match port.parse() {
                Ok(port) => self.http_port = port,
                Err(e) => tracing::warn!(value = %port, error = %e, "Ignoring invalid HTTP_PORT"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_toml_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database.url, None);
        assert_eq!(config.ai.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.ai.timeout_secs, 120);
        assert_eq!(config.reports.list_limit, 5);
    }

    #[test]
    fn toml_sections_are_read() {
        let config: ServerConfig = toml::from_str(
            r#"
            http_port = 3000

            [database]
            url = "sqlite://data/reports.db"
            max_connections = 4

            [ai]
            model = "openai/gpt-4o-mini"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.database.url.as_deref(), Some("sqlite://data/reports.db"));
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.ai.model.as_deref(), Some("openai/gpt-4o-mini"));
        assert_eq!(config.ai.timeout_secs, 30);
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://u:p@localhost/insights"),
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_MODEL", ""),
            ("HTTP_PORT", "9000"),
        ]);
        let mut config = ServerConfig::default();
        config.ai.model = Some("from-file".to_string());
        config.apply_env_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://u:p@localhost/insights")
        );
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        // empty env values do not clobber the file
        assert_eq!(config.ai.model.as_deref(), Some("from-file"));
        assert_eq!(config.http_port, 9000);
    }

    #[test]
    fn invalid_port_is_ignored() {
        let mut config = ServerConfig::default();
        config.apply_env_from(|k| (k == "HTTP_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn provider_config_carries_ai_section() {
        let ai = AiConfig {
            api_key: Some("k".to_string()),
            ..AiConfig::default()
        };
        let provider = ai.provider_config();
        assert_eq!(provider.api_key.as_deref(), Some("k"));
        assert_eq!(provider.timeout_secs, Some(120));
        assert_eq!(provider.title.as_deref(), Some("CSV Insights Dashboard"));
    }
}
