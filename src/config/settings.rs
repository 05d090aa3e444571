use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Default bind address for the relay server.
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Application configuration.
///
/// Defaults are merged with an optional TOML file, then environment
/// variables override both. The upstream credentials and base URL have no
/// defaults; startup fails without them.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the upstream conversational-analytics API.
    pub api_key: String,
    /// Agent id conversations are created under.
    pub agent_id: String,
    /// Base URL of the upstream API.
    pub api_base_url: String,
    /// Base URL of the row-fetch service backing the organisation selector.
    pub row_service_url: Option<String>,
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            agent_id: String::new(),
            api_base_url: String::new(),
            row_service_url: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// TOML representation of the config file. Every field is optional;
/// missing fields keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    pub api_base_url: Option<String>,
    pub row_service_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration: defaults, then the TOML file (if given), then
    /// environment variables.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_file {
            let contents = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read config file {path:?}: {e}"))?;
            let toml_config: TomlConfig = toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {path:?}: {e}"))?;
            config.merge_toml(toml_config);
        }

        config.apply_env(|name| std::env::var(name).ok());

        Ok(config)
    }

    fn merge_toml(&mut self, toml_config: TomlConfig) {
        if let Some(api_key) = toml_config.api_key {
            self.api_key = api_key;
        }
        if let Some(agent_id) = toml_config.agent_id {
            self.agent_id = agent_id;
        }
        if let Some(api_base_url) = toml_config.api_base_url {
            self.api_base_url = api_base_url;
        }
        if toml_config.row_service_url.is_some() {
            self.row_service_url = toml_config.row_service_url;
        }
        if let Some(host) = toml_config.host {
            self.host = host;
        }
        if let Some(port) = toml_config.port {
            self.port = port;
        }
    }

    /// Apply environment overrides. `INCONVO_BASE_URL` is accepted as a
    /// legacy alias for `INCONVO_API_BASE_URL`.
    fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(api_key) = get("INCONVO_API_KEY") {
            self.api_key = api_key;
        }
        if let Some(agent_id) = get("INCONVO_AGENT_ID") {
            self.agent_id = agent_id;
        }
        if let Some(base_url) = get("INCONVO_API_BASE_URL").or_else(|| get("INCONVO_BASE_URL")) {
            self.api_base_url = base_url;
        }
        if let Some(row_url) = get("INCONVO_ROW_SERVICE_URL") {
            self.row_service_url = Some(row_url);
        }
    }

    /// Validate that the required upstream credentials are present.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("INCONVO_API_KEY is not set");
        }
        if self.agent_id.trim().is_empty() {
            anyhow::bail!("INCONVO_AGENT_ID is not set");
        }
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!("INCONVO_API_BASE_URL is not set");
        }
        Ok(())
    }
}
