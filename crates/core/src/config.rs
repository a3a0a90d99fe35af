use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::types::{BackendKind, QuotaPolicy};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub google_api: GoogleApiConfig,
    #[serde(default)]
    pub hunt: HuntConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GoogleApiConfig {
    pub api_key: Option<String>,
    pub cse_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HuntConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub page_delay_ms: u64,
    #[serde(default = "default_query_delay_ms")]
    pub query_delay_ms: u64,
    #[serde(default)]
    pub quota_policy: QuotaPolicy,
    #[serde(default = "default_quota_pause_secs")]
    pub quota_pause_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_limit() -> u32 { 100 }
fn default_query_delay_ms() -> u64 { 1000 }
fn default_quota_pause_secs() -> u64 { 60 }
fn default_request_timeout_secs() -> u64 { 30 }

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            limit: default_limit(),
            page_delay_ms: 0,
            query_delay_ms: default_query_delay_ms(),
            quota_policy: QuotaPolicy::default(),
            quota_pause_secs: default_quota_pause_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HuntConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }

    pub fn quota_pause(&self) -> Duration {
        Duration::from_secs(self.quota_pause_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// API key and search engine id, both present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub cse_id: String,
}

impl GoogleApiConfig {
    /// Overlay non-empty values from a higher-priority source.
    pub fn merge(&mut self, api_key: Option<String>, cse_id: Option<String>) {
        if let Some(key) = non_empty(api_key) {
            self.api_key = Some(key);
        }
        if let Some(id) = non_empty(cse_id) {
            self.cse_id = Some(id);
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        match (non_empty(self.api_key.clone()), non_empty(self.cse_id.clone())) {
            (Some(api_key), Some(cse_id)) => Ok(Credentials { api_key, cse_id }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Values from one layer above the config file: the environment or the
/// command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub cse_id: Option<String>,
    pub backend: Option<BackendKind>,
    pub quota_policy: Option<QuotaPolicy>,
    pub limit: Option<u32>,
}

impl ConfigOverrides {
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Read `GOOGLE_API_KEY`, `GOOGLE_CSE_ID` and `DORKHUNTER_BACKEND` through
    /// `lookup`. An unknown backend name is logged and ignored.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend = lookup("DORKHUNTER_BACKEND").and_then(|v| match v.parse::<BackendKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!(value = %v, "ignoring DORKHUNTER_BACKEND: {}", e);
                None
            }
        });

        Self {
            api_key: lookup("GOOGLE_API_KEY"),
            cse_id: lookup("GOOGLE_CSE_ID"),
            backend,
            ..Default::default()
        }
    }
}

enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

impl AppConfig {
    /// Load from disk. A missing file yields defaults; a malformed or invalid
    /// one is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Self::parse(&content, path)
    }

    /// Layer the environment, then the command line, over the loaded file and
    /// check the result.
    pub fn apply_overrides(
        &mut self,
        env: ConfigOverrides,
        flags: ConfigOverrides,
    ) -> Result<(), ConfigError> {
        self.overlay(env);
        self.overlay(flags);
        self.validate()
    }

    fn overlay(&mut self, layer: ConfigOverrides) {
        self.google_api.merge(layer.api_key, layer.cse_id);
        if let Some(kind) = layer.backend {
            self.hunt.backend = kind;
        }
        if let Some(policy) = layer.quota_policy {
            self.hunt.quota_policy = policy;
        }
        if let Some(limit) = layer.limit {
            self.hunt.limit = limit;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hunt.limit == 0 {
            return Err(ConfigError::Invalid {
                field: "hunt.limit",
                value: self.hunt.limit.to_string(),
            });
        }
        Ok(())
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let config: Self = match ConfigFormat::from_path(path) {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }
}
