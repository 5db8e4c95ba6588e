//! Application configuration, read from `graph-explorer.toml`.
//!
//! Every field has a default so an absent file yields a working setup.
//! Unknown keys are rejected so typos surface at startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_CONFIG_PATH: &str = "GRAPH_EXPLORER_CONFIG";
pub const ENV_CLIENT_ID: &str = "GRAPH_EXPLORER_CLIENT_ID";

const DEFAULT_CONFIG_FILE: &str = "graph-explorer.toml";
const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com";
const DEFAULT_DEVX_API_URL: &str = "https://graphexplorerapi.azurewebsites.net";
const DEFAULT_COPILOT_ENDPOINT: &str = "http://127.0.0.1:8000/copilot/queries";
const DEFAULT_DATA_DIR: &str = ".graph-explorer";
const DEFAULT_EXPORT_DIR: &str = "exports";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CLIENT_ID: &str = "4232cb55-076a-47ff-946c-59093148f5e3";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    #[serde(default = "default_devx_api_url")]
    pub devx_api_url: String,
    #[serde(default = "default_copilot_endpoint")]
    pub copilot_endpoint: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default)]
    pub cache_location: CacheLocation,
}

/// Whether the signed-in token is kept in the local store for the next
/// session or dropped when the app closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheLocation {
    #[default]
    LocalStore,
    Session,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            cache_location: CacheLocation::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            graph_url: default_graph_url(),
            devx_api_url: default_devx_api_url(),
            copilot_endpoint: default_copilot_endpoint(),
            data_dir: default_data_dir(),
            export_dir: default_export_dir(),
            request_timeout_secs: default_request_timeout_secs(),
            auth: AuthConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn samples_url(&self) -> String {
        format!("{}/samples", self.devx_api_url.trim_end_matches('/'))
    }

    pub fn export_path(&self) -> PathBuf {
        if self.export_dir.is_absolute() {
            self.export_dir.clone()
        } else {
            self.data_dir.join(&self.export_dir)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("graph_url", &self.graph_url),
            ("devx_api_url", &self.devx_api_url),
            ("copilot_endpoint", &self.copilot_endpoint),
        ] {
            reqwest::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{field} `{value}` is not a URL: {e}")))?;
        }
        if self.auth.client_id.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.client_id cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Load the configuration using `env` for variable lookups.
///
/// The file comes from `GRAPH_EXPLORER_CONFIG` or `./graph-explorer.toml`;
/// a missing default file yields defaults. `GRAPH_EXPLORER_CLIENT_ID`
/// overrides the configured client id.
pub fn load<F>(env: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let explicit = env(ENV_CONFIG_PATH)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from);

    let mut config = match explicit {
        Some(path) => load_from_path(&path)?,
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if path.exists() {
                load_from_path(&path)?
            } else {
                AppConfig::default()
            }
        }
    };

    if let Some(client_id) = env(ENV_CLIENT_ID).filter(|value| !value.trim().is_empty()) {
        config.auth.client_id = client_id.trim().to_string();
    }

    Ok(config)
}

pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    load(|key| std::env::var(key).ok())
}

pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::from_toml_str(&raw, path)
}

fn default_graph_url() -> String {
    DEFAULT_GRAPH_URL.to_string()
}

fn default_devx_api_url() -> String {
    DEFAULT_DEVX_API_URL.to_string()
}

fn default_copilot_endpoint() -> String {
    DEFAULT_COPILOT_ENDPOINT.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_DIR)
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::from_toml_str("", Path::new("test.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.auth.cache_location, CacheLocation::LocalStore);
    }

    #[test]
    fn parses_overrides() {
        let raw = r#"
            graph_url = "https://graph.microsoft.us"
            request_timeout_secs = 5

            [auth]
            client_id = "abc"
            cache_location = "session"
        "#;
        let config = AppConfig::from_toml_str(raw, Path::new("test.toml")).unwrap();
        assert_eq!(config.graph_url, "https://graph.microsoft.us");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.auth.client_id, "abc");
        assert_eq!(config.auth.cache_location, CacheLocation::Session);
        assert_eq!(config.devx_api_url, DEFAULT_DEVX_API_URL);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = AppConfig::from_toml_str("graph_ur = \"typo\"", Path::new("test.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        let nested = AppConfig::from_toml_str("[auth]\nclientId = \"x\"", Path::new("test.toml"));
        assert!(matches!(nested, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn rejects_invalid_urls() {
        let result = AppConfig::from_toml_str("copilot_endpoint = \"not a url\"", Path::new("test.toml"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn loads_explicit_path_and_client_id_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "devx_api_url = \"http://localhost:9000\"\n").unwrap();

        let config = load(env_from(&[
            (ENV_CONFIG_PATH, path.to_str().unwrap()),
            (ENV_CLIENT_ID, " my-client "),
        ]))
        .unwrap();
        assert_eq!(config.devx_api_url, "http://localhost:9000");
        assert_eq!(config.samples_url(), "http://localhost:9000/samples");
        assert_eq!(config.auth.client_id, "my-client");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load(env_from(&[(ENV_CONFIG_PATH, "/definitely/not/here.toml")]));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn relative_export_dir_lives_under_data_dir() {
        let config = AppConfig::default();
        assert_eq!(config.export_path(), PathBuf::from(".graph-explorer/exports"));
    }
}
