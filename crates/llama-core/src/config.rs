//! Configuration management for the admin client

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the API base URL
pub const API_URL_ENV: &str = "LLAMA_API_URL";

/// Fixed storage key under which the session is persisted
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,

    /// Session persistence configuration
    pub session: SessionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, without the `/api` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the local storage file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    /// Key the session is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_storage_key() -> String {
    SESSION_STORAGE_KEY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl ApiConfig {
    /// Root of every REST endpoint (`<base_url>/api`)
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}/api", self.base_url.trim_end_matches('/'))
    }
}

impl SessionConfig {
    /// Directory the local storage file lives in
    ///
    /// Falls back to the platform data directory, then to `./.llama-admin`.
    #[must_use]
    pub fn resolved_storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("pe", "llama-matematica", "llama-admin").map_or_else(
                || PathBuf::from(".llama-admin"),
                |dirs| dirs.data_dir().to_path_buf(),
            )
        })
    }
}

impl Config {
    /// Load configuration from the optional `llama-admin` file and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration from an explicit file and/or environment map
    ///
    /// `env` replaces the process environment when given. Variables use the
    /// `LLAMA_` prefix with `__` between nested keys (`LLAMA_API__REQUEST_TIMEOUT_SECS`);
    /// `LLAMA_API_URL` overrides the base URL directly.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or the merged result does not deserialize.
    pub fn load_with(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> crate::Result<Self> {
        let api_url = env.as_ref().map_or_else(
            || std::env::var(API_URL_ENV).ok(),
            |vars| vars.get(API_URL_ENV).cloned(),
        );

        let file_source = file.map_or_else(
            || config::File::with_name("llama-admin").required(false),
            |path| config::File::from(path).required(true),
        );

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("LLAMA")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .set_override_option("api.base_url", api_url)?
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        tracing::debug!(base_url = %loaded.api.base_url, "configuration loaded");
        Ok(loaded)
    }

    /// Check the values that would make every request fail
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unusable base URL or timeout.
    pub fn validate(&self) -> crate::Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(crate::Error::configuration(format!(
                "api.base_url must be an http(s) URL, got '{url}'"
            )));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(crate::Error::configuration(
                "api.request_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: default_base_url(),
                request_timeout_secs: default_request_timeout(),
            },
            session: SessionConfig {
                storage_dir: None,
                storage_key: default_storage_key(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.session.storage_key, "auth-storage");
        assert!(config.session.storage_dir.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_api_root_appends_api_segment() {
        let mut config = Config::default();
        assert_eq!(config.api.api_root(), "http://localhost:3000/api");

        config.api.base_url = "https://llama.example.com/".to_string();
        assert_eq!(config.api.api_root(), "https://llama.example.com/api");
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        let config = Config::load_with(None, Some(HashMap::new())).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_api_url_variable_overrides_base_url() {
        let config = Config::load_with(
            None,
            Some(env(&[("LLAMA_API_URL", "https://backend.onrender.com")])),
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://backend.onrender.com");
        assert_eq!(config.api.api_root(), "https://backend.onrender.com/api");
    }

    #[test]
    fn test_nested_environment_keys() {
        let config = Config::load_with(
            None,
            Some(env(&[
                ("LLAMA_API__REQUEST_TIMEOUT_SECS", "5"),
                ("LLAMA_LOGGING__FORMAT", "json"),
            ])),
        )
        .unwrap();

        assert_eq!(config.api.request_timeout_secs, 5);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://10.0.0.5:4000\"\n\n[session]\nstorage_dir = \"/tmp/llama\""
        )
        .unwrap();

        let config = Config::load_with(Some(file.path()), Some(HashMap::new())).unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.5:4000");
        assert_eq!(
            config.session.resolved_storage_dir(),
            PathBuf::from("/tmp/llama")
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = Config::load_with(None, Some(env(&[("LLAMA_API_URL", "localhost:3000")])));
        assert!(matches!(
            result,
            Err(crate::Error::Configuration { .. })
        ));
    }
}
