//! Service configuration: listen address, generation provider, log level

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Gemini `generateContent` endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent";

/// Environment variable that overrides `provider.api_key`.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Values that look like a key but are template leftovers.
const PLACEHOLDER_PATTERNS: &[&str] = &["your-gemini-api-key-here", "your-api-key", "changeme"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Generation provider settings.
///
/// A missing or placeholder key is not an error: generation then runs in
/// fallback mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub endpoint: String,
    /// Bound on a single provider call, in seconds
    pub timeout_secs: u64,
    pub temperature: f64,
    pub max_output_tokens: u32,
    /// Pause before the single transport retry
    pub retry_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 120,
            temperature: 0.2,
            max_output_tokens: 8192,
            retry_delay_ms: 500,
        }
    }
}

impl ProviderConfig {
    /// The usable credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !is_placeholder(key))
    }
}

fn is_placeholder(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    PLACEHOLDER_PATTERNS.iter().any(|p| lower == *p)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "casegen_core=debug"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from the first default location that exists, or defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a default file exists but cannot be read or
    /// parsed.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// First of `.casegen.toml`, `.casegen.json`, `casegen.toml` present in
    /// the working directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        [".casegen.toml", ".casegen.json", "casegen.toml"]
            .into_iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    /// Apply environment overrides through `lookup` (usually `std::env::var`).
    #[must_use]
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = Some(key);
        }
        self
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# casegen configuration

[server]
host = "0.0.0.0"
port = 8000

[provider]
# Gemini API key (GEMINI_API_KEY overrides this).
# Without a key, test cases come from the built-in fallback rules.
# api_key = "your-gemini-api-key-here"
endpoint = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
timeout_secs = 120
temperature = 0.2
max_output_tokens = 8192
retry_delay_ms = 500

[logging]
# Overridden by RUST_LOG
level = "info"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.provider.timeout_secs, 120);
        assert_eq!(config.logging.level, "info");
        assert!(config.provider.credential().is_none());
    }

    #[test]
    fn example_parses_to_defaults() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_partial_toml() {
        let toml = r#"
[server]
port = 9000

[provider]
api_key = "abc123"
timeout_secs = 30
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.provider.max_output_tokens, 8192);
        assert_eq!(config.provider.credential(), Some("abc123"));
    }

    #[test]
    fn placeholder_and_blank_keys_are_no_credential() {
        let mut provider = ProviderConfig::default();
        for key in ["", "   ", "your-gemini-api-key-here", "YOUR-API-KEY"] {
            provider.api_key = Some(key.to_string());
            assert!(provider.credential().is_none(), "{key:?} should not count");
        }
        provider.api_key = Some(" real-key ".into());
        assert_eq!(provider.credential(), Some("real-key"));
    }

    #[test]
    fn env_overrides_key() {
        let config = Config::default().apply_env(|name| {
            (name == API_KEY_ENV).then(|| "from-env".to_string())
        });
        assert_eq!(config.provider.credential(), Some("from-env"));

        let mut config = Config::default();
        config.provider.api_key = Some("from-file".into());
        let config = config.apply_env(|_| Some(String::new()));
        assert_eq!(config.provider.credential(), Some("from-file"));
    }

    #[test]
    fn load_toml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("casegen.toml");
        let mut f = std::fs::File::create(&toml_path).unwrap();
        writeln!(f, "[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(Config::load(&toml_path).unwrap().logging.level, "debug");

        let json_path = dir.path().join("casegen.json");
        std::fs::write(&json_path, r#"{"server": {"port": 1234}}"#).unwrap();
        assert_eq!(Config::load(&json_path).unwrap().server.port, 1234);
    }

    #[test]
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io(..))));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[server]\nport = \"eighty\"").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse(_))));
    }
}
