//! Configuration management
//!
//! Settings are resolved in this order, later sources winning:
//! 1. defaults
//! 2. `mnemo.toml` in the working directory
//! 3. environment variables
//!
//! `${VAR_NAME}` inside the TOML file is replaced by the value of the
//! environment variable before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Default configuration file name
pub const CONFIG_FILE: &str = "mnemo.toml";

/// Main configuration for mnemo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Memory store configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// PDF reader configuration
    #[serde(default)]
    pub pdf: PdfConfig,

    /// Web search configuration
    #[serde(default)]
    pub web_search: WebSearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Path to SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// How long a write waits for another writer's lock, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Character budget for extracted text
    #[serde(default = "default_pdf_max_chars")]
    pub max_chars: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_chars: default_pdf_max_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    /// Exa API key; DuckDuckGo is used when absent
    #[serde(skip_serializing)]
    pub exa_api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of results when the caller gives no limit
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            exa_api_key: None,
            timeout_secs: default_search_timeout_secs(),
            default_limit: default_search_limit(),
        }
    }
}

fn default_db_path() -> String {
    "data/mnemo.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pdf_max_chars() -> usize {
    8_000
}

fn default_search_timeout_secs() -> u64 {
    10
}

fn default_search_limit() -> usize {
    5
}

impl Config {
    /// Replace `${VAR_NAME}` with the variable's value (empty when unset)
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);
        toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load a TOML file, then apply environment overrides
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    /// Load `mnemo.toml` if it exists, otherwise defaults plus environment
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            return Self::from_toml_file(CONFIG_FILE);
        }
        Self::from_env()
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> crate::Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(path) = lookup("MNEMO_DB_PATH") {
            self.memory.db_path = path;
        }
        if let Some(ms) = lookup("MNEMO_BUSY_TIMEOUT_MS") {
            self.memory.busy_timeout_ms = parse_number("MNEMO_BUSY_TIMEOUT_MS", &ms)?;
        }
        if let Some(max) = lookup("MNEMO_PDF_MAX_CHARS") {
            self.pdf.max_chars = parse_number("MNEMO_PDF_MAX_CHARS", &max)?;
        }
        if let Some(key) = lookup("EXA_API_KEY") {
            self.web_search.exa_api_key = Some(key);
        }
        if let Some(secs) = lookup("MNEMO_SEARCH_TIMEOUT_SECS") {
            self.web_search.timeout_secs = parse_number("MNEMO_SEARCH_TIMEOUT_SECS", &secs)?;
        }
        if let Some(limit) = lookup("MNEMO_SEARCH_LIMIT") {
            self.web_search.default_limit = parse_number("MNEMO_SEARCH_LIMIT", &limit)?;
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> crate::Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.memory.db_path, "data/mnemo.db");
        assert_eq!(config.memory.busy_timeout_ms, 5_000);
        assert_eq!(config.pdf.max_chars, 8_000);
        assert!(config.web_search.exa_api_key.is_none());
        assert_eq!(config.web_search.timeout_secs, 10);
        assert_eq!(config.web_search.default_limit, 5);
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("MNEMO_TEST_EXPAND_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${MNEMO_TEST_EXPAND_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${MNEMO_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("MNEMO_TEST_EXPAND_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_passthrough() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("${}_content"), "_content");
        assert_eq!(Config::expand_env_vars("cost: $5"), "cost: $5");
    }

    #[test]
    fn test_toml_parsing() {
        let config = Config::from_toml_str(
            r#"
[memory]
db_path = "/var/lib/mnemo/memory.db"
busy_timeout_ms = 250

[pdf]
max_chars = 2000

[web_search]
exa_api_key = "exa-key"
timeout_secs = 3
"#,
        )
        .unwrap();

        assert_eq!(config.memory.db_path, "/var/lib/mnemo/memory.db");
        assert_eq!(config.memory.busy_timeout_ms, 250);
        assert_eq!(config.pdf.max_chars, 2000);
        assert_eq!(config.web_search.exa_api_key.as_deref(), Some("exa-key"));
        assert_eq!(config.web_search.timeout_secs, 3);
        assert_eq!(config.web_search.default_limit, 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("[pdf]\nmax_chars = 10\n").unwrap();
        assert_eq!(config.memory.db_path, "data/mnemo.db");
        assert_eq!(config.pdf.max_chars, 10);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = Config::from_toml_str("[memory\ndb_path = 1");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MNEMO_DB_PATH", "/tmp/override.db"),
            ("MNEMO_PDF_MAX_CHARS", "123"),
            ("EXA_API_KEY", "secret"),
            ("MNEMO_SEARCH_LIMIT", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.memory.db_path, "/tmp/override.db");
        assert_eq!(config.pdf.max_chars, 123);
        assert_eq!(config.web_search.exa_api_key.as_deref(), Some("secret"));
        // empty values are ignored
        assert_eq!(config.web_search.default_limit, 5);
    }

    #[test]
    fn test_override_rejects_non_numbers() {
        let mut config = Config::default();
        let result = config.apply_overrides(|name| {
            (name == "MNEMO_BUSY_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
