use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EqualifyConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub scraper: ScraperConfig,
    pub augment: AugmentConfig,
    pub search: SearchConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScraperConfig {
    /// Listing URL prefix; the page number is appended.
    pub listing_url: String,
    /// Listing pages `0..pages` are fetched.
    pub pages: u32,
    /// Detail pages are the links that start with this prefix.
    pub detail_prefix: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AugmentConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub page_size: usize,
    /// Write saved/applied/favorited marks back into the stored document.
    pub persist_flags: bool,
    /// Idle seconds before a visitor session is dropped.
    pub session_idle_secs: u64,
    pub max_sessions: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_features: usize,
    pub reduce_dims: usize,
    pub clusters: usize,
    pub topics: usize,
    pub top_words: usize,
    pub histogram_bins: usize,
    pub top_scoring: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8501,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_equalify_dir()
            .join("scholarships.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://scholarships.asu.edu/scholarship-search&page=".into(),
            pages: 8,
            detail_prefix: "https://scholarships.asu.edu/scholarship/".into(),
            user_agent: concat!("equalify/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 30,
        }
    }
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".into(),
            model: "gpt-4o-2024-08-06".into(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            persist_flags: true,
            session_idle_secs: 24 * 60 * 60,
            max_sessions: 10_000,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            reduce_dims: 5,
            clusters: 5,
            topics: 10,
            top_words: 10,
            histogram_bins: 20,
            top_scoring: 10,
        }
    }
}

/// Returns `~/.equalify/`
pub fn default_equalify_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".equalify")
}

/// Returns the default config file path: `~/.equalify/config.toml`
pub fn default_config_path() -> PathBuf {
    default_equalify_dir().join("config.toml")
}

impl EqualifyConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            EqualifyConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (EQUALIFY_DB, EQUALIFY_LOG_LEVEL, EQUALIFY_MODEL, OPENAI_API_KEY).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("EQUALIFY_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("EQUALIFY_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("EQUALIFY_MODEL") {
            self.augment.model = val;
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.augment.api_key = Some(val);
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EqualifyConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.search.page_size, 5);
        assert!(config.search.persist_flags);
        assert_eq!(config.search.session_idle_secs, 86_400);
        assert_eq!(config.search.max_sessions, 10_000);
        assert_eq!(config.scraper.pages, 8);
        assert_eq!(config.analysis.max_features, 1000);
        assert!(config.storage.db_path.ends_with("scholarships.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
port = 9000

[storage]
db_path = "/tmp/test.db"

[search]
page_size = 10
"#;
        let config: EqualifyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.search.page_size, 10);
        // defaults still apply for unset fields
        assert!(config.search.persist_flags);
        assert_eq!(config.augment.model, "gpt-4o-2024-08-06");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = EqualifyConfig::default();
        std::env::set_var("EQUALIFY_DB", "/tmp/override.db");
        std::env::set_var("EQUALIFY_LOG_LEVEL", "trace");
        std::env::set_var("EQUALIFY_MODEL", "test-model");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.augment.model, "test-model");

        std::env::remove_var("EQUALIFY_DB");
        std::env::remove_var("EQUALIFY_LOG_LEVEL");
        std::env::remove_var("EQUALIFY_MODEL");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/db.sqlite"), PathBuf::from("/var/db.sqlite"));
    }
}
