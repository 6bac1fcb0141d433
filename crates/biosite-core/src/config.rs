//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/biosite/config.toml)
//! 3. Environment variables (BIOSITE_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix
const ENV_PREFIX: &str = "BIOSITE";

/// Default backend location
const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Host serving published biosites
const DEFAULT_PUBLIC_HOST: &str = "bio.site";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the biosite REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Directory for client-side state (credentials, logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Host that serves the public page, used to build share URLs
    #[serde(default = "default_public_host")]
    pub public_host: String,

    /// Request timeout in seconds; the transport default applies when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Log file for the CLI (stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            data_dir: default_data_dir(),
            public_host: default_public_host(),
            request_timeout_secs: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (BIOSITE_API_URL, BIOSITE_DATA_DIR, BIOSITE_PUBLIC_HOST,
    ///    BIOSITE_REQUEST_TIMEOUT)
    /// 2. Config file (~/.config/biosite/config.toml or BIOSITE_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Read only what the file says, without environment overrides
    ///
    /// Use this when the result is written back, so values coming from the
    /// environment never end up persisted. A missing file yields defaults.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_PUBLIC_HOST", ENV_PREFIX)) {
            if !val.is_empty() {
                self.public_host = val;
            }
        }

        // Unparseable or zero clears the timeout
        if let Ok(val) = std::env::var(format!("{}_REQUEST_TIMEOUT", ENV_PREFIX)) {
            self.request_timeout_secs = val.parse().ok().filter(|secs| *secs > 0);
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with BIOSITE_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("biosite")
            .join("config.toml")
    }

    /// Get the path to the persisted credential entries
    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join("credentials.json")
    }

    /// Default log file location
    pub fn default_log_path(&self) -> PathBuf {
        self.data_dir.join("biosite.log")
    }

    /// Request timeout, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Public URL of a published site
    pub fn public_url(&self, slug: &str) -> String {
        let slug = slug.trim_start_matches('/');
        format!("https://{}/{}", self.public_host.trim_end_matches('/'), slug)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_public_host() -> String {
    DEFAULT_PUBLIC_HOST.to_string()
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("biosite")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "BIOSITE_API_URL",
        "BIOSITE_DATA_DIR",
        "BIOSITE_PUBLIC_HOST",
        "BIOSITE_REQUEST_TIMEOUT",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.public_host, "bio.site");
        assert!(config.request_timeout().is_none());
        assert!(config.data_dir.ends_with("biosite"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.credentials_path().ends_with("credentials.json"));
        assert!(config.default_log_path().ends_with("biosite.log"));
    }

    #[test]
    fn test_public_url() {
        let config = Config::default();
        assert_eq!(config.public_url("alexxcalle"), "https://bio.site/alexxcalle");
        assert_eq!(config.public_url("/alexxcalle"), "https://bio.site/alexxcalle");
    }

    #[test]
    fn test_load_file_ignores_env() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "public_host = \"links.example\"\n").unwrap();
        env::set_var("BIOSITE_API_URL", "https://staging.example.com");
        env::set_var("BIOSITE_PUBLIC_HOST", "env.example");

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.public_host, "links.example");

        let missing = Config::load_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing.api_url, "http://localhost:3000");
    }

    #[test]
    fn test_env_override_api_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("BIOSITE_API_URL", "https://api.example.com");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "https://api.example.com");

        // Empty value keeps the current setting
        env::set_var("BIOSITE_API_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "https://api.example.com");
    }

    #[test]
    fn test_env_override_timeout() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("BIOSITE_REQUEST_TIMEOUT", "15");
        config.apply_env_overrides();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));

        env::set_var("BIOSITE_REQUEST_TIMEOUT", "0");
        config.apply_env_overrides();
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("BIOSITE_DATA_DIR", "/tmp/biosite-test");
        config.apply_env_overrides();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/biosite-test"));
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            api_url = "https://api.biosite.dev"
            data_dir = "/custom/data"
            public_host = "links.example"
            request_timeout_secs = 20
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.api_url, "https://api.biosite.dev");
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.public_host, "links.example");
        assert_eq!(config.request_timeout_secs, Some(20));
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            api_url: "https://api.biosite.dev".to_string(),
            data_dir: dir.path().join("data"),
            public_host: "bio.site".to_string(),
            request_timeout_secs: Some(5),
            log_file: None,
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.api_url, config.api_url);
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.request_timeout_secs, Some(5));
        assert!(loaded.data_dir.exists());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::TempDir::new().unwrap();
        env::set_var("BIOSITE_DATA_DIR", dir.path().join("data"));

        let config = Config::load_from_path(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert!(config.data_dir.exists());
    }
}
