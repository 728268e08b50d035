//! Configuration management for AdStream using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::browser::{BrowserEngineConfig, BrowserIdentity};
use crate::collector::{CollectorOptions, DEFAULT_CONCURRENCY};
use crate::models::DEFAULT_DOMAINS;
use crate::storage::DEFAULT_DATASET;

/// Default HTTP port when neither the command line nor `PORT` sets one.
pub const DEFAULT_PORT: u16 = 3030;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding result CSV files.
    pub data_dir: PathBuf,
    /// Dataset written by `collect` and served by the API.
    pub dataset: String,
    /// Domains analyzed when none are given on the command line.
    pub domains: Vec<String>,
    /// Maximum pages open at once.
    pub concurrency: usize,
    /// Navigation timeout in seconds.
    pub navigation_timeout: u64,
    pub identity: BrowserIdentity,
    pub browser: BrowserEngineConfig,
    /// Static frontend served in production mode.
    pub public_dir: PathBuf,
    /// Serve `public_dir` alongside the API.
    pub production: bool,
    /// Port from the `PORT` environment variable.
    pub port: Option<u16>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            dataset: DEFAULT_DATASET.to_string(),
            domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
            concurrency: DEFAULT_CONCURRENCY,
            navigation_timeout: 30,
            identity: BrowserIdentity::default(),
            browser: BrowserEngineConfig::default(),
            public_dir: PathBuf::from("./public"),
            production: false,
            port: None,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Options for a collection run.
    pub fn collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            concurrency: self.concurrency,
            navigation_timeout: Duration::from_secs(self.navigation_timeout),
            identity: self.identity.clone(),
        }
    }

    /// Apply environment variable overrides.
    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| env(key).filter(|s| !s.is_empty());

        if let Some(dir) = var("ADSTREAM_DATA_DIR") {
            tracing::debug!("Using ADSTREAM_DATA_DIR from environment: {}", dir);
            self.data_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
        }
        if let Some(port) = var("PORT") {
            match port.parse() {
                Ok(port) => self.port = Some(port),
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(mode) = var("ADSTREAM_ENV") {
            self.production = mode.eq_ignore_ascii_case("production");
        }
        if let Some(url) = var("CHROME_REMOTE_URL") {
            tracing::debug!("Using CHROME_REMOTE_URL from environment: {}", url);
            self.browser.remote_url = Some(url);
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Dataset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    /// Domains to analyze.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
    /// Maximum concurrent pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// Navigation timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_timeout: Option<u64>,
    /// User agent string presented by every page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// `navigator.platform` presented by every page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Static frontend directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<String>,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers adstream config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("adstream").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, String> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref dataset) = self.dataset {
            settings.dataset = dataset.clone();
        }
        if let Some(ref domains) = self.domains {
            settings.domains = normalize_domains(domains);
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(timeout) = self.navigation_timeout {
            settings.navigation_timeout = timeout;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.identity.user_agent = user_agent.clone();
        }
        if let Some(ref platform) = self.platform {
            settings.identity.platform = platform.clone();
        }
        if let Some(ref public_dir) = self.public_dir {
            settings.public_dir = self.resolve_path(public_dir, base_dir);
        }
        settings.browser = self.browser.clone();
        if let Some(ref chrome_path) = self.browser.chrome_path {
            settings.browser.chrome_path =
                Some(self.resolve_path(&chrome_path.to_string_lossy(), base_dir));
        }
    }
}

/// Reduce a domain or URL to its bare host (`https://www.example.com/x` ->
/// `www.example.com`). Returns `None` for blank or unparseable input.
pub fn normalize_domain(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    Url::parse(&with_scheme)
        .ok()?
        .host_str()
        .map(|host| host.to_ascii_lowercase())
}

/// Normalize a domain list, dropping invalid entries and duplicates while
/// keeping the first occurrence's position.
pub fn normalize_domains<S: AsRef<str>>(inputs: &[S]) -> Vec<String> {
    let mut domains: Vec<String> = Vec::with_capacity(inputs.len());
    for input in inputs {
        match normalize_domain(input.as_ref()) {
            Some(domain) if !domains.contains(&domain) => domains.push(domain),
            Some(_) => {}
            None => tracing::warn!("Skipping invalid domain: {:?}", input.as_ref()),
        }
    }
    domains
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory (--data-dir flag).
    pub data_dir: Option<PathBuf>,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings(options: LoadOptions) -> anyhow::Result<(Settings, Config)> {
    // An explicit --config must exist and parse; a discovered one is best-effort.
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?,
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env(|key| std::env::var(key).ok());

    // --data-dir takes precedence over config and environment
    if let Some(data_dir) = options.data_dir {
        settings.data_dir = data_dir;
    }

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.data_dir, PathBuf::from("./data"));
        assert_eq!(settings.dataset, "collector-data");
        assert_eq!(settings.domains.len(), 20);
        assert_eq!(settings.concurrency, 5);
        assert!(!settings.production);

        let options = settings.collector_options();
        assert_eq!(options.concurrency, 5);
        assert_eq!(options.navigation_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_load_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("adstream.toml");
        std::fs::write(
            &path,
            r#"
            data_dir = "results"
            domains = ["https://www.Netflix.com/browse", "twitch.tv"]
            concurrency = 2
            navigation_timeout = 10
            user_agent = "TestAgent/1.0"

            [browser]
            headless = false
            "#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, dir.path());

        assert_eq!(settings.data_dir, dir.path().join("results"));
        assert_eq!(settings.domains, vec!["www.netflix.com", "twitch.tv"]);
        assert_eq!(settings.concurrency, 2);
        assert_eq!(settings.navigation_timeout, 10);
        assert_eq!(settings.identity.user_agent, "TestAgent/1.0");
        assert_eq!(settings.identity.platform, "Win32");
        assert!(!settings.browser.headless);
    }

    #[tokio::test]
    async fn test_load_yaml_and_json_config() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("adstream.yaml");
        std::fs::write(&yaml, "dataset: nightly\nconcurrency: 8\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.dataset.as_deref(), Some("nightly"));
        assert_eq!(config.concurrency, Some(8));

        let json = dir.path().join("adstream.json");
        std::fs::write(&json, r#"{"public_dir": "/srv/www"}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.public_dir.as_deref(), Some("/srv/www"));
    }

    #[tokio::test]
    async fn test_invalid_config_reports_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("adstream.toml");
        std::fs::write(&path, "concurrency = \"many\"").unwrap();

        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(err.starts_with("Failed to parse TOML config"));
    }

    #[tokio::test]
    async fn test_explicit_missing_config_is_an_error() {
        let dir = tempdir().unwrap();
        let result = load_settings(LoadOptions {
            config_path: Some(dir.path().join("missing.toml")),
            data_dir: None,
        })
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_path() {
        let config = Config::default();
        let base = Path::new("/etc/adstream");
        assert_eq!(
            config.resolve_path("/var/data", base),
            PathBuf::from("/var/data")
        );
        assert_eq!(
            config.resolve_path("data", base),
            PathBuf::from("/etc/adstream/data")
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_env(env_from(&[
            ("ADSTREAM_DATA_DIR", "/tmp/adstream"),
            ("PORT", "8080"),
            ("ADSTREAM_ENV", "production"),
            ("CHROME_REMOTE_URL", "http://localhost:9222"),
        ]));

        assert_eq!(settings.data_dir, PathBuf::from("/tmp/adstream"));
        assert_eq!(settings.port, Some(8080));
        assert!(settings.production);
        assert_eq!(
            settings.browser.remote_url.as_deref(),
            Some("http://localhost:9222")
        );
    }

    #[test]
    fn test_env_ignores_invalid_and_empty_values() {
        let mut settings = Settings::default();
        settings.apply_env(env_from(&[
            ("PORT", "not-a-port"),
            ("ADSTREAM_ENV", "development"),
            ("ADSTREAM_DATA_DIR", ""),
        ]));

        assert_eq!(settings.port, None);
        assert!(!settings.production);
        assert_eq!(settings.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("netflix.com").as_deref(), Some("netflix.com"));
        assert_eq!(
            normalize_domain("  HTTPS://www.Hulu.com/watch?x=1 ").as_deref(),
            Some("www.hulu.com")
        );
        assert_eq!(normalize_domain("example.com:8443").as_deref(), Some("example.com"));
        assert_eq!(normalize_domain("   "), None);
        assert_eq!(normalize_domain("http://"), None);
    }

    #[test]
    fn test_normalize_domains_dedupes() {
        let domains = normalize_domains(&["a.com", "https://a.com/", "", "b.com"]);
        assert_eq!(domains, vec!["a.com", "b.com"]);
    }
}
