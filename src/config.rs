use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// Upstream defaults
// =============================================================================

/// Default base URL for the GitHub API
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.github.com";

/// Path of the manifest template inside each tracked repository
pub const DEFAULT_TEMPLATE_PATH: &str = "addon.xml.tpl";

/// Token replaced by the release version in manifest templates
pub const DEFAULT_PLACEHOLDER: &str = "$VERSION";

/// Separator written before every rendered template line
pub const DEFAULT_LINE_SEPARATOR: &str = "\r\n";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Delay between starting each fetch request to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

// =============================================================================
// Environment overrides
// =============================================================================

pub const ENV_PORT: &str = "PORT";
pub const ENV_REPOSITORIES: &str = "ADDON_REPO_REPOSITORIES";
pub const ENV_UPSTREAM_URL: &str = "ADDON_REPO_UPSTREAM_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid listen port {0:?}")]
    InvalidPort(String),

    #[error("Listen port is not set (set PORT or \"port\" in the config file)")]
    MissingPort,

    #[error(
        "No repositories configured (set ADDON_REPO_REPOSITORIES or \"repositories\" in the config file)"
    )]
    NoRepositories,
}

/// Service configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RepoConfig {
    /// Listen port; required when serving
    pub port: Option<u16>,
    pub bind_address: String,
    /// Upstream projects to mirror, as "owner/repo"
    pub repositories: Vec<String>,
    pub upstream: UpstreamConfig,
    pub template: TemplateConfig,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            port: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            repositories: Vec::new(),
            upstream: UpstreamConfig::default(),
            template: TemplateConfig::default(),
        }
    }
}

/// Upstream release source configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpstreamConfig {
    pub base_url: String,
    pub template_path: String,
    /// Per-project fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            template_path: DEFAULT_TEMPLATE_PATH.to_string(),
            fetch_timeout_ms: FETCH_TIMEOUT_MS,
        }
    }
}

/// Byte layout of rendered manifest fragments
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateConfig {
    pub placeholder: String,
    pub line_separator: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            line_separator: DEFAULT_LINE_SEPARATOR.to_string(),
        }
    }
}

impl RepoConfig {
    /// Load configuration from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                serde_json::from_str(&content)?
            }
            None => Self::default(),
        };

        config.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(port) = lookup(ENV_PORT).filter(|p| !p.trim().is_empty()) {
            let parsed = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
            self.port = Some(parsed);
        }

        if let Some(repositories) = lookup(ENV_REPOSITORIES) {
            self.repositories = repositories
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(base_url) = lookup(ENV_UPSTREAM_URL).filter(|u| !u.is_empty()) {
            self.upstream.base_url = base_url;
        }

        Ok(self)
    }

    /// Ensure at least one repository is tracked
    pub fn validate_repositories(&self) -> Result<(), ConfigError> {
        if self.repositories.is_empty() {
            return Err(ConfigError::NoRepositories);
        }
        Ok(())
    }

    /// Validate everything the HTTP server needs and return the listen port
    pub fn validate_for_serve(&self) -> Result<u16, ConfigError> {
        self.validate_repositories()?;
        match self.port {
            Some(0) => Err(ConfigError::InvalidPort("0".to_string())),
            Some(port) => Ok(port),
            None => Err(ConfigError::MissingPort),
        }
    }
}

/// Returns the path to the data directory for addon-repo.
/// Uses $XDG_DATA_HOME/addon-repo if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/addon-repo,
/// or ./addon-repo if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default path of the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("addon-repo.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("addon-repo")
}
