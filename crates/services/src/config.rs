use std::path::PathBuf;

use chrono::Duration;
use storage::GithubConfig;
use thiserror::Error;

pub const ENV_BACKEND: &str = "QUIZ_BACKEND";
pub const ENV_DATA_DIR: &str = "QUIZ_DATA_DIR";
pub const ENV_GITHUB_REPO: &str = "QUIZ_GITHUB_REPO";
pub const ENV_GITHUB_BRANCH: &str = "QUIZ_GITHUB_BRANCH";
pub const ENV_GITHUB_TOKEN: &str = "QUIZ_GITHUB_TOKEN";
pub const ENV_GITHUB_API_URL: &str = "QUIZ_GITHUB_API_URL";
pub const ENV_REQUIRE_SELECTION: &str = "QUIZ_REQUIRE_SELECTION";
pub const ENV_FLUSH_INTERVAL_SECS: &str = "QUIZ_FLUSH_INTERVAL_SECS";

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} is required for the {backend} backend")]
    Missing {
        var: &'static str,
        backend: &'static str,
    },
    #[error("invalid {var} value: {raw}")]
    Invalid { var: &'static str, raw: String },
    #[error("unknown backend: {0} (expected `local` or `github`)")]
    UnknownBackend(String),
}

/// Where quiz sources and progress live.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    Local { data_dir: PathBuf },
    Github(GithubConfig),
}

impl BackendConfig {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BackendConfig::Local { .. } => "local",
            BackendConfig::Github(_) => "github",
        }
    }
}

/// Runtime configuration of the quiz services.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub backend: BackendConfig,
    /// Reject "Next" without a selected option instead of recording no answer.
    pub require_selection: bool,
    /// Minimum time between progress flushes; zero flushes on every answer.
    pub flush_interval: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Local {
                data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            },
            require_selection: false,
            flush_interval: Duration::zero(),
        }
    }
}

impl QuizConfig {
    /// Read configuration from `QUIZ_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unknown backends, unparsable values, or
    /// missing GitHub settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps variable names to values.
    ///
    /// # Errors
    ///
    /// See [`QuizConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend_name = get(ENV_BACKEND).unwrap_or_else(|| "local".into());
        let backend = match backend_name.trim().to_ascii_lowercase().as_str() {
            "local" => BackendConfig::Local {
                data_dir: get(ENV_DATA_DIR)
                    .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
            },
            "github" => {
                let repo = get(ENV_GITHUB_REPO).ok_or(ConfigError::Missing {
                    var: ENV_GITHUB_REPO,
                    backend: "github",
                })?;
                if repo.split('/').filter(|part| !part.is_empty()).count() != 2 {
                    return Err(ConfigError::Invalid {
                        var: ENV_GITHUB_REPO,
                        raw: repo,
                    });
                }
                let token = get(ENV_GITHUB_TOKEN).ok_or(ConfigError::Missing {
                    var: ENV_GITHUB_TOKEN,
                    backend: "github",
                })?;
                let mut github = GithubConfig::new(repo.trim(), token.trim());
                if let Some(branch) = get(ENV_GITHUB_BRANCH) {
                    github.branch = branch.trim().to_string();
                }
                if let Some(url) = get(ENV_GITHUB_API_URL) {
                    github.api_base_url = url.trim().to_string();
                }
                if let Some(dir) = get(ENV_DATA_DIR) {
                    github.data_dir = dir.trim().trim_matches('/').to_string();
                }
                BackendConfig::Github(github)
            }
            _ => return Err(ConfigError::UnknownBackend(backend_name)),
        };

        let require_selection = match get(ENV_REQUIRE_SELECTION) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                var: ENV_REQUIRE_SELECTION,
                raw,
            })?,
            None => false,
        };

        let flush_interval = match get(ENV_FLUSH_INTERVAL_SECS) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map(|secs| Duration::seconds(i64::from(secs)))
                .map_err(|_| ConfigError::Invalid {
                    var: ENV_FLUSH_INTERVAL_SECS,
                    raw,
                })?,
            None => Duration::zero(),
        };

        Ok(Self {
            backend,
            require_selection,
            flush_interval,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
