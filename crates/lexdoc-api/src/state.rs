//! # Application State & Configuration
//!
//! `AppState` is what every handler receives: the lifecycle facade, the
//! resolved configuration, and the Prometheus handle when metrics are on.
//!
//! Configuration comes from the environment, optionally layered over a
//! YAML file named by `LEXDOC_CONFIG`:
//!
//! | Variable                 | Meaning                                | Default |
//! |--------------------------|----------------------------------------|---------|
//! | `PORT`                   | listen port                            | 8080    |
//! | `AUTH_TOKEN`             | bearer secret; unset disables auth     | unset   |
//! | `LEXDOC_CONTENT_DIR`     | filesystem content store root          | memory  |
//! | `LEXDOC_METRICS_ENABLED` | serve `/metrics`                       | true    |
//! | `LEXDOC_CONFIG`          | YAML with `lifecycle:` and `jobs:`     | unset   |

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lexdoc_crypto::{FsContentStore, StoreError};
use lexdoc_lifecycle::{JobKind, Lifecycle, LifecycleConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tick periods of the background jobs, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSchedule {
    pub escalation_interval_secs: u64,
    pub stall_interval_secs: u64,
    pub retention_interval_secs: u64,
    pub archival_interval_secs: u64,
}

impl Default for JobSchedule {
    fn default() -> Self {
        Self {
            escalation_interval_secs: 30 * 60,
            stall_interval_secs: 30 * 60,
            retention_interval_secs: 24 * 60 * 60,
            archival_interval_secs: 24 * 60 * 60,
        }
    }
}

impl JobSchedule {
    /// Tick period for `kind`. Zero disables the job.
    pub fn interval(&self, kind: JobKind) -> Option<Duration> {
        let secs = match kind {
            JobKind::DeadlineEscalation => self.escalation_interval_secs,
            JobKind::StallDetection => self.stall_interval_secs,
            JobKind::VersionRetention => self.retention_interval_secs,
            JobKind::WorkflowArchival => self.archival_interval_secs,
        };
        (secs > 0).then(|| Duration::from_secs(secs))
    }
}

/// The YAML file shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub lifecycle: LifecycleConfig,
    pub jobs: JobSchedule,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Bearer secret. `None` disables token auth.
    pub auth_token: Option<String>,
    /// Root of the filesystem content store; in-memory when `None`.
    pub content_dir: Option<PathBuf>,
    pub metrics_enabled: bool,
    pub lifecycle: LifecycleConfig,
    pub jobs: JobSchedule,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("content_dir", &self.content_dir)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("lifecycle", &self.lifecycle)
            .field("jobs", &self.jobs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            content_dir: None,
            metrics_enabled: true,
            lifecycle: LifecycleConfig::default(),
            jobs: JobSchedule::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` in place of the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup("LEXDOC_CONFIG") {
            let file = load_file(Path::new(&path))?;
            config.lifecycle = file.lifecycle;
            config.jobs = file.jobs;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "PORT",
                value: port,
            })?;
        }
        config.auth_token = lookup("AUTH_TOKEN").filter(|t| !t.is_empty());
        config.content_dir = lookup("LEXDOC_CONTENT_DIR")
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);
        if let Some(flag) = lookup("LEXDOC_METRICS_ENABLED") {
            config.metrics_enabled = flag.to_lowercase() != "false";
        }
        Ok(config)
    }
}

/// Parse a YAML config file.
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&text)?)
}

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Lifecycle,
    pub config: AppConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the lifecycle described by `config`.
    pub fn try_with_config(config: AppConfig) -> Result<Self, StoreError> {
        let mut builder = Lifecycle::builder().config(config.lifecycle.clone());
        if let Some(dir) = &config.content_dir {
            let store = FsContentStore::open(dir)?;
            tracing::info!(root = %dir.display(), "using filesystem content store");
            builder = builder.content_store(Arc::new(store));
        }
        Ok(Self {
            lifecycle: builder.build(),
            config,
            metrics: None,
        })
    }

    /// Wrap an already-built lifecycle.
    pub fn with_lifecycle(lifecycle: Lifecycle, config: AppConfig) -> Self {
        Self {
            lifecycle,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
