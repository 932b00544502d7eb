//! Configuration file support for fleet-patch.
//!
//! Provides YAML-based configuration through `fleet-patch.config.yml` files,
//! including data structures, file loading, validation and defaults.

use anyhow::Context;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::adapters::outbound::filesystem::SafeFileReader;
use crate::patching::policies::VendorManagedOs;
use crate::shared::error::PatchError;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "fleet-patch.config.yml";

const DEFAULT_PACKAGES_ROOT: &str = "packages";
const DEFAULT_JOB_TIMEOUT_SECS: u64 = 86_400;
const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
const DEFAULT_TTL_MINUTES: u32 = 10;

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub packages_root: Option<PathBuf>,
    pub dependencies_dir: Option<PathBuf>,
    pub download: Option<DownloadSection>,
    pub agent_queue: Option<AgentQueueSection>,
    pub vendor_managed_os: Option<Vec<String>>,
    pub views: Option<HashMap<String, ViewSection>>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// `download:` section.
#[derive(Debug, Deserialize, Default)]
pub struct DownloadSection {
    pub job_timeout_secs: Option<u64>,
    pub default_throttle_kbs: Option<u64>,
    pub max_concurrent_jobs: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// `agent_queue:` section.
#[derive(Debug, Deserialize, Default)]
pub struct AgentQueueSection {
    pub server_ttl_minutes: Option<u32>,
    pub agent_ttl_minutes: Option<u32>,
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// One entry under `views:`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ViewSection {
    pub package_base_url: String,
    #[serde(default)]
    pub file_servers: Vec<String>,
}

/// Configuration with every default applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub packages_root: PathBuf,
    pub dependencies_dir: Option<PathBuf>,
    pub job_timeout: Duration,
    pub default_throttle_kbs: u64,
    pub max_concurrent_jobs: usize,
    pub request_timeout: Duration,
    pub server_ttl_minutes: u32,
    pub agent_ttl_minutes: u32,
    pub vendor_managed_os: VendorManagedOs,
    pub views: HashMap<String, ViewSection>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(ConfigFile::default())
    }
}

impl Settings {
    pub fn from_config(config: ConfigFile) -> Self {
        let download = config.download.unwrap_or_default();
        let agent_queue = config.agent_queue.unwrap_or_default();

        Self {
            packages_root: config
                .packages_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGES_ROOT)),
            dependencies_dir: config.dependencies_dir,
            job_timeout: Duration::from_secs(
                download.job_timeout_secs.unwrap_or(DEFAULT_JOB_TIMEOUT_SECS),
            ),
            default_throttle_kbs: download.default_throttle_kbs.unwrap_or(0),
            max_concurrent_jobs: download
                .max_concurrent_jobs
                .unwrap_or(DEFAULT_MAX_CONCURRENT_JOBS),
            request_timeout: Duration::from_secs(
                download
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            server_ttl_minutes: agent_queue.server_ttl_minutes.unwrap_or(DEFAULT_TTL_MINUTES),
            agent_ttl_minutes: agent_queue.agent_ttl_minutes.unwrap_or(DEFAULT_TTL_MINUTES),
            vendor_managed_os: config
                .vendor_managed_os
                .map(VendorManagedOs::new)
                .unwrap_or_default(),
            views: config.views.unwrap_or_default(),
        }
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = SafeFileReader::new()
        .read_to_string(path, "config file")
        .with_context(|| {
            format!(
                "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
                path.display()
            )
        })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config, path)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Resolve settings from an explicit path, or from auto-discovery in `dir`.
pub fn resolve_settings(explicit: Option<&Path>, dir: &Path) -> Result<Settings> {
    let config = match explicit {
        Some(path) => Some(load_config_from_path(path)?),
        None => discover_config(dir)?,
    };
    Ok(config.map(Settings::from_config).unwrap_or_default())
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile, path: &Path) -> Result<()> {
    let invalid = |reason: String, hint: &str| -> anyhow::Error {
        PatchError::ConfigError {
            path: path.to_path_buf(),
            reason,
            hint: hint.to_string(),
        }
        .into()
    };

    if let Some(root) = &config.packages_root {
        if root.as_os_str().is_empty() {
            return Err(invalid(
                "packages_root must not be empty".to_string(),
                "Set packages_root to the directory package files are stored under.",
            ));
        }
    }

    if let Some(download) = &config.download {
        if download.max_concurrent_jobs == Some(0) {
            return Err(invalid(
                "download.max_concurrent_jobs must be at least 1".to_string(),
                "Use 1 to run background jobs one at a time.",
            ));
        }
        if download.job_timeout_secs == Some(0) || download.request_timeout_secs == Some(0) {
            return Err(invalid(
                "download timeouts must be at least 1 second".to_string(),
                "Remove the field to use the default timeout.",
            ));
        }
    }

    if let Some(patterns) = &config.vendor_managed_os {
        if let Some(i) = patterns.iter().position(|p| p.trim().is_empty()) {
            return Err(invalid(
                format!("vendor_managed_os[{}] must not be empty", i),
                "List OS names such as \"Red Hat Enterprise Linux Server\".",
            ));
        }
    }

    for (name, view) in config.views.iter().flatten() {
        if name.trim().is_empty() {
            return Err(invalid(
                "view names must not be empty".to_string(),
                "Name each view after the tenant it belongs to (e.g., \"default\").",
            ));
        }
        match Url::parse(&view.package_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(invalid(
                    format!(
                        "views.{}.package_base_url '{}' is not an http(s) URL",
                        name, view.package_base_url
                    ),
                    "Use the URL packages are served from, e.g. https://patch.example.com/packages.",
                ))
            }
        }
        if view.file_servers.iter().any(|s| s.trim().is_empty()) {
            return Err(invalid(
                format!("views.{}.file_servers contains an empty entry", name),
                "List mirrors as host or host:port.",
            ));
        }
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    let nested = config
        .download
        .iter()
        .flat_map(|s| s.unknown_fields.keys().map(|k| format!("download.{}", k)))
        .chain(
            config
                .agent_queue
                .iter()
                .flat_map(|s| s.unknown_fields.keys().map(|k| format!("agent_queue.{}", k))),
        );

    for key in config.unknown_fields.keys().cloned().chain(nested) {
        warn!(field = %key, "unknown config field will be ignored");
    }
}
