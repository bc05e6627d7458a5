use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File names probed, in order, when no explicit `--config` path is given.
pub const CONFIG_LOCATIONS: [&str; 2] = ["tally.toml", ".tally.toml"];

pub const DEFAULT_PORT: u16 = 8472;

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root of the staging server, without the `/api` suffix.  Overridden at
    /// runtime by the `TALLY_SERVER_URL` environment variable when set.
    pub base_url: String,
    /// Applies to `init`, item fetches and commits.  The change stream is
    /// long-lived and never times out.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://127.0.0.1:{DEFAULT_PORT}"),
            request_timeout_secs: 10,
        }
    }
}

// ── Change stream ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enabled: bool,
    /// First reconnect delay after the stream drops.  Doubles on every failed
    /// attempt up to `reconnect_max_ms`.
    pub reconnect_initial_ms: u64,
    pub reconnect_max_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reconnect_initial_ms: 250,
            reconnect_max_ms: 5_000,
        }
    }
}

/// User-interface settings exposed in the `[ui]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Named colour theme.  Recognised values: `catppuccin-mocha` (default),
    /// `tokyo-night`, `nord`.
    pub theme: String,
    /// Maximum number of account suggestions shown at once.
    pub suggestion_limit: usize,
    /// How long an open suggestion list survives after its field loses focus,
    /// so a mouse click on a candidate can still land.
    pub blur_close_delay_ms: u64,
    pub show_help: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_string(),
            suggestion_limit: 8,
            blur_close_delay_ms: 150,
            show_help: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Interactive sessions log here instead of the terminal.
    pub log_dir: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: ".tally/logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sync: SyncConfig,
    pub ui: UiConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::default();
        match fs::read_to_string(path) {
            Ok(raw) => {
                config = toml::from_str(&raw)
                    .with_context(|| format!("failed to parse config file: {}", path.display()))?;
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config file: {}", path.display()));
            }
        }

        if let Ok(value) = env::var("TALLY_SERVER_URL") {
            if !value.is_empty() {
                config.server.base_url = value;
            }
        }

        Ok(config)
    }

    /// Resolve the config file to use: the explicit path if given, otherwise
    /// the first of [`CONFIG_LOCATIONS`] that exists in `dir`.
    pub fn locate(explicit: Option<&Path>, dir: impl AsRef<Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        CONFIG_LOCATIONS
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|candidate| candidate.exists())
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    /// The `/api` root under `base_url`, tolerating a trailing slash.
    pub fn api_root(&self) -> String {
        format!("{}/api", self.server.base_url.trim_end_matches('/'))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
