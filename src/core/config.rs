use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::document::{PageSize, DEFAULT_LOGO_URL};
use crate::error::{ReportError, Result};

fn default_duration_secs() -> u64 {
    60
}

fn default_sample_interval_ms() -> u64 {
    1000
}

fn default_logo_url() -> String {
    DEFAULT_LOGO_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Window length when no --stop or --duration is given
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: u64,
    /// Pause between ticks when memory is sampled without CPU
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// None writes reports to the working directory
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default = "default_logo_url")]
    pub logo_url: String,
    #[serde(default)]
    pub page_size: PageSize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration_secs: default_duration_secs(),
            sample_interval_ms: default_sample_interval_ms(),
            output_dir: None,
            logo_url: default_logo_url(),
            page_size: PageSize::default(),
        }
    }
}

impl Config {
    /// Keys accepted by `set`
    pub const KEYS: [&'static str; 5] = [
        "default_duration_secs",
        "sample_interval_ms",
        "output_dir",
        "logo_url",
        "page_size",
    ];

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read(path)?;
        if data.is_empty() {
            return Ok(Config::default());
        }

        // An unreadable file (older format, hand edits) falls back to defaults
        Ok(serde_json::from_slice(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config {}: {}", path.display(), e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ReportError::config("Could not determine config directory"))?;

        Ok(config_dir.join("hwreport").join("config.json"))
    }

    /// Set one field from its textual form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_duration_secs" => {
                self.default_duration_secs = parse_positive(key, value)?;
            }
            "sample_interval_ms" => {
                self.sample_interval_ms = parse_positive(key, value)?;
            }
            "output_dir" => {
                self.output_dir = match value.trim() {
                    "" | "none" => None,
                    dir => Some(dir.to_string()),
                };
            }
            "logo_url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(ReportError::config(format!(
                        "logo_url must be an http(s) URL, got '{}'",
                        value
                    )));
                }
                self.logo_url = value.to_string();
            }
            "page_size" => self.page_size = value.parse()?,
            other => {
                return Err(ReportError::config(format!(
                    "unknown key '{}' (expected one of: {})",
                    other,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    pub fn reset_to_defaults(&mut self) {
        *self = Config::default();
    }

    pub fn default_duration(&self) -> Duration {
        Duration::from_secs(self.default_duration_secs)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_deref()
            .map_or_else(|| PathBuf::from("."), PathBuf::from)
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ReportError::config(format!(
            "{} must be a positive integer, got '{}'",
            key, value
        ))),
    }
}
