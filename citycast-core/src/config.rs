use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// geocoding_url = "https://geocoding-api.open-meteo.com/v1/search"
/// weather_url = "https://api.open-meteo.com/v1/forecast"
/// timeout_secs = 10
/// quick_cities = ["London", "Tokyo"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geocoding_url: String,
    pub weather_url: String,

    /// Per-request timeout; `None` leaves the HTTP client default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    pub quick_cities: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            timeout_secs: None,
            quick_cities: ["Mumbai", "Delhi", "Bangalore", "London", "New York", "Tokyo"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        check_http_url("geocoding_url", &self.geocoding_url)?;
        check_http_url("weather_url", &self.weather_url)?;

        if self.timeout_secs == Some(0) {
            bail!("timeout_secs must be greater than zero");
        }

        if let Some(pos) = self.quick_cities.iter().position(|c| c.trim().is_empty()) {
            bail!("quick_cities[{pos}] is blank");
        }

        Ok(())
    }

    /// Load config from `path`, or defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn check_http_url(key: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("{key} is not a valid URL: '{value}'"))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("{key} must use http or https, got '{other}'")),
    }
}
