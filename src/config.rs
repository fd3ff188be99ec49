use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend origin, e.g. `https://planny.example.com`.
    pub base_url: String,
    /// Cookie string sent with every request, in `name=value; name=value` form.
    /// Must carry the session and `csrftoken` cookies for mutating calls.
    pub cookie: Option<String>,
    pub log_level: Option<String>,
    /// Overrides the location of the local calendar event log.
    pub calendar_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie: None,
            log_level: None,
            calendar_path: None,
        }
    }
}

impl AppConfig {
    pub fn calendar_path(&self) -> PathBuf {
        self.calendar_path
            .clone()
            .unwrap_or_else(|| data_dir().join("planny_calendar_events.json"))
    }
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".planny")
}

pub fn load_config() -> Result<AppConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<AppConfig> {
    let mut config: AppConfig =
        toml::from_str(contents).with_context(|| "Failed to parse config.toml")?;
    config.base_url = config.base_url.trim_end_matches('/').to_string();
    Ok(config)
}
