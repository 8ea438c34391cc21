use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

pub const DEFAULT_SURVEYD_ADDR: &str = "http://127.0.0.1:8787";

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyConfig {
    pub project: String,
    pub metric: String,
    /// Heat map surface. Unset means the project's floor plan size.
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        SurveyConfig {
            project: String::new(),
            metric: "rssi_dbm".to_string(),
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub address: String,
    pub survey: SurveyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: DEFAULT_SURVEYD_ADDR.to_string(),
            survey: SurveyConfig::default(),
        }
    }
}

#[derive(Deserialize)]
struct ClientPartial {
    address: Option<String>,
}

#[derive(Deserialize)]
struct SurveyPartial {
    project: Option<String>,
    metric: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
}

pub fn parse_config(text: &str) -> Result<Config, Box<dyn Error>> {
    let val: toml::Value = toml::from_str(text)?;
    let table = val.as_table().ok_or("config is not a table")?;

    let mut config = Config::default();

    if let Some(v) = table.get("client") {
        let partial: ClientPartial = v.clone().try_into()?;
        if let Some(x) = partial.address { config.address = x; }
    }

    if let Some(v) = table.get("survey") {
        let partial: SurveyPartial = v.clone().try_into()?;
        let d = &mut config.survey;
        if let Some(x) = partial.project { d.project = x; }
        if let Some(x) = partial.metric { d.metric = x; }
        if partial.width.is_some() { d.width = partial.width; }
        if partial.height.is_some() { d.height = partial.height; }
    }

    Ok(config)
}

/// Loads the client config. A missing file is not an error.
pub fn load_config(path: &Path) -> Result<Config, Box<dyn Error>> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path)?;
    parse_config(&s)
}
