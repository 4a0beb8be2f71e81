use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use derive_more::{Deref, From, Into};
use directories::ProjectDirs;
use fairspin::audio::DEFAULT_SAMPLE_RATE;
use fairspin::layout::LabelLayout;
use fairspin::layout::geometry::default_text_color;
use palette::Srgb;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay, Deref, From, Into)]
pub struct TextColor(Srgb<u8>);

impl Default for TextColor {
    fn default() -> Self {
        Self(default_text_color())
    }
}

impl FromStr for TextColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !matches!(hex.len(), 3 | 6) {
            return Err(ConfigError::InvalidColor(s.to_string()));
        }
        Srgb::from_str(hex)
            .map(Self)
            .map_err(|_| ConfigError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub text_color: TextColor,
    pub background_image: Option<PathBuf>,
    /// 0 means no cap.
    pub max_display: usize,
    pub muted: bool,
    pub sample_rate: f64,
    pub device_pixel_ratio: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text_color: TextColor::default(),
            background_image: None,
            max_display: 0,
            muted: false,
            sample_rate: DEFAULT_SAMPLE_RATE,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Settings {
    pub fn display_cap(&self) -> Option<usize> {
        (self.max_display > 0).then_some(self.max_display)
    }

    pub fn label_layout(&self) -> LabelLayout {
        LabelLayout::new(*self.text_color, self.display_cap())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid colour: {0}")]
    InvalidColor(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "fairspin", "wheel").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("settings.toml"))
}

/// Reads `path` (or the default location) with `WHEEL_*` environment overrides on top.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };

    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("WHEEL"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default(path: Option<&Path>) -> Settings {
    match load_settings(path) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Using default settings: {}", e);
            Settings::default()
        }
    }
}

pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let path = get_config_path()?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
