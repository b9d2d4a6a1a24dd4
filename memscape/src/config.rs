//! Configuration management (TOML)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub sampling: SamplingConfig,
    pub layout: LayoutConfig,
    pub paths: PathsConfig,
    pub background: BackgroundConfig,
    pub alerts: AlertsConfig,
    pub decor: DecorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Background fill as `#rrggbb`.
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub min_mb: f64,
    pub limit: usize,
    pub cpu_window_ms: u64,
    /// Key nameless processes as `unknown:<pid>` instead of one shared
    /// `unknown` bucket.
    pub split_unnamed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Area in square pixels added on top of the floor for the largest entry.
    pub area_scale: f64,
    /// Area in square pixels every circle gets regardless of memory.
    pub area_floor: f64,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub output_image: PathBuf,
    pub position_store: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub enabled: bool,
    pub command: String,
    /// `{path}` and `{uri}` are substituted with the rendered image location.
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub enabled: bool,
    pub memory_threshold_mb: f64,
    /// Minimum seconds between notifications; 0 notifies on every run.
    pub cooldown_secs: u64,
    /// Unix time of the last notification is written here.
    pub stamp_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorConfig {
    pub show_header: bool,
    pub title: String,
    /// Nodes in the faint network backdrop; 0 disables it.
    pub backdrop_nodes: usize,
    pub backdrop_color: String,
    pub backdrop_alpha: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width: 1366,
            height: 768,
            background: "#000000".to_string(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            min_mb: 50.0,
            limit: 6,
            cpu_window_ms: 100,
            split_unnamed: false,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            area_scale: 12000.0,
            area_floor: 1600.0,
            max_attempts: 200,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let data_dir = Config::data_dir();
        PathsConfig {
            output_image: data_dir.join("wallpaper.png"),
            position_store: data_dir.join("positions.json"),
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        BackgroundConfig {
            enabled: true,
            command: "gsettings".to_string(),
            args: vec![
                "set".to_string(),
                "org.gnome.desktop.background".to_string(),
                "picture-uri".to_string(),
                "{uri}".to_string(),
            ],
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        AlertsConfig {
            enabled: true,
            memory_threshold_mb: 7000.0,
            cooldown_secs: 0,
            stamp_file: Config::data_dir().join("last_alert.time"),
        }
    }
}

impl Default for DecorConfig {
    fn default() -> Self {
        DecorConfig {
            show_header: true,
            title: "SYSTEM PROCESS MONITOR".to_string(),
            backdrop_nodes: 120,
            backdrop_color: "#22d3ee".to_string(),
            backdrop_alpha: 0.05,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = toml::from_str(&content).context("parsing config TOML")?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("serializing config")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content).with_context(|| format!("writing config file {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "memscape")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    fn data_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "memscape")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
