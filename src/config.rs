use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::playback::scheduler::DEFAULT_INTERVAL;
use crate::playback::seek::DEFAULT_TOLERANCE;
use crate::render::theme::Theme;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct VisualConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_seek_tolerance")]
    pub seek_tolerance: f64,
    #[serde(default = "default_analysis_rate")]
    pub analysis_rate: u32,
    #[serde(default)]
    pub mute: bool,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            window_size: default_window_size(),
            sensitivity: default_sensitivity(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            seek_tolerance: default_seek_tolerance(),
            analysis_rate: default_analysis_rate(),
            mute: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_window_size() -> usize { 2048 }
fn default_sensitivity() -> f32 { 1.0 }
fn default_interval_ms() -> u64 { DEFAULT_INTERVAL.as_millis() as u64 }
fn default_seek_tolerance() -> f64 { DEFAULT_TOLERANCE }
pub fn default_analysis_rate() -> u32 { 22050 }
fn default_width() -> u32 { 1200 }
fn default_height() -> u32 { 400 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("Invalid config {}: {}", path.display(), e);
            None
        }
    }
}

/// Explicit path, else `./sonosync.toml`, `~/.config/sonosync/config.toml`,
/// then the platform config dir.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("sonosync.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("sonosync").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("sonosync").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

impl Config {
    /// Config values apply only where the CLI is still at its default.
    pub fn merge_into(self, cli: &mut Cli) {
        if cli.theme == Theme::default() { cli.theme = self.visual.theme; }
        if cli.window == default_window_size() { cli.window = self.visual.window_size; }
        if cli.sensitivity == default_sensitivity() { cli.sensitivity = self.visual.sensitivity; }
        if cli.interval_ms == default_interval_ms() { cli.interval_ms = self.playback.interval_ms; }
        if cli.seek_tolerance == default_seek_tolerance() {
            cli.seek_tolerance = self.playback.seek_tolerance;
        }
        if !cli.mute { cli.mute = self.playback.mute; }
        if cli.width == default_width() { cli.width = self.output.width; }
        if cli.height == default_height() { cli.height = self.output.height; }
    }
}

/// Reject settings outside their supported ranges.
pub fn validate(cli: &Cli) -> Result<(), ConfigError> {
    if !cli.window.is_power_of_two() || !(512..=4096).contains(&cli.window) {
        return Err(ConfigError::WindowSize(cli.window));
    }
    if !(0.5..=5.0).contains(&cli.sensitivity) {
        return Err(ConfigError::Sensitivity(cli.sensitivity));
    }
    if !(0.1..=1.0).contains(&cli.seek_tolerance) {
        return Err(ConfigError::SeekTolerance(cli.seek_tolerance));
    }
    if !(5..=1000).contains(&cli.interval_ms) {
        return Err(ConfigError::Interval(cli.interval_ms));
    }
    Ok(())
}
