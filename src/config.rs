use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::{Cli, SmoothingMode};
use crate::output::Format;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub tuning: TuningConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: usize,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct TuningConfig {
    #[serde(default = "default_keys")]
    pub keys: usize,
    #[serde(default = "default_reference_key")]
    pub reference_key: usize,
    #[serde(default = "default_pitch_fork")]
    pub pitch_fork: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_average_window")]
    pub average_window: f64,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub square_root: bool,
    #[serde(default = "default_format")]
    pub format: Format,
    #[serde(default = "default_smoothing")]
    pub smoothing: SmoothingMode,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            keys: default_keys(),
            reference_key: default_reference_key(),
            pitch_fork: default_pitch_fork(),
            tolerance: default_tolerance(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            average_window: default_average_window(),
            threshold: 0.0,
            square_root: false,
            format: default_format(),
            smoothing: default_smoothing(),
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_channels() -> usize { 1 }
fn default_buffer_size() -> usize { 256 }
fn default_keys() -> usize { 61 }
fn default_reference_key() -> usize { 33 }
fn default_pitch_fork() -> f64 { 440.0 }
fn default_tolerance() -> f64 { 1.0 }
fn default_average_window() -> f64 { 0.04 }
fn default_format() -> Format { Format::Hex }
fn default_smoothing() -> SmoothingMode { SmoothingMode::Fast }

/// Explicit path first, then `./pianolizer.toml`, then the user config dirs.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("pianolizer.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("pianolizer").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("pianolizer").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Option<Config> {
    match toml::from_str(content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::debug!("Config parse error: {}", e);
            None
        }
    }
}

impl Config {
    /// Config values apply only where the CLI is still at its default.
    pub fn merge_into(self, cli: &mut Cli) {
        if cli.sample_rate == default_sample_rate() { cli.sample_rate = self.input.sample_rate; }
        if cli.channels == default_channels() { cli.channels = self.input.channels; }
        if cli.buffer_size == default_buffer_size() { cli.buffer_size = self.input.buffer_size; }
        if cli.keys == default_keys() { cli.keys = self.tuning.keys; }
        if cli.reference_key == default_reference_key() { cli.reference_key = self.tuning.reference_key; }
        if cli.pitch_fork == default_pitch_fork() { cli.pitch_fork = self.tuning.pitch_fork; }
        if cli.tolerance == default_tolerance() { cli.tolerance = self.tuning.tolerance; }
        if cli.average_window == default_average_window() { cli.average_window = self.output.average_window; }
        if cli.threshold == 0.0 { cli.threshold = self.output.threshold; }
        if !cli.square_root { cli.square_root = self.output.square_root; }
        if cli.format == default_format() { cli.format = self.output.format; }
        if cli.smoothing == default_smoothing() { cli.smoothing = self.output.smoothing; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.input.sample_rate, 44100);
        assert_eq!(config.input.buffer_size, 256);
        assert_eq!(config.tuning.keys, 61);
        assert_eq!(config.tuning.reference_key, 33);
        assert_eq!(config.output.format, Format::Hex);
        assert_eq!(config.output.smoothing, SmoothingMode::Fast);
    }

    #[test]
    fn partial_sections() {
        let config = parse_config(
            r#"
            [tuning]
            keys = 88
            reference_key = 48

            [output]
            format = "json"
            smoothing = "heavy"
            "#,
        )
        .unwrap();
        assert_eq!(config.tuning.keys, 88);
        assert_eq!(config.tuning.reference_key, 48);
        assert_eq!(config.tuning.pitch_fork, 440.0);
        assert_eq!(config.output.format, Format::Json);
        assert_eq!(config.output.smoothing, SmoothingMode::Heavy);
        assert_eq!(config.output.average_window, 0.04);
    }

    #[test]
    fn malformed_file_is_ignored() {
        assert!(parse_config("[input]\nsample_rate = \"fast\"").is_none());
        assert!(load_config(Path::new("/nonexistent/pianolizer.toml")).is_none());
    }

    #[test]
    fn explicit_cli_values_win() {
        let config = parse_config(
            r#"
            [input]
            sample_rate = 48000
            channels = 2

            [output]
            threshold = 0.1
            square_root = true
            "#,
        )
        .unwrap();

        let mut cli = Cli::try_parse_from(["pianolizer", "-s", "22050"]).unwrap();
        config.merge_into(&mut cli);
        assert_eq!(cli.sample_rate, 22050);
        assert_eq!(cli.channels, 2);
        assert_eq!(cli.threshold, 0.1);
        assert!(cli.square_root);
        assert_eq!(cli.keys, 61);
    }

    #[test]
    fn explicit_path_takes_precedence() {
        let path = Path::new("/tmp/custom.toml");
        assert_eq!(find_config(Some(path)), Some(path.to_path_buf()));
    }
}
