use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

use crate::output::Format;

/// Lowest frequency key 0 may be tuned to.
const MIN_KEY_FREQUENCY: f64 = 8.0;

#[derive(Parser, Debug)]
#[command(
    name = "pianolizer",
    version,
    about = "Detects piano key levels in audio with a bank of Sliding DFT filters"
)]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC); raw 32-bit float PCM is
    /// read from stdin when omitted
    pub input: Option<PathBuf>,

    /// Samples per channel processed per output line
    #[arg(short, long, default_value_t = 256)]
    pub buffer_size: usize,

    /// Interleaved channels on stdin
    #[arg(short, long, default_value_t = 1)]
    pub channels: usize,

    /// Sample rate of the stdin stream in Hz
    #[arg(short, long, default_value_t = 44100)]
    pub sample_rate: u32,

    /// Frequency of the reference key in Hz
    #[arg(short, long, default_value_t = 440.0)]
    pub pitch_fork: f64,

    /// Number of keys
    #[arg(short, long, default_value_t = 61)]
    pub keys: usize,

    /// Index of the key tuned to the pitch fork
    #[arg(short, long, default_value_t = 33)]
    pub reference_key: usize,

    /// Averaging window in seconds (0 disables smoothing of the output)
    #[arg(short, long, default_value_t = 0.04)]
    pub average_window: f64,

    /// Levels at or below this value are printed as zero
    #[arg(short, long, default_value_t = 0.0)]
    pub threshold: f64,

    /// Fraction of a half-step each filter listens to (0.01-1.0)
    #[arg(short = 'x', long, default_value_t = 1.0)]
    pub tolerance: f64,

    /// Print the square root of each level (boosts quiet keys)
    #[arg(short = 'y', long)]
    pub square_root: bool,

    /// Smoothing strategy
    #[arg(long, value_enum, default_value_t = SmoothingMode::Fast)]
    pub smoothing: SmoothingMode,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Hex)]
    pub format: Format,

    /// Config file (defaults to ./pianolizer.toml or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the key to filter mapping and exit
    #[arg(long)]
    pub list_keys: bool,

    /// Time the engine on a synthetic signal and exit
    #[arg(long)]
    pub benchmark: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMode {
    /// Single-pole approximation, constant memory
    Fast,
    /// Exact moving average; history covers one second or the average window
    Heavy,
    /// Raw filter levels
    None,
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(8000..=200_000).contains(&self.sample_rate) {
            anyhow::bail!("Sample rate must be between 8000 and 200000 Hz, got {}", self.sample_rate);
        }
        if self.buffer_size == 0 {
            anyhow::bail!("Buffer size must be positive");
        }
        if self.channels == 0 {
            anyhow::bail!("Channel count must be positive");
        }
        if self.keys == 0 {
            anyhow::bail!("Key count must be positive");
        }
        if !(self.pitch_fork.is_finite() && self.pitch_fork > 0.0) {
            anyhow::bail!("Pitch fork must be a positive frequency, got {}", self.pitch_fork);
        }
        // Keeps the lowest filter window within reach of the engine.
        let lowest = self.pitch_fork * 2f64.powf(-(self.reference_key as f64) / 12.0);
        if lowest < MIN_KEY_FREQUENCY {
            anyhow::bail!(
                "Reference key {} puts key 0 at {:.3e}Hz, below {}Hz",
                self.reference_key,
                lowest,
                MIN_KEY_FREQUENCY
            );
        }
        if !(0.01..=1.0).contains(&self.tolerance) {
            anyhow::bail!("Tolerance must be between 0.01 and 1.0, got {}", self.tolerance);
        }
        if !(self.average_window.is_finite() && self.average_window >= 0.0) {
            anyhow::bail!("Average window must be a non-negative number of seconds");
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            anyhow::bail!("Threshold must be between 0 and 1, got {}", self.threshold);
        }
        Ok(())
    }
}
