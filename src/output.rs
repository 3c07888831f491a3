use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Two hex digits per key
    Hex,
    /// One JSON object per line
    Json,
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

#[derive(Serialize)]
struct JsonLine<'a> {
    time: f64,
    levels: &'a [f32],
}

/// Turns one batch of key levels into a line on the output stream.
pub struct LevelWriter<W: Write> {
    out: W,
    format: Format,
    threshold: f64,
    square_root: bool,
    line: String,
    gated: Vec<f32>,
}

impl<W: Write> LevelWriter<W> {
    pub fn new(out: W, format: Format, threshold: f64, square_root: bool) -> Self {
        Self {
            out,
            format,
            threshold,
            square_root,
            line: String::new(),
            gated: Vec::new(),
        }
    }

    /// Noise gate, optional square root and clamping to `[0, 1]`.
    fn shape(&self, level: f32) -> f32 {
        let mut v = level as f64;
        if v <= self.threshold {
            v = 0.0;
        }
        if self.square_root {
            v = v.sqrt();
        }
        v.clamp(0.0, 1.0) as f32
    }

    /// Writes the levels of one batch. `time` is the amount of audio consumed
    /// so far, in seconds.
    pub fn write_levels(&mut self, levels: &[f32], time: f64) -> std::io::Result<()> {
        self.gated.clear();
        for &level in levels {
            let shaped = self.shape(level);
            self.gated.push(shaped);
        }

        self.line.clear();
        match self.format {
            Format::Hex => {
                for &v in &self.gated {
                    let byte = (255.0 * v as f64).round() as u8;
                    self.line.push(HEX_DIGITS[(byte >> 4) as usize] as char);
                    self.line.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
                }
            }
            Format::Json => {
                let record = JsonLine {
                    time,
                    levels: &self.gated,
                };
                self.line = serde_json::to_string(&record)?;
            }
        }
        self.line.push('\n');

        self.out.write_all(self.line.as_bytes())?;
        self.out.flush()
    }
}
