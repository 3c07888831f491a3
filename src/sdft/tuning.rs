//! # Filter bank tuning
//!
//! Maps every band of the filter bank to the integer `(k, N)` pair that a
//! [`DftBin`](super::DftBin) needs. The piano tuning uses twelve-tone equal
//! temperament relative to a reference key (A4 = 440 Hz by default) and sizes
//! each window so that its bandwidth spans one half-step.

use serde::Serialize;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Frequency index and window length for one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TuningValues {
    pub k: usize,
    pub n: usize,
}

/// A strategy that decides which frequencies the filter bank listens to.
pub trait Tuning {
    fn sample_rate(&self) -> u32;

    fn band_count(&self) -> usize;

    /// One `(k, N)` pair per band, lowest band first.
    fn mapping(&self) -> Vec<TuningValues>;

    /// Approximates `frequency`/`bandwidth` with integer `k` and `N`.
    ///
    /// `k` is fixed by the nominal bandwidth; `N` is then shortened for as
    /// long as that brings `sample_rate * k / N` closer to `frequency`. The
    /// search stops at the first step that does not improve, so this is a
    /// local minimum. Bands come out slightly wider than requested and
    /// overlap a bit, in exchange for shorter windows.
    fn frequency_and_bandwidth_to_k_and_n(&self, frequency: f64, bandwidth: f64) -> TuningValues {
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            // Rejected later as a DC bin.
            return TuningValues { k: 0, n: 0 };
        }

        let sample_rate = self.sample_rate() as f64;
        let k = (frequency / bandwidth).floor();
        let mut n = (sample_rate / bandwidth).floor();

        let mut delta = (sample_rate * (k / n) - frequency).abs();
        let mut candidate = n - 1.0;
        while candidate >= 1.0 {
            let candidate_delta = (sample_rate * (k / candidate) - frequency).abs();
            if candidate_delta < delta {
                delta = candidate_delta;
                n = candidate;
                candidate -= 1.0;
            } else {
                break;
            }
        }

        TuningValues {
            k: k.max(0.0) as usize,
            n: n.max(0.0) as usize,
        }
    }
}

/// Per-band details of a [`PianoTuning`], for listings and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct PianoBand {
    pub key: usize,
    pub name: String,
    pub frequency: f64,
    pub bandwidth: f64,
    #[serde(flatten)]
    pub values: TuningValues,
}

/// Equal-temperament tuning of a piano keyboard.
#[derive(Debug, Clone)]
pub struct PianoTuning {
    sample_rate: u32,
    keys: usize,
    reference_key: usize,
    pitch_fork: f64,
    tolerance: f64,
}

impl PianoTuning {
    pub const DEFAULT_KEYS: usize = 61;
    /// A4 on a 61-key keyboard starting at C2.
    pub const DEFAULT_REFERENCE_KEY: usize = 33;
    pub const DEFAULT_PITCH_FORK: f64 = 440.0;
    pub const DEFAULT_TOLERANCE: f64 = 1.0;

    pub fn new(sample_rate: u32) -> Self {
        Self::with_keys(
            sample_rate,
            Self::DEFAULT_KEYS,
            Self::DEFAULT_REFERENCE_KEY,
            Self::DEFAULT_PITCH_FORK,
        )
    }

    pub fn with_keys(sample_rate: u32, keys: usize, reference_key: usize, pitch_fork: f64) -> Self {
        Self {
            sample_rate,
            keys,
            reference_key,
            pitch_fork,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }

    /// Fraction of a half-step used as bandwidth, in `(0, 1]`. Lower values
    /// make narrower (longer) filters.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn reference_key(&self) -> usize {
        self.reference_key
    }

    pub fn pitch_fork(&self) -> f64 {
        self.pitch_fork
    }

    /// Fundamental frequency of `key`; fractional keys are allowed.
    pub fn key_to_frequency(&self, key: f64) -> f64 {
        self.pitch_fork * 2f64.powf((key - self.reference_key as f64) / 12.0)
    }

    /// Scientific pitch name of `key`, e.g. `A4` for the reference key.
    pub fn key_name(&self, key: usize) -> String {
        // Offset from the C that starts the reference key's octave.
        let semitones = key as i64 - self.reference_key as i64 + 9;
        let note = semitones.rem_euclid(12) as usize;
        let octave = 4 + semitones.div_euclid(12);
        format!("{}{}", NOTE_NAMES[note], octave)
    }

    fn frequency_and_bandwidth(&self, key: usize) -> (f64, f64) {
        let frequency = self.key_to_frequency(key as f64);
        let bandwidth =
            2.0 * (self.key_to_frequency(key as f64 + 0.5 * self.tolerance) - frequency);
        (frequency, bandwidth)
    }

    pub fn bands(&self) -> Vec<PianoBand> {
        (0..self.keys)
            .map(|key| {
                let (frequency, bandwidth) = self.frequency_and_bandwidth(key);
                PianoBand {
                    key,
                    name: self.key_name(key),
                    frequency,
                    bandwidth,
                    values: self.frequency_and_bandwidth_to_k_and_n(frequency, bandwidth),
                }
            })
            .collect()
    }
}

impl Tuning for PianoTuning {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn band_count(&self) -> usize {
        self.keys
    }

    fn mapping(&self) -> Vec<TuningValues> {
        (0..self.keys)
            .map(|key| {
                let (frequency, bandwidth) = self.frequency_and_bandwidth(key);
                self.frequency_and_bandwidth_to_k_and_n(frequency, bandwidth)
            })
            .collect()
    }
}
