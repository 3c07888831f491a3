//! Single-bin Sliding DFT filter.

use std::f64::consts::{PI, SQRT_2};

use super::complex::{phasor, Complex};
use crate::error::{Result, SdftError};

/// Reference amplitude for `decibels` (0 dB full scale).
const REFERENCE_AMPLITUDE: f64 = 1.0;

/// One recursively updated DFT coefficient: frequency index `k` over a
/// window of `n` samples.
#[derive(Debug, Clone)]
pub struct DftBin {
    k: usize,
    n: usize,
    coeff: Complex,
    r: f64,
    dft: Complex,
    total_power: f64,
}

impl DftBin {
    /// Longest window a bin accepts, in samples. Anything longer comes from a
    /// tuning far outside the audible range.
    pub const MAX_WINDOW: usize = 1 << 24;

    pub fn new(k: usize, n: usize) -> Result<Self> {
        if k == 0 {
            return Err(SdftError::DcBin);
        }
        if n == 0 {
            return Err(SdftError::EmptyWindow);
        }
        if n > Self::MAX_WINDOW {
            return Err(SdftError::WindowTooLong {
                n,
                max: Self::MAX_WINDOW,
            });
        }

        let q = 2.0 * PI * k as f64 / n as f64;
        Ok(Self {
            k,
            n,
            coeff: phasor(q),
            r: SQRT_2 / (n as f64).sqrt(),
            dft: Complex::new(0.0, 0.0),
            total_power: 0.0,
        })
    }

    /// Builds a bin from floating-point tuning values, rejecting anything
    /// that is not a whole number.
    pub fn from_real(k: f64, n: f64) -> Result<Self> {
        let k = integral("k", k)?;
        let n = integral("N", n)?;
        Self::new(k, n)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Slides the window by one sample. `previous_sample` is the sample
    /// leaving the window (written `n` samples ago).
    #[inline]
    pub fn update(&mut self, previous_sample: f64, current_sample: f64) {
        self.total_power += current_sample * current_sample;
        self.total_power -= previous_sample * previous_sample;

        self.dft = (self.dft - previous_sample + current_sample) * self.coeff;
    }

    pub fn rms(&self) -> f64 {
        (self.total_power / self.n as f64).sqrt()
    }

    pub fn amplitude_spectrum(&self) -> f64 {
        SQRT_2 * self.dft.norm() / self.n as f64
    }

    /// Amplitude relative to the window RMS, in `[0, 1]` for a pure tone.
    /// Same as `amplitude_spectrum() / rms()` with one square root fewer.
    #[inline]
    pub fn normalized_amplitude_spectrum(&self) -> f64 {
        if self.total_power > 0.0 {
            self.r * (self.dft.norm_sqr() / self.total_power).sqrt()
        } else {
            0.0
        }
    }

    pub fn decibels(&self) -> f64 {
        20.0 * (self.amplitude_spectrum() / REFERENCE_AMPLITUDE).log10()
    }
}

fn integral(name: &'static str, value: f64) -> Result<usize> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(SdftError::NonIntegral { name, value })
    }
}
