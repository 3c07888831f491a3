use super::moving_average::{Smoother, Smoothing};
use super::sliding_dft::SlidingDft;
use super::tuning::{PianoTuning, Tuning};
use crate::error::Result;

/// Piano-keyboard front end of the [`SlidingDft`]: one level per key.
#[derive(Debug, Clone)]
pub struct Pianolizer {
    tuning: PianoTuning,
    sdft: SlidingDft,
}

impl Pianolizer {
    /// 61 keys from C2, A4 = 440 Hz, fast smoothing.
    pub fn new(sample_rate: u32) -> Result<Self> {
        Self::with_tuning(PianoTuning::new(sample_rate), Smoothing::Fast)
    }

    pub fn with_tuning(tuning: PianoTuning, smoothing: Smoothing) -> Result<Self> {
        let sdft = SlidingDft::new(&tuning, smoothing)?;
        Ok(Self { tuning, sdft })
    }

    pub fn tuning(&self) -> &PianoTuning {
        &self.tuning
    }

    pub fn sample_rate(&self) -> u32 {
        self.tuning.sample_rate()
    }

    pub fn moving_average(&self) -> Option<&Smoother> {
        self.sdft.moving_average()
    }

    pub fn key_count(&self) -> usize {
        self.sdft.bands()
    }

    /// See [`SlidingDft::process`]; `samples` is zeroed.
    #[inline]
    pub fn process(&mut self, samples: &mut [f32], average_window_in_seconds: f64) -> &[f32] {
        self.sdft.process(samples, average_window_in_seconds)
    }
}
