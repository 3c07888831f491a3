//! Sliding DFT filter bank.

use super::bin::DftBin;
use super::moving_average::{MovingAverage, Smoother, Smoothing};
use super::ring_buffer::RingBuffer;
use super::tuning::Tuning;
use crate::error::Result;

/// A bank of [`DftBin`]s sharing one sample history, with optional smoothing
/// of the resulting levels.
#[derive(Debug, Clone)]
pub struct SlidingDft {
    sample_rate: u32,
    bins: Vec<DftBin>,
    levels: Vec<f32>,
    ring_buffer: RingBuffer,
    moving_average: Option<Smoother>,
}

impl SlidingDft {
    pub fn new<T: Tuning + ?Sized>(tuning: &T, smoothing: Smoothing) -> Result<Self> {
        let sample_rate = tuning.sample_rate();
        let bins = tuning
            .mapping()
            .into_iter()
            .map(|band| DftBin::new(band.k, band.n))
            .collect::<Result<Vec<_>>>()?;

        let max_n = bins.iter().map(DftBin::n).max().unwrap_or(0);
        let ring_buffer = RingBuffer::new(max_n);
        let moving_average = smoothing.build(bins.len(), sample_rate);

        log::debug!(
            "Sliding DFT: {} bands @ {}Hz, max N={}, ring capacity={}, smoothing={:?}",
            bins.len(),
            sample_rate,
            max_n,
            ring_buffer.capacity(),
            smoothing
        );

        Ok(Self {
            sample_rate,
            levels: vec![0.0; bins.len()],
            bins,
            ring_buffer,
            moving_average,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bands(&self) -> usize {
        self.bins.len()
    }

    pub fn bins(&self) -> &[DftBin] {
        &self.bins
    }

    pub fn moving_average(&self) -> Option<&Smoother> {
        self.moving_average.as_ref()
    }

    /// Processes a batch of samples and returns one level per band.
    ///
    /// `samples` is zeroed as it is consumed, so a caller can keep mixing
    /// channels into the same scratch buffer between calls. The returned
    /// slice is overwritten by the next call.
    ///
    /// With smoothing enabled and a non-empty window the result is the
    /// smoothed snapshot; otherwise it holds the raw levels after the last
    /// sample of the batch.
    pub fn process(&mut self, samples: &mut [f32], average_window_in_seconds: f64) -> &[f32] {
        if let Some(ma) = self.moving_average.as_mut() {
            ma.set_average_window_in_seconds(average_window_in_seconds);
        }

        for sample in samples.iter_mut() {
            let current = std::mem::take(sample);
            self.ring_buffer.write(current);

            for (bin, level) in self.bins.iter_mut().zip(self.levels.iter_mut()) {
                let previous = self.ring_buffer.read(bin.n());
                bin.update(previous as f64, current as f64);
                *level = bin.normalized_amplitude_spectrum() as f32;
            }

            if let Some(ma) = self.moving_average.as_mut() {
                ma.update(&self.levels);
            }
        }

        if let Some(ma) = self.moving_average.as_ref() {
            if ma.current_window() > 0 {
                for (band, level) in self.levels.iter_mut().enumerate() {
                    *level = ma.read(band) as f32;
                }
            }
        }

        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdftError;
    use crate::sdft::tuning::{PianoTuning, TuningValues};
    use std::f64::consts::PI;

    struct FixedTuning(Vec<TuningValues>);

    impl Tuning for FixedTuning {
        fn sample_rate(&self) -> u32 {
            44100
        }

        fn band_count(&self) -> usize {
            self.0.len()
        }

        fn mapping(&self) -> Vec<TuningValues> {
            self.0.clone()
        }
    }

    fn sawtooth(i: usize) -> f32 {
        ((i % 100) as f64 / 50.0 - 1.0) as f32
    }

    #[test]
    fn degenerate_mapping_aborts_construction() {
        let tuning = FixedTuning(vec![TuningValues { k: 17, n: 1700 }, TuningValues { k: 0, n: 10 }]);
        assert_eq!(
            SlidingDft::new(&tuning, Smoothing::None).unwrap_err(),
            SdftError::DcBin
        );

        let tuning = FixedTuning(vec![TuningValues { k: 3, n: 0 }]);
        assert_eq!(
            SlidingDft::new(&tuning, Smoothing::Fast).unwrap_err(),
            SdftError::EmptyWindow
        );
    }

    #[test]
    fn far_away_reference_key_fails_construction() {
        // Key 0 lands ~80 octaves below A4; its window saturates.
        let tuning = PianoTuning::with_keys(44100, 61, 1000, 440.0);
        assert!(tuning.mapping()[0].n > DftBin::MAX_WINDOW);
        assert!(matches!(
            SlidingDft::new(&tuning, Smoothing::None),
            Err(SdftError::WindowTooLong { .. })
        ));

        let tuning = PianoTuning::with_keys(44100, 61, 200, 440.0);
        assert!(matches!(
            SlidingDft::new(&tuning, Smoothing::Fast),
            Err(SdftError::WindowTooLong { .. })
        ));
    }

    #[test]
    fn consumes_and_zeroes_input() {
        let mut sdft = SlidingDft::new(&PianoTuning::new(44100), Smoothing::None).unwrap();
        let mut input: Vec<f32> = (0..128).map(sawtooth).collect();
        let levels = sdft.process(&mut input, 0.0);
        assert_eq!(levels.len(), 61);
        assert!(input.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn raw_levels_match_a_standalone_bin() {
        let tuning = FixedTuning(vec![TuningValues { k: 17, n: 1700 }, TuningValues { k: 34, n: 1700 }]);
        let mut sdft = SlidingDft::new(&tuning, Smoothing::None).unwrap();

        let mut reference = DftBin::new(17, 1700).unwrap();
        let mut history = RingBuffer::new(1700);

        let mut levels = Vec::new();
        for chunk in 0..16 {
            let mut input: Vec<f32> = (0..125).map(|i| sawtooth(chunk * 125 + i)).collect();
            for &s in &input {
                history.write(s);
                reference.update(history.read(1700) as f64, s as f64);
            }
            levels = sdft.process(&mut input, 0.0).to_vec();
        }

        assert_eq!(levels[0], reference.normalized_amplitude_spectrum() as f32);
        assert!((levels[0] as f64 - 0.779747).abs() < 1e-5, "{}", levels[0]);
        // Second harmonic of a sawtooth is half as strong as the fundamental.
        assert!((levels[1] as f64 - levels[0] as f64 / 2.0).abs() < 0.01);
    }

    #[test]
    fn silence_yields_zero_levels() {
        let mut sdft = SlidingDft::new(&PianoTuning::new(44100), Smoothing::Fast).unwrap();
        let mut input = vec![0.0f32; 256];
        let levels = sdft.process(&mut input, 0.05);
        assert!(levels.iter().all(|&l| l == 0.0));
    }

    #[test]
    fn pure_tone_lights_its_key() {
        let tuning = PianoTuning::new(44100);
        let a4 = tuning.key_to_frequency(33.0);
        let mut sdft = SlidingDft::new(&tuning, Smoothing::None).unwrap();

        let mut levels = Vec::new();
        for block in 0..100 {
            let mut input: Vec<f32> = (0..128)
                .map(|i| {
                    let t = (block * 128 + i) as f64 / 44100.0;
                    (2.0 * PI * a4 * t).sin() as f32
                })
                .collect();
            levels = sdft.process(&mut input, 0.0).to_vec();
        }

        let loudest = levels
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(key, _)| key);
        assert_eq!(loudest, Some(33));
        assert!(levels[33] > 0.9, "A4 level {}", levels[33]);
        assert!(levels.iter().all(|l| (0.0..=1.0).contains(l)));
    }

    #[test]
    fn empty_smoothing_window_returns_raw_levels() {
        let mut smoothed = SlidingDft::new(&PianoTuning::new(44100), Smoothing::Fast).unwrap();
        let mut raw = SlidingDft::new(&PianoTuning::new(44100), Smoothing::None).unwrap();

        for block in 0..50 {
            let mut a: Vec<f32> = (0..128).map(|i| sawtooth(block * 128 + i)).collect();
            let mut b = a.clone();
            let smoothed_levels = smoothed.process(&mut a, 0.0).to_vec();
            let raw_levels = raw.process(&mut b, 0.0);
            assert_eq!(smoothed_levels, raw_levels);
        }
    }

    #[test]
    fn heavy_and_fast_agree_on_steady_tone() {
        let tuning = PianoTuning::new(44100);
        let mut fast = SlidingDft::new(&tuning, Smoothing::Fast).unwrap();
        let mut heavy = SlidingDft::new(
            &tuning,
            Smoothing::Heavy {
                max_window_seconds: 0.1,
            },
        )
        .unwrap();

        let mut fast_levels = Vec::new();
        let mut heavy_levels = Vec::new();
        for block in 0..2000 {
            let mut a: Vec<f32> = (0..128).map(|i| sawtooth(block * 128 + i)).collect();
            let mut b = a.clone();
            fast_levels = fast.process(&mut a, 0.02).to_vec();
            heavy_levels = heavy.process(&mut b, 0.02).to_vec();
        }

        assert!(
            (fast_levels[33] - heavy_levels[33]).abs() < 0.01,
            "fast {} vs heavy {}",
            fast_levels[33],
            heavy_levels[33]
        );
    }
}
