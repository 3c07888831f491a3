//! # Moving averages over the bank output
//!
//! Both strategies smooth one level per channel over a window measured in
//! samples. The window can be changed at any time; the effective window then
//! ramps towards the new size by one sample per update so that live parameter
//! changes never produce a jump in the output.
//!
//! - [`FastMovingAverage`] is a leaky integrator: O(channels) memory, an
//!   approximation of the boxcar average that follows the envelope well.
//! - [`HeavyMovingAverage`] keeps a history per channel and computes the
//!   exact boxcar average, at the cost of O(channels × window) memory.
//!
//! Sums are stored as `f32`; every update is computed in `f64` first.

use super::bin::DftBin;
use super::ring_buffer::RingBuffer;

/// Common interface of the smoothing strategies.
pub trait MovingAverage {
    /// Sets the target window. The first call also sets the current window.
    fn set_average_window_in_seconds(&mut self, seconds: f64);

    /// Current (not target) window, in seconds.
    fn average_window_in_seconds(&self) -> f64;

    fn current_window(&self) -> usize;

    fn target_window(&self) -> usize;

    /// Feeds one value per channel and moves the current window one step
    /// towards the target.
    fn update(&mut self, levels: &[f32]);

    /// Smoothed value of `channel`. With an empty window this is the raw
    /// accumulator.
    fn read(&self, channel: usize) -> f64;
}

/// Window size bookkeeping shared by both strategies.
#[derive(Debug, Clone)]
struct AverageWindow {
    sample_rate: f64,
    current: Option<usize>,
    target: usize,
    limit: usize,
}

impl AverageWindow {
    fn new(sample_rate: u32, limit: usize) -> Self {
        Self {
            sample_rate: sample_rate as f64,
            current: None,
            target: 0,
            limit,
        }
    }

    fn set_seconds(&mut self, seconds: f64) {
        let samples = (seconds.max(0.0) * self.sample_rate).round() as usize;
        self.target = samples.min(self.limit);
        if self.current.is_none() {
            self.current = Some(self.target);
        }
    }

    fn seconds(&self) -> f64 {
        self.current() as f64 / self.sample_rate
    }

    fn current(&self) -> usize {
        self.current.unwrap_or(0)
    }

    fn step(&mut self) {
        if let Some(current) = self.current.as_mut() {
            if self.target > *current {
                *current += 1;
            } else if self.target < *current {
                *current -= 1;
            }
        }
    }

    fn average(&self, sum: f32) -> f64 {
        match self.current() {
            0 => sum as f64,
            window => sum as f64 / window as f64,
        }
    }
}

/// Single-pole approximation of a moving average.
#[derive(Debug, Clone)]
pub struct FastMovingAverage {
    window: AverageWindow,
    sum: Vec<f32>,
}

impl FastMovingAverage {
    pub fn new(channels: usize, sample_rate: u32) -> Self {
        Self {
            window: AverageWindow::new(sample_rate, usize::MAX),
            sum: vec![0.0; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.sum.len()
    }
}

impl MovingAverage for FastMovingAverage {
    fn set_average_window_in_seconds(&mut self, seconds: f64) {
        self.window.set_seconds(seconds);
    }

    fn average_window_in_seconds(&self) -> f64 {
        self.window.seconds()
    }

    fn current_window(&self) -> usize {
        self.window.current()
    }

    fn target_window(&self) -> usize {
        self.window.target
    }

    fn update(&mut self, levels: &[f32]) {
        self.window.step();
        let window = self.window.current();
        for (sum, &level) in self.sum.iter_mut().zip(levels) {
            let current = *sum as f64;
            *sum = if window != 0 {
                (current + level as f64 - current / window as f64) as f32
            } else {
                level
            };
        }
    }

    fn read(&self, channel: usize) -> f64 {
        self.window.average(self.sum[channel])
    }
}

/// Exact boxcar moving average backed by one history buffer per channel.
#[derive(Debug, Clone)]
pub struct HeavyMovingAverage {
    window: AverageWindow,
    sum: Vec<f32>,
    history: Vec<RingBuffer>,
}

impl HeavyMovingAverage {
    /// `max_window` is the longest window, in samples, that will ever be
    /// requested; `0` means one second. Longer requests are clamped to it.
    pub fn new(channels: usize, sample_rate: u32, max_window: usize) -> Self {
        let max_window = if max_window == 0 {
            sample_rate as usize
        } else {
            max_window
        };
        Self {
            window: AverageWindow::new(sample_rate, max_window),
            sum: vec![0.0; channels],
            history: (0..channels).map(|_| RingBuffer::new(max_window)).collect(),
        }
    }

    pub fn channels(&self) -> usize {
        self.sum.len()
    }

    pub fn max_window(&self) -> usize {
        self.window.limit
    }
}

impl MovingAverage for HeavyMovingAverage {
    fn set_average_window_in_seconds(&mut self, seconds: f64) {
        self.window.set_seconds(seconds);
    }

    fn average_window_in_seconds(&self) -> f64 {
        self.window.seconds()
    }

    fn current_window(&self) -> usize {
        self.window.current()
    }

    fn target_window(&self) -> usize {
        self.window.target
    }

    fn update(&mut self, levels: &[f32]) {
        let target = self.window.target;
        let current = self.window.current;

        for ((sum, history), &value) in self.sum.iter_mut().zip(&mut self.history).zip(levels) {
            history.write(value);
            *sum = (*sum as f64 + value as f64) as f32;

            match current {
                Some(current) if target == current => {
                    *sum = (*sum as f64 - history.read(current) as f64) as f32;
                }
                // Shrinking: drop the oldest value twice to meet the
                // window edge moving in.
                Some(current) if target < current => {
                    *sum = (*sum as f64 - history.read(current) as f64) as f32;
                    *sum = (*sum as f64 - history.read(current - 1) as f64) as f32;
                }
                _ => {}
            }
        }

        self.window.step();
    }

    fn read(&self, channel: usize) -> f64 {
        self.window.average(self.sum[channel])
    }
}

/// Smoothing policy chosen when the engine is built.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Smoothing {
    None,
    #[default]
    Fast,
    /// Exact averaging with history for up to `max_window_seconds`.
    Heavy { max_window_seconds: f64 },
}

impl Smoothing {
    /// Legacy numeric selector: positive values request heavy smoothing with
    /// that many seconds of history, negative values fast smoothing, zero
    /// none.
    pub fn from_flag(max_average_window_in_seconds: f64) -> Self {
        if max_average_window_in_seconds > 0.0 {
            Self::Heavy {
                max_window_seconds: max_average_window_in_seconds,
            }
        } else if max_average_window_in_seconds < 0.0 {
            Self::Fast
        } else {
            Self::None
        }
    }

    pub fn build(self, channels: usize, sample_rate: u32) -> Option<Smoother> {
        match self {
            Self::None => None,
            Self::Fast => Some(Smoother::Fast(FastMovingAverage::new(channels, sample_rate))),
            Self::Heavy { max_window_seconds } => {
                // At least one sample, so a tiny request never falls back to
                // the one-second default.
                let max_window = (sample_rate as f64 * max_window_seconds.max(0.0))
                    .round()
                    .clamp(1.0, DftBin::MAX_WINDOW as f64) as usize;
                Some(Smoother::Heavy(HeavyMovingAverage::new(
                    channels,
                    sample_rate,
                    max_window,
                )))
            }
        }
    }
}

/// The strategy an engine actually owns.
#[derive(Debug, Clone)]
pub enum Smoother {
    Fast(FastMovingAverage),
    Heavy(HeavyMovingAverage),
}

impl MovingAverage for Smoother {
    fn set_average_window_in_seconds(&mut self, seconds: f64) {
        match self {
            Self::Fast(ma) => ma.set_average_window_in_seconds(seconds),
            Self::Heavy(ma) => ma.set_average_window_in_seconds(seconds),
        }
    }

    fn average_window_in_seconds(&self) -> f64 {
        match self {
            Self::Fast(ma) => ma.average_window_in_seconds(),
            Self::Heavy(ma) => ma.average_window_in_seconds(),
        }
    }

    fn current_window(&self) -> usize {
        match self {
            Self::Fast(ma) => ma.current_window(),
            Self::Heavy(ma) => ma.current_window(),
        }
    }

    fn target_window(&self) -> usize {
        match self {
            Self::Fast(ma) => ma.target_window(),
            Self::Heavy(ma) => ma.target_window(),
        }
    }

    #[inline]
    fn update(&mut self, levels: &[f32]) {
        match self {
            Self::Fast(ma) => ma.update(levels),
            Self::Heavy(ma) => ma.update(levels),
        }
    }

    fn read(&self, channel: usize) -> f64 {
        match self {
            Self::Fast(ma) => ma.read(channel),
            Self::Heavy(ma) => ma.read(channel),
        }
    }
}
