use std::time::{Duration, Instant};

use pianolizer::Pianolizer;

pub const BENCHMARK_SAMPLES: usize = 1_280_000;
pub const BATCH: usize = 128;
/// Keys reported after a run: A3, A4, A5, E6 and A6 on the default keyboard.
pub const REPORTED_KEYS: [usize; 5] = [21, 33, 45, 52, 57];

pub struct BenchmarkReport {
    pub samples: usize,
    pub elapsed: Duration,
    pub levels: Vec<f32>,
}

impl BenchmarkReport {
    pub fn samples_per_second(&self) -> f64 {
        self.samples as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }
}

/// 441 Hz at 44.1 kHz: one period every 100 samples.
fn sawtooth(i: usize) -> f32 {
    ((i % 100) as f64 / 50.0 - 1.0) as f32
}

/// Feeds `samples` samples of a sawtooth through `pianolizer` in fixed
/// batches and times it.
pub fn run(pianolizer: &mut Pianolizer, samples: usize, average_window: f64) -> BenchmarkReport {
    let mut input = vec![0.0f32; BATCH];
    let mut levels = vec![0.0f32; pianolizer.key_count()];
    let mut fed = 0;

    let start = Instant::now();
    while fed < samples {
        let len = BATCH.min(samples - fed);
        for (i, sample) in input[..len].iter_mut().enumerate() {
            *sample = sawtooth(fed + i);
        }
        levels.copy_from_slice(pianolizer.process(&mut input[..len], average_window));
        fed += len;
    }
    let elapsed = start.elapsed();

    BenchmarkReport {
        samples: fed,
        elapsed,
        levels,
    }
}
