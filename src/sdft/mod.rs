//! Sliding DFT engine.

mod bin;
mod complex;
mod moving_average;
mod pianolizer;
mod ring_buffer;
mod sliding_dft;
mod tuning;

pub use bin::DftBin;
pub use complex::{phasor, Complex};
pub use moving_average::{
    FastMovingAverage, HeavyMovingAverage, MovingAverage, Smoother, Smoothing,
};
pub use pianolizer::Pianolizer;
pub use ring_buffer::RingBuffer;
pub use sliding_dft::SlidingDft;
pub use tuning::{PianoBand, PianoTuning, Tuning, TuningValues};
