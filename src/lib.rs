//! Real-time piano key detection with a bank of Sliding DFT filters.
//!
//! ```no_run
//! use pianolizer::Pianolizer;
//!
//! let mut pianolizer = Pianolizer::new(44100)?;
//! let mut samples = vec![0.0f32; 128];
//! let levels = pianolizer.process(&mut samples, 0.04);
//! assert_eq!(levels.len(), 61);
//! # Ok::<(), pianolizer::SdftError>(())
//! ```

pub mod audio;
pub mod error;
pub mod sdft;

pub use error::SdftError;
pub use sdft::{Pianolizer, PianoTuning, Smoothing, SlidingDft, Tuning};
