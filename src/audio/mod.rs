//! Getting samples into the engine: raw PCM from a stream, decoded files, and
//! channel mixdown.

pub mod decode;
pub mod input;
pub mod mixdown;
