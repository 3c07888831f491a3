use thiserror::Error;

/// Configuration errors raised while building the filter bank.
///
/// These only occur at construction time; `process` never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SdftError {
    #[error("k=0 (DC) is not supported")]
    DcBin,
    #[error("N=0 is not a valid window length")]
    EmptyWindow,
    #[error("{name} must be an integer, got {value}")]
    NonIntegral { name: &'static str, value: f64 },
    #[error("N={n} exceeds the longest supported window of {max} samples")]
    WindowTooLong { n: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, SdftError>;
