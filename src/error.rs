use thiserror::Error;

/// Configuration requests the analyzer refused.
///
/// A rejected request never changes state: whatever was configured before
/// the call stays active.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzerError {
    #[error("unsupported FFT size {0} (expected a power of two in 16..=32768)")]
    UnsupportedFftSize(usize),

    #[error("frame count must be at least 1, got {0}")]
    InvalidFrameCount(usize),

    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f64),

    #[error("invalid frequency range {min} Hz .. {max} Hz")]
    InvalidFrequencyRange { min: f64, max: f64 },
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
