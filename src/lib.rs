//! Real-time overlapped spectrum analysis for a live audio stream.
//!
//! Samples cross from the audio thread to the UI thread through a lock-free
//! queue, are transformed by several staggered windowed FFT frames, and are
//! resampled onto a logarithmic frequency axis with decay and peak hold.

pub mod analyzer;
pub mod config;
pub mod display;
pub mod error;
pub mod fft_analysis;
pub mod make_waves;
pub mod resampler;
pub mod sample_queue;
pub mod utils;
pub mod wav_input;
pub mod window;

pub use analyzer::{SpectrumAnalyzer, SpectrumSender, TickStats};
pub use config::AnalyzerConfig;
pub use display::SpectralDisplay;
pub use error::AnalyzerError;
pub use fft_analysis::{FFTConfig, OverlappedFftEngine};
pub use resampler::{DecayMode, DisplayColumn, LogFrequencyResampler};
pub use sample_queue::{sample_queue, SampleConsumer, SampleProducer};
pub use window::{WindowTable, WindowType};
