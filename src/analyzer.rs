//! The two halves of the analyzer as a plugin wires them.
//!
//! [`SpectrumSender`] lives on the audio thread and only pushes samples.
//! [`SpectrumAnalyzer`] lives on the UI thread: `tick()` drains the queue
//! into the FFT engine and `refresh()` produces display columns.

use log::{debug, info};

use crate::config::AnalyzerConfig;
use crate::display::SpectralDisplay;
use crate::error::Result;
use crate::fft_analysis::OverlappedFftEngine;
use crate::resampler::{DecayMode, DisplayColumn, LogFrequencyResampler};
use crate::sample_queue::{sample_queue, SampleConsumer, SampleProducer};
use crate::window::WindowType;

/// Audio-thread side. Never blocks, never allocates.
pub struct SpectrumSender {
    producer: SampleProducer,
}

impl SpectrumSender {
    /// Mono-sums a planar block and queues it. Returns samples accepted.
    #[inline]
    pub fn process_block(&mut self, channels: &[&[f32]]) -> usize {
        self.producer.push_block(channels)
    }

    #[inline]
    pub fn push(&mut self, sample: f32) -> bool {
        self.producer.push(sample)
    }

    pub fn dropped(&self) -> u64 {
        self.producer.dropped()
    }

    /// Free queue slots as seen from the audio side.
    pub fn vacant(&self) -> usize {
        self.producer.vacant()
    }

    pub fn capacity(&self) -> usize {
        self.producer.capacity()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub drained: usize,
    pub transforms: usize,
}

/// UI-thread side: owns the queue consumer, the engine and the resampler.
pub struct SpectrumAnalyzer {
    consumer: SampleConsumer,
    engine: OverlappedFftEngine,
    resampler: LogFrequencyResampler,
    display: SpectralDisplay,
    bins: Vec<f32>,
    decay: f32,
    peak_decay: f32,
}

impl SpectrumAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<(SpectrumSender, SpectrumAnalyzer)> {
        let engine = OverlappedFftEngine::new(config.fft)?;
        let mut resampler = LogFrequencyResampler::new(
            config.width,
            config.min_frequency,
            config.max_frequency,
            config.sample_rate,
        )?;
        resampler.set_decay_mode(config.decay_mode);

        let (producer, consumer) = sample_queue(config.effective_queue_size());
        info!(
            "Spectrum analyzer ready: queue {} samples, {} columns {:.1} Hz .. {:.1} Hz",
            consumer.capacity(),
            resampler.width(),
            resampler.min_freq(),
            resampler.max_freq()
        );

        let analyzer = SpectrumAnalyzer {
            consumer,
            bins: vec![0.0; engine.bin_count()],
            engine,
            resampler,
            display: config.display(),
            decay: config.decay,
            peak_decay: config.peak_decay,
        };
        Ok((SpectrumSender { producer }, analyzer))
    }

    /// Drains every queued sample into the engine.
    pub fn tick(&mut self) -> TickStats {
        let engine = &mut self.engine;
        let mut transforms = 0;
        let drained = self.consumer.drain(|sample| {
            if engine.process(sample) {
                transforms += 1;
            }
        });
        TickStats { drained, transforms }
    }

    /// Resamples the current spectrum onto the display columns.
    pub fn refresh(&mut self) -> &[DisplayColumn] {
        let n = self.engine.bin_count();
        if self.bins.len() != n {
            self.bins.resize(n, 0.0);
        }
        self.engine.copy_spectrum(&mut self.bins);
        self.resampler.resample(&self.bins, self.decay, self.peak_decay)
    }

    /// Display levels `(value, peak)` in `[0, 1]` for the latest refresh.
    pub fn levels(&self) -> Vec<(f32, f32)> {
        self.display
            .levels(self.resampler.columns(), self.resampler.min_freq())
    }

    pub fn set_fft_size(&mut self, fft_size: usize) -> Result<()> {
        self.engine.set_fft_size(fft_size)?;
        self.resampler.reset();
        Ok(())
    }

    pub fn set_window_type(&mut self, window_type: WindowType) -> Result<()> {
        self.engine.set_window_type(window_type)
    }

    pub fn set_frame_count(&mut self, frame_count: usize) -> Result<()> {
        self.engine.set_frame_count(frame_count)
    }

    pub fn set_frequency_range(&mut self, min_freq: f64, max_freq: f64) -> Result<()> {
        self.resampler.configure(
            self.resampler.width(),
            min_freq,
            max_freq,
            self.resampler.sample_rate(),
        )
    }

    pub fn set_width(&mut self, width: usize) -> Result<()> {
        self.resampler.set_width(width)
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<()> {
        self.resampler.set_sample_rate(sample_rate)
    }

    pub fn set_decay(&mut self, decay: f32, peak_decay: f32) {
        debug!("Decay set to {} / peak {}", decay, peak_decay);
        self.decay = decay;
        self.peak_decay = peak_decay;
    }

    pub fn set_decay_mode(&mut self, mode: DecayMode) {
        self.resampler.set_decay_mode(mode);
    }

    /// Discards queued samples and clears engine and display state.
    pub fn clear(&mut self) {
        let discarded = self.consumer.clear();
        self.engine.reset();
        self.resampler.reset();
        debug!("Analyzer cleared, {} queued samples discarded", discarded);
    }

    pub fn engine(&self) -> &OverlappedFftEngine {
        &self.engine
    }

    pub fn resampler(&self) -> &LogFrequencyResampler {
        &self.resampler
    }

    pub fn display(&self) -> &SpectralDisplay {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut SpectralDisplay {
        &mut self.display
    }

    pub fn pending(&self) -> usize {
        self.consumer.available()
    }

    pub fn queue_capacity(&self) -> usize {
        self.consumer.capacity()
    }
}
