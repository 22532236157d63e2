use std::sync::Arc;

use log::{debug, info, warn};
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::utils::{fft_gain, is_supported_fft_size, DEFAULT_FFT_SIZE, DEFAULT_FRAME_COUNT};
use crate::window::{WindowTable, WindowType};

/// Configuration struct for FFT settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FFTConfig {
    pub fft_size: usize,
    pub frame_count: usize,  // Staggered frames; more frames = smoother, more CPU
    pub window_type: WindowType,
}

impl Default for FFTConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            frame_count: DEFAULT_FRAME_COUNT,
            window_type: WindowType::Hann,
        }
    }
}

impl FFTConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_supported_fft_size(self.fft_size) {
            return Err(AnalyzerError::UnsupportedFftSize(self.fft_size));
        }
        if self.frame_count == 0 {
            return Err(AnalyzerError::InvalidFrameCount(self.frame_count));
        }
        Ok(())
    }
}

/// One staggered analysis frame.
struct AnalysisFrame {
    cursor: usize,
    samples: Vec<f32>,    // Windowed input, written at `cursor`
    magnitudes: Vec<f32>, // Latest transform, fft_size / 2 + 1 bins
}

/// Initial write cursor of frame `k` so the frames' transforms are spread
/// evenly in time.
pub fn stagger_offset(fft_size: usize, frame_count: usize, overlap: f64, k: usize) -> usize {
    if k == 0 || frame_count <= 1 {
        return 0;
    }
    let spacing = fft_size as f64 / frame_count as f64 * (0.5 / overlap);
    let pos = (spacing * k as f64).round() as usize;
    pos.min(fft_size - 1)
}

/// Serial-to-spectrum converter using several overlapped windows.
///
/// Every sample goes into every frame at that frame's own cursor. A frame
/// whose cursor reaches the FFT size is transformed and its magnitudes
/// replace the previous ones; [`bin`](Self::bin) averages across frames.
pub struct OverlappedFftEngine {
    config: FFTConfig,
    window: WindowTable,
    frames: Vec<AnalysisFrame>,
    fft: Arc<dyn RealToComplex<f32>>,
    planner: RealFftPlanner<f32>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    gain: f32,
}

impl OverlappedFftEngine {
    pub fn new(config: FFTConfig) -> Result<Self> {
        config.validate()?;

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let mut engine = Self {
            config,
            window: WindowTable::new(config.window_type, config.fft_size),
            frames: Vec::new(),
            input: fft.make_input_vec(),
            spectrum: fft.make_output_vec(),
            scratch: fft.make_scratch_vec(),
            fft,
            planner,
            gain: fft_gain(config.fft_size),
        };
        engine.reset();

        info!(
            "FFT engine ready: size {}, {} frame(s), {} window",
            config.fft_size,
            config.frame_count,
            config.window_type.name()
        );
        Ok(engine)
    }

    /// Applies a new size, frame count and window. An invalid request is
    /// rejected and the current configuration stays in effect.
    pub fn configure(
        &mut self,
        fft_size: usize,
        frame_count: usize,
        window_type: WindowType,
    ) -> Result<()> {
        let next = FFTConfig {
            fft_size,
            frame_count,
            window_type,
        };
        if let Err(e) = next.validate() {
            warn!("Rejected FFT configuration {:?}: {}", next, e);
            return Err(e);
        }

        if next.fft_size != self.config.fft_size {
            self.fft = self.planner.plan_fft_forward(next.fft_size);
            self.input = self.fft.make_input_vec();
            self.spectrum = self.fft.make_output_vec();
            self.scratch = self.fft.make_scratch_vec();
            self.gain = fft_gain(next.fft_size);
        }
        self.config = next;
        self.window.rebuild(window_type, fft_size);
        self.reset();

        debug!(
            "FFT engine reconfigured: size {}, {} frame(s), {} window, cursors {:?}",
            fft_size,
            frame_count,
            window_type.name(),
            self.frame_cursors()
        );
        Ok(())
    }

    pub fn set_fft_size(&mut self, fft_size: usize) -> Result<()> {
        self.configure(fft_size, self.config.frame_count, self.config.window_type)
    }

    pub fn set_frame_count(&mut self, frame_count: usize) -> Result<()> {
        self.configure(self.config.fft_size, frame_count, self.config.window_type)
    }

    pub fn set_window_type(&mut self, window_type: WindowType) -> Result<()> {
        self.configure(self.config.fft_size, self.config.frame_count, window_type)
    }

    /// Zeroes every buffer and puts the frame cursors back on the stagger
    /// schedule. Configuration is unchanged.
    pub fn reset(&mut self) {
        let FFTConfig {
            fft_size,
            frame_count,
            window_type,
        } = self.config;
        let bins = fft_size / 2 + 1;
        let overlap = window_type.overlap_fraction();

        self.frames.resize_with(frame_count, || AnalysisFrame {
            cursor: 0,
            samples: Vec::new(),
            magnitudes: Vec::new(),
        });
        for (k, frame) in self.frames.iter_mut().enumerate() {
            frame.samples.clear();
            frame.samples.resize(fft_size, 0.0);
            frame.magnitudes.clear();
            frame.magnitudes.resize(bins, 0.0);
            frame.cursor = stagger_offset(fft_size, frame_count, overlap, k);
        }
    }

    /// Feeds one sample. Returns true if any frame completed a transform.
    pub fn process(&mut self, sample: f32) -> bool {
        let fft_size = self.config.fft_size;
        let mut transformed = false;

        for frame in self.frames.iter_mut() {
            let pos = frame.cursor;
            frame.samples[pos] = sample * self.window.get(pos);
            frame.cursor += 1;
            if frame.cursor >= fft_size {
                frame.cursor = 0;
                Self::transform(
                    self.fft.as_ref(),
                    &frame.samples,
                    &mut self.input,
                    &mut self.spectrum,
                    &mut self.scratch,
                    &mut frame.magnitudes,
                    self.gain,
                );
                transformed = true;
            }
        }
        transformed
    }

    // The real FFT uses its input as scratch, so the frame is copied first to
    // keep the frame's history intact for the next pass.
    fn transform(
        fft: &dyn RealToComplex<f32>,
        samples: &[f32],
        input: &mut [f32],
        spectrum: &mut [Complex<f32>],
        scratch: &mut [Complex<f32>],
        magnitudes: &mut [f32],
        gain: f32,
    ) {
        input.copy_from_slice(samples);
        if fft.process_with_scratch(input, spectrum, scratch).is_err() {
            // Buffer lengths come from the plan itself.
            return;
        }
        for (out, c) in magnitudes.iter_mut().zip(spectrum.iter()) {
            *out = (c.re * c.re + c.im * c.im).sqrt() * gain;
        }
    }

    /// Frame-averaged magnitude of bin `i`, or 0 outside `0..=fft_size/2`.
    pub fn bin(&self, i: usize) -> f32 {
        if i >= self.bin_count() || self.frames.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.frames.iter().map(|f| f.magnitudes[i]).sum();
        sum / self.frames.len() as f32
    }

    /// Writes the frame-averaged spectrum into `out`. Returns bins written.
    pub fn copy_spectrum(&self, out: &mut [f32]) -> usize {
        let n = out.len().min(self.bin_count());
        for (i, slot) in out.iter_mut().take(n).enumerate() {
            *slot = self.bin(i);
        }
        n
    }

    /// Center frequency of bin `i` in Hz.
    pub fn bin_frequency(&self, i: usize, sample_rate: f64) -> f64 {
        i as f64 * sample_rate / self.config.fft_size as f64
    }

    pub fn bin_count(&self) -> usize {
        self.config.fft_size / 2 + 1
    }

    pub fn config(&self) -> FFTConfig {
        self.config
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    pub fn frame_count(&self) -> usize {
        self.config.frame_count
    }

    pub fn window_type(&self) -> WindowType {
        self.config.window_type
    }

    pub fn window(&self) -> &WindowTable {
        &self.window
    }

    pub fn frame_cursors(&self) -> Vec<usize> {
        self.frames.iter().map(|f| f.cursor).collect()
    }
}
