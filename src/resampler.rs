//! Log-frequency resampling of a linear FFT spectrum for display.
//!
//! A caller-chosen number of columns is spread logarithmically between a
//! minimum and maximum frequency. Each column reads the spectrum by linear
//! interpolation between the two bins whose center frequencies straddle it,
//! then applies decay and peak-hold smoothing.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::utils::{lin_interp, DEFAULT_SAMPLE_RATE, MAX_FREQ, MIN_FREQ, MIN_FREQ_FLOOR};

/// How a column's new value is combined with its previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayMode {
    /// `value = interpolated * decay`
    Scale,
    /// `value = interpolated * (1 - decay) + previous * decay`
    Blend,
}

impl Default for DecayMode {
    fn default() -> Self {
        DecayMode::Scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayColumn {
    pub frequency: f64,
    pub value: f32,
    pub peak: f32,
}

pub struct LogFrequencyResampler {
    width: usize,
    min_freq: f64,
    max_freq: f64,
    sample_rate: f64,
    decay_mode: DecayMode,
    columns: Vec<DisplayColumn>,
    // Lower bin of the pair found for column 0 on the previous sweep.
    sweep_start: usize,
    bin_count: usize,
}

impl Default for LogFrequencyResampler {
    fn default() -> Self {
        let mut resampler = Self {
            width: 1,
            min_freq: MIN_FREQ,
            max_freq: MAX_FREQ,
            sample_rate: DEFAULT_SAMPLE_RATE,
            decay_mode: DecayMode::Scale,
            columns: Vec::new(),
            sweep_start: 0,
            bin_count: 0,
        };
        resampler.rebuild_columns();
        resampler
    }
}

impl LogFrequencyResampler {
    pub fn new(width: usize, min_freq: f64, max_freq: f64, sample_rate: f64) -> Result<Self> {
        let mut resampler = Self::default();
        resampler.configure(width, min_freq, max_freq, sample_rate)?;
        Ok(resampler)
    }

    /// Sets the column count and frequency span.
    ///
    /// `max_freq` is clamped to `[1 Hz, sample_rate / 2]`, then `min_freq` to
    /// `[1 Hz, max_freq]`; a width of 0 becomes 1. A non-positive sample rate
    /// or non-finite frequency is rejected without touching current state.
    /// Every accepted call resets all columns to the floor.
    pub fn configure(
        &mut self,
        width: usize,
        min_freq: f64,
        max_freq: f64,
        sample_rate: f64,
    ) -> Result<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            warn!("Rejected resampler sample rate {}", sample_rate);
            return Err(AnalyzerError::InvalidSampleRate(sample_rate));
        }
        if !min_freq.is_finite() || !max_freq.is_finite() {
            warn!("Rejected resampler range {} .. {}", min_freq, max_freq);
            return Err(AnalyzerError::InvalidFrequencyRange {
                min: min_freq,
                max: max_freq,
            });
        }

        let nyquist = sample_rate * 0.5;
        let floor = MIN_FREQ_FLOOR.min(nyquist);
        let max_freq = max_freq.clamp(floor, nyquist);
        let min_freq = min_freq.clamp(floor, max_freq);

        self.width = width.max(1);
        self.min_freq = min_freq;
        self.max_freq = max_freq;
        self.sample_rate = sample_rate;
        self.rebuild_columns();

        debug!(
            "Resampler configured: {} columns, {:.2} Hz .. {:.2} Hz at {} Hz",
            self.width, self.min_freq, self.max_freq, self.sample_rate
        );
        Ok(())
    }

    pub fn set_width(&mut self, width: usize) -> Result<()> {
        self.configure(width, self.min_freq, self.max_freq, self.sample_rate)
    }

    pub fn set_min_freq(&mut self, min_freq: f64) -> Result<()> {
        self.configure(self.width, min_freq, self.max_freq, self.sample_rate)
    }

    pub fn set_max_freq(&mut self, max_freq: f64) -> Result<()> {
        self.configure(self.width, self.min_freq, max_freq, self.sample_rate)
    }

    /// Changes the sample rate and re-clamps the frequency span to it.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<()> {
        self.configure(self.width, self.min_freq, self.max_freq, sample_rate)
    }

    pub fn set_decay_mode(&mut self, mode: DecayMode) {
        self.decay_mode = mode;
    }

    fn rebuild_columns(&mut self) {
        self.columns.clear();
        for c in 0..self.width {
            let frequency = self.column_frequency(c);
            self.columns.push(DisplayColumn {
                frequency,
                value: 0.0,
                peak: 0.0,
            });
        }
        self.sweep_start = 0;
    }

    /// Drops values and peaks back to the floor.
    pub fn reset(&mut self) {
        for column in self.columns.iter_mut() {
            column.value = 0.0;
            column.peak = 0.0;
        }
        self.sweep_start = 0;
    }

    /// Target frequency of column `c`: `min * (max/min)^(c / (width - 1))`.
    pub fn column_frequency(&self, c: usize) -> f64 {
        if self.width <= 1 {
            return self.min_freq;
        }
        let ratio = self.max_freq / self.min_freq;
        self.min_freq * ratio.powf(c as f64 / (self.width - 1) as f64)
    }

    /// Resamples `bins` (an `fft_size / 2 + 1` magnitude array) onto the
    /// columns and updates their smoothed values and peaks.
    ///
    /// Columns are visited in increasing frequency, so the straddling pair
    /// is found by moving a running bin index up or down from where the
    /// previous column left it.
    pub fn resample(&mut self, bins: &[f32], decay: f32, peak_decay: f32) -> &[DisplayColumn] {
        let n = bins.len();
        if n != self.bin_count {
            debug!("Resampler bin count changed {} -> {}", self.bin_count, n);
            self.bin_count = n;
            self.reset();
        }

        let mode = self.decay_mode;
        if n < 2 {
            let lone = bins.first().copied().unwrap_or(0.0);
            for column in self.columns.iter_mut() {
                smooth(column, lone, decay, peak_decay, mode);
            }
            return &self.columns;
        }

        let fft_size = (2 * (n - 1)) as f64;
        let bin_hz = self.sample_rate / fft_size;
        let last_pair = n - 2;
        let mut idx = self.sweep_start.min(last_pair);

        for (c, column) in self.columns.iter_mut().enumerate() {
            let target = column.frequency;
            while idx > 0 && target < idx as f64 * bin_hz {
                idx -= 1;
            }
            while idx < last_pair && target > (idx + 1) as f64 * bin_hz {
                idx += 1;
            }
            if c == 0 {
                self.sweep_start = idx;
            }

            let lo = idx as f64 * bin_hz;
            let hi = (idx + 1) as f64 * bin_hz;
            let at = target.clamp(lo, hi);
            let interpolated = lin_interp(lo, hi, bins[idx] as f64, bins[idx + 1] as f64, at);
            smooth(column, interpolated as f32, decay, peak_decay, mode);
        }

        &self.columns
    }

    pub fn columns(&self) -> &[DisplayColumn] {
        &self.columns
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.columns.iter().map(|c| c.value)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn min_freq(&self) -> f64 {
        self.min_freq
    }

    pub fn max_freq(&self) -> f64 {
        self.max_freq
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn decay_mode(&self) -> DecayMode {
        self.decay_mode
    }
}

fn smooth(column: &mut DisplayColumn, interpolated: f32, decay: f32, peak_decay: f32, mode: DecayMode) {
    let value = match mode {
        DecayMode::Scale => interpolated * decay,
        DecayMode::Blend => interpolated * (1.0 - decay) + column.value * decay,
    };
    column.peak = value.max(column.peak * peak_decay);
    column.value = value;
}

#[cfg(test)]
mod tests {
    use super::*;

    // 16-point spectrum at 16 kHz: bins are 1 kHz apart.
    fn ramp_bins() -> Vec<f32> {
        (0..9).map(|i| i as f32).collect()
    }

    #[test]
    fn test_width_one_is_min_freq() {
        let mut r = LogFrequencyResampler::new(1, 100.0, 5000.0, 16000.0).unwrap();
        let columns = r.resample(&ramp_bins(), 1.0, 1.0);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].frequency, 100.0);
        assert!((columns[0].value - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_log_spacing_20_to_20k() {
        let r = LogFrequencyResampler::new(512, 20.0, 20000.0, 48000.0).unwrap();
        let cols = r.columns();
        assert_eq!(cols.len(), 512);
        assert!((cols[0].frequency - 20.0).abs() < 1e-9);
        assert!((cols[511].frequency - 20000.0).abs() < 1e-6);
        assert!(cols.windows(2).all(|w| w[0].frequency < w[1].frequency));
    }

    #[test]
    fn test_clamping() {
        let mut r = LogFrequencyResampler::new(0, -5.0, 1e9, 44100.0).unwrap();
        assert_eq!(r.width(), 1);
        assert_eq!(r.max_freq(), 22050.0);
        assert_eq!(r.min_freq(), MIN_FREQ_FLOOR);

        r.configure(64, 30000.0, 100.0, 44100.0).unwrap();
        assert_eq!(r.max_freq(), 100.0);
        assert_eq!(r.min_freq(), 100.0);

        r.configure(64, 20.0, 20000.0, 44100.0).unwrap();
        r.set_sample_rate(16000.0).unwrap();
        assert_eq!(r.max_freq(), 8000.0);
        assert_eq!(r.min_freq(), 20.0);
    }

    #[test]
    fn test_rejects_bad_sample_rate() {
        let mut r = LogFrequencyResampler::new(8, 20.0, 2000.0, 8000.0).unwrap();
        assert_eq!(
            r.configure(8, 20.0, 2000.0, 0.0),
            Err(AnalyzerError::InvalidSampleRate(0.0))
        );
        assert!(r.set_min_freq(f64::NAN).is_err());
        assert_eq!(r.sample_rate(), 8000.0);
        assert_eq!(r.min_freq(), 20.0);
    }

    #[test]
    fn test_set_width_rebuilds_columns() {
        let mut r = LogFrequencyResampler::new(8, 20.0, 2000.0, 8000.0).unwrap();
        assert_eq!(r.set_width(32), Ok(()));
        assert_eq!(r.columns().len(), 32);
        assert!((r.columns()[31].frequency - 2000.0).abs() < 1e-9);

        assert_eq!(r.set_width(0), Ok(()));
        assert_eq!(r.width(), 1);
        assert_eq!(r.columns()[0].frequency, 20.0);
    }

    #[test]
    fn test_interpolates_between_bins() {
        let mut r = LogFrequencyResampler::new(2, 1500.0, 6250.0, 16000.0).unwrap();
        let columns = r.resample(&ramp_bins(), 1.0, 0.0);
        assert!((columns[0].value - 1.5).abs() < 1e-6);
        assert!((columns[1].value - 6.25).abs() < 1e-6);
    }

    #[test]
    fn test_target_at_nyquist_reads_last_bin() {
        // 4-point spectrum at 48 kHz: bins at 0, 12 kHz and 24 kHz.
        let mut r = LogFrequencyResampler::new(2, 1000.0, 30000.0, 48000.0).unwrap();
        assert_eq!(r.max_freq(), 24000.0);
        let columns = r.resample(&[0.0, 1.0, 2.0], 1.0, 0.0);
        assert!((columns[1].value - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_decay_and_peak_hold() {
        let mut r = LogFrequencyResampler::new(1, 2000.0, 2000.0, 16000.0).unwrap();
        let loud = ramp_bins();
        let quiet = vec![0.0; 9];

        let c = r.resample(&loud, 0.5, 0.9)[0];
        assert_eq!(c.value, 1.0);
        assert_eq!(c.peak, 1.0);

        let c = r.resample(&quiet, 0.5, 0.9)[0];
        assert_eq!(c.value, 0.0);
        assert!((c.peak - 0.9).abs() < 1e-6);

        let c = r.resample(&quiet, 0.5, 0.9)[0];
        assert!((c.peak - 0.81).abs() < 1e-6);
    }

    #[test]
    fn test_blend_mode() {
        let mut r = LogFrequencyResampler::new(1, 2000.0, 2000.0, 16000.0).unwrap();
        r.set_decay_mode(DecayMode::Blend);
        let loud = ramp_bins();
        let c = r.resample(&loud, 0.5, 1.0)[0];
        assert_eq!(c.value, 1.0);
        let c = r.resample(&loud, 0.5, 1.0)[0];
        assert_eq!(c.value, 1.5);
    }

    #[test]
    fn test_bin_count_change_resets() {
        let mut r = LogFrequencyResampler::new(4, 100.0, 4000.0, 16000.0).unwrap();
        r.resample(&ramp_bins(), 1.0, 1.0);
        assert!(r.columns()[3].peak > 0.0);
        let columns = r.resample(&vec![0.0; 17], 1.0, 1.0);
        assert!(columns.iter().all(|c| c.peak == 0.0));
    }

    #[test]
    fn test_repeated_sweeps_match_fresh_resampler() {
        let bins: Vec<f32> = (0..513).map(|i| ((i * 7919) % 101) as f32).collect();
        let mut warm = LogFrequencyResampler::new(300, 20.0, 20000.0, 44100.0).unwrap();
        for _ in 0..3 {
            warm.resample(&bins, 1.0, 0.0);
        }
        let mut fresh = LogFrequencyResampler::new(300, 20.0, 20000.0, 44100.0).unwrap();
        assert_eq!(warm.resample(&bins, 1.0, 0.0), fresh.resample(&bins, 1.0, 0.0));
    }

    #[test]
    fn test_degenerate_bins() {
        let mut r = LogFrequencyResampler::new(3, 20.0, 200.0, 8000.0).unwrap();
        assert!(r.resample(&[], 1.0, 1.0).iter().all(|c| c.value == 0.0));
        assert!(r.resample(&[2.0], 1.0, 1.0).iter().all(|c| c.value == 2.0));
    }
}
