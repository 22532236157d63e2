use serde::{Deserialize, Serialize};

use crate::resampler::DisplayColumn;

/// Converts a linear amplitude to dB. Silence maps to negative infinity.
pub fn amp_to_db(amp: f32) -> f32 {
    20.0 * amp.log10()
}

pub fn db_to_amp(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Handles conversion of resampled columns for display purposes only.
///
/// This sits downstream of the resampler: the per-octave tilt and the dB
/// floor belong to the caller, not to the analysis path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralDisplay {
    pub db_floor: f32,
    /// Linear gain applied per octave above the lowest displayed frequency.
    pub octave_gain: f32,
}

impl Default for SpectralDisplay {
    fn default() -> Self {
        Self {
            db_floor: -120.0,
            octave_gain: 1.0,
        }
    }
}

impl SpectralDisplay {
    pub fn new(db_floor: f32, octave_gain_db: f32) -> Self {
        let mut display = Self {
            db_floor,
            ..Self::default()
        };
        display.set_octave_gain_db(octave_gain_db);
        display
    }

    /// Per-octave tilt in dB. +3 dB makes pink noise look flat; most
    /// analyzers use between +3 and +4.5.
    pub fn set_octave_gain_db(&mut self, gain_db: f32) {
        self.octave_gain = db_to_amp(gain_db);
    }

    /// Gain at `freq` relative to `min_freq`: `octave_gain ^ octaves`.
    pub fn octave_gain_at(&self, freq: f64, min_freq: f64) -> f32 {
        if freq <= 0.0 || min_freq <= 0.0 {
            return 1.0;
        }
        let octaves = (freq / min_freq).log2() as f32;
        self.octave_gain.powf(octaves)
    }

    /// Compensated level of `value` in `[0, 1]`, where 0 is the dB floor
    /// and 1 is 0 dBFS.
    pub fn level(&self, value: f32, freq: f64, min_freq: f64) -> f32 {
        if self.db_floor >= 0.0 {
            return 0.0;
        }
        let db = amp_to_db(value * self.octave_gain_at(freq, min_freq));
        if db.is_nan() {
            return 0.0;
        }
        let db = db.max(self.db_floor).min(0.0);
        (db - self.db_floor) / -self.db_floor
    }

    /// `(value level, peak level)` for every column.
    pub fn levels(&self, columns: &[DisplayColumn], min_freq: f64) -> Vec<(f32, f32)> {
        columns
            .iter()
            .map(|c| {
                (
                    self.level(c.value, c.frequency, min_freq),
                    self.level(c.peak, c.frequency, min_freq),
                )
            })
            .collect()
    }
}
