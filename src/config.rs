use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use log::info;

use crate::display::SpectralDisplay;
use crate::fft_analysis::FFTConfig;
use crate::resampler::DecayMode;
use crate::utils::{
    queue_capacity_for, DEFAULT_MAX_TICK_SECS, DEFAULT_QUEUE_SIZE, DEFAULT_SAMPLE_RATE, MAX_FREQ,
    MIN_FREQ,
};

/// Every setting the analyzer pipeline needs, loadable from YAML.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    // Engine
    pub fft: FFTConfig,
    pub queue_size: usize,
    pub sample_rate: f64,
    /// Longest gap between UI ticks, in seconds. Grows the queue at high rates.
    pub max_tick_secs: f64,

    // Resampler
    pub width: usize,
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub decay: f32,
    pub peak_decay: f32,
    pub decay_mode: DecayMode,

    // Display
    pub db_floor: f32,
    pub octave_gain_db: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft: FFTConfig::default(),
            queue_size: DEFAULT_QUEUE_SIZE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_tick_secs: DEFAULT_MAX_TICK_SECS,
            width: 512,
            min_frequency: MIN_FREQ,
            max_frequency: MAX_FREQ,
            decay: 0.5,
            peak_decay: 0.975,
            decay_mode: DecayMode::Scale,
            db_floor: -120.0,
            octave_gain_db: 0.0,
        }
    }
}

impl AnalyzerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading analyzer config from {}", path.display());
        let yaml_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml(&yaml_str)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Analyzer config saved to {}", path.display());
        Ok(())
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Queue size actually allocated: `queue_size`, grown to cover a
    /// `max_tick_secs` stall at `sample_rate`.
    pub fn effective_queue_size(&self) -> usize {
        self.queue_size
            .max(queue_capacity_for(self.sample_rate, self.max_tick_secs))
    }

    pub fn display(&self) -> SpectralDisplay {
        SpectralDisplay::new(self.db_floor, self.octave_gain_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowType;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = AnalyzerConfig::from_yaml(
            "fft:\n  fft_size: 1024\n  frame_count: 4\n  window_type: BlackmanHarris\nwidth: 300\n",
        )
        .unwrap();
        assert_eq!(config.fft.fft_size, 1024);
        assert_eq!(config.fft.frame_count, 4);
        assert_eq!(config.fft.window_type, WindowType::BlackmanHarris);
        assert_eq!(config.width, 300);
        assert_eq!(config.decay, 0.5);
        assert_eq!(config.peak_decay, 0.975);
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let mut config = AnalyzerConfig::default();
        config.decay_mode = DecayMode::Blend;
        config.octave_gain_db = 3.0;

        let path = std::env::temp_dir().join(format!(
            "spectrum_analyzer_config_{}.yaml",
            std::process::id()
        ));
        config.save(&path).unwrap();
        let loaded = AnalyzerConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_effective_queue_size_covers_tick_stall() {
        let mut config = AnalyzerConfig::default();
        assert_eq!(config.effective_queue_size(), DEFAULT_QUEUE_SIZE);

        config.sample_rate = 96000.0;
        config.max_tick_secs = 0.1;
        assert_eq!(config.effective_queue_size(), 16384);

        config.max_tick_secs = 0.0;
        assert_eq!(config.effective_queue_size(), DEFAULT_QUEUE_SIZE);
    }

    #[test]
    fn test_bad_yaml_is_error() {
        assert!(AnalyzerConfig::from_yaml("fft: [1, 2").is_err());
        assert!(AnalyzerConfig::load(Path::new("/nonexistent/analyzer.yaml")).is_err());
    }
}
