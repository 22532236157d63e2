use std::f32::consts::PI;

/// Generates `len` samples of a sine at `freq` Hz.
///
/// # Arguments
///
/// * `freq` - Frequency of the tone in Hz
/// * `sample_rate` - Audio sample rate in Hz
/// * `len` - Number of samples to generate
/// * `amplitude` - Peak amplitude
pub fn sine_wave(freq: f32, sample_rate: f32, len: usize, amplitude: f32) -> Vec<f32> {
    let phase_delta = 2.0 * PI * freq / sample_rate;
    (0..len)
        .map(|i| amplitude * (phase_delta * i as f32).sin())
        .collect()
}

/// Sums a set of partials given as (frequency, amplitude) pairs.
///
/// Partials with a non-positive frequency or amplitude are skipped.
pub fn multi_tone(partials: &[(f32, f32)], sample_rate: f32, len: usize) -> Vec<f32> {
    let mut wave = vec![0.0; len];
    for &(freq, amp) in partials.iter().filter(|&&(f, a)| f > 0.0 && a > 0.0) {
        let phase_delta = 2.0 * PI * freq / sample_rate;
        for (i, sample) in wave.iter_mut().enumerate() {
            *sample += amp * (phase_delta * i as f32).sin();
        }
    }
    wave
}

/// Applies a linear fade in/out of `fade_samples` at each end.
pub fn apply_fade_envelope(wave: &mut [f32], fade_samples: usize) {
    let total = wave.len();
    let fade = fade_samples.min(total / 2);
    for i in 0..fade {
        let factor = i as f32 / fade as f32;
        wave[i] *= factor;
        wave[total - 1 - i] *= factor;
    }
}
