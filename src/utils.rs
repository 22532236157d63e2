use log::debug;

pub const MIN_FREQ: f64 = 20.0;  // Default lower edge of the display
pub const MAX_FREQ: f64 = 20000.0;  // Default upper edge of the display
pub const MIN_FREQ_FLOOR: f64 = 1.0;  // Lowest frequency the resampler accepts
pub const MIN_FFT_SIZE: usize = 16;
pub const MAX_FFT_SIZE: usize = 32768;
pub const DEFAULT_FFT_SIZE: usize = 4096;
pub const DEFAULT_FRAME_COUNT: usize = 2;
pub const DEFAULT_QUEUE_SIZE: usize = 4096;
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;
pub const DEFAULT_MAX_TICK_SECS: f64 = 0.05;  // Longest UI stall the queue must absorb
pub const FFT_SIZES: [usize; 12] = [
    16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
];

/// True for the power-of-two sizes the engine can transform.
pub fn is_supported_fft_size(size: usize) -> bool {
    size.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&size)
}

/// Empirical display gain applied to every magnitude: `1/N * log2(N)/11`.
pub fn fft_gain(fft_size: usize) -> f32 {
    let n = fft_size as f64;
    ((1.0 / n) * (n.log2() / 11.0)) as f32
}

/// Queue capacity that survives `max_tick_secs` of UI stall at `sample_rate`.
///
/// The result is rounded up to a power of two so ring indices can be masked.
pub fn queue_capacity_for(sample_rate: f64, max_tick_secs: f64) -> usize {
    let needed = if sample_rate.is_finite() && max_tick_secs.is_finite() {
        (sample_rate.max(0.0) * max_tick_secs.max(0.0)).ceil() as usize
    } else {
        DEFAULT_QUEUE_SIZE
    };

    let capacity = needed.max(MIN_FFT_SIZE).next_power_of_two();

    debug!(
        "Calculated queue capacity - SR: {}, stall: {:.3}s, needed: {}, selected: {}",
        sample_rate, max_tick_secs, needed, capacity
    );

    capacity
}

/// Linear interpolation of `y` at `x` between `(x1, y1)` and `(x2, y2)`.
pub fn lin_interp(x1: f64, x2: f64, y1: f64, y2: f64, x: f64) -> f64 {
    if x2 == x1 {
        return y1;
    }
    y1 + (y2 - y1) * (x - x1) / (x2 - x1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_sizes() {
        for &size in FFT_SIZES.iter() {
            assert!(is_supported_fft_size(size), "{} should be supported", size);
        }
        for &size in &[0, 1, 8, 24, 1000, 65536] {
            assert!(!is_supported_fft_size(size), "{} should be rejected", size);
        }
    }

    #[test]
    fn test_fft_gain_matches_formula() {
        assert!((fft_gain(2048) - 1.0 / 2048.0).abs() < 1e-9);
        assert!((fft_gain(16) - (4.0 / 11.0 / 16.0) as f32).abs() < 1e-9);
    }

    #[test]
    fn test_queue_capacity_is_power_of_two() {
        let cap = queue_capacity_for(48000.0, 0.05);
        assert!(cap.is_power_of_two());
        assert!(cap >= 2400);
        assert_eq!(queue_capacity_for(0.0, 1.0), MIN_FFT_SIZE);
        assert_eq!(queue_capacity_for(f64::NAN, 1.0), DEFAULT_QUEUE_SIZE);
    }

    #[test]
    fn test_lin_interp() {
        assert_eq!(lin_interp(0.0, 10.0, 1.0, 3.0, 5.0), 2.0);
        assert_eq!(lin_interp(4.0, 4.0, 7.0, 9.0, 4.0), 7.0);
    }
}
