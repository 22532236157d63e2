use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowType {
    Hann,
    Blackman,
    BlackmanHarris,
    Hamming,
    FlatTop,         // Best amplitude accuracy
    KaiserBessel,    // Fixed cosine-sum approximation, not a true Bessel window
    BlackmanNuttall,
    Rectangular,     // No window (flat)
}

/// One row of the window table: a cosine sum
/// `a0 - a1 cos(x) + a2 cos(2x) - a3 cos(3x) + a4 cos(4x)`
/// with `x = 2π (i + offset) / N`.
struct CosineSum {
    coefficients: [f64; 5],
    offset: usize,
    /// Recommended overlap (GH_FFT, ROV %), fraction of a frame.
    overlap: f64,
}

const HANN: CosineSum = CosineSum {
    coefficients: [0.5, 0.5, 0.0, 0.0, 0.0],
    offset: 0,
    overlap: 0.5,
};
const BLACKMAN: CosineSum = CosineSum {
    coefficients: [0.42659071, 0.49656062, 0.07684867, 0.0, 0.0],
    offset: 0,
    overlap: 0.5,
};
const BLACKMAN_HARRIS: CosineSum = CosineSum {
    coefficients: [0.35875, 0.48829, 0.14128, 0.01168, 0.0],
    offset: 0,
    overlap: 0.661,
};
const HAMMING: CosineSum = CosineSum {
    coefficients: [0.5434782609, 0.4565217391, 0.0, 0.0, 0.0],
    offset: 0,
    overlap: 0.5,
};
const FLAT_TOP: CosineSum = CosineSum {
    coefficients: [0.21557895, 0.41663158, 0.277263158, 0.083578947, 0.006947368],
    offset: 0,
    overlap: 0.655,
};
// The odd-order term enters with a plus sign in this approximation, so it is
// stored negated to fit the alternating-sign sum.
const KAISER_BESSEL: CosineSum = CosineSum {
    coefficients: [0.402, 0.498, 0.098, -0.001, 0.0],
    offset: 1,
    overlap: 0.619,
};
const BLACKMAN_NUTTALL: CosineSum = CosineSum {
    coefficients: [0.3635819, 0.4891775, 0.1365995, 0.0106411, 0.0],
    offset: 0,
    overlap: 0.661,
};
const RECTANGULAR: CosineSum = CosineSum {
    coefficients: [1.0, 0.0, 0.0, 0.0, 0.0],
    offset: 0,
    overlap: 0.5,
};

impl WindowType {
    pub const ALL: [WindowType; 8] = [
        WindowType::Hann,
        WindowType::Blackman,
        WindowType::BlackmanHarris,
        WindowType::Hamming,
        WindowType::FlatTop,
        WindowType::KaiserBessel,
        WindowType::BlackmanNuttall,
        WindowType::Rectangular,
    ];

    fn table(self) -> &'static CosineSum {
        match self {
            WindowType::Hann => &HANN,
            WindowType::Blackman => &BLACKMAN,
            WindowType::BlackmanHarris => &BLACKMAN_HARRIS,
            WindowType::Hamming => &HAMMING,
            WindowType::FlatTop => &FLAT_TOP,
            WindowType::KaiserBessel => &KAISER_BESSEL,
            WindowType::BlackmanNuttall => &BLACKMAN_NUTTALL,
            WindowType::Rectangular => &RECTANGULAR,
        }
    }

    /// Fraction of a frame by which successive frames should overlap.
    pub fn overlap_fraction(self) -> f64 {
        self.table().overlap
    }

    /// Closed-form coefficient `i` of an `n`-point window.
    pub fn coefficient(self, i: usize, n: usize) -> f64 {
        let row = self.table();
        let x = 2.0 * PI * (i + row.offset) as f64 / n as f64;
        row.coefficients
            .iter()
            .enumerate()
            .map(|(k, &a)| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                sign * a * (k as f64 * x).cos()
            })
            .sum()
    }

    pub fn name(self) -> &'static str {
        match self {
            WindowType::Hann => "Hann",
            WindowType::Blackman => "Blackman",
            WindowType::BlackmanHarris => "Blackman-Harris",
            WindowType::Hamming => "Hamming",
            WindowType::FlatTop => "Flattop",
            WindowType::KaiserBessel => "Kaiser-Bessel",
            WindowType::BlackmanNuttall => "Blackman-Nuttall",
            WindowType::Rectangular => "Rectangular",
        }
    }
}

impl Default for WindowType {
    fn default() -> Self {
        WindowType::Hann
    }
}

/// Precomputed coefficients for one window type at one size.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowTable {
    window_type: WindowType,
    coefficients: Vec<f32>,
}

impl WindowTable {
    pub fn new(window_type: WindowType, size: usize) -> Self {
        let mut table = Self {
            window_type,
            coefficients: Vec::new(),
        };
        table.rebuild(window_type, size);
        table
    }

    /// Recomputes the coefficients in place, reusing the allocation.
    pub fn rebuild(&mut self, window_type: WindowType, size: usize) {
        self.window_type = window_type;
        self.coefficients.clear();
        self.coefficients
            .extend((0..size).map(|i| window_type.coefficient(i, size) as f32));
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.coefficients
    }

    #[inline]
    pub fn get(&self, i: usize) -> f32 {
        self.coefficients.get(i).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FFT_SIZES;

    fn closed_form(window: WindowType, i: usize, n: usize) -> f64 {
        let x = 2.0 * PI * i as f64 / n as f64;
        match window {
            WindowType::Hann => 0.5 * (1.0 - x.cos()),
            WindowType::Blackman => {
                0.42659071 - 0.49656062 * x.cos() + 0.07684867 * (2.0 * x).cos()
            }
            WindowType::BlackmanHarris => {
                0.35875 - 0.48829 * x.cos() + 0.14128 * (2.0 * x).cos()
                    - 0.01168 * (3.0 * x).cos()
            }
            WindowType::Hamming => 0.5434782609 - 0.4565217391 * x.cos(),
            WindowType::FlatTop => {
                0.21557895 - 0.41663158 * x.cos() + 0.277263158 * (2.0 * x).cos()
                    - 0.083578947 * (3.0 * x).cos()
                    + 0.006947368 * (4.0 * x).cos()
            }
            WindowType::KaiserBessel => {
                let y = 2.0 * PI * (i + 1) as f64 / n as f64;
                0.402 - 0.498 * y.cos() + 0.098 * (2.0 * y).cos() + 0.001 * (3.0 * y).cos()
            }
            WindowType::BlackmanNuttall => {
                0.3635819 - 0.4891775 * x.cos() + 0.1365995 * (2.0 * x).cos()
                    - 0.0106411 * (3.0 * x).cos()
            }
            WindowType::Rectangular => 1.0,
        }
    }

    #[test]
    fn test_length_and_first_coefficient() {
        for &size in FFT_SIZES.iter() {
            for &window in WindowType::ALL.iter() {
                let table = WindowTable::new(window, size);
                assert_eq!(table.len(), size);
                let expected = closed_form(window, 0, size) as f32;
                assert!(
                    (table.get(0) - expected).abs() < 1e-6,
                    "{:?} @ {}: {} vs {}",
                    window,
                    size,
                    table.get(0),
                    expected
                );
            }
        }
    }

    #[test]
    fn test_matches_closed_form_everywhere() {
        let n = 64;
        for &window in WindowType::ALL.iter() {
            let table = WindowTable::new(window, n);
            for i in 0..n {
                let expected = closed_form(window, i, n);
                assert!((table.get(i) as f64 - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_hann_shape() {
        let table = WindowTable::new(WindowType::Hann, 16);
        assert_eq!(table.get(0), 0.0);
        assert!((table.get(8) - 1.0).abs() < 1e-6);
        assert!((table.get(4) - table.get(12)).abs() < 1e-6);
    }

    #[test]
    fn test_rebuild_is_bit_identical() {
        for &window in WindowType::ALL.iter() {
            let a = WindowTable::new(window, 1024);
            let mut b = WindowTable::new(WindowType::Rectangular, 16);
            b.rebuild(window, 1024);
            assert_eq!(a.as_slice(), b.as_slice());
        }
    }

    #[test]
    fn test_overlap_fractions() {
        assert_eq!(WindowType::Hann.overlap_fraction(), 0.5);
        assert_eq!(WindowType::BlackmanHarris.overlap_fraction(), 0.661);
        assert_eq!(WindowType::KaiserBessel.overlap_fraction(), 0.619);
        assert_eq!(WindowType::FlatTop.overlap_fraction(), 0.655);
        for &window in WindowType::ALL.iter() {
            let f = window.overlap_fraction();
            assert!(f >= 0.5 && f < 1.0);
        }
    }

    #[test]
    fn test_out_of_range_coefficient_is_zero() {
        let table = WindowTable::new(WindowType::Rectangular, 16);
        assert_eq!(table.get(15), 1.0);
        assert_eq!(table.get(16), 0.0);
    }
}
