//! Fixed precision color channel values
use crate::{utils::clamp, Scalar};

/// Single color channel value
pub type Quantum = u16;

/// Maximum value of a color channel
pub const QUANTUM_RANGE: Quantum = Quantum::MAX;

/// Opacity of a fully opaque pixel (opacity polarity is inverted relative to alpha)
pub const OPAQUE_OPACITY: Quantum = 0;

/// Opacity of a fully transparent pixel
pub const TRANSPARENT_OPACITY: Quantum = QUANTUM_RANGE;

/// Round value to the nearest quantum, values outside of the quantum range are clamped.
///
/// Values greater than `QUANTUM_RANGE` become `QUANTUM_RANGE`, otherwise the value is
/// rounded half-up. Negative values and NaN become zero.
#[inline]
pub fn round_to_quantum(value: Scalar) -> Quantum {
    if value > QUANTUM_RANGE as Scalar {
        QUANTUM_RANGE
    } else if value > 0.0 {
        (value + 0.5) as Quantum
    } else {
        0
    }
}

/// Convert value in `[0, 1]` range to a quantum
#[inline]
pub fn scale_to_quantum(value: Scalar) -> Quantum {
    round_to_quantum(clamp(value, 0.0, 1.0) * QUANTUM_RANGE as Scalar)
}

/// Convert quantum to a value in `[0, 1]` range
#[inline]
pub fn quantum_to_unit(value: Quantum) -> Scalar {
    value as Scalar / QUANTUM_RANGE as Scalar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_round_to_quantum() {
        assert_eq!(round_to_quantum(0.0), 0);
        assert_eq!(round_to_quantum(0.49), 0);
        assert_eq!(round_to_quantum(0.5), 1);
        assert_eq!(round_to_quantum(1234.4), 1234);
        assert_eq!(round_to_quantum(1234.5), 1235);
        assert_eq!(round_to_quantum(65534.6), QUANTUM_RANGE);
        assert_eq!(round_to_quantum(65535.0), QUANTUM_RANGE);
        assert_eq!(round_to_quantum(1e9), QUANTUM_RANGE);
        assert_eq!(round_to_quantum(-3.0), 0);
        assert_eq!(round_to_quantum(Scalar::NAN), 0);
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(scale_to_quantum(0.0), 0);
        assert_eq!(scale_to_quantum(1.0), QUANTUM_RANGE);
        assert_eq!(scale_to_quantum(2.0), QUANTUM_RANGE);
        assert_eq!(scale_to_quantum(0.5), 32768);
        assert_approx_eq!(quantum_to_unit(QUANTUM_RANGE), 1.0);
        assert_approx_eq!(quantum_to_unit(0), 0.0);
    }
}
