//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Limit a value to the closed range `[min, max]`.
///
/// NaN inputs are returned unchanged.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Round a value to the given number of decimal places.
///
/// Used to stop repeated fixed steps (like speed increments of 0.1) from
/// accumulating floating point drift.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 1f64), (0f64, 100f64), 0.25), 25.0);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 2f64), 0.0), 1.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&1.2f64, &0.0, &1.0), 1.0);
        assert_eq!(clamp(&-0.2f64, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&0.5f64, &0.0, &1.0), 0.5);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.7f64 + 0.1 + 0.1, 1), 0.9);
        assert_eq!(round_to(0.30000000000000004f64, 2), 0.3);
    }
}
