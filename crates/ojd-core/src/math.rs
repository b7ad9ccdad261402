//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Utilities
//!
//! - [`map_range`] - Linear remap between two ranges
//! - [`flush_denormal`] - Zero out subnormal-range feedback values

use libm::{expf, logf};

/// Convert decibels to linear gain.
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear gain value (e.g., 0 dB → 1.0, -6 dB → 0.5, +6 dB → 2.0)
///
/// # Example
/// ```rust
/// use ojd_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs at or below `1e-10` are floored to avoid `-inf`.
///
/// # Example
/// ```rust
/// use ojd_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Linearly map `value` from `[source_min, source_max]` onto
/// `[target_min, target_max]`.
///
/// No clamping is applied; values outside the source range extrapolate.
///
/// # Example
/// ```rust
/// use ojd_core::map_range;
///
/// assert_eq!(map_range(5.0, 0.0, 10.0, -60.0, -20.0), -40.0);
/// ```
#[inline]
pub fn map_range(value: f32, source_min: f32, source_max: f32, target_min: f32, target_max: f32) -> f32 {
    target_min + (target_max - target_min) * ((value - source_min) / (source_max - source_min))
}

/// Flush values below the denormal threshold to zero.
///
/// Feedback paths decaying towards silence otherwise spend a long time in the
/// subnormal range, which is very slow on most CPUs.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_conversion_roundtrip() {
        for db in [-60.0, -20.0, -6.0, 0.0, 4.0, 36.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 0.001, "{db} dB came back as {back}");
        }
    }

    #[test]
    fn test_linear_to_db_floor() {
        assert!(linear_to_db(0.0).is_finite());
        assert!((linear_to_db(0.0) + 200.0).abs() < 0.01);
    }

    #[test]
    fn test_map_range_endpoints() {
        assert_eq!(map_range(0.0, 0.0, 10.0, -60.0, -20.0), -60.0);
        assert_eq!(map_range(10.0, 0.0, 10.0, -60.0, -20.0), -20.0);
        assert!((map_range(8.35, 0.0, 10.0, -60.0, -20.0) - (-26.6)).abs() < 1e-4);
    }

    #[test]
    fn test_flush_denormal() {
        // Normal values pass through
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(-0.5), -0.5);
        assert_eq!(flush_denormal(1e-10), 1e-10);

        // Subnormal-range values are flushed to zero
        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-21), 0.0);
        assert_eq!(flush_denormal(1e-38), 0.0);
        assert_eq!(flush_denormal(0.0), 0.0);
    }
}
