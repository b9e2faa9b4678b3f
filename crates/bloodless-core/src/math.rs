//! Mathematical utility functions for DSP.
//!
//! Provides the level conversions and small helpers used on the audio path.
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`gain_to_db`] - dB conversion with an explicit floor for silence
//!
//! # Utilities
//!
//! - [`rms`] - Root-mean-square of a block
//! - [`mono_sum`] - Equal-weight stereo fold-down
//! - [`flush_denormal`] - Subnormal suppression for filter state

use libm::{expf, logf, sqrtf};

/// Floor used by [`gain_to_db`] callers that want "minus infinity" semantics.
pub const MINUS_INFINITY_DB: f32 = -100.0;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use bloodless_core::db_to_linear;
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
/// Inputs at or below `1e-10` are treated as `1e-10` (-200 dB).
///
/// # Example
/// ```rust
/// use bloodless_core::linear_to_db;
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

/// Convert a gain ratio to decibels, never returning less than `floor_db`.
///
/// Zero, negative and NaN gains map to `floor_db`, so the result is finite
/// whenever `floor_db` is.
///
/// # Example
/// ```rust
/// use bloodless_core::gain_to_db;
///
/// assert_eq!(gain_to_db(0.0, -60.0), -60.0);
/// assert!((gain_to_db(1.0, -60.0)).abs() < 1e-6);
/// ```
#[inline]
pub fn gain_to_db(gain: f32, floor_db: f32) -> f32 {
    if gain > 0.0 {
        linear_to_db(gain).max(floor_db)
    } else {
        floor_db
    }
}

/// Root-mean-square level of a block (linear). Empty blocks return 0.0.
#[inline]
pub fn rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = block.iter().map(|&x| x * x).sum();
    sqrtf(sum_sq / block.len() as f32)
}

/// Flush subnormal values to zero.
///
/// Replaces values below 1e-20 with zero, leaving margin before the IEEE 754
/// subnormal range. Used on filter integrator state, which decays toward
/// zero indefinitely on silence.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Sum stereo to mono with equal 0.5 weights.
#[inline]
pub fn mono_sum(left: f32, right: f32) -> f32 {
    0.5 * left + 0.5 * right
}
