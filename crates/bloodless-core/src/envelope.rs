//! Peak envelope detection for the compressor's side chain.
//!
//! The follower is a rectifier feeding a one-pole smoother whose pole
//! switches between an attack and a release coefficient depending on whether
//! the rectified input is above or below the current level. State carries
//! over between blocks.
//!
//! # Timing
//!
//! Attack and release are given as corner periods: a time of `t` ms places
//! the smoothing pole at `1000 / t` Hz. The resulting time constant is
//! `t / 2π`, so a 20 ms attack settles a step to `1 − 1/e` of its height in
//! about 3.18 ms.
//!
//! ```text
//! coeff = exp(-2π · 1000 / (t_ms · sample_rate))
//! level = x + coeff · (level − x),   x = |input|
//! ```

use core::f32::consts::TAU;
use libm::expf;

use crate::flush_denormal;

/// Shortest accepted attack or release time in milliseconds.
pub const MIN_TIME_MS: f32 = 0.1;

/// One-pole coefficient for a corner period of `time_ms` at `sample_rate`.
#[inline]
fn pole_coefficient(time_ms: f32, sample_rate: f32) -> f32 {
    expf(-TAU * 1000.0 / (time_ms * sample_rate))
}

/// Rectifying envelope follower with separate attack and release.
///
/// # Example
///
/// ```rust
/// use bloodless_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::new(48000.0, 20.0, 20.0);
/// let level = env.process(-0.5);
/// assert!(level > 0.0 && level < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    level: f32,
    rise: f32,
    fall: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Create a follower at rest. Times below [`MIN_TIME_MS`] are raised to it.
    pub fn new(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let attack_ms = attack_ms.max(MIN_TIME_MS);
        let release_ms = release_ms.max(MIN_TIME_MS);
        Self {
            level: 0.0,
            rise: pole_coefficient(attack_ms, sample_rate),
            fall: pole_coefficient(release_ms, sample_rate),
            attack_ms,
            release_ms,
        }
    }

    /// Recompute both coefficients for a new sample rate. The level is kept.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.rise = pole_coefficient(self.attack_ms, sample_rate);
        self.fall = pole_coefficient(self.release_ms, sample_rate);
    }

    /// Feed one sample and return the updated level (never negative).
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let target = input.abs();
        let coeff = if target > self.level {
            self.rise
        } else {
            self.fall
        };
        self.level = flush_denormal(target + coeff * (self.level - target));
        self.level
    }

    /// Level after the most recent sample.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Return to rest without touching the timing.
    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}
