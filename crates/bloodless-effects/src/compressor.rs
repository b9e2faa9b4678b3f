//! Hard-knee peak compressor for the wet path.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Envelope Follower → Gain Computer → Gain Reduction → Output
//! ```
//!
//! Each channel has its own envelope follower, so left and right are
//! compressed independently. Ratio, attack and release are fixed; only the
//! threshold is exposed.
//!
//! # Parameters
//!
//! | Parameter | Range | Description |
//! |-----------|-------|-------------|
//! | Threshold | -60 to +36 dB | Level where compression begins |
//! | Ratio | 8:1 (fixed) | Compression strength |
//! | Attack | 20 ms (fixed) | How fast gain reduction engages |
//! | Release | 20 ms (fixed) | How fast gain reduction releases |
//!
//! Attack and release are corner periods (see [`EnvelopeFollower`]): the
//! detector settles to `1 − 1/e` of a step in `20 / 2π ≈ 3.18` ms.

use bloodless_core::{EnvelopeFollower, StereoEffect, db_to_linear, linear_to_db};

use crate::params::THRESHOLD_RANGE;

/// Fixed compression ratio.
pub const RATIO: f32 = 8.0;
/// Fixed attack time in milliseconds.
pub const ATTACK_MS: f32 = 20.0;
/// Fixed release time in milliseconds.
pub const RELEASE_MS: f32 = 20.0;

/// Gain computer for the hard-knee compression curve.
#[derive(Debug, Clone)]
struct GainComputer {
    threshold_db: f32,
    slope: f32,
}

impl GainComputer {
    fn new(threshold_db: f32) -> Self {
        Self {
            threshold_db,
            slope: 1.0 - 1.0 / RATIO,
        }
    }

    /// Gain change in dB (always non-positive) for an envelope level in dB.
    #[inline]
    fn compute_gain_db(&self, envelope_db: f32) -> f32 {
        let overshoot = envelope_db - self.threshold_db;
        if overshoot <= 0.0 {
            0.0
        } else {
            -(overshoot * self.slope)
        }
    }
}

/// Stereo compressor with independent per-channel detection.
///
/// Below threshold the gain is exactly 1.0, so with the threshold at its
/// +36 dB maximum any signal within full scale passes bit-identically.
///
/// # Example
///
/// ```rust
/// use bloodless_core::StereoEffect;
/// use bloodless_effects::Compressor;
///
/// let mut comp = Compressor::new(48000.0);
/// comp.set_threshold_db(-20.0);
/// let (l, r) = comp.process_stereo(0.5, -0.5);
/// assert!(l.abs() <= 0.5 && r.abs() <= 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    envelopes: [EnvelopeFollower; 2],
    gain_computer: GainComputer,
    /// Last computed gain reduction in dB (always non-positive).
    last_gain_reduction_db: f32,
}

impl Compressor {
    /// Create a compressor with the default threshold.
    pub fn new(sample_rate: f32) -> Self {
        let follower = EnvelopeFollower::new(sample_rate, ATTACK_MS, RELEASE_MS);
        Self {
            envelopes: [follower.clone(), follower],
            gain_computer: GainComputer::new(THRESHOLD_RANGE.default),
            last_gain_reduction_db: 0.0,
        }
    }

    /// Set threshold in dB, clamped to -60..36.
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.gain_computer.threshold_db = THRESHOLD_RANGE.clamp(threshold_db);
    }

    /// Current threshold in dB.
    pub fn threshold_db(&self) -> f32 {
        self.gain_computer.threshold_db
    }

    /// Deepest gain reduction applied on the last processed frame, in dB.
    ///
    /// 0.0 means no compression is occurring.
    pub fn gain_reduction_db(&self) -> f32 {
        self.last_gain_reduction_db
    }

    #[inline]
    fn gain_for(&mut self, channel: usize, input: f32) -> (f32, f32) {
        let envelope = self.envelopes[channel].process(input);
        let reduction_db = self
            .gain_computer
            .compute_gain_db(linear_to_db(envelope));
        if reduction_db == 0.0 {
            (1.0, 0.0)
        } else {
            (db_to_linear(reduction_db), reduction_db)
        }
    }
}

impl StereoEffect for Compressor {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let (gain_l, reduction_l) = self.gain_for(0, left);
        let (gain_r, reduction_r) = self.gain_for(1, right);
        self.last_gain_reduction_db = reduction_l.min(reduction_r);
        (left * gain_l, right * gain_r)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        for env in &mut self.envelopes {
            env.set_sample_rate(sample_rate);
        }
    }

    fn reset(&mut self) {
        for env in &mut self.envelopes {
            env.reset();
        }
        self.last_gain_reduction_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_below_threshold() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold_db(36.0);
        for i in 0..4800 {
            let x = libm::sinf(i as f32 * 0.1);
            let (l, r) = comp.process_stereo(x, -x);
            assert_eq!(l, x);
            assert_eq!(r, -x);
        }
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn test_steady_state_ratio() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold_db(-20.0);

        // DC at -4 dB: 16 dB over threshold, 8:1 leaves 2 dB over.
        let input = db_to_linear(-4.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = comp.process_stereo(input, input).0;
        }
        let out_db = linear_to_db(out);
        assert!((out_db - (-18.0)).abs() < 0.1, "got {} dB", out_db);
        assert!((comp.gain_reduction_db() + 14.0).abs() < 0.1);
    }

    #[test]
    fn test_step_settles_in_one_time_constant() {
        let sample_rate = 48000.0;
        let mut comp = Compressor::new(sample_rate);
        comp.set_threshold_db(-20.0);

        // 0 dB step: 20 dB over threshold, final reduction 20 * 7/8 dB.
        let tau_ms = ATTACK_MS / core::f32::consts::TAU;
        let tau_samples = libm::roundf(tau_ms * sample_rate / 1000.0) as usize;
        for _ in 0..tau_samples {
            comp.process_stereo(1.0, 1.0);
        }
        let detected = comp.envelopes[0].level();
        let settled = 1.0 - libm::expf(-1.0);
        assert!(
            (detected - settled).abs() < 0.005,
            "detector at {} after {} samples",
            detected,
            tau_samples
        );
        let expected_db = -(linear_to_db(detected) + 20.0) * (1.0 - 1.0 / RATIO);
        assert!((comp.gain_reduction_db() - expected_db).abs() < 0.01);

        for _ in 0..4800 {
            comp.process_stereo(1.0, 1.0);
        }
        assert!((comp.gain_reduction_db() + 17.5).abs() < 0.01);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold_db(-30.0);
        let mut out = (0.0, 0.0);
        for _ in 0..4800 {
            out = comp.process_stereo(0.9, 0.001);
        }
        assert!(out.0 < 0.5);
        assert_eq!(out.1, 0.001);
    }

    #[test]
    fn test_threshold_clamped() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold_db(-100.0);
        assert_eq!(comp.threshold_db(), -60.0);
        comp.set_threshold_db(100.0);
        assert_eq!(comp.threshold_db(), 36.0);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold_db(-40.0);
        for _ in 0..1000 {
            comp.process_stereo(1.0, 1.0);
        }
        comp.reset();
        let mut fresh = Compressor::new(48000.0);
        fresh.set_threshold_db(-40.0);
        assert_eq!(comp.process_stereo(0.3, 0.2), fresh.process_stereo(0.3, 0.2));
    }
}
