//! State Variable Filter implementation.
//!
//! Topology-Preserving Transform (TPT) SVF after Zavalishin, "The Art of VA
//! Filter Design" (2012). The trapezoidal integrators keep the filter stable
//! while the cutoff moves block to block, which is what the high-pass bank
//! relies on when the cutoff parameter is automated.
//!
//! # Reference
//!
//! Zavalishin, "The Art of VA Filter Design", rev. 2.1.2 (2018), Chapter 3.

use core::f32::consts::PI;
use libm::tanf;

use crate::Effect;
use crate::flush_denormal;

/// `1 / Q` for a Butterworth response.
const DAMPING: f32 = core::f32::consts::SQRT_2;

/// High-pass State Variable Filter (2-pole, 12 dB/oct, Butterworth Q).
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to 20.0 .. `sample_rate × 0.49` (default 1000.0).
///   The upper bound wins when the sample rate is too low for both.
///
/// # Example
///
/// ```rust
/// use bloodless_core::{Effect, StateVariableFilter};
///
/// let mut svf = StateVariableFilter::new(48000.0);
/// svf.set_cutoff(4000.0);
/// let output = svf.process(0.5);
/// assert!(output.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    ic1eq: f32,
    ic2eq: f32,

    g: f32,

    sample_rate: f32,
    cutoff: f32,
}

impl Default for StateVariableFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StateVariableFilter {
    /// Create a new high-pass SVF (cutoff 1000 Hz, Q = 1/√2).
    pub fn new(sample_rate: f32) -> Self {
        let mut svf = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            g: 0.0,
            sample_rate,
            cutoff: 1000.0,
        };
        svf.cutoff = svf.stable_cutoff(svf.cutoff);
        svf.update_coefficients();
        svf
    }

    fn stable_cutoff(&self, freq: f32) -> f32 {
        freq.max(20.0).min(self.sample_rate * 0.49)
    }

    /// Set cutoff frequency in Hz. Values are clamped to the stable range.
    pub fn set_cutoff(&mut self, freq: f32) {
        let clamped = self.stable_cutoff(freq);
        if clamped != self.cutoff {
            self.cutoff = clamped;
            self.update_coefficients();
        }
    }

    /// Current cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    fn update_coefficients(&mut self) {
        self.g = tanf(PI * self.cutoff / self.sample_rate);
    }
}

impl Effect for StateVariableFilter {
    fn process(&mut self, input: f32) -> f32 {
        let v3 = input - self.ic2eq;
        let v1 = (self.g * v3 + self.ic1eq) / (1.0 + self.g * (self.g + DAMPING));
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        input - DAMPING * v1 - v2
    }

    fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.cutoff = self.stable_cutoff(self.cutoff);
        self.update_coefficients();
    }
}
