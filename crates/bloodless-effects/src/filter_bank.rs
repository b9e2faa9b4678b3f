//! Series bank of identical high-pass stages.
//!
//! Each stage is a 12 dB/oct TPT state-variable high-pass at Q = 1/√2, one
//! instance per channel. All stages share one cutoff, so four stages give a
//! 48 dB/oct slope.

use bloodless_core::{Effect, StateVariableFilter, StereoEffect};

use crate::params::CUTOFF_RANGE;

/// Default number of series stages.
pub const DEFAULT_FILTER_STAGES: usize = 4;
/// Largest accepted number of series stages.
pub const MAX_FILTER_STAGES: usize = 16;

/// N high-pass stages in series with a shared cutoff.
///
/// Stages are allocated at construction; processing never allocates.
///
/// # Example
///
/// ```rust
/// use bloodless_core::StereoEffect;
/// use bloodless_effects::HighPassBank;
///
/// let mut bank = HighPassBank::new(48000.0, 4);
/// bank.set_cutoff(200.0);
/// let (l, r) = bank.process_stereo(1.0, 1.0);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct HighPassBank {
    stages: Vec<[StateVariableFilter; 2]>,
    cutoff: f32,
    sample_rate: f32,
}

impl HighPassBank {
    /// Create a bank with `stage_count` stages (clamped to 1..=16) at the
    /// default cutoff.
    pub fn new(sample_rate: f32, stage_count: usize) -> Self {
        let count = stage_count.clamp(1, MAX_FILTER_STAGES);
        let cutoff = CUTOFF_RANGE.default;
        let stage = {
            let mut svf = StateVariableFilter::new(sample_rate);
            svf.set_cutoff(cutoff);
            svf
        };
        Self {
            stages: vec![[stage.clone(), stage]; count],
            cutoff,
            sample_rate,
        }
    }

    /// Set the shared cutoff in Hz on every stage.
    ///
    /// Values are clamped to 20..20000 Hz and to the stable range at the
    /// current sample rate.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        let cutoff = CUTOFF_RANGE.clamp(cutoff_hz);
        if cutoff == self.cutoff {
            return;
        }
        self.cutoff = cutoff;
        for pair in &mut self.stages {
            for svf in pair.iter_mut() {
                svf.set_cutoff(cutoff);
            }
        }
    }

    /// Requested cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Cutoff actually applied by the stages (may be lower near Nyquist).
    pub fn effective_cutoff(&self) -> f32 {
        self.stages
            .first()
            .map_or(self.cutoff, |pair| pair[0].cutoff())
    }

    /// Number of series stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl StereoEffect for HighPassBank {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let mut l = left;
        let mut r = right;
        for [svf_l, svf_r] in &mut self.stages {
            l = svf_l.process(l);
            r = svf_r.process(r);
        }
        (l, r)
    }

    /// Runs each stage over the whole block before the next.
    ///
    /// Output is identical to per-frame processing since stages only see
    /// their predecessor's output.
    fn process_block_stereo_inplace(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        for [svf_l, svf_r] in &mut self.stages {
            svf_l.process_block_inplace(left);
            svf_r.process_block_inplace(right);
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for pair in &mut self.stages {
            for svf in pair.iter_mut() {
                svf.set_sample_rate(sample_rate);
                svf.set_cutoff(self.cutoff);
            }
        }
    }

    fn reset(&mut self) {
        for pair in &mut self.stages {
            for svf in pair.iter_mut() {
                Effect::reset(svf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodless_core::rms;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| libm::sinf(core::f32::consts::TAU * freq * i as f32 / 48000.0))
            .collect()
    }

    #[test]
    fn test_stage_count_clamped() {
        assert_eq!(HighPassBank::new(48000.0, 0).stage_count(), 1);
        assert_eq!(HighPassBank::new(48000.0, 4).stage_count(), 4);
        assert_eq!(HighPassBank::new(48000.0, 99).stage_count(), MAX_FILTER_STAGES);
    }

    #[test]
    fn test_four_stages_attenuate_below_cutoff() {
        let mut bank = HighPassBank::new(48000.0, 4);
        bank.set_cutoff(4000.0);
        let mut left = sine(500.0, 9600);
        let mut right = left.clone();
        bank.process_block_stereo_inplace(&mut left, &mut right);
        // Three octaves below cutoff at 48 dB/oct.
        let level = rms(&left[4800..]);
        assert!(level < 1e-3, "got {}", level);
    }

    #[test]
    fn test_block_matches_per_frame() {
        let input = sine(3000.0, 512);
        let mut a = HighPassBank::new(48000.0, 4);
        let mut b = a.clone();

        let mut left = input.clone();
        let mut right = input.clone();
        a.process_block_stereo_inplace(&mut left, &mut right);

        for (i, &x) in input.iter().enumerate() {
            let (l, _) = b.process_stereo(x, x);
            assert!((l - left[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cutoff_shared_and_clamped() {
        let mut bank = HighPassBank::new(44100.0, 2);
        bank.set_cutoff(50_000.0);
        assert_eq!(bank.cutoff(), 20000.0);
        assert!(bank.effective_cutoff() <= 44100.0 * 0.49);
        bank.set_cutoff(1.0);
        assert_eq!(bank.cutoff(), 20.0);
        assert_eq!(bank.effective_cutoff(), 20.0);
    }
}
