//! Core processing traits.
//!
//! [`Effect`] is the mono, sample-at-a-time contract used by filter stages.
//! [`StereoEffect`] is the linked two-channel contract used by processors
//! whose state spans both channels (or that hold one state per channel).
//!
//! ## Design Decisions
//!
//! - **Object-safe**: both traits can be used as `dyn` objects, although the
//!   signal chain uses static dispatch.
//!
//! - **No allocations**: every method is callable from the audio-rendering
//!   context.

/// Mono audio processor.
///
/// # Example
///
/// ```rust
/// use bloodless_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait Effect {
    /// Process a single sample, advancing internal state by one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples in place.
    ///
    /// Default implementation calls [`process`](Self::process) per sample.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate and recompute rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state (filter memory, envelopes) without touching
    /// parameters.
    fn reset(&mut self);
}

/// Two-channel audio processor.
pub trait StereoEffect {
    /// Process one stereo frame.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32);

    /// Process a stereo block in place.
    ///
    /// # Panics
    ///
    /// Debug builds panic if the channel lengths differ.
    fn process_block_stereo_inplace(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(
            left.len(),
            right.len(),
            "Left and right buffers must have same length"
        );
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (out_l, out_r) = self.process_stereo(*l, *r);
            *l = out_l;
            *r = out_r;
        }
    }

    /// Update the sample rate and recompute rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state without touching parameters.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gain(f32);

    impl Effect for Gain {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    struct Swap;

    impl StereoEffect for Swap {
        fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
            (right, left)
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn test_block_inplace_default() {
        let mut gain = Gain(2.0);
        let mut buffer = [1.0, 2.0, 3.0];
        gain.process_block_inplace(&mut buffer);
        assert_eq!(buffer, [2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_stereo_block_default() {
        let mut swap = Swap;
        let mut left = [1.0, 2.0];
        let mut right = [3.0, 4.0];
        swap.process_block_stereo_inplace(&mut left, &mut right);
        assert_eq!(left, [3.0, 4.0]);
        assert_eq!(right, [1.0, 2.0]);
    }
}
