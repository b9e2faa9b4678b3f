//! Analysis-context polling of the two spectrum taps.
//!
//! The analyzer owns the consumer ends of the chain's fifos. Each call to
//! [`Analyzer::poll`] checks both taps and, for every tap with a fresh frame,
//! runs the estimator and re-renders that tap's display curve. Taps without
//! a new frame keep their previous curve.
//!
//! Curves can optionally be smoothed across refreshes with a one-pole blend,
//! `curve = s · previous + (1 − s) · fresh`. [`DISPLAY_SMOOTHING`] is the
//! weight an on-screen scope uses; the default is no smoothing.

use bloodless_core::{ANALYSIS_FRAME_LEN, FifoConsumer};

use crate::axis::FrequencyAxis;
use crate::fft::SpectralEstimator;
use crate::scope::{ScopeRange, SpectrumScope};

/// Weight of the previous curve in an on-screen scope.
pub const DISPLAY_SMOOTHING: f32 = 0.5;

/// One of the two analysis taps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tap {
    /// Compressed wet signal before the high-pass bank.
    PostCompression,
    /// Wet signal after the high-pass bank.
    PostFilter,
}

/// Which taps produced a new curve during a [`poll`](Analyzer::poll).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Post-compression curve was refreshed.
    pub post_compression: bool,
    /// Post-filter curve was refreshed.
    pub post_filter: bool,
}

impl PollOutcome {
    /// Whether any curve changed.
    pub fn any(&self) -> bool {
        self.post_compression || self.post_filter
    }
}

/// Frame accounting of one tap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapStats {
    /// Frames analysed.
    pub consumed: u64,
    /// Frames overwritten before the analyzer saw them.
    pub dropped: u64,
}

#[derive(Debug)]
struct TapState {
    consumer: FifoConsumer<ANALYSIS_FRAME_LEN>,
    curve: Vec<f32>,
}

/// Spectrum analyzer for the post-compression and post-filter taps.
#[derive(Debug)]
pub struct Analyzer {
    estimator: SpectralEstimator,
    scope: SpectrumScope,
    axis: FrequencyAxis,
    smoothing: f32,
    fresh: Vec<f32>,
    post_compression: TapState,
    post_filter: TapState,
}

impl Analyzer {
    /// Create an analyzer reading from the given fifo consumers.
    ///
    /// Curves start at the scope floor and are not smoothed.
    pub fn new(
        sample_rate: f32,
        scope_points: usize,
        range: ScopeRange,
        post_compression: FifoConsumer<ANALYSIS_FRAME_LEN>,
        post_filter: FifoConsumer<ANALYSIS_FRAME_LEN>,
    ) -> Self {
        let scope = SpectrumScope::new(scope_points, ANALYSIS_FRAME_LEN, range);
        let blank = vec![range.floor_db; scope.points()];
        Self {
            estimator: SpectralEstimator::new(ANALYSIS_FRAME_LEN),
            scope,
            axis: FrequencyAxis::new(sample_rate),
            smoothing: 0.0,
            fresh: blank.clone(),
            post_compression: TapState {
                consumer: post_compression,
                curve: blank.clone(),
            },
            post_filter: TapState {
                consumer: post_filter,
                curve: blank,
            },
        }
    }

    /// Blend each refreshed curve with its predecessor.
    ///
    /// `smoothing` is the weight of the previous curve, clamped to `0..=0.99`.
    /// Zero replaces curves outright.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.set_smoothing(smoothing);
        self
    }

    /// Change the curve smoothing. See [`with_smoothing`](Self::with_smoothing).
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = if smoothing.is_nan() {
            0.0
        } else {
            smoothing.clamp(0.0, 0.99)
        };
    }

    /// Weight of the previous curve.
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Analyse any fresh frames.
    pub fn poll(&mut self) -> PollOutcome {
        PollOutcome {
            post_compression: self.refresh(Tap::PostCompression),
            post_filter: self.refresh(Tap::PostFilter),
        }
    }

    fn refresh(&mut self, tap: Tap) -> bool {
        let state = match tap {
            Tap::PostCompression => &mut self.post_compression,
            Tap::PostFilter => &mut self.post_filter,
        };
        let Some(frame) = state.consumer.consume() else {
            return false;
        };
        let magnitudes = self.estimator.transform(frame);
        if self.smoothing == 0.0 {
            self.scope.render_into(magnitudes, &mut state.curve);
            return true;
        }
        self.scope.render_into(magnitudes, &mut self.fresh);
        let keep = self.smoothing;
        for (shown, &new) in state.curve.iter_mut().zip(&self.fresh) {
            *shown = keep * *shown + (1.0 - keep) * new;
        }
        true
    }

    /// Latest display curve of a tap, in dB.
    pub fn curve(&self, tap: Tap) -> &[f32] {
        match tap {
            Tap::PostCompression => &self.post_compression.curve,
            Tap::PostFilter => &self.post_filter.curve,
        }
    }

    /// Frame accounting of a tap.
    pub fn stats(&self, tap: Tap) -> TapStats {
        let consumer = match tap {
            Tap::PostCompression => &self.post_compression.consumer,
            Tap::PostFilter => &self.post_filter.consumer,
        };
        TapStats {
            consumed: consumer.frames_consumed(),
            dropped: consumer.frames_dropped(),
        }
    }

    /// Frequency axis used for gridlines and markers.
    pub fn axis(&self) -> &FrequencyAxis {
        &self.axis
    }

    /// Display position of the cutoff marker.
    pub fn cutoff_position(&self, cutoff_hz: f32) -> f32 {
        self.axis.to_position(cutoff_hz)
    }

    /// The scope used to render curves.
    pub fn scope(&self) -> &SpectrumScope {
        &self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodless_core::sample_fifo;

    fn analyzer() -> (
        Analyzer,
        bloodless_core::FifoProducer<ANALYSIS_FRAME_LEN>,
        bloodless_core::FifoProducer<ANALYSIS_FRAME_LEN>,
    ) {
        let (pc_tx, pc_rx) = sample_fifo::<ANALYSIS_FRAME_LEN>();
        let (pf_tx, pf_rx) = sample_fifo::<ANALYSIS_FRAME_LEN>();
        let analyzer = Analyzer::new(48000.0, 512, ScopeRange::default(), pc_rx, pf_rx);
        (analyzer, pc_tx, pf_tx)
    }

    #[test]
    fn test_starts_at_floor() {
        let (analyzer, _, _) = analyzer();
        assert!(analyzer.curve(Tap::PostFilter).iter().all(|&db| db == -96.0));
        assert_eq!(analyzer.curve(Tap::PostCompression).len(), 512);
    }

    #[test]
    fn test_poll_refreshes_only_fresh_taps() {
        let (mut analyzer, mut pc, _pf) = analyzer();
        assert!(!analyzer.poll().any());

        for i in 0..ANALYSIS_FRAME_LEN {
            pc.push((i as f32 * 0.3).sin());
        }
        let outcome = analyzer.poll();
        assert!(outcome.post_compression);
        assert!(!outcome.post_filter);
        assert!(analyzer.curve(Tap::PostCompression).iter().any(|&db| db > -96.0));
        assert_eq!(analyzer.stats(Tap::PostCompression).consumed, 1);

        assert!(!analyzer.poll().any());
    }

    fn push_tone(producer: &mut bloodless_core::FifoProducer<ANALYSIS_FRAME_LEN>) {
        for i in 0..ANALYSIS_FRAME_LEN {
            producer.push((i as f32 * 0.2).sin() * 0.5);
        }
    }

    #[test]
    fn test_smoothing_blends_with_previous_curve() {
        let (mut plain, mut plain_pc, _) = analyzer();
        let (smoothed, mut smoothed_pc, _smoothed_pf) = analyzer();
        let mut smoothed = smoothed.with_smoothing(DISPLAY_SMOOTHING);
        assert_eq!(smoothed.smoothing(), 0.5);

        push_tone(&mut plain_pc);
        push_tone(&mut smoothed_pc);
        plain.poll();
        smoothed.poll();

        let floor = ScopeRange::default().floor_db;
        let fresh = plain.curve(Tap::PostCompression);
        let first = smoothed.curve(Tap::PostCompression).to_vec();
        for (&shown, &new) in first.iter().zip(fresh) {
            assert!((shown - (0.5 * floor + 0.5 * new)).abs() < 1e-3);
        }

        // A repeated frame pulls the curve halfway closer again.
        push_tone(&mut smoothed_pc);
        smoothed.poll();
        let second = smoothed.curve(Tap::PostCompression);
        for ((&shown, &prev), &new) in second.iter().zip(&first).zip(fresh) {
            assert!((shown - (0.5 * prev + 0.5 * new)).abs() < 1e-3);
        }
        assert!(smoothed.curve(Tap::PostFilter).iter().all(|&db| db == floor));
    }

    #[test]
    fn test_smoothing_is_clamped() {
        let (mut analyzer, _, _) = analyzer();
        analyzer.set_smoothing(2.0);
        assert_eq!(analyzer.smoothing(), 0.99);
        analyzer.set_smoothing(-1.0);
        assert_eq!(analyzer.smoothing(), 0.0);
        analyzer.set_smoothing(f32::NAN);
        assert_eq!(analyzer.smoothing(), 0.0);
    }

    #[test]
    fn test_counts_dropped_frames() {
        let (mut analyzer, _pc, mut pf) = analyzer();
        for _ in 0..3 {
            pf.push_slice(&[0.1; ANALYSIS_FRAME_LEN]);
        }
        analyzer.poll();
        assert_eq!(
            analyzer.stats(Tap::PostFilter),
            TapStats {
                consumed: 1,
                dropped: 2
            }
        );
    }
}
