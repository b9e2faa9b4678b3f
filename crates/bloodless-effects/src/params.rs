//! Shared parameter surface.
//!
//! The control context (UI, host automation, CLI) writes parameters and the
//! audio context reads them once per block. Every parameter is a single
//! atomic word, so a reader never observes a partially-updated value.
//!
//! | Parameter | Range | Default | Taper |
//! |-----------|-------|---------|-------|
//! | `threshold` | -60 to +36 dB | 0 dB | linear |
//! | `cutoff` | 20 to 20000 Hz | 4000 Hz | skewed (0.25) |
//! | `bypass` | on/off | off | - |

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Mapping between a parameter's natural range and the normalized 0..1 range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ParamScale {
    /// Equal resolution across the range.
    #[default]
    Linear,
    /// Skewed mapping as used by host automation lanes.
    ///
    /// `value = min + (max - min) * p^(1/skew)`. A skew below 1.0 gives more
    /// resolution at the low end.
    Skewed(f32),
}

/// Range, default and taper of a continuous parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Minimum value.
    pub min: f32,
    /// Maximum value.
    pub max: f32,
    /// Default value.
    pub default: f32,
    /// Normalization taper.
    pub scale: ParamScale,
}

/// Compressor threshold in dB.
pub const THRESHOLD_RANGE: ParamRange = ParamRange {
    min: -60.0,
    max: 36.0,
    default: 0.0,
    scale: ParamScale::Linear,
};

/// High-pass cutoff in Hz.
pub const CUTOFF_RANGE: ParamRange = ParamRange {
    min: 20.0,
    max: 20000.0,
    default: 4000.0,
    scale: ParamScale::Skewed(0.25),
};

/// Default bypass state.
pub const BYPASS_DEFAULT: bool = false;

impl ParamRange {
    /// Clamp a value into the range. NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Convert a value to the normalized 0..1 range.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bloodless_effects::CUTOFF_RANGE;
    ///
    /// let p = CUTOFF_RANGE.normalize(4000.0);
    /// assert!((CUTOFF_RANGE.denormalize(p) - 4000.0).abs() < 0.5);
    /// ```
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        let linear = ((self.clamp(value) - self.min) / range).clamp(0.0, 1.0);
        match self.scale {
            ParamScale::Linear => linear,
            ParamScale::Skewed(skew) => libm::powf(linear, skew),
        }
    }

    /// Convert a normalized 0..1 value back into the range.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let p = normalized.clamp(0.0, 1.0);
        let curved = match self.scale {
            ParamScale::Linear => p,
            ParamScale::Skewed(skew) => libm::powf(p, 1.0 / skew),
        };
        self.min + curved * (self.max - self.min)
    }
}

/// A thread-safe atomic parameter using bit-cast f32.
///
/// Control context writes, audio context reads. No locks, no allocations.
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    range: ParamRange,
}

impl AtomicParam {
    /// Create a parameter at its default value.
    pub fn new(range: ParamRange) -> Self {
        Self {
            value: AtomicU32::new(range.default.to_bits()),
            range,
        }
    }

    /// Set the parameter value, clamped to its range.
    #[inline]
    pub fn set(&self, v: f32) {
        let clamped = self.range.clamp(v);
        self.value.store(clamped.to_bits(), Ordering::Release);
    }

    /// Set from a normalized 0..1 value.
    pub fn set_normalized(&self, normalized: f32) {
        self.set(self.range.denormalize(normalized));
    }

    /// Get the parameter value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Get the value in normalized 0..1 form.
    pub fn get_normalized(&self) -> f32 {
        self.range.normalize(self.get())
    }

    /// The parameter's range.
    pub fn range(&self) -> &ParamRange {
        &self.range
    }

    /// Reset to the default value.
    pub fn reset(&self) {
        self.set(self.range.default);
    }
}

/// Values read by the audio context at the start of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    /// Compressor threshold in dB.
    pub threshold_db: f32,
    /// High-pass cutoff in Hz.
    pub cutoff_hz: f32,
    /// Output the dry signal unchanged.
    pub bypass: bool,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            threshold_db: THRESHOLD_RANGE.default,
            cutoff_hz: CUTOFF_RANGE.default,
            bypass: BYPASS_DEFAULT,
        }
    }
}

/// Threshold, cutoff and bypass shared between contexts.
///
/// Wrap in an `Arc` and hand one clone to the [`SignalChain`](crate::SignalChain).
///
/// # Example
///
/// ```rust
/// use bloodless_effects::ParameterStore;
///
/// let store = ParameterStore::new();
/// store.set_threshold_db(-100.0);
/// assert_eq!(store.threshold_db(), -60.0);
/// ```
#[derive(Debug)]
pub struct ParameterStore {
    threshold: AtomicParam,
    cutoff: AtomicParam,
    bypass: AtomicBool,
}

impl ParameterStore {
    /// Create a store with every parameter at its default.
    pub fn new() -> Self {
        Self {
            threshold: AtomicParam::new(THRESHOLD_RANGE),
            cutoff: AtomicParam::new(CUTOFF_RANGE),
            bypass: AtomicBool::new(BYPASS_DEFAULT),
        }
    }

    /// Compressor threshold in dB.
    pub fn threshold_db(&self) -> f32 {
        self.threshold.get()
    }

    /// Set the compressor threshold (clamped to -60..36 dB).
    pub fn set_threshold_db(&self, db: f32) {
        self.threshold.set(db);
    }

    /// High-pass cutoff in Hz.
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff.get()
    }

    /// Set the high-pass cutoff (clamped to 20..20000 Hz).
    pub fn set_cutoff_hz(&self, hz: f32) {
        self.cutoff.set(hz);
    }

    /// Whether bypass is engaged.
    pub fn bypass(&self) -> bool {
        self.bypass.load(Ordering::Acquire)
    }

    /// Engage or release bypass.
    pub fn set_bypass(&self, bypass: bool) {
        self.bypass.store(bypass, Ordering::Release);
    }

    /// Threshold parameter handle (for normalized automation).
    pub fn threshold(&self) -> &AtomicParam {
        &self.threshold
    }

    /// Cutoff parameter handle (for normalized automation).
    pub fn cutoff(&self) -> &AtomicParam {
        &self.cutoff
    }

    /// Read all parameters. Each value is individually atomic.
    #[inline]
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            threshold_db: self.threshold.get(),
            cutoff_hz: self.cutoff.get(),
            bypass: self.bypass(),
        }
    }

    /// Write all parameters from a snapshot (values are clamped).
    pub fn apply(&self, snapshot: &ParamSnapshot) {
        self.set_threshold_db(snapshot.threshold_db);
        self.set_cutoff_hz(snapshot.cutoff_hz);
        self.set_bypass(snapshot.bypass);
    }

    /// Restore every parameter to its default.
    pub fn reset(&self) {
        self.threshold.reset();
        self.cutoff.reset();
        self.set_bypass(BYPASS_DEFAULT);
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
