//! Block RMS metering in decibels.
//!
//! [`LevelTracker`] measures one stereo signal per block: the RMS of each
//! channel, averaged across channels, converted to dB and clamped into a
//! [`MeterRange`]. The result is always finite, silence reads as the floor.
//!
//! [`LevelMeters`] is the lock-free hand-off of the latest dry and wet
//! readings to a display context.

use std::sync::atomic::{AtomicU32, Ordering};

use bloodless_core::{MINUS_INFINITY_DB, gain_to_db};

use crate::error::ChainError;

/// Clamp range for exposed level readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterRange {
    /// Lowest reported level (silence).
    pub floor_db: f32,
    /// Highest reported level.
    pub ceiling_db: f32,
}

impl MeterRange {
    /// Create a range, rejecting non-finite or inverted bounds.
    pub fn new(floor_db: f32, ceiling_db: f32) -> Result<Self, ChainError> {
        if !floor_db.is_finite() || !ceiling_db.is_finite() || floor_db >= ceiling_db {
            return Err(ChainError::InvalidMeterRange {
                floor_db,
                ceiling_db,
            });
        }
        Ok(Self {
            floor_db,
            ceiling_db,
        })
    }

    /// Clamp a dB value into the range. NaN maps to the floor.
    #[inline]
    pub fn clamp(&self, db: f32) -> f32 {
        if db.is_nan() {
            self.floor_db
        } else {
            db.clamp(self.floor_db, self.ceiling_db)
        }
    }
}

impl Default for MeterRange {
    fn default() -> Self {
        Self {
            floor_db: -60.0,
            ceiling_db: 36.0,
        }
    }
}

/// Per-block stereo RMS meter.
///
/// A block may be fed in several pieces with [`accumulate`](Self::accumulate)
/// and closed with [`finish_block`](Self::finish_block); the reading covers
/// every sample fed since the last close.
///
/// # Example
///
/// ```rust
/// use bloodless_effects::{LevelTracker, MeterRange};
///
/// let mut tracker = LevelTracker::new(MeterRange::default());
/// assert_eq!(tracker.update_rms(&[0.0; 64], &[0.0; 64]), -60.0);
/// ```
#[derive(Debug, Clone)]
pub struct LevelTracker {
    range: MeterRange,
    sum_sq: [f64; 2],
    count: usize,
    last_db: f32,
}

impl LevelTracker {
    /// Create a tracker reading the floor until the first block.
    pub fn new(range: MeterRange) -> Self {
        Self {
            range,
            sum_sq: [0.0; 2],
            count: 0,
            last_db: range.floor_db,
        }
    }

    /// Measure a complete block and return its level in dB.
    pub fn update_rms(&mut self, left: &[f32], right: &[f32]) -> f32 {
        self.accumulate(left, right);
        self.finish_block()
    }

    /// Add samples to the block being measured.
    #[inline]
    pub fn accumulate(&mut self, left: &[f32], right: &[f32]) {
        debug_assert_eq!(left.len(), right.len());
        for (sum, channel) in self.sum_sq.iter_mut().zip([left, right]) {
            *sum += channel.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>();
        }
        self.count += left.len();
    }

    /// Close the block, store and return its level in dB.
    ///
    /// A block with no samples reads as the floor.
    pub fn finish_block(&mut self) -> f32 {
        let db = if self.count == 0 {
            self.range.floor_db
        } else {
            let n = self.count as f64;
            let mean_rms = self.sum_sq.iter().map(|s| (s / n).sqrt()).sum::<f64>() / 2.0;
            self.range.clamp(gain_to_db(mean_rms as f32, MINUS_INFINITY_DB))
        };
        self.sum_sq = [0.0; 2];
        self.count = 0;
        self.last_db = db;
        db
    }

    /// Last completed reading in dB.
    pub fn last_db(&self) -> f32 {
        self.last_db
    }

    /// Clamp range of readings.
    pub fn range(&self) -> MeterRange {
        self.range
    }

    /// Drop any partial block and read the floor again.
    pub fn reset(&mut self) {
        self.sum_sq = [0.0; 2];
        self.count = 0;
        self.last_db = self.range.floor_db;
    }
}

/// Dry and wet readings at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelReading {
    /// Input level in dB.
    pub dry_db: f32,
    /// Compressed wet level in dB.
    pub wet_db: f32,
}

/// Latest dry and wet levels, shared with display contexts.
///
/// Written once per block by the chain, read at any time elsewhere.
#[derive(Debug)]
pub struct LevelMeters {
    dry_db: AtomicU32,
    wet_db: AtomicU32,
    blocks: AtomicU32,
}

impl LevelMeters {
    /// Create meters reading `floor_db` on both taps.
    pub fn new(floor_db: f32) -> Self {
        Self {
            dry_db: AtomicU32::new(floor_db.to_bits()),
            wet_db: AtomicU32::new(floor_db.to_bits()),
            blocks: AtomicU32::new(0),
        }
    }

    /// Publish the readings of one block.
    #[inline]
    pub fn publish(&self, dry_db: f32, wet_db: f32) {
        self.dry_db.store(dry_db.to_bits(), Ordering::Relaxed);
        self.wet_db.store(wet_db.to_bits(), Ordering::Relaxed);
        self.blocks.fetch_add(1, Ordering::Release);
    }

    /// Latest dry level in dB.
    pub fn dry_db(&self) -> f32 {
        f32::from_bits(self.dry_db.load(Ordering::Acquire))
    }

    /// Latest wet level in dB.
    pub fn wet_db(&self) -> f32 {
        f32::from_bits(self.wet_db.load(Ordering::Acquire))
    }

    /// Both readings.
    pub fn reading(&self) -> LevelReading {
        LevelReading {
            dry_db: self.dry_db(),
            wet_db: self.wet_db(),
        }
    }

    /// Blocks published so far (wraps at `u32::MAX`).
    pub fn blocks_published(&self) -> u32 {
        self.blocks.load(Ordering::Acquire)
    }
}

impl Default for LevelMeters {
    fn default() -> Self {
        Self::new(MeterRange::default().floor_db)
    }
}
