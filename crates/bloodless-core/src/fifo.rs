//! Single-producer single-consumer analysis frame hand-off.
//!
//! The audio context pushes samples one at a time into a [`FifoProducer`].
//! Each time `N` samples have accumulated, the completed frame is published
//! and the write index wraps to zero. The analysis context polls a
//! [`FifoConsumer`], which yields the newest published frame exactly once.
//!
//! Publication goes through a triple buffer, so the consumer never observes a
//! partially written frame and the producer never waits. When the consumer
//! falls behind, older unread frames are overwritten by newer ones: only the
//! most recent frame is ever delivered.
//!
//! # Example
//!
//! ```rust
//! use bloodless_core::sample_fifo;
//!
//! let (mut producer, mut consumer) = sample_fifo::<8>();
//! for i in 0..8 {
//!     producer.push(i as f32);
//! }
//! let frame = consumer.consume().unwrap();
//! assert_eq!(frame[7], 7.0);
//! assert!(consumer.consume().is_none());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use triple_buffer::{Input, Output, TripleBuffer};

/// Frame length used by the analysis taps.
pub const ANALYSIS_FRAME_LEN: usize = 1024;

/// Create a connected producer/consumer pair for frames of `N` samples.
///
/// # Panics
///
/// Panics if `N` is zero.
pub fn sample_fifo<const N: usize>() -> (FifoProducer<N>, FifoConsumer<N>) {
    assert!(N > 0, "frame length must be non-zero");

    let (input, output) = TripleBuffer::new(&[0.0f32; N]).split();
    let published = Arc::new(AtomicU64::new(0));

    #[cfg(feature = "tracing")]
    tracing::debug!(frame_len = N, "sample fifo created");

    (
        FifoProducer {
            buffer: [0.0; N],
            index: 0,
            input,
            published: Arc::clone(&published),
        },
        FifoConsumer {
            output,
            published,
            consumed: 0,
        },
    )
}

/// Audio-side half of a sample fifo.
///
/// [`push`](Self::push) never blocks and never allocates.
pub struct FifoProducer<const N: usize> {
    buffer: [f32; N],
    index: usize,
    input: Input<[f32; N]>,
    published: Arc<AtomicU64>,
}

impl<const N: usize> FifoProducer<N> {
    /// Append one sample, publishing the frame when it becomes full.
    ///
    /// Returns `true` when this push completed (and published) a frame.
    #[inline]
    pub fn push(&mut self, sample: f32) -> bool {
        self.buffer[self.index] = sample;
        self.index += 1;

        if self.index == N {
            self.index = 0;
            self.input.write(self.buffer);
            self.published.fetch_add(1, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Push a run of samples. Returns the number of frames published.
    pub fn push_slice(&mut self, samples: &[f32]) -> usize {
        samples.iter().filter(|&&s| self.push(s)).count()
    }

    /// Samples accumulated toward the next frame.
    pub fn pending(&self) -> usize {
        self.index
    }

    /// Total frames published since creation.
    pub fn frames_published(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    /// Discard the partial frame. Already published frames are unaffected.
    pub fn clear(&mut self) {
        self.index = 0;
    }

    /// Frame length in samples.
    pub const fn frame_len(&self) -> usize {
        N
    }
}

impl<const N: usize> core::fmt::Debug for FifoProducer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FifoProducer")
            .field("frame_len", &N)
            .field("pending", &self.index)
            .field("published", &self.frames_published())
            .finish_non_exhaustive()
    }
}

/// Analysis-side half of a sample fifo.
pub struct FifoConsumer<const N: usize> {
    output: Output<[f32; N]>,
    published: Arc<AtomicU64>,
    consumed: u64,
}

impl<const N: usize> FifoConsumer<N> {
    /// Whether a frame has been published since the last [`consume`](Self::consume).
    pub fn is_ready(&self) -> bool {
        self.output.updated()
    }

    /// Take the newest published frame, or `None` if nothing new arrived.
    pub fn consume(&mut self) -> Option<&[f32; N]> {
        if !self.output.updated() {
            return None;
        }
        self.consumed += 1;
        Some(self.output.read())
    }

    /// Frames delivered through [`consume`](Self::consume).
    pub fn frames_consumed(&self) -> u64 {
        self.consumed
    }

    /// Frames published by the producer.
    pub fn frames_published(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    /// Frames overwritten before they could be consumed.
    ///
    /// A frame published after the last `consume` but not yet read is not
    /// counted as dropped.
    pub fn frames_dropped(&self) -> u64 {
        let published = self.frames_published();
        let pending = u64::from(self.is_ready());
        published.saturating_sub(self.consumed + pending)
    }

    /// Frame length in samples.
    pub const fn frame_len(&self) -> usize {
        N
    }
}

impl<const N: usize> core::fmt::Debug for FifoConsumer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FifoConsumer")
            .field("frame_len", &N)
            .field("consumed", &self.consumed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_before_full_frame() {
        let (mut producer, mut consumer) = sample_fifo::<16>();
        for i in 0..15 {
            assert!(!producer.push(i as f32));
        }
        assert!(!consumer.is_ready());
        assert!(consumer.consume().is_none());
        assert_eq!(producer.pending(), 15);
    }

    #[test]
    fn test_ready_exactly_once_per_frame() {
        let (mut producer, mut consumer) = sample_fifo::<16>();
        for i in 0..16 {
            producer.push(i as f32);
        }
        assert!(consumer.is_ready());
        let frame = *consumer.consume().unwrap();
        assert_eq!(frame[0], 0.0);
        assert_eq!(frame[15], 15.0);
        assert!(consumer.consume().is_none());
        assert_eq!(producer.pending(), 0);
    }

    #[test]
    fn test_newest_frame_wins() {
        let (mut producer, mut consumer) = sample_fifo::<8>();
        let published = producer.push_slice(&[1.0; 8]) + producer.push_slice(&[2.0; 8]);
        assert_eq!(published, 2);
        assert_eq!(producer.frames_published(), 2);

        let frame = consumer.consume().unwrap();
        assert!(frame.iter().all(|&s| s == 2.0));
        assert!(consumer.consume().is_none());
        assert_eq!(consumer.frames_consumed(), 1);
        assert_eq!(consumer.frames_dropped(), 1);
    }

    #[test]
    fn test_clear_discards_partial_frame() {
        let (mut producer, mut consumer) = sample_fifo::<4>();
        producer.push_slice(&[9.0; 3]);
        producer.clear();
        producer.push_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(consumer.consume().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_cross_thread_delivery() {
        let (mut producer, mut consumer) = sample_fifo::<ANALYSIS_FRAME_LEN>();
        let handle = std::thread::spawn(move || {
            for _ in 0..4 {
                producer.push_slice(&[0.5; ANALYSIS_FRAME_LEN]);
            }
            producer
        });
        let producer = handle.join().unwrap();
        assert_eq!(producer.frames_published(), 4);

        let frame = consumer.consume().unwrap();
        assert!(frame.iter().all(|&s| s == 0.5));
        assert_eq!(consumer.frames_dropped(), 3);
    }
}
