//! Bloodless Core - DSP primitives for the bloodless processor
//!
//! This crate provides the building blocks the signal chain is assembled
//! from. Everything on the audio path is allocation-free.
//!
//! # Core Abstractions
//!
//! - [`Effect`] - Mono, sample-at-a-time processor trait
//! - [`StereoEffect`] - Two-channel processor trait
//!
//! ## Filters & Dynamics
//!
//! - [`StateVariableFilter`] - TPT high-pass SVF at Butterworth Q
//! - [`EnvelopeFollower`] - Peak envelope detection with attack/release
//!
//! ## Analysis Hand-off (`std` only)
//!
//! - [`sample_fifo`] - Creates a [`FifoProducer`]/[`FifoConsumer`] pair that
//!   moves full analysis frames from the audio context to an analysis context
//!   without locks
//!
//! ## Utilities
//!
//! - Level math: [`db_to_linear`], [`linear_to_db`], [`gain_to_db`], [`rms`]
//! - [`mono_sum`], [`flush_denormal`]
//!
//! # no_std Support
//!
//! The DSP primitives are `no_std` compatible. Disable the default `std`
//! feature to drop the fifo and its `triple_buffer` dependency:
//!
//! ```toml
//! [dependencies]
//! bloodless-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Features
//!
//! - `std` (default): enables [`sample_fifo`]
//! - `tracing`: emits `tracing` events at construction time (never per sample)

#![cfg_attr(not(feature = "std"), no_std)]

pub mod effect;
pub mod envelope;
#[cfg(feature = "std")]
pub mod fifo;
pub mod math;
pub mod svf;

pub use effect::{Effect, StereoEffect};
pub use envelope::EnvelopeFollower;
#[cfg(feature = "std")]
pub use fifo::{ANALYSIS_FRAME_LEN, FifoConsumer, FifoProducer, sample_fifo};
pub use math::{
    MINUS_INFINITY_DB, db_to_linear, flush_denormal, gain_to_db, linear_to_db, mono_sum, rms,
};
pub use svf::StateVariableFilter;
