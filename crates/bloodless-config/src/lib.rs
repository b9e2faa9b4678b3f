//! Parameter state and processor settings for bloodless.
//!
//! - [`ParameterState`]: the threshold/cutoff/bypass blob a host persists,
//!   with capture from and restore into a live
//!   [`ParameterStore`](bloodless_effects::ParameterStore).
//! - [`ProcessorSettings`]: prepare-time shape of the processor (filter
//!   stages, block capacity, meter and spectrum ranges) loaded from TOML.
//! - [`paths`]: platform config locations.
//!
//! # Example
//!
//! ```rust
//! use bloodless_config::{ParameterState, ProcessorSettings};
//! use bloodless_effects::ParameterStore;
//!
//! let store = ParameterStore::new();
//! store.set_threshold_db(-18.0);
//! let blob = ParameterState::capture(&store).to_bytes()?;
//!
//! let restored = ParameterStore::new();
//! ParameterState::restore(&restored, &blob)?;
//! assert_eq!(restored.threshold_db(), -18.0);
//!
//! let config = ProcessorSettings::default().to_chain_config(48000.0)?;
//! assert_eq!(config.filter_stages, 4);
//! # Ok::<(), bloodless_config::ConfigError>(())
//! ```

mod error;
mod settings;
mod state;

/// Platform-specific configuration paths.
#[cfg(feature = "std")]
pub mod paths;

pub use error::ConfigError;
#[cfg(feature = "std")]
pub use paths::{user_config_dir, user_settings_path, user_state_path};
pub use settings::{MAX_SCOPE_POINTS, ProcessorSettings};
pub use state::{ParameterState, STATE_VERSION};
