//! Persisted parameter state.
//!
//! The host layer stores the processor's parameters as an opaque blob. The
//! blob is TOML text:
//!
//! ```toml
//! version = 1
//!
//! [parameters]
//! threshold = -12.0
//! cutoff = 4000.0
//! bypass = false
//! ```
//!
//! Missing parameters take their defaults; unknown keys, unknown versions and
//! malformed text are rejected before anything touches the live store.

use std::path::Path;

use bloodless_effects::{ParamSnapshot, ParameterStore};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, write_with_parents};

/// Current state blob version.
pub const STATE_VERSION: u32 = 1;

/// Threshold, cutoff and bypass as saved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterState {
    /// Compressor threshold in dB.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// High-pass cutoff in Hz.
    #[serde(default = "default_cutoff")]
    pub cutoff: f32,
    /// Bypass engaged.
    #[serde(default)]
    pub bypass: bool,
}

fn default_threshold() -> f32 {
    ParamSnapshot::default().threshold_db
}

fn default_cutoff() -> f32 {
    ParamSnapshot::default().cutoff_hz
}

fn default_version() -> u32 {
    STATE_VERSION
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StateDocument {
    #[serde(default = "default_version")]
    version: u32,
    parameters: ParameterState,
}

impl Default for ParameterState {
    fn default() -> Self {
        ParamSnapshot::default().into()
    }
}

impl From<ParamSnapshot> for ParameterState {
    fn from(snapshot: ParamSnapshot) -> Self {
        Self {
            threshold: snapshot.threshold_db,
            cutoff: snapshot.cutoff_hz,
            bypass: snapshot.bypass,
        }
    }
}

impl From<ParameterState> for ParamSnapshot {
    fn from(state: ParameterState) -> Self {
        Self {
            threshold_db: state.threshold,
            cutoff_hz: state.cutoff,
            bypass: state.bypass,
        }
    }
}

impl ParameterState {
    /// Read the current values of a live store.
    pub fn capture(store: &ParameterStore) -> Self {
        store.snapshot().into()
    }

    /// Write these values into a live store. Out-of-range values are clamped.
    pub fn apply(&self, store: &ParameterStore) {
        store.apply(&(*self).into());
    }

    /// Serialize to the opaque state blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(self.to_toml()?.into_bytes())
    }

    /// Parse an opaque state blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        Self::from_toml(std::str::from_utf8(bytes)?)
    }

    /// Serialize to TOML text.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let doc = StateDocument {
            version: STATE_VERSION,
            parameters: *self,
        };
        Ok(toml::to_string_pretty(&doc)?)
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let doc: StateDocument = toml::from_str(text)?;
        if doc.version != STATE_VERSION {
            return Err(ConfigError::validation(
                "version",
                format!("unsupported state version {}", doc.version),
            ));
        }
        Ok(doc.parameters)
    }

    /// Restore a store from a blob. On error the store is left untouched.
    pub fn restore(store: &ParameterStore, bytes: &[u8]) -> Result<Self, ConfigError> {
        let state = Self::from_bytes(bytes)?;
        state.apply(store);
        tracing::debug!(?state, "parameter state restored");
        Ok(state)
    }

    /// Load a state file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Save to a state file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parents(path.as_ref(), &self.to_toml()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_store() {
        let store = ParameterStore::new();
        assert_eq!(ParameterState::capture(&store), ParameterState::default());
        assert_eq!(
            ParameterState::default(),
            ParameterState {
                threshold: 0.0,
                cutoff: 4000.0,
                bypass: false
            }
        );
    }

    #[test]
    fn blob_restores_store() {
        let source = ParameterStore::new();
        source.set_threshold_db(-24.5);
        source.set_cutoff_hz(150.0);
        source.set_bypass(true);
        let blob = ParameterState::capture(&source).to_bytes().unwrap();

        let target = ParameterStore::new();
        ParameterState::restore(&target, &blob).unwrap();
        assert_eq!(target.snapshot(), source.snapshot());
    }

    #[test]
    fn missing_parameters_take_defaults() {
        let state = ParameterState::from_toml("[parameters]\nthreshold = -6.0\n").unwrap();
        assert_eq!(state.threshold, -6.0);
        assert_eq!(state.cutoff, 4000.0);
        assert!(!state.bypass);
    }

    #[test]
    fn apply_clamps_out_of_range_values() {
        let store = ParameterStore::new();
        let state = ParameterState::from_toml("[parameters]\nthreshold = 90.0\ncutoff = 5.0\n").unwrap();
        state.apply(&store);
        assert_eq!(store.threshold_db(), 36.0);
        assert_eq!(store.cutoff_hz(), 20.0);
    }

    #[test]
    fn malformed_blob_leaves_store_untouched() {
        let store = ParameterStore::new();
        store.set_threshold_db(-10.0);

        let blobs: [&[u8]; 6] = [
            b"not toml at all [",
            b"[parameters]\nthreshold = \"loud\"\n",
            b"[parameters]\ngain = 3.0\n",
            b"version = 7\n[parameters]\n",
            b"threshold = 1.0\n",
            &[0xff, 0xfe, 0x00],
        ];
        for blob in blobs {
            assert!(ParameterState::restore(&store, blob).is_err());
            assert_eq!(store.threshold_db(), -10.0);
        }
    }

    #[test]
    fn unsupported_version_is_validation_error() {
        let err = ParameterState::from_toml("version = 2\n[parameters]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { key: "version", .. }));
    }
}
