//! Processor settings file.
//!
//! Settings fix the shape of the processor at prepare time: how many
//! high-pass stages run in series, how large a block is processed in one
//! pass, and how the meters and spectrum display are scaled.
//!
//! # TOML Format
//!
//! ```toml
//! filter_stages = 4
//! max_block_size = 4096
//! scope_points = 512
//! meter_floor_db = -60.0
//! meter_ceiling_db = 36.0
//! spectrum_floor_db = -96.0
//! spectrum_ceiling_db = 36.0
//! ```
//!
//! Every key is optional.

use std::path::Path;

use bloodless_analysis::{DEFAULT_SCOPE_POINTS, ScopeRange};
use bloodless_effects::{
    ChainConfig, DEFAULT_FILTER_STAGES, DEFAULT_MAX_BLOCK_SIZE, MAX_FILTER_STAGES, MeterRange,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, write_with_parents};

/// Largest accepted display resolution.
pub const MAX_SCOPE_POINTS: usize = 8192;

/// Prepare-time settings of the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorSettings {
    /// Series high-pass stages (1..=16).
    pub filter_stages: usize,
    /// Largest block processed in one pass.
    pub max_block_size: usize,
    /// Display points of each spectrum curve.
    pub scope_points: usize,
    /// Lowest reported RMS level.
    pub meter_floor_db: f32,
    /// Highest reported RMS level.
    pub meter_ceiling_db: f32,
    /// Bottom of the spectrum display.
    pub spectrum_floor_db: f32,
    /// Top of the spectrum display.
    pub spectrum_ceiling_db: f32,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        let meter = MeterRange::default();
        let spectrum = ScopeRange::default();
        Self {
            filter_stages: DEFAULT_FILTER_STAGES,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            scope_points: DEFAULT_SCOPE_POINTS,
            meter_floor_db: meter.floor_db,
            meter_ceiling_db: meter.ceiling_db,
            spectrum_floor_db: spectrum.floor_db,
            spectrum_ceiling_db: spectrum.ceiling_db,
        }
    }
}

impl ProcessorSettings {
    /// Check every setting, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter_stages == 0 || self.filter_stages > MAX_FILTER_STAGES {
            return Err(ConfigError::validation(
                "filter_stages",
                format!("{} outside 1..={}", self.filter_stages, MAX_FILTER_STAGES),
            ));
        }
        if self.max_block_size == 0 {
            return Err(ConfigError::validation("max_block_size", "must be non-zero"));
        }
        if self.scope_points == 0 || self.scope_points > MAX_SCOPE_POINTS {
            return Err(ConfigError::validation(
                "scope_points",
                format!("{} outside 1..={}", self.scope_points, MAX_SCOPE_POINTS),
            ));
        }
        self.meter_range()?;
        if !self.spectrum_floor_db.is_finite()
            || !self.spectrum_ceiling_db.is_finite()
            || self.spectrum_floor_db >= self.spectrum_ceiling_db
        {
            return Err(ConfigError::validation(
                "spectrum_floor_db",
                format!(
                    "floor {} dB must be below ceiling {} dB",
                    self.spectrum_floor_db, self.spectrum_ceiling_db
                ),
            ));
        }
        Ok(())
    }

    /// Meter clamp range.
    pub fn meter_range(&self) -> Result<MeterRange, ConfigError> {
        Ok(MeterRange::new(self.meter_floor_db, self.meter_ceiling_db)?)
    }

    /// Spectrum display range.
    pub fn scope_range(&self) -> ScopeRange {
        ScopeRange {
            floor_db: self.spectrum_floor_db,
            ceiling_db: self.spectrum_ceiling_db,
        }
    }

    /// Validated chain configuration at a sample rate.
    pub fn to_chain_config(&self, sample_rate: f32) -> Result<ChainConfig, ConfigError> {
        self.validate()?;
        let config = ChainConfig {
            sample_rate,
            max_block_size: self.max_block_size,
            filter_stages: self.filter_stages,
            meter_range: self.meter_range()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to TOML text.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load and validate a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), ?settings, "settings loaded");
        Ok(settings)
    }

    /// Save to a settings file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parents(path.as_ref(), &self.to_toml()?)
    }

    /// Load from an explicit path, else the user settings file if it
    /// exists, else defaults.
    #[cfg(feature = "std")]
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let user = crate::paths::user_settings_path();
        if user.is_file() {
            Self::load(user)
        } else {
            Ok(Self::default())
        }
    }
}
