//! Shared argument groups and helpers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bloodless_config::{ParameterState, ProcessorSettings};
use bloodless_effects::{CUTOFF_RANGE, ParamRange, ParameterStore, THRESHOLD_RANGE};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

/// Parameter flags shared by every command that runs the chain.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// Compressor threshold in dB (-60 to 36)
    #[arg(long, allow_hyphen_values = true)]
    pub threshold: Option<f32>,

    /// High-pass cutoff in Hz (20 to 20000)
    #[arg(long)]
    pub cutoff: Option<f32>,

    /// Output the dry signal unchanged
    #[arg(long)]
    pub bypass: bool,

    /// Parameter state file, applied before the flags above
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,
}

impl ParamArgs {
    /// Build a parameter store: defaults, then the state file, then flags.
    pub fn build_store(&self) -> anyhow::Result<Arc<ParameterStore>> {
        let store = ParameterStore::new();
        if let Some(path) = &self.state {
            ParameterState::load(path)
                .with_context(|| format!("loading state {}", path.display()))?
                .apply(&store);
        }
        if let Some(db) = self.threshold {
            store.set_threshold_db(checked("threshold", db, &THRESHOLD_RANGE));
        }
        if let Some(hz) = self.cutoff {
            store.set_cutoff_hz(checked("cutoff", hz, &CUTOFF_RANGE));
        }
        if self.bypass {
            store.set_bypass(true);
        }
        Ok(Arc::new(store))
    }
}

fn checked(name: &str, value: f32, range: &ParamRange) -> f32 {
    let clamped = range.clamp(value);
    if clamped != value {
        tracing::warn!(
            parameter = name,
            requested = value,
            applied = clamped,
            "value outside {}..{}, clamped",
            range.min,
            range.max
        );
    }
    clamped
}

/// Load settings from `--settings`, the user config file, or defaults.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ProcessorSettings> {
    ProcessorSettings::resolve(path).context("loading processor settings")
}

/// Progress bar over `len` frames.
pub fn frame_progress(len: usize) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

/// Print a parameter summary line.
pub fn print_params(store: &ParameterStore) {
    println!(
        "  threshold {:.1} dB, cutoff {:.0} Hz, bypass {}",
        store.threshold_db(),
        store.cutoff_hz(),
        if store.bypass() { "on" } else { "off" }
    );
}
