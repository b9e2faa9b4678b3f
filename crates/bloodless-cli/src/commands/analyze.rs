//! Threaded analysis command.
//!
//! The chain renders on an "audio" thread while a second thread polls the
//! analyzer at the display refresh rate, the same split a host and its
//! editor use. Frames the poller misses are dropped by the fifos and
//! counted, not queued.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use bloodless_analysis::{Analyzer, Tap, TapStats};
use bloodless_effects::{AnalysisTaps, LevelMeters, ParamSnapshot, SignalChain};
use bloodless_io::{OfflineRenderer, read_wav_stereo};
use clap::Args;
use serde::Serialize;

use super::common::{ParamArgs, load_settings, print_params};

/// Readings kept by the level history.
const HISTORY_LEN: usize = 256;
/// Weight of the previous value in the displayed level.
const METER_SMOOTHING: f32 = 0.5;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file (mono or stereo)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    #[command(flatten)]
    params: ParamArgs,

    /// Processor settings file (TOML)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Write the report as JSON to this file
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Analyzer polling rate in Hz
    #[arg(long, default_value = "30")]
    refresh_hz: f32,

    /// Pace rendering to the audio clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Weight of the previous scope curve on each refresh (0 disables, 0.5 matches the display)
    #[arg(long, default_value = "0")]
    scope_smoothing: f32,
}

/// Smoothed dry/wet level history, as a meter display keeps it.
#[derive(Debug)]
struct LevelHistory {
    dry: VecDeque<f32>,
    wet: VecDeque<f32>,
    smoothed: Option<(f32, f32)>,
    last_block: u32,
}

impl LevelHistory {
    fn new() -> Self {
        Self {
            dry: VecDeque::with_capacity(HISTORY_LEN),
            wet: VecDeque::with_capacity(HISTORY_LEN),
            smoothed: None,
            last_block: 0,
        }
    }

    /// Record the latest reading if the chain published a new one.
    fn sample(&mut self, meters: &LevelMeters) {
        let published = meters.blocks_published();
        if published == self.last_block {
            return;
        }
        self.last_block = published;
        let reading = meters.reading();
        self.push(reading.dry_db, reading.wet_db);
    }

    fn push(&mut self, dry_db: f32, wet_db: f32) {
        let (dry, wet) = match self.smoothed {
            Some((d, w)) => (
                METER_SMOOTHING * d + (1.0 - METER_SMOOTHING) * dry_db,
                METER_SMOOTHING * w + (1.0 - METER_SMOOTHING) * wet_db,
            ),
            None => (dry_db, wet_db),
        };
        self.smoothed = Some((dry, wet));
        if self.dry.len() == HISTORY_LEN {
            self.dry.pop_front();
            self.wet.pop_front();
        }
        self.dry.push_back(dry);
        self.wet.push_back(wet);
    }
}

/// Running mean of the curves a tap produced.
#[derive(Debug)]
struct CurveAverage {
    sum: Vec<f64>,
    count: u64,
}

impl CurveAverage {
    fn new(points: usize) -> Self {
        Self {
            sum: vec![0.0; points],
            count: 0,
        }
    }

    fn add(&mut self, curve: &[f32]) {
        for (acc, &db) in self.sum.iter_mut().zip(curve) {
            *acc += f64::from(db);
        }
        self.count += 1;
    }

    fn mean(&self, fallback: f32) -> Vec<f32> {
        if self.count == 0 {
            return vec![fallback; self.sum.len()];
        }
        self.sum
            .iter()
            .map(|&s| (s / self.count as f64) as f32)
            .collect()
    }
}

#[derive(Serialize)]
struct TapReport {
    frames_analysed: u64,
    frames_dropped: u64,
    mean_spectrum_db: Vec<f32>,
}

#[derive(Serialize)]
struct Gridline {
    hz: f32,
    position: f32,
}

#[derive(Serialize)]
struct ParamsReport {
    threshold_db: f32,
    cutoff_hz: f32,
    bypass: bool,
}

impl From<ParamSnapshot> for ParamsReport {
    fn from(p: ParamSnapshot) -> Self {
        Self {
            threshold_db: p.threshold_db,
            cutoff_hz: p.cutoff_hz,
            bypass: p.bypass,
        }
    }
}

#[derive(Serialize)]
struct LevelsReport {
    dry_db: Vec<f32>,
    wet_db: Vec<f32>,
}

#[derive(Serialize)]
struct AnalysisReport {
    input: String,
    sample_rate: u32,
    frames: usize,
    blocks: usize,
    polls: u64,
    scope_points: usize,
    parameters: ParamsReport,
    cutoff_position: f32,
    gridlines: Vec<Gridline>,
    post_compression: TapReport,
    post_filter: TapReport,
    levels: LevelsReport,
}

struct PollerResult {
    analyzer: Analyzer,
    post_compression: CurveAverage,
    post_filter: CurveAverage,
    history: LevelHistory,
    polls: u64,
}

fn spawn_poller(
    mut analyzer: Analyzer,
    meters: Arc<LevelMeters>,
    done: Arc<AtomicBool>,
    interval: Duration,
) -> thread::JoinHandle<PollerResult> {
    thread::spawn(move || {
        let points = analyzer.scope().points();
        let mut post_compression = CurveAverage::new(points);
        let mut post_filter = CurveAverage::new(points);
        let mut history = LevelHistory::new();
        let mut polls = 0u64;

        loop {
            // Read the flag first so the final poll sees every published frame.
            let finished = done.load(Ordering::Acquire);
            let outcome = analyzer.poll();
            polls += 1;
            if outcome.post_compression {
                post_compression.add(analyzer.curve(Tap::PostCompression));
            }
            if outcome.post_filter {
                post_filter.add(analyzer.curve(Tap::PostFilter));
            }
            history.sample(&meters);

            if finished {
                break;
            }
            thread::sleep(interval);
        }

        PollerResult {
            analyzer,
            post_compression,
            post_filter,
            history,
            polls,
        }
    })
}

fn tap_report(stats: TapStats, average: &CurveAverage, floor_db: f32) -> TapReport {
    TapReport {
        frames_analysed: stats.consumed,
        frames_dropped: stats.dropped,
        mean_spectrum_db: average.mean(floor_db),
    }
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    if !(args.refresh_hz.is_finite() && args.refresh_hz > 0.0) {
        anyhow::bail!("refresh rate must be positive, got {}", args.refresh_hz);
    }

    let (input, spec) = read_wav_stereo(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let sample_rate = spec.sample_rate as f32;

    let settings = load_settings(args.settings.as_deref())?;
    let params = args.params.build_store()?;
    let (chain, taps) = SignalChain::new(settings.to_chain_config(sample_rate)?, params.clone())?;
    let AnalysisTaps {
        post_compression,
        post_filter,
        meters,
    } = taps;

    let analyzer = Analyzer::new(
        sample_rate,
        settings.scope_points,
        settings.scope_range(),
        post_compression,
        post_filter,
    )
    .with_smoothing(args.scope_smoothing);
    let done = Arc::new(AtomicBool::new(false));
    let poller = spawn_poller(
        analyzer,
        meters,
        Arc::clone(&done),
        Duration::from_secs_f32(1.0 / args.refresh_hz),
    );

    tracing::info!(
        frames = input.len(),
        sample_rate = spec.sample_rate,
        refresh_hz = args.refresh_hz,
        realtime = args.realtime,
        "analysing"
    );
    print_params(&params);

    let mut renderer = OfflineRenderer::new(chain, args.block_size)?;
    let block_period = Duration::from_secs_f32(args.block_size as f32 / sample_rate);
    let realtime = args.realtime;
    let audio = thread::spawn(move || {
        let (_, summary) = renderer.render(&input, |_| {
            if realtime {
                thread::sleep(block_period);
            }
        });
        (renderer, summary)
    });

    let joined = audio.join();
    done.store(true, Ordering::Release);
    let (renderer, summary) = joined.map_err(|_| anyhow::anyhow!("audio thread panicked"))?;
    let result = poller
        .join()
        .map_err(|_| anyhow::anyhow!("analysis thread panicked"))?;

    let analyzer = &result.analyzer;
    let floor_db = analyzer.scope().range().floor_db;
    let snapshot = renderer.chain().current_params();
    let report = AnalysisReport {
        input: args.input.display().to_string(),
        sample_rate: spec.sample_rate,
        frames: summary.frames,
        blocks: summary.blocks,
        polls: result.polls,
        scope_points: analyzer.scope().points(),
        parameters: snapshot.into(),
        cutoff_position: analyzer.cutoff_position(snapshot.cutoff_hz),
        gridlines: analyzer
            .axis()
            .gridlines()
            .map(|(hz, position)| Gridline { hz, position })
            .collect(),
        post_compression: tap_report(
            analyzer.stats(Tap::PostCompression),
            &result.post_compression,
            floor_db,
        ),
        post_filter: tap_report(
            analyzer.stats(Tap::PostFilter),
            &result.post_filter,
            floor_db,
        ),
        levels: LevelsReport {
            dry_db: result.history.dry.iter().copied().collect(),
            wet_db: result.history.wet.iter().copied().collect(),
        },
    };

    println!("Analysed {} frames in {} blocks ({} polls)", report.frames, report.blocks, report.polls);
    for (name, tap) in [
        ("post-compression", &report.post_compression),
        ("post-filter", &report.post_filter),
    ] {
        println!(
            "  {name:<17} {} frame(s) analysed, {} dropped",
            tap.frames_analysed, tap.frames_dropped
        );
    }
    println!(
        "  levels: dry mean {:.1} dB, wet mean {:.1} dB",
        summary.mean_dry_db, summary.mean_wet_db
    );

    if let Some(path) = &args.json {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote report to {}", path.display());
    }

    Ok(())
}
