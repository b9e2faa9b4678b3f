//! bloodless CLI - render, analyse and inspect the phase-cancelling processor.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bloodless")]
#[command(author, version, about = "Phase-cancelling compressor/high-pass processor", long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the signal chain
    Process(commands::process::ProcessArgs),

    /// Run the chain and spectrum analyzer on separate threads
    Analyze(commands::analyze::AnalyzeArgs),

    /// Generate stereo test signals
    Generate(commands::generate::GenerateArgs),

    /// Show or save parameter state
    State(commands::state::StateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::State(args) => commands::state::run(args),
    }
}
