//! Parameter state inspection.

use std::path::PathBuf;

use anyhow::Context;
use bloodless_config::{ParameterState, user_state_path};
use clap::{Args, Subcommand};

use super::common::{ParamArgs, print_params};

#[derive(Args)]
pub struct StateArgs {
    #[command(subcommand)]
    command: StateCommand,
}

#[derive(Subcommand)]
enum StateCommand {
    /// Print a state file (defaults to the user state file)
    Show {
        /// State file to read
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Write a state file from defaults, --state and flags
    Save {
        /// Destination (defaults to the user state file)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        #[command(flatten)]
        params: ParamArgs,
    },
}

pub fn run(args: StateArgs) -> anyhow::Result<()> {
    match args.command {
        StateCommand::Show { file } => {
            let path = file.unwrap_or_else(user_state_path);
            let state = if path.is_file() {
                ParameterState::load(&path)
                    .with_context(|| format!("loading state {}", path.display()))?
            } else {
                println!("# {} not found, showing defaults", path.display());
                ParameterState::default()
            };
            print!("{}", state.to_toml()?);
        }
        StateCommand::Save { file, params } => {
            let path = file.unwrap_or_else(user_state_path);
            let store = params.build_store()?;
            ParameterState::capture(&store)
                .save(&path)
                .with_context(|| format!("saving state {}", path.display()))?;
            println!("Saved state to {}", path.display());
            print_params(&store);
        }
    }
    Ok(())
}
