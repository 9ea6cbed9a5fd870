mod common;
mod io;
mod run_fit;
mod run_sim;

use crate::run_fit::*;
use crate::run_sim::*;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a weighted network from a planted block model
    Simulate(SimArgs),

    /// Infer block structure of a weighted network by Gibbs sampling
    Fit(FitArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.commands {
        Commands::Simulate(args) => {
            run_sim_network(args.clone())?;
        }
        Commands::Fit(args) => {
            run_fit_network(args.clone())?;
        }
    }

    Ok(())
}
