//! CLI command implementations
//!
//! Each subcommand has its own module with an Args struct and a `run()`.

use clap::Subcommand;

pub mod config;
pub mod import;
pub mod rank;
pub mod stats;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Rank(args) => rank::run(ctx, args),
        Commands::Import(args) => import::run(ctx, args),
        Commands::Stats(args) => stats::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank skills for a job description
    Rank(rank::RankArgs),

    /// Load dictionary, embedding, or popularity data into the store
    Import(import::ImportArgs),

    /// Show store row counts
    Stats(stats::StatsArgs),

    /// Show the effective configuration
    Config(config::ConfigArgs),
}
