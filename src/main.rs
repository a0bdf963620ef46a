use anyhow::Result;
use clap::Parser;

use certcat::cli::{Cli, Commands};
use certcat::commands::{fetch, process};

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Fetch(args) => fetch::run(&cli, args),
        Commands::Process(args) => process::run(&cli, args),
    }
}
