//! Cushion - align scanned seat shapes from the terminal
//!
//! Usage:
//!   cushion info  <scan.stl>
//!   cushion align <scan.stl> --vertices I J K
//!   cushion flip  <scan.stl>
//!   cushion view  <scan.stl> [--vertices I J K]

use anyhow::Result;
use clap::Parser;
use cushion_terminal::cli::{self, Cli};

fn main() -> Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    cli::run(args)
}
