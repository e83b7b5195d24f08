mod cli;
mod commands;
mod config;
mod export;
mod merge;
mod trace;
mod types;

use clap::Parser;

fn main() {
    let args = cli::Args::parse();

    let result = match args.command {
        cli::Commands::Merge(opts) => commands::merge::run(opts),
        cli::Commands::Export(opts) => commands::export::run(opts),
        cli::Commands::Info(opts) => commands::info::run(opts),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
