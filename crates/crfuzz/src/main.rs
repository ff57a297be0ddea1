//! crfuzz CLI - differential tester for a C-to-Rust translator.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Re-entry checks run thousands of times under the reducer; keep them
    // quiet by default. stdout stays reserved for the divergence message.
    let default_level = if cli.silent {
        "crfuzz=error"
    } else if cli.verbose {
        "crfuzz=debug"
    } else if cli.check.is_some() {
        "crfuzz=warn"
    } else {
        "crfuzz=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let original_args: Vec<String> = std::env::args().skip(1).collect();
    let config = cli.frozen_config(original_args);

    std::process::exit(commands::run_command(&cli, &config));
}
