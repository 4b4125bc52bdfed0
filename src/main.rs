use clap::Parser;
use costpilot::{
    cli::Cli,
    config,
};
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> costpilot::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration
    let config = config::load_config(cli.config.as_deref())?;
    if !config.output.color {
        colored::control::set_override(false);
    }

    // Execute command
    costpilot::run_command(cli.command, &config)
}
