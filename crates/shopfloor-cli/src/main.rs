//! Shopfloor CLI - inspect, validate and repair simulation models

mod cli;
mod report;

use clap::Parser;
use shopfloor::core::logging::init_logging;

fn main() {
    let cli_args = cli::Cli::parse();

    // Early logging; run() reinitializes with CLI and environment settings
    if let Err(e) = init_logging(None, None) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let app = cli::ShopfloorApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
