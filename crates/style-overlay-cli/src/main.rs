//! Style Overlay CLI
//!
//! # Exit Codes
//!
//! - 0: Success - profile is valid
//! - 1: Validation failed with errors
//! - 2: Validation passed with warnings
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 5: Profile could not be parsed
//! - 10: Internal error

use clap::Parser;
use style_overlay_cli::{cli::log_level, run_cli, OverlayCli};

fn main() {
    let cli = OverlayCli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level(cli.verbose, cli.quiet).into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
