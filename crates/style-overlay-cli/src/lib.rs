//! Style Overlay CLI
//!
//! Command-line front end for `style-overlay-core`.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Audit a profile and list every finding
//! style-overlay validate --profile friend.overlay --strict
//!
//! # Show the hints a renderer receives
//! style-overlay inspect --profile friend.overlay --format json
//!
//! # Print canonical overlay text
//! style-overlay render --profile friend.overlay
//!
//! # Resolve the active mode
//! style-overlay mode --profile friend.overlay --select surgeon
//! ```

pub mod cli;

pub use cli::{Commands, ExitCode, OutputFormat, OverlayCli};

/// Run the CLI application
///
/// This is the main entry point for the CLI binary.
pub fn run_cli(cli: OverlayCli) -> ExitCode {
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_user_error() {
                ExitCode::from_error(&e)
            } else {
                ExitCode::InternalError
            }
        }
    }
}
