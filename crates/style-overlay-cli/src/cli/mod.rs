//! CLI module for the style overlay tool
//!
//! Validates profiles, prints the formatter view, renders canonical text and
//! resolves the active mode.

pub mod commands;
pub mod output;

pub use commands::{Commands, OverlayCli};
pub use output::{OutputFormat, ReportOutput};

use std::io::{self, Write};

use style_overlay_core::{OverlayConfig, OverlayError};
use tracing::Level;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution, profile is valid
    Success = 0,
    /// Validation failed with errors
    ValidationError = 1,
    /// Validation passed with warnings
    ValidationWarning = 2,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Profile text could not be parsed
    ParseError = 5,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from validation findings
    pub fn from_validation_result(has_errors: bool, has_warnings: bool) -> Self {
        if has_errors {
            ExitCode::ValidationError
        } else if has_warnings {
            ExitCode::ValidationWarning
        } else {
            ExitCode::Success
        }
    }

    /// Exit code for an error that aborted a command
    pub fn from_error(err: &OverlayError) -> Self {
        match err {
            OverlayError::Parse(_) => ExitCode::ParseError,
            OverlayError::Validation(_) => ExitCode::ValidationError,
            OverlayError::FileError(_) => ExitCode::FileError,
            OverlayError::InvalidInput(_) => ExitCode::InvalidInput,
            OverlayError::SerializationError(_) => ExitCode::InternalError,
        }
    }
}

/// Log level for the `-v`/`-q` flags
pub fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Run the CLI against the process environment and stdout
pub fn run(cli: OverlayCli) -> Result<ExitCode, OverlayError> {
    let config = OverlayConfig::from_env()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    run_with(cli, &config, &mut handle)
}

/// Run the CLI with explicit settings, writing results to `out`
pub fn run_with(
    cli: OverlayCli,
    config: &OverlayConfig,
    out: &mut dyn Write,
) -> Result<ExitCode, OverlayError> {
    if cli.quiet {
        dispatch(cli.command, config, &mut io::sink())
    } else {
        dispatch(cli.command, config, out)
    }
}

fn dispatch(
    command: Commands,
    config: &OverlayConfig,
    out: &mut dyn Write,
) -> Result<ExitCode, OverlayError> {
    match command {
        Commands::Validate {
            profile,
            strict,
            format,
        } => commands::execute_validate(config, profile, strict, format, out),
        Commands::Inspect {
            profile,
            strict,
            format,
        } => commands::execute_inspect(config, profile, strict, format, out),
        Commands::Render { profile, strict } => {
            commands::execute_render(config, profile, strict, out)
        }
        Commands::Mode {
            profile,
            select,
            format,
        } => commands::execute_mode(config, profile, select, format, out),
    }
}
