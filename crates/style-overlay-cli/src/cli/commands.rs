//! CLI command definitions for the style overlay tool

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use style_overlay_core::{
    LoadOptions, Mode, ModeSwitch, OverlayConfig, OverlayError, ProfileLoader,
};
use tracing::{info, warn};

use super::output::{BiasOutput, ModeOutput, OutputFormat, ReportOutput};
use super::ExitCode;

/// Style overlay CLI
///
/// Validate cognitive style overlay profiles, inspect the hints they give a
/// renderer and pick the active response mode.
#[derive(Parser, Debug)]
#[command(name = "style-overlay")]
#[command(about = "Style Overlay - Validate and inspect style overlay profiles", long_about = None)]
#[command(version)]
pub struct OverlayCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a profile and list every finding
    Validate {
        /// Path to the profile (defaults to STYLE_OVERLAY__PROFILE)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Treat unknown fields as errors
        #[arg(long)]
        strict: bool,

        /// Output format for validation results
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },

    /// Show the formatter hints a profile produces
    Inspect {
        /// Path to the profile (defaults to STYLE_OVERLAY__PROFILE)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Treat unknown fields as errors
        #[arg(long)]
        strict: bool,

        /// Output format for the formatter view
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },

    /// Print the profile as canonical overlay text
    Render {
        /// Path to the profile (defaults to STYLE_OVERLAY__PROFILE)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Treat unknown fields as errors
        #[arg(long)]
        strict: bool,
    },

    /// Resolve the active mode and its template
    Mode {
        /// Path to the profile (defaults to STYLE_OVERLAY__PROFILE)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Mode to select (ORACLE, OPERATOR or SURGEON)
        #[arg(short, long)]
        select: Option<String>,

        /// Output format for the selected mode
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },
}

fn resolve_profile(
    config: &OverlayConfig,
    profile: Option<PathBuf>,
) -> Result<PathBuf, OverlayError> {
    profile.or_else(|| config.profile.clone()).ok_or_else(|| {
        OverlayError::invalid_input(
            "No profile given: pass --profile or set STYLE_OVERLAY__PROFILE",
        )
    })
}

fn loader(config: &OverlayConfig, strict: bool) -> ProfileLoader {
    ProfileLoader::new(LoadOptions {
        strict: strict || config.strict,
        format: config.format,
    })
}

/// Execute the validate command
pub fn execute_validate(
    config: &OverlayConfig,
    profile: Option<PathBuf>,
    strict: bool,
    format: Option<OutputFormat>,
    out: &mut dyn Write,
) -> Result<ExitCode, OverlayError> {
    let path = resolve_profile(config, profile)?;
    let report = loader(config, strict).audit_file(&path)?;
    info!(
        path = %path.display(),
        valid = report.valid,
        findings = report.findings.len(),
        "audited profile"
    );

    let output = ReportOutput::from_report(&report);
    output.render(format.unwrap_or_default(), out)?;

    Ok(ExitCode::from_validation_result(
        output.error_count > 0,
        output.warning_count > 0,
    ))
}

/// Execute the inspect command
pub fn execute_inspect(
    config: &OverlayConfig,
    profile: Option<PathBuf>,
    strict: bool,
    format: Option<OutputFormat>,
    out: &mut dyn Write,
) -> Result<ExitCode, OverlayError> {
    let path = resolve_profile(config, profile)?;
    let profile = loader(config, strict).load_file(&path)?;
    BiasOutput::from_bias(&profile.formatter_bias()).render(format.unwrap_or_default(), out)?;
    Ok(ExitCode::Success)
}

/// Execute the render command
pub fn execute_render(
    config: &OverlayConfig,
    profile: Option<PathBuf>,
    strict: bool,
    out: &mut dyn Write,
) -> Result<ExitCode, OverlayError> {
    let path = resolve_profile(config, profile)?;
    let profile = loader(config, strict).load_file(&path)?;
    out.write_all(profile.to_document().as_bytes())?;
    out.flush()?;
    Ok(ExitCode::Success)
}

/// Execute the mode command
///
/// `--select` must name an enabled mode. A mode from the environment is only a
/// preference and falls back to the first enabled mode.
pub fn execute_mode(
    config: &OverlayConfig,
    profile: Option<PathBuf>,
    select: Option<String>,
    format: Option<OutputFormat>,
    out: &mut dyn Write,
) -> Result<ExitCode, OverlayError> {
    let path = resolve_profile(config, profile)?;
    let profile = loader(config, false).load_file(&path)?;

    let switch = match select {
        Some(name) => {
            let mode: Mode = name.parse().map_err(|e: style_overlay_core::ValidationError| {
                OverlayError::invalid_input(e.reason)
            })?;
            ModeSwitch::select(&profile, mode)?
        }
        None => match config.mode {
            Some(preferred) => ModeSwitch::select(&profile, preferred).unwrap_or_else(|err| {
                warn!(mode = %preferred, reason = %err.reason, "preferred mode unavailable");
                ModeSwitch::initial(&profile)
            }),
            None => ModeSwitch::initial(&profile),
        },
    };

    ModeOutput::new(&profile, switch).render(format.unwrap_or_default(), out)?;
    Ok(ExitCode::Success)
}
