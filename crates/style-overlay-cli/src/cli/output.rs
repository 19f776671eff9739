//! Output formatting for the style overlay CLI
//!
//! Results render as JSON, YAML or a coloured table. Table output uses
//! severity-based colouring for findings.

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use style_overlay_core::{
    FormatterBias, Mode, ModeSwitch, OverlayError, StyleProfile, ValidationFinding,
    ValidationReport,
};

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// Render a serializable result as JSON or YAML
pub fn write_structured<T: Serialize>(
    value: &T,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), OverlayError> {
    let text = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| OverlayError::SerializationError(e.to_string()))?,
        _ => serde_json::to_string_pretty(value)
            .map_err(|e| OverlayError::SerializationError(e.to_string()))?,
    };
    writeln!(out, "{}", text.trim_end())?;
    Ok(())
}

fn heading(out: &mut dyn Write, title: &str) {
    writeln!(out).ok();
    writeln!(out, "{}", title.cyan().bold()).ok();
    writeln!(out, "{}", "=".repeat(60)).ok();
}

fn row(out: &mut dyn Write, label: &str, value: impl std::fmt::Display) {
    writeln!(out, "  {:<18} {}", format!("{}:", label).dimmed(), value).ok();
}

/// Audit output for `validate`
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    pub error_count: usize,
    pub warning_count: usize,
    pub findings: Vec<FindingOutput>,
    pub summary: String,
}

/// Individual finding output structure
#[derive(Debug, Clone, Serialize)]
pub struct FindingOutput {
    pub severity: String,
    pub code: String,
    /// Field path the finding refers to
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ReportOutput {
    pub fn from_report(report: &ValidationReport) -> Self {
        let error_count = report.errors().count();
        let warning_count = report.warnings().count();

        let summary = if report.valid && warning_count == 0 {
            "Profile is valid".to_string()
        } else if report.valid {
            format!("Profile is valid with {} warning(s)", warning_count)
        } else {
            format!(
                "Profile has {} error(s) and {} warning(s)",
                error_count, warning_count
            )
        };

        Self {
            valid: report.valid,
            profile_id: report.profile.as_ref().map(|p| p.id().to_string()),
            error_count,
            warning_count,
            findings: report.findings.iter().map(FindingOutput::from_finding).collect(),
            summary,
        }
    }

    pub fn render(&self, format: OutputFormat, out: &mut dyn Write) -> Result<(), OverlayError> {
        match format {
            OutputFormat::Table => {
                self.render_table(out);
                Ok(())
            }
            other => write_structured(self, other, out),
        }
    }

    fn render_table(&self, out: &mut dyn Write) {
        heading(out, "Validation Results");
        writeln!(out).ok();

        let status = if self.valid { "+".green() } else { "x".red() };
        writeln!(out, "{} {}", status, self.summary).ok();
        if let Some(id) = &self.profile_id {
            row(out, "Profile", id.bold());
        }

        if !self.findings.is_empty() {
            writeln!(out).ok();
            writeln!(out, "{}", "Findings:".cyan().bold()).ok();
            writeln!(out, "{}", "-".repeat(60)).ok();
            for finding in &self.findings {
                finding.render_table_row(out);
            }
        }
        out.flush().ok();
    }
}

impl FindingOutput {
    pub fn from_finding(finding: &ValidationFinding) -> Self {
        Self {
            severity: finding.severity.to_string(),
            code: finding.code.clone(),
            field: finding.field.clone(),
            message: finding.message.clone(),
            suggestion: finding.suggestion.clone(),
        }
    }

    fn render_table_row(&self, out: &mut dyn Write) {
        let (icon, label) = match self.severity.as_str() {
            "error" => ("x".red(), "ERROR".red().bold()),
            "warning" => ("!".yellow(), "WARNING".yellow().bold()),
            _ => ("-".white(), self.severity.clone().white()),
        };

        writeln!(out).ok();
        writeln!(out, "{} [{}] {} {}", icon, self.code.dimmed(), label, self.message).ok();
        writeln!(out, "  {} {}", "Field:".dimmed(), self.field.cyan()).ok();
        if let Some(suggestion) = &self.suggestion {
            writeln!(out, "  {} {}", "Fix:".dimmed(), suggestion.green()).ok();
        }
    }
}

/// Formatter view output for `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct BiasOutput {
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_shape: Option<String>,
    pub output_preference: Vec<String>,
    pub allows_fluff: bool,
    pub cadence: String,
    pub allows_revisions: bool,
    pub signals: Vec<String>,
    pub heat_level: u8,
    pub intensity: String,
    pub roast: bool,
    pub modes: Vec<Mode>,
}

impl BiasOutput {
    pub fn from_bias(bias: &FormatterBias<'_>) -> Self {
        Self {
            profile_id: bias.profile_id().to_string(),
            preferred_shape: bias.preferred_shape().map(|s| s.to_string()),
            output_preference: bias.output_preference().iter().map(|s| s.to_string()).collect(),
            allows_fluff: bias.allows_fluff(),
            cadence: bias.cadence().to_string(),
            allows_revisions: bias.allows_revisions(),
            signals: bias.signals().iter().map(|s| s.to_text()).collect(),
            heat_level: bias.heat_level(),
            intensity: bias.intensity().to_string(),
            roast: bias.is_roast(),
            modes: bias.modes().to_vec(),
        }
    }

    pub fn render(&self, format: OutputFormat, out: &mut dyn Write) -> Result<(), OverlayError> {
        if format != OutputFormat::Table {
            return write_structured(self, format, out);
        }

        heading(out, &format!("Formatter Bias: {}", self.profile_id));
        let shapes = if self.output_preference.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            self.output_preference.join(" | ")
        };
        row(out, "Output", shapes);
        row(out, "Fluff", yes_no(self.allows_fluff));
        row(out, "Cadence", &self.cadence);
        row(out, "Revisions", yes_no(self.allows_revisions));
        let heat = format!("{} ({})", self.heat_level, self.intensity);
        row(out, "Heat", if self.roast { heat.red().bold() } else { heat.normal() });
        let modes: Vec<String> = self.modes.iter().map(Mode::decorated).collect();
        row(out, "Modes", modes.join(", "));
        if !self.signals.is_empty() {
            writeln!(out, "  {}", "Signals:".dimmed()).ok();
            for signal in &self.signals {
                writeln!(out, "    - {}", signal).ok();
            }
        }
        out.flush().ok();
        Ok(())
    }
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value {
        "yes".green()
    } else {
        "no".yellow()
    }
}

/// Selected mode output for `mode`
#[derive(Debug, Clone, Serialize)]
pub struct ModeOutput {
    pub mode: Mode,
    pub glyph: String,
    pub enabled: Vec<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Vec<String>>,
}

impl ModeOutput {
    pub fn new(profile: &StyleProfile, switch: ModeSwitch) -> Self {
        let mode = switch.mode();
        Self {
            mode,
            glyph: mode.glyph().to_string(),
            enabled: profile.modes().to_vec(),
            template: profile
                .formatter_bias()
                .template_for(switch)
                .map(|sections| sections.to_vec()),
        }
    }

    pub fn render(&self, format: OutputFormat, out: &mut dyn Write) -> Result<(), OverlayError> {
        if format != OutputFormat::Table {
            return write_structured(self, format, out);
        }

        writeln!(out, "{} {}", self.glyph, self.mode.to_string().bold())?;
        let enabled: Vec<&str> = self.enabled.iter().map(Mode::name).collect();
        row(out, "Enabled", enabled.join(", "));
        if let Some(template) = &self.template {
            row(out, "Template", template.join(" – "));
        }
        out.flush().ok();
        Ok(())
    }
}
