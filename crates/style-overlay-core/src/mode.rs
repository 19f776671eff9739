//! Response modes and mode selection
//!
//! There are no transitions between modes: a caller picks one of the modes a
//! profile enables and hands it to the renderer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::profile::StyleProfile;

/// Closed set of response modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    #[default]
    Oracle,
    Operator,
    Surgeon,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Oracle, Mode::Operator, Mode::Surgeon];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Oracle => "ORACLE",
            Mode::Operator => "OPERATOR",
            Mode::Surgeon => "SURGEON",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Mode::Oracle => "✶",
            Mode::Operator => "⚙️",
            Mode::Surgeon => "🔪",
        }
    }

    /// Name followed by its glyph, as written in `mode_switch`
    pub fn decorated(&self) -> String {
        format!("{}{}", self.name(), self.glyph())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    /// Case-insensitive; decorations such as `✶` or `🔪` are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect::<String>()
            .to_ascii_uppercase();
        Mode::ALL
            .into_iter()
            .find(|m| m.name() == bare)
            .ok_or_else(|| {
                ValidationError::new(
                    "mode_switch",
                    format!("unknown mode '{}' (expected ORACLE, OPERATOR or SURGEON)", s.trim()),
                )
            })
    }
}

/// The mode a caller selected for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeSwitch {
    selected: Mode,
}

impl ModeSwitch {
    /// Select a mode the profile enables
    pub fn select(profile: &StyleProfile, mode: Mode) -> Result<Self, ValidationError> {
        if profile.modes().contains(&mode) {
            Ok(Self { selected: mode })
        } else {
            let enabled: Vec<&str> = profile.modes().iter().map(Mode::name).collect();
            Err(ValidationError::new(
                "mode_switch",
                format!(
                    "mode {} is not enabled by profile '{}' (enabled: {})",
                    mode,
                    profile.id(),
                    enabled.join(", ")
                ),
            ))
        }
    }

    /// First mode the profile enables
    pub fn initial(profile: &StyleProfile) -> Self {
        Self {
            selected: profile.modes().first().copied().unwrap_or_default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.selected
    }
}
