//! Read-only rendering hints derived from a validated profile

use serde::Serialize;
use std::fmt;

use crate::mode::{Mode, ModeSwitch};
use crate::profile::{
    Cadence, FormattingSignal, HeatDial, OutputShape, SignalKind, StyleProfile,
};

/// Urgency levels addressed by urgency flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Critical,
    Warning,
    Ok,
}

impl Urgency {
    fn position(self) -> usize {
        match self {
            Urgency::Critical => 0,
            Urgency::Warning => 1,
            Urgency::Ok => 2,
        }
    }
}

/// Named heat level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Mild = 1,
    Gentle = 2,
    Medium = 3,
    Hot = 4,
    Maximum = 5,
}

impl Intensity {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Intensity::Mild),
            2 => Some(Intensity::Gentle),
            3 => Some(Intensity::Medium),
            4 => Some(Intensity::Hot),
            5 => Some(Intensity::Maximum),
            _ => None,
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intensity::Mild => "mild",
            Intensity::Gentle => "gentle",
            Intensity::Medium => "medium",
            Intensity::Hot => "hot",
            Intensity::Maximum => "maximum",
        };
        f.write_str(name)
    }
}

/// Borrowed view of the rendering-relevant parts of a [`StyleProfile`]
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormatterBias<'a> {
    profile_id: &'a str,
    output_preference: &'a [OutputShape],
    cadence: Cadence,
    allow_revisions: bool,
    formatting_signals: &'a [FormattingSignal],
    heat_dial: HeatDial,
    modes: &'a [Mode],
}

impl<'a> FormatterBias<'a> {
    pub fn from_profile(profile: &'a StyleProfile) -> Self {
        Self {
            profile_id: profile.id(),
            output_preference: profile.output_preference(),
            cadence: profile.cadence(),
            allow_revisions: profile.allows_revisions(),
            formatting_signals: profile.formatting_signals(),
            heat_dial: profile.heat_dial(),
            modes: profile.modes(),
        }
    }

    pub fn profile_id(&self) -> &'a str {
        self.profile_id
    }

    pub fn output_preference(&self) -> &'a [OutputShape] {
        self.output_preference
    }

    /// Highest-priority output shape
    pub fn preferred_shape(&self) -> Option<OutputShape> {
        self.output_preference.first().copied()
    }

    pub fn prefers(&self, shape: OutputShape) -> bool {
        self.output_preference.contains(&shape)
    }

    pub fn allows_fluff(&self) -> bool {
        !self.prefers(OutputShape::NoFluff)
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn allows_revisions(&self) -> bool {
        self.allow_revisions
    }

    pub fn signals(&self) -> &'a [FormattingSignal] {
        self.formatting_signals
    }

    pub fn signal(&self, kind: SignalKind) -> Option<&'a FormattingSignal> {
        self.formatting_signals.iter().find(|s| s.kind() == kind)
    }

    pub fn has_signal(&self, kind: SignalKind) -> bool {
        self.signal(kind).is_some()
    }

    /// Glyph for an urgency level, if urgency flags are enabled
    pub fn urgency_marker(&self, urgency: Urgency) -> Option<&'a str> {
        self.signal(SignalKind::UrgencyFlags)?
            .urgency_markers()
            .get(urgency.position())
            .copied()
    }

    pub fn heat_dial(&self) -> HeatDial {
        self.heat_dial
    }

    pub fn heat_level(&self) -> u8 {
        self.heat_dial.level
    }

    pub fn intensity(&self) -> Intensity {
        // levels are validated into 1..=5
        Intensity::from_level(self.heat_dial.level).unwrap_or(Intensity::Medium)
    }

    /// Whether the default level falls inside the roast band
    pub fn is_roast(&self) -> bool {
        self.heat_dial
            .roast
            .map_or(false, |band| band.contains(self.heat_dial.level))
    }

    pub fn modes(&self) -> &'a [Mode] {
        self.modes
    }

    /// Surgeon template sections, only while SURGEON is selected
    pub fn template_for(&self, switch: ModeSwitch) -> Option<&'a [String]> {
        if switch.mode() != Mode::Surgeon {
            return None;
        }
        match self.signal(SignalKind::SurgeonTemplate)? {
            FormattingSignal::SurgeonTemplate { sections } => Some(sections.as_slice()),
            _ => None,
        }
    }
}

impl StyleProfile {
    /// Rendering hints for this profile
    pub fn formatter_bias(&self) -> FormatterBias<'_> {
        FormatterBias::from_profile(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_profile;
    use crate::validation::SchemaValidator;

    fn profile(text: &str) -> StyleProfile {
        SchemaValidator::default()
            .validate(&parse_profile(text).unwrap())
            .unwrap()
    }

    const FULL: &str = "id: x
output_preference: table+flags | no-fluff
cadence: final_result_only, no_revisions
mode_switch: [ORACLE, SURGEON]
formatting_signals:
  - 🔴⚠️🟢 flags for urgency
  - “Cut–Keep–Kill” surgeon template
heat_dial:
  - scale: 1–5
  - default: 4 (roast: 4–5)
";

    #[test]
    fn test_shape_hints() {
        let p = profile(FULL);
        let bias = p.formatter_bias();
        assert_eq!(bias.preferred_shape(), Some(OutputShape::Table));
        assert!(bias.prefers(OutputShape::Flags));
        assert!(!bias.prefers(OutputShape::Prose));
        assert!(!bias.allows_fluff());
        assert_eq!(bias.profile_id(), "x");
    }

    #[test]
    fn test_cadence_defaults() {
        let p = profile("id: x\n");
        let bias = p.formatter_bias();
        assert_eq!(bias.cadence(), Cadence::FinalResultOnly);
        assert!(bias.allows_revisions());
        assert!(bias.allows_fluff());
        assert_eq!(bias.preferred_shape(), None);
        assert_eq!(bias.heat_level(), 3);
        assert_eq!(bias.intensity(), Intensity::Medium);
        assert!(!bias.is_roast());
    }

    #[test]
    fn test_urgency_markers() {
        let p = profile(FULL);
        let bias = p.formatter_bias();
        assert_eq!(bias.urgency_marker(Urgency::Critical), Some("🔴"));
        assert_eq!(bias.urgency_marker(Urgency::Warning), Some("⚠️"));
        assert_eq!(bias.urgency_marker(Urgency::Ok), Some("🟢"));

        let plain = profile("id: x\n");
        assert_eq!(plain.formatter_bias().urgency_marker(Urgency::Critical), None);
    }

    #[test]
    fn test_heat_and_roast() {
        let p = profile(FULL);
        let bias = p.formatter_bias();
        assert_eq!(bias.heat_level(), 4);
        assert_eq!(bias.intensity(), Intensity::Hot);
        assert!(bias.is_roast());
        assert!(!bias.allows_revisions());
    }

    #[test]
    fn test_template_only_for_surgeon() {
        let p = profile(FULL);
        let bias = p.formatter_bias();
        let surgeon = ModeSwitch::select(&p, Mode::Surgeon).unwrap();
        let oracle = ModeSwitch::select(&p, Mode::Oracle).unwrap();
        assert_eq!(
            bias.template_for(surgeon),
            Some(&["Cut".to_string(), "Keep".to_string(), "Kill".to_string()][..])
        );
        assert_eq!(bias.template_for(oracle), None);

        let without = profile("id: x\nmode_switch: [SURGEON]\n");
        let switch = ModeSwitch::initial(&without);
        assert_eq!(without.formatter_bias().template_for(switch), None);
    }

    #[test]
    fn test_view_serializes() {
        let p = profile(FULL);
        let json = serde_json::to_value(p.formatter_bias()).unwrap();
        assert_eq!(json["cadence"], "final_result_only");
        assert_eq!(json["heat_dial"]["level"], 4);
        assert_eq!(json["modes"][1], "SURGEON");
        assert_eq!(json["output_preference"][2], "no_fluff");
    }
}
