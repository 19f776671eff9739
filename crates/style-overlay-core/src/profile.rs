//! Validated style profile model
//!
//! A [`StyleProfile`] is only produced by the schema validator, so holding one
//! means every invariant (heat dial range, closed enum sets) already holds.
//! Profiles are immutable after construction and can be shared between threads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::document::{render_document, Node};
use crate::error::{OverlayError, ValidationError};
use crate::mode::Mode;
use crate::parser::parse_profile;
use crate::validation::SchemaValidator;

/// Output shapes a renderer may be biased towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// Tabular layout
    Table,
    /// Urgency flags next to items
    Flags,
    /// YAML blocks for configuration-like content
    YamlConfigs,
    /// No filler prose
    NoFluff,
    /// Bullet lists
    Bullets,
    /// Plain paragraphs
    Prose,
}

impl OutputShape {
    /// All shapes in declaration order
    pub const ALL: [OutputShape; 6] = [
        OutputShape::Table,
        OutputShape::Flags,
        OutputShape::YamlConfigs,
        OutputShape::NoFluff,
        OutputShape::Bullets,
        OutputShape::Prose,
    ];

    /// Canonical token
    pub fn token(&self) -> &'static str {
        match self {
            OutputShape::Table => "table",
            OutputShape::Flags => "flags",
            OutputShape::YamlConfigs => "yaml_configs",
            OutputShape::NoFluff => "no_fluff",
            OutputShape::Bullets => "bullets",
            OutputShape::Prose => "prose",
        }
    }

    /// Match a written token (case-insensitive, `-` equals `_`)
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = normalize_token(token);
        Self::ALL.into_iter().find(|s| s.token() == normalized)
    }
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Response cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Deliver only the final result
    #[default]
    FinalResultOnly,
    /// Show intermediate steps
    Stepwise,
    /// Converge over several passes
    Iterative,
}

impl Cadence {
    /// All cadences in declaration order
    pub const ALL: [Cadence; 3] = [Cadence::FinalResultOnly, Cadence::Stepwise, Cadence::Iterative];

    /// Modifier token that forbids revisions
    pub const NO_REVISIONS: &'static str = "no_revisions";

    /// Canonical token
    pub fn token(&self) -> &'static str {
        match self {
            Cadence::FinalResultOnly => "final_result_only",
            Cadence::Stepwise => "stepwise",
            Cadence::Iterative => "iterative",
        }
    }

    /// Match a written token (case-insensitive, `-` equals `_`)
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = normalize_token(token);
        Self::ALL.into_iter().find(|c| c.token() == normalized)
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Named reasoning drivers a profile may annotate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveDriver {
    DualLayerReasoning,
    Aesthetic,
    Tolerance,
    Safety,
}

impl CognitiveDriver {
    pub const ALL: [CognitiveDriver; 4] = [
        CognitiveDriver::DualLayerReasoning,
        CognitiveDriver::Aesthetic,
        CognitiveDriver::Tolerance,
        CognitiveDriver::Safety,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            CognitiveDriver::DualLayerReasoning => "dual_layer_reasoning",
            CognitiveDriver::Aesthetic => "aesthetic",
            CognitiveDriver::Tolerance => "tolerance",
            CognitiveDriver::Safety => "safety",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = normalize_token(token);
        Self::ALL.into_iter().find(|d| d.token() == normalized)
    }
}

impl fmt::Display for CognitiveDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Discriminant of a [`FormattingSignal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    UrgencyFlags,
    TraceGrids,
    YamlBlocks,
    SurgeonTemplate,
}

/// Formatting signal a renderer should honour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormattingSignal {
    /// Coloured urgency markers, ordered critical → warning → ok
    UrgencyFlags {
        glyphs: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Tabular trace grids for event timelines
    TraceGrids {
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// YAML blocks for configs
    YamlBlocks {
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Named section template (e.g. Cut–Keep–Kill–KeyAct)
    SurgeonTemplate { sections: Vec<String> },
}

impl FormattingSignal {
    /// Glyphs used when `urgency_flags` is written without explicit glyphs
    pub const DEFAULT_URGENCY_GLYPHS: &'static str = "🔴⚠️🟢";

    /// Sections used when `surgeon_template` is written without a quoted list
    pub const DEFAULT_SURGEON_SECTIONS: [&'static str; 4] = ["Cut", "Keep", "Kill", "KeyAct"];

    pub fn kind(&self) -> SignalKind {
        match self {
            FormattingSignal::UrgencyFlags { .. } => SignalKind::UrgencyFlags,
            FormattingSignal::TraceGrids { .. } => SignalKind::TraceGrids,
            FormattingSignal::YamlBlocks { .. } => SignalKind::YamlBlocks,
            FormattingSignal::SurgeonTemplate { .. } => SignalKind::SurgeonTemplate,
        }
    }

    /// Free text following the signal word
    pub fn note(&self) -> Option<&str> {
        match self {
            FormattingSignal::UrgencyFlags { note, .. }
            | FormattingSignal::TraceGrids { note }
            | FormattingSignal::YamlBlocks { note } => note.as_deref(),
            FormattingSignal::SurgeonTemplate { .. } => None,
        }
    }

    /// Document form of the signal
    pub fn to_text(&self) -> String {
        let with_note = |word: &str| match self.note() {
            Some(note) => format!("{} {}", word, note),
            None => word.to_string(),
        };
        match self {
            FormattingSignal::UrgencyFlags { glyphs, .. } => with_note(glyphs),
            FormattingSignal::TraceGrids { .. } => with_note("tabular_trace_grids"),
            FormattingSignal::YamlBlocks { .. } => with_note("yaml"),
            FormattingSignal::SurgeonTemplate { sections } => {
                format!("“{}” surgeon template", sections.join("–"))
            }
        }
    }

    /// Urgency glyphs split into markers (variation selectors stay attached)
    pub fn urgency_markers(&self) -> Vec<&str> {
        let glyphs = match self {
            FormattingSignal::UrgencyFlags { glyphs, .. } => glyphs.as_str(),
            _ => return Vec::new(),
        };
        let mut markers = Vec::new();
        let mut start = None;
        for (idx, ch) in glyphs.char_indices() {
            if ch == '\u{FE0F}' {
                continue;
            }
            if let Some(s) = start {
                markers.push(&glyphs[s..idx]);
            }
            start = Some(idx);
        }
        if let Some(s) = start {
            markers.push(&glyphs[s..]);
        }
        markers
    }
}

/// Two labelled poles of a profile (e.g. `FTU ↔ FTW`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolarityPair {
    pub left: String,
    pub right: String,
}

impl fmt::Display for PolarityPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ↔ {}", self.left, self.right)
    }
}

/// Vocabulary the renderer should lean towards
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LexiconBias {
    /// Uncategorised terms in document order
    pub terms: Vec<String>,
    /// Named term groups
    pub categories: BTreeMap<String, Vec<String>>,
}

impl LexiconBias {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.categories.is_empty()
    }

    /// Every term, uncategorised first
    pub fn all_terms(&self) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .chain(self.categories.values().flatten())
            .map(String::as_str)
    }
}

/// Inclusive integer range on the heat dial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialRange {
    pub low: u8,
    pub high: u8,
}

impl DialRange {
    pub const fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: u8) -> bool {
        self.low <= value && value <= self.high
    }

    /// Whether `other` lies entirely inside this range
    pub fn covers(&self, other: &DialRange) -> bool {
        self.contains(other.low) && self.contains(other.high)
    }
}

impl fmt::Display for DialRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.low, self.high)
    }
}

/// Intensity setting, 1 (mild) to 5 (maximum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatDial {
    pub level: u8,
    pub scale: DialRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roast: Option<DialRange>,
}

impl HeatDial {
    /// Outer bounds every dial must respect
    pub const BOUNDS: DialRange = DialRange::new(1, 5);

    pub const DEFAULT_LEVEL: u8 = 3;
}

impl Default for HeatDial {
    fn default() -> Self {
        Self {
            level: Self::DEFAULT_LEVEL,
            scale: Self::BOUNDS,
            roast: None,
        }
    }
}

/// Validated, immutable style overlay profile
///
/// Deserializing re-renders the record as overlay text and runs it through
/// the schema validator, so invalid records never become profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProfileRecord")]
pub struct StyleProfile {
    pub(crate) id: String,
    pub(crate) origin: Option<String>,
    pub(crate) polarity: Option<PolarityPair>,
    pub(crate) output_preference: Vec<OutputShape>,
    pub(crate) cadence: Cadence,
    pub(crate) allow_revisions: bool,
    pub(crate) modes: Vec<Mode>,
    pub(crate) lexicon_bias: LexiconBias,
    pub(crate) cognitive_drivers: BTreeMap<CognitiveDriver, Node>,
    pub(crate) formatting_signals: Vec<FormattingSignal>,
    pub(crate) ops_scope: BTreeMap<String, Node>,
    pub(crate) heat_dial: HeatDial,
    pub(crate) integration_note: Option<String>,
}

impl StyleProfile {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn polarity(&self) -> Option<&PolarityPair> {
        self.polarity.as_ref()
    }

    pub fn output_preference(&self) -> &[OutputShape] {
        &self.output_preference
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn allows_revisions(&self) -> bool {
        self.allow_revisions
    }

    /// Modes enabled by `mode_switch`, never empty
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn lexicon_bias(&self) -> &LexiconBias {
        &self.lexicon_bias
    }

    pub fn cognitive_drivers(&self) -> &BTreeMap<CognitiveDriver, Node> {
        &self.cognitive_drivers
    }

    pub fn formatting_signals(&self) -> &[FormattingSignal] {
        &self.formatting_signals
    }

    pub fn ops_scope(&self) -> &BTreeMap<String, Node> {
        &self.ops_scope
    }

    pub fn heat_dial(&self) -> HeatDial {
        self.heat_dial
    }

    /// Advisory text; opaque and never interpreted
    pub fn integration_note(&self) -> Option<&str> {
        self.integration_note.as_deref()
    }

    /// Serialize back into canonical overlay text
    ///
    /// Parsing and validating the result yields an equal profile.
    pub fn to_document(&self) -> String {
        let mut root: Vec<(String, Node)> = vec![("id".into(), Node::scalar(&self.id))];
        if let Some(origin) = &self.origin {
            root.push(("origin".into(), Node::scalar(origin)));
        }

        let mut core = Vec::new();
        if let Some(polarity) = &self.polarity {
            core.push(item("polarity_dual", Node::scalar(polarity.to_string())));
        }
        if !self.output_preference.is_empty() {
            let tokens: Vec<&str> = self.output_preference.iter().map(OutputShape::token).collect();
            core.push(item("output_preference", Node::scalar(tokens.join(" | "))));
        }
        let mut cadence = self.cadence.token().to_string();
        if !self.allow_revisions {
            cadence.push_str(", ");
            cadence.push_str(Cadence::NO_REVISIONS);
        }
        core.push(item("cadence", Node::scalar(cadence)));
        core.push(item(
            "mode_switch",
            Node::Seq(self.modes.iter().map(|m| Node::scalar(m.decorated())).collect()),
        ));
        root.push(("core_style".into(), Node::Seq(core)));

        if !self.lexicon_bias.is_empty() {
            let mut items = Vec::new();
            if !self.lexicon_bias.terms.is_empty() {
                items.push(Node::scalar(self.lexicon_bias.terms.join(", ")));
            }
            for (name, terms) in &self.lexicon_bias.categories {
                items.push(item(name, Node::scalar(terms.join(", "))));
            }
            root.push(("lexicon_bias".into(), Node::Seq(items)));
        }

        if !self.cognitive_drivers.is_empty() {
            let items = self
                .cognitive_drivers
                .iter()
                .map(|(driver, value)| item(driver.token(), value.clone()))
                .collect();
            root.push(("cognitive_drivers".into(), Node::Seq(items)));
        }

        if !self.formatting_signals.is_empty() {
            let items = self
                .formatting_signals
                .iter()
                .map(|s| Node::scalar(s.to_text()))
                .collect();
            root.push(("formatting_signals".into(), Node::Seq(items)));
        }

        if !self.ops_scope.is_empty() {
            let items = self
                .ops_scope
                .iter()
                .map(|(key, value)| item(key, value.clone()))
                .collect();
            root.push(("ops_scope".into(), Node::Seq(items)));
        }

        let dial = &self.heat_dial;
        let level = match dial.roast {
            Some(roast) => format!("{} (roast: {})", dial.level, roast),
            None => dial.level.to_string(),
        };
        root.push((
            "heat_dial".into(),
            Node::Seq(vec![
                item("scale", Node::scalar(dial.scale.to_string())),
                item("default", Node::scalar(level)),
            ]),
        ));

        let mut out = render_document(&Node::Map(root));
        if let Some(note) = &self.integration_note {
            if note.contains('\n') {
                out.push_str(&render_document(&Node::Map(vec![(
                    "integration_note".into(),
                    Node::scalar(note),
                )])));
            } else {
                out.push_str("integration_note: >\n  ");
                out.push_str(note);
                out.push('\n');
            }
        }
        out
    }
}

/// Unchecked field set a serialized profile is read into
#[derive(Deserialize)]
struct ProfileRecord {
    id: String,
    origin: Option<String>,
    polarity: Option<PolarityPair>,
    output_preference: Vec<OutputShape>,
    cadence: Cadence,
    allow_revisions: bool,
    modes: Vec<Mode>,
    lexicon_bias: LexiconBias,
    cognitive_drivers: BTreeMap<CognitiveDriver, Node>,
    formatting_signals: Vec<FormattingSignal>,
    ops_scope: BTreeMap<String, Node>,
    heat_dial: HeatDial,
    integration_note: Option<String>,
}

impl TryFrom<ProfileRecord> for StyleProfile {
    type Error = OverlayError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        let candidate = StyleProfile {
            id: record.id,
            origin: record.origin,
            polarity: record.polarity,
            output_preference: record.output_preference,
            cadence: record.cadence,
            allow_revisions: record.allow_revisions,
            modes: record.modes,
            lexicon_bias: record.lexicon_bias,
            cognitive_drivers: record.cognitive_drivers,
            formatting_signals: record.formatting_signals,
            ops_scope: record.ops_scope,
            heat_dial: record.heat_dial,
            integration_note: record.integration_note,
        };
        let draft = parse_profile(&candidate.to_document())?;
        let profile = SchemaValidator::default().validate(&draft)?;
        if profile != candidate {
            return Err(ValidationError::new("profile", "record is not in canonical form").into());
        }
        Ok(profile)
    }
}

fn item(key: &str, value: Node) -> Node {
    Node::Map(vec![(key.to_string(), value)])
}

/// Lower-case and map `-` to `_`
pub(crate) fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase().replace('-', "_")
}
