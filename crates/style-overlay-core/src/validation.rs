//! Schema validation for profile drafts
//!
//! [`SchemaValidator::validate`] interprets a [`ProfileDraft`] field by field
//! and stops at the first offending field. [`SchemaValidator::audit`] runs the
//! same checks without stopping and reports every finding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::document::{render_fragment, Node};
use crate::error::ValidationError;
use crate::mode::Mode;
use crate::parser::{ProfileDraft, CORE_STYLE};
use crate::profile::{
    normalize_token, Cadence, CognitiveDriver, DialRange, FormattingSignal, HeatDial,
    LexiconBias, OutputShape, PolarityPair, StyleProfile,
};

/// Severity levels for validation findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Profile is unusable
    Error,
    /// Profile is usable but something was ignored
    Warning,
}

impl std::fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationSeverity::Error => write!(f, "error"),
            ValidationSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A single audit finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: ValidationSeverity,
    /// Stable code for this finding type
    pub code: String,
    /// Offending field path
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationFinding {
    /// Create an error finding
    pub fn error(
        code: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: ValidationSeverity::Error,
            code: code.into(),
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create a warning finding
    pub fn warning(
        code: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: ValidationSeverity::Warning,
            ..Self::error(code, field, message)
        }
    }

    /// Add a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    fn from_error(code: &str, err: ValidationError) -> Self {
        Self::error(code, err.field, err.reason)
    }
}

/// Outcome of [`SchemaValidator::audit`]
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// No error findings
    pub valid: bool,
    pub findings: Vec<ValidationFinding>,
    /// The validated profile when `valid`
    #[serde(skip)]
    pub profile: Option<StyleProfile>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings
            .iter()
            .filter(|f| f.severity == ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings
            .iter()
            .filter(|f| f.severity == ValidationSeverity::Warning)
    }
}

/// Validator settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Reject unknown top-level keys instead of ignoring them
    pub strict: bool,
}

/// Checks a draft against the profile schema
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    options: ValidationOptions,
}

type Check<T> = Result<T, ValidationError>;

impl SchemaValidator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Validator that rejects unknown keys
    pub fn strict() -> Self {
        Self::new(ValidationOptions { strict: true })
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// Validate a draft, failing on the first offending field
    ///
    /// Checks run in a fixed order: duplicate keys, the `core_style` shape,
    /// unknown keys (strict only), then each profile field from `id` to
    /// `heat_dial`.
    pub fn validate(&self, draft: &ProfileDraft) -> Result<StyleProfile, ValidationError> {
        if let Some(key) = draft.duplicate_keys().first() {
            return Err(ValidationError::new(*key, "duplicate key"));
        }
        check_core_style(draft)?;
        for key in draft.unknown_keys() {
            if self.options.strict {
                return Err(ValidationError::new(key, "unknown field"));
            }
            warn!(field = key, "ignoring unknown profile field");
        }

        let id = check_id(draft.field("id"))?;
        let origin = check_origin(draft.field("origin"))?;
        let polarity = check_polarity(draft.field("polarity_dual"))?;
        let output_preference = check_output_preference(draft.field("output_preference"))?;
        let (cadence, allow_revisions) = check_cadence(draft.field("cadence"))?;
        let modes = check_modes(draft.field("mode_switch"))?;
        let lexicon_bias = check_lexicon(draft.field("lexicon_bias"))?;
        let cognitive_drivers = check_drivers(draft.field("cognitive_drivers"))?;
        let formatting_signals = check_signals(draft.field("formatting_signals"))?;
        let ops_scope = check_ops_scope(draft.field("ops_scope"))?;
        let heat_dial = check_heat(draft.field("heat_dial"))?;
        let integration_note = opaque_note(draft.field("integration_note"));

        debug!(profile = %id, modes = modes.len(), heat = heat_dial.level, "profile validated");
        Ok(StyleProfile {
            id,
            origin,
            polarity,
            output_preference,
            cadence,
            allow_revisions,
            modes,
            lexicon_bias,
            cognitive_drivers,
            formatting_signals,
            ops_scope,
            heat_dial,
            integration_note,
        })
    }

    /// Run every check and collect all findings
    pub fn audit(&self, draft: &ProfileDraft) -> ValidationReport {
        let mut findings = Vec::new();

        for key in draft.duplicate_keys() {
            findings.push(
                ValidationFinding::error("E001", key, "duplicate key")
                    .with_suggestion("Keep a single entry for this field"),
            );
        }
        if let Err(err) = check_core_style(draft) {
            findings.push(ValidationFinding::from_error("E002", err));
        }
        for key in draft.unknown_keys() {
            let finding = if self.options.strict {
                ValidationFinding::error("E003", key, "unknown field")
            } else {
                ValidationFinding::warning("W001", key, "unknown field is ignored")
            };
            findings.push(finding.with_suggestion("Remove the field or check its spelling"));
        }

        let field_checks: [(&str, Check<()>); 11] = [
            ("E101", check_id(draft.field("id")).map(drop)),
            ("E102", check_origin(draft.field("origin")).map(drop)),
            ("E103", check_polarity(draft.field("polarity_dual")).map(drop)),
            ("E104", check_output_preference(draft.field("output_preference")).map(drop)),
            ("E105", check_cadence(draft.field("cadence")).map(drop)),
            ("E106", check_modes(draft.field("mode_switch")).map(drop)),
            ("E107", check_lexicon(draft.field("lexicon_bias")).map(drop)),
            ("E108", check_drivers(draft.field("cognitive_drivers")).map(drop)),
            ("E109", check_signals(draft.field("formatting_signals")).map(drop)),
            ("E110", check_ops_scope(draft.field("ops_scope")).map(drop)),
            ("E111", check_heat(draft.field("heat_dial")).map(drop)),
        ];
        for (code, outcome) in field_checks {
            if let Err(err) = outcome {
                findings.push(ValidationFinding::from_error(code, err));
            }
        }

        let valid = !findings
            .iter()
            .any(|f| f.severity == ValidationSeverity::Error);
        let profile = if valid { self.validate(draft).ok() } else { None };
        ValidationReport {
            valid,
            findings,
            profile,
        }
    }
}

fn check_core_style(draft: &ProfileDraft) -> Check<()> {
    match draft.field(CORE_STYLE) {
        Some(_) => Err(ValidationError::new(
            CORE_STYLE,
            "expected a mapping or a list of `key: value` entries",
        )),
        None => Ok(()),
    }
}

fn text<'a>(field: &str, node: &'a Node) -> Check<&'a str> {
    node.as_scalar().ok_or_else(|| {
        ValidationError::new(field, format!("expected text, found {}", node.kind()))
    })
}

/// Split a scalar (or each scalar of a sequence) into trimmed, non-empty tokens
fn tokens(field: &str, node: &Node, separators: &[char]) -> Check<Vec<String>> {
    let split = |s: &str| -> Vec<String> {
        s.split(|c: char| separators.contains(&c))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    };
    match node {
        Node::Scalar(s) => Ok(split(s)),
        Node::Seq(items) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(split(text(field, item)?));
            }
            Ok(out)
        }
        Node::Map(_) => Err(ValidationError::new(field, "expected text or a list, found mapping")),
    }
}

/// Entries of a mapping or a list of single-entry mappings
fn entries<'a>(field: &str, node: &'a Node) -> Check<Vec<(&'a str, &'a Node)>> {
    match node {
        Node::Map(entries) => Ok(entries.iter().map(|(k, v)| (k.as_str(), v)).collect()),
        Node::Scalar(s) if s.is_empty() => Ok(Vec::new()),
        Node::Seq(items) => {
            let mut out = Vec::new();
            for item in items {
                match item {
                    Node::Map(entries) => out.extend(entries.iter().map(|(k, v)| (k.as_str(), v))),
                    other => {
                        return Err(ValidationError::new(
                            field,
                            format!("expected `key: value` entries, found {}", other.kind()),
                        ))
                    }
                }
            }
            Ok(out)
        }
        Node::Scalar(_) => Err(ValidationError::new(
            field,
            "expected `key: value` entries, found text",
        )),
    }
}

/// Empty containers collapse to an empty scalar
fn normalize_free(node: &Node) -> Node {
    match node {
        Node::Seq(items) if items.is_empty() => Node::Scalar(String::new()),
        Node::Map(entries) if entries.is_empty() => Node::Scalar(String::new()),
        Node::Seq(items) => Node::Seq(items.iter().map(normalize_free).collect()),
        Node::Map(entries) => Node::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), normalize_free(v)))
                .collect(),
        ),
        Node::Scalar(s) => Node::Scalar(s.clone()),
    }
}

fn push_unique<T: PartialEq>(out: &mut Vec<T>, value: T) {
    if !out.contains(&value) {
        out.push(value);
    }
}

fn check_id(node: Option<&Node>) -> Check<String> {
    let node = node.ok_or_else(|| ValidationError::new("id", "required field is missing"))?;
    let id = text("id", node)?.trim();
    if id.is_empty() {
        return Err(ValidationError::new("id", "must not be empty"));
    }
    Ok(id.to_string())
}

fn check_origin(node: Option<&Node>) -> Check<Option<String>> {
    match node {
        None => Ok(None),
        Some(node) => {
            let origin = text("origin", node)?.trim();
            Ok((!origin.is_empty()).then(|| origin.to_string()))
        }
    }
}

const POLARITY_SEPARATORS: [&str; 4] = ["↔", "<->", "<>", " vs "];

fn check_polarity(node: Option<&Node>) -> Check<Option<PolarityPair>> {
    const FIELD: &str = "polarity_dual";
    let node = match node {
        None => return Ok(None),
        Some(node) => node,
    };
    let (left, right) = match node {
        Node::Seq(items) if items.len() == 2 => {
            (text(FIELD, &items[0])?.trim(), text(FIELD, &items[1])?.trim())
        }
        Node::Seq(items) => {
            return Err(ValidationError::new(
                FIELD,
                format!("expected two poles, found {}", items.len()),
            ))
        }
        other => {
            let s = text(FIELD, other)?;
            POLARITY_SEPARATORS
                .iter()
                .find_map(|sep| s.split_once(sep))
                .map(|(l, r)| (l.trim(), r.trim()))
                .ok_or_else(|| {
                    ValidationError::new(FIELD, "expected two poles separated by `↔`")
                })?
        }
    };
    if left.is_empty() || right.is_empty() {
        return Err(ValidationError::new(FIELD, "both poles must be named"));
    }
    for pole in [left, right] {
        if pole.contains('\n') || POLARITY_SEPARATORS.iter().any(|sep| pole.contains(sep)) {
            return Err(ValidationError::new(
                FIELD,
                format!("pole '{}' must be a single name without a separator", pole),
            ));
        }
    }
    Ok(Some(PolarityPair {
        left: left.to_string(),
        right: right.to_string(),
    }))
}

fn check_output_preference(node: Option<&Node>) -> Check<Vec<OutputShape>> {
    const FIELD: &str = "output_preference";
    let mut shapes = Vec::new();
    if let Some(node) = node {
        for token in tokens(FIELD, node, &['|', '+', ','])? {
            let shape = OutputShape::from_token(&token).ok_or_else(|| {
                let allowed: Vec<&str> = OutputShape::ALL.iter().map(OutputShape::token).collect();
                ValidationError::new(
                    FIELD,
                    format!("unknown output shape '{}' (allowed: {})", token, allowed.join(", ")),
                )
            })?;
            push_unique(&mut shapes, shape);
        }
    }
    Ok(shapes)
}

fn check_cadence(node: Option<&Node>) -> Check<(Cadence, bool)> {
    const FIELD: &str = "cadence";
    let mut cadence: Option<Cadence> = None;
    let mut allow_revisions = true;
    if let Some(node) = node {
        for token in tokens(FIELD, node, &[','])? {
            if normalize_token(&token) == Cadence::NO_REVISIONS {
                allow_revisions = false;
                continue;
            }
            let value = Cadence::from_token(&token).ok_or_else(|| {
                let allowed: Vec<&str> = Cadence::ALL.iter().map(Cadence::token).collect();
                ValidationError::new(
                    FIELD,
                    format!(
                        "unknown cadence '{}' (allowed: {}, modifier: {})",
                        token,
                        allowed.join(", "),
                        Cadence::NO_REVISIONS
                    ),
                )
            })?;
            match cadence {
                Some(existing) if existing != value => {
                    return Err(ValidationError::new(
                        FIELD,
                        format!("conflicting cadences '{}' and '{}'", existing, value),
                    ))
                }
                _ => cadence = Some(value),
            }
        }
    }
    Ok((cadence.unwrap_or_default(), allow_revisions))
}

fn check_modes(node: Option<&Node>) -> Check<Vec<Mode>> {
    const FIELD: &str = "mode_switch";
    let node = match node {
        None => return Ok(Mode::ALL.to_vec()),
        Some(node) => node,
    };
    let mut modes = Vec::new();
    for token in tokens(FIELD, node, &[','])? {
        push_unique(&mut modes, token.parse::<Mode>()?);
    }
    if modes.is_empty() {
        return Err(ValidationError::new(FIELD, "at least one mode must be enabled"));
    }
    Ok(modes)
}

fn check_lexicon(node: Option<&Node>) -> Check<LexiconBias> {
    const FIELD: &str = "lexicon_bias";
    let mut lexicon = LexiconBias::default();
    let node = match node {
        None => return Ok(lexicon),
        Some(node) => node,
    };

    let add_category = |name: &str, value: &Node, lexicon: &mut LexiconBias| -> Check<()> {
        let path = format!("{}.{}", FIELD, name);
        if lexicon.categories.contains_key(name) {
            return Err(ValidationError::new(path, "duplicate category"));
        }
        let terms = tokens(&path, value, &[','])?;
        lexicon.categories.insert(name.to_string(), terms);
        Ok(())
    };

    match node {
        Node::Scalar(_) => {
            for term in tokens(FIELD, node, &[','])? {
                push_unique(&mut lexicon.terms, term);
            }
        }
        Node::Map(entries) => {
            for (name, value) in entries {
                add_category(name, value, &mut lexicon)?;
            }
        }
        Node::Seq(items) => {
            for item in items {
                match item {
                    Node::Scalar(_) => {
                        for term in tokens(FIELD, item, &[','])? {
                            push_unique(&mut lexicon.terms, term);
                        }
                    }
                    Node::Map(entries) => {
                        for (name, value) in entries {
                            add_category(name, value, &mut lexicon)?;
                        }
                    }
                    Node::Seq(_) => {
                        return Err(ValidationError::new(FIELD, "nested lists are not supported"))
                    }
                }
            }
        }
    }
    Ok(lexicon)
}

fn check_drivers(node: Option<&Node>) -> Check<BTreeMap<CognitiveDriver, Node>> {
    const FIELD: &str = "cognitive_drivers";
    let mut drivers = BTreeMap::new();
    let node = match node {
        None => return Ok(drivers),
        Some(node) => node,
    };

    let bare = Node::Scalar(String::new());
    let pairs: Vec<(&str, &Node)> = match node {
        // bare driver names carry no note
        Node::Seq(items) if items.iter().any(|i| matches!(i, Node::Scalar(_))) => {
            let mut pairs = Vec::new();
            for item in items {
                match item {
                    Node::Scalar(name) => pairs.push((name.as_str(), &bare)),
                    other => pairs.extend(entries(FIELD, other)?),
                }
            }
            pairs
        }
        Node::Scalar(s) if !s.is_empty() => {
            return Err(ValidationError::new(FIELD, "expected `driver: note` entries, found text"))
        }
        other => entries(FIELD, other)?,
    };

    for (name, value) in pairs {
        let driver = CognitiveDriver::from_token(name).ok_or_else(|| {
            let allowed: Vec<&str> =
                CognitiveDriver::ALL.iter().map(CognitiveDriver::token).collect();
            ValidationError::new(
                FIELD,
                format!("unknown driver '{}' (allowed: {})", name, allowed.join(", ")),
            )
        })?;
        if drivers.insert(driver, normalize_free(value)).is_some() {
            return Err(ValidationError::new(format!("{}.{}", FIELD, driver), "duplicate driver"));
        }
    }
    Ok(drivers)
}

fn check_signals(node: Option<&Node>) -> Check<Vec<FormattingSignal>> {
    const FIELD: &str = "formatting_signals";
    let node = match node {
        None => return Ok(Vec::new()),
        Some(node) => node,
    };
    let items: Vec<String> = match node {
        Node::Scalar(s) if s.trim().is_empty() => Vec::new(),
        Node::Scalar(s) => vec![s.clone()],
        Node::Seq(items) => {
            let mut out = Vec::new();
            for item in items {
                match item {
                    Node::Scalar(s) => out.push(s.clone()),
                    // `- yaml: for configs` reads as `yaml for configs`
                    other => {
                        for (word, note) in entries(FIELD, other)? {
                            out.push(format!("{} {}", word, text(FIELD, note)?).trim().to_string());
                        }
                    }
                }
            }
            out
        }
        Node::Map(_) => return Err(ValidationError::new(FIELD, "expected a list of signals")),
    };

    let mut signals = Vec::new();
    for item in items {
        push_unique(&mut signals, parse_signal(&item)?);
    }
    Ok(signals)
}

fn parse_signal(item: &str) -> Check<FormattingSignal> {
    const FIELD: &str = "formatting_signals";
    let item = item.trim();
    if let Some(sections) = surgeon_sections(item)? {
        return Ok(FormattingSignal::SurgeonTemplate { sections });
    }

    let (word, rest) = match item.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (item, ""),
    };
    let note = (!rest.is_empty()).then(|| rest.to_string());

    if is_urgency_glyphs(word) {
        return Ok(FormattingSignal::UrgencyFlags {
            glyphs: word.to_string(),
            note,
        });
    }
    match normalize_token(word).as_str() {
        "urgency_flags" => Ok(FormattingSignal::UrgencyFlags {
            glyphs: FormattingSignal::DEFAULT_URGENCY_GLYPHS.to_string(),
            note,
        }),
        "tabular_trace_grids" | "trace_grids" => Ok(FormattingSignal::TraceGrids { note }),
        "yaml" | "yaml_blocks" => Ok(FormattingSignal::YamlBlocks { note }),
        "surgeon_template" => Ok(FormattingSignal::SurgeonTemplate {
            sections: FormattingSignal::DEFAULT_SURGEON_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }),
        _ => Err(ValidationError::new(
            FIELD,
            format!(
                "unknown formatting signal '{}' (expected urgency glyphs, {})",
                item, "tabular_trace_grids, yaml or a surgeon template"
            ),
        )),
    }
}

fn is_urgency_glyphs(word: &str) -> bool {
    word.chars().any(|c| c != '\u{FE0F}')
        && word
            .chars()
            .all(|c| matches!(c, '🔴' | '🟠' | '🟡' | '⚠' | '🟢' | '\u{FE0F}'))
}

/// `“A–B–C” surgeon template` → sections, `None` if the item has another shape
fn surgeon_sections(item: &str) -> Check<Option<Vec<String>>> {
    let (open, close) = match item.chars().next() {
        Some('“') => ('“', '”'),
        Some('"') => ('"', '"'),
        _ => return Ok(None),
    };
    let inner_start = open.len_utf8();
    let inner_len = match item[inner_start..].find(close) {
        Some(len) => len,
        None => return Ok(None),
    };
    let quoted = &item[inner_start..inner_start + inner_len];
    let trailer = normalize_token(&item[inner_start + inner_len + close.len_utf8()..]);
    if trailer != "surgeon template" && trailer != "surgeon_template" {
        return Ok(None);
    }

    let sections: Vec<String> = quoted
        .split(|c: char| matches!(c, '–' | '—' | '-' | '/'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if sections.is_empty() {
        return Err(ValidationError::new(
            "formatting_signals",
            "surgeon template must name at least one section",
        ));
    }
    Ok(Some(sections))
}

fn check_ops_scope(node: Option<&Node>) -> Check<BTreeMap<String, Node>> {
    const FIELD: &str = "ops_scope";
    let mut scope = BTreeMap::new();
    if let Some(node) = node {
        for (key, value) in entries(FIELD, node)? {
            if scope.insert(key.to_string(), normalize_free(value)).is_some() {
                return Err(ValidationError::new(format!("{}.{}", FIELD, key), "duplicate key"));
            }
        }
    }
    Ok(scope)
}

const RANGE_SEPARATOR: &str = r"(?:–|—|-|\.\.)";

fn level_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"^(\d+)\s*(?:\(\s*roast\s*:\s*(\d+)\s*{sep}\s*(\d+)\s*\))?$",
            sep = RANGE_SEPARATOR
        );
        Regex::new(&pattern).expect("heat level pattern is valid")
    })
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r"^(\d+)\s*{sep}\s*(\d+)$", sep = RANGE_SEPARATOR);
        Regex::new(&pattern).expect("heat range pattern is valid")
    })
}

fn dial_number(field: &str, digits: &str) -> Check<u8> {
    digits
        .parse::<u8>()
        .map_err(|_| ValidationError::new(field, format!("{} is out of range", digits)))
}

fn parse_range(field: &str, s: &str) -> Check<DialRange> {
    let caps = range_regex().captures(s.trim()).ok_or_else(|| {
        ValidationError::new(field, format!("expected a range like `1–5`, got '{}'", s.trim()))
    })?;
    let range = DialRange::new(dial_number(field, &caps[1])?, dial_number(field, &caps[2])?);
    if range.low > range.high {
        return Err(ValidationError::new(
            field,
            format!("range {} is reversed", range),
        ));
    }
    Ok(range)
}

fn parse_level(field: &str, s: &str) -> Check<(u8, Option<DialRange>)> {
    let caps = level_regex().captures(s.trim()).ok_or_else(|| {
        ValidationError::new(field, format!("expected an integer level, got '{}'", s.trim()))
    })?;
    let level = dial_number(field, &caps[1])
        .map_err(|_| ValidationError::new(field, format!("must be within 1–5, got {}", &caps[1])))?;
    let roast = match (caps.get(2), caps.get(3)) {
        (Some(low), Some(high)) => Some(parse_range(
            "heat_dial.roast",
            &format!("{}-{}", low.as_str(), high.as_str()),
        )?),
        _ => None,
    };
    Ok((level, roast))
}

fn check_heat(node: Option<&Node>) -> Check<HeatDial> {
    const FIELD: &str = "heat_dial";
    let mut dial = HeatDial::default();
    let node = match node {
        None => return Ok(dial),
        Some(node) => node,
    };

    match node {
        Node::Scalar(s) => {
            let (level, roast) = parse_level(FIELD, s)?;
            dial.level = level;
            dial.roast = roast;
        }
        other => {
            let mut seen: Vec<&str> = Vec::new();
            let mut claim = |setting: &'static str, path: &str| -> Check<()> {
                if seen.contains(&setting) {
                    return Err(ValidationError::new(path, "duplicate setting"));
                }
                seen.push(setting);
                Ok(())
            };
            for (key, value) in entries(FIELD, other)? {
                let path = format!("{}.{}", FIELD, key);
                let value = text(&path, value)?;
                match normalize_token(key).as_str() {
                    "scale" => {
                        claim("scale", &path)?;
                        dial.scale = parse_range(&path, value)?;
                    }
                    "default" | "level" => {
                        claim("default", &path)?;
                        let (level, roast) = parse_level(FIELD, value)?;
                        dial.level = level;
                        if let Some(roast) = roast {
                            claim("roast", "heat_dial.roast")?;
                            dial.roast = Some(roast);
                        }
                    }
                    "roast" => {
                        claim("roast", &path)?;
                        dial.roast = Some(parse_range(&path, value)?);
                    }
                    _ => {
                        return Err(ValidationError::new(
                            path,
                            "unknown heat_dial setting (expected scale, default or roast)",
                        ))
                    }
                }
            }
        }
    }

    if !HeatDial::BOUNDS.covers(&dial.scale) {
        return Err(ValidationError::new(
            "heat_dial.scale",
            format!("scale {} must lie within {}", dial.scale, HeatDial::BOUNDS),
        ));
    }
    if !HeatDial::BOUNDS.contains(dial.level) {
        return Err(ValidationError::new(
            FIELD,
            format!("must be within {}, got {}", HeatDial::BOUNDS, dial.level),
        ));
    }
    if !dial.scale.contains(dial.level) {
        return Err(ValidationError::new(
            FIELD,
            format!("level {} lies outside the declared scale {}", dial.level, dial.scale),
        ));
    }
    if let Some(roast) = dial.roast {
        if !dial.scale.covers(&roast) {
            return Err(ValidationError::new(
                "heat_dial.roast",
                format!("roast band {} must lie within the scale {}", roast, dial.scale),
            ));
        }
    }
    Ok(dial)
}

/// Advisory text is never interpreted; structured values keep their rendered form
fn opaque_note(node: Option<&Node>) -> Option<String> {
    let note = match node? {
        Node::Scalar(s) => s.trim().to_string(),
        other => render_fragment(&normalize_free(other)),
    };
    (!note.is_empty()).then_some(note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_profile;
    use crate::profile::SignalKind;

    fn validate(text: &str) -> Result<StyleProfile, ValidationError> {
        SchemaValidator::default().validate(&parse_profile(text).unwrap())
    }

    #[test]
    fn test_minimal_profile_defaults() {
        let profile = validate("id: minimal\n").unwrap();
        assert_eq!(profile.id(), "minimal");
        assert_eq!(profile.cadence(), Cadence::FinalResultOnly);
        assert!(profile.allows_revisions());
        assert_eq!(profile.modes(), &Mode::ALL);
        assert_eq!(profile.heat_dial(), HeatDial::default());
        assert!(profile.output_preference().is_empty());
        assert!(profile.integration_note().is_none());
    }

    #[test]
    fn test_missing_id() {
        let err = validate("origin: somewhere\n").unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.reason, "required field is missing");

        let err = validate("id: \"  \"\n").unwrap_err();
        assert_eq!(err.field, "id");
    }

    #[test]
    fn test_heat_dial_range() {
        for level in 1..=5 {
            let profile = validate(&format!("id: x\nheat_dial: {}\n", level)).unwrap();
            assert_eq!(profile.heat_dial().level, level);
        }
        for level in ["0", "6", "9", "300"] {
            let err = validate(&format!("id: x\nheat_dial: {}\n", level)).unwrap_err();
            assert_eq!(err.field, "heat_dial", "level {}", level);
        }
        let err = validate("id: x\nheat_dial: hot\n").unwrap_err();
        assert_eq!(err.field, "heat_dial");
    }

    #[test]
    fn test_heat_dial_sections() {
        let profile =
            validate("id: x\nheat_dial:\n  - scale: 1–5\n  - default: 3 (roast: 4–5)\n").unwrap();
        let dial = profile.heat_dial();
        assert_eq!(dial.level, 3);
        assert_eq!(dial.scale, DialRange::new(1, 5));
        assert_eq!(dial.roast, Some(DialRange::new(4, 5)));

        let profile = validate("id: x\nheat_dial:\n  scale: 2..4\n  level: 2\n  roast: 4-4\n")
            .unwrap();
        assert_eq!(profile.heat_dial().scale, DialRange::new(2, 4));
        assert_eq!(profile.heat_dial().roast, Some(DialRange::new(4, 4)));
    }

    #[test]
    fn test_heat_dial_scale_errors() {
        let err = validate("id: x\nheat_dial:\n  - scale: 1–7\n").unwrap_err();
        assert_eq!(err.field, "heat_dial.scale");

        let err = validate("id: x\nheat_dial:\n  - scale: 2–4\n  - default: 5\n").unwrap_err();
        assert_eq!(err.field, "heat_dial");

        let err = validate("id: x\nheat_dial:\n  - scale: 1–3\n  - default: 2 (roast: 3–5)\n")
            .unwrap_err();
        assert_eq!(err.field, "heat_dial.roast");

        let err = validate("id: x\nheat_dial:\n  - spice: 2\n").unwrap_err();
        assert_eq!(err.field, "heat_dial.spice");
    }

    #[test]
    fn test_heat_dial_duplicate_settings() {
        let err = validate("id: x\nheat_dial:\n  - scale: 1–5\n  - scale: 2–5\n").unwrap_err();
        assert_eq!(err.field, "heat_dial.scale");
        assert_eq!(err.reason, "duplicate setting");

        let err = validate("id: x\nheat_dial:\n  - default: 2\n  - level: 5\n").unwrap_err();
        assert_eq!(err.field, "heat_dial.level");
        assert_eq!(err.reason, "duplicate setting");

        let err = validate("id: x\nheat_dial:\n  - default: 3 (roast: 4–5)\n  - roast: 4–5\n")
            .unwrap_err();
        assert_eq!(err.field, "heat_dial.roast");
        assert_eq!(err.reason, "duplicate setting");
    }

    #[test]
    fn test_mode_switch_membership() {
        let profile = validate("id: x\nmode_switch: [SURGEON🔪, oracle]\n").unwrap();
        assert_eq!(profile.modes(), &[Mode::Surgeon, Mode::Oracle]);

        let err = validate("id: x\nmode_switch: [ORACLE, JESTER]\n").unwrap_err();
        assert_eq!(err.field, "mode_switch");

        let err = validate("id: x\nmode_switch: []\n").unwrap_err();
        assert_eq!(err.field, "mode_switch");
    }

    #[test]
    fn test_output_preference_tokens() {
        let profile =
            validate("id: x\noutput_preference: table+flags | yaml_configs | no-fluff | table\n")
                .unwrap();
        assert_eq!(
            profile.output_preference(),
            &[
                OutputShape::Table,
                OutputShape::Flags,
                OutputShape::YamlConfigs,
                OutputShape::NoFluff
            ]
        );
        let err = validate("id: x\noutput_preference: table | sonnet\n").unwrap_err();
        assert_eq!(err.field, "output_preference");
        assert!(err.reason.contains("sonnet"));
    }

    #[test]
    fn test_cadence_and_modifier() {
        let profile = validate("id: x\ncadence: final_result_only, no_revisions\n").unwrap();
        assert_eq!(profile.cadence(), Cadence::FinalResultOnly);
        assert!(!profile.allows_revisions());

        let profile = validate("id: x\ncadence: stepwise\n").unwrap();
        assert_eq!(profile.cadence(), Cadence::Stepwise);

        let err = validate("id: x\ncadence: stepwise, iterative\n").unwrap_err();
        assert!(err.reason.contains("conflicting"));
        let err = validate("id: x\ncadence: whenever\n").unwrap_err();
        assert_eq!(err.field, "cadence");
    }

    #[test]
    fn test_polarity_forms() {
        let profile = validate("id: x\npolarity_dual: FTU ↔ FTW\n").unwrap();
        let pair = profile.polarity().unwrap();
        assert_eq!((pair.left.as_str(), pair.right.as_str()), ("FTU", "FTW"));

        let profile = validate("id: x\npolarity_dual: [calm, storm]\n").unwrap();
        assert_eq!(profile.polarity().unwrap().right, "storm");

        let err = validate("id: x\npolarity_dual: just one\n").unwrap_err();
        assert_eq!(err.field, "polarity_dual");
        let err = validate("id: x\npolarity_dual: ↔ right\n").unwrap_err();
        assert_eq!(err.field, "polarity_dual");
        let err = validate("id: x\npolarity_dual: [a ↔ b, c]\n").unwrap_err();
        assert_eq!(err.field, "polarity_dual");
        let err = validate("id: x\npolarity_dual: [calm, storm vs gale]\n").unwrap_err();
        assert_eq!(err.field, "polarity_dual");
        let err = validate("id: x\npolarity_dual: a ↔ b <-> c\n").unwrap_err();
        assert_eq!(err.field, "polarity_dual");
    }

    #[test]
    fn test_lexicon_terms_and_categories() {
        let text = concat!(
            "id: x\nlexicon_bias:\n  - sentinel, ripple\n",
            "  - signal_hunger: timelines, thresholds\n",
        );
        let profile = validate(text).unwrap();
        let lexicon = profile.lexicon_bias();
        assert_eq!(lexicon.terms, vec!["sentinel", "ripple"]);
        assert_eq!(
            lexicon.categories.get("signal_hunger"),
            Some(&vec!["timelines".to_string(), "thresholds".to_string()])
        );

        let err = validate("id: x\nlexicon_bias:\n  - a: x\n  - a: y\n").unwrap_err();
        assert_eq!(err.field, "lexicon_bias.a");
    }

    #[test]
    fn test_cognitive_drivers() {
        let text =
            "id: x\ncognitive_drivers:\n  - aesthetic: sentinel-mythic + ops-sharp\n  - safety\n";
        let profile = validate(text).unwrap();
        let drivers = profile.cognitive_drivers();
        assert_eq!(
            drivers.get(&CognitiveDriver::Aesthetic),
            Some(&Node::scalar("sentinel-mythic + ops-sharp"))
        );
        assert_eq!(drivers.get(&CognitiveDriver::Safety), Some(&Node::scalar("")));

        let err = validate("id: x\ncognitive_drivers:\n  - whimsy: high\n").unwrap_err();
        assert_eq!(err.field, "cognitive_drivers");
        let err = validate("id: x\ncognitive_drivers:\n  - safety: a\n  - safety: b\n")
            .unwrap_err();
        assert_eq!(err.field, "cognitive_drivers.safety");
    }

    #[test]
    fn test_formatting_signals() {
        let text = concat!(
            "id: x\nformatting_signals:\n  - 🔴⚠️🟢 flags for urgency\n",
            "  - tabular_trace_grids for events\n  - yaml for configs/rituals\n",
            "  - “Cut–Keep–Kill–KeyAct” surgeon template\n",
        );
        let profile = validate(text).unwrap();
        let kinds: Vec<SignalKind> =
            profile.formatting_signals().iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SignalKind::UrgencyFlags,
                SignalKind::TraceGrids,
                SignalKind::YamlBlocks,
                SignalKind::SurgeonTemplate
            ]
        );
        assert_eq!(
            profile.formatting_signals()[3],
            FormattingSignal::SurgeonTemplate {
                sections: vec!["Cut".into(), "Keep".into(), "Kill".into(), "KeyAct".into()]
            }
        );
        assert_eq!(profile.formatting_signals()[1].note(), Some("for events"));

        let err = validate("id: x\nformatting_signals:\n  - sparkles everywhere\n").unwrap_err();
        assert_eq!(err.field, "formatting_signals");
        let err = validate("id: x\nformatting_signals:\n  - “” surgeon template\n").unwrap_err();
        assert_eq!(err.field, "formatting_signals");
    }

    #[test]
    fn test_signal_aliases() {
        let text = concat!(
            "id: x\nformatting_signals:\n  - urgency_flags\n  - surgeon_template\n",
            "  - yaml: for configs\n",
        );
        let profile = validate(text).unwrap();
        let signals = profile.formatting_signals();
        assert_eq!(
            signals[0],
            FormattingSignal::UrgencyFlags {
                glyphs: FormattingSignal::DEFAULT_URGENCY_GLYPHS.to_string(),
                note: None
            }
        );
        assert_eq!(signals[1].kind(), SignalKind::SurgeonTemplate);
        assert_eq!(signals[2].note(), Some("for configs"));
    }

    #[test]
    fn test_ops_scope_free_form() {
        let text = concat!(
            "id: x\nops_scope:\n  - granularity: beat_level\n  - ritual_ops:\n      - a\n",
            "      - b\n",
        );
        let profile = validate(text).unwrap();
        assert_eq!(
            profile.ops_scope().get("ritual_ops"),
            Some(&Node::Seq(vec![Node::scalar("a"), Node::scalar("b")]))
        );

        let err = validate("id: x\nops_scope:\n  - a: 1\n  - a: 2\n").unwrap_err();
        assert_eq!(err.field, "ops_scope.a");
        let err = validate("id: x\nops_scope:\n  - loose\n").unwrap_err();
        assert_eq!(err.field, "ops_scope");
    }

    #[test]
    fn test_integration_note_is_opaque() {
        let text = "id: x\nintegration_note: >\n  Apply as an overlay,\n  not as data.\n";
        let profile = validate(text).unwrap();
        assert_eq!(profile.integration_note(), Some("Apply as an overlay, not as data."));

        let profile = validate("id: x\nintegration_note:\n  heat_dial: 99\n").unwrap();
        assert_eq!(profile.integration_note(), Some("heat_dial: 99"));
    }

    #[test]
    fn test_first_offending_field_wins() {
        let err = validate("id: x\nmode_switch: [JESTER]\nheat_dial: 9\n").unwrap_err();
        assert_eq!(err.field, "mode_switch");
    }

    #[test]
    fn test_core_style_checked_between_duplicates_and_unknown_keys() {
        let draft = parse_profile("core_style: loud\nmood: sunny\nheat_dial: 9\n").unwrap();
        let err = SchemaValidator::strict().validate(&draft).unwrap_err();
        assert_eq!(err.field, "core_style");

        let err = validate("id: x\nid: y\ncore_style: loud\n").unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.reason, "duplicate key");
    }

    #[test]
    fn test_duplicate_and_unknown_keys() {
        let err = validate("id: x\nid: y\n").unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.reason, "duplicate key");

        let draft = parse_profile("id: x\nmood: sunny\n").unwrap();
        assert!(SchemaValidator::default().validate(&draft).is_ok());
        let err = SchemaValidator::strict().validate(&draft).unwrap_err();
        assert_eq!(err.field, "mood");
    }

    #[test]
    fn test_malformed_core_style() {
        let err = validate("id: x\ncore_style: loud\n").unwrap_err();
        assert_eq!(err.field, "core_style");
    }

    #[test]
    fn test_audit_collects_all_findings() {
        let draft = parse_profile("mode_switch: [JESTER]\nheat_dial: 9\nmood: sunny\n").unwrap();
        let report = SchemaValidator::default().audit(&draft);
        assert!(!report.valid);
        assert!(report.profile.is_none());
        let codes: Vec<&str> = report.findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["W001", "E101", "E106", "E111"]);
        assert_eq!(report.errors().count(), 3);
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_audit_valid_profile() {
        let draft = parse_profile("id: x\nheat_dial: 4\n").unwrap();
        let report = SchemaValidator::strict().audit(&draft);
        assert!(report.valid);
        assert!(report.findings.is_empty());
        assert_eq!(report.profile.unwrap().heat_dial().level, 4);
    }
}
