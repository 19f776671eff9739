//! Profile parsing
//!
//! Turns source text into a [`ProfileDraft`]: the document's profile fields,
//! still uninterpreted. Fields may sit at the top level or inside a
//! `core_style` section; both are flattened here so the validator sees a
//! single list of entries in document order.

use std::path::Path;

use tracing::debug;

use crate::document::{parse_document, Node};
use crate::error::ParseError;

/// Field names understood by the validator, in validation order
pub const PROFILE_FIELDS: [&str; 12] = [
    "id",
    "origin",
    "polarity_dual",
    "output_preference",
    "cadence",
    "mode_switch",
    "lexicon_bias",
    "cognitive_drivers",
    "formatting_signals",
    "ops_scope",
    "heat_dial",
    "integration_note",
];

/// Section that may group the core style fields
pub const CORE_STYLE: &str = "core_style";

/// Source formats a profile can be loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// Indentation-based overlay dialect
    #[default]
    Overlay,
    Yaml,
    Json,
    Toml,
}

impl SourceFormat {
    /// Pick a format from the file extension; unknown extensions use the overlay dialect
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => SourceFormat::Yaml,
            "json" => SourceFormat::Json,
            "toml" => SourceFormat::Toml,
            _ => SourceFormat::Overlay,
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overlay" | "text" => Ok(SourceFormat::Overlay),
            "yaml" | "yml" => Ok(SourceFormat::Yaml),
            "json" => Ok(SourceFormat::Json),
            "toml" => Ok(SourceFormat::Toml),
            other => Err(format!("Unknown source format: {}", other)),
        }
    }
}

/// A parsed but not yet validated profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    entries: Vec<(String, Node)>,
}

impl ProfileDraft {
    /// Build a draft from a document root
    pub fn from_node(root: Node) -> Result<Self, ParseError> {
        let top = match root {
            Node::Map(entries) => entries,
            other => {
                return Err(ParseError::new(format!(
                    "document root must be a mapping, found {}",
                    other.kind()
                )))
            }
        };

        let mut entries = Vec::with_capacity(top.len());
        for (key, value) in top {
            if key == CORE_STYLE {
                match flatten_section(value) {
                    Ok(fields) => entries.extend(fields),
                    // kept whole so the validator can report it
                    Err(raw) => entries.push((key, raw)),
                }
            } else {
                entries.push((key, value));
            }
        }
        Ok(Self { entries })
    }

    /// First value written for a field
    pub fn field(&self, name: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// All entries in document order
    pub fn entries(&self) -> &[(String, Node)] {
        &self.entries
    }

    /// Keys written more than once, in order of their second occurrence
    pub fn duplicate_keys(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let mut dups = Vec::new();
        for (key, _) in &self.entries {
            if seen.contains(&key.as_str()) {
                if !dups.contains(&key.as_str()) {
                    dups.push(key.as_str());
                }
            } else {
                seen.push(key);
            }
        }
        dups
    }

    /// Keys the validator does not know about
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(|k| !PROFILE_FIELDS.contains(k) && *k != CORE_STYLE)
            .collect()
    }
}

/// Entries of a `core_style` mapping or list of single-entry mappings
fn flatten_section(value: Node) -> Result<Vec<(String, Node)>, Node> {
    match value {
        Node::Map(entries) => Ok(entries),
        Node::Scalar(s) if s.is_empty() => Ok(Vec::new()),
        Node::Seq(items) => {
            if !items.iter().all(|item| matches!(item, Node::Map(_))) {
                return Err(Node::Seq(items));
            }
            Ok(items
                .into_iter()
                .flat_map(|item| match item {
                    Node::Map(entries) => entries,
                    _ => Vec::new(),
                })
                .collect())
        }
        other => Err(other),
    }
}

/// Parse overlay dialect text into a draft
pub fn parse_profile(text: &str) -> Result<ProfileDraft, ParseError> {
    parse_source(text, SourceFormat::Overlay)
}

/// Parse text in the given source format into a draft
pub fn parse_source(text: &str, format: SourceFormat) -> Result<ProfileDraft, ParseError> {
    let root = match format {
        SourceFormat::Overlay => parse_document(text)?,
        SourceFormat::Yaml => Node::from_json(serde_yaml::from_str::<serde_json::Value>(text)?),
        SourceFormat::Json => Node::from_json(serde_json::from_str::<serde_json::Value>(text)?),
        SourceFormat::Toml => {
            let value: toml::Value = toml::from_str(text)?;
            let json = serde_json::to_value(value)
                .map_err(|e| ParseError::new(format!("TOML conversion error: {}", e)))?;
            Node::from_json(json)
        }
    };
    let draft = ProfileDraft::from_node(root)?;
    debug!(?format, fields = draft.entries.len(), "parsed profile draft");
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_core_style_is_flattened() {
        let text =
            "id: x\ncore_style:\n  - cadence: stepwise\n  - mode_switch: [ORACLE]\nheat_dial: 2\n";
        let draft = parse_profile(text).unwrap();
        let keys: Vec<&str> = draft.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "cadence", "mode_switch", "heat_dial"]);
        assert_eq!(draft.field("cadence"), Some(&Node::scalar("stepwise")));
    }

    #[test]
    fn test_core_style_mapping_form() {
        let draft = parse_profile("id: x\ncore_style:\n  cadence: iterative\n").unwrap();
        assert_eq!(draft.field("cadence"), Some(&Node::scalar("iterative")));
    }

    #[test]
    fn test_malformed_core_style_is_kept() {
        let draft = parse_profile("id: x\ncore_style:\n  - loose text\n").unwrap();
        assert!(draft.field(CORE_STYLE).is_some());
        assert!(draft.unknown_keys().is_empty());
    }

    #[test]
    fn test_duplicate_and_unknown_keys() {
        let text = "id: x\ncadence: stepwise\ncore_style:\n  - cadence: iterative\nmood: sunny\n";
        let draft = parse_profile(text).unwrap();
        assert_eq!(draft.duplicate_keys(), vec!["cadence"]);
        assert_eq!(draft.unknown_keys(), vec!["mood"]);
        assert_eq!(draft.field("cadence"), Some(&Node::scalar("stepwise")));
    }

    #[test]
    fn test_source_format_from_path() {
        assert_eq!(SourceFormat::from_path(&PathBuf::from("p.yaml")), SourceFormat::Yaml);
        assert_eq!(SourceFormat::from_path(&PathBuf::from("p.YML")), SourceFormat::Yaml);
        assert_eq!(SourceFormat::from_path(&PathBuf::from("p.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(&PathBuf::from("p.toml")), SourceFormat::Toml);
        assert_eq!(SourceFormat::from_path(&PathBuf::from("p.overlay")), SourceFormat::Overlay);
        assert_eq!(SourceFormat::from_path(&PathBuf::from("profile")), SourceFormat::Overlay);
    }

    #[test]
    fn test_parse_json_and_toml_sources() {
        let json = r#"{"id": "x", "heat_dial": 4, "mode_switch": ["ORACLE"]}"#;
        let draft = parse_source(json, SourceFormat::Json).unwrap();
        assert_eq!(draft.field("heat_dial"), Some(&Node::scalar("4")));

        let toml = "id = \"x\"\nheat_dial = 4\n";
        let draft = parse_source(toml, SourceFormat::Toml).unwrap();
        assert_eq!(draft.field("heat_dial"), Some(&Node::scalar("4")));
    }

    #[test]
    fn test_non_mapping_sources_rejected() {
        assert!(parse_source("[1, 2]", SourceFormat::Json).is_err());
        assert!(parse_source("- a\n- b\n", SourceFormat::Yaml).is_err());
        assert!(parse_source("{ not json", SourceFormat::Json).is_err());
    }
}
