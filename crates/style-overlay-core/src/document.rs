//! Overlay document tree, parser and renderer
//!
//! Overlay documents use a small indentation-based key/value dialect that
//! looks like YAML but tolerates the free text persona cards are written in
//! (`default: 3 (roast: 4–5)`, curly quotes, emoji, `a | b` inside values).
//!
//! ```text
//! id: friend_the_user
//! core_style:
//!   - mode_switch: [ORACLE✶, OPERATOR⚙️, SURGEON🔪]
//! integration_note: >
//!   Apply as an overlay style module.
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ParseError;

/// A node of an overlay document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Node {
    /// Plain text value
    Scalar(String),
    /// Ordered list of nodes
    Seq(Vec<Node>),
    /// Ordered key/value entries (duplicates are preserved)
    Map(Vec<(String, Node)>),
}

impl Node {
    /// Create a scalar node
    pub fn scalar(text: impl Into<String>) -> Self {
        Node::Scalar(text.into())
    }

    /// Scalar text, if this is a scalar
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Look up the first entry with the given key in a mapping
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Short type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "text",
            Node::Seq(_) => "sequence",
            Node::Map(_) => "mapping",
        }
    }

    /// Convert a JSON value (also produced by the YAML and TOML loaders)
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Node::Scalar(String::new()),
            Value::Bool(b) => Node::Scalar(b.to_string()),
            Value::Number(n) => Node::Scalar(n.to_string()),
            Value::String(s) => Node::Scalar(s),
            Value::Array(items) => Node::Seq(items.into_iter().map(Node::from_json).collect()),
            Value::Object(map) => Node::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Node::from_json(v)))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone)]
struct Line {
    number: usize,
    indent: usize,
    text: String,
    blank: bool,
}

fn item_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("item key pattern is valid")
    })
}

/// Parse overlay text into a document tree whose root is a mapping
pub fn parse_document(text: &str) -> Result<Node, ParseError> {
    let mut lines = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let content = raw.trim_end();
        let trimmed = content.trim_start();
        let blank = trimmed.is_empty() || trimmed.starts_with('#');
        let leading = &content[..content.len() - trimmed.len()];
        if !blank && leading.contains('\t') {
            return Err(ParseError::at(number, "tab character in indentation"));
        }
        lines.push(Line {
            number,
            indent: leading.chars().count(),
            text: content.to_string(),
            blank,
        });
    }

    let mut parser = Parser { lines, pos: 0 };
    parser.skip_blank();
    let first = match parser.peek() {
        Some(line) => line.clone(),
        None => return Err(ParseError::new("empty document")),
    };
    if first.indent != 0 {
        return Err(ParseError::at(
            first.number,
            "bad indentation: document must start at column 0",
        ));
    }
    if is_seq_item(first.body()) {
        return Err(ParseError::at(first.number, "document root must be a mapping"));
    }

    let root = parser.parse_block(0)?;
    parser.skip_blank();
    if let Some(line) = parser.peek() {
        return Err(ParseError::at(line.number, "bad indentation"));
    }
    Ok(root)
}

impl Line {
    fn body(&self) -> &str {
        self.text.trim_start()
    }
}

fn is_seq_item(body: &str) -> bool {
    body == "-" || body.starts_with("- ")
}

struct Parser {
    lines: Vec<Line>,
    pos: usize,
}

impl Parser {
    fn skip_blank(&mut self) {
        while self.pos < self.lines.len() && self.lines[self.pos].blank {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    /// Indent of the next structural line, if any
    fn next_indent(&mut self) -> Option<usize> {
        self.skip_blank();
        self.peek().map(|l| l.indent)
    }

    fn parse_block(&mut self, indent: usize) -> Result<Node, ParseError> {
        self.skip_blank();
        let is_seq = match self.peek() {
            Some(line) => is_seq_item(line.body()),
            None => return Ok(Node::Scalar(String::new())),
        };
        if is_seq {
            self.parse_seq(indent, false)
        } else {
            self.parse_map(indent)
        }
    }

    fn parse_map(&mut self, indent: usize) -> Result<Node, ParseError> {
        let mut entries = Vec::new();
        loop {
            let line = match self.next_indent() {
                Some(i) if i == indent => self.lines[self.pos].clone(),
                Some(i) if i > indent => {
                    let number = self.lines[self.pos].number;
                    return Err(ParseError::at(number, "unexpected indentation"));
                }
                _ => break,
            };
            let body = line.body();
            if is_seq_item(body) {
                return Err(ParseError::at(
                    line.number,
                    "sequence item inside a mapping block",
                ));
            }
            let (key, rest) = split_entry(body)
                .ok_or_else(|| ParseError::at(line.number, "missing colon after key"))?;
            self.pos += 1;
            let value = self.parse_entry_value(&line, rest)?;
            entries.push((key.to_string(), value));
        }
        Ok(Node::Map(entries))
    }

    /// Sequence items at `indent`; an indentless sequence stops at the next sibling entry
    fn parse_seq(&mut self, indent: usize, indentless: bool) -> Result<Node, ParseError> {
        let mut items = Vec::new();
        loop {
            let line = match self.next_indent() {
                Some(i) if i == indent => self.lines[self.pos].clone(),
                Some(i) if i > indent => {
                    let number = self.lines[self.pos].number;
                    return Err(ParseError::at(number, "unexpected indentation"));
                }
                _ => break,
            };
            let body = line.body();
            if !is_seq_item(body) {
                if indentless {
                    break;
                }
                return Err(ParseError::at(
                    line.number,
                    "mapping entry inside a sequence block",
                ));
            }
            let item = body[1..].trim();

            if item.is_empty() {
                self.pos += 1;
                items.push(self.parse_nested(indent)?);
            } else if let Some(folded) = block_indicator(item) {
                self.pos += 1;
                items.push(Node::Scalar(self.block_scalar(indent, folded)));
            } else if !is_quoted(item) && opens_item_map(item) {
                // `- key: value` continues as a mapping two columns right of the dash
                let content_indent = indent + 2;
                self.lines[self.pos] = Line {
                    number: line.number,
                    indent: content_indent,
                    text: format!("{}{}", " ".repeat(content_indent), item),
                    blank: false,
                };
                items.push(self.parse_map(content_indent)?);
            } else {
                self.pos += 1;
                items.push(parse_inline(item, line.number)?);
                self.reject_deeper(indent, line.number)?;
            }
        }
        Ok(Node::Seq(items))
    }

    fn parse_entry_value(&mut self, line: &Line, rest: &str) -> Result<Node, ParseError> {
        if rest.is_empty() {
            let indentless = self.next_indent() == Some(line.indent)
                && self.peek().map_or(false, |next| is_seq_item(next.body()));
            if indentless {
                return self.parse_seq(line.indent, true);
            }
            return self.parse_nested(line.indent);
        }
        match block_indicator(rest) {
            Some(folded) => Ok(Node::Scalar(self.block_scalar(line.indent, folded))),
            None => {
                let node = parse_inline(rest, line.number)?;
                self.reject_deeper(line.indent, line.number)?;
                Ok(node)
            }
        }
    }

    /// Child block of an entry or bare dash, or an empty scalar if there is none
    fn parse_nested(&mut self, parent_indent: usize) -> Result<Node, ParseError> {
        match self.next_indent() {
            Some(i) if i > parent_indent => self.parse_block(i),
            _ => Ok(Node::Scalar(String::new())),
        }
    }

    fn reject_deeper(&mut self, indent: usize, number: usize) -> Result<(), ParseError> {
        match self.next_indent() {
            Some(i) if i > indent => Err(ParseError::at(
                self.lines[self.pos].number,
                format!("unexpected indentation after inline value on line {}", number),
            )),
            _ => Ok(()),
        }
    }

    fn block_scalar(&mut self, parent_indent: usize, folded: bool) -> String {
        let mut body: Vec<&Line> = Vec::new();
        let start = self.pos;
        while let Some(line) = self.lines.get(self.pos) {
            let empty = line.text.trim().is_empty();
            if !empty && line.indent <= parent_indent {
                break;
            }
            self.pos += 1;
        }
        body.extend(self.lines[start..self.pos].iter());
        while body.last().map_or(false, |l| l.text.trim().is_empty()) {
            body.pop();
        }

        let margin = body
            .iter()
            .filter(|l| !l.text.trim().is_empty())
            .map(|l| l.indent)
            .min()
            .unwrap_or(0);
        let texts: Vec<String> = body
            .iter()
            .map(|l| {
                if l.text.trim().is_empty() {
                    String::new()
                } else {
                    l.text.chars().skip(margin).collect()
                }
            })
            .collect();

        if !folded {
            return texts.join("\n");
        }

        let mut out = String::new();
        let mut pending_space = false;
        for text in texts {
            if text.is_empty() {
                out.push('\n');
                pending_space = false;
            } else {
                if pending_space {
                    out.push(' ');
                }
                out.push_str(text.trim());
                pending_space = true;
            }
        }
        out
    }
}

/// Split `key: value` at the first colon followed by whitespace or end of line
fn split_entry(body: &str) -> Option<(&str, &str)> {
    let bytes = body.as_bytes();
    for (idx, ch) in body.char_indices() {
        if ch != ':' {
            continue;
        }
        let next = bytes.get(idx + 1).copied();
        if next.is_none() || next == Some(b' ') {
            let key = body[..idx].trim();
            if key.is_empty() {
                return None;
            }
            return Some((key, body[idx + 1..].trim()));
        }
    }
    None
}

/// `Some(true)` for folded (`>`), `Some(false)` for literal (`|`) block scalars
fn block_indicator(text: &str) -> Option<bool> {
    match text {
        ">" | ">-" | ">+" => Some(true),
        "|" | "|-" | "|+" => Some(false),
        _ => None,
    }
}

fn opens_item_map(item: &str) -> bool {
    split_entry(item).map_or(false, |(key, _)| item_key_regex().is_match(key))
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

fn parse_inline(text: &str, number: usize) -> Result<Node, ParseError> {
    if is_quoted(text) {
        return Ok(Node::Scalar(text[1..text.len() - 1].to_string()));
    }
    if let Some(inner) = text.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| ParseError::at(number, "unterminated flow sequence"))?;
        let items = inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if is_quoted(s) {
                    Node::Scalar(s[1..s.len() - 1].to_string())
                } else {
                    Node::scalar(s)
                }
            })
            .collect();
        return Ok(Node::Seq(items));
    }
    Ok(Node::scalar(text))
}

/// Render a mapping node back into overlay text
///
/// Non-mapping roots are rendered under a synthetic `value` key.
pub fn render_document(root: &Node) -> String {
    let mut out = String::new();
    match root {
        Node::Map(entries) => {
            for (key, value) in entries {
                render_entry(&mut out, 0, key, value);
            }
        }
        other => render_entry(&mut out, 0, "value", other),
    }
    out
}

/// Render any node as standalone text (scalars verbatim)
pub(crate) fn render_fragment(node: &Node) -> String {
    match node {
        Node::Scalar(s) => s.clone(),
        Node::Seq(_) => {
            let mut out = String::new();
            render_seq_items(&mut out, 0, node);
            out.trim_end().to_string()
        }
        Node::Map(_) => render_document(node).trim_end().to_string(),
    }
}

fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

fn render_entry(out: &mut String, indent: usize, key: &str, value: &Node) {
    match value {
        Node::Scalar(s) if s.contains('\n') => {
            let _ = writeln!(out, "{}{}: |", pad(indent), key);
            write_block_lines(out, indent + 2, s);
        }
        Node::Scalar(s) if s.is_empty() => {
            let _ = writeln!(out, "{}{}:", pad(indent), key);
        }
        Node::Scalar(s) => {
            let _ = writeln!(out, "{}{}: {}", pad(indent), key, quote_value(s));
        }
        Node::Seq(items) if items.is_empty() => {
            let _ = writeln!(out, "{}{}: []", pad(indent), key);
        }
        Node::Seq(items) if fits_flow(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Node::as_scalar).collect();
            let _ = writeln!(out, "{}{}: [{}]", pad(indent), key, parts.join(", "));
        }
        Node::Seq(_) => {
            let _ = writeln!(out, "{}{}:", pad(indent), key);
            render_seq_items(out, indent + 2, value);
        }
        Node::Map(entries) if entries.is_empty() => {
            let _ = writeln!(out, "{}{}:", pad(indent), key);
        }
        Node::Map(entries) => {
            let _ = writeln!(out, "{}{}:", pad(indent), key);
            for (k, v) in entries {
                render_entry(out, indent + 2, k, v);
            }
        }
    }
}

fn write_block_lines(out: &mut String, indent: usize, text: &str) {
    for line in text.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "{}{}", pad(indent), line);
        }
    }
}

fn render_seq_items(out: &mut String, indent: usize, seq: &Node) {
    let items = match seq {
        Node::Seq(items) => items,
        _ => return,
    };
    for item in items {
        match item {
            Node::Scalar(s) if s.contains('\n') => {
                let _ = writeln!(out, "{}- |", pad(indent));
                write_block_lines(out, indent + 2, s);
            }
            Node::Scalar(s) => {
                let _ = writeln!(out, "{}- {}", pad(indent), quote_item(s));
            }
            Node::Map(entries) if !entries.is_empty() && item_keys_inline(entries) => {
                let mut nested = String::new();
                for (k, v) in entries {
                    render_entry(&mut nested, indent + 2, k, v);
                }
                // the first entry shares its line with the dash
                let dash = format!("{}- ", pad(indent));
                out.push_str(&dash);
                out.push_str(&nested[indent + 2..]);
            }
            other => {
                let _ = writeln!(out, "{}-", pad(indent));
                match other {
                    Node::Map(entries) => {
                        for (k, v) in entries {
                            render_entry(out, indent + 2, k, v);
                        }
                    }
                    _ => render_seq_items(out, indent + 2, other),
                }
            }
        }
    }
}

fn item_keys_inline(entries: &[(String, Node)]) -> bool {
    entries.iter().all(|(k, _)| item_key_regex().is_match(k))
}

fn fits_flow(items: &[Node]) -> bool {
    items.iter().all(|item| match item {
        Node::Scalar(s) => {
            !s.is_empty()
                && !s.contains(',')
                && !s.contains(']')
                && !s.contains('\n')
                && !s.starts_with('"')
                && s.trim() == s
        }
        _ => false,
    })
}

fn needs_quotes(s: &str) -> bool {
    s.starts_with('[')
        || s.starts_with('"')
        || s.starts_with('#')
        || s.trim() != s
        || matches!(s, ">" | ">-" | ">+" | "|" | "|-" | "|+")
}

fn quote_value(s: &str) -> String {
    if needs_quotes(s) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

fn quote_item(s: &str) -> String {
    if needs_quotes(s) || s == "-" || s.starts_with("- ") || s.is_empty() || opens_item_map(s) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}
