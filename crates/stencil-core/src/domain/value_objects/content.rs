//! Content value objects: template text and schema documents.
//!
//! Both types derive something from their raw payload at construction time
//! (placeholder names for templates, `$ref` targets for schemas) and never
//! change afterwards.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::DomainError;

/// `{name}`: identifier-shaped only, so JSON objects and stray braces in
/// prose are not mistaken for placeholders.
static SINGLE_BRACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("single-brace pattern is valid")
});

/// `{{name}}`
static DOUBLE_BRACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("double-brace pattern is valid")
});

/// Either placeholder form; the doubled form wins where both could match.
pub(crate) static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("placeholder pattern is valid")
});

// ── Metadata ──────────────────────────────────────────────────────────────────

/// Line-ending style detected in template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    Lf,
    Crlf,
    Mixed,
    /// Single-line content.
    None,
}

impl LineEnding {
    pub fn detect(text: &str) -> Self {
        let crlf = text.matches("\r\n").count();
        let lf = text.matches('\n').count() - crlf;
        match (lf, crlf) {
            (0, 0) => Self::None,
            (_, 0) => Self::Lf,
            (0, _) => Self::Crlf,
            _ => Self::Mixed,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "lf",
            Self::Crlf => "crlf",
            Self::Mixed => "mixed",
            Self::None => "none",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive facts about a piece of template text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    pub encoding: String,
    pub language: Option<String>,
    pub line_ending: LineEnding,
    pub size: usize,
    pub last_modified: DateTime<Utc>,
}

// ── TemplateContent ───────────────────────────────────────────────────────────

/// Raw template text plus the placeholder names it requires.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateContent {
    text: String,
    variables: Vec<String>,
    metadata: ContentMetadata,
}

impl TemplateContent {
    /// Wrap template text, extracting its placeholders.
    ///
    /// Placeholder extraction runs a single-brace and a double-brace pass and
    /// unions the names. Because the single-brace pass only accepts
    /// identifier names, `{{x}}` contributes exactly `x` (the inner `{x}` hit
    /// deduplicates with the double-brace hit).
    ///
    /// # Errors
    ///
    /// - `EmptyContent` for an empty string
    /// - `MalformedVariableSyntax` if a `{{` is never followed by `}}`
    pub fn create(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.is_empty() {
            return Err(DomainError::EmptyContent);
        }

        check_double_braces(&text)?;

        let mut names = BTreeSet::new();
        for pattern in [&*SINGLE_BRACE, &*DOUBLE_BRACE] {
            for caps in pattern.captures_iter(&text) {
                names.insert(caps[1].to_string());
            }
        }

        let metadata = ContentMetadata {
            encoding: "utf-8".into(),
            language: None,
            line_ending: LineEnding::detect(&text),
            size: text.len(),
            last_modified: Utc::now(),
        };

        Ok(Self {
            text,
            variables: names.into_iter().collect(),
            metadata,
        })
    }

    /// Tag the content with a natural-language code (e.g. `"en"`, `"ja"`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.metadata.language = Some(language.into());
        self
    }

    /// Override the last-modified timestamp (e.g. from file mtime).
    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.metadata.last_modified = at;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names, sorted and deduplicated.
    pub fn required_variables(&self) -> &[String] {
        &self.variables
    }

    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    pub fn metadata(&self) -> &ContentMetadata {
        &self.metadata
    }
}

impl fmt::Display for TemplateContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Every `{{` must have a `}}` somewhere after it.
fn check_double_braces(text: &str) -> Result<(), DomainError> {
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find("{{") {
        let open = cursor + offset;
        match text[open + 2..].find("}}") {
            Some(close) => cursor = open + 2 + close + 2,
            None => return Err(DomainError::MalformedVariableSyntax { position: open }),
        }
    }
    Ok(())
}

// ── SchemaContent ─────────────────────────────────────────────────────────────

/// A parsed schema document plus every `$ref` it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaContent {
    document: Value,
    references: Vec<String>,
}

impl SchemaContent {
    /// Keys at least one of which must be present at the document root.
    pub const SHAPE_KEYS: [&'static str; 3] = ["$schema", "type", "properties"];

    /// Wrap a parsed document.
    ///
    /// # Errors
    ///
    /// `InvalidSchemaContent` unless the document is an object carrying at
    /// least one of `$schema`, `type`, `properties`.
    pub fn create(document: Value) -> Result<Self, DomainError> {
        let Some(root) = document.as_object() else {
            return Err(DomainError::InvalidSchemaContent(
                "schema document must be a JSON object".into(),
            ));
        };

        if !Self::SHAPE_KEYS.iter().any(|k| root.contains_key(*k)) {
            return Err(DomainError::InvalidSchemaContent(
                "schema must declare $schema, type or properties".into(),
            ));
        }

        let mut references = Vec::new();
        let mut seen = HashSet::new();
        collect_refs(&document, &mut references, &mut seen);

        Ok(Self {
            document,
            references,
        })
    }

    /// Parse JSON text, then validate as in [`SchemaContent::create`].
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| DomainError::InvalidSchemaContent(format!("invalid JSON: {e}")))?;
        Self::create(document)
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// `$ref` values in depth-first, first-seen order.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.document).unwrap_or_else(|_| self.document.to_string())
    }
}

fn collect_refs(node: &Value, out: &mut Vec<String>, seen: &mut HashSet<String>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "$ref" {
                    if let Value::String(target) = value {
                        if seen.insert(target.clone()) {
                            out.push(target.clone());
                        }
                        continue;
                    }
                }
                collect_refs(value, out, seen);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, out, seen);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ---------------------------------------------------------------------
    // TemplateContent
    // ---------------------------------------------------------------------

    #[test]
    fn extracts_single_and_double_brace_names() {
        let c = TemplateContent::create("Hi {name}, see {{input_text}} and {name}.").unwrap();
        assert_eq!(c.required_variables(), ["input_text", "name"]);
    }

    #[test]
    fn double_brace_yields_no_stray_fragment() {
        let c = TemplateContent::create("{{x}}").unwrap();
        assert_eq!(c.required_variables(), ["x"]);
    }

    #[test]
    fn extraction_is_case_sensitive() {
        let c = TemplateContent::create("{Name} {name}").unwrap();
        assert_eq!(c.required_variables(), ["Name", "name"]);
    }

    #[test]
    fn json_like_braces_are_not_placeholders() {
        let c = TemplateContent::create(r#"Return {"key": 1} as-is"#).unwrap();
        assert!(c.required_variables().is_empty());
        assert!(!c.has_variables());
    }

    #[test]
    fn empty_content_rejected() {
        assert_eq!(
            TemplateContent::create("").unwrap_err(),
            DomainError::EmptyContent
        );
    }

    #[test]
    fn unclosed_double_brace_rejected() {
        let err = TemplateContent::create("ok {{a}} then {{broken").unwrap_err();
        assert_eq!(err, DomainError::MalformedVariableSyntax { position: 14 });
    }

    #[test]
    fn metadata_is_derived() {
        let c = TemplateContent::create("line1\r\nline2\r\n")
            .unwrap()
            .with_language("en");
        let m = c.metadata();
        assert_eq!(m.encoding, "utf-8");
        assert_eq!(m.language.as_deref(), Some("en"));
        assert_eq!(m.line_ending, LineEnding::Crlf);
        assert_eq!(m.size, 14);
    }

    #[test]
    fn line_ending_detection() {
        assert_eq!(LineEnding::detect("a"), LineEnding::None);
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\nc"), LineEnding::Mixed);
    }

    // ---------------------------------------------------------------------
    // SchemaContent
    // ---------------------------------------------------------------------

    #[test]
    fn schema_requires_shape_key() {
        assert!(SchemaContent::create(json!({"type": "object"})).is_ok());
        assert!(SchemaContent::create(json!({"$schema": "x"})).is_ok());
        assert!(SchemaContent::create(json!({"properties": {}})).is_ok());
        assert!(matches!(
            SchemaContent::create(json!({"title": "nope"})).unwrap_err(),
            DomainError::InvalidSchemaContent(_)
        ));
        assert!(matches!(
            SchemaContent::create(json!([1, 2])).unwrap_err(),
            DomainError::InvalidSchemaContent(_)
        ));
    }

    #[test]
    fn collects_nested_refs_deduplicated() {
        let doc = json!({
            "type": "object",
            "properties": {
                "a": { "$ref": "to/project/base.json" },
                "b": { "items": [
                    { "$ref": "to/issue/item.json" },
                    { "$ref": "to/project/base.json" }
                ] },
                "c": { "allOf": [ { "properties": { "d": { "$ref": "#/definitions/d" } } } ] }
            }
        });
        let s = SchemaContent::create(doc).unwrap();
        let mut refs = s.references().to_vec();
        refs.sort();
        assert_eq!(
            refs,
            ["#/definitions/d", "to/issue/item.json", "to/project/base.json"]
        );
    }

    #[test]
    fn non_string_ref_is_walked_not_collected() {
        let doc = json!({ "type": "object", "$ref": { "$ref": "inner.json" } });
        let s = SchemaContent::create(doc).unwrap();
        assert_eq!(s.references(), ["inner.json"]);
    }

    #[test]
    fn parse_reports_invalid_json() {
        assert!(matches!(
            SchemaContent::parse("{ not json").unwrap_err(),
            DomainError::InvalidSchemaContent(_)
        ));
        let s = SchemaContent::parse(r#"{"type":"string"}"#).unwrap();
        assert!(s.references().is_empty());
    }
}
