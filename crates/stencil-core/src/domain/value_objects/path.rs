//! Path identifiers: `directive/layer/filename` composite keys.
//!
//! Templates and schemas share one path shape and differ only in the fixed
//! filename extension. The kind is carried as a phantom marker so a
//! `TemplatePath` can never be handed to an API expecting a `SchemaPath`.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::DomainError;

const SEPARATOR: char = '/';

/// Non-empty, not `.` or `..`, and free of backslashes.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\')
}

// ── Kinds ─────────────────────────────────────────────────────────────────────

/// Compile-time description of a stored resource kind.
pub trait ResourceKind {
    /// Filename suffix, including the dot.
    const EXTENSION: &'static str;
    /// Human-readable label used in error messages.
    const LABEL: &'static str;
}

/// Marker for prompt templates (`.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateKind {}

/// Marker for schemas (`.json`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaKind {}

impl ResourceKind for TemplateKind {
    const EXTENSION: &'static str = ".md";
    const LABEL: &'static str = "template";
}

impl ResourceKind for SchemaKind {
    const EXTENSION: &'static str = ".json";
    const LABEL: &'static str = "schema";
}

pub type TemplatePath = ResourcePath<TemplateKind>;
pub type SchemaPath = ResourcePath<SchemaKind>;
pub type TemplateId = ResourceId<TemplateKind>;
pub type SchemaId = ResourceId<SchemaKind>;

// ── ResourcePath ──────────────────────────────────────────────────────────────

/// Validated `directive/layer/filename` triple.
///
/// Immutable once built; the only way in is [`ResourcePath::create`] or
/// [`ResourcePath::from_string`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath<K> {
    directive: String,
    layer: String,
    filename: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> ResourcePath<K> {
    /// Build a path from its three tokens.
    ///
    /// # Errors
    ///
    /// - `InvalidPath` if directive or layer is not a single plain segment,
    ///   or the filename is empty or has an empty, `.` or `..` segment
    /// - `InvalidFormat` if the filename does not end with the kind's extension
    pub fn create(
        directive: impl Into<String>,
        layer: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let directive = directive.into();
        let layer = layer.into();
        let filename = filename.into();

        for (label, token) in [("directive", &directive), ("layer", &layer)] {
            if token.contains(SEPARATOR) || !is_plain_segment(token) {
                return Err(DomainError::InvalidPath {
                    path: format!("{directive}/{layer}/{filename}"),
                    reason: format!("{label} must be a single plain segment"),
                });
            }
        }

        if filename.is_empty() {
            return Err(DomainError::InvalidPath {
                path: format!("{directive}/{layer}/"),
                reason: "filename cannot be empty".into(),
            });
        }

        if !filename.split(SEPARATOR).all(is_plain_segment) {
            return Err(DomainError::InvalidPath {
                path: format!("{directive}/{layer}/{filename}"),
                reason: "filename segments must not be empty, `.` or `..`".into(),
            });
        }

        check_extension::<K>(&filename)?;

        Ok(Self {
            directive,
            layer,
            filename,
            _kind: PhantomData,
        })
    }

    /// Parse a canonical `directive/layer/filename` string.
    ///
    /// The first two segments are directive and layer; everything after the
    /// second separator is the filename.
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        let mut parts = s.splitn(3, SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(directive), Some(layer), Some(filename)) => {
                Self::create(directive, layer, filename)
            }
            _ => Err(DomainError::InvalidPath {
                path: s.to_string(),
                reason: "expected directive/layer/filename".into(),
            }),
        }
    }

    pub fn directive(&self) -> &str {
        &self.directive
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Filename without the kind's extension.
    pub fn stem(&self) -> &str {
        self.filename
            .strip_suffix(K::EXTENSION)
            .unwrap_or(&self.filename)
    }

    /// The canonical `directive/layer/filename` string.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.directive, self.layer, self.filename)
    }

    /// Same directive, layer and stem under another kind's extension.
    ///
    /// `to/project/f_project.md` ↔ `to/project/f_project.json`
    pub fn counterpart<O: ResourceKind>(&self) -> ResourcePath<O> {
        ResourcePath {
            directive: self.directive.clone(),
            layer: self.layer.clone(),
            filename: format!("{}{}", self.stem(), O::EXTENSION),
            _kind: PhantomData,
        }
    }

    /// Whether this path passes every field set on `filter`.
    pub fn matches(&self, filter: &PathFilter) -> bool {
        filter.matches(&self.directive, &self.layer)
    }
}

fn check_extension<K: ResourceKind>(filename: &str) -> Result<(), DomainError> {
    match filename.strip_suffix(K::EXTENSION) {
        Some(stem) if !stem.is_empty() => Ok(()),
        Some(_) => Err(DomainError::InvalidFormat {
            value: filename.to_string(),
            reason: format!("{} filename has no stem", K::LABEL),
        }),
        None => Err(DomainError::InvalidFormat {
            value: filename.to_string(),
            reason: format!("{} filenames must end with {}", K::LABEL, K::EXTENSION),
        }),
    }
}

impl<K: ResourceKind> fmt::Display for ResourcePath<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.directive, self.layer, self.filename)
    }
}

impl<K: ResourceKind> FromStr for ResourcePath<K> {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl<K: ResourceKind> Serialize for ResourcePath<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, K: ResourceKind> Deserialize<'de> for ResourcePath<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_string(&raw).map_err(serde::de::Error::custom)
    }
}

// ── ResourceId ────────────────────────────────────────────────────────────────

/// A path in its pure string form.
///
/// Useful where an identity is stored or compared as text (manifests,
/// registry keys) but the parts still need to be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId<K> {
    value: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> ResourceId<K> {
    /// Validate and wrap an identifier string.
    ///
    /// # Errors
    ///
    /// - `InvalidPath` if there are fewer than three `/`-separated segments
    /// - `InvalidFormat` if the extension is wrong
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.split(SEPARATOR).count() < 3 {
            return Err(DomainError::InvalidPath {
                path: value,
                reason: "expected at least three '/'-separated segments".into(),
            });
        }
        let filename = value.splitn(3, SEPARATOR).nth(2).unwrap_or_default();
        check_extension::<K>(filename)?;
        Ok(Self {
            value,
            _kind: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn directive(&self) -> &str {
        self.part(0)
    }

    pub fn layer(&self) -> &str {
        self.part(1)
    }

    pub fn filename(&self) -> &str {
        self.value.splitn(3, SEPARATOR).nth(2).unwrap_or_default()
    }

    /// Convert into a structured path, applying the stricter path rules.
    pub fn to_path(&self) -> Result<ResourcePath<K>, DomainError> {
        ResourcePath::from_string(&self.value)
    }

    fn part(&self, index: usize) -> &str {
        self.value.split(SEPARATOR).nth(index).unwrap_or_default()
    }
}

impl<K: ResourceKind> From<&ResourcePath<K>> for ResourceId<K> {
    fn from(path: &ResourcePath<K>) -> Self {
        Self {
            value: path.path(),
            _kind: PhantomData,
        }
    }
}

impl<K: ResourceKind> fmt::Display for ResourceId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ── PathFilter ────────────────────────────────────────────────────────────────

/// Optional directive/layer constraints. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFilter {
    pub directive: Option<String>,
    pub layer: Option<String>,
}

impl PathFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    pub fn layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn matches(&self, directive: &str, layer: &str) -> bool {
        self.directive.as_deref().is_none_or(|d| d == directive)
            && self.layer.as_deref().is_none_or(|l| l == layer)
    }
}
