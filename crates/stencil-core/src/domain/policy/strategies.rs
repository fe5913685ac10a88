//! Pluggable strategies consulted by [`GenerationPolicy`](super::GenerationPolicy).

use std::collections::HashMap;

use crate::domain::{
    error::DomainError,
    value_objects::{ResourceKind, TemplateKind},
};

/// What a strategy may look at besides the variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    pub directive: Option<String>,
    pub layer: Option<String>,
    pub values: HashMap<String, String>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_target(directive: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            directive: Some(directive.into()),
            layer: Some(layer.into()),
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

// ── Variable resolution ───────────────────────────────────────────────────────

/// Supplies a value for a variable the caller did not provide.
pub trait VariableResolutionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Higher runs first.
    fn priority(&self) -> i32;

    fn resolve(&self, variable: &str, context: &ResolutionContext) -> Option<String>;
}

/// Static per-name defaults.
#[derive(Debug, Clone, Default)]
pub struct DefaultValueStrategy {
    defaults: HashMap<String, String>,
    priority: i32,
}

impl DefaultValueStrategy {
    pub fn new(priority: i32) -> Self {
        Self {
            defaults: HashMap::new(),
            priority,
        }
    }

    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }
}

impl VariableResolutionStrategy for DefaultValueStrategy {
    fn name(&self) -> &str {
        "default-value"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn resolve(&self, variable: &str, _context: &ResolutionContext) -> Option<String> {
        self.defaults.get(variable).cloned()
    }
}

/// Looks the name up in [`ResolutionContext::values`]; also answers
/// `directive` and `layer` from the context target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextLookupStrategy {
    priority: i32,
}

impl ContextLookupStrategy {
    pub fn new(priority: i32) -> Self {
        Self { priority }
    }
}

impl VariableResolutionStrategy for ContextLookupStrategy {
    fn name(&self) -> &str {
        "context-lookup"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn resolve(&self, variable: &str, context: &ResolutionContext) -> Option<String> {
        if let Some(v) = context.values.get(variable) {
            return Some(v.clone());
        }
        match variable {
            "directive" => context.directive.clone(),
            "layer" => context.layer.clone(),
            _ => None,
        }
    }
}

/// Reads `{prefix}{NAME}` from a snapshot of environment variables.
///
/// The snapshot is taken at construction so resolution stays pure.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentStrategy {
    prefix: String,
    vars: HashMap<String, String>,
    priority: i32,
}

impl EnvironmentStrategy {
    /// Snapshot every process variable starting with `prefix`.
    pub fn from_env(prefix: impl Into<String>, priority: i32) -> Self {
        let prefix = prefix.into();
        let vars = std::env::vars()
            .filter(|(k, _)| k.starts_with(&prefix))
            .collect();
        Self {
            prefix,
            vars,
            priority,
        }
    }

    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I, priority: i32) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            priority,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl VariableResolutionStrategy for EnvironmentStrategy {
    fn name(&self) -> &str {
        "environment"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn resolve(&self, variable: &str, _context: &ResolutionContext) -> Option<String> {
        let key = format!("{}{}", self.prefix, variable.to_uppercase());
        self.vars.get(&key).cloned()
    }
}

// ── Template selection ───────────────────────────────────────────────────────

/// Picks a template filename for a `(directive, layer)` pair.
pub trait TemplateSelectionStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn select(
        &self,
        directive: &str,
        layer: &str,
        context: &ResolutionContext,
    ) -> Result<String, DomainError>;
}

/// `f_{layer}.md`, the naming convention every resolver strategy uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSelection;

impl StandardSelection {
    pub const PREFIX: &'static str = "f_";

    pub fn filename_for(layer: &str) -> String {
        format!("{}{layer}{}", Self::PREFIX, TemplateKind::EXTENSION)
    }
}

impl TemplateSelectionStrategy for StandardSelection {
    fn name(&self) -> &str {
        "standard"
    }

    fn select(
        &self,
        _directive: &str,
        layer: &str,
        _context: &ResolutionContext,
    ) -> Result<String, DomainError> {
        if layer.is_empty() {
            return Err(DomainError::InvalidPath {
                path: String::new(),
                reason: "layer must not be empty".into(),
            });
        }
        Ok(Self::filename_for(layer))
    }
}

/// Always the same filename.
#[derive(Debug, Clone)]
pub struct FixedSelection {
    filename: String,
}

impl FixedSelection {
    /// # Errors
    ///
    /// `InvalidFormat` unless `filename` ends with the template extension.
    pub fn new(filename: impl Into<String>) -> Result<Self, DomainError> {
        let filename = filename.into();
        if !filename.ends_with(TemplateKind::EXTENSION) {
            return Err(DomainError::InvalidFormat {
                value: filename,
                reason: format!("template filename must end with '{}'", TemplateKind::EXTENSION),
            });
        }
        Ok(Self { filename })
    }
}

impl TemplateSelectionStrategy for FixedSelection {
    fn name(&self) -> &str {
        "fixed"
    }

    fn select(
        &self,
        _directive: &str,
        _layer: &str,
        _context: &ResolutionContext,
    ) -> Result<String, DomainError> {
        Ok(self.filename.clone())
    }
}
