//! Variable validation, resolution, transformation and failure handling
//! applied around a generation attempt.

use std::cmp::Reverse;
use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;

use crate::domain::{
    error::DomainError,
    policy::{
        strategies::{ResolutionContext, TemplateSelectionStrategy, VariableResolutionStrategy},
        transform::ValueTransform,
    },
    value_objects::TemplateVariables,
};

// ============================================================================
// Configuration
// ============================================================================

/// Per-variable constraints. Lengths are counted in characters.
#[derive(Debug, Clone, Default)]
pub struct VariableRule {
    pattern: Option<Regex>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    transform: Option<ValueTransform>,
}

impl VariableRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unanchored match; add `^…$` for a full-value match.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `pattern` does not compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, DomainError> {
        let re = Regex::new(pattern).map_err(|e| {
            DomainError::InvalidConfiguration(format!("invalid pattern '{pattern}': {e}"))
        })?;
        self.pattern = Some(re);
        Ok(self)
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn transform(mut self, transform: ValueTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn transform_kind(&self) -> Option<ValueTransform> {
        self.transform
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackKind {
    Retry,
    UseDefault,
    Skip,
    Abort,
}

impl FallbackKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Retry => "retry",
            Self::UseDefault => "useDefault",
            Self::Skip => "skip",
            Self::Abort => "abort",
        }
    }
}

impl std::fmt::Display for FallbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do after a failure. `max_retries` is set only for `Retry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FallbackAction {
    pub kind: FallbackKind,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationPolicyConfig {
    pub required_variables: Vec<String>,
    pub variable_rules: HashMap<String, VariableRule>,
    pub fallback_actions: Vec<FallbackKind>,
    pub max_retries: u32,
}

impl GenerationPolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required_variables.push(name.into());
        self
    }

    pub fn rule(mut self, name: impl Into<String>, rule: VariableRule) -> Self {
        self.variable_rules.insert(name.into(), rule);
        self
    }

    pub fn fallback(mut self, kind: FallbackKind) -> Self {
        self.fallback_actions.push(kind);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

// ============================================================================
// Validation report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    RequiredMissing,
    PatternMismatch,
    TooShort,
    TooLong,
}

impl IssueCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredMissing => "REQUIRED_MISSING",
            Self::PatternMismatch => "PATTERN_MISMATCH",
            Self::TooShort => "TOO_SHORT",
            Self::TooLong => "TOO_LONG",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub variable: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// `ValidationFailed` carrying every error, or `Ok` if valid.
    pub fn into_result(self) -> Result<Vec<ValidationIssue>, DomainError> {
        if self.is_valid {
            Ok(self.warnings)
        } else {
            Err(DomainError::ValidationFailed {
                errors: self.errors.iter().map(ToString::to_string).collect(),
            })
        }
    }
}

// ============================================================================
// Policy
// ============================================================================

pub struct GenerationPolicy {
    config: GenerationPolicyConfig,
    resolution: Vec<Box<dyn VariableResolutionStrategy>>,
    selection: Box<dyn TemplateSelectionStrategy>,
}

impl std::fmt::Debug for GenerationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPolicy")
            .field("config", &self.config)
            .field(
                "resolution",
                &self.resolution.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("selection", &self.selection.name())
            .finish()
    }
}

impl GenerationPolicy {
    pub fn builder() -> GenerationPolicyBuilder {
        GenerationPolicyBuilder::default()
    }

    pub fn config(&self) -> &GenerationPolicyConfig {
        &self.config
    }

    /// Strategy names in evaluation order.
    pub fn resolution_order(&self) -> Vec<&str> {
        self.resolution.iter().map(|s| s.name()).collect()
    }

    pub fn validate_variables(&self, vars: &TemplateVariables) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for name in &self.config.required_variables {
            if !vars.contains(name) {
                errors.push(ValidationIssue {
                    code: IssueCode::RequiredMissing,
                    variable: name.clone(),
                    message: format!("required variable '{name}' is missing"),
                });
            }
        }

        let mut ruled: Vec<(&String, &VariableRule)> = self.config.variable_rules.iter().collect();
        ruled.sort_by(|a, b| a.0.cmp(b.0));

        for (name, rule) in ruled {
            let Some(value) = vars.get(name) else {
                continue;
            };
            let len = value.chars().count();

            if let Some(re) = rule.pattern.as_ref().filter(|re| !re.is_match(value)) {
                errors.push(ValidationIssue {
                    code: IssueCode::PatternMismatch,
                    variable: name.clone(),
                    message: format!("'{name}' does not match pattern {}", re.as_str()),
                });
            }
            if let Some(min) = rule.min_length.filter(|&min| len < min) {
                errors.push(ValidationIssue {
                    code: IssueCode::TooShort,
                    variable: name.clone(),
                    message: format!("'{name}' is {len} characters, minimum is {min}"),
                });
            }
            if let Some(max) = rule.max_length.filter(|&max| len > max) {
                warnings.push(ValidationIssue {
                    code: IssueCode::TooLong,
                    variable: name.clone(),
                    message: format!("'{name}' is {len} characters, maximum is {max}"),
                });
            }
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// `provided` plus whatever the strategies can supply for `required`
    /// names that are absent. Names nobody can resolve stay absent.
    pub fn resolve_missing_variables(
        &self,
        provided: &TemplateVariables,
        required: &[String],
        context: &ResolutionContext,
    ) -> Result<TemplateVariables, DomainError> {
        let mut out = provided.clone();
        for name in required {
            if out.contains(name) {
                continue;
            }
            if let Some(value) = self.resolution.iter().find_map(|s| s.resolve(name, context)) {
                out.insert(name.clone(), value)?;
            }
        }
        Ok(out)
    }

    pub fn transform_variables(&self, vars: &TemplateVariables) -> TemplateVariables {
        vars.map_values(|name, value| {
            match self
                .config
                .variable_rules
                .get(name)
                .and_then(VariableRule::transform_kind)
            {
                Some(t) => t.apply(value),
                None => value.to_string(),
            }
        })
    }

    pub fn select_template(
        &self,
        directive: &str,
        layer: &str,
        context: &ResolutionContext,
    ) -> Result<String, DomainError> {
        self.selection.select(directive, layer, context)
    }

    pub fn handle_failure(&self, error: &DomainError) -> FallbackAction {
        let configured = &self.config.fallback_actions;

        let preferred = match error.code() {
            "TEMPLATE_NOT_FOUND" | "SCHEMA_NOT_FOUND" => Some(FallbackKind::UseDefault),
            "VALIDATION_ERROR" | "MISSING_VARIABLES" => Some(FallbackKind::Skip),
            _ => None,
        };

        let kind = preferred
            .filter(|k| configured.contains(k))
            .or_else(|| configured.first().copied())
            .unwrap_or(FallbackKind::Abort);

        FallbackAction {
            kind,
            max_retries: (kind == FallbackKind::Retry).then_some(self.config.max_retries),
        }
    }
}

#[derive(Default)]
pub struct GenerationPolicyBuilder {
    config: Option<GenerationPolicyConfig>,
    resolution: Vec<Box<dyn VariableResolutionStrategy>>,
    selection: Option<Box<dyn TemplateSelectionStrategy>>,
}

impl GenerationPolicyBuilder {
    pub fn config(mut self, config: GenerationPolicyConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn resolution_strategy(
        mut self,
        strategy: impl VariableResolutionStrategy + 'static,
    ) -> Self {
        self.resolution.push(Box::new(strategy));
        self
    }

    pub fn selection_strategy(
        mut self,
        strategy: impl TemplateSelectionStrategy + 'static,
    ) -> Self {
        self.selection = Some(Box::new(strategy));
        self
    }

    /// # Errors
    ///
    /// `InvalidConfiguration` when the config or the selection strategy is
    /// missing.
    pub fn build(self) -> Result<GenerationPolicy, DomainError> {
        let config = self.config.ok_or_else(|| {
            DomainError::InvalidConfiguration("generation policy config is required".into())
        })?;
        let selection = self.selection.ok_or_else(|| {
            DomainError::InvalidConfiguration("template selection strategy is required".into())
        })?;

        let mut resolution = self.resolution;
        resolution.sort_by_key(|s| Reverse(s.priority()));

        Ok(GenerationPolicy {
            config,
            resolution,
            selection,
        })
    }
}
