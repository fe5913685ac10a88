//! Generation policy: how variables are validated, resolved and transformed
//! before substitution, and which fallback applies after a failure.

pub mod generation_policy;
pub mod strategies;
pub mod transform;

pub use generation_policy::{
    FallbackAction, FallbackKind, GenerationPolicy, GenerationPolicyBuilder,
    GenerationPolicyConfig, IssueCode, ValidationIssue, ValidationReport, VariableRule,
};
pub use strategies::{
    ContextLookupStrategy, DefaultValueStrategy, EnvironmentStrategy, FixedSelection,
    ResolutionContext, StandardSelection, TemplateSelectionStrategy, VariableResolutionStrategy,
};
pub use transform::ValueTransform;
