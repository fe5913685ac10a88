// ============================================================================
// domain/error.rs - DOMAIN ERROR TAXONOMY
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (aggregates keep them in their generation history)
/// - Categorizable (for CLI display)
/// - Coded (stable `code()` strings drive the generation policy's fallbacks)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Identifier cannot be empty")]
    EmptyId,

    // ========================================================================
    // Identifier Parsing Errors
    // ========================================================================
    #[error("Invalid format for '{value}': {reason}")]
    InvalidFormat { value: String, reason: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    // ========================================================================
    // Content Errors
    // ========================================================================
    #[error("Template content cannot be empty")]
    EmptyContent,

    #[error("Malformed variable syntax at byte {position}: '{{{{' is never closed")]
    MalformedVariableSyntax { position: usize },

    #[error("Invalid schema content: {0}")]
    InvalidSchemaContent(String),

    #[error("Invalid variable name '{name}'")]
    InvalidVariableName { name: String },

    // ========================================================================
    // Substitution / Policy Errors
    // ========================================================================
    #[error("Missing variables: {}", .names.join(", "))]
    MissingVariables { names: Vec<String> },

    #[error("Validation failed: {}", .errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    // ========================================================================
    // Resolution Errors
    // ========================================================================
    #[error("Template not found: {reference}")]
    TemplateNotFound { reference: String },

    #[error("Schema not found: {reference}")]
    SchemaNotFound { reference: String },

    #[error("Version conflict: requested {requested}, found {found}")]
    VersionConflict { requested: String, found: String },

    #[error("Invalid version format: '{0}'")]
    InvalidVersionFormat(String),

    // ========================================================================
    // Schema Graph Errors
    // ========================================================================
    #[error("Dependency error in '{schema}': {reason}")]
    DependencyError { schema: String, reason: String },

    #[error("Circular dependency: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    // ========================================================================
    // Integrity Errors
    // ========================================================================
    #[error("Unsupported checksum algorithm '{0}' (expected sha256 or sha1)")]
    UnsupportedAlgorithm(String),
}

impl DomainError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            Self::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            Self::EmptyId => "EMPTY_ID",
            Self::InvalidFormat { .. } => "INVALID_FORMAT",
            Self::InvalidPath { .. } => "INVALID_PATH",
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::MalformedVariableSyntax { .. } => "MALFORMED_VARIABLE_SYNTAX",
            Self::InvalidSchemaContent(_) => "INVALID_SCHEMA_CONTENT",
            Self::InvalidVariableName { .. } => "INVALID_VARIABLE_NAME",
            Self::MissingVariables { .. } => "MISSING_VARIABLES",
            Self::ValidationFailed { .. } => "VALIDATION_ERROR",
            Self::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            Self::SchemaNotFound { .. } => "SCHEMA_NOT_FOUND",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::InvalidVersionFormat(_) => "INVALID_VERSION_FORMAT",
            Self::DependencyError { .. } => "DEPENDENCY_ERROR",
            Self::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
            Self::UnsupportedAlgorithm(_) => "UNSUPPORTED_ALGORITHM",
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFormat { value, .. } => vec![
                format!("Check the file extension of '{value}'"),
                "Templates end in .md, schemas end in .json".into(),
            ],
            Self::InvalidPath { .. } => vec![
                "Paths have the form directive/layer/filename".into(),
                "Directive and layer cannot be empty or contain '/'".into(),
            ],
            Self::MissingVariables { names } => vec![
                format!("Supply values for: {}", names.join(", ")),
                "Or switch the substitution policy to 'ignore' or 'empty'".into(),
            ],
            Self::TemplateNotFound { .. } => vec![
                "Try: stencil list templates".into(),
                "Or point at a file explicitly with --path".into(),
            ],
            Self::SchemaNotFound { .. } => vec![
                "Try: stencil list schemas".into(),
                "Drop --strict to continue without a schema".into(),
            ],
            Self::UnsupportedAlgorithm(_) => vec!["Use sha256 or sha1".into()],
            Self::InvalidVersionFormat(_) => {
                vec!["Versions look like 1.2.3 or 1.2.3-beta.1".into()]
            }
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidFormat { .. }
            | Self::InvalidPath { .. }
            | Self::EmptyId
            | Self::EmptyContent
            | Self::MalformedVariableSyntax { .. }
            | Self::InvalidSchemaContent(_)
            | Self::InvalidVariableName { .. }
            | Self::MissingVariables { .. }
            | Self::ValidationFailed { .. }
            | Self::InvalidVersionFormat(_)
            | Self::UnsupportedAlgorithm(_) => ErrorCategory::Validation,
            Self::VersionConflict { .. }
            | Self::DependencyError { .. }
            | Self::CircularDependency { .. } => ErrorCategory::Compatibility,
            Self::TemplateNotFound { .. } | Self::SchemaNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::InvalidConfiguration(_) | Self::MissingRequiredField { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}
