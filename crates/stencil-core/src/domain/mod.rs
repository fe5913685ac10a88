//! Core domain layer for Stencil.
//!
//! Pure business logic: paths, content, variables, versions, checksums,
//! the schema registry and the generation aggregates. All I/O lives behind
//! the ports defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable values**: Value objects and entities are Clone + PartialEq
//! - **Single writer**: Aggregates change only through `&mut self`

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod policy;
pub mod value_objects;

pub use aggregates::{
    DependencyReport, GeneratedPrompt, GenerationState, GenerationStatus, ImportFailure,
    ImportReport, MissingReference, PromptGenerationAggregate, SchemaManagementAggregate,
    SchemaRegistry,
};
pub use entities::{PromptTemplate, ResourceMetadata, Schema};
pub use error::{DomainError, ErrorCategory};
pub use policy::{
    FallbackAction, FallbackKind, GenerationPolicy, GenerationPolicyConfig, ResolutionContext,
    ValidationReport, ValueTransform, VariableRule,
};
pub use value_objects::{
    ChecksumAlgorithm, PathFilter, SchemaContent, SchemaId, SchemaPath, SubstitutionPolicy,
    TemplateChecksum, TemplateContent, TemplateId, TemplatePath, TemplateVariables,
    TemplateVersion, VariableSubstitution,
};
