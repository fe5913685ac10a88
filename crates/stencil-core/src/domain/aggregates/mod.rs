//! Aggregates: the consistency boundaries that own mutable state.

pub mod generation;
pub mod schema_management;
pub mod schema_registry;

pub use generation::{
    DEFAULT_MAX_ATTEMPTS, GeneratedPrompt, GenerationState, GenerationStatus,
    PromptGenerationAggregate,
};
pub use schema_management::{ImportFailure, ImportReport, SchemaManagementAggregate};
pub use schema_registry::{DependencyReport, MissingReference, SchemaRegistry};
