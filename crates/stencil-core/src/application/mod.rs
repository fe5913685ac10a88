//! Application layer for Stencil.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (resolution, generation, schema sync)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    CatalogService, GenerationOutcome, GenerationRequest, GenerationSettings,
    PromptGenerationService, ResolveOptions, ResolveRequest, ResolvedTemplate, SchemaSyncService,
    SyncReport, TemplateResolverService,
};

pub use ports::{Manifest, SchemaRepository, TemplateRepository};

pub use error::ApplicationError;
