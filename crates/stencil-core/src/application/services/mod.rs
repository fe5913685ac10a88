//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "resolve a template" or "generate a prompt".

pub mod catalog;
pub mod prompt_generation;
pub mod schema_sync;
pub mod template_resolver;

pub use catalog::CatalogService;
pub use prompt_generation::{
    GenerationOutcome, GenerationRequest, GenerationSettings, PromptGenerationService,
};
pub use schema_sync::{SchemaSyncService, SyncReport};
pub use template_resolver::{
    DEFAULT_FALLBACKS, ExactPathStrategy, FallbackStrategy, Repositories, ResolutionStrategy,
    ResolveOptions, ResolveRequest, ResolvedTemplate, StandardNamingStrategy,
    TemplateResolverService,
};
