//! Stencil Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Stencil, a
//! template/schema resolution and prompt generation engine, following
//! hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stencil-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (TemplateResolverService, Prompt-      │
//! │   GenerationService, SchemaSyncService) │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (TemplateRepository, SchemaRepository) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     stencil-adapters (Infrastructure)   │
//! │   (in-memory and filesystem repos)      │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (paths, content, variables, registry,  │
//! │   generation aggregate, policy)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stencil_core::prelude::*;
//!
//! # async fn run(
//! #     templates: Arc<dyn TemplateRepository>,
//! #     schemas: Arc<dyn SchemaRepository>,
//! # ) -> StencilResult<()> {
//! let resolver = TemplateResolverService::new(templates, schemas);
//! let resolved = resolver.resolve(&ResolveRequest::new("to", "task")).await?;
//!
//! let vars = TemplateVariables::new().with("name", "login bug")?;
//! let mut session = PromptGenerationAggregate::create("session-1", resolved.template)?;
//! let prompt = session.generate_prompt(&vars)?;
//! println!("{}", prompt.content);
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CatalogService, GenerationOutcome, GenerationRequest, GenerationSettings,
        PromptGenerationService, ResolveOptions, ResolveRequest, ResolvedTemplate,
        SchemaSyncService, SyncReport, TemplateResolverService,
        ports::{Manifest, SchemaRepository, TemplateRepository},
    };
    pub use crate::domain::{
        GenerationPolicy, GenerationPolicyConfig, PathFilter, PromptGenerationAggregate,
        PromptTemplate, Schema, SchemaContent, SchemaManagementAggregate, SchemaPath,
        SubstitutionPolicy, TemplateContent, TemplatePath, TemplateVariables, TemplateVersion,
    };
    pub use crate::error::{StencilError, StencilResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
