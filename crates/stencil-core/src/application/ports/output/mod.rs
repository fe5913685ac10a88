//! Driven (output) ports, implemented by infrastructure.
//!
//! These traits define what the application needs from storage. The
//! `stencil-adapters` crate provides in-memory and filesystem implementations.

mod dto;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{
    entities::{PromptTemplate, Schema},
    value_objects::{PathFilter, SchemaPath, TemplatePath},
};
use crate::error::StencilResult;

pub use dto::{BatchFailure, BatchOutcome, Manifest, ManifestEntry, SchemaValidation};

/// Port for prompt template storage.
///
/// Implemented by:
/// - `stencil_adapters::memory::InMemoryTemplateRepository`
/// - `stencil_adapters::filesystem::FileTemplateRepository`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Load one template. Fails with `TemplateNotFound` if absent.
    async fn load_template(&self, path: &TemplatePath) -> StencilResult<PromptTemplate>;

    async fn exists(&self, path: &TemplatePath) -> StencilResult<bool>;

    async fn list_available(&self, filter: &PathFilter) -> StencilResult<Manifest>;

    /// Insert or overwrite.
    async fn save(&self, template: PromptTemplate) -> StencilResult<()>;

    /// Fails with `TemplateNotFound` if absent.
    async fn delete(&self, path: &TemplatePath) -> StencilResult<()>;

    /// Drop any cached state and re-read the backing store.
    async fn refresh(&self) -> StencilResult<()>;
}

/// Port for schema storage.
///
/// Implemented by:
/// - `stencil_adapters::memory::InMemorySchemaRepository`
/// - `stencil_adapters::filesystem::FileSchemaRepository`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Load one schema. Fails with `SchemaNotFound` if absent.
    async fn load_schema(&self, path: &SchemaPath) -> StencilResult<Schema>;

    /// Load every path that exists, keyed by canonical path; missing or
    /// unreadable schemas are left out.
    async fn load_schemas(&self, paths: &[SchemaPath]) -> StencilResult<BTreeMap<String, Schema>>;

    async fn exists(&self, path: &SchemaPath) -> StencilResult<bool>;

    async fn list_available(&self, filter: &PathFilter) -> StencilResult<Manifest>;

    async fn save(&self, schema: Schema) -> StencilResult<BatchOutcome>;

    async fn save_all(&self, schemas: Vec<Schema>) -> StencilResult<BatchOutcome>;

    async fn delete(&self, path: &SchemaPath) -> StencilResult<BatchOutcome>;

    async fn delete_all(&self, paths: &[SchemaPath]) -> StencilResult<BatchOutcome>;

    /// Schema paths referenced by the schema at `path`. References that are
    /// not `directive/layer/file.json` paths are skipped.
    async fn get_dependencies(&self, path: &SchemaPath) -> StencilResult<Vec<SchemaPath>>;

    /// Structural check of a raw document without storing it.
    async fn validate_schema(
        &self,
        document: &serde_json::Value,
    ) -> StencilResult<SchemaValidation>;

    async fn refresh(&self) -> StencilResult<()>;
}
