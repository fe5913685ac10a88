//! Catalog Service - listing and single-item lookups.
//!
//! Separated from resolution and generation for single responsibility; the
//! CLI `list` commands go through here.

use std::sync::Arc;

use tracing::instrument;

use crate::{
    application::ports::{Manifest, SchemaRepository, TemplateRepository},
    domain::{
        entities::{PromptTemplate, Schema},
        value_objects::{PathFilter, SchemaPath, TemplatePath},
    },
    error::StencilResult,
};

/// Service for browsing what the repositories hold.
pub struct CatalogService {
    templates: Arc<dyn TemplateRepository>,
    schemas: Arc<dyn SchemaRepository>,
}

impl CatalogService {
    pub fn new(templates: Arc<dyn TemplateRepository>, schemas: Arc<dyn SchemaRepository>) -> Self {
        Self { templates, schemas }
    }

    #[instrument(skip(self))]
    pub async fn list_templates(&self, filter: &PathFilter) -> StencilResult<Manifest> {
        self.templates.list_available(filter).await
    }

    #[instrument(skip(self))]
    pub async fn list_schemas(&self, filter: &PathFilter) -> StencilResult<Manifest> {
        self.schemas.list_available(filter).await
    }

    pub async fn template(&self, path: &TemplatePath) -> StencilResult<PromptTemplate> {
        self.templates.load_template(path).await
    }

    pub async fn schema(&self, path: &SchemaPath) -> StencilResult<Schema> {
        self.schemas.load_schema(path).await
    }

    /// Re-read both backing stores.
    pub async fn refresh(&self) -> StencilResult<()> {
        self.templates.refresh().await?;
        self.schemas.refresh().await
    }
}
