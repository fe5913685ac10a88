//! JSON schemas on disk.

use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use stencil_core::{
    application::ports::{BatchOutcome, Manifest, SchemaRepository, SchemaValidation},
    domain::{
        DomainError, PathFilter, Schema, SchemaContent, SchemaPath, value_objects::SchemaKind,
    },
    error::{StencilError, StencilResult},
};

use super::{ensure_parent, io_error, resource_file, sidecar, walk};
use crate::schema_checks;

/// Schema repository rooted at a base directory.
#[derive(Debug, Clone)]
pub struct FileSchemaRepository {
    base: PathBuf,
}

impl FileSchemaRepository {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &std::path::Path {
        &self.base
    }

    fn file(&self, path: &SchemaPath) -> PathBuf {
        resource_file(&self.base, path)
    }

    async fn write(&self, schema: &Schema) -> StencilResult<()> {
        let check = schema_checks::validate_document(schema.content().document());
        if !check.valid {
            return Err(DomainError::InvalidSchemaContent(check.errors.join("; ")).into());
        }

        let file = self.file(schema.path());
        ensure_parent(&file).await?;
        tokio::fs::write(&file, schema.content().to_json_string())
            .await
            .map_err(|e| io_error(&file, &e))?;
        sidecar::write(&file, schema.metadata()).await
    }

    async fn remove(&self, path: &SchemaPath) -> StencilResult<()> {
        let file = self.file(path);
        match tokio::fs::remove_file(&file).await {
            Ok(()) => sidecar::remove(&file).await,
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(path)),
            Err(e) => Err(io_error(&file, &e)),
        }
    }
}

fn not_found(path: &SchemaPath) -> StencilError {
    DomainError::SchemaNotFound {
        reference: path.path(),
    }
    .into()
}

#[async_trait]
impl SchemaRepository for FileSchemaRepository {
    #[instrument(skip_all, fields(path = %path))]
    async fn load_schema(&self, path: &SchemaPath) -> StencilResult<Schema> {
        let file = self.file(path);
        let text = match tokio::fs::read_to_string(&file).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found(path)),
            Err(e) => return Err(io_error(&file, &e)),
        };

        let content = SchemaContent::parse(&text)?;
        let metadata = sidecar::read(&file).await?;
        debug!(refs = content.references().len(), "schema loaded");

        Ok(Schema::create(path.clone(), content, metadata))
    }

    #[instrument(skip_all, fields(count = paths.len()))]
    async fn load_schemas(&self, paths: &[SchemaPath]) -> StencilResult<BTreeMap<String, Schema>> {
        let results = join_all(paths.iter().map(|p| self.load_schema(p))).await;

        let mut loaded = BTreeMap::new();
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(schema) => {
                    loaded.insert(path.path(), schema);
                }
                Err(e) => debug!(path = %path, error = %e, "schema left out of batch load"),
            }
        }
        Ok(loaded)
    }

    async fn exists(&self, path: &SchemaPath) -> StencilResult<bool> {
        let file = self.file(path);
        tokio::fs::try_exists(&file)
            .await
            .map_err(|e| io_error(&file, &e))
    }

    async fn list_available(&self, filter: &PathFilter) -> StencilResult<Manifest> {
        let paths = walk::list::<SchemaKind>(self.base.clone(), filter.clone()).await?;
        Ok(Manifest::from_paths(&paths))
    }

    async fn save(&self, schema: Schema) -> StencilResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        outcome.record(schema.path().path(), self.write(&schema).await);
        Ok(outcome)
    }

    #[instrument(skip_all, fields(count = schemas.len()))]
    async fn save_all(&self, schemas: Vec<Schema>) -> StencilResult<BatchOutcome> {
        let results = join_all(schemas.iter().map(|s| self.write(s))).await;

        let mut outcome = BatchOutcome::default();
        for (schema, result) in schemas.iter().zip(results) {
            if let Err(e) = &result {
                warn!(path = %schema.path(), error = %e, "schema not saved");
            }
            outcome.record(schema.path().path(), result);
        }
        Ok(outcome)
    }

    async fn delete(&self, path: &SchemaPath) -> StencilResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        outcome.record(path.path(), self.remove(path).await);
        Ok(outcome)
    }

    #[instrument(skip_all, fields(count = paths.len()))]
    async fn delete_all(&self, paths: &[SchemaPath]) -> StencilResult<BatchOutcome> {
        let results = join_all(paths.iter().map(|p| self.remove(p))).await;

        let mut outcome = BatchOutcome::default();
        for (path, result) in paths.iter().zip(results) {
            outcome.record(path.path(), result);
        }
        Ok(outcome)
    }

    async fn get_dependencies(&self, path: &SchemaPath) -> StencilResult<Vec<SchemaPath>> {
        let schema = self.load_schema(path).await?;
        Ok(schema_checks::dependency_paths(&schema))
    }

    async fn validate_schema(&self, document: &Value) -> StencilResult<SchemaValidation> {
        Ok(schema_checks::validate_document(document))
    }

    /// Nothing is cached; every call reads the disk.
    async fn refresh(&self) -> StencilResult<()> {
        Ok(())
    }
}
