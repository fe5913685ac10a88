//! In-memory repositories.
//!
//! Both stores are cheap to clone; clones share the same map.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use stencil_core::{
    application::{
        ApplicationError,
        ports::{BatchOutcome, Manifest, SchemaRepository, SchemaValidation, TemplateRepository},
    },
    domain::{DomainError, PathFilter, PromptTemplate, Schema, SchemaPath, TemplatePath},
    error::StencilResult,
};

use crate::{builtin_templates, schema_checks};

type Store<T> = Arc<RwLock<HashMap<String, T>>>;

fn read<T>(store: &Store<T>) -> Result<RwLockReadGuard<'_, HashMap<String, T>>, ApplicationError> {
    store.read().map_err(|_| ApplicationError::StoreLockError)
}

fn write<T>(
    store: &Store<T>,
) -> Result<RwLockWriteGuard<'_, HashMap<String, T>>, ApplicationError> {
    store.write().map_err(|_| ApplicationError::StoreLockError)
}

// ── Templates ─────────────────────────────────────────────────────────────────

/// Thread-safe in-memory template store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateRepository {
    inner: Store<PromptTemplate>,
}

impl InMemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with the built-in fallback templates.
    pub fn with_builtin() -> StencilResult<Self> {
        let repo = Self::new();
        repo.load_builtin()?;
        Ok(repo)
    }

    /// Insert the built-in templates, overwriting same-path entries.
    pub fn load_builtin(&self) -> StencilResult<()> {
        let templates = builtin_templates::all_templates()?;
        let mut inner = write(&self.inner)?;
        for template in templates {
            inner.insert(template.path().path(), template);
        }
        debug!(count = inner.len(), "built-in templates loaded");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> StencilResult<()> {
        write(&self.inner)?.clear();
        Ok(())
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn load_template(&self, path: &TemplatePath) -> StencilResult<PromptTemplate> {
        let inner = read(&self.inner)?;
        inner.get(&path.path()).cloned().ok_or_else(|| {
            DomainError::TemplateNotFound {
                reference: path.path(),
            }
            .into()
        })
    }

    async fn exists(&self, path: &TemplatePath) -> StencilResult<bool> {
        Ok(read(&self.inner)?.contains_key(&path.path()))
    }

    async fn list_available(&self, filter: &PathFilter) -> StencilResult<Manifest> {
        let inner = read(&self.inner)?;
        Ok(Manifest::from_paths(
            inner.values().map(PromptTemplate::path).filter(|p| p.matches(filter)),
        ))
    }

    #[instrument(skip_all, fields(path = %template.path()))]
    async fn save(&self, template: PromptTemplate) -> StencilResult<()> {
        write(&self.inner)?.insert(template.path().path(), template);
        Ok(())
    }

    async fn delete(&self, path: &TemplatePath) -> StencilResult<()> {
        match write(&self.inner)?.remove(&path.path()) {
            Some(_) => Ok(()),
            None => Err(DomainError::TemplateNotFound {
                reference: path.path(),
            }
            .into()),
        }
    }

    async fn refresh(&self) -> StencilResult<()> {
        Ok(())
    }
}

// ── Schemas ───────────────────────────────────────────────────────────────────

/// Thread-safe in-memory schema store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaRepository {
    inner: Store<Schema>,
}

impl InMemorySchemaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> StencilResult<()> {
        write(&self.inner)?.clear();
        Ok(())
    }

    fn insert(&self, schema: Schema) -> Result<(), String> {
        let check = schema_checks::validate_document(schema.content().document());
        if !check.valid {
            return Err(check.errors.join("; "));
        }
        write(&self.inner)
            .map_err(|e| e.to_string())?
            .insert(schema.path().path(), schema);
        Ok(())
    }

    fn remove(&self, path: &SchemaPath) -> Result<(), String> {
        let removed = write(&self.inner)
            .map_err(|e| e.to_string())?
            .remove(&path.path());
        match removed {
            Some(_) => Ok(()),
            None => Err(DomainError::SchemaNotFound {
                reference: path.path(),
            }
            .to_string()),
        }
    }
}

#[async_trait]
impl SchemaRepository for InMemorySchemaRepository {
    async fn load_schema(&self, path: &SchemaPath) -> StencilResult<Schema> {
        let inner = read(&self.inner)?;
        inner.get(&path.path()).cloned().ok_or_else(|| {
            DomainError::SchemaNotFound {
                reference: path.path(),
            }
            .into()
        })
    }

    async fn load_schemas(&self, paths: &[SchemaPath]) -> StencilResult<BTreeMap<String, Schema>> {
        let inner = read(&self.inner)?;
        Ok(paths
            .iter()
            .filter_map(|p| {
                let key = p.path();
                inner.get(&key).cloned().map(|s| (key, s))
            })
            .collect())
    }

    async fn exists(&self, path: &SchemaPath) -> StencilResult<bool> {
        Ok(read(&self.inner)?.contains_key(&path.path()))
    }

    async fn list_available(&self, filter: &PathFilter) -> StencilResult<Manifest> {
        let inner = read(&self.inner)?;
        Ok(Manifest::from_paths(
            inner.values().map(Schema::path).filter(|p| p.matches(filter)),
        ))
    }

    async fn save(&self, schema: Schema) -> StencilResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        outcome.record(schema.path().path(), self.insert(schema));
        Ok(outcome)
    }

    #[instrument(skip_all, fields(count = schemas.len()))]
    async fn save_all(&self, schemas: Vec<Schema>) -> StencilResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for schema in schemas {
            outcome.record(schema.path().path(), self.insert(schema));
        }
        Ok(outcome)
    }

    async fn delete(&self, path: &SchemaPath) -> StencilResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        outcome.record(path.path(), self.remove(path));
        Ok(outcome)
    }

    async fn delete_all(&self, paths: &[SchemaPath]) -> StencilResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for path in paths {
            outcome.record(path.path(), self.remove(path));
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

    async fn refresh(&self) -> StencilResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stencil_core::domain::{SchemaContent, TemplateContent};

    fn template(path: &str) -> PromptTemplate {
        PromptTemplate::new(
            TemplatePath::from_string(path).unwrap(),
            TemplateContent::create("Hello {name}").unwrap(),
        )
    }

    fn schema(path: &str, doc: Value) -> Schema {
        Schema::new(
            SchemaPath::from_string(path).unwrap(),
            SchemaContent::create(doc).unwrap(),
        )
    }

    #[tokio::test]
    async fn template_crud() {
        let repo = InMemoryTemplateRepository::new();
        let path = TemplatePath::from_string("to/task/f_task.md").unwrap();

        assert!(!repo.exists(&path).await.unwrap());
        repo.save(template("to/task/f_task.md")).await.unwrap();
        assert!(repo.exists(&path).await.unwrap());
        assert_eq!(
            repo.load_template(&path).await.unwrap().content().text(),
            "Hello {name}"
        );

        repo.delete(&path).await.unwrap();
        let err = repo.delete(&path).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::TemplateNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn builtin_store_lists_by_filter() {
        let repo = InMemoryTemplateRepository::with_builtin().unwrap();
        assert_eq!(repo.len(), 9);

        let manifest = repo
            .list_available(&PathFilter::new().directive("summary"))
            .await
            .unwrap();
        assert_eq!(manifest.total_count, 3);
        assert!(manifest.entries.iter().all(|e| e.directive == "summary"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let repo = InMemoryTemplateRepository::new();
        let clone = repo.clone();
        clone.save(template("a/b/c.md")).await.unwrap();
        assert_eq!(repo.len(), 1);
        repo.clear().unwrap();
        assert!(clone.is_empty());
    }

    #[tokio::test]
    async fn schema_batch_reports_each_item() {
        let repo = InMemorySchemaRepository::new();
        let outcome = repo
            .save_all(vec![
                schema("to/task/a.json", json!({"type": "object"})),
                schema("to/task/b.json", json!({"type": "object", "items": {"$ref": ""}})),
            ])
            .await
            .unwrap();
        assert_eq!(outcome.successful, ["to/task/a.json"]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].path, "to/task/b.json");

        let outcome = repo
            .delete_all(&[
                SchemaPath::from_string("to/task/a.json").unwrap(),
                SchemaPath::from_string("to/task/b.json").unwrap(),
            ])
            .await
            .unwrap();
        assert_eq!(outcome.successful, ["to/task/a.json"]);
        assert!(outcome.failed[0].error.contains("not found"));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn load_schemas_skips_missing() {
        let repo = InMemorySchemaRepository::new();
        repo.save(schema("to/task/a.json", json!({"type": "object"})))
            .await
            .unwrap();

        let loaded = repo
            .load_schemas(&[
                SchemaPath::from_string("to/task/a.json").unwrap(),
                SchemaPath::from_string("to/task/missing.json").unwrap(),
            ])
            .await
            .unwrap();
        assert_eq!(loaded.keys().collect::<Vec<_>>(), ["to/task/a.json"]);
    }

    #[tokio::test]
    async fn dependencies_come_from_refs() {
        let repo = InMemorySchemaRepository::new();
        repo.save(schema(
            "to/task/a.json",
            json!({"properties": {"x": {"$ref": "common/base/defs.json#/x"}}}),
        ))
        .await
        .unwrap();

        let deps = repo
            .get_dependencies(&SchemaPath::from_string("to/task/a.json").unwrap())
            .await
            .unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].path(), "common/base/defs.json");

        let missing = repo
            .get_dependencies(&SchemaPath::from_string("to/task/zzz.json").unwrap())
            .await;
        assert!(missing.is_err());
    }
}
