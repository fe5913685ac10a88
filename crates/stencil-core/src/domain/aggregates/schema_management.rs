//! Schema management aggregate: owns a [`SchemaRegistry`] and tracks sync
//! bookkeeping for a named collection of schemas.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    aggregates::schema_registry::{DependencyReport, SchemaRegistry},
    entities::Schema,
    error::DomainError,
    value_objects::{PathFilter, SchemaPath},
};

/// A schema that could not be imported, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub path: SchemaPath,
    pub error_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub successful: Vec<SchemaPath>,
    pub failed: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SchemaManagementAggregate {
    id: String,
    registry: SchemaRegistry,
    last_sync: Option<DateTime<Utc>>,
    schema_count: usize,
}

impl SchemaManagementAggregate {
    /// # Errors
    ///
    /// `EmptyId` if `id` is blank.
    pub fn create(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::EmptyId);
        }
        Ok(Self {
            id,
            registry: SchemaRegistry::new(),
            last_sync: None,
            schema_count: 0,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    pub fn schema_count(&self) -> usize {
        self.schema_count
    }

    /// Register every schema, collecting failures instead of stopping.
    ///
    /// `last_sync` and `schema_count` are refreshed even if every import
    /// failed.
    pub fn import_schemas(&mut self, schemas: impl IntoIterator<Item = Schema>) -> ImportReport {
        let mut report = ImportReport::default();

        for schema in schemas {
            let path = schema.path().clone();
            match self.registry.register(schema) {
                Ok(()) => report.successful.push(path),
                Err(e) => report.failed.push(ImportFailure {
                    path,
                    error_message: e.to_string(),
                }),
            }
        }

        self.last_sync = Some(Utc::now());
        self.schema_count = self.registry.len();
        report
    }

    pub fn remove_schema(&mut self, path: &SchemaPath) -> bool {
        let removed = self.registry.remove(path);
        self.schema_count = self.registry.len();
        removed
    }

    pub fn get_schema(&self, path: &SchemaPath) -> Option<&Schema> {
        self.registry.get(path)
    }

    pub fn list_schemas(&self, filter: &PathFilter) -> Vec<&Schema> {
        self.registry.list(filter)
    }

    pub fn validate_dependencies(&self) -> DependencyReport {
        self.registry.validate_dependencies()
    }

    pub fn clear(&mut self) {
        self.registry.clear();
        self.schema_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SchemaContent;
    use serde_json::json;

    fn schema(path: &str, reference: Option<&str>) -> Schema {
        let doc = match reference {
            Some(r) => json!({ "type": "object", "properties": { "x": { "$ref": r } } }),
            None => json!({ "type": "object" }),
        };
        Schema::new(
            SchemaPath::from_string(path).unwrap(),
            SchemaContent::create(doc).unwrap(),
        )
    }

    #[test]
    fn blank_id_is_rejected() {
        assert_eq!(
            SchemaManagementAggregate::create("  ").unwrap_err(),
            DomainError::EmptyId
        );
    }

    #[test]
    fn import_collects_partial_failures() {
        let mut agg = SchemaManagementAggregate::create("workspace").unwrap();
        let report = agg.import_schemas([
            schema("to/task/a.json", None),
            schema("to/task/b.json", Some("")),
            schema("to/issue/c.json", Some("to/task/a.json")),
        ]);

        assert_eq!(report.successful.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path.path(), "to/task/b.json");
        assert!(!report.is_complete());
        assert_eq!(agg.schema_count(), 2);
        assert!(agg.last_sync().is_some());
    }

    #[test]
    fn sync_bookkeeping_updates_even_when_all_fail() {
        let mut agg = SchemaManagementAggregate::create("workspace").unwrap();
        let report = agg.import_schemas([schema("to/task/b.json", Some(" "))]);

        assert!(report.successful.is_empty());
        assert_eq!(agg.schema_count(), 0);
        assert!(agg.last_sync().is_some());
    }

    #[test]
    fn remove_updates_count() {
        let mut agg = SchemaManagementAggregate::create("workspace").unwrap();
        agg.import_schemas([schema("to/task/a.json", None)]);
        assert!(agg.remove_schema(&SchemaPath::from_string("to/task/a.json").unwrap()));
        assert_eq!(agg.schema_count(), 0);
    }
}
