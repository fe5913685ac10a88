//! Pull schemas from a repository into a [`SchemaManagementAggregate`] and
//! check the resulting reference graph.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::application::ports::SchemaRepository;
use crate::domain::{
    aggregates::{DependencyReport, ImportFailure, ImportReport, SchemaManagementAggregate},
    value_objects::{PathFilter, SchemaKind, SchemaPath},
};
use crate::error::StencilResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub listed: usize,
    pub import: ImportReport,
    pub dependencies: DependencyReport,
}

pub struct SchemaSyncService {
    schemas: Arc<dyn SchemaRepository>,
}

impl SchemaSyncService {
    pub fn new(schemas: Arc<dyn SchemaRepository>) -> Self {
        Self { schemas }
    }

    /// List → load → import → validate.
    ///
    /// Listed schemas the repository could not load show up as import
    /// failures rather than aborting the sync.
    #[instrument(skip_all, fields(aggregate = aggregate.id()))]
    pub async fn sync(
        &self,
        aggregate: &mut SchemaManagementAggregate,
        filter: &PathFilter,
    ) -> StencilResult<SyncReport> {
        let manifest = self.schemas.list_available(filter).await?;
        let paths: Vec<SchemaPath> = manifest.paths::<SchemaKind>();
        let loaded = self.schemas.load_schemas(&paths).await?;

        let unloaded: Vec<SchemaPath> = paths
            .iter()
            .filter(|p| !loaded.contains_key(&p.path()))
            .cloned()
            .collect();

        let mut import = aggregate.import_schemas(loaded.into_values());
        for path in unloaded {
            warn!(schema = %path, "Listed schema could not be loaded");
            import.failed.push(ImportFailure {
                path,
                error_message: "schema could not be loaded".into(),
            });
        }

        let dependencies = aggregate.validate_dependencies();
        info!(
            listed = paths.len(),
            imported = import.successful.len(),
            failed = import.failed.len(),
            missing = dependencies.missing.len(),
            cycles = dependencies.circular.len(),
            "Schema sync complete"
        );

        Ok(SyncReport {
            listed: paths.len(),
            import,
            dependencies,
        })
    }
}
