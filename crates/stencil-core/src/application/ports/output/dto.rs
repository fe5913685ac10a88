//! Data carried across the repository ports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::{ResourceKind, ResourcePath};

/// One listed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub path: String,
    pub directive: String,
    pub layer: String,
    pub filename: String,
}

impl<K: ResourceKind> From<&ResourcePath<K>> for ManifestEntry {
    fn from(p: &ResourcePath<K>) -> Self {
        Self {
            path: p.path(),
            directive: p.directive().to_string(),
            layer: p.layer().to_string(),
            filename: p.filename().to_string(),
        }
    }
}

/// Listing of what a repository holds, sorted by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    pub generated_at: DateTime<Utc>,
    pub total_count: usize,
}

impl Manifest {
    pub fn from_paths<'a, K, I>(paths: I) -> Self
    where
        K: ResourceKind + 'a,
        I: IntoIterator<Item = &'a ResourcePath<K>>,
    {
        let mut entries: Vec<ManifestEntry> = paths.into_iter().map(ManifestEntry::from).collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            total_count: entries.len(),
            entries,
            generated_at: Utc::now(),
        }
    }

    /// Entries parsed back into typed paths; unparsable entries are skipped.
    pub fn paths<K: ResourceKind>(&self) -> Vec<ResourcePath<K>> {
        self.entries
            .iter()
            .filter_map(|e| ResourcePath::create(&e.directive, &e.layer, &e.filename).ok())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub path: String,
    pub error: String,
}

/// Per-item outcome of a batch write or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub successful: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn record<E: std::fmt::Display>(&mut self, path: String, result: Result<(), E>) {
        match result {
            Ok(()) => self.successful.push(path),
            Err(e) => self.failed.push(BatchFailure {
                path,
                error: e.to_string(),
            }),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
