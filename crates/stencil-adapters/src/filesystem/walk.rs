//! Directory listing shared by both file repositories.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use stencil_core::{
    application::ApplicationError,
    domain::{
        PathFilter,
        value_objects::{ResourceKind, ResourcePath},
    },
    error::StencilResult,
};

/// Every `K` resource under `base` that passes `filter`, sorted by path.
///
/// A missing base directory is an empty listing. Entries whose relative
/// path does not parse as `directive/layer/filename` are skipped.
pub(super) async fn list<K>(
    base: PathBuf,
    filter: PathFilter,
) -> StencilResult<Vec<ResourcePath<K>>>
where
    K: ResourceKind + Send + 'static,
{
    if !tokio::fs::try_exists(&base).await.unwrap_or(false) {
        debug!(base = %base.display(), "base directory missing, nothing to list");
        return Ok(Vec::new());
    }

    let paths = tokio::task::spawn_blocking(move || scan::<K>(&base, &filter))
        .await
        .map_err(|e| ApplicationError::Repository {
            operation: "list",
            reason: e.to_string(),
        })??;

    Ok(paths)
}

fn scan<K: ResourceKind>(base: &Path, filter: &PathFilter) -> StencilResult<Vec<ResourcePath<K>>> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(base).min_depth(3).sort_by_file_name() {
        let entry = entry.map_err(|e| ApplicationError::Repository {
            operation: "list",
            reason: format!("directory walk error: {e}"),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        let relative = normalize_path(&relative.to_string_lossy());
        if !relative.ends_with(K::EXTENSION) {
            continue;
        }

        match ResourcePath::<K>::from_string(&relative) {
            Ok(path) if path.matches(filter) => paths.push(path),
            Ok(_) => {}
            Err(e) => warn!(path = %relative, error = %e, "skipping unparsable entry"),
        }
    }

    paths.sort_by_key(|p| p.path());
    Ok(paths)
}

fn normalize_path(p: &str) -> String {
    p.replace('\\', "/")
}
