//! Filesystem repositories.
//!
//! Resources live at `{base}/{directive}/{layer}/{filename}`. Each may carry
//! an optional `{stem}.meta.toml` sidecar next to it:
//!
//! ```toml
//! [metadata]
//! version     = "1.2.0"
//! author      = "platform-team"   # optional
//! description = "Task breakdown"  # optional
//! ```

mod schemas;
mod sidecar;
mod templates;
mod walk;

use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use stencil_core::{
    application::ApplicationError,
    domain::value_objects::{ResourceKind, ResourcePath},
    error::StencilError,
};

pub use schemas::FileSchemaRepository;
pub use templates::FileTemplateRepository;

fn resource_file<K: ResourceKind>(base: &Path, path: &ResourcePath<K>) -> PathBuf {
    let mut file = base.join(path.directive()).join(path.layer());
    for segment in path.filename().split('/') {
        file.push(segment);
    }
    file
}

fn io_error(path: &Path, err: &io::Error) -> StencilError {
    ApplicationError::io(path, err).into()
}

fn modified_at(meta: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    meta.modified().ok().map(DateTime::<Utc>::from)
}

fn created_at(meta: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    meta.created().ok().map(DateTime::<Utc>::from)
}

async fn ensure_parent(file: &Path) -> Result<(), StencilError> {
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, &e))?;
    }
    Ok(())
}
