//! `{stem}.meta.toml` metadata sidecars.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use stencil_core::{
    application::ApplicationError,
    domain::{ResourceMetadata, TemplateVersion},
    error::StencilResult,
};

use super::{created_at, io_error, modified_at};

const SUFFIX: &str = ".meta.toml";

#[derive(Debug, Default, Deserialize, Serialize)]
struct MetadataFile {
    #[serde(default)]
    metadata: MetadataSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct MetadataSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Sidecar location for a resource file: same directory, extension swapped.
pub(super) fn sidecar_path(resource: &Path) -> PathBuf {
    let stem = resource
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    resource.with_file_name(format!("{stem}{SUFFIX}"))
}

/// Metadata for the resource at `resource`.
///
/// Timestamps come from the resource file itself; version, author and
/// description from the sidecar when one exists.
pub(super) async fn read(resource: &Path) -> StencilResult<ResourceMetadata> {
    let mut metadata = ResourceMetadata::new();

    if let Ok(stat) = tokio::fs::metadata(resource).await {
        if let Some(updated) = modified_at(&stat) {
            let created = created_at(&stat).unwrap_or(updated);
            metadata = metadata.timestamps(created, updated);
        }
    }

    let path = sidecar_path(resource);
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(metadata),
        Err(e) => return Err(io_error(&path, &e)),
    };

    let file: MetadataFile = toml::from_str(&raw).map_err(|e| ApplicationError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    debug!(sidecar = %path.display(), "metadata sidecar loaded");

    let section = file.metadata;
    if let Some(version) = section.version {
        metadata = metadata.version(TemplateVersion::create(&version)?);
    }
    if let Some(author) = section.author {
        metadata = metadata.author(author);
    }
    if let Some(description) = section.description {
        metadata = metadata.description(description);
    }
    Ok(metadata)
}

/// Write the sidecar for `resource`.
pub(super) async fn write(resource: &Path, metadata: &ResourceMetadata) -> StencilResult<()> {
    let file = MetadataFile {
        metadata: MetadataSection {
            version: Some(metadata.version.to_string()),
            author: metadata.author.clone(),
            description: metadata.description.clone(),
        },
    };
    let text = toml::to_string(&file).map_err(|e| ApplicationError::Repository {
        operation: "write metadata",
        reason: e.to_string(),
    })?;

    let path = sidecar_path(resource);
    tokio::fs::write(&path, text)
        .await
        .map_err(|e| io_error(&path, &e))
}

/// Remove the sidecar for `resource`; a missing sidecar is fine.
pub(super) async fn remove(resource: &Path) -> StencilResult<()> {
    let path = sidecar_path(resource);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(&path, &e)),
    }
}
