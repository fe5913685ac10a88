use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::TemplateVersion;

/// Descriptive information shared by templates and schemas.
///
/// Other fields get sensible defaults through [`ResourceMetadata::new`]:
/// - `version`: `1.0.0`
/// - `author`, `description`: none
/// - `created_at`, `updated_at`: now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub version: TemplateVersion,
    pub author: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceMetadata {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            version: TemplateVersion::default(),
            author: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn version(mut self, version: TemplateVersion) -> Self {
        self.version = version;
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Pin both timestamps (reconstruction from storage).
    pub fn timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    pub(crate) fn touched(&self) -> Self {
        Self {
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}

impl Default for ResourceMetadata {
    fn default() -> Self {
        Self::new()
    }
}
