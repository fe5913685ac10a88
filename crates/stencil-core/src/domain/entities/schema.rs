use crate::domain::{
    entities::metadata::ResourceMetadata,
    value_objects::{SchemaContent, SchemaPath, TemplateVersion},
};

/// A schema document addressed by its [`SchemaPath`].
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    path: SchemaPath,
    content: SchemaContent,
    metadata: ResourceMetadata,
}

impl Schema {
    pub fn create(path: SchemaPath, content: SchemaContent, metadata: ResourceMetadata) -> Self {
        Self {
            path,
            content,
            metadata,
        }
    }

    pub fn new(path: SchemaPath, content: SchemaContent) -> Self {
        Self::create(path, content, ResourceMetadata::new())
    }

    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    pub fn content(&self) -> &SchemaContent {
        &self.content
    }

    pub fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    pub fn version(&self) -> &TemplateVersion {
        &self.metadata.version
    }

    /// `$ref` targets declared anywhere in the document.
    pub fn references(&self) -> &[String] {
        self.content.references()
    }

    /// New instance carrying `content` and a refreshed `updated_at`.
    pub fn update_content(&self, content: SchemaContent) -> Self {
        Self {
            path: self.path.clone(),
            content,
            metadata: self.metadata.touched(),
        }
    }
}
