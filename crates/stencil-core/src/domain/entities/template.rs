//! The prompt template entity.
//!
//! A `PromptTemplate` is identified by its [`TemplatePath`]. Its content is
//! replaced only through [`PromptTemplate::update_content`], which hands back
//! a new instance; the original is never touched.

use crate::domain::{
    entities::metadata::ResourceMetadata,
    value_objects::{
        ChecksumAlgorithm, TemplateChecksum, TemplateContent, TemplatePath, TemplateVersion,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    path: TemplatePath,
    content: TemplateContent,
    metadata: ResourceMetadata,
}

impl PromptTemplate {
    pub fn create(
        path: TemplatePath,
        content: TemplateContent,
        metadata: ResourceMetadata,
    ) -> Self {
        Self {
            path,
            content,
            metadata,
        }
    }

    /// Template with default metadata (version `1.0.0`, timestamps now).
    pub fn new(path: TemplatePath, content: TemplateContent) -> Self {
        Self::create(path, content, ResourceMetadata::new())
    }

    pub fn path(&self) -> &TemplatePath {
        &self.path
    }

    pub fn content(&self) -> &TemplateContent {
        &self.content
    }

    pub fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    pub fn version(&self) -> &TemplateVersion {
        &self.metadata.version
    }

    pub fn required_variables(&self) -> &[String] {
        self.content.required_variables()
    }

    /// SHA-256 over the template text.
    pub fn checksum(&self) -> TemplateChecksum {
        TemplateChecksum::compute(self.content.text(), ChecksumAlgorithm::Sha256)
    }

    /// New instance carrying `content` and a refreshed `updated_at`.
    pub fn update_content(&self, content: TemplateContent) -> Self {
        Self {
            path: self.path.clone(),
            content,
            metadata: self.metadata.touched(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(text: &str) -> PromptTemplate {
        PromptTemplate::new(
            TemplatePath::create("to", "project", "f_project.md").unwrap(),
            TemplateContent::create(text).unwrap(),
        )
    }

    #[test]
    fn update_content_leaves_original_untouched() {
        let original = template("v1 {a}");
        let updated = original.update_content(TemplateContent::create("v2 {b}").unwrap());

        assert_eq!(original.content().text(), "v1 {a}");
        assert_eq!(updated.content().text(), "v2 {b}");
        assert_eq!(updated.path(), original.path());
        assert_eq!(updated.metadata().created_at, original.metadata().created_at);
        assert!(updated.metadata().updated_at >= original.metadata().updated_at);
        assert_eq!(updated.required_variables(), ["b"]);
    }

    #[test]
    fn checksum_tracks_text() {
        let t = template("hello");
        assert!(t.checksum().verify("hello"));
        assert!(!t.checksum().verify("hello!"));
    }

    #[test]
    fn default_version_is_one() {
        assert_eq!(template("x").version().to_string(), "1.0.0");
    }
}
