//! Markdown templates on disk.

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use stencil_core::{
    application::ports::{Manifest, TemplateRepository},
    domain::{
        DomainError, PathFilter, PromptTemplate, TemplateContent, TemplatePath,
        value_objects::TemplateKind,
    },
    error::StencilResult,
};

use super::{ensure_parent, io_error, resource_file, sidecar, walk};

/// Template repository rooted at a base directory.
#[derive(Debug, Clone)]
pub struct FileTemplateRepository {
    base: PathBuf,
}

impl FileTemplateRepository {
    /// The directory does not need to exist; listing it yields nothing and
    /// the first `save` creates it.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &std::path::Path {
        &self.base
    }

    fn file(&self, path: &TemplatePath) -> PathBuf {
        resource_file(&self.base, path)
    }
}

#[async_trait]
impl TemplateRepository for FileTemplateRepository {
    #[instrument(skip_all, fields(path = %path))]
    async fn load_template(&self, path: &TemplatePath) -> StencilResult<PromptTemplate> {
        let file = self.file(path);
        let text = match tokio::fs::read_to_string(&file).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DomainError::TemplateNotFound {
                    reference: path.path(),
                }
                .into());
            }
            Err(e) => return Err(io_error(&file, &e)),
        };

        let metadata = sidecar::read(&file).await?;
        let content = TemplateContent::create(text)?.with_last_modified(metadata.updated_at);
        debug!(variables = content.required_variables().len(), "template loaded");

        Ok(PromptTemplate::create(path.clone(), content, metadata))
    }

    async fn exists(&self, path: &TemplatePath) -> StencilResult<bool> {
        let file = self.file(path);
        tokio::fs::try_exists(&file)
            .await
            .map_err(|e| io_error(&file, &e))
    }

    async fn list_available(&self, filter: &PathFilter) -> StencilResult<Manifest> {
        let paths = walk::list::<TemplateKind>(self.base.clone(), filter.clone()).await?;
        Ok(Manifest::from_paths(&paths))
    }

    #[instrument(skip_all, fields(path = %template.path()))]
    async fn save(&self, template: PromptTemplate) -> StencilResult<()> {
        let file = self.file(template.path());
        ensure_parent(&file).await?;

        tokio::fs::write(&file, template.content().text())
            .await
            .map_err(|e| io_error(&file, &e))?;
        sidecar::write(&file, template.metadata()).await?;

        debug!(file = %file.display(), "template written");
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path))]
    async fn delete(&self, path: &TemplatePath) -> StencilResult<()> {
        let file = self.file(path);
        match tokio::fs::remove_file(&file).await {
            Ok(()) => sidecar::remove(&file).await,
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DomainError::TemplateNotFound {
                reference: path.path(),
            }
            .into()),
            Err(e) => Err(io_error(&file, &e)),
        }
    }

    /// Nothing is cached; every call reads the disk.
    async fn refresh(&self) -> StencilResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use stencil_core::domain::{ResourceMetadata, TemplateVersion};
    use tempfile::TempDir;

    fn path(s: &str) -> TemplatePath {
        TemplatePath::from_string(s).unwrap()
    }

    #[tokio::test]
    async fn loads_from_directive_layer_layout() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("to/task")).unwrap();
        fs::write(root.path().join("to/task/f_task.md"), "Do {input_text}").unwrap();

        let repo = FileTemplateRepository::new(root.path());
        let template = repo.load_template(&path("to/task/f_task.md")).await.unwrap();
        assert_eq!(template.content().text(), "Do {input_text}");
        assert_eq!(template.required_variables(), ["input_text"]);
        assert!(repo.exists(&path("to/task/f_task.md")).await.unwrap());
    }

    #[tokio::test]
    async fn missing_file_is_template_not_found() {
        let root = TempDir::new().unwrap();
        let repo = FileTemplateRepository::new(root.path());

        let err = repo
            .load_template(&path("to/task/f_task.md"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::TemplateNotFound { .. })
        ));
        assert!(!repo.exists(&path("to/task/f_task.md")).await.unwrap());
    }

    #[tokio::test]
    async fn save_writes_file_and_sidecar() {
        let root = TempDir::new().unwrap();
        let repo = FileTemplateRepository::new(root.path().join("templates"));

        let template = PromptTemplate::create(
            path("summary/issue/summary_issue.md"),
            TemplateContent::create("Summarize {input_text}").unwrap(),
            ResourceMetadata::new()
                .version(TemplateVersion::new(1, 2, 0))
                .author("ops"),
        );
        repo.save(template).await.unwrap();

        let dir = root.path().join("templates/summary/issue");
        assert!(dir.join("summary_issue.md").exists());
        assert!(dir.join("summary_issue.meta.toml").exists());

        let back = repo
            .load_template(&path("summary/issue/summary_issue.md"))
            .await
            .unwrap();
        assert_eq!(back.version(), &TemplateVersion::new(1, 2, 0));
        assert_eq!(back.metadata().author.as_deref(), Some("ops"));
    }

    #[tokio::test]
    async fn list_and_delete() {
        let root = TempDir::new().unwrap();
        let repo = FileTemplateRepository::new(root.path());
        for p in ["to/task/a.md", "to/issue/b.md", "defect/task/c.md"] {
            repo.save(PromptTemplate::new(
                path(p),
                TemplateContent::create("x").unwrap(),
            ))
            .await
            .unwrap();
        }

        let manifest = repo
            .list_available(&PathFilter::new().layer("task"))
            .await
            .unwrap();
        let listed: Vec<&str> = manifest.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(listed, ["defect/task/c.md", "to/task/a.md"]);

        repo.delete(&path("to/task/a.md")).await.unwrap();
        assert!(!root.path().join("to/task/a.meta.toml").exists());
        assert!(repo.delete(&path("to/task/a.md")).await.is_err());
        assert_eq!(
            repo.list_available(&PathFilter::new()).await.unwrap().total_count,
            2
        );
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("to/task")).unwrap();
        fs::write(root.path().join("to/task/f_task.md"), "").unwrap();

        let repo = FileTemplateRepository::new(root.path());
        let err = repo
            .load_template(&path("to/task/f_task.md"))
            .await
            .unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::EmptyContent));
    }
}
