//! Command handlers plus the wiring they share.

pub mod generate;
pub mod list;
pub mod resolve;
pub mod schemas;

use std::sync::Arc;

use tracing::{debug, info};

use stencil_adapters::{FileSchemaRepository, FileTemplateRepository, InMemoryTemplateRepository};
use stencil_core::{
    application::{
        ResolveOptions,
        ports::{SchemaRepository, TemplateRepository},
    },
    domain::PathFilter,
};

use crate::{
    cli::{FilterArgs, TargetArgs},
    config::AppConfig,
    error::CliResult,
};

/// Repositories selected from configuration.
pub struct Stores {
    pub templates: Arc<dyn TemplateRepository>,
    pub schemas: Arc<dyn SchemaRepository>,
}

impl Stores {
    /// File-backed stores, except that a missing template directory falls
    /// back to the built-in templates.
    pub fn from_config(config: &AppConfig) -> CliResult<Self> {
        let templates: Arc<dyn TemplateRepository> = if config.templates_dir.is_dir() {
            debug!(dir = %config.templates_dir.display(), "using template directory");
            Arc::new(FileTemplateRepository::new(&config.templates_dir))
        } else {
            info!(
                dir = %config.templates_dir.display(),
                "template directory missing, using built-in templates"
            );
            Arc::new(InMemoryTemplateRepository::with_builtin()?)
        };

        Ok(Self {
            templates,
            schemas: Arc::new(FileSchemaRepository::new(&config.schemas_dir)),
        })
    }
}

pub fn filter_from(args: &FilterArgs) -> PathFilter {
    let mut filter = PathFilter::new();
    if let Some(d) = &args.directive {
        filter = filter.directive(d.clone());
    }
    if let Some(l) = &args.layer {
        filter = filter.layer(l.clone());
    }
    filter
}

/// Flags win over configuration.
pub fn resolve_options(target: &TargetArgs, config: &AppConfig) -> ResolveOptions {
    let mut options = ResolveOptions::default()
        .strict(target.strict || config.strict)
        .fallback_enabled(config.fallback_enabled);
    if let Some(path) = &target.path {
        options = options.custom_path(path.clone());
    }
    options
}
