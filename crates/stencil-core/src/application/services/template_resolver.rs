//! Template resolution: a priority-ordered chain of strategies that turn a
//! `(directive, layer)` request into a loaded template and optional schema.
//!
//! ```text
//! ExactPath (100) ──► StandardNaming (80) ──► Fallback (50)
//!   --path given       f_{layer}.md             static table
//! ```
//!
//! The first applicable strategy that succeeds wins; if none does, every
//! attempted strategy's message is folded into one `TemplateNotFound`.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::application::ports::{SchemaRepository, TemplateRepository};
use crate::domain::{
    DomainError,
    entities::{PromptTemplate, Schema},
    policy::StandardSelection,
    value_objects::{SchemaKind, SchemaPath, TemplatePath, TemplateVersion},
};
use crate::error::StencilResult;

/// Options for a single resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Explicit `directive/layer/filename`; enables [`ExactPathStrategy`].
    pub custom_path: Option<String>,
    /// Requested version; an incompatible template only yields a warning.
    pub version: Option<String>,
    /// Make a missing schema fatal for [`StandardNamingStrategy`].
    pub strict: bool,
    pub fallback_enabled: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            custom_path: None,
            version: None,
            strict: false,
            fallback_enabled: true,
        }
    }
}

impl ResolveOptions {
    pub fn custom_path(mut self, path: impl Into<String>) -> Self {
        self.custom_path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn fallback_enabled(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub directive: String,
    pub layer: String,
    pub options: ResolveOptions,
}

impl ResolveRequest {
    pub fn new(directive: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            layer: layer.into(),
            options: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTemplate {
    #[serde(skip)]
    pub template: PromptTemplate,
    #[serde(skip)]
    pub schema: Option<Schema>,
    pub template_path: TemplatePath,
    pub schema_path: Option<SchemaPath>,
    pub strategy: String,
    pub fallback_used: bool,
    pub warnings: Vec<String>,
}

impl ResolvedTemplate {
    fn new(template: PromptTemplate, schema: Option<Schema>, strategy: &str) -> Self {
        Self {
            template_path: template.path().clone(),
            schema_path: schema.as_ref().map(|s| s.path().clone()),
            template,
            schema,
            strategy: strategy.to_string(),
            fallback_used: false,
            warnings: Vec::new(),
        }
    }
}

/// The two repositories every strategy reads from.
#[derive(Clone)]
pub struct Repositories {
    pub templates: Arc<dyn TemplateRepository>,
    pub schemas: Arc<dyn SchemaRepository>,
}

#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Higher runs first.
    fn priority(&self) -> i32;

    fn is_applicable(&self, request: &ResolveRequest) -> bool;

    async fn resolve(
        &self,
        request: &ResolveRequest,
        repos: &Repositories,
    ) -> StencilResult<ResolvedTemplate>;
}

// ============================================================================
// Built-in strategies
// ============================================================================

/// Loads the template named by [`ResolveOptions::custom_path`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactPathStrategy;

#[async_trait]
impl ResolutionStrategy for ExactPathStrategy {
    fn name(&self) -> &str {
        "exact-path"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn is_applicable(&self, request: &ResolveRequest) -> bool {
        request.options.custom_path.is_some()
    }

    async fn resolve(
        &self,
        request: &ResolveRequest,
        repos: &Repositories,
    ) -> StencilResult<ResolvedTemplate> {
        let raw = request.options.custom_path.as_deref().unwrap_or_default();
        let path = TemplatePath::from_string(raw)?;

        if !repos.templates.exists(&path).await? {
            return Err(DomainError::TemplateNotFound {
                reference: path.path(),
            }
            .into());
        }
        let template = repos.templates.load_template(&path).await?;

        let schema_path = path.counterpart::<SchemaKind>();
        let schema = match repos.schemas.load_schema(&schema_path).await {
            Ok(schema) => Some(schema),
            Err(e) => {
                debug!(schema = %schema_path, error = %e, "No schema beside exact template");
                None
            }
        };

        Ok(ResolvedTemplate::new(template, schema, self.name()))
    }
}

/// `directive/layer/f_{layer}.md` with its `.json` schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNamingStrategy;

impl StandardNamingStrategy {
    pub fn template_path(directive: &str, layer: &str) -> Result<TemplatePath, DomainError> {
        TemplatePath::create(directive, layer, StandardSelection::filename_for(layer))
    }
}

#[async_trait]
impl ResolutionStrategy for StandardNamingStrategy {
    fn name(&self) -> &str {
        "standard-naming"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn is_applicable(&self, _request: &ResolveRequest) -> bool {
        true
    }

    async fn resolve(
        &self,
        request: &ResolveRequest,
        repos: &Repositories,
    ) -> StencilResult<ResolvedTemplate> {
        let path = Self::template_path(&request.directive, &request.layer)?;
        let template = repos.templates.load_template(&path).await?;
        let mut warnings = Vec::new();

        if let Some(requested) = &request.options.version {
            let requested = TemplateVersion::create(requested)?;
            if !template.version().is_compatible_with(&requested) {
                let conflict = DomainError::VersionConflict {
                    requested: requested.to_string(),
                    found: template.version().to_string(),
                };
                warn!(template = %path, "{conflict}");
                warnings.push(conflict.to_string());
            }
        }

        let schema_path = path.counterpart::<SchemaKind>();
        let schema = match repos.schemas.load_schema(&schema_path).await {
            Ok(schema) => Some(schema),
            Err(e) if request.options.strict => return Err(e),
            Err(e) => {
                warnings.push(format!("Schema {schema_path} unavailable: {e}"));
                None
            }
        };

        let mut resolved = ResolvedTemplate::new(template, schema, self.name());
        resolved.warnings = warnings;
        Ok(resolved)
    }
}

/// Default `(directive, layer) → filename` mappings.
pub const DEFAULT_FALLBACKS: [(&str, &str, &str); 9] = [
    ("to", "project", "default_project.md"),
    ("to", "issue", "default_issue.md"),
    ("to", "task", "default_task.md"),
    ("summary", "project", "summary_project.md"),
    ("summary", "issue", "summary_issue.md"),
    ("summary", "task", "summary_task.md"),
    ("defect", "project", "defect_project.md"),
    ("defect", "issue", "defect_issue.md"),
    ("defect", "task", "defect_task.md"),
];

/// Static table lookup, used when nothing more specific exists.
#[derive(Debug, Clone)]
pub struct FallbackStrategy {
    mappings: Vec<(String, String, String)>,
}

impl Default for FallbackStrategy {
    fn default() -> Self {
        Self::with_mappings(DEFAULT_FALLBACKS)
    }
}

impl FallbackStrategy {
    pub fn with_mappings<I, S>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        Self {
            mappings: mappings
                .into_iter()
                .map(|(d, l, f)| (d.into(), l.into(), f.into()))
                .collect(),
        }
    }

    pub fn lookup(&self, directive: &str, layer: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|(d, l, _)| d == directive && l == layer)
            .map(|(_, _, f)| f.as_str())
    }
}

#[async_trait]
impl ResolutionStrategy for FallbackStrategy {
    fn name(&self) -> &str {
        "fallback"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn is_applicable(&self, request: &ResolveRequest) -> bool {
        request.options.fallback_enabled
    }

    async fn resolve(
        &self,
        request: &ResolveRequest,
        repos: &Repositories,
    ) -> StencilResult<ResolvedTemplate> {
        let filename = self
            .lookup(&request.directive, &request.layer)
            .ok_or_else(|| DomainError::TemplateNotFound {
                reference: format!(
                    "no fallback mapping for {}/{}",
                    request.directive, request.layer
                ),
            })?;

        let path = TemplatePath::create(&request.directive, &request.layer, filename)?;
        let template = repos.templates.load_template(&path).await?;
        let schema = repos
            .schemas
            .load_schema(&path.counterpart::<SchemaKind>())
            .await
            .ok();

        let mut resolved = ResolvedTemplate::new(template, schema, self.name());
        resolved.fallback_used = true;
        resolved
            .warnings
            .push(format!("Using fallback template {filename}"));
        Ok(resolved)
    }
}

// ============================================================================
// Service
// ============================================================================

pub struct TemplateResolverService {
    repos: Repositories,
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
}

impl TemplateResolverService {
    /// Resolver with the three built-in strategies.
    pub fn new(
        templates: Arc<dyn TemplateRepository>,
        schemas: Arc<dyn SchemaRepository>,
    ) -> Self {
        let mut service = Self {
            repos: Repositories { templates, schemas },
            strategies: vec![
                Arc::new(ExactPathStrategy),
                Arc::new(StandardNamingStrategy),
                Arc::new(FallbackStrategy::default()),
            ],
        };
        service.sort();
        service
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    /// Strategy names in evaluation order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn add_strategy(&mut self, strategy: Arc<dyn ResolutionStrategy>) {
        self.strategies.push(strategy);
        self.sort();
    }

    /// Returns `false` if no strategy had that name.
    pub fn remove_strategy(&mut self, name: &str) -> bool {
        let before = self.strategies.len();
        self.strategies.retain(|s| s.name() != name);
        self.sort();
        self.strategies.len() != before
    }

    fn sort(&mut self) {
        self.strategies.sort_by_key(|s| Reverse(s.priority()));
    }

    #[instrument(skip_all, fields(directive = %request.directive, layer = %request.layer))]
    pub async fn resolve(&self, request: &ResolveRequest) -> StencilResult<ResolvedTemplate> {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            if !strategy.is_applicable(request) {
                continue;
            }
            match strategy.resolve(request, &self.repos).await {
                Ok(resolved) => {
                    info!(
                        strategy = strategy.name(),
                        template = %resolved.template_path,
                        fallback = resolved.fallback_used,
                        "Template resolved"
                    );
                    return Ok(resolved);
                }
                Err(e) => {
                    debug!(strategy = strategy.name(), error = %e, "Strategy failed");
                    failures.push(format!("{}: {e}", strategy.name()));
                }
            }
        }

        Err(DomainError::TemplateNotFound {
            reference: format!(
                "{}/{} [{}]",
                request.directive,
                request.layer,
                failures.join("; ")
            ),
        }
        .into())
    }

    /// Cheap probe of the exact or standard path; never errors.
    #[instrument(skip_all, fields(directive = %directive, layer = %layer))]
    pub async fn exists(&self, directive: &str, layer: &str, options: &ResolveOptions) -> bool {
        let path = match &options.custom_path {
            Some(raw) => TemplatePath::from_string(raw),
            None => StandardNamingStrategy::template_path(directive, layer),
        };
        match path {
            Ok(path) => self.repos.templates.exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockSchemaRepository, MockTemplateRepository};
    use crate::domain::{
        entities::ResourceMetadata,
        value_objects::{SchemaContent, TemplateContent},
    };
    use serde_json::json;

    fn template(path: &str, version: &str) -> PromptTemplate {
        PromptTemplate::create(
            TemplatePath::from_string(path).unwrap(),
            TemplateContent::create("Hello {name}").unwrap(),
            ResourceMetadata::new().version(TemplateVersion::create(version).unwrap()),
        )
    }

    fn schema(path: &str) -> Schema {
        Schema::new(
            SchemaPath::from_string(path).unwrap(),
            SchemaContent::create(json!({"type": "object"})).unwrap(),
        )
    }

    fn not_found(path: &TemplatePath) -> crate::error::StencilError {
        DomainError::TemplateNotFound {
            reference: path.path(),
        }
        .into()
    }

    /// Template repo that knows exactly `known` (paths with version 1.0.0).
    fn templates(known: &[&'static str]) -> MockTemplateRepository {
        let known: Vec<&'static str> = known.to_vec();
        let mut mock = MockTemplateRepository::new();
        let k = known.clone();
        mock.expect_exists()
            .returning(move |p| Ok(k.iter().any(|k| *k == p.path())));
        mock.expect_load_template().returning(move |p| {
            if known.iter().any(|k| *k == p.path()) {
                Ok(template(&p.path(), "1.0.0"))
            } else {
                Err(not_found(p))
            }
        });
        mock
    }

    fn schemas(known: &[&'static str]) -> MockSchemaRepository {
        let known: Vec<&'static str> = known.to_vec();
        let mut mock = MockSchemaRepository::new();
        mock.expect_load_schema().returning(move |p| {
            if known.iter().any(|k| *k == p.path()) {
                Ok(schema(&p.path()))
            } else {
                Err(DomainError::SchemaNotFound {
                    reference: p.path(),
                }
                .into())
            }
        });
        mock
    }

    fn service(t: MockTemplateRepository, s: MockSchemaRepository) -> TemplateResolverService {
        TemplateResolverService::new(Arc::new(t), Arc::new(s))
    }

    #[test]
    fn default_order_is_by_priority() {
        let svc = service(MockTemplateRepository::new(), MockSchemaRepository::new());
        assert_eq!(
            svc.strategy_names(),
            ["exact-path", "standard-naming", "fallback"]
        );
    }

    #[tokio::test]
    async fn standard_naming_with_schema() {
        let svc = service(
            templates(&["to/task/f_task.md"]),
            schemas(&["to/task/f_task.json"]),
        );
        let resolved = svc.resolve(&ResolveRequest::new("to", "task")).await.unwrap();

        assert_eq!(resolved.strategy, "standard-naming");
        assert!(!resolved.fallback_used);
        assert!(resolved.warnings.is_empty());
        assert_eq!(
            resolved.schema.unwrap().path().path(),
            "to/task/f_task.json"
        );
    }

    #[tokio::test]
    async fn missing_schema_is_a_warning_unless_strict() {
        let svc = service(templates(&["to/task/f_task.md"]), schemas(&[]));

        let resolved = svc.resolve(&ResolveRequest::new("to", "task")).await.unwrap();
        assert!(resolved.schema.is_none());
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("to/task/f_task.json"));

        let strict = ResolveRequest::new("to", "task")
            .with_options(ResolveOptions::default().strict(true).fallback_enabled(false));
        let err = svc.resolve(&strict).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::TemplateNotFound { reference })
                if reference.contains("Schema not found")
        ));
    }

    #[tokio::test]
    async fn version_mismatch_is_a_warning() {
        let svc = service(
            templates(&["to/task/f_task.md"]),
            schemas(&["to/task/f_task.json"]),
        );
        let request = ResolveRequest::new("to", "task")
            .with_options(ResolveOptions::default().version("2.0.0"));
        let resolved = svc.resolve(&request).await.unwrap();

        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("Version conflict"));
    }

    #[tokio::test]
    async fn exact_path_wins_and_tolerates_missing_schema() {
        let svc = service(
            templates(&["custom/area/mine.md", "custom/area/f_area.md"]),
            schemas(&[]),
        );
        let request = ResolveRequest::new("custom", "area")
            .with_options(ResolveOptions::default().custom_path("custom/area/mine.md"));
        let resolved = svc.resolve(&request).await.unwrap();

        assert_eq!(resolved.strategy, "exact-path");
        assert_eq!(resolved.template_path.path(), "custom/area/mine.md");
        assert!(resolved.schema.is_none());
        assert!(resolved.warnings.is_empty());
    }

    #[tokio::test]
    async fn fallback_only_mapping() {
        let svc = service(templates(&["to/task/default_task.md"]), schemas(&[]));
        let resolved = svc.resolve(&ResolveRequest::new("to", "task")).await.unwrap();

        assert!(resolved.fallback_used);
        assert_eq!(resolved.strategy, "fallback");
        assert!(resolved.warnings.iter().any(|w| w.contains("default_task.md")));
    }

    #[tokio::test]
    async fn failures_are_aggregated() {
        let svc = service(templates(&[]), schemas(&[]));
        let request = ResolveRequest::new("to", "task")
            .with_options(ResolveOptions::default().custom_path("bad"));
        let err = svc.resolve(&request).await.unwrap_err();

        let Some(DomainError::TemplateNotFound { reference }) = err.as_domain() else {
            panic!("unexpected error: {err:?}");
        };
        assert!(reference.contains("exact-path"));
        assert!(reference.contains("standard-naming"));
        assert!(reference.contains("fallback"));
    }

    #[tokio::test]
    async fn disabled_fallback_is_skipped() {
        let svc = service(templates(&["to/task/default_task.md"]), schemas(&[]));
        let request = ResolveRequest::new("to", "task")
            .with_options(ResolveOptions::default().fallback_enabled(false));
        let err = svc.resolve(&request).await.unwrap_err();

        let Some(DomainError::TemplateNotFound { reference }) = err.as_domain() else {
            panic!("unexpected error: {err:?}");
        };
        assert!(!reference.contains("fallback:"));
    }

    struct Pinned;

    #[async_trait]
    impl ResolutionStrategy for Pinned {
        fn name(&self) -> &str {
            "pinned"
        }
        fn priority(&self) -> i32 {
            200
        }
        fn is_applicable(&self, _request: &ResolveRequest) -> bool {
            true
        }
        async fn resolve(
            &self,
            _request: &ResolveRequest,
            _repos: &Repositories,
        ) -> StencilResult<ResolvedTemplate> {
            Ok(ResolvedTemplate::new(
                template("pinned/one/p.md", "1.0.0"),
                None,
                self.name(),
            ))
        }
    }

    #[tokio::test]
    async fn custom_strategies_are_resorted() {
        let mut svc = service(templates(&[]), schemas(&[]));
        svc.add_strategy(Arc::new(Pinned));
        assert_eq!(svc.strategy_names()[0], "pinned");

        let resolved = svc.resolve(&ResolveRequest::new("a", "b")).await.unwrap();
        assert_eq!(resolved.strategy, "pinned");

        assert!(svc.remove_strategy("pinned"));
        assert!(!svc.remove_strategy("pinned"));
        assert_eq!(svc.strategy_names().len(), 3);
    }

    #[tokio::test]
    async fn exists_probe() {
        let svc = service(templates(&["to/task/f_task.md"]), schemas(&[]));
        let opts = ResolveOptions::default();
        assert!(svc.exists("to", "task", &opts).await);
        assert!(!svc.exists("to", "issue", &opts).await);
        assert!(!svc.exists("to", "task", &opts.clone().custom_path("nope")).await);
    }
}
