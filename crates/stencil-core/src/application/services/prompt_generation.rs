//! End-to-end prompt generation: resolve, prepare variables, render.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::services::template_resolver::{
    ResolveOptions, ResolveRequest, TemplateResolverService,
};
use crate::domain::{
    aggregates::{DEFAULT_MAX_ATTEMPTS, GeneratedPrompt, PromptGenerationAggregate},
    policy::{FallbackKind, GenerationPolicy, ResolutionContext},
    value_objects::{SchemaPath, SubstitutionPolicy, TemplateVariables},
};
use crate::error::StencilResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    pub substitution: SubstitutionPolicy,
    pub max_attempts: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            substitution: SubstitutionPolicy::Strict,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub directive: String,
    pub layer: String,
    pub variables: TemplateVariables,
    pub options: ResolveOptions,
    /// Extra values visible to context-based variable resolution.
    pub context: ResolutionContext,
}

impl GenerationRequest {
    pub fn new(directive: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            layer: layer.into(),
            ..Self::default()
        }
    }

    pub fn variables(mut self, variables: TemplateVariables) -> Self {
        self.variables = variables;
        self
    }

    pub fn options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn context(mut self, context: ResolutionContext) -> Self {
        self.context = context;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    pub prompt: GeneratedPrompt,
    pub schema_path: Option<SchemaPath>,
    pub warnings: Vec<String>,
    pub strategy: String,
    pub fallback_used: bool,
    /// Pipeline runs it took, counting retries and the default re-run.
    pub attempts: u32,
}

pub struct PromptGenerationService {
    resolver: Arc<TemplateResolverService>,
    policy: GenerationPolicy,
    settings: GenerationSettings,
}

impl PromptGenerationService {
    pub fn new(
        resolver: Arc<TemplateResolverService>,
        policy: GenerationPolicy,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            resolver,
            policy,
            settings,
        }
    }

    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    /// Run the pipeline, consulting the policy after each domain failure.
    ///
    /// `Retry` runs again while both `max_attempts` and the action's
    /// `max_retries` allow. `UseDefault` runs once more with fallback on and
    /// no custom path, keeping the requested version and strictness. Any
    /// other action returns the failure.
    #[instrument(skip_all, fields(directive = %request.directive, layer = %request.layer))]
    pub async fn generate(&self, request: GenerationRequest) -> StencilResult<GenerationOutcome> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut request = request;
        let mut attempt = 1;
        let mut retries = 0;

        loop {
            let err = match self.run(request.clone()).await {
                Ok(mut outcome) => {
                    outcome.attempts = attempt;
                    return Ok(outcome);
                }
                Err(e) => e,
            };
            let Some(domain) = err.as_domain() else {
                return Err(err);
            };

            let action = self.policy.handle_failure(domain);
            warn!(
                code = domain.code(),
                attempt,
                fallback = %action.kind,
                max_retries = ?action.max_retries,
                "Generation failed"
            );
            if attempt >= max_attempts {
                return Err(err);
            }

            match action.kind {
                FallbackKind::Retry if retries < action.max_retries.unwrap_or(0) => retries += 1,
                FallbackKind::UseDefault => {
                    let defaults = ResolveOptions {
                        version: request.options.version.clone(),
                        strict: request.options.strict,
                        ..ResolveOptions::default()
                    };
                    if request.options == defaults {
                        return Err(err);
                    }
                    request.options = defaults;
                }
                _ => return Err(err),
            }
            attempt += 1;
        }
    }

    async fn run(&self, request: GenerationRequest) -> StencilResult<GenerationOutcome> {
        let resolved = self
            .resolver
            .resolve(&ResolveRequest {
                directive: request.directive.clone(),
                layer: request.layer.clone(),
                options: request.options.clone(),
            })
            .await?;

        let mut context = request.context;
        context.directive.get_or_insert_with(|| request.directive.clone());
        context.layer.get_or_insert_with(|| request.layer.clone());

        let template = &resolved.template;
        let variables = self.policy.resolve_missing_variables(
            &request.variables,
            template.required_variables(),
            &context,
        )?;
        let variables = self.policy.transform_variables(&variables);

        let mut warnings = resolved.warnings.clone();
        let report = self.policy.validate_variables(&variables);
        warnings.extend(report.into_result()?.iter().map(ToString::to_string));

        let mut aggregate =
            PromptGenerationAggregate::create(Uuid::new_v4().to_string(), template.clone())?
                .with_policy(self.settings.substitution)
                .with_max_attempts(self.settings.max_attempts);
        let prompt = aggregate.generate_prompt(&variables)?;

        info!(
            prompt_id = %prompt.id,
            template = %prompt.template_path,
            strategy = %resolved.strategy,
            "Prompt generated"
        );

        Ok(GenerationOutcome {
            prompt,
            schema_path: resolved.schema_path,
            warnings,
            strategy: resolved.strategy,
            fallback_used: resolved.fallback_used,
            attempts: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockSchemaRepository, MockTemplateRepository};
    use crate::domain::{
        DomainError,
        entities::PromptTemplate,
        policy::{
            DefaultValueStrategy, FallbackKind, GenerationPolicyConfig, StandardSelection,
            ValueTransform, VariableRule,
        },
        value_objects::{TemplateContent, TemplatePath},
    };
    use crate::error::StencilError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn template(path: &TemplatePath, text: &str) -> PromptTemplate {
        PromptTemplate::new(
            TemplatePath::from_string(&path.path()).unwrap(),
            TemplateContent::create(text).unwrap(),
        )
    }

    fn not_found(path: &TemplatePath) -> StencilError {
        DomainError::TemplateNotFound {
            reference: path.path(),
        }
        .into()
    }

    fn service(text: &'static str, config: GenerationPolicyConfig) -> PromptGenerationService {
        let mut templates = MockTemplateRepository::new();
        templates.expect_load_template().returning(move |p| {
            if p.path() == "to/task/f_task.md" {
                Ok(template(p, text))
            } else {
                Err(not_found(p))
            }
        });
        service_with(templates, config, GenerationSettings::default())
    }

    fn service_with(
        templates: MockTemplateRepository,
        config: GenerationPolicyConfig,
        settings: GenerationSettings,
    ) -> PromptGenerationService {
        let mut schemas = MockSchemaRepository::new();
        schemas.expect_load_schema().returning(|p| {
            Err(DomainError::SchemaNotFound {
                reference: p.path(),
            }
            .into())
        });

        let resolver = TemplateResolverService::new(Arc::new(templates), Arc::new(schemas));
        let policy = GenerationPolicy::builder()
            .config(config)
            .selection_strategy(StandardSelection)
            .resolution_strategy(DefaultValueStrategy::new(1).with_default("tone", "neutral"))
            .build()
            .unwrap();
        PromptGenerationService::new(Arc::new(resolver), policy, settings)
    }

    fn no_fallback() -> ResolveOptions {
        ResolveOptions::default().fallback_enabled(false)
    }

    #[tokio::test]
    async fn generates_with_resolved_and_transformed_variables() {
        let config = GenerationPolicyConfig::new()
            .rule("name", VariableRule::new().transform(ValueTransform::PascalCase));
        let svc = service("Task {name}, tone {{tone}}", config);

        let request = GenerationRequest::new("to", "task")
            .variables(TemplateVariables::new().with("name", "fix login bug").unwrap())
            .options(no_fallback());
        let outcome = svc.generate(request).await.unwrap();

        assert_eq!(outcome.prompt.content, "Task FixLoginBug, tone neutral");
        assert_eq!(outcome.prompt.attempt, 1);
        assert_eq!(outcome.strategy, "standard-naming");
        assert!(outcome.schema_path.is_none());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn unresolved_variables_fail_under_strict() {
        let svc = service("Task {name} in {area}", GenerationPolicyConfig::new());
        let request = GenerationRequest::new("to", "task")
            .variables(TemplateVariables::new().with("name", "x").unwrap())
            .options(no_fallback());

        let err = svc.generate(request).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::MissingVariables { names }) if names == &["area".to_string()]
        ));
    }

    #[tokio::test]
    async fn validation_failure_stops_generation() {
        let config = GenerationPolicyConfig::new()
            .require("title")
            .fallback(FallbackKind::Skip);
        let svc = service("static text", config);

        let err = svc
            .generate(GenerationRequest::new("to", "task").options(no_fallback()))
            .await
            .unwrap_err();
        assert_eq!(err.as_domain().map(DomainError::code), Some("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn unresolvable_template_propagates() {
        let svc = service("x", GenerationPolicyConfig::new());
        let err = svc
            .generate(GenerationRequest::new("summary", "issue").options(no_fallback()))
            .await
            .unwrap_err();
        assert_eq!(err.as_domain().map(DomainError::code), Some("TEMPLATE_NOT_FOUND"));
    }

    #[tokio::test]
    async fn too_long_values_become_warnings() {
        let config = GenerationPolicyConfig::new().rule("tone", VariableRule::new().max_length(3));
        let svc = service("{tone}", config);
        let outcome = svc
            .generate(GenerationRequest::new("to", "task").options(no_fallback()))
            .await
            .unwrap();
        assert_eq!(outcome.prompt.content, "neutral");
        assert!(outcome.warnings.iter().any(|w| w.starts_with("TOO_LONG")));
    }

    #[tokio::test]
    async fn retry_runs_again_after_a_transient_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut templates = MockTemplateRepository::new();
        templates.expect_load_template().returning(move |p| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(not_found(p))
            } else {
                Ok(template(p, "tone {tone}"))
            }
        });
        let config = GenerationPolicyConfig::new()
            .fallback(FallbackKind::Retry)
            .max_retries(2);
        let settings = GenerationSettings {
            max_attempts: 3,
            ..GenerationSettings::default()
        };
        let svc = service_with(templates, config, settings);

        let outcome = svc
            .generate(GenerationRequest::new("to", "task").options(no_fallback()))
            .await
            .unwrap();
        assert_eq!(outcome.prompt.content, "tone neutral");
        assert_eq!(outcome.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retries_stop_at_max_attempts() {
        let mut templates = MockTemplateRepository::new();
        templates
            .expect_load_template()
            .times(2)
            .returning(|p| Err(not_found(p)));
        let config = GenerationPolicyConfig::new()
            .fallback(FallbackKind::Retry)
            .max_retries(5);
        let settings = GenerationSettings {
            max_attempts: 2,
            ..GenerationSettings::default()
        };
        let svc = service_with(templates, config, settings);

        let err = svc
            .generate(GenerationRequest::new("to", "task").options(no_fallback()))
            .await
            .unwrap_err();
        assert_eq!(err.as_domain().map(DomainError::code), Some("TEMPLATE_NOT_FOUND"));
    }

    #[tokio::test]
    async fn use_default_reruns_with_fallback_enabled() {
        let mut templates = MockTemplateRepository::new();
        templates.expect_load_template().returning(|p| {
            if p.path() == "to/task/default_task.md" {
                Ok(template(p, "default {tone}"))
            } else {
                Err(not_found(p))
            }
        });
        let config = GenerationPolicyConfig::new().fallback(FallbackKind::UseDefault);
        let svc = service_with(templates, config, GenerationSettings::default());

        let outcome = svc
            .generate(GenerationRequest::new("to", "task").options(no_fallback()))
            .await
            .unwrap();
        assert_eq!(outcome.prompt.content, "default neutral");
        assert!(outcome.fallback_used);
        assert_eq!(outcome.attempts, 2);
    }
}
