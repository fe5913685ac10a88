//! `stencil generate`: resolve a template and fill it with variables.
//!
//! Variables come from `--var NAME=VALUE`, from stdin (as `input_text`), and
//! from `STENCIL_VAR_{NAME}` environment variables, in that order of
//! precedence.

use std::sync::Arc;

use tokio::io::AsyncReadExt as _;
use tracing::{debug, instrument};

use stencil_core::{
    application::{
        GenerationOutcome, GenerationRequest, GenerationSettings, PromptGenerationService,
        TemplateResolverService,
    },
    domain::{
        FallbackKind, GenerationPolicy, GenerationPolicyConfig, SubstitutionPolicy,
        TemplateVariables,
        policy::{ContextLookupStrategy, EnvironmentStrategy, StandardSelection},
    },
};

use crate::{
    cli::{GenerateArgs, PolicyArg},
    commands::{Stores, resolve_options},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli as _},
    output::OutputManager,
};

/// Prefix for variables picked up from the environment.
pub const VAR_ENV_PREFIX: &str = "STENCIL_VAR_";

/// Variable that receives piped input.
const STDIN_VARIABLE: &str = "input_text";

impl From<PolicyArg> for SubstitutionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => Self::Strict,
            PolicyArg::Ignore => Self::Ignore,
            PolicyArg::Empty => Self::Empty,
        }
    }
}

#[instrument(skip_all, fields(directive = %args.target.directive, layer = %args.target.layer))]
pub async fn execute(
    args: GenerateArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let mut variables = TemplateVariables::from_pairs(args.vars.iter().cloned())?;
    if args.stdin && !variables.contains(STDIN_VARIABLE) {
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .with_cli_context(|| "reading stdin")?;
        if input.trim().is_empty() {
            return Err(CliError::InvalidInput {
                message: "--stdin was given but stdin is empty".into(),
                source: None,
            });
        }
        variables.insert(STDIN_VARIABLE, input.trim_end())?;
    }
    debug!(count = variables.len(), "Variables collected");

    let stores = Stores::from_config(&config)?;
    let resolver = Arc::new(TemplateResolverService::new(stores.templates, stores.schemas));
    let settings = GenerationSettings {
        substitution: args
            .policy
            .map_or(config.substitution_policy, SubstitutionPolicy::from),
        max_attempts: config.max_attempts,
    };
    let service = PromptGenerationService::new(resolver, policy()?, settings);

    let request = GenerationRequest::new(&args.target.directive, &args.target.layer)
        .variables(variables)
        .options(resolve_options(&args.target, &config));
    let outcome = service.generate(request).await?;

    if output.is_json() {
        return output.json(&outcome);
    }
    show(&outcome, &output)
}

/// Context values first, then the environment snapshot.
fn policy() -> CliResult<GenerationPolicy> {
    let policy = GenerationPolicy::builder()
        .config(GenerationPolicyConfig::new().fallback(FallbackKind::UseDefault))
        .resolution_strategy(ContextLookupStrategy::new(20))
        .resolution_strategy(EnvironmentStrategy::from_env(VAR_ENV_PREFIX, 10))
        .selection_strategy(StandardSelection)
        .build()?;
    Ok(policy)
}

fn show(outcome: &GenerationOutcome, output: &OutputManager) -> CliResult<()> {
    for warning in &outcome.warnings {
        output.warning(warning)?;
    }
    output.result(&outcome.prompt.content)?;
    Ok(())
}
