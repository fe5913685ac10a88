//! `stencil resolve`: show which template and schema a target resolves to.

use tracing::{debug, instrument};

use stencil_core::application::{ResolveRequest, ResolvedTemplate, TemplateResolverService};

use crate::{
    cli::ResolveArgs,
    commands::{Stores, resolve_options},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(directive = %args.target.directive, layer = %args.target.layer))]
pub async fn execute(args: ResolveArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let stores = Stores::from_config(&config)?;
    let resolver = TemplateResolverService::new(stores.templates, stores.schemas);

    let mut options = resolve_options(&args.target, &config);
    if args.no_fallback {
        options = options.fallback_enabled(false);
    }
    if let Some(version) = &args.version {
        options = options.version(version.clone());
    }

    let request = ResolveRequest::new(&args.target.directive, &args.target.layer)
        .with_options(options);
    let resolved = resolver.resolve(&request).await?;
    debug!(strategy = %resolved.strategy, "Resolved");

    if output.is_json() {
        return output.json(&resolved);
    }
    show(&resolved, &output)
}

fn show(resolved: &ResolvedTemplate, output: &OutputManager) -> CliResult<()> {
    output.header(&format!(
        "{}/{}",
        resolved.template_path.directive(),
        resolved.template_path.layer()
    ))?;
    output.result(&format!("template  {}", resolved.template_path))?;
    let schema = resolved
        .schema_path
        .as_ref()
        .map_or_else(|| "(none)".to_string(), ToString::to_string);
    output.result(&format!("schema    {schema}"))?;
    output.result(&format!("strategy  {}", resolved.strategy))?;
    output.result(&format!("version   {}", resolved.template.version()))?;
    output.result(&format!(
        "fallback  {}",
        if resolved.fallback_used { "yes" } else { "no" }
    ))?;

    let vars = resolved.template.required_variables();
    if !vars.is_empty() {
        output.result(&format!("variables {}", vars.join(", ")))?;
    }

    for warning in &resolved.warnings {
        output.warning(warning)?;
    }
    Ok(())
}
