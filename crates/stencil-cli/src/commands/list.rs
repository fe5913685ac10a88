//! `stencil list`: enumerate templates or schemas.

use tracing::instrument;

use stencil_core::application::{CatalogService, Manifest};

use crate::{
    cli::{ListArgs, ListTarget},
    commands::{Stores, filter_from},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(what = ?args.what))]
pub async fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let stores = Stores::from_config(&config)?;
    let catalog = CatalogService::new(stores.templates, stores.schemas);
    let filter = filter_from(&args.filter);

    let (label, manifest) = match args.what {
        ListTarget::Templates => ("templates", catalog.list_templates(&filter).await?),
        ListTarget::Schemas => ("schemas", catalog.list_schemas(&filter).await?),
    };

    if output.is_json() {
        return output.json(&manifest);
    }
    show(label, &manifest, &output)
}

fn show(label: &str, manifest: &Manifest, output: &OutputManager) -> CliResult<()> {
    if manifest.entries.is_empty() {
        output.warning(&format!("No {label} found"))?;
        return Ok(());
    }
    output.header(&format!("{} {label}", manifest.total_count))?;
    for entry in &manifest.entries {
        output.result(&entry.path)?;
    }
    Ok(())
}
