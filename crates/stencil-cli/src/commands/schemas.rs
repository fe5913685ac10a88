//! `stencil schemas check`: load every schema and verify its references.

use tracing::instrument;

use stencil_core::{
    application::{SchemaSyncService, SyncReport},
    domain::SchemaManagementAggregate,
};

use crate::{
    cli::{FilterArgs, SchemasCommands},
    commands::{Stores, filter_from},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub async fn execute(
    command: SchemasCommands,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match command {
        SchemasCommands::Check(filter) => check(filter, config, output).await,
    }
}

#[instrument(skip_all)]
async fn check(args: FilterArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let stores = Stores::from_config(&config)?;
    let sync = SchemaSyncService::new(stores.schemas);
    let mut aggregate = SchemaManagementAggregate::create("cli")?;

    let report = sync.sync(&mut aggregate, &filter_from(&args)).await?;

    if output.is_json() {
        output.json(&report)?;
    } else {
        show(&report, &output)?;
    }

    match problems(&report) {
        0 => Ok(()),
        problems => Err(CliError::SchemaCheckFailed { problems }),
    }
}

fn problems(report: &SyncReport) -> usize {
    report.import.failed.len()
        + report.dependencies.missing.len()
        + report.dependencies.circular.len()
}

fn show(report: &SyncReport, output: &OutputManager) -> CliResult<()> {
    output.header(&format!("{} schema(s) listed", report.listed))?;

    for path in &report.import.successful {
        output.success(&path.to_string())?;
    }
    for failure in &report.import.failed {
        output.failure(&format!("{}: {}", failure.path, failure.error_message))?;
    }
    for missing in &report.dependencies.missing {
        output.failure(&format!(
            "{} references missing {}",
            missing.schema, missing.reference
        ))?;
    }
    for cycle in &report.dependencies.circular {
        output.failure(&format!("cycle: {}", cycle.join(" -> ")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::domain::{DependencyReport, ImportReport, MissingReference};

    #[test]
    fn counts_every_kind_of_problem() {
        let report = SyncReport {
            listed: 2,
            import: ImportReport::default(),
            dependencies: DependencyReport {
                valid: false,
                missing: vec![MissingReference {
                    schema: "to/task/a.json".into(),
                    reference: "to/task/b.json".into(),
                }],
                circular: vec![vec!["x".into(), "y".into(), "x".into()]],
            },
        };
        assert_eq!(problems(&report), 2);
    }

    #[test]
    fn clean_report_has_no_problems() {
        let report = SyncReport {
            listed: 0,
            import: ImportReport::default(),
            dependencies: DependencyReport {
                valid: true,
                ..DependencyReport::default()
            },
        };
        assert_eq!(problems(&report), 0);
    }
}
