//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stencil",
    bin_name = "stencil",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Resolve prompt templates and generate prompts",
    long_about = "Stencil finds the prompt template for a directive and layer, \
                  checks its schema, and fills it with your variables.",
    after_help = "EXAMPLES:\n\
        \x20 stencil resolve to task\n\
        \x20 stencil generate to task --var title=\"Fix login\"\n\
        \x20 echo 'crash on save' | stencil generate defect issue --stdin\n\
        \x20 stencil list templates --directive summary\n\
        \x20 stencil schemas check",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show which template a directive and layer resolve to.
    #[command(
        visible_alias = "r",
        about = "Resolve a template without generating",
        after_help = "EXAMPLES:\n\
            \x20 stencil resolve to task\n\
            \x20 stencil resolve to task --path to/task/custom.md\n\
            \x20 stencil resolve summary issue --version 1.0.0 --strict"
    )]
    Resolve(ResolveArgs),

    /// Resolve a template and fill it with variables.
    #[command(
        visible_alias = "g",
        about = "Generate a prompt",
        after_help = "EXAMPLES:\n\
            \x20 stencil generate to task --var title=\"Fix login\" --var tone=direct\n\
            \x20 stencil generate to task --policy ignore\n\
            \x20 cat notes.md | stencil generate summary project --stdin"
    )]
    Generate(GenerateArgs),

    /// List stored templates or schemas.
    #[command(
        visible_alias = "ls",
        about = "List templates or schemas",
        after_help = "EXAMPLES:\n\
            \x20 stencil list templates\n\
            \x20 stencil list schemas --directive to --layer task"
    )]
    List(ListArgs),

    /// Schema maintenance.
    #[command(about = "Schema maintenance", subcommand)]
    Schemas(SchemasCommands),
}

// ── resolve ───────────────────────────────────────────────────────────────────

/// Directive/layer pair plus resolution knobs shared by `resolve` and `generate`.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Directive, e.g. `to`, `summary`, `defect`.
    #[arg(value_name = "DIRECTIVE")]
    pub directive: String,

    /// Layer, e.g. `project`, `issue`, `task`.
    #[arg(value_name = "LAYER")]
    pub layer: String,

    /// Exact template path (`directive/layer/file.md`), tried first.
    #[arg(long = "path", value_name = "PATH")]
    pub path: Option<String>,

    /// Treat a missing schema as an error.
    #[arg(long = "strict")]
    pub strict: bool,
}

/// Arguments for `stencil resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Require a template compatible with this version.
    #[arg(long = "version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Disable the built-in fallback table.
    #[arg(long = "no-fallback")]
    pub no_fallback: bool,
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `stencil generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Variable assignment; repeatable.
    #[arg(
        long = "var",
        value_name = "NAME=VALUE",
        value_parser = parse_var,
        action = clap::ArgAction::Append
    )]
    pub vars: Vec<(String, String)>,

    /// Read standard input into the `input_text` variable.
    #[arg(long = "stdin")]
    pub stdin: bool,

    /// What to do with placeholders that have no value.
    #[arg(long = "policy", value_enum, value_name = "POLICY")]
    pub policy: Option<PolicyArg>,
}

/// Substitution policy as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Strict,
    Ignore,
    Empty,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `stencil list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// What to list.
    #[arg(value_enum, value_name = "WHAT")]
    pub what: ListTarget,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListTarget {
    Templates,
    Schemas,
}

/// Directive/layer filter.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(short = 'd', long = "directive", value_name = "DIRECTIVE")]
    pub directive: Option<String>,

    #[arg(short = 'l', long = "layer", value_name = "LAYER")]
    pub layer: Option<String>,
}

// ── schemas ───────────────────────────────────────────────────────────────────

/// Subcommands for `stencil schemas`.
#[derive(Debug, Subcommand)]
pub enum SchemasCommands {
    /// Load every schema and report missing or circular references.
    #[command(after_help = "EXAMPLES:\n\
        \x20 stencil schemas check\n\
        \x20 stencil schemas check --directive to")]
    Check(FilterArgs),
}

// ── tests ─────────────────────────────────────────────────────────────────────
