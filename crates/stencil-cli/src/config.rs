//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `STENCIL_*` environment variables (a `.env` file is loaded first)
//! 3. Config file (`--config`, or the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use stencil_core::domain::SubstitutionPolicy;

const ENV_PREFIX: &str = "STENCIL";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the `{directive}/{layer}/{file}.md` template tree.
    pub templates_dir: PathBuf,
    /// Root of the `{directive}/{layer}/{file}.json` schema tree.
    pub schemas_dir: PathBuf,
    pub substitution_policy: SubstitutionPolicy,
    /// Missing schemas fail resolution instead of producing a warning.
    pub strict: bool,
    pub fallback_enabled: bool,
    pub max_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            schemas_dir: PathBuf::from("schemas"),
            substitution_policy: SubstitutionPolicy::Strict,
            strict: false,
            fallback_enabled: true,
            max_attempts: 3,
        }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over defaults.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(p) => (p.clone(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "loading configuration");

        Self::builder(&path, required)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .ignore_empty(true),
            )
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize::<Self>()
            .context("invalid configuration value")
    }

    fn builder(
        path: &Path,
        required: bool,
    ) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Self::default();
        let builder = Config::builder()
            .set_default("templates_dir", defaults.templates_dir.display().to_string())?
            .set_default("schemas_dir", defaults.schemas_dir.display().to_string())?
            .set_default("substitution_policy", defaults.substitution_policy.as_str())?
            .set_default("strict", defaults.strict)?
            .set_default("fallback_enabled", defaults.fallback_enabled)?
            .set_default("max_attempts", i64::from(defaults.max_attempts))?
            .add_source(File::from(path).format(FileFormat::Toml).required(required));
        Ok(builder)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stencil.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "stencil", "stencil")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".stencil.toml"))
    }
}
