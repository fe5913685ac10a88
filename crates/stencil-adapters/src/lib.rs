//! Infrastructure adapters for Stencil.
//!
//! This crate implements the ports defined in `stencil-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_templates;
pub mod filesystem;
pub mod memory;
mod schema_checks;

// Re-export commonly used adapters
pub use filesystem::{FileSchemaRepository, FileTemplateRepository};
pub use memory::{InMemorySchemaRepository, InMemoryTemplateRepository};
