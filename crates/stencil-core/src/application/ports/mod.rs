//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `stencil-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `TemplateRepository`: Template storage/retrieval
//!   - `SchemaRepository`: Schema storage/retrieval, batch writes, dependency lookup
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    BatchFailure, BatchOutcome, Manifest, ManifestEntry, SchemaRepository, SchemaValidation,
    TemplateRepository,
};

#[cfg(test)]
pub use output::{MockSchemaRepository, MockTemplateRepository};
