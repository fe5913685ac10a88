//! Domain value objects: paths, content, variables, versions, checksums.
//!
//! # Design
//!
//! These are pure value types: immutable, equality-by-value, no identity.
//! Every one of them is built through a validating constructor that returns
//! `Result<_, DomainError>`; once a value exists it is known to be well formed.

pub mod checksum;
pub mod content;
pub mod path;
pub mod variables;
pub mod version;

pub use checksum::{ChecksumAlgorithm, TemplateChecksum};
pub use content::{ContentMetadata, LineEnding, SchemaContent, TemplateContent};
pub use path::{
    PathFilter, ResourceId, ResourceKind, ResourcePath, SchemaId, SchemaKind, SchemaPath,
    TemplateId, TemplateKind, TemplatePath,
};
pub use variables::{
    SubstitutionPolicy, TemplateVariables, VariableSubstitution, is_valid_variable_name,
};
pub use version::TemplateVersion;
