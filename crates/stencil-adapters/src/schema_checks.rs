//! Schema checks shared by every `SchemaRepository` adapter.

use serde_json::Value;

use stencil_core::{
    application::ports::SchemaValidation,
    domain::{Schema, SchemaContent, SchemaPath},
};

/// Structural shape plus "no blank `$ref`".
pub(crate) fn validate_document(document: &Value) -> SchemaValidation {
    let mut errors = Vec::new();

    match SchemaContent::create(document.clone()) {
        Ok(content) => {
            let blank = content
                .references()
                .iter()
                .filter(|r| r.trim().is_empty())
                .count();
            if blank > 0 {
                errors.push(format!("{blank} blank $ref value(s)"));
            }
        }
        Err(e) => errors.push(e.to_string()),
    }

    SchemaValidation {
        valid: errors.is_empty(),
        errors,
    }
}

/// References that name another schema by `directive/layer/file.json`,
/// with any `#fragment` dropped. Local and foreign refs are skipped.
pub(crate) fn dependency_paths(schema: &Schema) -> Vec<SchemaPath> {
    schema
        .references()
        .iter()
        .filter_map(|r| r.split('#').next())
        .filter(|doc| !doc.is_empty())
        .filter_map(|doc| SchemaPath::from_string(doc).ok())
        .collect()
}
