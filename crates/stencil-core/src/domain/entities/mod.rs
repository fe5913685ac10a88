pub mod metadata;
pub mod schema;
pub mod template;

pub use metadata::ResourceMetadata;
pub use schema::Schema;
pub use template::PromptTemplate;
