pub mod core;
pub mod error;
pub mod options;
pub mod schema;

pub use core::field_type::FieldType;
pub use error::{ModelError, Result};
pub use options::ParseOptions;
pub use schema::{FieldDef, FieldList, FieldMatch, FieldSchema, TableDef};
