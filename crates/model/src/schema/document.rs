use crate::{
    core::field_type::FieldType,
    error::Result,
    schema::{FieldList, TableDef},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// JSON form of a schema: the primary table first, then joined tables.
///
/// ```json
/// { "tables": [ { "name": "towns", "fields": [ { "name": "id", "type": "integer" } ] } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub tables: Vec<TableSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchemaEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchemaEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl SchemaDocument {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn into_field_list(self) -> Result<FieldList> {
        let mut list = FieldList::new();
        for table in self.tables {
            let mut def = TableDef::new(&table.name, table.alias.as_deref());
            def.data_source = table.data_source;
            let index = list.add_table(def)?;
            for field in table.fields {
                list.add_field(index, &field.name, field.field_type)?;
            }
        }
        debug!("Loaded schema with {} tables", list.tables.len());
        Ok(list)
    }
}
