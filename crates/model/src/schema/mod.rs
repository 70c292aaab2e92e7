//! Field schema consumed by expression checking and select resolution.
//!
//! Table index 0 is the primary table; 1..N are joined tables in the order
//! they appear in the statement.

pub mod document;

use crate::{
    core::field_type::FieldType,
    error::{ModelError, Result},
};

#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub data_source: Option<String>,
    pub table_name: String,
    pub table_alias: String,
}

impl TableDef {
    pub fn new(table_name: &str, alias: Option<&str>) -> Self {
        Self {
            data_source: None,
            table_name: table_name.to_string(),
            table_alias: alias.unwrap_or(table_name).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub table_index: usize,
    /// Index of the field inside its own table.
    pub field_index: usize,
}

/// Outcome of resolving a possibly qualified field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatch {
    pub field_index: usize,
    pub table_index: usize,
    pub field_type: FieldType,
}

/// Read access to a set of tables and their fields.
pub trait FieldSchema {
    fn tables(&self) -> &[TableDef];

    fn fields(&self) -> &[FieldDef];

    /// Finds a table by alias, case-insensitively.
    fn table_index(&self, alias: &str) -> Option<usize> {
        self.tables()
            .iter()
            .position(|t| t.table_alias.eq_ignore_ascii_case(alias))
    }

    /// Resolves `table.field` or `field`. An exact name match wins over a
    /// case-insensitive one.
    fn identify_field(&self, table_name: Option<&str>, field_name: &str) -> Option<FieldMatch> {
        let table_name = table_name.filter(|t| !t.is_empty());
        let tables_enabled = !self.tables().is_empty();
        if table_name.is_some() && !tables_enabled {
            return None;
        }

        let exact = |f: &FieldDef| f.name == field_name;
        let folded = |f: &FieldDef| f.name.eq_ignore_ascii_case(field_name);
        let passes: [&dyn Fn(&FieldDef) -> bool; 2] = [&exact, &folded];

        for matches_name in passes {
            let found = self.fields().iter().find(|f| {
                matches_name(f)
                    && table_name.is_none_or(|t| {
                        self.tables()
                            .get(f.table_index)
                            .is_some_and(|def| def.table_alias.eq_ignore_ascii_case(t))
                    })
            });
            if let Some(f) = found {
                return Some(FieldMatch {
                    field_index: f.field_index,
                    table_index: f.table_index,
                    field_type: f.field_type,
                });
            }
        }
        None
    }

    /// Canonical name of a resolved field. Later entries shadow earlier ones
    /// with the same indices.
    fn field_name(&self, table_index: usize, field_index: usize) -> Option<&str> {
        self.fields()
            .iter()
            .rev()
            .find(|f| f.table_index == table_index && f.field_index == field_index)
            .map(|f| f.name.as_str())
    }

    fn fields_of_table(&self, table_index: usize) -> Vec<&FieldDef> {
        self.fields()
            .iter()
            .filter(|f| f.table_index == table_index)
            .collect()
    }
}

/// In-memory schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldList {
    tables: Vec<TableDef>,
    fields: Vec<FieldDef>,
}

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: TableDef) -> Result<usize> {
        if self.table_index(&table.table_alias).is_some() {
            return Err(ModelError::DuplicateTable(table.table_alias));
        }
        self.tables.push(table);
        Ok(self.tables.len() - 1)
    }

    /// Appends a field, numbering it after the fields already in its table.
    pub fn add_field(&mut self, table_index: usize, name: &str, field_type: FieldType) -> Result<usize> {
        let field_index = self.fields_of_table(table_index).len();
        self.add_field_with_index(table_index, name, field_type, field_index)
    }

    /// Appends a field under an explicit index, possibly shadowing an earlier
    /// entry of the same table.
    pub fn add_field_with_index(
        &mut self,
        table_index: usize,
        name: &str,
        field_type: FieldType,
        field_index: usize,
    ) -> Result<usize> {
        if table_index >= self.tables.len() {
            return Err(ModelError::UnknownTable(table_index));
        }
        self.fields.push(FieldDef {
            name: name.to_string(),
            field_type,
            table_index,
            field_index,
        });
        Ok(field_index)
    }
}

impl FieldSchema for FieldList {
    fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    fn fields(&self) -> &[FieldDef] {
        &self.fields
    }
}
