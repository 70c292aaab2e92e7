use crate::error::{PlanError, PlanResult};
use model::{FieldList, FieldSchema};
use sql_syntax::SelectStatement;
use tracing::debug;

/// Builds the field schema a statement is resolved against: its FROM and
/// JOIN tables, in statement order and under their aliases, each carrying
/// the fields `catalog` lists for the table of that name.
pub fn bind_tables(select: &SelectStatement, catalog: &dyn FieldSchema) -> PlanResult<FieldList> {
    let mut schema = FieldList::new();
    for table in &select.tables {
        let source = catalog
            .tables()
            .iter()
            .position(|t| t.table_name.eq_ignore_ascii_case(&table.table_name))
            .ok_or_else(|| PlanError::UnknownTable(table.table_name.clone()))?;
        let index = schema.add_table(table.clone())?;
        for field in catalog.fields_of_table(source) {
            schema.add_field_with_index(index, &field.name, field.field_type, field.field_index)?;
        }
        debug!(
            "Bound table '{}' as '{}' (index {index})",
            table.table_name, table.table_alias
        );
    }
    Ok(schema)
}
