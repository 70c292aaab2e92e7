//! Expansion of `*` and `table.*` result columns into field lists.

use crate::error::{PlanError, PlanResult, qualified_name};
use model::{FieldDef, FieldSchema, FieldType};
use sql_syntax::{ColumnDef, ColumnRef, ExprNode, NodeKind, SelectStatement};
use std::collections::HashSet;
use tracing::debug;

/// Replaces every wildcard column by the fields of its table, or of all
/// tables for a bare `*`, minus the fields its EXCEPT list names.
///
/// A field whose name was already produced by an earlier column is
/// qualified with its table alias, as is every field when `always_prefix`
/// is set.
pub fn expand_wildcard(
    select: &mut SelectStatement,
    schema: &dyn FieldSchema,
    always_prefix: bool,
) -> PlanResult<()> {
    let original = std::mem::take(&mut select.columns);
    let mut columns = Vec::with_capacity(original.len());
    for (index, def) in original.into_iter().enumerate() {
        if !def.is_wildcard() {
            columns.push(def);
            continue;
        }

        let exclusions = select.excluded_fields.remove(&index).unwrap_or_default();
        let table = match def.table_name.as_deref() {
            Some(alias) => Some(
                schema
                    .table_index(alias)
                    .ok_or_else(|| PlanError::WildcardTable(alias.to_string()))?,
            ),
            None => None,
        };

        let mut matched = vec![false; exclusions.len()];
        let before = columns.len();
        for field in table_fields(schema, table) {
            let alias = schema
                .tables()
                .get(field.table_index)
                .map(|t| t.table_alias.as_str())
                .unwrap_or_default();
            let mut excluded = false;
            for (i, exclusion) in exclusions.iter().enumerate() {
                if excludes(exclusion, field, alias) {
                    matched[i] = true;
                    excluded = true;
                }
            }
            if excluded {
                if field.field_type == FieldType::Geometry {
                    select.excluded_geometry = true;
                }
                continue;
            }

            let collides = columns
                .iter()
                .any(|c: &ColumnDef| c.output_name().eq_ignore_ascii_case(&field.name));
            let prefixed = always_prefix || collides;
            columns.push(field_column(field, alias, prefixed, def.distinct));
        }

        if let Some(i) = matched.iter().position(|m| !m) {
            let missing = &exclusions[i];
            return Err(PlanError::ExclusionNotFound(qualified_name(
                missing.table_name.as_deref(),
                &missing.name,
            )));
        }
        debug!(
            "Expanded wildcard {} into {} columns",
            qualified_name(def.table_name.as_deref(), &def.field_name),
            columns.len() - before
        );
    }
    select.columns = columns;
    Ok(())
}

/// Fields of one table, or of every table, in table order. A field
/// redefined under the same indices appears once, with its latest
/// definition.
fn table_fields(schema: &dyn FieldSchema, table: Option<usize>) -> Vec<&FieldDef> {
    let mut seen = HashSet::new();
    let mut fields: Vec<&FieldDef> = schema
        .fields()
        .iter()
        .rev()
        .filter(|f| table.is_none_or(|t| f.table_index == t))
        .filter(|f| seen.insert((f.table_index, f.field_index)))
        .collect();
    fields.reverse();
    fields.sort_by_key(|f| (f.table_index, f.field_index));
    fields
}

fn excludes(exclusion: &ColumnRef, field: &FieldDef, alias: &str) -> bool {
    exclusion.name.eq_ignore_ascii_case(&field.name)
        && exclusion
            .table_name
            .as_deref()
            .is_none_or(|t| t.eq_ignore_ascii_case(alias))
}

/// A result column bound to a schema field. Fields of secondary tables keep
/// their alias so they resolve to the right table.
fn field_column(field: &FieldDef, alias: &str, prefixed: bool, distinct: bool) -> ColumnDef {
    let table_name = (prefixed || field.table_index != 0).then(|| alias.to_string());
    let mut expr = ExprNode::column(table_name.as_deref(), &field.name);
    expr.field_type = field.field_type;
    if let NodeKind::Column(column) = &mut expr.kind {
        column.table_index = Some(field.table_index);
        column.field_index = Some(field.field_index);
    }

    ColumnDef {
        table_name,
        field_name: field.name.clone(),
        field_alias: prefixed.then(|| format!("{alias}.{}", field.name)),
        table_index: Some(field.table_index),
        field_index: Some(field.field_index),
        field_type: field.field_type,
        distinct,
        expr: Some(expr),
        ..ColumnDef::default()
    }
}
