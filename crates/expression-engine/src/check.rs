//! Type checking: resolves column references against a schema and assigns
//! a result type to every node.

use crate::{
    error::{ExpressionError, Result},
    registry::{self, CustomFunctionRegistrar},
};
use model::{FieldSchema, FieldType};
use sql_syntax::{ColumnRef, ExprNode, NodeKind};
use tracing::debug;

/// Nesting limit shared by checking and evaluation.
pub const MAX_DEPTH: usize = 32;

#[derive(Clone, Copy, Default)]
pub struct CheckOptions<'a> {
    pub allow_secondary_table_fields: bool,
    pub allow_mismatched_comparison_types: bool,
    pub custom_functions: Option<&'a dyn CustomFunctionRegistrar>,
}

pub trait Check {
    /// Validates the tree and returns its type. Nodes are annotated in place.
    fn check(&mut self, schema: &dyn FieldSchema, options: &CheckOptions) -> Result<FieldType>;
}

impl Check for ExprNode {
    fn check(&mut self, schema: &dyn FieldSchema, options: &CheckOptions) -> Result<FieldType> {
        check_node(self, schema, options, 0)
    }
}

fn check_node(
    node: &mut ExprNode,
    schema: &dyn FieldSchema,
    options: &CheckOptions,
    depth: usize,
) -> Result<FieldType> {
    if depth >= MAX_DEPTH {
        debug!("Expression nesting exceeds {MAX_DEPTH} levels");
        return Err(ExpressionError::TooDeep);
    }

    match &mut node.kind {
        NodeKind::Constant(_) => Ok(node.field_type),
        NodeKind::Column(column) if column.is_resolved() => {
            if column.table_index.is_some_and(|t| t != 0)
                && !options.allow_secondary_table_fields
            {
                return Err(ExpressionError::SecondaryTableField(display_name(column)));
            }
            Ok(node.field_type)
        }
        NodeKind::Column(column) => {
            let field_type = resolve_column(column, schema, options)?;
            node.field_type = field_type;
            Ok(field_type)
        }
        NodeKind::Operation(operation) => {
            let def = registry::resolve(operation, options.custom_functions)?;
            for arg in operation.args.iter_mut() {
                check_node(arg, schema, options, depth + 1)?;
            }
            let field_type = (def.checker)(node, options.allow_mismatched_comparison_types)?;
            node.field_type = field_type;
            Ok(field_type)
        }
    }
}

fn display_name(column: &ColumnRef) -> String {
    match &column.table_name {
        Some(table) => format!("{table}.{}", column.name),
        None => column.name.clone(),
    }
}

fn resolve_column(
    column: &mut ColumnRef,
    schema: &dyn FieldSchema,
    options: &CheckOptions,
) -> Result<FieldType> {
    let found = schema
        .identify_field(column.table_name.as_deref(), &column.name)
        .ok_or_else(|| ExpressionError::UnknownField(display_name(column)))?;
    if found.table_index != 0 && !options.allow_secondary_table_fields {
        return Err(ExpressionError::SecondaryTableField(display_name(column)));
    }

    column.table_index = Some(found.table_index);
    column.field_index = Some(found.field_index);
    Ok(found.field_type)
}
