//! Schema-aware resolution of a parsed select statement.

use crate::{
    error::{PlanError, PlanResult, qualified_name},
    wildcard::expand_wildcard,
};
use expression_engine::{Check, CheckOptions, CustomFunctionRegistrar};
use model::{FieldSchema, FieldType, ParseOptions};
use sql_syntax::{ColumnDef, ColumnFunction, ExprNode, NodeKind, Operator, QueryMode, SelectStatement};
use tracing::debug;

/// Resolves select statements against one field schema.
#[derive(Clone, Copy)]
pub struct SelectPlanner<'a> {
    schema: &'a dyn FieldSchema,
    options: &'a ParseOptions,
    custom_functions: Option<&'a dyn CustomFunctionRegistrar>,
}

impl<'a> SelectPlanner<'a> {
    pub fn new(schema: &'a dyn FieldSchema, options: &'a ParseOptions) -> Self {
        Self {
            schema,
            options,
            custom_functions: None,
        }
    }

    pub fn with_custom_functions(mut self, registrar: &'a dyn CustomFunctionRegistrar) -> Self {
        self.custom_functions = Some(registrar);
        self
    }

    pub fn expand_wildcard(&self, select: &mut SelectStatement) -> PlanResult<()> {
        expand_wildcard(
            select,
            self.schema,
            self.options.always_prefix_with_table_name,
        )
    }

    /// Expands wildcards, binds every column, join and ORDER BY field to the
    /// schema, settles the query mode and checks the WHERE clause. Only this
    /// member is resolved; a `UNION ALL` continuation names its own tables and
    /// needs a schema of its own.
    pub fn parse(&self, select: &mut SelectStatement) -> PlanResult<()> {
        self.expand_wildcard(select)?;
        for def in select.columns.iter_mut() {
            self.resolve_column(def)?;
        }
        select.query_mode = classify(&select.columns)?;

        let join_options = self.check_options(true);
        for join in select.joins.iter_mut() {
            join.condition.check(self.schema, &join_options)?;
            validate_join_fields(&join.condition, join.secondary_table)?;
        }

        for order in select.order_defs.iter_mut() {
            let name = qualified_name(order.table_name.as_deref(), &order.field_name);
            let found = self
                .schema
                .identify_field(order.table_name.as_deref(), &order.field_name)
                .ok_or_else(|| PlanError::UnknownField(name.clone()))?;
            if found.table_index != 0 {
                return Err(PlanError::OrderBySecondaryField(name));
            }
            if found.field_type == FieldType::Geometry {
                return Err(PlanError::OrderByGeometry(name));
            }
            order.table_index = Some(found.table_index);
            order.field_index = Some(found.field_index);
        }

        if let Some(where_expr) = select.where_expr.as_mut() {
            let options = self.check_options(self.options.allow_fields_in_secondary_tables_in_where);
            where_expr.check(self.schema, &options)?;
        }

        debug!(
            "Resolved select with {} columns in {:?} mode",
            select.columns.len(),
            select.query_mode
        );
        Ok(())
    }

    fn check_options(&self, allow_secondary_table_fields: bool) -> CheckOptions<'a> {
        CheckOptions {
            allow_secondary_table_fields,
            allow_mismatched_comparison_types: self.options.allow_mismatched_comparison_types,
            custom_functions: self.custom_functions,
        }
    }

    fn resolve_column(&self, def: &mut ColumnDef) -> PlanResult<()> {
        if def.col_func == Some(ColumnFunction::Count) && def.field_name == "*" {
            def.field_type = FieldType::Integer64;
            return Ok(());
        }
        let Some(expr) = def.expr.as_mut() else {
            return Ok(());
        };

        if !expr.is_column() {
            def.field_type = expr.check(self.schema, &self.check_options(true))?;
            if let Some((table_index, field_index)) = cast_source(expr) {
                def.table_index = table_index;
                def.field_index = field_index;
            }
        } else if let NodeKind::Column(column) = &mut expr.kind {
            if !column.is_resolved() {
                let found = self
                    .schema
                    .identify_field(column.table_name.as_deref(), &column.name)
                    .ok_or_else(|| {
                        PlanError::UnknownField(qualified_name(
                            column.table_name.as_deref(),
                            &column.name,
                        ))
                    })?;
                column.table_index = Some(found.table_index);
                column.field_index = Some(found.field_index);
                expr.field_type = found.field_type;
            }
            def.table_index = column.table_index;
            def.field_index = column.field_index;
            def.field_type = expr.field_type;
        }

        if let Some(function) = def.col_func {
            check_summary_source(function, def)?;
            def.field_type = summary_type(function, def.field_type);
        }
        Ok(())
    }
}

/// Indices of the column directly under a top-level CAST.
fn cast_source(expr: &ExprNode) -> Option<(Option<usize>, Option<usize>)> {
    if expr.operator() != Some(Operator::Cast) {
        return None;
    }
    let column = expr.args().first()?.as_column()?;
    Some((column.table_index, column.field_index))
}

fn check_summary_source(function: ColumnFunction, def: &ColumnDef) -> PlanResult<()> {
    let kind = match (function, def.field_type) {
        (function, FieldType::Geometry) if function != ColumnFunction::Count => "geometry",
        (
            ColumnFunction::Avg
            | ColumnFunction::Sum
            | ColumnFunction::StddevPop
            | ColumnFunction::StddevSamp,
            FieldType::String,
        ) => "string",
        _ => return Ok(()),
    };
    Err(PlanError::IllegalSummary {
        function: function.name().to_string(),
        kind,
        field: def.field_name.clone(),
    })
}

/// Type of a summary column computed over a field of type `source`.
fn summary_type(function: ColumnFunction, source: FieldType) -> FieldType {
    match function {
        ColumnFunction::Count => FieldType::Integer64,
        ColumnFunction::Min | ColumnFunction::Max => source,
        ColumnFunction::Sum if source.is_integer() => FieldType::Integer64,
        ColumnFunction::Avg if source.is_temporal() => source,
        _ => FieldType::Float,
    }
}

/// Query mode implied by the column list. Every column has to agree.
fn classify(columns: &[ColumnDef]) -> PlanResult<QueryMode> {
    let mut mode = None;
    for def in columns {
        let this = match (def.col_func, def.distinct) {
            (Some(_), _) => QueryMode::SummaryRecord,
            (None, true) => QueryMode::DistinctList,
            (None, false) => QueryMode::Recordset,
        };
        match mode {
            None => mode = Some(this),
            Some(previous) if previous != this => return Err(PlanError::MixedQueryMode),
            Some(_) => {}
        }
    }

    let mode = mode.unwrap_or_default();
    if mode == QueryMode::DistinctList && columns.len() > 1 {
        return Err(PlanError::MultipleDistinct);
    }
    Ok(mode)
}

/// A join condition may only use the primary table and the table it joins.
fn validate_join_fields(node: &ExprNode, secondary_table: usize) -> PlanResult<()> {
    if let Some(column) = node.as_column() {
        let allowed = matches!(column.table_index, Some(t) if t == 0 || t == secondary_table);
        if !allowed {
            return Err(PlanError::JoinField(qualified_name(
                column.table_name.as_deref(),
                &column.name,
            )));
        }
    }
    node.args()
        .iter()
        .try_for_each(|arg| validate_join_fields(arg, secondary_table))
}
