use crate::{
    binding::bind_tables,
    error::PlanResult,
    resolve::SelectPlanner,
};
use expression_engine::CustomFunctionRegistrar;
use model::{FieldSchema, FieldType, ParseOptions};
use serde::Serialize;
use sql_syntax::{ColumnDef, QueryMode, SelectStatement, parse_select};

/// Serializable outline of a resolved select statement.
#[derive(Debug, Clone, Serialize)]
pub struct SelectPlan {
    pub query_mode: QueryMode,
    pub tables: Vec<String>,
    pub columns: Vec<ColumnPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    pub order_by: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    pub offset: i64,
    pub excluded_geometry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub union_all: Option<Box<SelectPlan>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnPlan {
    pub name: String,
    pub table_index: Option<usize>,
    pub field_index: Option<usize>,
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<&'static str>,
    pub distinct: bool,
}

impl From<&ColumnDef> for ColumnPlan {
    fn from(def: &ColumnDef) -> Self {
        Self {
            name: def.output_name().to_string(),
            table_index: def.table_index,
            field_index: def.field_index,
            field_type: def.field_type,
            function: def.col_func.map(|f| f.name()),
            distinct: def.distinct,
        }
    }
}

impl SelectPlan {
    /// Outlines one member of a statement, rendering expressions with names
    /// from `schema`. A `UNION ALL` continuation is attached separately since
    /// it is bound to its own tables.
    pub fn new(select: &SelectStatement, schema: &dyn FieldSchema, quote_char: char) -> Self {
        Self {
            query_mode: select.query_mode,
            tables: select.tables.iter().map(|t| t.table_alias.clone()).collect(),
            columns: select.columns.iter().map(ColumnPlan::from).collect(),
            where_clause: select
                .where_expr
                .as_ref()
                .map(|expr| expr.unparse(Some(schema), quote_char)),
            order_by: select
                .order_defs
                .iter()
                .map(|o| {
                    let direction = if o.ascending { "ASC" } else { "DESC" };
                    format!("{} {direction}", o.field_name)
                })
                .collect(),
            limit: select.limit,
            offset: select.offset,
            excluded_geometry: select.excluded_geometry,
            union_all: None,
        }
    }

    pub fn to_json(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parses `sql`, then binds and resolves every `UNION ALL` member against
/// the tables it names in `catalog`.
pub fn plan_select(
    sql: &str,
    catalog: &dyn FieldSchema,
    options: &ParseOptions,
    custom_functions: Option<&dyn CustomFunctionRegistrar>,
) -> PlanResult<(SelectStatement, SelectPlan)> {
    let mut select = parse_select(sql, options)?;
    let plan = plan_member(&mut select, catalog, options, custom_functions)?;
    Ok((select, plan))
}

fn plan_member(
    select: &mut SelectStatement,
    catalog: &dyn FieldSchema,
    options: &ParseOptions,
    custom_functions: Option<&dyn CustomFunctionRegistrar>,
) -> PlanResult<SelectPlan> {
    let schema = bind_tables(select, catalog)?;
    let mut planner = SelectPlanner::new(&schema, options);
    if let Some(registrar) = custom_functions {
        planner = planner.with_custom_functions(registrar);
    }
    planner.parse(select)?;

    let mut plan = SelectPlan::new(select, &schema, options.column_quote);
    if let Some(next) = select.next.as_deref_mut() {
        let next_plan = plan_member(next, catalog, options, custom_functions)?;
        plan.union_all = Some(Box::new(next_plan));
    }
    Ok(plan)
}
