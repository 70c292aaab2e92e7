use crate::{
    ast::{
        node::{ColumnRef, ConstantValue, ExprNode, NodeKind},
        operator::Operator,
    },
    error::{SyntaxError, SyntaxResult},
};
use model::{FieldType, TableDef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use wkb::FlatType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    #[default]
    Recordset,
    DistinctList,
    SummaryRecord,
}

/// Summary function applied to a whole result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnFunction {
    Avg,
    Min,
    Max,
    Count,
    Sum,
    StddevPop,
    StddevSamp,
}

impl ColumnFunction {
    pub fn from_operator(op: Operator) -> Option<Self> {
        match op {
            Operator::Avg => Some(ColumnFunction::Avg),
            Operator::Min => Some(ColumnFunction::Min),
            Operator::Max => Some(ColumnFunction::Max),
            Operator::Count => Some(ColumnFunction::Count),
            Operator::Sum => Some(ColumnFunction::Sum),
            Operator::StddevPop => Some(ColumnFunction::StddevPop),
            Operator::StddevSamp => Some(ColumnFunction::StddevSamp),
            _ => None,
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            ColumnFunction::Avg => Operator::Avg,
            ColumnFunction::Min => Operator::Min,
            ColumnFunction::Max => Operator::Max,
            ColumnFunction::Count => Operator::Count,
            ColumnFunction::Sum => Operator::Sum,
            ColumnFunction::StddevPop => Operator::StddevPop,
            ColumnFunction::StddevSamp => Operator::StddevSamp,
        }
    }

    pub fn name(&self) -> &'static str {
        self.operator().name()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnDef {
    pub table_name: Option<String>,
    /// Bare field name; `*` or ending in `*` for wildcards.
    pub field_name: String,
    pub field_alias: Option<String>,
    pub table_index: Option<usize>,
    pub field_index: Option<usize>,
    pub field_type: FieldType,
    /// Target of a top-level CAST.
    pub target_type: Option<FieldType>,
    pub field_length: Option<i64>,
    pub field_precision: Option<i64>,
    pub target_geometry_type: Option<FlatType>,
    pub target_srid: Option<i64>,
    pub col_func: Option<ColumnFunction>,
    pub distinct: bool,
    /// The column expression. For summary columns this is the inner column.
    pub expr: Option<ExprNode>,
}

impl ColumnDef {
    pub fn is_wildcard(&self) -> bool {
        self.field_name.ends_with('*') && self.col_func != Some(ColumnFunction::Count)
    }

    /// Name of the result column.
    pub fn output_name(&self) -> &str {
        self.field_alias.as_deref().unwrap_or(&self.field_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinDef {
    pub secondary_table: usize,
    pub condition: ExprNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDef {
    pub table_name: Option<String>,
    pub field_name: String,
    pub ascending: bool,
    pub table_index: Option<usize>,
    pub field_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub query_mode: QueryMode,
    pub raw_select: String,
    pub columns: Vec<ColumnDef>,
    pub tables: Vec<TableDef>,
    pub joins: Vec<JoinDef>,
    pub where_expr: Option<ExprNode>,
    pub order_defs: Vec<OrderDef>,
    pub limit: Option<i64>,
    pub offset: i64,
    /// Next statement of a `UNION ALL` chain.
    pub next: Option<Box<SelectStatement>>,
    /// Fields excluded from a wildcard, keyed by the wildcard's column index.
    pub excluded_fields: BTreeMap<usize, Vec<ColumnRef>>,
    /// Set when wildcard expansion dropped a geometry field.
    pub excluded_geometry: bool,
}

impl SelectStatement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a result column.
    ///
    /// Field names are taken from a bare column, or from the column inside a
    /// CAST or summary function. CAST targets are validated here, and summary
    /// functions are stripped down to `col_func` plus their inner column.
    pub fn push_field(
        &mut self,
        expr: ExprNode,
        alias: Option<&str>,
        distinct: bool,
    ) -> SyntaxResult<()> {
        let mut def = ColumnDef {
            field_alias: alias.map(str::to_string),
            field_type: FieldType::Other,
            distinct,
            ..ColumnDef::default()
        };

        if let Some(column) = source_column(&expr) {
            def.table_name = column.table_name.clone();
            def.field_name = column.name.clone();
        }

        if expr.operator() == Some(Operator::Cast) {
            apply_cast_target(&mut def, expr.args())?;
        }

        def.expr = Some(expr);
        if let Some(op) = def.expr.as_ref().and_then(ExprNode::operator) {
            if let Some(func) = ColumnFunction::from_operator(op) {
                if distinct && func != ColumnFunction::Count {
                    return Err(SyntaxError::MisplacedDistinct);
                }
                let inner = strip_summary(def.expr.take(), op)?;
                def.col_func = Some(func);
                def.expr = Some(inner);
            }
        }

        debug!("Pushed column '{}'", def.output_name());
        self.columns.push(def);
        Ok(())
    }

    /// Excludes a field from the most recent wildcard column.
    pub fn push_exclude_field(&mut self, column: ColumnRef) -> SyntaxResult<()> {
        let index = match self.columns.last() {
            Some(def) if def.is_wildcard() => self.columns.len() - 1,
            _ => return Err(SyntaxError::ExcludeWithoutWildcard),
        };
        let excluded = self.excluded_fields.entry(index).or_default();
        let duplicate = excluded.iter().any(|e| {
            e.name.eq_ignore_ascii_case(&column.name)
                && match (&e.table_name, &column.table_name) {
                    (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                    (None, None) => true,
                    _ => false,
                }
        });
        if duplicate {
            return Err(SyntaxError::DuplicateExclusion(column.name));
        }
        excluded.push(column);
        Ok(())
    }

    pub fn push_table_def(
        &mut self,
        data_source: Option<&str>,
        table_name: &str,
        alias: Option<&str>,
    ) -> usize {
        let mut def = TableDef::new(table_name, alias);
        def.data_source = data_source.map(str::to_string);
        self.tables.push(def);
        self.tables.len() - 1
    }

    pub fn push_join(&mut self, secondary_table: usize, condition: ExprNode) {
        self.joins.push(JoinDef {
            secondary_table,
            condition,
        });
    }

    pub fn push_order_by(&mut self, table_name: Option<&str>, field_name: &str, ascending: bool) {
        self.order_defs.push(OrderDef {
            table_name: table_name.map(str::to_string),
            field_name: field_name.to_string(),
            ascending,
            table_index: None,
            field_index: None,
        });
    }

    /// Appends a statement at the end of the `UNION ALL` chain.
    pub fn push_union_all(&mut self, other: SelectStatement) {
        match self.next.as_mut() {
            Some(next) => next.push_union_all(other),
            None => self.next = Some(Box::new(other)),
        }
    }

    /// Puts joins in statement order and checks that join `i` targets table
    /// `i + 1`.
    pub fn postpreparse(&mut self) -> SyntaxResult<()> {
        self.joins.sort_by_key(|j| j.secondary_table);
        for (i, join) in self.joins.iter().enumerate() {
            if join.secondary_table != i + 1 {
                return Err(SyntaxError::JoinOrder {
                    expected: i + 1,
                    found: join.secondary_table,
                });
            }
        }
        if let Some(next) = self.next.as_mut() {
            next.postpreparse()?;
        }
        Ok(())
    }

    /// Statements of the `UNION ALL` chain, this one first.
    pub fn chain(&self) -> impl Iterator<Item = &SelectStatement> {
        std::iter::successors(Some(self), |s| s.next.as_deref())
    }
}

fn integer_argument(node: &ExprNode) -> Option<i64> {
    match (&node.kind, node.field_type) {
        (NodeKind::Constant(ConstantValue::Integer(v)), FieldType::Integer | FieldType::Integer64) => {
            Some(*v)
        }
        _ => None,
    }
}

fn apply_cast_target(def: &mut ColumnDef, args: &[ExprNode]) -> SyntaxResult<()> {
    let type_name = args.get(1).and_then(ExprNode::as_str).unwrap_or_default();
    let target = FieldType::from_cast_name(type_name)
        .ok_or_else(|| SyntaxError::UnknownCastType(type_name.to_string()))?;
    def.target_type = Some(target);
    def.field_type = target;

    if target == FieldType::Geometry {
        if let Some(subtype) = args.get(2) {
            let name = subtype
                .as_str()
                .ok_or(SyntaxError::CastGeometryTypeArgument)?;
            let flat = FlatType::from_name(name)
                .ok_or_else(|| SyntaxError::UnknownGeometryType(name.to_string()))?;
            def.target_geometry_type = Some(flat);
        }
        if let Some(srid) = args.get(3) {
            def.target_srid = Some(integer_argument(srid).ok_or(SyntaxError::CastPrecisionArgument)?);
        }
    } else {
        if let Some(length) = args.get(2) {
            def.field_length = Some(integer_argument(length).ok_or(SyntaxError::CastLengthArgument)?);
        }
        if let Some(precision) = args.get(3) {
            def.field_precision =
                Some(integer_argument(precision).ok_or(SyntaxError::CastPrecisionArgument)?);
        }
    }
    Ok(())
}

fn strip_summary(expr: Option<ExprNode>, op: Operator) -> SyntaxResult<ExprNode> {
    let mut args = match expr.map(|e| e.kind) {
        Some(NodeKind::Operation(operation)) => operation.args,
        _ => Vec::new(),
    };
    if args.len() != 1 {
        return Err(SyntaxError::SummaryArity(op.name().to_string()));
    }
    match args.pop() {
        Some(inner) if inner.is_column() => Ok(inner),
        _ => Err(SyntaxError::SummaryArgument(op.name().to_string())),
    }
}

/// The column a field is named after, looking through CASTs and summaries.
fn source_column(expr: &ExprNode) -> Option<&ColumnRef> {
    match &expr.kind {
        NodeKind::Column(column) => Some(column),
        NodeKind::Operation(op)
            if op.operator == Operator::Cast || op.operator.is_aggregate() =>
        {
            op.args.first().and_then(source_column)
        }
        _ => None,
    }
}
