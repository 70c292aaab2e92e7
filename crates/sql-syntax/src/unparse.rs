//! Renders expression trees and select statements back to SQL text that
//! parses to an equivalent tree.

use crate::{
    ast::{
        node::{ColumnRef, ConstantValue, ExprNode, NodeKind, Operation},
        operator::Operator,
        select::{QueryMode, SelectStatement},
    },
    keywords::is_keyword,
};
use model::{FieldSchema, FieldType};

/// Formats a float like C's `%.15g`.
pub fn format_g15(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{value:.14e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if !(-4..15).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (14 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Wraps `text` in `quote`, doubling embedded quote characters.
pub fn quote(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}

/// Quotes an identifier unless it reads back unchanged as a bare name.
pub fn quote_if_necessary(text: &str, quote_char: char) -> String {
    if text == "*" {
        return text.to_string();
    }
    let needs_quotes = text.is_empty()
        || text.starts_with(|c: char| c == '_' || c.is_ascii_digit())
        || text.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_'))
        || is_keyword(text);
    if needs_quotes {
        quote(text, quote_char)
    } else {
        text.to_string()
    }
}

impl ExprNode {
    /// Renders the tree as SQL. With a schema, resolved columns are named as
    /// the schema names them.
    pub fn unparse(&self, schema: Option<&dyn FieldSchema>, quote_char: char) -> String {
        match &self.kind {
            NodeKind::Constant(value) => self.unparse_constant(value),
            NodeKind::Column(column) => unparse_column(column, schema, quote_char),
            NodeKind::Operation(op) => unparse_operation(op, schema, quote_char),
        }
    }

    fn unparse_constant(&self, value: &ConstantValue) -> String {
        if self.is_null {
            return "NULL".to_string();
        }
        match value {
            ConstantValue::Integer(v) => v.to_string(),
            ConstantValue::Float(v) => {
                let mut text = format_g15(*v);
                if !text.contains(['.', 'e', 'E']) {
                    text.push('.');
                }
                text
            }
            ConstantValue::String(s) if self.field_type == FieldType::Timestamp => {
                format!("TIMESTAMP {}", quote(s, '\''))
            }
            ConstantValue::String(s) => quote(s, '\''),
            ConstantValue::Geometry(Some(g)) => quote(&g.to_wkt(), '\''),
            ConstantValue::Geometry(None) => "NULL".to_string(),
        }
    }

    /// Operands that are themselves operations are parenthesized.
    fn unparse_operand(&self, schema: Option<&dyn FieldSchema>, quote_char: char) -> String {
        let text = self.unparse(schema, quote_char);
        if self.is_operation() {
            format!("({text})")
        } else {
            text
        }
    }
}

fn unparse_column(column: &ColumnRef, schema: Option<&dyn FieldSchema>, quote_char: char) -> String {
    if let (Some(schema), Some(table_index), Some(field_index)) =
        (schema, column.table_index, column.field_index)
    {
        if let Some(name) = schema.field_name(table_index, field_index) {
            let field = quote_if_necessary(name, quote_char);
            return match schema.tables().get(table_index) {
                Some(table) if table_index > 0 => {
                    format!("{}.{}", quote_if_necessary(&table.table_alias, quote_char), field)
                }
                _ => field,
            };
        }
    }

    let field = quote_if_necessary(&column.name, quote_char);
    match &column.table_name {
        Some(table) => format!("{}.{}", quote_if_necessary(table, quote_char), field),
        None => field,
    }
}

fn unparse_operation(op: &Operation, schema: Option<&dyn FieldSchema>, quote_char: char) -> String {
    let operands: Vec<String> = op
        .args
        .iter()
        .map(|a| a.unparse_operand(schema, quote_char))
        .collect();
    let operand = |i: usize| operands.get(i).map(String::as_str).unwrap_or_default();

    match op.operator {
        Operator::Not => {
            let inner = op
                .args
                .first()
                .map(|a| a.unparse(schema, quote_char))
                .unwrap_or_default();
            format!("NOT ({inner})")
        }
        Operator::IsNull => format!("{} IS NULL", operand(0)),
        Operator::In => format!("{} IN({})", operand(0), operands[1.min(operands.len())..].join(",")),
        Operator::Between => format!("{} BETWEEN {} AND {}", operand(0), operand(1), operand(2)),
        Operator::Cast => unparse_cast(op, schema, quote_char),
        Operator::Like | Operator::ILike if operands.len() > 2 => format!(
            "{} {} {} ESCAPE {}",
            operand(0),
            op.operator,
            operand(1),
            operand(2)
        ),
        operator if operator.is_binary_infix() => {
            format!("{} {} {}", operand(0), operator, operand(1))
        }
        Operator::CustomFunc => format!(
            "{}({})",
            quote_if_necessary(op.function_name.as_deref().unwrap_or_default(), quote_char),
            operands.join(",")
        ),
        operator => format!("{}({})", operator, operands.join(",")),
    }
}

/// `CAST(x AS name(a,b))`; the type name and its arguments are emitted bare.
fn unparse_cast(op: &Operation, schema: Option<&dyn FieldSchema>, quote_char: char) -> String {
    let value = op
        .args
        .first()
        .map(|a| a.unparse(schema, quote_char))
        .unwrap_or_default();
    let type_name = op.args.get(1).and_then(ExprNode::as_str).unwrap_or_default();
    let type_args: Vec<String> = op
        .args
        .iter()
        .skip(2)
        .map(|a| match a.as_str() {
            Some(s) => s.to_string(),
            None => a.unparse(schema, quote_char),
        })
        .collect();
    if type_args.is_empty() {
        format!("CAST({value} AS {type_name})")
    } else {
        format!("CAST({value} AS {type_name}({}))", type_args.join(","))
    }
}

impl SelectStatement {
    /// Renders the statement, and any `UNION ALL` continuation, as SQL.
    pub fn unparse(&self) -> String {
        let q = '"';
        let mut sql = String::from("SELECT ");
        let distinct = self.query_mode == QueryMode::DistinctList
            || self.columns.iter().any(|c| c.distinct && c.col_func.is_none());
        if distinct {
            sql.push_str("DISTINCT ");
        }

        for (i, def) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            match (&def.expr, def.col_func) {
                (Some(expr), None) => sql.push_str(&expr.unparse(None, q)),
                (_, func) => {
                    if let Some(func) = func {
                        sql.push_str(func.name());
                        sql.push('(');
                        if def.distinct {
                            sql.push_str("DISTINCT ");
                        }
                    }
                    if let Some(table) = def.table_name.as_deref().filter(|t| !t.is_empty()) {
                        if def.field_alias.is_none() || self.tables.len() > 1 {
                            sql.push_str(&quote_if_necessary(table, q));
                            sql.push('.');
                        }
                    }
                    sql.push_str(&quote_if_necessary(&def.field_name, q));
                    if func.is_some() {
                        sql.push(')');
                    }
                }
            }
            if let Some(excluded) = self.excluded_fields.get(&i) {
                let names: Vec<String> = excluded
                    .iter()
                    .map(|c| unparse_column(c, None, q))
                    .collect();
                sql.push_str(&format!(" EXCEPT ({})", names.join(", ")));
            }
            if let Some(alias) = def.field_alias.as_deref().filter(|a| *a != def.field_name) {
                sql.push_str(" AS ");
                sql.push_str(&quote(alias, q));
            }
        }

        if let Some(primary) = self.tables.first() {
            sql.push_str(" FROM ");
            sql.push_str(&unparse_table(primary));
        }
        for join in &self.joins {
            if let Some(table) = self.tables.get(join.secondary_table) {
                sql.push_str(" JOIN ");
                sql.push_str(&unparse_table(table));
                sql.push_str(" ON ");
                sql.push_str(&join.condition.unparse(None, q));
            }
        }
        if let Some(where_expr) = &self.where_expr {
            sql.push_str(" WHERE ");
            sql.push_str(&where_expr.unparse(None, q));
        }
        if !self.order_defs.is_empty() {
            sql.push_str(" ORDER BY ");
            let specs: Vec<String> = self
                .order_defs
                .iter()
                .map(|o| {
                    let mut term = match &o.table_name {
                        Some(t) => format!("{}.", quote_if_necessary(t, q)),
                        None => String::new(),
                    };
                    term.push_str(&quote_if_necessary(&o.field_name, q));
                    if !o.ascending {
                        term.push_str(" DESC");
                    }
                    term
                })
                .collect();
            sql.push_str(&specs.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if self.offset > 0 {
            sql.push_str(&format!(" OFFSET {}", self.offset));
        }
        if let Some(next) = &self.next {
            sql.push_str(" UNION ALL ");
            sql.push_str(&next.unparse());
        }
        sql
    }
}

fn unparse_table(table: &model::TableDef) -> String {
    let mut text = String::new();
    if let Some(data_source) = &table.data_source {
        text.push_str(&quote(data_source, '\''));
        text.push('.');
    }
    text.push_str(&quote_if_necessary(&table.table_name, '"'));
    if table.table_alias != table.table_name {
        text.push_str(" AS ");
        text.push_str(&quote_if_necessary(&table.table_alias, '"'));
    }
    text
}
