use expression_engine::{Check, CheckOptions, EvalContext, Evaluator, ExpressionError, Result};
use model::{FieldList, FieldType, ParseOptions, TableDef};
use sql_syntax::{ExprNode, parse_expression};
use wkb::Geometry;

pub fn towns_schema() -> FieldList {
    let mut list = FieldList::new();
    let towns = list.add_table(TableDef::new("towns", None)).unwrap();
    for (name, field_type) in [
        ("id", FieldType::Integer),
        ("name", FieldType::String),
        ("pop", FieldType::Integer64),
        ("density", FieldType::Float),
        ("founded", FieldType::Date),
        ("geom", FieldType::Geometry),
        ("tags", FieldType::String),
    ] {
        list.add_field(towns, name, field_type).unwrap();
    }
    let regions = list.add_table(TableDef::new("regions", Some("r"))).unwrap();
    list.add_field(regions, "code", FieldType::String).unwrap();
    list
}

/// Field values of one town, in schema order.
pub fn ottawa() -> Vec<ExprNode> {
    vec![
        ExprNode::integer(7),
        ExprNode::string("Ottawa"),
        ExprNode::integer64(1_017_449),
        ExprNode::float(334.8),
        ExprNode::string("1826-09-26"),
        ExprNode::geometry(Some(Geometry::polygon(&[&[
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 2.0),
            (0.0, 2.0),
            (0.0, 0.0),
        ]]))),
        ExprNode::string(r#""capital"=>"yes", "province"=>"ON""#),
    ]
}

/// A town whose name and density are unknown.
pub fn unnamed() -> Vec<ExprNode> {
    let mut record = ottawa();
    record[1] = ExprNode::nullable_string(None);
    record[3] = ExprNode::typed_null(FieldType::Float);
    record
}

pub fn fetch(node: &ExprNode, record: &[ExprNode]) -> Result<ExprNode> {
    node.as_column()
        .and_then(|column| column.field_index)
        .and_then(|index| record.get(index))
        .cloned()
        .ok_or_else(|| ExpressionError::Fetch(format!("{node:?}")))
}

pub fn accepting_custom() -> ParseOptions {
    ParseOptions {
        accept_custom_funcs: true,
        ..ParseOptions::default()
    }
}

/// Parses and checks an expression against the towns schema.
pub fn checked(text: &str, options: &CheckOptions) -> Result<ExprNode> {
    let mut node = parse_expression(text, &accepting_custom()).unwrap();
    node.check(&towns_schema(), options)?;
    Ok(node)
}

pub fn eval_on(node: &ExprNode, record: &[ExprNode], ctx: &EvalContext) -> Result<ExprNode> {
    node.evaluate(&fetch, record, ctx)
}

/// NOT nested `depth` times around a comparison.
pub fn nested_not(depth: usize) -> String {
    format!("{}id = 7", "NOT ".repeat(depth))
}
