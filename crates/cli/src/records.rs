//! Conversion between JSON records and expression values.

use crate::error::CliError;
use expression_engine::ExpressionError;
use model::{FieldDef, FieldSchema, FieldType};
use serde_json::{Map, Number, Value};
use sql_syntax::ExprNode;
use wkb::Geometry;

/// Field values of one record of the primary table, indexed by field index.
pub type Record = Vec<ExprNode>;

/// Reads a JSON array of objects keyed by field name. Missing keys are null.
pub fn load_records(source: &str, schema: &dyn FieldSchema) -> Result<Vec<Record>, CliError> {
    let value: Value = serde_json::from_str(source)?;
    let Value::Array(rows) = value else {
        return Err(CliError::RecordsShape);
    };
    let fields = schema.fields_of_table(0);
    rows.iter()
        .map(|row| match row {
            Value::Object(object) => to_record(object, &fields),
            _ => Err(CliError::RecordsShape),
        })
        .collect()
}

fn to_record(object: &Map<String, Value>, fields: &[&FieldDef]) -> Result<Record, CliError> {
    let width = fields.iter().map(|f| f.field_index + 1).max().unwrap_or(0);
    let mut record = vec![ExprNode::null(); width];
    for field in fields {
        let value = object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(&field.name))
            .map_or(&Value::Null, |(_, v)| v);
        record[field.field_index] = to_node(value, field)?;
    }
    Ok(record)
}

fn to_node(value: &Value, field: &FieldDef) -> Result<ExprNode, CliError> {
    let mismatch = || CliError::RecordValue {
        field: field.name.clone(),
        field_type: field.field_type.name().to_string(),
        value: value.to_string(),
    };
    if value.is_null() {
        return Ok(ExprNode::typed_null(field.field_type));
    }

    let node = match field.field_type {
        FieldType::Integer | FieldType::Integer64 => {
            let mut node = ExprNode::integer64(value.as_i64().ok_or_else(mismatch)?);
            node.field_type = field.field_type;
            node
        }
        FieldType::Float => ExprNode::float(value.as_f64().ok_or_else(mismatch)?),
        FieldType::Boolean => ExprNode::boolean(value.as_bool().ok_or_else(mismatch)?),
        FieldType::Geometry => {
            let text = value.as_str().ok_or_else(mismatch)?;
            ExprNode::geometry(Some(Geometry::from_wkt(text)?))
        }
        FieldType::String | FieldType::Date | FieldType::Time | FieldType::Timestamp => {
            let mut node = ExprNode::string(value.as_str().ok_or_else(mismatch)?);
            node.field_type = field.field_type;
            node
        }
        FieldType::Other => return Err(mismatch()),
    };
    Ok(node)
}

/// Column lookup handed to the evaluator.
pub fn fetch(node: &ExprNode, record: &[ExprNode]) -> Result<ExprNode, ExpressionError> {
    node.as_column()
        .filter(|column| column.table_index == Some(0))
        .and_then(|column| column.field_index)
        .and_then(|index| record.get(index))
        .cloned()
        .ok_or_else(|| ExpressionError::Fetch(node.unparse(None, '"')))
}

/// JSON rendering of an evaluated value. Geometries are written as WKT.
pub fn to_json(node: &ExprNode) -> Value {
    if node.is_null {
        return Value::Null;
    }
    match node.field_type {
        FieldType::Boolean => Value::Bool(node.is_true()),
        FieldType::Integer | FieldType::Integer64 => {
            node.as_integer().map_or(Value::Null, Value::from)
        }
        FieldType::Float => node
            .as_float()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        FieldType::Geometry => node
            .as_geometry()
            .map_or(Value::Null, |g| Value::String(g.to_wkt())),
        _ => node
            .as_str()
            .map_or(Value::Null, |s| Value::String(s.to_string())),
    }
}
