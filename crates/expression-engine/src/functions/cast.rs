use super::{expect_arity, float_value, integer_value, is_null_literal, text_value};
use crate::{
    context::EvalContext,
    error::{ExpressionError, Result},
};
use model::FieldType;
use sql_syntax::ExprNode;
use tracing::debug;
use wkb::Geometry;

/// Target type named by the second argument of a CAST node.
fn target_type(args: &[&ExprNode]) -> Result<FieldType> {
    let name = args.get(1).and_then(|a| a.as_str()).unwrap_or_default();
    FieldType::from_cast_name(name).ok_or_else(|| ExpressionError::UnknownCastType(name.to_string()))
}

pub fn check_cast(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    expect_arity(node, 2, 4)?;
    let args: Vec<&ExprNode> = node.args().iter().collect();
    let target = target_type(&args)?;
    let source = args[0];

    if source.field_type == FieldType::Geometry
        && !matches!(target, FieldType::String | FieldType::Geometry)
    {
        return Err(ExpressionError::CastFromGeometry(target.name().to_string()));
    }
    let castable_to_geometry = is_null_literal(source)
        || matches!(source.field_type, FieldType::String | FieldType::Geometry);
    if target == FieldType::Geometry && !castable_to_geometry {
        return Err(ExpressionError::CastToGeometry(
            source.field_type.name().to_string(),
        ));
    }
    Ok(target)
}

pub fn eval_cast(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    let target = target_type(args)?;
    let Some(value) = args.first() else {
        return Ok(ExprNode::typed_null(target));
    };
    if value.is_null {
        return Ok(ExprNode::typed_null(target));
    }

    let result = match target {
        FieldType::String => {
            let mut text = text_value(value);
            let width = args.get(2).and_then(|a| a.as_integer()).filter(|w| *w > 0);
            if let Some(width) = width {
                text = text.chars().take(width as usize).collect();
            }
            ExprNode::string(&text)
        }
        FieldType::Boolean => ExprNode::boolean(float_value(value) != 0.0),
        FieldType::Integer => {
            let wide = integer_value(value);
            let narrow = wide.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
            if narrow != wide {
                debug!("CAST of {wide} to integer saturates at {narrow}");
            }
            ExprNode::integer(narrow as i32)
        }
        FieldType::Integer64 => ExprNode::integer64(integer_value(value)),
        FieldType::Float => ExprNode::float(float_value(value)),
        FieldType::Date | FieldType::Time | FieldType::Timestamp => {
            let mut node = ExprNode::string(&text_value(value));
            node.field_type = target;
            node
        }
        FieldType::Geometry => ExprNode::geometry(to_geometry(value)),
        FieldType::Other => (*value).clone(),
    };
    Ok(result)
}

/// Geometries pass through, strings are read as WKT. Unreadable text gives
/// a null geometry.
fn to_geometry(value: &ExprNode) -> Option<Geometry> {
    if let Some(geometry) = value.as_geometry() {
        return Some(geometry.clone());
    }
    let text = value.as_str()?;
    Geometry::from_wkt(text)
        .inspect_err(|err| debug!("Cannot cast '{text}' to geometry: {err}"))
        .ok()
}
