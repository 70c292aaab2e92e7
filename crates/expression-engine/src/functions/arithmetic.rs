//! `+ - * / %`. Integer arithmetic wraps on overflow.

use super::{any_null, expect_arity, is_null_literal, reject_geometries, text_value, type_mismatch};
use crate::{
    context::EvalContext,
    error::{ExpressionError, Result},
};
use model::FieldType;
use sql_syntax::{ExprNode, Operator};

pub fn check_arithmetic(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    expect_arity(node, 2, 2)?;
    reject_geometries(node)?;
    let types: Vec<FieldType> = node
        .args()
        .iter()
        .filter(|arg| !is_null_literal(arg))
        .map(|arg| arg.field_type)
        .collect();

    let operator = node.operator();
    if operator == Some(Operator::Add) && types.first().is_some_and(FieldType::is_string_like) {
        if types.iter().all(FieldType::is_string_like) {
            return Ok(FieldType::String);
        }
        return Err(type_mismatch(node));
    }
    if !types.iter().all(FieldType::is_numeric) {
        return Err(type_mismatch(node));
    }
    if operator == Some(Operator::Modulus) && !types.iter().all(FieldType::is_integer) {
        return Err(type_mismatch(node));
    }
    Ok(promote(&types))
}

/// Widest numeric type among the operands.
fn promote(types: &[FieldType]) -> FieldType {
    if types.contains(&FieldType::Float) {
        FieldType::Float
    } else if types.contains(&FieldType::Integer64) {
        FieldType::Integer64
    } else {
        FieldType::Integer
    }
}

pub fn eval_arithmetic(node: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    let (Some(operator), [a, b]) = (node.operator(), args) else {
        return Err(type_mismatch(node));
    };
    let string_add = operator == Operator::Add
        && (a.field_type.is_string_like() || b.field_type.is_string_like());
    let result_type = if string_add {
        FieldType::String
    } else {
        promote(&[a.field_type, b.field_type])
    };
    if any_null(args) {
        return Ok(ExprNode::typed_null(result_type));
    }
    if string_add {
        return Ok(ExprNode::string(&(text_value(a) + &text_value(b))));
    }

    if let (Some(x), Some(y)) = (a.as_integer(), b.as_integer()) {
        let value = match operator {
            Operator::Add => x.wrapping_add(y),
            Operator::Subtract => x.wrapping_sub(y),
            Operator::Multiply => x.wrapping_mul(y),
            Operator::Divide | Operator::Modulus if y == 0 => {
                return Err(ExpressionError::DivisionByZero);
            }
            Operator::Divide => x.wrapping_div(y),
            Operator::Modulus => x.wrapping_rem(y),
            _ => return Err(type_mismatch(node)),
        };
        let mut result = ExprNode::integer64(value);
        result.field_type = match result_type {
            FieldType::Integer64 => FieldType::Integer64,
            _ => FieldType::Integer,
        };
        return Ok(result);
    }

    let (Some(x), Some(y)) = (a.as_float(), b.as_float()) else {
        return Err(type_mismatch(node));
    };
    let value = match operator {
        Operator::Add => x + y,
        Operator::Subtract => x - y,
        Operator::Multiply => x * y,
        Operator::Divide => x / y,
        Operator::Modulus if y == 0.0 => return Err(ExpressionError::DivisionByZero),
        Operator::Modulus => x % y,
        _ => return Err(type_mismatch(node)),
    };
    Ok(ExprNode::float(value))
}
