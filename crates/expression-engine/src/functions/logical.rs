//! AND, OR and NOT under three-valued logic, and IS NULL.

use super::{boolean_result, expect_arity, is_null_literal, type_mismatch};
use crate::{context::EvalContext, error::Result};
use model::FieldType;
use sql_syntax::{ExprNode, Operator};

pub fn check_logical(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    match node.operator() {
        Some(Operator::Not) => expect_arity(node, 1, 1)?,
        _ => expect_arity(node, 2, 2)?,
    }
    let all_boolean = node
        .args()
        .iter()
        .all(|arg| arg.field_type.is_integer() || is_null_literal(arg));
    if !all_boolean {
        return Err(type_mismatch(node));
    }
    Ok(FieldType::Boolean)
}

/// Truth value of an evaluated argument; `None` when it is null.
fn truth(node: &ExprNode) -> Option<bool> {
    node.as_float().map(|v| v != 0.0)
}

pub(crate) fn and3(values: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut unknown = false;
    for value in values {
        match value {
            Some(false) => return Some(false),
            None => unknown = true,
            Some(true) => {}
        }
    }
    if unknown { None } else { Some(true) }
}

pub(crate) fn or3(values: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut unknown = false;
    for value in values {
        match value {
            Some(true) => return Some(true),
            None => unknown = true,
            Some(false) => {}
        }
    }
    if unknown { None } else { Some(false) }
}

pub fn eval_and(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    Ok(boolean_result(and3(args.iter().map(|arg| truth(arg)))))
}

pub fn eval_or(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    Ok(boolean_result(or3(args.iter().map(|arg| truth(arg)))))
}

pub fn eval_not(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    let value = args.first().and_then(|arg| truth(arg));
    Ok(boolean_result(value.map(|v| !v)))
}

pub fn check_is_null(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    expect_arity(node, 1, 1)?;
    Ok(FieldType::Boolean)
}

pub fn eval_is_null(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    Ok(ExprNode::boolean(args.first().is_some_and(|arg| arg.is_null)))
}
