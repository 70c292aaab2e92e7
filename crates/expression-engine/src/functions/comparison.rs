//! Comparisons, IN and BETWEEN.

use super::{
    any_null, boolean_result, expect_arity, is_null_literal, logical::and3, reject_geometries,
    text_value, type_mismatch,
};
use crate::{context::EvalContext, error::Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use model::FieldType;
use sql_syntax::{ConstantValue, ExprNode, NodeKind, Operator};
use std::cmp::Ordering;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

pub fn check_comparison(node: &mut ExprNode, allow_mismatched: bool) -> Result<FieldType> {
    match node.operator() {
        Some(Operator::In) => expect_arity(node, 2, usize::MAX)?,
        Some(Operator::Between) => expect_arity(node, 3, 3)?,
        _ => expect_arity(node, 2, 2)?,
    }
    reject_geometries(node)?;
    convert_numeric_strings(node);

    let args = node.args();
    let reference = args
        .iter()
        .find(|arg| !is_null_literal(arg))
        .map(|arg| arg.field_type);
    if let Some(reference) = reference {
        let compatible = args
            .iter()
            .filter(|arg| !is_null_literal(arg))
            .all(|arg| comparable(reference, arg.field_type));
        if !compatible && !allow_mismatched {
            return Err(type_mismatch(node));
        }
    }
    Ok(FieldType::Boolean)
}

fn comparable(a: FieldType, b: FieldType) -> bool {
    a == b
        || a == FieldType::Other
        || b == FieldType::Other
        || (a.is_numeric() && b.is_numeric())
        || (a.is_string_like() && b.is_string_like())
}

/// Turns string constants that spell a number into numeric constants when
/// the first argument is numeric.
fn convert_numeric_strings(node: &mut ExprNode) {
    let Some(args) = node.args_mut() else {
        return;
    };
    if !args.first().is_some_and(|a| a.field_type.is_numeric()) {
        return;
    }
    for arg in args.iter_mut().skip(1) {
        if !arg.is_constant() || arg.field_type != FieldType::String {
            continue;
        }
        let Some(text) = arg.as_str().map(str::trim) else {
            continue;
        };
        if let Ok(v) = text.parse::<i64>() {
            *arg = match i32::try_from(v) {
                Ok(small) => ExprNode::integer(small),
                Err(_) => ExprNode::integer64(v),
            };
        } else if let Ok(v) = text.parse::<f64>() {
            *arg = ExprNode::float(v);
        }
    }
}

/// Orders two non-null values. `None` when they cannot be ordered.
pub(crate) fn compare_values(a: &ExprNode, b: &ExprNode) -> Option<Ordering> {
    let (NodeKind::Constant(left), NodeKind::Constant(right)) = (&a.kind, &b.kind) else {
        return None;
    };
    match (left, right) {
        (ConstantValue::Integer(x), ConstantValue::Integer(y)) => Some(x.cmp(y)),
        (
            ConstantValue::Integer(_) | ConstantValue::Float(_),
            ConstantValue::Integer(_) | ConstantValue::Float(_),
        ) => a.as_float()?.partial_cmp(&b.as_float()?),
        (ConstantValue::String(x), ConstantValue::String(y)) => {
            if a.field_type.is_temporal() || b.field_type.is_temporal() {
                if let (Some(x), Some(y)) = (parse_temporal(x), parse_temporal(y)) {
                    return Some(x.cmp(&y));
                }
            }
            Some(x.as_str().cmp(y.as_str()))
        }
        (ConstantValue::String(text), _) => compare_text_with(text, b),
        (_, ConstantValue::String(text)) => compare_text_with(text, a).map(Ordering::reverse),
        _ => None,
    }
}

/// Compares a string with a number numerically when it parses, textually
/// otherwise.
fn compare_text_with(text: &str, other: &ExprNode) -> Option<Ordering> {
    match (text.trim().parse::<f64>(), other.as_float()) {
        (Ok(x), Some(y)) => x.partial_cmp(&y),
        _ => Some(text.cmp(text_value(other).as_str())),
    }
}

/// Reads a date, time or timestamp value. A bare time lands on 1970-01-01.
pub(crate) fn parse_temporal(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    let time = NaiveTime::parse_from_str(text, "%H:%M:%S%.f").ok()?;
    Some(NaiveDate::from_ymd_opt(1970, 1, 1)?.and_time(time))
}

/// Applies a comparison operator to an ordering.
pub(crate) fn holds(operator: Operator, ordering: Ordering) -> bool {
    match operator {
        Operator::Eq => ordering == Ordering::Equal,
        Operator::Ne => ordering != Ordering::Equal,
        Operator::Lt => ordering == Ordering::Less,
        Operator::Le => ordering != Ordering::Greater,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::Ge => ordering != Ordering::Less,
        _ => false,
    }
}

/// `operator(a, b)` with null propagation. Values that cannot be ordered,
/// such as NaN, are unknown like nulls.
fn compare3(operator: Operator, a: &ExprNode, b: &ExprNode) -> Option<bool> {
    if a.is_null || b.is_null {
        return None;
    }
    if let (Some(x), Some(y)) = (a.as_geometry(), b.as_geometry()) {
        return match operator {
            Operator::Eq => Some(x.equals(y)),
            Operator::Ne => Some(!x.equals(y)),
            _ => None,
        };
    }
    compare_values(a, b).map(|ordering| holds(operator, ordering))
}

pub fn eval_comparison(node: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    if any_null(args) {
        return Ok(boolean_result(None));
    }
    let (Some(operator), [a, b]) = (node.operator(), args) else {
        return Err(type_mismatch(node));
    };
    Ok(boolean_result(compare3(operator, a, b)))
}

/// True on any equal candidate; unknown when none matches but one is null.
pub fn eval_in(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    let Some((value, candidates)) = args.split_first() else {
        return Ok(boolean_result(None));
    };
    if value.is_null {
        return Ok(boolean_result(None));
    }
    let mut unknown = false;
    for candidate in candidates {
        match compare3(Operator::Eq, value, candidate) {
            Some(true) => return Ok(ExprNode::boolean(true)),
            None => unknown = true,
            Some(false) => {}
        }
    }
    Ok(boolean_result(if unknown { None } else { Some(false) }))
}

/// Same truth table as `x >= lo AND x <= hi`.
pub fn eval_between(node: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    let [value, low, high] = args else {
        return Err(type_mismatch(node));
    };
    Ok(boolean_result(and3([
        compare3(Operator::Ge, value, low),
        compare3(Operator::Le, value, high),
    ])))
}
