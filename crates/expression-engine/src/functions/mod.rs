//! Built-in operations: a checker and an evaluator per operator.

pub mod arithmetic;
pub mod cast;
pub mod comparison;
pub mod like;
pub mod logical;
pub mod string;

use crate::{
    context::EvalContext,
    error::{ExpressionError, Result},
    registry::{Checker, EvaluatorFn, OperationDef},
};
use model::FieldType;
use sql_syntax::{ConstantValue, ExprNode, NodeKind, Operator, unparse::format_g15};

pub(crate) fn builtin_operations() -> Vec<OperationDef> {
    let def = |operator: Operator, checker: Checker, evaluator: EvaluatorFn| OperationDef {
        name: operator.name(),
        operator,
        checker,
        evaluator,
    };

    let mut operations = vec![
        def(Operator::Or, logical::check_logical, logical::eval_or),
        def(Operator::And, logical::check_logical, logical::eval_and),
        def(Operator::Not, logical::check_logical, logical::eval_not),
        def(Operator::IsNull, logical::check_is_null, logical::eval_is_null),
        def(Operator::In, comparison::check_comparison, comparison::eval_in),
        def(Operator::Between, comparison::check_comparison, comparison::eval_between),
        def(Operator::Like, like::check_like, like::eval_like),
        def(Operator::ILike, like::check_like, like::eval_like),
        def(Operator::Add, arithmetic::check_arithmetic, arithmetic::eval_arithmetic),
        def(Operator::Subtract, arithmetic::check_arithmetic, arithmetic::eval_arithmetic),
        def(Operator::Multiply, arithmetic::check_arithmetic, arithmetic::eval_arithmetic),
        def(Operator::Divide, arithmetic::check_arithmetic, arithmetic::eval_arithmetic),
        def(Operator::Modulus, arithmetic::check_arithmetic, arithmetic::eval_arithmetic),
        def(Operator::Concat, string::check_concat, string::eval_concat),
        def(Operator::Substr, string::check_substr, string::eval_substr),
        def(Operator::HstoreGetValue, string::check_hstore, string::eval_hstore),
        def(Operator::Cast, cast::check_cast, cast::eval_cast),
    ];
    for operator in [
        Operator::Eq,
        Operator::Ne,
        Operator::Ge,
        Operator::Le,
        Operator::Lt,
        Operator::Gt,
    ] {
        operations.push(def(operator, comparison::check_comparison, comparison::eval_comparison));
    }
    for operator in [
        Operator::Avg,
        Operator::Min,
        Operator::Max,
        Operator::Count,
        Operator::Sum,
        Operator::StddevPop,
        Operator::StddevSamp,
    ] {
        operations.push(def(operator, check_summary, eval_summary));
    }
    operations
}

/// Column summary functions are only meaningful as select columns.
fn check_summary(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    Err(ExpressionError::MisplacedSummary(operation_name(node)))
}

fn eval_summary(node: &ExprNode, _: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    Err(ExpressionError::MisplacedSummary(operation_name(node)))
}

/// Name used in diagnostics: the function name of a custom call, the
/// operator name otherwise.
pub(crate) fn operation_name(node: &ExprNode) -> String {
    match node.as_operation() {
        Some(op) => op
            .function_name
            .clone()
            .unwrap_or_else(|| op.operator.name().to_string()),
        None => String::new(),
    }
}

pub(crate) fn type_mismatch(node: &ExprNode) -> ExpressionError {
    ExpressionError::TypeMismatch(operation_name(node))
}

pub(crate) fn expect_arity(node: &ExprNode, min: usize, max: usize) -> Result<()> {
    let actual = node.sub_expression_count();
    if (min..=max).contains(&actual) {
        return Ok(());
    }
    let expected = match (min, max) {
        (min, max) if min == max => min.to_string(),
        (min, usize::MAX) => format!("at least {min}"),
        (min, max) => format!("{min} to {max}"),
    };
    Err(ExpressionError::ArgumentCount {
        function: operation_name(node),
        expected,
        actual,
    })
}

/// The bare `NULL` literal, which is compatible with every type.
pub(crate) fn is_null_literal(node: &ExprNode) -> bool {
    node.is_constant() && node.is_null && node.field_type == FieldType::Integer
}

pub(crate) fn reject_geometries(node: &ExprNode) -> Result<()> {
    if node
        .args()
        .iter()
        .any(|arg| arg.field_type == FieldType::Geometry)
    {
        return Err(type_mismatch(node));
    }
    Ok(())
}

pub(crate) fn any_null(args: &[&ExprNode]) -> bool {
    args.iter().any(|arg| arg.is_null)
}

/// Boolean result node; `None` is SQL unknown.
pub(crate) fn boolean_result(value: Option<bool>) -> ExprNode {
    match value {
        Some(v) => ExprNode::boolean(v),
        None => ExprNode::typed_null(FieldType::Boolean),
    }
}

/// Textual form of a value, as used by string operations and casts.
pub(crate) fn text_value(node: &ExprNode) -> String {
    if node.is_null {
        return String::new();
    }
    match &node.kind {
        NodeKind::Constant(ConstantValue::Integer(v)) => v.to_string(),
        NodeKind::Constant(ConstantValue::Float(v)) => format_g15(*v),
        NodeKind::Constant(ConstantValue::String(s)) => s.clone(),
        NodeKind::Constant(ConstantValue::Geometry(g)) => {
            g.as_ref().map(|g| g.to_wkt()).unwrap_or_default()
        }
        _ => String::new(),
    }
}

/// Integer form of a value. Floats truncate, unparsable text is zero.
pub(crate) fn integer_value(node: &ExprNode) -> i64 {
    match &node.kind {
        NodeKind::Constant(ConstantValue::Integer(v)) => *v,
        NodeKind::Constant(ConstantValue::Float(v)) => *v as i64,
        NodeKind::Constant(ConstantValue::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

pub(crate) fn float_value(node: &ExprNode) -> f64 {
    match &node.kind {
        NodeKind::Constant(ConstantValue::Integer(v)) => *v as f64,
        NodeKind::Constant(ConstantValue::Float(v)) => *v,
        NodeKind::Constant(ConstantValue::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
