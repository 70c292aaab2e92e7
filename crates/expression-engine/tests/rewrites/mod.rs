//! Rewritten trees must evaluate exactly like the trees they replace,
//! unknown results included.

use crate::support::{checked, eval_on, ottawa, unnamed};
use expression_engine::{CheckOptions, EvalContext};
use model::FieldType;
use sql_syntax::{ExprNode, Operator};

/// Truth value of a predicate, `None` for unknown.
fn truth(node: &ExprNode, record: &[ExprNode]) -> Option<bool> {
    let result = eval_on(node, record, &EvalContext::default()).unwrap();
    (!result.is_null).then(|| result.is_true())
}

fn records() -> Vec<Vec<ExprNode>> {
    let mut small = ottawa();
    small[0] = ExprNode::integer(2);
    small[3] = ExprNode::float(12.5);
    let mut unmeasured = ottawa();
    unmeasured[3] = ExprNode::float(f64::NAN);
    let mut unbounded = small.clone();
    unbounded[3] = ExprNode::float(f64::INFINITY);
    vec![ottawa(), unnamed(), small, unmeasured, unbounded]
}

const PREDICATES: [&str; 10] = [
    "id BETWEEN 1 AND 5",
    "density BETWEEN 10 AND 20 OR id = 7",
    "NOT (id BETWEEN 3 AND 9)",
    "NOT (id = 7 AND name = 'Ottawa')",
    "NOT (density > 100 OR NOT name <> 'x')",
    "NOT NOT (id >= 2)",
    "NOT (name LIKE 'O%' AND density BETWEEN 0 AND 400)",
    "NOT (NOT (id < 5) OR density <= 12.5)",
    "NOT (density > 1)",
    "NOT (density BETWEEN 1 AND 500) AND NOT (density <> 334.8)",
];

#[test]
fn test_between_rewrite_preserves_results() {
    for text in PREDICATES {
        let original = checked(text, &CheckOptions::default()).unwrap();
        let mut rewritten = original.clone();
        rewritten.replace_between_by_ge_and_le();
        assert!(!rewritten.unparse(None, '"').contains("BETWEEN"), "{text}");
        for record in records() {
            assert_eq!(truth(&original, &record), truth(&rewritten, &record), "{text}");
        }
    }
}

#[test]
fn test_not_pushdown_preserves_results() {
    for text in PREDICATES {
        let original = checked(text, &CheckOptions::default()).unwrap();
        let mut rewritten = original.clone();
        rewritten.replace_between_by_ge_and_le();
        let rewritten = rewritten.push_not_operation_down_to_stack();
        for record in records() {
            assert_eq!(truth(&original, &record), truth(&rewritten, &record), "{text}");
        }
    }
}

#[test]
fn test_rewritten_nodes_keep_boolean_type() {
    let mut node = checked("id BETWEEN 1 AND 5", &CheckOptions::default()).unwrap();
    node.replace_between_by_ge_and_le();
    assert_eq!(node.operator(), Some(Operator::And));
    assert_eq!(node.field_type, FieldType::Boolean);
    assert!(node.args().iter().all(|arg| arg.field_type == FieldType::Boolean));
}

#[test]
fn test_pushdown_leaves_no_not_over_comparisons() {
    let node = checked("NOT (id = 7 OR NOT density < 3)", &CheckOptions::default())
        .unwrap()
        .push_not_operation_down_to_stack();
    assert_eq!(node.unparse(None, '"'), "(id <> 7) AND (density < 3)");
}

#[test]
fn test_nan_comparison_and_its_negation_agree() {
    let mut record = ottawa();
    record[3] = ExprNode::float(f64::NAN);
    let negated = checked("NOT (density > 1)", &CheckOptions::default()).unwrap();
    let pushed = negated.clone().push_not_operation_down_to_stack();
    assert_eq!(pushed.unparse(None, '"'), "density <= 1");
    assert_eq!(truth(&negated, &record), None);
    assert_eq!(truth(&pushed, &record), None);
}
