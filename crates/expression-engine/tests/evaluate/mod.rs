use crate::support::{checked, eval_on, fetch, nested_not, ottawa, unnamed};
use expression_engine::{
    CheckOptions, EvalContext, Evaluator, ExpressionError, MAX_DEPTH, SpatialFunctions,
};
use model::FieldType;
use sql_syntax::ExprNode;

fn evaluate(text: &str, record: &[ExprNode]) -> ExprNode {
    let node = checked(text, &CheckOptions::default()).unwrap();
    eval_on(&node, record, &EvalContext::default()).unwrap()
}

fn is_true(text: &str) -> bool {
    evaluate(text, &ottawa()).is_true()
}

#[test]
fn test_predicates_on_a_record() {
    assert!(is_true("id = 7 AND pop > 1000000"));
    assert!(is_true("name LIKE 'Ott%' OR id = 0"));
    assert!(is_true("name ILIKE 'OTTAWA'"));
    assert!(is_true("NOT name LIKE 'T%'"));
    assert!(is_true("id IN (3, 5, 7)"));
    assert!(is_true("density BETWEEN 300 AND 400"));
    assert!(is_true("founded < '1900-01-01'"));
    assert!(is_true("pop = '1017449'"));
    assert!(!is_true("id <> 7"));
    assert!(!is_true("name NOT IN ('Ottawa', 'Hull')"));
}

#[test]
fn test_values() {
    let record = ottawa();
    assert_eq!(evaluate("id * 2 + 1", &record).as_integer(), Some(15));
    assert_eq!(evaluate("pop / 1000", &record).as_integer(), Some(1017));
    assert_eq!(evaluate("density * 2", &record).as_float(), Some(669.6));
    assert_eq!(evaluate("name + '!'", &record).as_str(), Some("Ottawa!"));
    assert_eq!(evaluate("SUBSTR(name, -3)", &record).as_str(), Some("awa"));
    assert_eq!(evaluate("CONCAT(name, ' #', id)", &record).as_str(), Some("Ottawa #7"));
    assert_eq!(
        evaluate("HSTORE_GET_VALUE(tags, 'province')", &record).as_str(),
        Some("ON")
    );
    assert_eq!(
        evaluate("CAST(pop AS character(3))", &record).as_str(),
        Some("101")
    );
}

#[test]
fn test_null_propagation() {
    let record = unnamed();
    let result = evaluate("name = 'Ottawa'", &record);
    assert!(result.is_null);
    assert_eq!(result.field_type, FieldType::Boolean);

    assert!(evaluate("name IS NULL", &record).is_true());
    assert!(evaluate("density + 1", &record).is_null);
    assert!(evaluate("CONCAT(name, 'x')", &record).is_null);

    // Three-valued logic: unknown OR true is true, unknown AND false is false.
    assert!(evaluate("name = 'x' OR id = 7", &record).is_true());
    let result = evaluate("name = 'x' AND id = 0", &record);
    assert!(!result.is_null && !result.is_true());
    assert!(evaluate("NOT name = 'x'", &record).is_null);
}

#[test]
fn test_division_by_zero() {
    let node = checked("id / (id - 7)", &CheckOptions::default()).unwrap();
    let err = eval_on(&node, &ottawa(), &EvalContext::default()).unwrap_err();
    assert_eq!(err, ExpressionError::DivisionByZero);
}

#[test]
fn test_fetch_errors_propagate() {
    let node = checked("id = 7", &CheckOptions::default()).unwrap();
    let err = eval_on(&node, &[], &EvalContext::default()).unwrap_err();
    assert!(matches!(err, ExpressionError::Fetch(_)));
}

#[test]
fn test_constant_expression_without_record() {
    let node = checked("(1 + 2) * 3 = 9", &CheckOptions::default()).unwrap();
    let never = |_: &ExprNode, _: &()| -> expression_engine::Result<ExprNode> {
        Err(ExpressionError::Fetch("no record".to_string()))
    };
    let result = node.evaluate(&never, &(), &EvalContext::default()).unwrap();
    assert!(result.is_true());
}

#[test]
fn test_spatial_functions() {
    let spatial = SpatialFunctions;
    let options = CheckOptions {
        custom_functions: Some(&spatial),
        ..CheckOptions::default()
    };
    let ctx = EvalContext::default().with_custom_functions(&spatial);
    let node = checked("ST_Area(geom) = 6", &options).unwrap();
    assert!(eval_on(&node, &ottawa(), &ctx).unwrap().is_true());

    let node = checked("ST_GeometryType(geom)", &options).unwrap();
    assert_eq!(eval_on(&node, &ottawa(), &ctx).unwrap().as_str(), Some("POLYGON"));

    // The registrar has to be present at evaluation time too.
    let node = checked("ST_Area(geom) = 6", &options).unwrap();
    let err = eval_on(&node, &ottawa(), &EvalContext::default()).unwrap_err();
    assert_eq!(err, ExpressionError::UnknownFunction("ST_Area".to_string()));
}

#[test]
fn test_utf8_underscore() {
    let node = checked("name LIKE '_ttawa'", &CheckOptions::default()).unwrap();
    let mut record = ottawa();
    record[1] = ExprNode::string("Öttawa");
    let utf8 = EvalContext::default();
    assert!(eval_on(&node, &record, &utf8).unwrap().is_true());
    let bytes = EvalContext {
        utf8_strings: false,
        ..utf8
    };
    assert!(!eval_on(&node, &record, &bytes).unwrap().is_true());
}

#[test]
fn test_nesting_limit() {
    let node = checked(&nested_not(MAX_DEPTH - 2), &CheckOptions::default()).unwrap();
    assert!(eval_on(&node, &ottawa(), &EvalContext::default()).unwrap().is_true());

    // Built by hand since checking would already refuse it.
    let mut deep = ExprNode::operation_with(
        sql_syntax::Operator::Eq,
        vec![ExprNode::integer(1), ExprNode::integer(1)],
    );
    for _ in 0..40 {
        deep = ExprNode::operation_with(sql_syntax::Operator::Not, vec![deep]);
    }
    let err = deep
        .evaluate(&fetch, ottawa().as_slice(), &EvalContext::default())
        .unwrap_err();
    assert_eq!(err, ExpressionError::TooDeep);
}
