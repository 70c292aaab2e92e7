use crate::support::{checked, nested_not, towns_schema};
use expression_engine::{Check, CheckOptions, ExpressionError, MAX_DEPTH, SpatialFunctions};
use model::{FieldType, ParseOptions};
use sql_syntax::{ColumnRef, ExprNode, NodeKind, Operator, parse_expression};

#[test]
fn test_columns_are_resolved() {
    let node = checked("pop > 1000 AND name LIKE 'O%'", &CheckOptions::default()).unwrap();
    assert_eq!(node.field_type, FieldType::Boolean);

    let comparison = &node.args()[0];
    let column = comparison.args()[0].as_column().unwrap();
    assert_eq!(column.field_index, Some(2));
    assert_eq!(column.table_index, Some(0));
    assert_eq!(comparison.args()[0].field_type, FieldType::Integer64);
}

#[test]
fn test_result_types() {
    let options = CheckOptions::default();
    let cases = [
        ("id + 1", FieldType::Integer),
        ("id + pop", FieldType::Integer64),
        ("id * density", FieldType::Float),
        ("name + 'x'", FieldType::String),
        ("id % 3", FieldType::Integer),
        ("CONCAT(name, id)", FieldType::String),
        ("SUBSTR(name, 1, 2)", FieldType::String),
        ("HSTORE_GET_VALUE(tags, 'capital')", FieldType::String),
        ("CAST(id AS character(10))", FieldType::String),
        ("CAST(name AS bigint)", FieldType::Integer64),
        ("CAST('POINT (1 2)' AS geometry)", FieldType::Geometry),
        ("id IN (1, 2, NULL)", FieldType::Boolean),
        ("founded BETWEEN '1800-01-01' AND '1900-01-01'", FieldType::Boolean),
        ("name IS NULL", FieldType::Boolean),
    ];
    for (text, expected) in cases {
        let node = checked(text, &options).unwrap();
        assert_eq!(node.field_type, expected, "{text}");
    }
}

#[test]
fn test_unknown_field() {
    let err = checked("population > 5", &CheckOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "\"population\" not recognised as an available field."
    );
    let err = checked("r.id = 1", &CheckOptions::default()).unwrap_err();
    assert_eq!(err, ExpressionError::UnknownField("r.id".to_string()));
}

#[test]
fn test_secondary_table_fields() {
    let err = checked("r.code = 'ON'", &CheckOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot use field 'r.code' of a secondary table in this context"
    );

    let options = CheckOptions {
        allow_secondary_table_fields: true,
        ..CheckOptions::default()
    };
    let node = checked("r.code = 'ON'", &options).unwrap();
    assert_eq!(node.args()[0].as_column().unwrap().table_index, Some(1));
}

#[test]
fn test_resolved_columns_keep_their_binding() {
    let schema = towns_schema();
    let mut column = ColumnRef::new(None, "label");
    column.table_index = Some(0);
    column.field_index = Some(1);
    let mut node = ExprNode::column(None, "label");
    node.kind = NodeKind::Column(column);
    node.field_type = FieldType::String;
    let mut node = ExprNode::operation_with(Operator::Like, vec![node, ExprNode::string("O%")]);

    assert_eq!(node.check(&schema, &CheckOptions::default()).unwrap(), FieldType::Boolean);
    let column = node.args()[0].as_column().unwrap();
    assert_eq!(column.field_index, Some(1));
    assert_eq!(node.args()[0].field_type, FieldType::String);

    let mut secondary = ColumnRef::new(Some("r"), "code");
    secondary.table_index = Some(1);
    secondary.field_index = Some(0);
    let mut node = ExprNode::column(Some("r"), "code");
    node.kind = NodeKind::Column(secondary);
    node.field_type = FieldType::String;
    assert_eq!(
        node.check(&schema, &CheckOptions::default()).unwrap_err(),
        ExpressionError::SecondaryTableField("r.code".to_string())
    );
}

#[test]
fn test_type_mismatches() {
    let options = CheckOptions::default();
    for (text, operator) in [
        ("name > 5", ">"),
        ("geom = geom", "="),
        ("id LIKE 'x'", "LIKE"),
        ("name - 1", "-"),
        ("density % 2", "%"),
        ("name AND id = 1", "AND"),
    ] {
        let err = checked(text, &options).unwrap_err();
        assert_eq!(err, ExpressionError::TypeMismatch(operator.to_string()), "{text}");
    }
}

#[test]
fn test_mismatched_comparisons_can_be_allowed() {
    let options = CheckOptions {
        allow_mismatched_comparison_types: true,
        ..CheckOptions::default()
    };
    assert!(checked("name > 5", &options).is_ok());
    // Geometries are never comparable.
    assert!(checked("geom = geom", &options).is_err());
}

#[test]
fn test_numeric_string_constants_are_converted() {
    let node = checked("pop = '1017449'", &CheckOptions::default()).unwrap();
    assert_eq!(node.args()[1].field_type, FieldType::Integer);
    assert_eq!(node.args()[1].as_integer(), Some(1_017_449));
}

#[test]
fn test_summary_functions_are_misplaced() {
    let err = checked("MAX(pop) > 1", &CheckOptions::default()).unwrap_err();
    assert_eq!(err, ExpressionError::MisplacedSummary("MAX".to_string()));
}

#[test]
fn test_cast_checks() {
    let options = CheckOptions::default();
    let err = checked("CAST(geom AS integer)", &options).unwrap_err();
    assert_eq!(err.to_string(), "Cannot cast geometry to integer");
    let err = checked("CAST(density AS geometry)", &options).unwrap_err();
    assert_eq!(err.to_string(), "Cannot cast float to geometry");
    assert!(checked("CAST(geom AS character)", &options).is_ok());
}

#[test]
fn test_custom_functions_need_a_registrar() {
    let err = checked("ST_Area(geom) > 1", &CheckOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "Undefined function 'ST_Area' used.");

    let spatial = SpatialFunctions;
    let options = CheckOptions {
        custom_functions: Some(&spatial),
        ..CheckOptions::default()
    };
    let node = checked("ST_Area(geom) > 1", &options).unwrap();
    assert_eq!(node.args()[0].field_type, FieldType::Float);
    assert!(checked("ST_Area(name) > 1", &options).is_err());
}

#[test]
fn test_argument_counts() {
    let err = checked("SUBSTR(name)", &CheckOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected 2 to 3 arguments to SUBSTR(), but got 1."
    );
}

#[test]
fn test_nesting_limit() {
    let options = CheckOptions::default();
    assert!(checked(&nested_not(MAX_DEPTH - 2), &options).is_ok());
    let err = checked(&nested_not(MAX_DEPTH - 1), &options).unwrap_err();
    assert_eq!(err.to_string(), "Too many recursion levels in expression");
    assert_eq!(
        checked(&nested_not(40), &options).unwrap_err(),
        ExpressionError::TooDeep
    );
}

#[test]
fn test_check_is_repeatable() {
    let mut node = parse_expression("id = 7 OR name = 'x'", &ParseOptions::default()).unwrap();
    let schema = towns_schema();
    let first = node.check(&schema, &CheckOptions::default()).unwrap();
    let second = node.check(&schema, &CheckOptions::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(node.operator(), Some(Operator::Or));
}
