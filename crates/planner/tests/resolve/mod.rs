use crate::catalog;
use expression_engine::{ExpressionError, SpatialFunctions};
use model::{FieldType, ParseOptions};
use planner::{PlanError, PlanResult, SelectPlan, plan_select};
use sql_syntax::{QueryMode, SelectStatement};

fn resolve(sql: &str) -> PlanResult<SelectStatement> {
    plan_select(sql, &catalog(), &ParseOptions::default(), None).map(|(select, _)| select)
}

fn resolve_with(sql: &str, options: &ParseOptions) -> PlanResult<(SelectStatement, SelectPlan)> {
    plan_select(sql, &catalog(), options, None)
}

#[test]
fn test_query_modes() {
    let cases = [
        ("SELECT id, name FROM towns", QueryMode::Recordset),
        ("SELECT DISTINCT name FROM towns", QueryMode::DistinctList),
        ("SELECT COUNT(*), MAX(pop) FROM towns", QueryMode::SummaryRecord),
        ("SELECT COUNT(DISTINCT name) FROM towns", QueryMode::SummaryRecord),
    ];
    for (sql, expected) in cases {
        let result = resolve(sql);
        assert!(result.is_ok(), "{sql}: {:?}", result.err());
        assert_eq!(result.unwrap().query_mode, expected, "{sql}");
    }
}

#[test]
fn test_mixed_query_modes_are_rejected() {
    let err = resolve("SELECT name, MAX(pop) FROM towns").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Field list implies mixture of regular recordset mode, summary mode or distinct field list mode."
    );
    assert!(matches!(
        resolve("SELECT DISTINCT name, id FROM towns"),
        Err(PlanError::MultipleDistinct)
    ));
}

#[test]
fn test_columns_are_bound() {
    let select = resolve("SELECT name, pop * 2 AS doubled, CAST(id AS character(4)) FROM towns")
        .unwrap();
    let name = &select.columns[0];
    assert_eq!((name.table_index, name.field_index), (Some(0), Some(1)));
    assert_eq!(name.field_type, FieldType::String);

    assert_eq!(select.columns[1].field_type, FieldType::Integer64);
    assert_eq!(select.columns[1].output_name(), "doubled");

    let cast = &select.columns[2];
    assert_eq!(cast.field_type, FieldType::String);
    assert_eq!(cast.field_index, Some(0));
    assert_eq!(cast.field_length, Some(4));
}

#[test]
fn test_summary_column_types() {
    let select = resolve("SELECT COUNT(*), SUM(pop), AVG(id), MIN(founded) FROM towns").unwrap();
    let types: Vec<FieldType> = select.columns.iter().map(|c| c.field_type).collect();
    assert_eq!(
        types,
        [
            FieldType::Integer64,
            FieldType::Integer64,
            FieldType::Float,
            FieldType::Date
        ]
    );
}

#[test]
fn test_illegal_summaries() {
    let err = resolve("SELECT MAX(geom) FROM towns").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Use of field function MAX() on geometry field geom illegal."
    );
    let err = resolve("SELECT AVG(name) FROM towns").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Use of field function AVG() on string field name illegal."
    );
    assert!(resolve("SELECT MIN(name), COUNT(geom) FROM towns").is_ok());
}

#[test]
fn test_unknown_fields() {
    let err = resolve("SELECT population FROM towns").unwrap_err();
    assert_eq!(err.to_string(), "Unrecognised field name population.");

    let err = resolve("SELECT name FROM towns WHERE area > 3").unwrap_err();
    assert!(matches!(
        err,
        PlanError::Expression(ExpressionError::UnknownField(name)) if name == "area"
    ));
}

#[test]
fn test_wildcard_except_geometry() {
    let select = resolve("SELECT * EXCEPT (geom) FROM towns").unwrap();
    let names: Vec<&str> = select.columns.iter().map(|c| c.output_name()).collect();
    assert_eq!(names, ["id", "name", "pop", "founded", "region_id"]);
    assert!(select.excluded_geometry);
    assert_eq!(select.query_mode, QueryMode::Recordset);
}

#[test]
fn test_joins() {
    let select = resolve(
        "SELECT t.name, r.code FROM towns t JOIN regions r ON t.region_id = r.id \
         LEFT JOIN provinces p ON p.region_id = t.region_id",
    )
    .unwrap();
    assert_eq!(select.columns[1].table_index, Some(1));
    assert_eq!(select.joins.len(), 2);
    assert_eq!(select.joins[1].secondary_table, 2);
}

#[test]
fn test_join_may_not_reach_other_secondary_tables() {
    let err = resolve(
        "SELECT t.name FROM towns t JOIN regions r ON t.region_id = r.id \
         JOIN provinces p ON p.region_id = r.id",
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::JoinField(name) if name == "r.id"));
}

#[test]
fn test_order_by_restrictions() {
    let select = resolve("SELECT name FROM towns ORDER BY pop DESC, name").unwrap();
    assert_eq!(select.order_defs[0].field_index, Some(2));
    assert!(!select.order_defs[0].ascending);

    let err = resolve("SELECT name FROM towns ORDER BY geom").unwrap_err();
    assert_eq!(err.to_string(), "Cannot use geometry field 'geom' in a ORDER BY clause");

    let err = resolve("SELECT t.name FROM towns t JOIN regions r ON t.region_id = r.id ORDER BY r.code")
        .unwrap_err();
    assert!(matches!(err, PlanError::OrderBySecondaryField(_)));
}

#[test]
fn test_where_on_secondary_tables() {
    let sql = "SELECT t.name FROM towns t JOIN regions r ON t.region_id = r.id WHERE r.code = 'ON'";
    let err = resolve_with(sql, &ParseOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        PlanError::Expression(ExpressionError::SecondaryTableField(_))
    ));

    let options = ParseOptions {
        allow_fields_in_secondary_tables_in_where: true,
        ..ParseOptions::default()
    };
    let (select, _) = resolve_with(sql, &options).unwrap();
    assert_eq!(select.where_expr.unwrap().field_type, FieldType::Boolean);
}

#[test]
fn test_union_all_chain_is_resolved() {
    let select = resolve("SELECT name FROM towns UNION ALL SELECT COUNT(*) FROM towns").unwrap();
    let next = select.next.as_deref().unwrap();
    assert_eq!(select.query_mode, QueryMode::Recordset);
    assert_eq!(next.query_mode, QueryMode::SummaryRecord);

    let err = resolve("SELECT name FROM towns UNION ALL SELECT nope FROM towns").unwrap_err();
    assert!(matches!(err, PlanError::UnknownField(_)));
}

#[test]
fn test_union_all_members_use_their_own_fields() {
    let select = resolve("SELECT pop FROM towns UNION ALL SELECT code FROM regions").unwrap();
    assert_eq!(select.columns[0].field_type, FieldType::Integer64);
    let next = select.next.as_deref().unwrap();
    assert_eq!(next.columns[0].field_type, FieldType::String);
    assert_eq!(next.columns[0].table_index, Some(0));
    assert_eq!(next.columns[0].field_index, Some(1));

    let err = resolve("SELECT id FROM towns UNION ALL SELECT pop FROM regions").unwrap_err();
    assert!(matches!(err, PlanError::UnknownField(name) if name == "pop"));

    let select = resolve(
        "SELECT id FROM towns UNION ALL SELECT r.code FROM regions r JOIN provinces p ON p.region_id = r.id",
    )
    .unwrap();
    let next = select.next.as_deref().unwrap();
    assert_eq!(next.joins[0].secondary_table, 1);
    assert_eq!(next.columns[0].field_type, FieldType::String);
}

#[test]
fn test_custom_functions_in_columns() {
    let options = ParseOptions {
        accept_custom_funcs: true,
        ..ParseOptions::default()
    };
    let sql = "SELECT ST_Area(geom) AS area FROM towns";
    let err = plan_select(sql, &catalog(), &options, None).unwrap_err();
    assert!(matches!(
        err,
        PlanError::Expression(ExpressionError::UnknownFunction(_))
    ));

    let spatial = SpatialFunctions;
    let (select, _) = plan_select(sql, &catalog(), &options, Some(&spatial)).unwrap();
    assert_eq!(select.columns[0].field_type, FieldType::Float);
}
