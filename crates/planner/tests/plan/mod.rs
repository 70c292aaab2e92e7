use crate::catalog;
use model::ParseOptions;
use planner::{PlanError, plan_select};
use serde_json::Value;

fn plan_json(sql: &str) -> Value {
    let result = plan_select(sql, &catalog(), &ParseOptions::default(), None);
    assert!(result.is_ok(), "{sql}: {:?}", result.as_ref().err());
    let (_, plan) = result.unwrap();
    serde_json::from_str(&plan.to_json().unwrap()).unwrap()
}

#[test]
fn test_recordset_plan() {
    let json = plan_json(
        "SELECT name, pop AS population FROM towns t WHERE pop > 1000 ORDER BY name DESC LIMIT 5 OFFSET 2",
    );
    assert_eq!(json["query_mode"], "recordset");
    assert_eq!(json["tables"], serde_json::json!(["t"]));
    assert_eq!(json["columns"][1]["name"], "population");
    assert_eq!(json["columns"][1]["field_type"], "integer64");
    assert_eq!(json["where_clause"], "pop > 1000");
    assert_eq!(json["order_by"], serde_json::json!(["name DESC"]));
    assert_eq!(json["limit"], 5);
    assert_eq!(json["offset"], 2);
    assert!(json.get("union_all").is_none());
}

#[test]
fn test_summary_plan() {
    let json = plan_json("SELECT COUNT(*) AS n, MAX(pop) FROM towns");
    assert_eq!(json["query_mode"], "summary_record");
    assert_eq!(json["columns"][0]["function"], "COUNT");
    assert_eq!(json["columns"][0]["name"], "n");
    assert_eq!(json["columns"][1]["function"], "MAX");
}

#[test]
fn test_union_plan() {
    let json = plan_json("SELECT id FROM towns UNION ALL SELECT region_id FROM towns");
    assert_eq!(json["union_all"]["columns"][0]["name"], "region_id");
    assert_eq!(json["excluded_geometry"], false);
}

#[test]
fn test_union_members_bind_their_own_tables() {
    let json = plan_json("SELECT id FROM towns UNION ALL SELECT code FROM regions");
    assert_eq!(json["tables"], serde_json::json!(["towns"]));
    assert_eq!(json["columns"][0]["field_type"], "integer");

    let member = &json["union_all"];
    assert_eq!(member["tables"], serde_json::json!(["regions"]));
    assert_eq!(member["columns"][0]["name"], "code");
    assert_eq!(member["columns"][0]["field_type"], "string");
    assert_eq!(member["columns"][0]["table_index"], 0);
    assert_eq!(member["columns"][0]["field_index"], 1);
}

#[test]
fn test_union_member_where_uses_member_schema() {
    let json = plan_json(
        "SELECT name FROM towns WHERE pop > 10 UNION ALL SELECT label FROM provinces p WHERE region_id = 3",
    );
    assert_eq!(json["where_clause"], "pop > 10");
    assert_eq!(json["union_all"]["tables"], serde_json::json!(["p"]));
    assert_eq!(json["union_all"]["where_clause"], "region_id = 3");
}

#[test]
fn test_union_member_with_unknown_table() {
    let sql = "SELECT id FROM towns UNION ALL SELECT id FROM rivers";
    let err = plan_select(sql, &catalog(), &ParseOptions::default(), None).unwrap_err();
    assert!(matches!(err, PlanError::UnknownTable(name) if name == "rivers"));
}
