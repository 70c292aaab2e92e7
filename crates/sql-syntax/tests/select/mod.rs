use model::ParseOptions;
use sql_syntax::{ColumnFunction, Operator, SyntaxError, parse_select};

fn select(text: &str) -> sql_syntax::SelectStatement {
    let result = parse_select(text, &ParseOptions::default());
    assert!(result.is_ok(), "Failed to parse {text}: {:?}", result.err());
    result.unwrap()
}

#[test]
fn test_columns_and_aliases() {
    let s = select("SELECT id, name AS label, t.pop p FROM towns t");
    assert_eq!(s.columns.len(), 3);
    assert_eq!(s.columns[1].field_alias.as_deref(), Some("label"));
    assert_eq!(s.columns[2].table_name.as_deref(), Some("t"));
    assert_eq!(s.columns[2].output_name(), "p");
    assert_eq!(s.tables[0].table_name, "towns");
    assert_eq!(s.tables[0].table_alias, "t");
}

#[test]
fn test_summary_columns() {
    let s = select("SELECT COUNT(*), MAX(pop), COUNT(DISTINCT region) FROM towns");
    assert_eq!(s.columns[0].col_func, Some(ColumnFunction::Count));
    assert_eq!(s.columns[0].field_name, "*");
    assert_eq!(s.columns[1].col_func, Some(ColumnFunction::Max));
    assert!(s.columns[2].distinct);
    assert_eq!(s.columns[2].col_func, Some(ColumnFunction::Count));
}

#[test]
fn test_distinct_restrictions() {
    let options = ParseOptions::default();
    assert_eq!(
        parse_select("SELECT DISTINCT COUNT(DISTINCT a) FROM t", &options).unwrap_err(),
        SyntaxError::DistinctCombination
    );
    assert_eq!(
        parse_select("SELECT SUM(DISTINCT a) FROM t", &options).unwrap_err(),
        SyntaxError::MisplacedDistinct
    );
    assert_eq!(
        parse_select("SELECT DISTINCT a + 1 FROM t", &options).unwrap_err(),
        SyntaxError::DistinctExpression
    );
    assert!(parse_select("SELECT * FROM t WHERE COUNT(DISTINCT a) > 1", &options).is_err());
}

#[test]
fn test_joins_where_order_limit() {
    let s = select(
        "SELECT * FROM towns t LEFT JOIN regions r ON t.region = r.code \
         JOIN 'other.db'.states ON r.state = states.id \
         WHERE t.pop > 1000 ORDER BY t.name, pop DESC LIMIT 10 OFFSET 5",
    );
    assert_eq!(s.tables.len(), 3);
    assert_eq!(s.tables[2].data_source.as_deref(), Some("other.db"));
    assert_eq!(s.joins.len(), 2);
    assert_eq!(s.joins[0].secondary_table, 1);
    assert_eq!(s.joins[1].secondary_table, 2);
    assert_eq!(s.joins[0].condition.operator(), Some(Operator::Eq));
    assert!(s.where_expr.is_some());
    assert_eq!(s.order_defs.len(), 2);
    assert!(s.order_defs[0].ascending);
    assert!(!s.order_defs[1].ascending);
    assert_eq!(s.limit, Some(10));
    assert_eq!(s.offset, 5);
}

#[test]
fn test_wildcard_exclusions() {
    let s = select("SELECT * EXCEPT (geom, t.id) FROM t");
    assert_eq!(s.excluded_fields[&0].len(), 2);
    assert_eq!(s.excluded_fields[&0][1].table_name.as_deref(), Some("t"));

    let err = parse_select("SELECT * EXCLUDE (a, a) FROM t", &ParseOptions::default());
    assert!(matches!(err, Err(SyntaxError::DuplicateExclusion(_))));
}

#[test]
fn test_union_all() {
    let s = select("SELECT a FROM t UNION ALL SELECT b FROM u UNION ALL SELECT c FROM v");
    let names: Vec<&str> = s.chain().map(|s| s.tables[0].table_name.as_str()).collect();
    assert_eq!(names, ["t", "u", "v"]);
}

#[test]
fn test_cast_column() {
    let s = select("SELECT CAST(pop AS integer) AS p, CAST(wkt AS geometry(POINT)) FROM t");
    assert_eq!(s.columns[0].field_name, "pop");
    assert_eq!(s.columns[0].target_type, Some(model::FieldType::Integer));
    assert!(s.columns[1].target_geometry_type.is_some());

    let s = select(
        "SELECT CAST(SUM(pop) AS float), CAST(CAST(t.name AS character(4)) AS integer) FROM t",
    );
    assert_eq!(s.columns[0].field_name, "pop");
    assert_eq!(s.columns[0].output_name(), "pop");
    assert_eq!(s.columns[1].field_name, "name");
    assert_eq!(s.columns[1].table_name.as_deref(), Some("t"));

    let err = parse_select("SELECT CAST(a AS varchar) FROM t", &ParseOptions::default());
    assert_eq!(err.unwrap_err().to_string(), "Unrecognized typename varchar in CAST operator.");
}

#[test]
fn test_select_unparse_round_trip() {
    for text in [
        "SELECT DISTINCT name FROM towns",
        "SELECT COUNT(*), AVG(pop) AS mean FROM towns AS t WHERE t.pop > 10",
        "SELECT COUNT(DISTINCT region) FROM towns",
        "SELECT t.* EXCEPT (geom) FROM towns AS t JOIN regions AS r ON t.code = r.code ORDER BY name DESC LIMIT 3 OFFSET 1",
        "SELECT a FROM 'data.gpkg'.t UNION ALL SELECT b FROM u",
    ] {
        let first = select(text);
        let rendered = first.unparse();
        let second = select(&rendered);
        assert_eq!(second.unparse(), rendered, "{text}");
        assert_eq!(first.columns, second.columns, "{text}");
    }
}

#[test]
fn test_select_syntax_error() {
    let err = parse_select("SELECT FROM t", &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, SyntaxError::Parse { .. }));
}
