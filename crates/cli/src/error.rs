use expression_engine::ExpressionError;
use model::ModelError;
use planner::PlanError;
use sql_syntax::SyntaxError;
use thiserror::Error;
use wkb::WkbError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to load the schema or options: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Geometry(#[from] WkbError),

    #[error("Either --expr or --select is required")]
    MissingInput,

    #[error("Records file must hold a JSON array of objects")]
    RecordsShape,

    #[error("Value {value} does not fit field '{field}' of type {field_type}")]
    RecordValue {
        field: String,
        field_type: String,
        value: String,
    },

    #[error("Invalid hex input: {0}")]
    InvalidHex(String),

    #[error("Area is only defined for polygons and multipolygons, got {0}")]
    NotPolygonal(String),
}
