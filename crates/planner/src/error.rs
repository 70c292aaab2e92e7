use expression_engine::ExpressionError;
use model::ModelError;
use sql_syntax::SyntaxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Table {0} not found in the schema")]
    UnknownTable(String),

    #[error("Table {0} not recognised from {0}.* definition.")]
    WildcardTable(String),

    #[error("Unrecognised field name {0}.")]
    UnknownField(String),

    #[error("Field {0} specified in EXCEPT/EXCLUDE expression not found")]
    ExclusionNotFound(String),

    #[error("Use of field function {function}() on {kind} field {field} illegal.")]
    IllegalSummary {
        function: String,
        kind: &'static str,
        field: String,
    },

    #[error("Field list implies mixture of regular recordset mode, summary mode or distinct field list mode.")]
    MixedQueryMode,

    #[error("SELECTing more than one DISTINCT field is a query not supported.")]
    MultipleDistinct,

    #[error("Field {0} in JOIN clause does not correspond to the primary table nor the joint (secondary) table.")]
    JoinField(String),

    #[error("Cannot use field '{0}' of a secondary table in a ORDER BY clause")]
    OrderBySecondaryField(String),

    #[error("Cannot use geometry field '{0}' in a ORDER BY clause")]
    OrderByGeometry(String),
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// `table.field`, or the bare field name.
pub(crate) fn qualified_name(table_name: Option<&str>, field_name: &str) -> String {
    match table_name {
        Some(table) => format!("{table}.{field_name}"),
        None => field_name.to_string(),
    }
}
