use thiserror::Error;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Undefined function '{0}' used.")]
    UndefinedFunction(String),

    #[error("Syntax Error with {0}(*).")]
    StarArgument(String),

    #[error("DISTINCT keyword can only be used in COUNT() operator")]
    MisplacedDistinct,

    #[error("DISTINCT can only be applied to a field")]
    DistinctExpression,

    #[error("SELECT DISTINCT and COUNT(DISTINCT...) not supported together")]
    DistinctCombination,

    #[error("Invalid numeric literal '{0}'")]
    InvalidNumber(String),

    #[error("Unrecognized typename {0} in CAST operator.")]
    UnknownCastType(String),

    #[error("Unrecognized geometry type: {0}")]
    UnknownGeometryType(String),

    #[error("First argument of CAST operator should be an integer type identifier")]
    CastLengthArgument,

    #[error("First argument of CAST operator should be a geometry type identifier")]
    CastGeometryTypeArgument,

    #[error("Second argument of CAST operator should be an integer type identifier")]
    CastPrecisionArgument,

    #[error("Column Summary Function '{0}' has wrong number of arguments.")]
    SummaryArity(String),

    #[error("Argument of column Summary Function '{0}' should be a column.")]
    SummaryArgument(String),

    #[error("EXCEPT/EXCLUDE expression must follow a wildcard")]
    ExcludeWithoutWildcard,

    #[error("Field {0} is listed more than once in EXCEPT/EXCLUDE")]
    DuplicateExclusion(String),

    #[error("Join on table {found} found where table {expected} was expected")]
    JoinOrder { expected: usize, found: usize },
}

impl SyntaxError {
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        SyntaxError::Parse {
            message: message.into(),
            line,
            column,
        }
    }
}
