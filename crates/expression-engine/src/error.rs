use thiserror::Error;
use wkb::WkbError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Too many recursion levels in expression")]
    TooDeep,

    #[error("\"{0}\" not recognised as an available field.")]
    UnknownField(String),

    #[error("Cannot use field '{0}' of a secondary table in this context")]
    SecondaryTableField(String),

    #[error("Undefined function '{0}' used.")]
    UnknownFunction(String),

    #[error("Type mismatch or improper type of arguments to {0} operator.")]
    TypeMismatch(String),

    #[error("Column Summary Function '{0}' found in an inappropriate context.")]
    MisplacedSummary(String),

    #[error("Expected {expected} arguments to {function}(), but got {actual}.")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("Unrecognized typename {0} in CAST operator.")]
    UnknownCastType(String),

    #[error("Cannot cast geometry to {0}")]
    CastFromGeometry(String),

    #[error("Cannot cast {0} to geometry")]
    CastToGeometry(String),

    #[error("Divide by zero")]
    DivisionByZero,

    #[error("Invalid arguments to {function}(): {message}")]
    InvalidArguments { function: String, message: String },

    #[error("Failed to fetch field value: {0}")]
    Fetch(String),

    #[error(transparent)]
    Geometry(#[from] WkbError),
}

pub type Result<T> = std::result::Result<T, ExpressionError>;
