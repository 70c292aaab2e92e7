pub mod check;
pub mod context;
pub mod error;
pub mod eval;
pub mod functions;
pub mod registry;
pub mod spatial;

pub use check::{Check, CheckOptions, MAX_DEPTH};
pub use context::EvalContext;
pub use error::{ExpressionError, Result};
pub use eval::Evaluator;
pub use registry::{CustomFunctionRegistrar, OPERATIONS, OperationDef, OperationRegistry};
pub use spatial::SpatialFunctions;
