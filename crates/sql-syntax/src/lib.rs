pub mod ast;
pub mod builder;
pub mod dump;
pub mod error;
pub mod keywords;
pub mod parser;
pub mod rewrite;
pub mod unparse;

pub use ast::node::{ColumnRef, ConstantValue, ExprNode, NodeKind, Operation};
pub use ast::operator::Operator;
pub use ast::select::{ColumnDef, ColumnFunction, JoinDef, OrderDef, QueryMode, SelectStatement};
pub use builder::{parse_expression, parse_select};
pub use error::{SyntaxError, SyntaxResult};
