use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Or,
    And,
    Not,
    Eq,
    Ne,
    Ge,
    Le,
    Lt,
    Gt,
    Like,
    ILike,
    IsNull,
    In,
    Between,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Concat,
    Substr,
    HstoreGetValue,
    Avg,
    Min,
    Max,
    Count,
    Sum,
    StddevPop,
    StddevSamp,
    Cast,
    CustomFunc,
}

/// Operators callable with function syntax, `NAME(args)`.
const FUNCTION_OPERATORS: [Operator; 11] = [
    Operator::Concat,
    Operator::Substr,
    Operator::HstoreGetValue,
    Operator::Avg,
    Operator::Min,
    Operator::Max,
    Operator::Count,
    Operator::Sum,
    Operator::StddevPop,
    Operator::StddevSamp,
    Operator::Modulus,
];

impl Operator {
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Or => "OR",
            Operator::And => "AND",
            Operator::Not => "NOT",
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Like => "LIKE",
            Operator::ILike => "ILIKE",
            Operator::IsNull => "IS NULL",
            Operator::In => "IN",
            Operator::Between => "BETWEEN",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulus => "%",
            Operator::Concat => "CONCAT",
            Operator::Substr => "SUBSTR",
            Operator::HstoreGetValue => "HSTORE_GET_VALUE",
            Operator::Avg => "AVG",
            Operator::Min => "MIN",
            Operator::Max => "MAX",
            Operator::Count => "COUNT",
            Operator::Sum => "SUM",
            Operator::StddevPop => "STDDEV_POP",
            Operator::StddevSamp => "STDDEV_SAMP",
            Operator::Cast => "CAST",
            Operator::CustomFunc => "CUSTOM_FUNC",
        }
    }

    /// Resolves a function-call name, case-insensitively. `MOD` is accepted as
    /// the function spelling of `%`.
    pub fn from_function_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("MOD") {
            return Some(Operator::Modulus);
        }
        FUNCTION_OPERATORS
            .iter()
            .copied()
            .filter(|op| *op != Operator::Modulus)
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Operator::Avg
                | Operator::Min
                | Operator::Max
                | Operator::Count
                | Operator::Sum
                | Operator::StddevPop
                | Operator::StddevSamp
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Ge | Operator::Le | Operator::Lt | Operator::Gt
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::Or | Operator::And | Operator::Not)
    }

    /// Operators rendered as `left OP right`.
    pub fn is_binary_infix(&self) -> bool {
        self.is_comparison()
            || matches!(
                self,
                Operator::Or
                    | Operator::And
                    | Operator::Like
                    | Operator::ILike
                    | Operator::Add
                    | Operator::Subtract
                    | Operator::Multiply
                    | Operator::Divide
                    | Operator::Modulus
            )
    }

    /// The comparison selecting exactly the rows this one rejects.
    pub fn negated_comparison(&self) -> Option<Self> {
        match self {
            Operator::Eq => Some(Operator::Ne),
            Operator::Ne => Some(Operator::Eq),
            Operator::Gt => Some(Operator::Le),
            Operator::Ge => Some(Operator::Lt),
            Operator::Lt => Some(Operator::Ge),
            Operator::Le => Some(Operator::Gt),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
