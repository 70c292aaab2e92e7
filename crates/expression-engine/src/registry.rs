use crate::{
    context::EvalContext,
    error::{ExpressionError, Result},
    functions,
};
use lazy_static::lazy_static;
use model::FieldType;
use sql_syntax::{ExprNode, Operation, Operator};
use std::collections::HashMap;

/// Derives the type of an operation whose arguments are already checked. The
/// flag relaxes comparison type matching. A checker may rewrite constant
/// arguments in place.
pub type Checker = fn(&mut ExprNode, bool) -> Result<FieldType>;

/// Computes an operation from its evaluated arguments.
pub type EvaluatorFn = fn(&ExprNode, &[&ExprNode], &EvalContext) -> Result<ExprNode>;

/// Everything the engine knows about one operator.
#[derive(Debug, Clone, Copy)]
pub struct OperationDef {
    pub name: &'static str,
    pub operator: Operator,
    pub checker: Checker,
    pub evaluator: EvaluatorFn,
}

/// Source of definitions for `CustomFunc` nodes, looked up by function name.
pub trait CustomFunctionRegistrar {
    fn get_operator(&self, name: &str) -> Option<OperationDef>;
}

/// Table of the built-in operations.
pub struct OperationRegistry {
    operations: HashMap<Operator, OperationDef>,
}

lazy_static! {
    pub static ref OPERATIONS: OperationRegistry = OperationRegistry::new();
}

impl OperationRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            operations: HashMap::new(),
        };
        for def in functions::builtin_operations() {
            registry.register(def);
        }
        registry
    }

    pub fn register(&mut self, def: OperationDef) {
        self.operations.insert(def.operator, def);
    }

    pub fn get(&self, operator: Operator) -> Option<&OperationDef> {
        self.operations.get(&operator)
    }

    /// Looks an operation up by display name, case-insensitively.
    pub fn find(&self, name: &str) -> Option<&OperationDef> {
        self.operations
            .values()
            .find(|def| def.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operations.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Definition backing an operation node: the built-in table, or the custom
/// registrar for `CustomFunc` nodes.
pub fn resolve(
    operation: &Operation,
    custom: Option<&dyn CustomFunctionRegistrar>,
) -> Result<OperationDef> {
    if operation.operator == Operator::CustomFunc {
        let name = operation.function_name.as_deref().unwrap_or_default();
        return custom
            .and_then(|registrar| registrar.get_operator(name))
            .ok_or_else(|| ExpressionError::UnknownFunction(name.to_string()));
    }
    OPERATIONS
        .get(operation.operator)
        .copied()
        .ok_or_else(|| ExpressionError::UnknownFunction(operation.operator.name().to_string()))
}
