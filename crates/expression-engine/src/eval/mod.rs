//! Evaluation of checked expression trees against a record.

use crate::{
    check::MAX_DEPTH,
    context::EvalContext,
    error::{ExpressionError, Result},
    registry,
};
use sql_syntax::{ExprNode, NodeKind};
use std::borrow::Cow;
use tracing::debug;

pub trait Evaluator {
    /// Computes the value of the tree. Column leaves are looked up with
    /// `fetcher`, which receives the resolved column node and `record`.
    fn evaluate<R, F>(&self, fetcher: &F, record: &R, ctx: &EvalContext) -> Result<ExprNode>
    where
        R: ?Sized,
        F: Fn(&ExprNode, &R) -> Result<ExprNode>;
}

impl Evaluator for ExprNode {
    fn evaluate<R, F>(&self, fetcher: &F, record: &R, ctx: &EvalContext) -> Result<ExprNode>
    where
        R: ?Sized,
        F: Fn(&ExprNode, &R) -> Result<ExprNode>,
    {
        evaluate_node(self, fetcher, record, ctx, 0).map(Cow::into_owned)
    }
}

/// Constant leaves are borrowed rather than cloned.
fn evaluate_node<'n, R, F>(
    node: &'n ExprNode,
    fetcher: &F,
    record: &R,
    ctx: &EvalContext,
    depth: usize,
) -> Result<Cow<'n, ExprNode>>
where
    R: ?Sized,
    F: Fn(&ExprNode, &R) -> Result<ExprNode>,
{
    if depth >= MAX_DEPTH {
        debug!("Expression nesting exceeds {MAX_DEPTH} levels");
        return Err(ExpressionError::TooDeep);
    }

    match &node.kind {
        NodeKind::Constant(_) => Ok(Cow::Borrowed(node)),
        NodeKind::Column(_) => fetcher(node, record).map(Cow::Owned),
        NodeKind::Operation(operation) => {
            let def = registry::resolve(operation, ctx.custom_functions)?;
            let values = operation
                .args
                .iter()
                .map(|arg| evaluate_node(arg, fetcher, record, ctx, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            let args: Vec<&ExprNode> = values.iter().map(|v| &**v).collect();
            (def.evaluator)(node, &args, ctx).map(Cow::Owned)
        }
    }
}
