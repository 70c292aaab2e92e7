//! Tree rewrites that preserve the truth value of a predicate.

use crate::ast::{
    node::{ExprNode, NodeKind, Operation},
    operator::Operator,
};

impl ExprNode {
    /// Replaces every `BETWEEN(x, lo, hi)` by `AND(GE(x, lo), LE(x, hi))`.
    pub fn replace_between_by_ge_and_le(&mut self) {
        let NodeKind::Operation(op) = &mut self.kind else {
            return;
        };
        for arg in op.args.iter_mut() {
            arg.replace_between_by_ge_and_le();
        }
        if op.operator != Operator::Between || op.args.len() != 3 {
            return;
        }

        let mut args = std::mem::take(&mut op.args).into_iter();
        let (Some(value), Some(low), Some(high)) = (args.next(), args.next(), args.next()) else {
            return;
        };
        let field_type = self.field_type;
        let typed = |mut node: ExprNode| {
            node.field_type = field_type;
            node
        };
        let ge = typed(ExprNode::operation_with(Operator::Ge, vec![value.clone(), low]));
        let le = typed(ExprNode::operation_with(Operator::Le, vec![value, high]));
        *self = ExprNode {
            is_null: self.is_null,
            ..typed(ExprNode::operation_with(Operator::And, vec![ge, le]))
        };
    }

    /// Pushes NOT towards the leaves: double negations cancel, De Morgan
    /// applies to AND/OR, and negated comparisons are inverted.
    pub fn push_not_operation_down_to_stack(self) -> ExprNode {
        let ExprNode {
            kind,
            field_type,
            is_null,
        } = self;
        let NodeKind::Operation(mut op) = kind else {
            return ExprNode {
                kind,
                field_type,
                is_null,
            };
        };

        if op.operator == Operator::Not && op.args.len() == 1 {
            if let Some(child) = op.args.pop() {
                match negate_child(child, field_type) {
                    Ok(rewritten) => return rewritten,
                    Err(child) => op.args.push(child),
                }
            }
        }

        op.args = op
            .args
            .into_iter()
            .map(ExprNode::push_not_operation_down_to_stack)
            .collect();
        ExprNode {
            kind: NodeKind::Operation(op),
            field_type,
            is_null,
        }
    }
}

/// Eliminates a NOT whose operand is `child`. Gives the child back untouched
/// when the NOT has to stay.
fn negate_child(child: ExprNode, not_type: model::FieldType) -> Result<ExprNode, ExprNode> {
    let ExprNode {
        kind,
        field_type,
        is_null,
    } = child;
    let NodeKind::Operation(mut inner) = kind else {
        return Err(ExprNode {
            kind,
            field_type,
            is_null,
        });
    };

    match inner.operator {
        Operator::Not if inner.args.len() == 1 => match inner.args.pop() {
            Some(operand) => Ok(operand.push_not_operation_down_to_stack()),
            None => Err(rebuild(inner, field_type, is_null)),
        },
        Operator::And | Operator::Or => {
            inner.operator = if inner.operator == Operator::And {
                Operator::Or
            } else {
                Operator::And
            };
            inner.args = inner
                .args
                .into_iter()
                .map(|arg| {
                    let mut not = ExprNode::operation_with(Operator::Not, vec![arg]);
                    not.field_type = not_type;
                    not.push_not_operation_down_to_stack()
                })
                .collect();
            Ok(rebuild(inner, field_type, is_null))
        }
        operator => match operator.negated_comparison() {
            Some(negated) => {
                inner.operator = negated;
                inner.args = inner
                    .args
                    .into_iter()
                    .map(ExprNode::push_not_operation_down_to_stack)
                    .collect();
                Ok(rebuild(inner, field_type, is_null))
            }
            None => Err(rebuild(inner, field_type, is_null)),
        },
    }
}

fn rebuild(op: Operation, field_type: model::FieldType, is_null: bool) -> ExprNode {
    ExprNode {
        kind: NodeKind::Operation(op),
        field_type,
        is_null,
    }
}
