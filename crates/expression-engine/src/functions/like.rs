//! LIKE and ILIKE pattern matching.
//!
//! `%` matches any run, `_` a single character (or byte when UTF-8 handling
//! is off), and an optional escape character makes the next pattern
//! character literal. The matcher backtracks only to the last `%`, so it
//! runs in O(text * pattern) on adversarial input.

use super::{any_null, boolean_result, expect_arity, is_null_literal, text_value, type_mismatch};
use crate::{context::EvalContext, error::Result};
use model::FieldType;
use sql_syntax::{ExprNode, Operator};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<T> {
    Literal(T),
    One,
    Many,
}

pub fn check_like(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    expect_arity(node, 2, 3)?;
    let strings = node
        .args()
        .iter()
        .all(|arg| arg.field_type.is_string_like() || is_null_literal(arg));
    if !strings {
        return Err(type_mismatch(node));
    }
    Ok(FieldType::Boolean)
}

pub fn eval_like(node: &ExprNode, args: &[&ExprNode], ctx: &EvalContext) -> Result<ExprNode> {
    if any_null(&args[..args.len().min(2)]) {
        return Ok(boolean_result(None));
    }
    let (Some(value), Some(pattern)) = (args.first(), args.get(1)) else {
        return Err(type_mismatch(node));
    };
    let escape = args
        .get(2)
        .filter(|e| !e.is_null)
        .and_then(|e| e.as_str())
        .and_then(|s| s.chars().next());
    let case_insensitive = node.operator() == Some(Operator::ILike);
    Ok(ExprNode::boolean(like(
        &text_value(value),
        &text_value(pattern),
        escape,
        case_insensitive,
        ctx.utf8_strings,
    )))
}

/// Matches `text` against a LIKE `pattern`.
pub fn like(text: &str, pattern: &str, escape: Option<char>, case_insensitive: bool, utf8: bool) -> bool {
    if utf8 {
        let fold = |s: &str| -> Vec<char> {
            if case_insensitive {
                s.to_lowercase().chars().collect()
            } else {
                s.chars().collect()
            }
        };
        let escape = match escape {
            Some(c) if case_insensitive => c.to_lowercase().next(),
            other => other,
        };
        let tokens = tokenize(&fold(pattern), '%', '_', escape);
        matches(&fold(text), &tokens)
    } else {
        let fold = |s: &str| -> Vec<u8> {
            if case_insensitive {
                s.to_ascii_lowercase().into_bytes()
            } else {
                s.as_bytes().to_vec()
            }
        };
        let escape = escape.filter(char::is_ascii).map(|c| {
            let c = if case_insensitive { c.to_ascii_lowercase() } else { c };
            c as u8
        });
        let tokens = tokenize(&fold(pattern), b'%', b'_', escape);
        matches(&fold(text), &tokens)
    }
}

fn tokenize<T: Copy + PartialEq>(pattern: &[T], many: T, one: T, escape: Option<T>) -> Vec<Token<T>> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.iter().copied();
    while let Some(c) = chars.next() {
        let token = if Some(c) == escape {
            // A trailing escape stands for itself.
            Token::Literal(chars.next().unwrap_or(c))
        } else if c == many {
            // Runs of `%` collapse.
            if tokens.last() == Some(&Token::Many) {
                continue;
            }
            Token::Many
        } else if c == one {
            Token::One
        } else {
            Token::Literal(c)
        };
        tokens.push(token);
    }
    tokens
}

fn matches<T: Copy + PartialEq>(text: &[T], tokens: &[Token<T>]) -> bool {
    let (mut t, mut p) = (0, 0);
    // Pattern position after the last `%`, and the text position it resumes at.
    let mut resume: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::Many) => {
                p += 1;
                resume = Some((p, t));
                continue;
            }
            Some(Token::One) => {
                t += 1;
                p += 1;
                continue;
            }
            Some(Token::Literal(c)) if *c == text[t] => {
                t += 1;
                p += 1;
                continue;
            }
            _ => {}
        }
        match resume {
            Some((star_p, star_t)) => {
                p = star_p;
                t = star_t + 1;
                resume = Some((star_p, star_t + 1));
            }
            None => return false,
        }
    }
    tokens[p..].iter().all(|token| *token == Token::Many)
}
