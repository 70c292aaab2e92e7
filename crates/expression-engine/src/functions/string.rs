use super::{any_null, expect_arity, integer_value, is_null_literal, text_value, type_mismatch};
use crate::{context::EvalContext, error::Result};
use model::FieldType;
use sql_syntax::ExprNode;
use std::{iter::Peekable, str::Chars};

pub fn check_concat(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    if node
        .args()
        .iter()
        .any(|arg| arg.field_type == FieldType::Geometry)
    {
        return Err(type_mismatch(node));
    }
    Ok(FieldType::String)
}

pub fn eval_concat(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    if any_null(args) {
        return Ok(ExprNode::typed_null(FieldType::String));
    }
    let joined: String = args.iter().map(|arg| text_value(arg)).collect();
    Ok(ExprNode::string(&joined))
}

pub fn check_substr(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    expect_arity(node, 2, 3)?;
    let args = node.args();
    let text_ok = args[0].field_type.is_string_like() || is_null_literal(&args[0]);
    let bounds_ok = args[1..]
        .iter()
        .all(|arg| arg.field_type.is_integer() || is_null_literal(arg));
    if !text_ok || !bounds_ok {
        return Err(type_mismatch(node));
    }
    Ok(FieldType::String)
}

/// `SUBSTR(text, start[, length])`. `start` is 1-based; a negative start
/// counts back from the end.
pub fn eval_substr(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    if any_null(args) || args.len() < 2 {
        return Ok(ExprNode::typed_null(FieldType::String));
    }
    let chars: Vec<char> = text_value(args[0]).chars().collect();
    let len = chars.len() as i64;
    let start = integer_value(args[1]);
    let offset = match start {
        s if s > 0 => s - 1,
        s if s < 0 => (len + s).max(0),
        _ => 0,
    }
    .min(len);
    let count = args
        .get(2)
        .map(|arg| integer_value(arg).max(0))
        .unwrap_or(len)
        .min(len - offset);

    let result: String = chars
        .iter()
        .skip(offset as usize)
        .take(count as usize)
        .collect();
    Ok(ExprNode::string(&result))
}

pub fn check_hstore(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    expect_arity(node, 2, 2)?;
    let strings = node
        .args()
        .iter()
        .all(|arg| arg.field_type.is_string_like() || is_null_literal(arg));
    if !strings {
        return Err(type_mismatch(node));
    }
    Ok(FieldType::String)
}

/// `HSTORE_GET_VALUE(hstore, key)`: the value stored under `key`, or null.
pub fn eval_hstore(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    if any_null(args) || args.len() != 2 {
        return Ok(ExprNode::typed_null(FieldType::String));
    }
    let key = text_value(args[1]);
    let value = parse_hstore(&text_value(args[0]))
        .into_iter()
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| v);
    Ok(ExprNode::nullable_string(value.as_deref()))
}

/// Parses `"key" => "value", other => NULL` pairs. Parsing stops at the
/// first malformed pair.
pub fn parse_hstore(text: &str) -> Vec<(String, Option<String>)> {
    let mut pairs = Vec::new();
    let mut chars = text.chars().peekable();
    loop {
        skip_separators(&mut chars);
        let Some((key, _)) = read_token(&mut chars) else {
            break;
        };
        skip_whitespace(&mut chars);
        if chars.next() != Some('=') || chars.next() != Some('>') {
            break;
        }
        skip_whitespace(&mut chars);
        let Some((value, quoted)) = read_token(&mut chars) else {
            break;
        };
        let value = (quoted || !value.eq_ignore_ascii_case("NULL")).then_some(value);
        pairs.push((key, value));
    }
    pairs
}

fn skip_whitespace(chars: &mut Peekable<Chars>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn skip_separators(chars: &mut Peekable<Chars>) {
    while chars.next_if(|c| c.is_whitespace() || *c == ',').is_some() {}
}

/// Reads a quoted or bare token. The flag tells whether it was quoted.
fn read_token(chars: &mut Peekable<Chars>) -> Option<(String, bool)> {
    let mut token = String::new();
    if chars.next_if_eq(&'"').is_some() {
        loop {
            match chars.next()? {
                '\\' => token.push(chars.next()?),
                '"' => return Some((token, true)),
                c => token.push(c),
            }
        }
    }
    while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != ',' && *c != '=') {
        token.push(c);
    }
    (!token.is_empty()).then_some((token, false))
}
