//! Builds expression trees and select statements from the pest parse tree.

use crate::{
    ast::{
        node::{ColumnRef, ConstantValue, ExprNode, NodeKind},
        operator::Operator,
        select::SelectStatement,
    },
    error::{SyntaxError, SyntaxResult},
    parser::{Rule, SqlParser},
};
use model::ParseOptions;
use pest::{
    Parser,
    error::{Error as PestError, LineColLocation},
    iterators::{Pair, Pairs},
};
use tracing::debug;

pub type BuildResult<T> = SyntaxResult<T>;

/// Magnitude of `i64::MIN`; only representable once negated.
const INT64_MIN_MAGNITUDE: &str = "9223372036854775808";

struct BuildContext {
    accept_custom_funcs: bool,
}

impl From<&ParseOptions> for BuildContext {
    fn from(options: &ParseOptions) -> Self {
        Self {
            accept_custom_funcs: options.accept_custom_funcs,
        }
    }
}

/// Parses a standalone value expression, such as a WHERE clause body.
pub fn parse_expression(input: &str, options: &ParseOptions) -> BuildResult<ExprNode> {
    let mut pairs =
        SqlParser::parse(Rule::value_expression, input).map_err(to_syntax_error)?;
    let root = expect_next(&mut pairs, "expression")?;
    let ctx = BuildContext::from(options);
    let expr = expect_next(&mut root.into_inner(), "expression")?;
    let node = build_node(expr, &ctx)?;
    debug!("Parsed expression '{}'", input.trim());
    Ok(node)
}

/// Parses a SELECT statement, including any `UNION ALL` continuation.
pub fn parse_select(input: &str, options: &ParseOptions) -> BuildResult<SelectStatement> {
    let mut pairs =
        SqlParser::parse(Rule::select_statement, input).map_err(to_syntax_error)?;
    let root = expect_next(&mut pairs, "select statement")?;
    let ctx = BuildContext::from(options);

    let mut cores = Vec::new();
    for part in root.into_inner() {
        if part.as_rule() == Rule::select_core {
            cores.push(build_select_core(part, &ctx)?);
        }
    }
    let mut cores = cores.into_iter();
    let mut statement = cores
        .next()
        .ok_or_else(|| SyntaxError::parse("missing SELECT", 1, 1))?;
    for next in cores {
        statement.push_union_all(next);
    }

    statement.postpreparse()?;
    debug!(
        "Parsed select with {} columns and {} tables",
        statement.columns.len(),
        statement.tables.len()
    );
    Ok(statement)
}

fn rule_label(rule: &Rule) -> String {
    let name = format!("{rule:?}");
    if let Some(keyword) = name.strip_prefix("kw_") {
        return keyword.to_ascii_uppercase();
    }
    match rule {
        Rule::EOI => "end of input".to_string(),
        Rule::string => "string literal".to_string(),
        Rule::number | Rule::integer_number | Rule::float_number => "number".to_string(),
        Rule::cmp_op | Rule::ne_op | Rule::le_op | Rule::ge_op | Rule::eq_op | Rule::lt_op
        | Rule::gt_op => "comparison operator".to_string(),
        _ => name.replace('_', " "),
    }
}

fn to_syntax_error(error: PestError<Rule>) -> SyntaxError {
    let (line, column) = match error.line_col {
        LineColLocation::Pos(pos) | LineColLocation::Span(pos, _) => pos,
    };
    let error = error.renamed_rules(rule_label);
    SyntaxError::parse(error.variant.message().into_owned(), line, column)
}

fn error_at(pair: &Pair<Rule>, message: impl Into<String>) -> SyntaxError {
    let (line, column) = pair.as_span().start_pos().line_col();
    SyntaxError::parse(message, line, column)
}

fn unexpected(pair: &Pair<Rule>) -> SyntaxError {
    error_at(pair, format!("unexpected {}", rule_label(&pair.as_rule())))
}

fn expect_next<'a>(pairs: &mut Pairs<'a, Rule>, what: &str) -> BuildResult<Pair<'a, Rule>> {
    pairs
        .next()
        .ok_or_else(|| SyntaxError::parse(format!("missing {what}"), 1, 1))
}

fn identifier_text(pair: &Pair<Rule>) -> String {
    let text = pair.as_str();
    match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => text.to_string(),
    }
}

fn string_text(pair: &Pair<Rule>) -> String {
    let text = pair.as_str();
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text);
    inner.replace("''", "'")
}

fn integer_constant(pair: &Pair<Rule>) -> BuildResult<ExprNode> {
    let text = pair.as_str();
    let value = text
        .parse::<i64>()
        .map_err(|_| SyntaxError::InvalidNumber(text.to_string()))?;
    Ok(match i32::try_from(value) {
        Ok(small) => ExprNode::integer(small),
        Err(_) => ExprNode::integer64(value),
    })
}

/// Integers that fit 32 bits are Integer, those that fit 64 bits Integer64,
/// anything larger becomes a Float.
fn build_number(pair: Pair<Rule>) -> BuildResult<ExprNode> {
    let text = pair.as_str();
    let invalid = || SyntaxError::InvalidNumber(text.to_string());
    if text.contains(['.', 'e', 'E']) {
        return text.parse::<f64>().map(ExprNode::float).map_err(|_| invalid());
    }
    match text.parse::<i64>() {
        Ok(value) => Ok(match i32::try_from(value) {
            Ok(small) => ExprNode::integer(small),
            Err(_) => ExprNode::integer64(value),
        }),
        Err(_) => text.parse::<f64>().map(ExprNode::float).map_err(|_| invalid()),
    }
}

fn build_node(pair: Pair<Rule>, ctx: &BuildContext) -> BuildResult<ExprNode> {
    match pair.as_rule() {
        Rule::expression | Rule::primary => {
            let inner = expect_next(&mut pair.into_inner(), "expression")?;
            build_node(inner, ctx)
        }
        Rule::or_expr | Rule::and_expr | Rule::additive | Rule::multiplicative => {
            build_left_assoc(pair, ctx)
        }
        Rule::not_expr => build_not(pair, ctx),
        Rule::predicate => build_predicate(pair, ctx),
        Rule::unary => build_unary(pair, ctx),
        Rule::cast_expr => build_cast(pair, ctx),
        Rule::star_call => build_star_call(pair),
        Rule::function_call => {
            let (node, distinct) = build_call(pair.clone(), ctx)?;
            if distinct {
                return Err(error_at(
                    &pair,
                    "COUNT(DISTINCT ...) is only allowed in a column definition",
                ));
            }
            Ok(node)
        }
        Rule::timestamp_literal => {
            let literal = pair
                .into_inner()
                .find(|p| p.as_rule() == Rule::string)
                .map(|p| string_text(&p))
                .unwrap_or_default();
            let mut node = ExprNode::string(&literal);
            node.mark_as_timestamp();
            Ok(node)
        }
        Rule::null_literal => Ok(ExprNode::null()),
        Rule::number => build_number(pair),
        Rule::string => Ok(ExprNode::string(&string_text(&pair))),
        Rule::column_ref => {
            let column = build_column_ref(pair)?;
            Ok(ExprNode::column(column.table_name.as_deref(), &column.name))
        }
        _ => Err(unexpected(&pair)),
    }
}

fn binary_operator(pair: &Pair<Rule>) -> BuildResult<Operator> {
    let text = pair.as_str();
    let op = match pair.as_rule() {
        Rule::kw_or => Operator::Or,
        Rule::kw_and => Operator::And,
        Rule::add_op if text == "+" => Operator::Add,
        Rule::add_op => Operator::Subtract,
        Rule::mul_op => match text {
            "*" => Operator::Multiply,
            "/" => Operator::Divide,
            _ => Operator::Modulus,
        },
        Rule::cmp_op => match text {
            "<>" | "!=" => Operator::Ne,
            "<=" | "=<" => Operator::Le,
            ">=" | "=>" => Operator::Ge,
            "<" => Operator::Lt,
            ">" => Operator::Gt,
            _ => Operator::Eq,
        },
        _ => return Err(unexpected(pair)),
    };
    Ok(op)
}

fn build_left_assoc(pair: Pair<Rule>, ctx: &BuildContext) -> BuildResult<ExprNode> {
    let mut inner = pair.into_inner();
    let mut left = build_node(expect_next(&mut inner, "operand")?, ctx)?;
    while let Some(op_pair) = inner.next() {
        let operator = binary_operator(&op_pair)?;
        let right = build_node(expect_next(&mut inner, "operand")?, ctx)?;
        left = ExprNode::operation_with(operator, vec![left, right]);
    }
    Ok(left)
}

fn negated(node: ExprNode) -> ExprNode {
    ExprNode::operation_with(Operator::Not, vec![node])
}

fn build_not(pair: Pair<Rule>, ctx: &BuildContext) -> BuildResult<ExprNode> {
    let mut inner = pair.into_inner();
    let first = expect_next(&mut inner, "operand")?;
    if first.as_rule() != Rule::kw_not {
        return build_node(first, ctx);
    }
    let operand = build_node(expect_next(&mut inner, "operand")?, ctx)?;
    Ok(negated(operand))
}

fn build_predicate(pair: Pair<Rule>, ctx: &BuildContext) -> BuildResult<ExprNode> {
    let mut inner = pair.into_inner();
    let node = build_node(expect_next(&mut inner, "operand")?, ctx)?;
    match inner.next() {
        Some(tail) => apply_tail(node, tail, ctx),
        None => Ok(node),
    }
}

/// Applies a postfix predicate (`= x`, `LIKE p`, `IN (..)`, `BETWEEN a AND b`,
/// `IS NULL`) to the expression on its left. Negated forms wrap the result
/// in NOT.
fn apply_tail(left: ExprNode, tail: Pair<Rule>, ctx: &BuildContext) -> BuildResult<ExprNode> {
    let rule = tail.as_rule();
    if rule == Rule::comparison_tail {
        let mut parts = tail.into_inner();
        let operator = binary_operator(&expect_next(&mut parts, "operator")?)?;
        let right = build_node(expect_next(&mut parts, "operand")?, ctx)?;
        return Ok(ExprNode::operation_with(operator, vec![left, right]));
    }

    let mut operator = match rule {
        Rule::like_tail => Operator::Like,
        Rule::in_tail => Operator::In,
        Rule::between_tail => Operator::Between,
        Rule::is_null_tail => Operator::IsNull,
        _ => return Err(unexpected(&tail)),
    };
    let mut negate = false;
    let mut args = vec![left];
    for part in tail.into_inner() {
        match part.as_rule() {
            Rule::kw_not => negate = true,
            Rule::kw_ilike => operator = Operator::ILike,
            Rule::kw_like
            | Rule::kw_escape
            | Rule::kw_in
            | Rule::kw_between
            | Rule::kw_and
            | Rule::kw_is
            | Rule::kw_null => {}
            Rule::expression_list => {
                for value in part.into_inner() {
                    args.push(build_node(value, ctx)?);
                }
            }
            _ => args.push(build_node(part, ctx)?),
        }
    }

    let node = ExprNode::operation_with(operator, args);
    Ok(if negate { negated(node) } else { node })
}

/// Folds negation into numeric constants; other operands become `-1 * x`.
fn negate_value(mut node: ExprNode) -> ExprNode {
    let folded = match &mut node.kind {
        NodeKind::Constant(ConstantValue::Integer(v)) => {
            *v = v.checked_neg().unwrap_or(*v);
            true
        }
        NodeKind::Constant(ConstantValue::Float(v)) => {
            *v = -*v;
            true
        }
        _ => false,
    };
    if folded {
        node
    } else {
        ExprNode::operation_with(Operator::Multiply, vec![ExprNode::integer(-1), node])
    }
}

fn build_unary(pair: Pair<Rule>, ctx: &BuildContext) -> BuildResult<ExprNode> {
    let mut inner = pair.into_inner();
    let first = expect_next(&mut inner, "operand")?;
    if first.as_rule() != Rule::neg {
        return build_node(first, ctx);
    }
    let operand = expect_next(&mut inner, "operand")?;
    if operand.as_str().trim() == INT64_MIN_MAGNITUDE {
        return Ok(ExprNode::integer64(i64::MIN));
    }
    Ok(negate_value(build_node(operand, ctx)?))
}

fn build_star_call(pair: Pair<Rule>) -> BuildResult<ExprNode> {
    let name = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::identifier)
        .map(|p| identifier_text(&p))
        .unwrap_or_default();
    if !name.eq_ignore_ascii_case("COUNT") {
        return Err(SyntaxError::StarArgument(name));
    }
    Ok(ExprNode::operation_with(
        Operator::Count,
        vec![ExprNode::column(None, "*")],
    ))
}

/// Builds a function call and reports whether it carried DISTINCT.
fn build_call(pair: Pair<Rule>, ctx: &BuildContext) -> BuildResult<(ExprNode, bool)> {
    let mut inner = pair.into_inner();
    let name = identifier_text(&expect_next(&mut inner, "function name")?);
    let mut distinct = false;
    let mut args = Vec::new();
    for part in inner {
        match part.as_rule() {
            Rule::kw_distinct => distinct = true,
            Rule::expression_list => {
                for value in part.into_inner() {
                    args.push(build_node(value, ctx)?);
                }
            }
            _ => return Err(unexpected(&part)),
        }
    }
    if distinct && !name.eq_ignore_ascii_case("COUNT") {
        return Err(SyntaxError::MisplacedDistinct);
    }

    let node = match Operator::from_function_name(&name) {
        Some(operator) => ExprNode::operation_with(operator, args),
        None if ctx.accept_custom_funcs => ExprNode::custom_function(&name, args),
        None => return Err(SyntaxError::UndefinedFunction(name)),
    };
    Ok((node, distinct))
}

/// `CAST(x AS name[(a[, b])])` becomes `CAST(x, 'name'[, a[, b]])`.
fn build_cast(pair: Pair<Rule>, ctx: &BuildContext) -> BuildResult<ExprNode> {
    let mut node = ExprNode::operation(Operator::Cast);
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::kw_cast | Rule::kw_as => {}
            Rule::expression => node.push_sub_expression(build_node(part, ctx)?),
            Rule::type_def => {
                for piece in part.into_inner() {
                    match piece.as_rule() {
                        Rule::identifier => {
                            node.push_sub_expression(ExprNode::string(&identifier_text(&piece)))
                        }
                        Rule::type_arg => {
                            let value = expect_next(&mut piece.into_inner(), "type argument")?;
                            let arg = match value.as_rule() {
                                Rule::integer_number => integer_constant(&value)?,
                                _ => ExprNode::string(&identifier_text(&value)),
                            };
                            node.push_sub_expression(arg);
                        }
                        _ => return Err(unexpected(&piece)),
                    }
                }
            }
            _ => return Err(unexpected(&part)),
        }
    }
    Ok(node)
}

fn build_column_ref(pair: Pair<Rule>) -> BuildResult<ColumnRef> {
    let mut names: Vec<String> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::identifier)
        .map(|p| identifier_text(&p))
        .collect();
    let name = names
        .pop()
        .ok_or_else(|| SyntaxError::parse("missing column name", 1, 1))?;
    Ok(ColumnRef::new(names.pop().as_deref(), &name))
}

/// Finds `COUNT(DISTINCT ..)` standing alone as a column expression.
fn distinct_count_call<'a>(pair: &Pair<'a, Rule>) -> Option<Pair<'a, Rule>> {
    let mut current = pair.clone();
    loop {
        if current.as_rule() == Rule::function_call {
            let has_distinct = current
                .clone()
                .into_inner()
                .any(|p| p.as_rule() == Rule::kw_distinct);
            return has_distinct.then_some(current);
        }
        let mut inner = current.into_inner();
        let only = inner.next()?;
        if inner.next().is_some() {
            return None;
        }
        current = only;
    }
}

fn alias_text(pair: Pair<Rule>) -> Option<String> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::identifier)
        .last()
        .map(|p| identifier_text(&p))
}

fn build_select_core(pair: Pair<Rule>, ctx: &BuildContext) -> BuildResult<SelectStatement> {
    let mut statement = SelectStatement::new();
    statement.raw_select = pair.as_str().trim().to_string();
    let mut distinct = false;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::kw_select | Rule::kw_from => {}
            Rule::kw_distinct => distinct = true,
            Rule::field_list => {
                for spec in part.into_inner() {
                    build_column_spec(&mut statement, spec, distinct, ctx)?;
                }
            }
            Rule::table_def => {
                build_table_def(&mut statement, part)?;
            }
            Rule::join_clause => build_join(&mut statement, part, ctx)?,
            Rule::where_clause => {
                let expr = part
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::expression)
                    .ok_or_else(|| SyntaxError::parse("missing WHERE expression", 1, 1))?;
                statement.where_expr = Some(build_node(expr, ctx)?);
            }
            Rule::order_by_clause => {
                for spec in part.into_inner().filter(|p| p.as_rule() == Rule::order_spec) {
                    let mut column = None;
                    let mut ascending = true;
                    for piece in spec.into_inner() {
                        match piece.as_rule() {
                            Rule::column_ref => column = Some(build_column_ref(piece)?),
                            Rule::kw_desc => ascending = false,
                            _ => {}
                        }
                    }
                    if let Some(column) = column {
                        statement.push_order_by(
                            column.table_name.as_deref(),
                            &column.name,
                            ascending,
                        );
                    }
                }
            }
            Rule::limit_clause => statement.limit = Some(clause_count(part)?),
            Rule::offset_clause => statement.offset = clause_count(part)?,
            _ => return Err(unexpected(&part)),
        }
    }
    Ok(statement)
}

fn clause_count(pair: Pair<Rule>) -> BuildResult<i64> {
    let number = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::integer_number)
        .ok_or_else(|| SyntaxError::parse("missing count", 1, 1))?;
    number
        .as_str()
        .parse::<i64>()
        .map_err(|_| SyntaxError::InvalidNumber(number.as_str().to_string()))
}

fn build_column_spec(
    statement: &mut SelectStatement,
    spec: Pair<Rule>,
    distinct: bool,
    ctx: &BuildContext,
) -> BuildResult<()> {
    let mut inner = spec.into_inner();
    let first = expect_next(&mut inner, "column")?;

    if first.as_rule() == Rule::wildcard_spec {
        let mut table = None;
        let mut exclusions = Vec::new();
        for part in first.into_inner() {
            match part.as_rule() {
                Rule::identifier => table = Some(identifier_text(&part)),
                Rule::except_clause => {
                    for column in part.into_inner().filter(|p| p.as_rule() == Rule::column_ref) {
                        exclusions.push(build_column_ref(column)?);
                    }
                }
                _ => {}
            }
        }
        statement.push_field(ExprNode::column(table.as_deref(), "*"), None, distinct)?;
        for column in exclusions {
            statement.push_exclude_field(column)?;
        }
        return Ok(());
    }

    let alias = inner.next().and_then(alias_text);
    if let Some(call) = distinct_count_call(&first) {
        if distinct {
            return Err(SyntaxError::DistinctCombination);
        }
        let (node, _) = build_call(call, ctx)?;
        return statement.push_field(node, alias.as_deref(), true);
    }

    let node = build_node(first, ctx)?;
    if distinct {
        if node.operator().is_some_and(|op| op.is_aggregate()) {
            return Err(SyntaxError::DistinctCombination);
        }
        if !node.is_column() {
            return Err(SyntaxError::DistinctExpression);
        }
    }
    statement.push_field(node, alias.as_deref(), distinct)
}

fn build_table_def(statement: &mut SelectStatement, pair: Pair<Rule>) -> BuildResult<usize> {
    let mut data_source = None;
    let mut name = None;
    let mut alias = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::string => data_source = Some(string_text(&part)),
            Rule::identifier => name = Some(identifier_text(&part)),
            Rule::alias => alias = alias_text(part),
            _ => {}
        }
    }
    let name = name.ok_or_else(|| SyntaxError::parse("missing table name", 1, 1))?;
    Ok(statement.push_table_def(data_source.as_deref(), &name, alias.as_deref()))
}

fn build_join(
    statement: &mut SelectStatement,
    pair: Pair<Rule>,
    ctx: &BuildContext,
) -> BuildResult<()> {
    let mut table = None;
    let mut condition = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::table_def => table = Some(build_table_def(statement, part)?),
            Rule::expression => condition = Some(build_node(part, ctx)?),
            _ => {}
        }
    }
    match (table, condition) {
        (Some(table), Some(condition)) => {
            statement.push_join(table, condition);
            Ok(())
        }
        _ => Err(SyntaxError::parse("incomplete JOIN clause", 1, 1)),
    }
}
