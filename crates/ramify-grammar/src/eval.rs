//! Arithmetic clause evaluator for parameterized productions.
//!
//! [`evaluate`] is a stateless pure function: it takes one comma-free
//! arithmetic clause (signed decimal literals joined by infix `+ - * /`,
//! standard precedence, left associativity) and returns the numeric result.
//! Parentheses are not part of the clause language — the matcher splits
//! bracketed groups off before calling in, and nesting is unsupported.
//!
//! Anything that fails to parse — an unsubstituted variable name, a
//! malformed operator sequence — is [`GrammarError::InvalidExpression`].
//! So is a non-finite result (division by zero): splicing `inf` or `NaN`
//! text into the derived string would poison the next generation's parse.

use once_cell::sync::Lazy;
use pest::iterators::Pairs;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;

use crate::error::GrammarError;

// ── Pest parser derive ─────────────────────────────────────

#[derive(Parser)]
#[grammar = "src/arith.pest"]
struct ArithParser;

static PRATT: Lazy<PrattParser<Rule>> = Lazy::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left) | Op::infix(Rule::div, Assoc::Left))
});

// ── Public entry point ────────────────────────────────────

/// Evaluate one arithmetic clause to a number.
///
/// The result renders back into the derived string via `f64`'s shortest
/// round-trip `Display`: `evaluate("3*2")` prints as `6`, not `6.0`.
pub fn evaluate(expr: &str) -> Result<f64, GrammarError> {
    let mut pairs = ArithParser::parse(Rule::clause, expr)
        .map_err(|e| invalid(expr, e.to_string()))?;

    let root = pairs
        .next()
        .and_then(|clause| clause.into_inner().next())
        .ok_or_else(|| invalid(expr, "empty clause"))?;

    let value = eval_expr(root.into_inner(), expr)?;
    if !value.is_finite() {
        return Err(invalid(expr, format!("non-finite result: {value}")));
    }
    Ok(value)
}

// ── Pratt evaluation ──────────────────────────────────────

fn eval_expr(pairs: Pairs<Rule>, src: &str) -> Result<f64, GrammarError> {
    PRATT
        .map_primary(|primary| match primary.as_rule() {
            Rule::number => primary
                .as_str()
                .parse::<f64>()
                .map_err(|e| invalid(src, e.to_string())),
            r => Err(invalid(src, format!("unexpected rule: {r:?}"))),
        })
        .map_infix(|lhs, op, rhs| {
            let (l, r) = (lhs?, rhs?);
            Ok(match op.as_rule() {
                Rule::add => l + r,
                Rule::sub => l - r,
                Rule::mul => l * r,
                Rule::div => l / r,
                r => return Err(invalid(src, format!("unexpected operator: {r:?}"))),
            })
        })
        .parse(pairs)
}

fn invalid(expr: &str, reason: impl Into<String>) -> GrammarError {
    GrammarError::InvalidExpression {
        expr: expr.to_string(),
        reason: reason.into(),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
