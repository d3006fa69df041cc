//! Rule matching at a single position of the working string.
//!
//! [`try_match`] tries every rule in the order the precedence policy
//! dictates and reports the first hit as a [`RuleMatch`]: the production
//! text to append and how many input symbols the cursor must advance.
//!
//! ## Per-shape tests
//!
//! - **Contextual** — the position must leave room for both contexts in the
//!   raw string; the *reduced* left/right substrings (ignore symbols and
//!   closed branches stripped) must then end/start with the rule's contexts.
//!   Consumes 1 symbol.
//! - **Parametric** — the input must carry a `name(v1,…,vn)` token with the
//!   declared arity; arity mismatch or a missing `)` is a non-match, never
//!   an error. The production template gets each parameter textually
//!   replaced by its value in declaration order, then every parenthesized
//!   group is evaluated clause-by-clause. Consumes the whole token through
//!   its closing `)`.
//! - **Simple** — the key equals the one-symbol string at the position.
//!   Consumes 1 symbol.
//!
//! No rule matching a position is ordinary control flow (`Ok(None)`); the
//! engine then copies the symbol unchanged.

use crate::context::{strip, BracketPolicy};
use crate::error::GrammarError;
use crate::eval::evaluate;
use crate::rules::{PrecedencePolicy, RuleKind, RuleSet};

// ─────────────────────────────────────────────
// Match result
// ─────────────────────────────────────────────

/// Outcome of a successful rule application at one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Text appended to the next generation.
    pub production: String,
    /// Input symbols the cursor advances past.
    pub consumed: usize,
}

// ─────────────────────────────────────────────
// Matching
// ─────────────────────────────────────────────

/// Try every rule at `symbols[pos]`; first match wins.
///
/// `Err` only on a failed arithmetic clause inside a matched parametric
/// rule — that aborts the whole derivation step.
pub fn try_match(
    symbols: &[char],
    pos: usize,
    rules: &RuleSet,
    ignore: &str,
    precedence: PrecedencePolicy,
    brackets: BracketPolicy,
) -> Result<Option<RuleMatch>, GrammarError> {
    for entry in rules.iter(precedence) {
        let hit = match &entry.kind {
            RuleKind::Contextual {
                left,
                center,
                right,
            } => match_contextual(symbols, pos, left, *center, right, ignore, brackets)
                .then(|| RuleMatch {
                    production: entry.production.clone(),
                    consumed: 1,
                }),
            RuleKind::Parametric { name, params } => {
                match_parametric(symbols, pos, *name, params, &entry.production)?
            }
            RuleKind::Simple => {
                let mut key = entry.key.chars();
                (key.next() == Some(symbols[pos]) && key.next().is_none()).then(|| RuleMatch {
                    production: entry.production.clone(),
                    consumed: 1,
                })
            }
        };
        if hit.is_some() {
            return Ok(hit);
        }
    }
    Ok(None)
}

/// Contextual test: compare `trailing-left + symbol + leading-right` of the
/// reduced contexts against the rule's `left + center + right`, literally.
fn match_contextual(
    symbols: &[char],
    pos: usize,
    left: &str,
    center: char,
    right: &str,
    ignore: &str,
    brackets: BracketPolicy,
) -> bool {
    let left_len = left.chars().count();
    let right_len = right.chars().count();

    // Not enough raw room on either side.
    if pos < left_len || pos + right_len >= symbols.len() {
        return false;
    }

    let reduced_left: Vec<char> = strip(&symbols[..pos], ignore, brackets).chars().collect();
    let reduced_right: Vec<char> = strip(&symbols[pos + 1..], ignore, brackets)
        .chars()
        .collect();
    if reduced_left.len() < left_len || reduced_right.len() < right_len {
        return false;
    }

    let mut observed = String::new();
    observed.extend(&reduced_left[reduced_left.len() - left_len..]);
    observed.push(symbols[pos]);
    observed.extend(&reduced_right[..right_len]);

    let mut expected = String::new();
    expected.push_str(left);
    expected.push(center);
    expected.push_str(right);

    observed == expected
}

/// Parametric test and expansion.
fn match_parametric(
    symbols: &[char],
    pos: usize,
    name: char,
    params: &[String],
    production: &str,
) -> Result<Option<RuleMatch>, GrammarError> {
    let remaining = &symbols[pos..];
    // A token is at least `name`, `(`, one value symbol, `)`.
    if remaining.len() < 4 || remaining[0] != name || remaining[1] != '(' {
        return Ok(None);
    }
    let close = match remaining.iter().skip(2).position(|&c| c == ')') {
        Some(idx) => idx + 2,
        None => return Ok(None),
    };

    let values: String = remaining[2..close].iter().collect();
    let actuals: Vec<&str> = values.split(',').collect();
    if actuals.len() != params.len() {
        return Ok(None);
    }

    // Textual replacement, declaration order, each applied to the previous
    // result. A later name that is a substring of an earlier one corrupts
    // the template; caller responsibility.
    let mut template = production.to_string();
    for (param, actual) in params.iter().zip(&actuals) {
        template = template.replace(param.as_str(), actual);
    }

    Ok(Some(RuleMatch {
        production: evaluate_groups(&template)?,
        consumed: close + 1,
    }))
}

/// Evaluate every parenthesized, non-nested group in `template` left to
/// right: split on `,`, evaluate each clause, splice the results back
/// between the original parens.
fn evaluate_groups(template: &str) -> Result<String, GrammarError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('(') {
        let close = match rest[open + 1..].find(')') {
            Some(idx) => open + 1 + idx,
            None => break, // unterminated group: emit verbatim
        };
        output.push_str(&rest[..=open]);
        let clauses = rest[open + 1..close]
            .split(',')
            .map(|clause| evaluate(clause).map(|v| v.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        output.push_str(&clauses.join(","));
        rest = &rest[close..];
    }
    output.push_str(rest);
    Ok(output)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
