//! Rule classification and the ordered rule store.
//!
//! A rule is one `key -> production` pair. The key's *shape* decides how it
//! matches:
//!
//! | Shape        | Key pattern            | Example            |
//! |--------------|------------------------|--------------------|
//! | Contextual   | `^(.+)<(.)>(.+)$`      | `"AB<C>B" -> "CA"` |
//! | Parametric   | `^(.)\(([A-Za-z,]+)\)$`| `"F(a,b)" -> "F(a*.95,b/2)"` |
//! | Simple       | anything else          | `"C" -> "CC"`      |
//!
//! The contextual pattern is tested first, so a key that could read both
//! ways classifies as contextual. A key that fits neither pattern is Simple
//! and compared by exact equality against the current single symbol —
//! malformed multi-symbol keys therefore never match anything rather than
//! raising an error.
//!
//! Rules are stored in an explicit ordered list plus a key index for
//! duplicate detection. Insertion order is part of the contract: the first
//! registered rule that matches a position wins.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GrammarError;

static CONTEXTUAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new("^(.+)<(.)>(.+)$").unwrap());
static PARAMETRIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.)\(([A-Za-z,]+)\)$").unwrap());

// ─────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────

/// The shape of a rule, pre-computed from its key at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// `left < center > right` — fires only when the reduced contexts match.
    Contextual {
        left: String,
        center: char,
        right: String,
    },
    /// `name(p1,p2,…)` — fires on a `name(…)` token with matching arity.
    Parametric { name: char, params: Vec<String> },
    /// Exact single-symbol equality.
    Simple,
}

impl RuleKind {
    /// Classify a rule key. Never fails: unrecognized keys are [`Simple`].
    ///
    /// [`Simple`]: RuleKind::Simple
    pub fn classify(key: &str) -> RuleKind {
        if let Some(caps) = CONTEXTUAL_RE.captures(key) {
            if let Some(center) = caps[2].chars().next() {
                return RuleKind::Contextual {
                    left: caps[1].to_string(),
                    center,
                    right: caps[3].to_string(),
                };
            }
        }
        if let Some(caps) = PARAMETRIC_RE.captures(key) {
            if let Some(name) = caps[1].chars().next() {
                return RuleKind::Parametric {
                    name,
                    params: caps[2].split(',').map(str::to_string).collect(),
                };
            }
        }
        RuleKind::Simple
    }
}

// ─────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────

/// Order in which rules are tried at each position.
///
/// The historical engine documented "contextual, then parametric, then
/// simple" but actually enforced nothing beyond registration order, so the
/// choice is an explicit policy rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrecedencePolicy {
    /// Pure registration order, first match wins regardless of shape. Default.
    #[default]
    Insertion,
    /// Contextual rules first, then parametric, then simple; registration
    /// order within each bucket.
    Variant,
}

// ─────────────────────────────────────────────
// Rule store
// ─────────────────────────────────────────────

/// One registered production.
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub key: String,
    pub production: String,
    pub kind: RuleKind,
}

/// Ordered rule list with unique keys.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    entries: Vec<RuleEntry>,
    keys: HashSet<String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. The key is classified once, here.
    pub fn add(&mut self, key: &str, production: &str) -> Result<(), GrammarError> {
        if !self.keys.insert(key.to_string()) {
            return Err(GrammarError::DuplicateRuleKey(key.to_string()));
        }
        self.entries.push(RuleEntry {
            key: key.to_string(),
            production: production.to_string(),
            kind: RuleKind::classify(key),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rules in the order `policy` dictates.
    pub fn iter(&self, policy: PrecedencePolicy) -> Box<dyn Iterator<Item = &RuleEntry> + '_> {
        match policy {
            PrecedencePolicy::Insertion => Box::new(self.entries.iter()),
            PrecedencePolicy::Variant => Box::new(
                self.entries
                    .iter()
                    .filter(|e| matches!(e.kind, RuleKind::Contextual { .. }))
                    .chain(
                        self.entries
                            .iter()
                            .filter(|e| matches!(e.kind, RuleKind::Parametric { .. })),
                    )
                    .chain(
                        self.entries
                            .iter()
                            .filter(|e| matches!(e.kind, RuleKind::Simple)),
                    ),
            ),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contextual_key() {
        assert_eq!(
            RuleKind::classify("AB<C>B"),
            RuleKind::Contextual {
                left: "AB".into(),
                center: 'C',
                right: "B".into(),
            }
        );
    }

    #[test]
    fn contextual_left_side_is_greedy() {
        // Two '<' in the key: the left context absorbs the first one.
        assert_eq!(
            RuleKind::classify("A<B<C>D"),
            RuleKind::Contextual {
                left: "A<B".into(),
                center: 'C',
                right: "D".into(),
            }
        );
    }

    #[test]
    fn contextual_wins_over_parametric_shape() {
        assert_eq!(
            RuleKind::classify("F(a)<X>(b)"),
            RuleKind::Contextual {
                left: "F(a)".into(),
                center: 'X',
                right: "(b)".into(),
            }
        );
    }

    #[test]
    fn parametric_key() {
        assert_eq!(
            RuleKind::classify("F(a,b)"),
            RuleKind::Parametric {
                name: 'F',
                params: vec!["a".into(), "b".into()],
            }
        );
        assert_eq!(
            RuleKind::classify("A(x)"),
            RuleKind::Parametric {
                name: 'A',
                params: vec!["x".into()],
            }
        );
    }

    #[test]
    fn malformed_keys_fall_back_to_simple() {
        // Digits in the parameter list, missing context sides, multi-char
        // names: none of these classify, and as Simple they are inert.
        assert_eq!(RuleKind::classify("F(1,b)"), RuleKind::Simple);
        assert_eq!(RuleKind::classify("<C>B"), RuleKind::Simple);
        assert_eq!(RuleKind::classify("AB(x)"), RuleKind::Simple);
        assert_eq!(RuleKind::classify("A"), RuleKind::Simple);
        assert_eq!(RuleKind::classify(""), RuleKind::Simple);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut rules = RuleSet::new();
        rules.add("A", "AB").unwrap();
        let err = rules.add("A", "AC").unwrap_err();
        assert!(matches!(err, GrammarError::DuplicateRuleKey(k) if k == "A"));
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut rules = RuleSet::new();
        rules.add("B", "X").unwrap();
        rules.add("A(x)", "Y").unwrap();
        rules.add("A<B>C", "Z").unwrap();
        let keys: Vec<&str> = rules
            .iter(PrecedencePolicy::Insertion)
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(keys, ["B", "A(x)", "A<B>C"]);
    }

    #[test]
    fn variant_policy_buckets_by_shape() {
        let mut rules = RuleSet::new();
        rules.add("B", "X").unwrap();
        rules.add("A(x)", "Y").unwrap();
        rules.add("A<B>C", "Z").unwrap();
        rules.add("D", "W").unwrap();
        let keys: Vec<&str> = rules
            .iter(PrecedencePolicy::Variant)
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(keys, ["A<B>C", "A(x)", "B", "D"]);
    }
}
