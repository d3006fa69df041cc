//! [`Grammar`] — the derivation engine.
//!
//! A grammar owns an axiom, an ordered rule set, the ignore set used for
//! context stripping, and the current derived string. Each [`Grammar::grow`]
//! call rewrites the whole string once, left to right:
//!
//! 1. On the very first growth, reset a stale current string to the axiom.
//! 2. Scan with a cursor; at each position ask the matcher for the first
//!    applicable rule; append its production (or the identity symbol) to an
//!    output buffer; advance by the symbols consumed.
//! 3. Swap the buffer in and bump the generation counter — both happen only
//!    on success, so a failed step leaves the previous generation intact
//!    and readers never observe a partially-rewritten string.
//!
//! Derivation is a pure function of (current string, rules, ignore set,
//! policies): identical inputs always produce identical output. Nothing
//! bounds generation count or string length — exponential rules grow
//! exponentially, and the caller picks the iteration count. A caller that
//! wants a timeout checks elapsed time between `grow()` calls; a single
//! call runs to completion.
//!
//! One instance per plant: the engine is single-threaded and concurrent
//! `grow()` calls on a shared instance must be serialized by the caller.

use serde::{Deserialize, Serialize};

use crate::context::BracketPolicy;
use crate::error::GrammarError;
use crate::matcher::try_match;
use crate::rules::{PrecedencePolicy, RuleSet};
use crate::symbols::Symbols;

// ─────────────────────────────────────────────
// Grammar
// ─────────────────────────────────────────────

/// An L-System: axiom, rules, ignore set, and the current derived string.
#[derive(Debug, Clone)]
pub struct Grammar {
    /// Symbols excluded from context comparison (typically drawing
    /// commands irrelevant to branching structure). Additive, no dedup.
    pub ignore: String,
    /// Order in which rules are tried at each position.
    pub precedence: PrecedencePolicy,
    /// Unbalanced-`]` handling during context stripping.
    pub brackets: BracketPolicy,

    axiom: String,
    rules: RuleSet,
    generation: u32,
    current: String,
}

impl Grammar {
    /// A grammar seeded with `axiom` and no rules.
    pub fn new(axiom: &str) -> Self {
        Self {
            ignore: String::new(),
            precedence: PrecedencePolicy::default(),
            brackets: BracketPolicy::default(),
            axiom: axiom.to_string(),
            rules: RuleSet::new(),
            generation: 0,
            current: axiom.to_string(),
        }
    }

    /// Build a grammar from a declarative [`GrammarSpec`].
    ///
    /// Fails with [`GrammarError::DuplicateRuleKey`] when the spec's rule
    /// list repeats a key.
    pub fn from_spec(spec: GrammarSpec) -> Result<Self, GrammarError> {
        let mut grammar = Self::new(&spec.axiom);
        grammar.ignore = spec.ignore;
        grammar.precedence = spec.precedence;
        grammar.brackets = spec.brackets;
        for rule in &spec.rules {
            grammar.add_rule(&rule.key, &rule.production)?;
        }
        Ok(grammar)
    }

    /// Build a grammar from a JSON-encoded [`GrammarSpec`].
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        Self::from_spec(serde_json::from_str(json)?)
    }

    /// Replace the axiom. Silent no-op once the grammar has grown — the
    /// seed of an already-derived plant is immutable by contract.
    pub fn set_axiom(&mut self, axiom: &str) {
        if self.generation == 0 {
            self.axiom = axiom.to_string();
        }
    }

    /// Extend the ignore set. Takes effect for all future [`grow`] calls.
    ///
    /// [`grow`]: Grammar::grow
    pub fn add_ignore(&mut self, symbols: &str) {
        self.ignore.push_str(symbols);
    }

    /// Register a rule. Rules may be added before or after growth begins.
    pub fn add_rule(&mut self, key: &str, production: &str) -> Result<(), GrammarError> {
        self.rules.add(key, production)
    }

    /// The current generation's derived string (the axiom before any
    /// growth).
    pub fn current(&self) -> &str {
        if self.generation == 0 {
            &self.axiom
        } else {
            &self.current
        }
    }

    /// Completed derivation passes.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Iterate the current string symbol-by-symbol with numeric parameter
    /// values attached — the hand-off surface for a turtle interpreter.
    pub fn symbols(&self) -> Symbols {
        Symbols::new(self.current())
    }

    /// Advance one generation.
    ///
    /// On [`GrammarError::InvalidExpression`] the step is aborted: the
    /// current string and generation counter are left untouched.
    pub fn grow(&mut self) -> Result<(), GrammarError> {
        if self.generation == 0 && self.current != self.axiom {
            self.current = self.axiom.clone();
        }

        let symbols: Vec<char> = self.current.chars().collect();
        let mut next = String::with_capacity(self.current.len() * 2);
        let mut cursor = 0;

        while cursor < symbols.len() {
            match try_match(
                &symbols,
                cursor,
                &self.rules,
                &self.ignore,
                self.precedence,
                self.brackets,
            )? {
                Some(hit) => {
                    next.push_str(&hit.production);
                    cursor += hit.consumed;
                }
                None => {
                    next.push(symbols[cursor]);
                    cursor += 1;
                }
            }
        }

        self.current = next;
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            symbols = self.current.chars().count(),
            "derived next generation"
        );
        Ok(())
    }

    /// Run [`grow`] `n` times.
    ///
    /// [`grow`]: Grammar::grow
    pub fn grow_by(&mut self, n: u32) -> Result<(), GrammarError> {
        for _ in 0..n {
            self.grow()?;
        }
        Ok(())
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new("")
    }
}

// ─────────────────────────────────────────────
// Declarative definition
// ─────────────────────────────────────────────

/// A whole grammar as data: axiom, ignore set, ordered rules, policies.
///
/// ```json
/// {
///   "axiom": "FA",
///   "ignore": "+-",
///   "rules": [{ "key": "A", "production": "F[+A][-A]" }],
///   "brackets": "Keep"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrammarSpec {
    pub axiom: String,
    #[serde(default)]
    pub ignore: String,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
    #[serde(default)]
    pub precedence: PrecedencePolicy,
    #[serde(default)]
    pub brackets: BracketPolicy,
}

/// One `key -> production` pair of a [`GrammarSpec`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    pub key: String,
    pub production: String,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rules_is_identity() {
        let mut g = Grammar::new("XY");
        g.grow().unwrap();
        assert_eq!(g.current(), "XY");
        assert_eq!(g.generation(), 1);
    }

    #[test]
    fn fixed_point_after_one_generation() {
        let mut g = Grammar::new("XY[Z]");
        for generation in 1..=4 {
            g.grow().unwrap();
            assert_eq!(g.current(), "XY[Z]");
            assert_eq!(g.generation(), generation);
        }
    }

    #[test]
    fn simple_substitution() {
        let mut g = Grammar::new("A");
        g.add_rule("A", "AB").unwrap();
        g.grow().unwrap();
        assert_eq!(g.current(), "AB");
        g.grow().unwrap();
        assert_eq!(g.current(), "ABB");
    }

    #[test]
    fn context_sensitive_rewrite() {
        let mut g = Grammar::new("ABCBACA");
        g.add_rule("AB<C>B", "CA").unwrap();
        g.grow().unwrap();
        assert_eq!(g.current(), "ABCABACA");
    }

    #[test]
    fn context_matching_ignores_listed_symbols() {
        let mut g = Grammar::new("A+B-C");
        g.add_rule("A<B>C", "Q").unwrap();
        g.add_ignore("+-");
        g.grow().unwrap();
        assert_eq!(g.current(), "A+Q-C");
    }

    #[test]
    fn parametric_rewrite() {
        let mut g = Grammar::new("A(3)");
        g.add_rule("A(x)", "A(x*2)").unwrap();
        g.grow().unwrap();
        assert_eq!(g.current(), "A(6)");
        g.grow().unwrap();
        assert_eq!(g.current(), "A(12)");
    }

    #[test]
    fn arity_mismatch_copies_token_symbol_by_symbol() {
        let mut g = Grammar::new("F(1)");
        g.add_rule("F(a,b)", "X").unwrap();
        g.grow().unwrap();
        assert_eq!(g.current(), "F(1)");
        assert_eq!(g.generation(), 1);
    }

    #[test]
    fn determinism() {
        let build = || {
            let mut g = Grammar::new("FA");
            g.add_rule("A", "F[+A][-A]").unwrap();
            g.add_rule("F(x)", "F(x*1.2)").unwrap();
            g.add_rule("F", "F(.95)").unwrap();
            g.add_ignore("+-");
            g
        };
        let mut a = build();
        let mut b = build();
        a.grow_by(6).unwrap();
        b.grow_by(6).unwrap();
        assert_eq!(a.current(), b.current());
        assert_eq!(a.generation(), 6);
    }

    #[test]
    fn axiom_is_immutable_after_first_growth() {
        let mut g = Grammar::new("A");
        g.set_axiom("B");
        assert_eq!(g.current(), "B");
        g.grow().unwrap();
        g.set_axiom("C");
        assert_eq!(g.current(), "B");
        assert_eq!(g.generation(), 1);
    }

    #[test]
    fn rules_can_be_added_after_growth() {
        let mut g = Grammar::new("A");
        g.grow().unwrap();
        assert_eq!(g.current(), "A");
        g.add_rule("A", "AB").unwrap();
        g.grow().unwrap();
        assert_eq!(g.current(), "AB");
    }

    #[test]
    fn failed_step_leaves_state_untouched() {
        let mut g = Grammar::new("A(3)");
        // `q` is never substituted, so the clause cannot evaluate.
        g.add_rule("A(x)", "A(q*2)").unwrap();
        let err = g.grow().unwrap_err();
        assert!(matches!(err, GrammarError::InvalidExpression { .. }));
        assert_eq!(g.current(), "A(3)");
        assert_eq!(g.generation(), 0);
    }

    #[test]
    fn duplicate_rule_key_surfaces() {
        let mut g = Grammar::new("A");
        g.add_rule("A", "AB").unwrap();
        assert!(matches!(
            g.add_rule("A", "AC"),
            Err(GrammarError::DuplicateRuleKey(_))
        ));
    }

    #[test]
    fn from_json_spec() {
        let mut g = Grammar::from_json(
            r#"{
                "axiom": "A(3)",
                "rules": [
                    { "key": "A(x)", "production": "A(x*2)B" },
                    { "key": "B", "production": "BB" }
                ]
            }"#,
        )
        .unwrap();
        g.grow_by(2).unwrap();
        assert_eq!(g.current(), "A(12)BBB");
    }

    #[test]
    fn from_spec_rejects_duplicate_keys() {
        let spec = GrammarSpec {
            axiom: "A".into(),
            rules: vec![
                RuleDef {
                    key: "A".into(),
                    production: "AB".into(),
                },
                RuleDef {
                    key: "A".into(),
                    production: "AC".into(),
                },
            ],
            ..GrammarSpec::default()
        };
        assert!(matches!(
            Grammar::from_spec(spec),
            Err(GrammarError::DuplicateRuleKey(_))
        ));
    }

    #[test]
    fn branching_plant_grammar_derives() {
        // The six-rule tree this engine was grown for. Its "^^^<L>]" rule
        // needs the Keep policy to see the branch-closing bracket.
        let mut g = Grammar::new("FA");
        g.brackets = BracketPolicy::Keep;
        g.add_rule("A", "![&FA!![^L]]/'[&FA!![^L]]/'[&FA!![^L]]")
            .unwrap();
        g.add_rule("F(x)", "F(x*1.2)").unwrap();
        g.add_rule("F", "F(.95)/S").unwrap();
        g.add_rule("^^^<L>]", "q").unwrap();
        g.add_rule("S", "F[^L]").unwrap();
        g.add_rule("L", "^^L").unwrap();

        g.grow().unwrap();
        assert_eq!(
            g.current(),
            "F(.95)/S![&FA!![^L]]/'[&FA!![^L]]/'[&FA!![^L]]"
        );

        g.grow_by(4).unwrap();
        assert_eq!(g.generation(), 5);
        // Parameterized stems keep compounding: x*1.2 applied each pass.
        assert!(g.current().contains("F(1.14)"));
        // Leaves three generations deep have pitched ^^^ and been pruned
        // into q by the contextual rule.
        assert!(g.current().contains('q'));
    }
}
