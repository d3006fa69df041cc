//! `ramify-grammar` — L-System grammar rewriting engine for branching
//! plant structures.
//!
//! A [`Grammar`] takes an axiom and a set of production rules and rewrites
//! the string one generation at a time; the final string is a sequence of
//! drawing commands for an external 3D turtle. Rules come in three shapes:
//!
//! | Shape        | Example                    | Fires when                           |
//! |--------------|----------------------------|--------------------------------------|
//! | Simple       | `"C" -> "CC"`              | the symbol equals the key            |
//! | Contextual   | `"AB<C>B" -> "CA"`         | `C` sits between `AB` and `B` on the main stem (branches and ignored symbols stripped) |
//! | Parametric   | `"F(x)" -> "F(x*1.2)"`     | a `F(…)` token with matching arity — values substitute into the production and its arithmetic clauses evaluate |
//!
//! ## Crate structure
//!
//! | Module      | Responsibility                                        |
//! |-------------|-------------------------------------------------------|
//! | [`engine`]  | [`Grammar`] — axiom, ignore set, grow loop            |
//! | [`rules`]   | [`RuleKind`] classification + ordered [`RuleSet`]     |
//! | [`matcher`] | Per-position rule matching ([`try_match`])            |
//! | [`context`] | Bracket-aware context stripping ([`strip`])           |
//! | [`eval`]    | Arithmetic clause evaluation ([`evaluate`])           |
//! | [`symbols`] | [`Symbols`] iterator — turtle hand-off with params    |
//! | [`error`]   | [`GrammarError`]                                      |
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use ramify_grammar::Grammar;
//!
//! let mut tree = Grammar::new("FA");
//! tree.add_rule("A", "F[+A][-A]")?;
//! tree.add_rule("F(x)", "F(x*1.2)")?;
//! tree.add_rule("F", "F(.95)")?;
//! tree.add_ignore("+-");
//!
//! tree.grow_by(5)?;
//! for symbol in tree.symbols() {
//!     // hand each command + params to the turtle
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod eval;
pub mod matcher;
pub mod rules;
pub mod symbols;

// ── Engine ────────────────────────────────────────────────────────────────────
pub use engine::{Grammar, GrammarSpec, RuleDef};

// ── Rules ─────────────────────────────────────────────────────────────────────
pub use rules::{PrecedencePolicy, RuleEntry, RuleKind, RuleSet};

// ── Matching ──────────────────────────────────────────────────────────────────
pub use context::{strip, BracketPolicy};
pub use matcher::{try_match, RuleMatch};

// ── Evaluation ────────────────────────────────────────────────────────────────
pub use eval::evaluate;

// ── Turtle hand-off ───────────────────────────────────────────────────────────
pub use symbols::{Symbol, Symbols};

// ── Errors ────────────────────────────────────────────────────────────────────
pub use error::GrammarError;
