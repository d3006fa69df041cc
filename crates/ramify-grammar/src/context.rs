//! Context stripping — reduce a substring to the "main stem" history that
//! context-sensitive rules compare against.
//!
//! ## Algorithm
//! 1. Drop every symbol present in the ignore set, preserving the relative
//!    order of the rest.
//! 2. Scan left to right with a stack of rollback points: `[` pushes the
//!    current output length; `]` truncates the output back to the popped
//!    length, discarding the whole bracketed span including nested brackets.
//!
//! A branching string like `"ABC[DE][SG[HI[JK]L]MNO]"` reduces so that a
//! rule such as `"BC<S>G"` can still see `S`'s structural predecessors —
//! the `[DE]` side shoot is not part of `S`'s ancestry and disappears.
//!
//! An unmatched `[` leaves its rollback point unpopped, so the interior
//! stays in the output: a symbol inside a still-open branch sees its own
//! branch prefix as ancestry.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Policy
// ─────────────────────────────────────────────

/// What to do with a `]` that closes no `[` while stripping.
///
/// The two historical implementations of the stripper disagree here, so the
/// choice is explicit. `Drop` keeps the reduced string well-formed with
/// respect to brackets. `Keep` lets a rule's right context match the `]`
/// that ends the branch the symbol sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BracketPolicy {
    /// Discard the unmatched `]` silently. Default.
    #[default]
    Drop,
    /// Append the unmatched `]` to the reduced string literally.
    Keep,
}

// ─────────────────────────────────────────────
// Stripping
// ─────────────────────────────────────────────

/// Reduce `symbols` for context comparison: remove ignored symbols, then
/// remove every fully-bracketed span.
pub fn strip(symbols: &[char], ignore: &str, policy: BracketPolicy) -> String {
    let mut output = String::with_capacity(symbols.len());
    let mut rollback: Vec<usize> = Vec::new();

    for &c in symbols.iter().filter(|c| !ignore.contains(**c)) {
        match c {
            '[' => rollback.push(output.len()),
            ']' => match rollback.pop() {
                Some(len) => output.truncate(len),
                None if policy == BracketPolicy::Keep => output.push(']'),
                None => {}
            },
            _ => output.push(c),
        }
    }
    output
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
