#![forbid(missing_docs)]
//! # `redfa`
//! The `redfa` crate is the regular-expression-to-automaton engine of a small
//! grammar compiler. It parses a tiny regex dialect into a non-deterministic
//! finite automaton via Thompson construction, determinizes the automaton
//! with the subset construction over an interval-based alphabet, and merges
//! several independently tagged deterministic machines into one multi-pattern
//! scanner that remembers which original pattern matched. Transitions carry
//! sets of code point ranges instead of single characters, so the full
//! 32-bit code point space never needs per-character transitions.
//!
//! The engine is a pure, single-threaded library: it consumes a pattern as a
//! character stream plus a [Context] and exposes the resulting deterministic
//! state graph for scanning and for downstream code generation. Grammar file
//! parsing, intermediate code generation and source emission live in the
//! surrounding pipeline, not here.
//!
//! # Example
//! ```rust
//! use redfa::{merge, Context, MachineId, RegularExpression};
//!
//! let mut context = Context::new();
//! let keyword = RegularExpression::new("for", &mut context)
//!     .generate()
//!     .expect("valid pattern");
//! let identifier = RegularExpression::new("[a-z]+", &mut context)
//!     .generate()
//!     .expect("valid pattern");
//!
//! // Tag each machine's final states, then merge them into one scanner.
//! context.tag_machine(keyword, MachineId::new(0));
//! context.tag_machine(identifier, MachineId::new(1));
//! let scanner = merge(&mut context, &[keyword, identifier]).expect("disjoint machines");
//!
//! // Longest match, optionally restricted to one source machine.
//! assert_eq!(
//!     context.longest_match(scanner, "forall", Some(MachineId::new(1))),
//!     Some("forall")
//! );
//! assert_eq!(
//!     context.longest_match(scanner, "forall", Some(MachineId::new(0))),
//!     Some("for")
//! );
//! ```

/// Module with the automaton graph: states, transitions and the context that
/// owns them.
mod automaton;
pub use automaton::{Context, State, Transition};

/// Module with the subset construction and the multi-pattern merge.
mod determinizer;
pub use determinizer::{determinize, merge};

/// Module with error definitions.
mod errors;
pub use errors::{RedfaError, RedfaErrorKind, Result};

/// Module with the id types of the engine.
mod ids;
pub use ids::{MachineId, MachineIdBase, StateId, StateIdBase};

/// Module with the interval arithmetic underlying the alphabet.
mod intervals;
pub use intervals::{Interval, IntervalSet, SetSplit, UNIVERSE_END, UNIVERSE_START};

/// Module with the regex syntax parser and Thompson construction.
mod parser;
pub use parser::RegularExpression;

/// Module with the alphabet symbols carried by transitions.
mod symbol;
pub use symbol::{Symbol, SymbolFragments};

/// Module with conversion to graphviz dot format.
#[cfg(test)]
mod dot;
