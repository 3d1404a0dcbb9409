//! This module contains the alphabet symbols carried by automaton transitions.
//! A symbol denotes a set of code points backed by an [IntervalSet]; the
//! distinguished epsilon symbol is not a variant here but the `None` case of
//! a transition's optional symbol, so the set combinators never have to deal
//! with a non-consuming symbol.

use crate::intervals::{Interval, IntervalSet, SetSplit};

/// A symbol on a transition: an arbitrary set of code points and ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Symbol {
    set: IntervalSet,
}

/// The three-way partition of two symbols' underlying sets, as produced by
/// [Symbol::fragment]. Any part may be empty; check with
/// [Symbol::represents_something].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolFragments {
    /// The part of the first symbol the second does not cover.
    pub first_exclusive: Symbol,
    /// The part both symbols cover.
    pub shared: Symbol,
    /// The part of the second symbol the first does not cover.
    pub second_exclusive: Symbol,
}

impl Symbol {
    /// A symbol denoting exactly one code point.
    pub fn single(code: u32) -> Self {
        let mut set = IntervalSet::new();
        set.add_code(code);
        Symbol { set }
    }

    /// A symbol denoting nothing, e.g. the empty bracket class `[]`.
    pub fn empty() -> Self {
        Symbol::default()
    }

    /// A symbol denoting every code point of the universe.
    pub fn any() -> Self {
        Symbol {
            set: IntervalSet::universe(),
        }
    }

    /// A symbol over the given interval set.
    pub fn from_set(set: IntervalSet) -> Self {
        Symbol { set }
    }

    /// Add a single code point to the symbol's set.
    pub fn add_code(&mut self, code: u32) {
        self.set.add_code(code);
    }

    /// Add a range of code points to the symbol's set.
    pub fn add_interval(&mut self, interval: Interval) {
        self.set.add(interval);
    }

    /// Returns true if the symbol's set contains the given code point.
    pub fn contains(&self, code: u32) -> bool {
        self.set.contains(code)
    }

    /// Returns true if the symbol denotes exactly this single code point and
    /// nothing else.
    pub fn contains_only(&self, code: u32) -> bool {
        self.set.cardinality() == 1 && self.set.contains(code)
    }

    /// Returns true if the symbol denotes at least one code point.
    pub fn represents_something(&self) -> bool {
        !self.set.is_empty()
    }

    /// Read access to the underlying intervals, used by code generators to
    /// emit range comparisons.
    pub fn intervals(&self) -> &[Interval] {
        self.set.intervals()
    }

    /// Partition two symbols into the parts exclusive to each and the part
    /// they share. This is the operator that fragments intervals belonging to
    /// different transitions into maximal alphabet cells with identical
    /// behavior.
    pub fn fragment(first: &Symbol, second: &Symbol) -> SymbolFragments {
        let SetSplit {
            left_difference,
            intersection,
            right_difference,
        } = first.set.calculate_differences_and_intersection(&second.set);
        SymbolFragments {
            first_exclusive: Symbol::from_set(left_difference),
            shared: Symbol::from_set(intersection),
            second_exclusive: Symbol::from_set(right_difference),
        }
    }

    /// The union of two symbols.
    pub fn merge(first: &Symbol, second: &Symbol) -> Symbol {
        Symbol::from_set(first.set.calculate_union(&second.set))
    }

    /// The complement of a symbol within the universe.
    pub fn negate(symbol: &Symbol) -> Symbol {
        Symbol::from_set(symbol.set.calculate_negation())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Render short symbols as readable characters, anything else as raw
        // interval bounds.
        let intervals = self.set.intervals();
        if intervals.is_empty() {
            return write!(f, "∅");
        }
        write!(f, "[")?;
        for iv in intervals {
            match (char::from_u32(iv.start()), char::from_u32(iv.end() - 1)) {
                (Some(a), Some(_)) if iv.len() == 1 && !a.is_control() => {
                    write!(f, "{}", a.escape_debug())?
                }
                (Some(a), Some(b)) if !a.is_control() && !b.is_control() => {
                    write!(f, "{}-{}", a.escape_debug(), b.escape_debug())?
                }
                _ => write!(f, "\\u{{{:x}}}-\\u{{{:x}}}", iv.start(), iv.end())?,
            }
        }
        write!(f, "]")
    }
}
