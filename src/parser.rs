//! This module contains the regex syntax parser and the Thompson
//! construction. The parser is a recursive descent parser with one code point
//! of lookahead over the grammar
//!
//! ```text
//! alternation   := concatenation ('|' concatenation)*
//! concatenation := quantifier*
//! quantifier    := block ('?' | '*' | '+')?
//! block         := '(' alternation ')' | '[' class ']' | atom
//! atom          := letter | digit | '_' | escape-sequence | '.'
//! ```
//!
//! Every production returns a [StateMachine] fragment built from fresh states
//! of the context. [RegularExpression::generate] parses a full alternation,
//! marks its final state and determinizes the result in place, so callers
//! only ever see a deterministic automaton.

use log::trace;

use crate::{
    automaton::Context,
    determinizer::determinize,
    errors::{RedfaErrorKind, Result},
    ids::StateId,
    intervals::Interval,
    symbol::Symbol,
};

/// An immutable sub-automaton fragment with one entry and one exit state,
/// produced transiently while parsing one regex construct.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StateMachine {
    pub(crate) start: StateId,
    pub(crate) end: StateId,
}

/// A single regex pattern under compilation. Borrows the [Context] the
/// automaton is built in; several patterns intended for one merge must share
/// a context.
pub struct RegularExpression<'c> {
    chars: Vec<char>,
    position: usize,
    context: &'c mut Context,
}

impl<'c> RegularExpression<'c> {
    /// Create a parser for the given pattern over the given context.
    pub fn new(pattern: &str, context: &'c mut Context) -> Self {
        RegularExpression {
            chars: pattern.chars().collect(),
            position: 0,
            context,
        }
    }

    /// Parse the pattern, mark its final state and determinize the automaton.
    /// Returns the initial state of the resulting deterministic automaton.
    pub fn generate(mut self) -> Result<StateId> {
        trace!("generate automaton for {:?}", self.chars.iter().collect::<String>());
        let machine = self.parse_alternation()?;
        if let Some(found) = self.peek() {
            // Trailing input, e.g. an unbalanced ')'.
            return Err(self.syntax_error("end of pattern", Some(found)));
        }
        self.context.state_mut(machine.end).set_final();
        determinize(self.context, machine.start);
        Ok(machine.start)
    }

    /// Convenience for compiling a single pattern into a fresh context.
    pub fn compile(pattern: &str) -> Result<(Context, StateId)> {
        let mut context = Context::new();
        let start = RegularExpression::new(pattern, &mut context).generate()?;
        Ok((context, start))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.position += 1;
                Ok(())
            }
            found => Err(self.syntax_error(&format!("'{}'", expected), found)),
        }
    }

    fn syntax_error(&self, expected: &str, found: Option<char>) -> crate::RedfaError {
        RedfaErrorKind::SyntaxError {
            position: self.position,
            expected: expected.to_string(),
            found: found.map_or_else(|| "end of input".to_string(), |c| format!("'{}'", c)),
        }
        .into()
    }

    // alternation := concatenation ('|' concatenation)*
    fn parse_alternation(&mut self) -> Result<StateMachine> {
        let mut branches = vec![self.parse_concatenation()?];
        while self.peek() == Some('|') {
            self.bump();
            branches.push(self.parse_concatenation()?);
        }
        let start = self.context.new_state();
        let end = self.context.new_state();
        for branch in branches {
            self.context.add_epsilon_transition(start, branch.start);
            self.context.add_epsilon_transition(branch.end, end);
        }
        Ok(StateMachine { start, end })
    }

    // concatenation := quantifier*
    //
    // The fragments are chained with epsilon transitions through a shared
    // entry/exit pair. An empty concatenation (as in the empty group `()`)
    // still connects entry to exit directly.
    fn parse_concatenation(&mut self) -> Result<StateMachine> {
        let start = self.context.new_state();
        let mut tail = start;
        while let Some(ch) = self.peek() {
            if ch == '|' || ch == ')' {
                break;
            }
            let fragment = self.parse_quantifier()?;
            self.context.add_epsilon_transition(tail, fragment.start);
            tail = fragment.end;
        }
        let end = self.context.new_state();
        self.context.add_epsilon_transition(tail, end);
        Ok(StateMachine { start, end })
    }

    // quantifier := block ('?' | '*' | '+')?
    fn parse_quantifier(&mut self) -> Result<StateMachine> {
        let fragment = self.parse_block()?;
        match self.peek() {
            Some('?') => {
                self.bump();
                Ok(self.zero_or_one(fragment))
            }
            Some('*') => {
                self.bump();
                Ok(self.zero_or_more(fragment))
            }
            Some('+') => {
                self.bump();
                Ok(self.one_or_more(fragment))
            }
            _ => Ok(fragment),
        }
    }

    // block := '(' alternation ')' | '[' class ']' | atom
    fn parse_block(&mut self) -> Result<StateMachine> {
        match self.peek() {
            Some('(') => {
                self.bump();
                let machine = self.parse_alternation()?;
                self.expect(')')?;
                Ok(machine)
            }
            Some('[') => {
                self.bump();
                let symbol = self.parse_bracket_class()?;
                self.expect(']')?;
                Ok(self.atom(symbol))
            }
            _ => self.parse_atom(),
        }
    }

    // atom := letter | digit | '_' | escape-sequence | '.'
    fn parse_atom(&mut self) -> Result<StateMachine> {
        match self.peek() {
            Some('.') => {
                self.bump();
                Ok(self.atom(Symbol::any()))
            }
            Some('\\') => {
                self.bump();
                let symbol = self.parse_escape()?;
                Ok(self.atom(symbol))
            }
            Some(ch) if is_literal(ch) => {
                self.bump();
                Ok(self.atom(Symbol::single(ch as u32)))
            }
            found => Err(self.syntax_error("an atom, '(' or '['", found)),
        }
    }

    // escape-sequence := 'd' | 'w' | 's' | 'n' | 'r' | 't' | any other
    // character taken literally (metacharacter escapes like `\.` or `\\`)
    fn parse_escape(&mut self) -> Result<Symbol> {
        match self.bump() {
            Some('d') => Ok(digit_symbol()),
            Some('w') => Ok(word_symbol()),
            Some('s') => Ok(whitespace_symbol()),
            Some('n') => Ok(Symbol::single('\n' as u32)),
            Some('r') => Ok(Symbol::single('\r' as u32)),
            Some('t') => Ok(Symbol::single('\t' as u32)),
            Some(ch) => Ok(Symbol::single(ch as u32)),
            None => Err(self.syntax_error("an escaped character", None)),
        }
    }

    // class := '^'? (class-char | class-char '-' class-char)*
    //
    // A leading '^' negates the accumulated symbol. An empty class `[]`
    // represents nothing.
    fn parse_bracket_class(&mut self) -> Result<Symbol> {
        let negated = if self.peek() == Some('^') {
            self.bump();
            true
        } else {
            false
        };
        let mut symbol = Symbol::empty();
        loop {
            match self.peek() {
                None | Some(']') => break,
                _ => {}
            }
            let low = self.parse_class_char()?;
            if self.peek() == Some('-') {
                self.bump();
                match self.peek() {
                    None | Some(']') => {
                        // An incomplete range like `a-` has no end character.
                        let found = self.peek();
                        return Err(self.syntax_error("the end of a character range", found));
                    }
                    _ => {}
                }
                let high = self.parse_class_char()?;
                if high < low {
                    return Err(self.syntax_error(
                        &format!("a range end not lower than '{}'", low),
                        Some(high),
                    ));
                }
                symbol.add_interval(Interval::new(low as u32, high as u32 + 1));
            } else {
                symbol.add_code(low as u32);
            }
        }
        if negated {
            Ok(Symbol::negate(&symbol))
        } else {
            Ok(symbol)
        }
    }

    fn parse_class_char(&mut self) -> Result<char> {
        match self.peek() {
            Some('\\') => {
                self.bump();
                match self.bump() {
                    Some('n') => Ok('\n'),
                    Some('r') => Ok('\r'),
                    Some('t') => Ok('\t'),
                    Some(ch) => Ok(ch),
                    None => Err(self.syntax_error("an escaped character", None)),
                }
            }
            Some(ch) if is_literal(ch) => {
                self.bump();
                Ok(ch)
            }
            found => Err(self.syntax_error("a letter, digit or '_'", found)),
        }
    }

    /// Two new states joined by one symbol transition.
    fn atom(&mut self, symbol: Symbol) -> StateMachine {
        let start = self.context.new_state();
        let end = self.context.new_state();
        self.context.add_transition(start, symbol, end);
        StateMachine { start, end }
    }

    /// `?`: a skip path beside the fragment.
    fn zero_or_one(&mut self, fragment: StateMachine) -> StateMachine {
        let start = self.context.new_state();
        let end = self.context.new_state();
        self.context.add_epsilon_transition(start, fragment.start);
        self.context.add_epsilon_transition(start, end);
        self.context.add_epsilon_transition(fragment.end, end);
        StateMachine { start, end }
    }

    /// `*`: a loop back to the entry plus a zero-iteration path.
    fn zero_or_more(&mut self, fragment: StateMachine) -> StateMachine {
        let start = self.context.new_state();
        let end = self.context.new_state();
        self.context.add_epsilon_transition(start, fragment.start);
        self.context.add_epsilon_transition(fragment.end, start);
        self.context.add_epsilon_transition(start, end);
        StateMachine { start, end }
    }

    /// `+`: the fragment once, then a repeat edge back to its entry.
    fn one_or_more(&mut self, fragment: StateMachine) -> StateMachine {
        let start = self.context.new_state();
        let end = self.context.new_state();
        self.context.add_epsilon_transition(start, fragment.start);
        self.context.add_epsilon_transition(fragment.end, fragment.start);
        self.context.add_epsilon_transition(fragment.end, end);
        StateMachine { start, end }
    }
}

fn is_literal(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn digit_symbol() -> Symbol {
    let mut symbol = Symbol::empty();
    symbol.add_interval(Interval::new('0' as u32, '9' as u32 + 1));
    symbol
}

fn word_symbol() -> Symbol {
    let mut symbol = Symbol::empty();
    symbol.add_interval(Interval::new('a' as u32, 'z' as u32 + 1));
    symbol.add_interval(Interval::new('A' as u32, 'Z' as u32 + 1));
    symbol.add_interval(Interval::new('0' as u32, '9' as u32 + 1));
    symbol.add_code('_' as u32);
    symbol
}

fn whitespace_symbol() -> Symbol {
    let mut symbol = Symbol::empty();
    for ch in [' ', '\t', '\n', '\r', '\x0b', '\x0c'] {
        symbol.add_code(ch as u32);
    }
    symbol
}
