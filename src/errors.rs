use thiserror::Error;

/// The result type for the `redfa` crate.
pub type Result<T> = std::result::Result<T, RedfaError>;

/// The error type for the `redfa` crate.
#[derive(Error, Debug)]
pub struct RedfaError {
    /// The source of the error.
    pub source: Box<RedfaErrorKind>,
}

impl RedfaError {
    /// Create a new `RedfaError`.
    pub fn new(kind: RedfaErrorKind) -> Self {
        RedfaError {
            source: Box::new(kind),
        }
    }
}

impl std::fmt::Display for RedfaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum RedfaErrorKind {
    /// The regex source text is malformed. Carries the code point position at
    /// which parsing stopped together with an expected-vs-found description.
    #[error("syntax error at position {position}: expected {expected}, found {found}")]
    SyntaxError {
        /// Zero-based code point index into the pattern.
        position: usize,
        /// What the parser was prepared to accept at this position.
        expected: String,
        /// What it actually saw, or "end of input".
        found: String,
    },

    /// Merging tagged machines produced a final state that cannot be
    /// attributed to exactly one source machine.
    #[error("non-disjunctive final states: state {0} is final but carries no machine id")]
    NonDisjunctiveFinalStates(u32),
}

impl From<RedfaErrorKind> for RedfaError {
    fn from(kind: RedfaErrorKind) -> Self {
        RedfaError::new(kind)
    }
}
