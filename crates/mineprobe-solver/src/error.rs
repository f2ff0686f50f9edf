use mineprobe_core::BoardError;

/// Errors that can occur while solving a position.
///
/// Running out of search budget is not an error: the enumeration and
/// decision-tree phases simply give up and the solver falls back to a
/// cheaper heuristic.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum SolveError {
    /// The request or board is malformed.
    #[display("{_0}")]
    InvalidInput(#[from] BoardError),
    /// The position admits no consistent marker layout.
    #[display("{_0}")]
    Inconsistent(#[from] InconsistencyKind),
    /// Exact arithmetic was asked for something outside its domain.
    #[display("{_0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl SolveError {
    /// Returns the error class reported at the request boundary.
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InputValidationError",
            Self::Inconsistent(_) => "LogicalInconsistency",
            Self::Arithmetic(_) => "ArithmeticDomainError",
        }
    }
}

/// Ways a position can be logically inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InconsistencyKind {
    /// A clue needs more markers than it has covered neighbours, or fewer
    /// than the markers already confirmed around it.
    #[display("clue at ({x},{y}) needs {needed} more markers but has {available} covered neighbours")]
    UnsatisfiableClue {
        /// Column of the clue.
        x: usize,
        /// Row of the clue.
        y: usize,
        /// Markers still required (negative when too many are confirmed).
        needed: i64,
        /// Covered, unconfirmed neighbours.
        available: usize,
    },
    /// More markers are confirmed than the board holds.
    #[display("{confirmed} markers are confirmed but the board only has {total}")]
    TooManyConfirmed {
        /// Confirmed markers.
        confirmed: usize,
        /// Markers on the board.
        total: usize,
    },
    /// More markers remain than covered tiles to hold them.
    #[display("{left} markers remain but only {covered} tiles are covered")]
    NotEnoughRoom {
        /// Markers still to be found.
        left: usize,
        /// Covered, unconfirmed tiles.
        covered: usize,
    },
    /// Constraint propagation found no consistent assignment.
    #[display("position is not logically consistent")]
    NoSolutions,
}

/// Exact arithmetic domain violations.
///
/// These indicate an internal invariant was broken rather than bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ArithmeticError {
    /// `C(k, n)` was requested with `n` outside `1..=max` or `k > n`.
    #[display("binomial C({k}, {n}) is outside the supported domain (max {max})")]
    BinomialDomain {
        /// Items chosen.
        k: usize,
        /// Items to choose from.
        n: usize,
        /// Largest supported `n`.
        max: usize,
    },
    /// The prime-power loop of the factorization failed to terminate.
    #[display("binomial factorization does not terminate for prime {prime}")]
    FactorizationRunaway {
        /// The prime being processed.
        prime: usize,
    },
    /// A primality query fell outside the sieve.
    #[display("prime check for {n} is outside the sieve range 2..={max}")]
    PrimeOutOfRange {
        /// Queried number.
        n: usize,
        /// Sieve limit.
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_and_message() {
        let err = SolveError::from(InconsistencyKind::NoSolutions);
        assert_eq!(err.class(), "LogicalInconsistency");
        assert_eq!(err.to_string(), "position is not logically consistent");

        let err = SolveError::from(BoardError::CoordinateOutOfRange { x: 9, y: -1 });
        assert!(err.is_invalid_input());
        assert_eq!(err.class(), "InputValidationError");

        let err = SolveError::from(ArithmeticError::FactorizationRunaway { prime: 7 });
        assert_eq!(err.class(), "ArithmeticDomainError");
    }
}
