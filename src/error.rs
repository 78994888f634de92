use crate::parser::EvalError;


/// Errors of compiling and rolling dice notation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The text is not a die group or pattern.
    #[error("Invalid dice pattern ('{0}')")]
    Grammar(String),

    /// A die group holds a value outside of its domain.
    #[error("{0}")]
    Validation(String),

    /// The arithmetic of a pattern was rejected or failed.
    #[error("Evaluation error - {0}")]
    Evaluation(#[from] EvalError),

    /// A score was requested past the end of a [`crate::PatternScore`].
    #[error("No score at index {index} (pattern rolled {len} dice)")]
    Index {
        /// Requested index.
        index: usize,
        /// Number of scores.
        len: usize
    }
}

impl Error {
    pub(crate) fn invalid(field: &str, value: impl std::fmt::Display) -> Self {
        Error::Validation(format!("Invalid value for {field} ('{value}')"))
    }
}
