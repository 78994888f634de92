/// Errors of lexing, parsing and evaluating an arithmetic expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("At position {0} - {1}")]
    AtPosition(usize, Box<EvalError>),

    #[error("Invalid token: {0}")]
    Token(char),

    #[error("Invalid number: {0}")]
    Number(String),

    #[error("Name '{0}' is not allowed")]
    UnknownName(String),

    #[error("Expression is empty")]
    Empty,

    #[error("Parenthesis was not closed")]
    UnclosedParenthesis,

    #[error("Unexpected prefix: {0}")]
    UnexpectedPrefix(String),

    #[error("Unexpected infix: {0}")]
    UnexpectedInfix(String),

    #[error("Unexpected trailing input: {0}")]
    Trailing(String),

    #[error("Function {function}() expects {expected} argument(s), got {got}")]
    Arity {
        function: &'static str,
        expected: &'static str,
        got: usize
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Integer overflow")]
    Overflow,

    #[error("Result is not a finite number")]
    NonFinite,

    #[error("Expression is nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("Placeholder {{{0}}} has no score to substitute")]
    UnboundPlaceholder(usize),
}

impl EvalError {
    /// The underlying error, without position.
    pub fn err(&self) -> &Self {
        match self {
            EvalError::AtPosition(_, err) => err.as_ref(),
            other => other
        }
    }

    /// Character position of the failure, if known.
    pub fn pos(&self) -> Option<&usize> {
        match self {
            EvalError::AtPosition(position, _) => Some(position),
            _ => None
        }
    }

    /// Attaches `position` unless the error already carries one.
    pub fn at_pos(self, position: usize) -> Self {
        match self {
            EvalError::AtPosition(_, _) => self,
            other => EvalError::AtPosition(position, Box::new(other))
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
