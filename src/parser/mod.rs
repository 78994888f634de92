mod error;
mod lexer;
mod expr;
mod parse;

#[cfg(test)]
pub(crate) mod expr_test_strategies;

pub use error::EvalError;
pub(crate) use lexer::{Lexer, Token};
pub use expr::{Expr, Value, Function, BinaryOperator, UnaryOperator};
pub use parse::{Parser, MAX_DEPTH, evaluate, parse_to_expr};
