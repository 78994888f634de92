//! Dice notation patterns.
//!
//! A pattern is arithmetic mixed with die groups such as `3d6`, `d%` or
//! `4d6l1` (roll four six-sided dice, drop the lowest). Rolling a pattern
//! resolves every die group and evaluates the arithmetic in a closed expression
//! language (`+ - * / //`, parentheses, `abs`, `max`, `min`).
//!
//! ```
//! let score = xdice::roll("3d6 + 4 - 1d4l1").unwrap();
//!
//! assert!(score >= 7i64 && score <= 22i64);
//! println!("{} = {}", score.format(true), score);
//! ```

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]


#[cfg(test)]
mod dice_test_strategies;

mod error;
mod notation;
mod score;
mod dice;
mod template;
mod pattern;
mod parser;

use rand::Rng;

pub use error::Error;
pub use notation::normalize;
pub use score::Score;
pub use dice::{Dice, DiceBuilder};
pub use template::Template;
pub use pattern::{Pattern, PatternScore};
pub use parser::{
    EvalError, Parser, MAX_DEPTH,
    Expr, Value, Function, UnaryOperator, BinaryOperator,
    evaluate, parse_to_expr
};


/// Parses and compiles `pattern`, ready to be rolled any number of times.
///
/// # Errors
/// - [`Error::Grammar`] if `pattern` is empty.
/// - [`Error::Validation`] if a die group holds an invalid value.
///
/// # Examples
/// ```
/// let pattern = xdice::compile("1d6+4+1d4").unwrap();
///
/// assert_eq!(pattern.template().to_string(), "{0}+4+{1}");
/// assert_eq!(pattern.dice().len(), 2);
/// ```
pub fn compile(pattern: &str) -> Result<Pattern, Error> {
    let mut pattern = Pattern::new(pattern)?;
    pattern.compile()?;
    Ok(pattern)
}


/// Compiles and rolls `pattern` once.
///
/// # Errors
/// Any error of [`compile`], or [`Error::Evaluation`] if the arithmetic of the
/// pattern cannot be evaluated.
///
/// # Examples
/// ```
/// let score = xdice::roll("2d6").unwrap();
///
/// assert_eq!(score.score(0).unwrap().detail().len(), 2);
/// assert!(score >= 2i64 && score <= 12i64);
/// ```
pub fn roll(pattern: &str) -> Result<PatternScore, Error> {
    roll_with(pattern, &mut rand::rng())
}

/// Same as [`roll`] using `rng` as the random source.
///
/// # Errors
/// See [`roll`].
pub fn roll_with<R: Rng + ?Sized>(pattern: &str, rng: &mut R) -> Result<PatternScore, Error> {
    compile(pattern)?.roll_with(rng)
}


/// Rolls `amount` dice of `sides` sides, without going through the notation.
///
/// # Errors
/// Returns [`Error::Validation`] if `sides` is 0.
///
/// # Examples
/// ```
/// let score = xdice::roll_dice(6, 3).unwrap();
///
/// assert_eq!(score.detail().len(), 3);
/// assert!(score >= 3i64 && score <= 18i64);
/// ```
pub fn roll_dice(sides: u32, amount: u32) -> Result<Score, Error> {
    roll_dice_with(sides, amount, &mut rand::rng())
}

/// Same as [`roll_dice`] using `rng` as the random source.
///
/// # Errors
/// See [`roll_dice`].
pub fn roll_dice_with<R: Rng + ?Sized>(sides: u32, amount: u32, rng: &mut R) -> Result<Score, Error> {
    Ok(Dice::new(sides, amount)?.roll_with(rng))
}
