use crate::parser::error::*;
use crate::parser::{Lexer, Token, Expr, Value};


/// Limit on both parser recursion and the height of the parsed tree, which
/// bounds the recursion of [`Expr::evaluate`] and of dropping the tree.
pub const MAX_DEPTH: usize = 256;


#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest = 1,
    Sum = 2,
    Product = 3,
    Prefix = 4,
}

impl Precedence {
    fn of_token(token: &Token) -> Self {
        match token {
            Token::Plus | Token::Minus => Precedence::Sum,
            Token::Multiply | Token::Divide | Token::FloorDivide => Precedence::Product,
            _ => Precedence::Lowest
        }
    }
}


/// A Pratt parser for the arithmetic left once dice have been substituted.
///
/// The grammar is closed: numbers, `+ - * / //`, parentheses, unary signs and
/// calls to `abs`, `max` and `min`. Anything else is rejected while lexing or
/// parsing, so evaluating untrusted text can never reach anything but these
/// operations.
#[derive(Debug)]
pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
    depth: usize
}

impl Parser {
    /// Creates a new `Parser` instance for the given input string.
    ///
    /// # Errors
    /// Returns [`EvalError::Empty`] for blank input, or the lexing error of the
    /// first two tokens.
    ///
    /// # Examples
    /// ```
    /// use xdice::{Parser, EvalError};
    ///
    /// assert!(Parser::new("3 + 4").is_ok());
    /// assert!(matches!(Parser::new("  ").unwrap_err(), EvalError::Empty));
    /// ```
    pub fn new(input: &str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;

        if current == Token::Eof {
            return Err(EvalError::Empty);
        }

        let peek = lexer.next_token()?;
        Ok(Self { lexer, current, peek, depth: 0 })
    }

    /// Parses the whole input into an [`Expr`].
    ///
    /// # Errors
    /// Returns an [`EvalError`] wrapped with [`EvalError::AtPosition`] if the
    /// input is not a complete expression of the grammar.
    ///
    /// # Examples
    /// ```
    /// use xdice::{Parser, EvalError};
    ///
    /// let mut parser = Parser::new("1 + max(2, 3)").unwrap();
    /// let expr = parser.parse().unwrap();
    /// assert_eq!(format!("{expr}"), "(1 + max(2, 3))");
    ///
    /// let mut invalid_parser = Parser::new("1 +").unwrap();
    /// let err = invalid_parser.parse().unwrap_err();
    /// assert!(matches!(err.err(), EvalError::UnexpectedPrefix(_)));
    /// ```
    pub fn parse(&mut self) -> Result<Expr> {
        self.parse_all()
            .map_err(|err| err.at_pos(self.lexer.position))
    }

    fn parse_all(&mut self) -> Result<Expr> {
        let (expr, _) = self.parse_tokens(Precedence::Lowest)?;

        if self.peek != Token::Eof {
            return Err(EvalError::Trailing(format!("{:?}", self.peek)));
        }

        Ok(expr)
    }

    fn next_token(&mut self) -> Result<()> {
        self.current = self.peek;
        self.peek = self.lexer.next_token()?;

        Ok(())
    }

    fn parse_tokens(&mut self, precedence: Precedence) -> Result<(Expr, usize)> {
        if self.depth == MAX_DEPTH {
            return Err(EvalError::TooDeep(MAX_DEPTH));
        }

        self.depth += 1;
        let result = self.parse_chain(precedence);
        self.depth -= 1;
        result
    }

    fn parse_chain(&mut self, precedence: Precedence) -> Result<(Expr, usize)> {
        let (mut expr, mut height) = self.parse_prefix()?;

        while self.peek != Token::Eof && precedence < self.peek_precedence() {
            self.next_token()?;
            (expr, height) = self.parse_infix(expr, height)?;
        }

        Ok((expr, height))
    }

    fn parse_prefix(&mut self) -> Result<(Expr, usize)> {
        match self.current {
            Token::Number(v) => Ok((v.into(), 1)),

            Token::Minus => {
                self.next_token()?;
                let (operand, height) = self.parse_tokens(Precedence::Prefix)?;
                Ok((Expr::neg(operand), above(height)?))
            },

            Token::Plus => {
                self.next_token()?;
                let (operand, height) = self.parse_tokens(Precedence::Prefix)?;
                Ok((Expr::pos(operand), above(height)?))
            },

            Token::LeftParenthesis => {
                self.next_token()?;
                let inner = self.parse_tokens(Precedence::Lowest)?;
                self.expect_closing()?;
                Ok(inner)
            },

            Token::Function(function) => {
                if self.peek != Token::LeftParenthesis {
                    return Err(EvalError::UnexpectedPrefix(format!("{function:?}")));
                }
                self.next_token()?;

                let (args, height) = self.parse_arguments()?;
                Ok((Expr::call(function, args), above(height)?))
            },

            other => Err(EvalError::UnexpectedPrefix(format!("{other:?}")))
        }
    }

    /// Parses `a, b, ...)` with `current` on the opening parenthesis. Returns the
    /// arguments and the height of the tallest one.
    fn parse_arguments(&mut self) -> Result<(Vec<Expr>, usize)> {
        let mut args = Vec::new();
        let mut height = 0;

        if self.peek == Token::RightParenthesis {
            self.next_token()?;
            return Ok((args, height));
        }

        loop {
            self.next_token()?;
            let (arg, arg_height) = self.parse_tokens(Precedence::Lowest)?;
            args.push(arg);
            height = height.max(arg_height);

            if self.peek == Token::Comma {
                self.next_token()?;
                continue;
            }

            self.expect_closing()?;
            return Ok((args, height));
        }
    }

    fn expect_closing(&mut self) -> Result<()> {
        if self.peek != Token::RightParenthesis {
            return Err(EvalError::UnclosedParenthesis);
        }

        self.next_token()
    }

    fn parse_infix(&mut self, expr: Expr, height: usize) -> Result<(Expr, usize)> {
        match self.current {
            Token::Plus | Token::Minus | Token::Multiply | Token::Divide | Token::FloorDivide =>
                self.parse_binary_op(expr, height),
            other => Err(EvalError::UnexpectedInfix(format!("{other:?}")))
        }
    }

    fn parse_binary_op(&mut self, left: Expr, left_height: usize) -> Result<(Expr, usize)> {
        let op = self.current;
        self.next_token()?;

        let (right, right_height) = self.parse_tokens(Precedence::of_token(&op))?;
        let height = above(left_height.max(right_height))?;

        let expr = match op {
            Token::Plus => Expr::add(left, right),
            Token::Minus => Expr::sub(left, right),
            Token::Multiply => Expr::mul(left, right),
            Token::Divide => Expr::div(left, right),
            Token::FloorDivide => Expr::floor_div(left, right),
            other => unreachable!("{other:?}")
        };

        Ok((expr, height))
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of_token(&self.peek)
    }
}


/// Height of a node whose tallest child is `height` levels high.
fn above(height: usize) -> Result<usize> {
    if height >= MAX_DEPTH {
        return Err(EvalError::TooDeep(MAX_DEPTH));
    }

    Ok(height + 1)
}


/// Parses an arithmetic string directly into an [`Expr`].
///
/// # Errors
/// Returns an [`EvalError`] if the input is not part of the grammar, wrapped
/// with positional information when the failure happened after the first tokens.
///
/// # Examples
/// ```
/// use xdice::parse_to_expr;
///
/// let expr = parse_to_expr("abs(-3) * 2").unwrap();
/// assert_eq!(expr.to_string(), "(abs(-3) * 2)");
/// ```
pub fn parse_to_expr(input: &str) -> Result<Expr> {
    let mut parser = Parser::new(input)?;
    parser.parse()
}


/// Parses and evaluates an arithmetic string to a [`Value`].
///
/// # Errors
/// Returns an [`EvalError`] if the input is not part of the grammar or if the
/// evaluation fails (division by zero, integer overflow, bad function arity).
///
/// # Examples
/// ```
/// use xdice::{evaluate, EvalError, Value};
///
/// assert_eq!(evaluate("7 // 2 + max(1, 5)"), Ok(Value::Int(8)));
/// assert_eq!(evaluate("7 / 2"), Ok(Value::Float(3.5)));
/// assert!(matches!(evaluate("exit()").unwrap_err().err(), EvalError::UnknownName(_)));
/// ```
pub fn evaluate(input: &str) -> Result<Value> {
    parse_to_expr(input)?.evaluate()
}
