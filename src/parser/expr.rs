use std::fmt::Display;
use crate::parser::error::*;


/// A numeric value of the expression language.
///
/// Integer arithmetic stays integral (and fails on overflow) until a real
/// division or a decimal literal turns the value into a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64)
}

impl Value {
    /// The value as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Float(v) => v
        }
    }

    /// Truncates the value toward zero.
    ///
    /// # Errors
    /// Returns [`EvalError::NonFinite`] for NaN or infinite values, and for floats
    /// outside of the `i64` range.
    pub fn to_integer(self) -> Result<i64> {
        match self {
            Value::Int(v) => Ok(v),
            Value::Float(v) => {
                let truncated = v.trunc();
                if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                    return Err(EvalError::NonFinite);
                }
                Ok(truncated as i64)
            }
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Value::Int(v) => v == 0,
            Value::Float(v) => v == 0.0
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}")
        }
    }
}


/// The only functions an expression may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Max,
    Min
}

const FUNCTIONS: [(&str, Function); 3] = [
    ("abs", Function::Abs),
    ("max", Function::Max),
    ("min", Function::Min),
];

impl Function {
    /// Finds the function called `name`.
    pub fn lookup(name: &str) -> Option<Self> {
        FUNCTIONS.iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, function)| *function)
    }

    /// Name as written in expressions.
    pub fn name(self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Max => "max",
            Function::Min => "min"
        }
    }

    /// Applies the function. `abs` takes exactly one argument, `max` and `min`
    /// at least two; on ties the first extreme argument is returned.
    pub fn call(self, args: &[Value]) -> Result<Value> {
        match (self, args) {
            (Function::Abs, [Value::Int(v)]) => v.checked_abs().map(Value::Int).ok_or(EvalError::Overflow),
            (Function::Abs, [Value::Float(v)]) => Ok(Value::Float(v.abs())),
            (Function::Abs, _) => Err(self.arity("1", args.len())),

            (Function::Max | Function::Min, [first, rest @ ..]) if !rest.is_empty() => {
                let wins = |candidate: f64, current: f64| match self {
                    Function::Max => candidate > current,
                    _ => candidate < current
                };

                Ok(rest.iter().fold(*first, |current, &candidate| {
                    if wins(candidate.as_f64(), current.as_f64()) { candidate } else { current }
                }))
            },
            (Function::Max | Function::Min, _) => Err(self.arity("at least 2", args.len()))
        }
    }

    fn arity(self, expected: &'static str, got: usize) -> EvalError {
        EvalError::Arity { function: self.name(), expected, got }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}


/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    UnaryOperator {
        op: UnaryOperator,
        operand: Box<Expr>
    },
    BinaryOperator {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>
    },
    Call {
        function: Function,
        args: Vec<Expr>
    }
}

impl Expr {
    /// Evaluates the tree.
    ///
    /// # Errors
    /// Returns the first [`EvalError`] raised by an operator or function.
    pub fn evaluate(&self) -> Result<Value> {
        match self {
            Expr::Literal(value) => Ok(*value),

            Expr::UnaryOperator { op, operand } => op.op(operand.evaluate()?),

            Expr::BinaryOperator { op, left, right } => {
                let left = left.evaluate()?;
                let right = right.evaluate()?;
                op.op(left, right)
            },

            Expr::Call { function, args } => {
                let values = args.iter()
                    .map(Expr::evaluate)
                    .collect::<Result<Vec<_>>>()?;
                function.call(&values)
            }
        }
    }

    fn unary_op<T: Into<Expr>>(op: UnaryOperator, operand: T) -> Self {
        Self::UnaryOperator { op, operand: Box::new(operand.into()) }
    }

    pub fn pos<T: Into<Expr>>(operand: T) -> Self {
        Self::unary_op(UnaryOperator::Plus, operand)
    }

    pub fn neg<T: Into<Expr>>(operand: T) -> Self {
        Self::unary_op(UnaryOperator::Minus, operand)
    }

    fn binary_op<L: Into<Expr>, R: Into<Expr>>(op: BinaryOperator, left: L, right: R) -> Self {
        Self::BinaryOperator { op, left: Box::new(left.into()), right: Box::new(right.into()) }
    }

    pub fn add<L: Into<Expr>, R: Into<Expr>>(left: L, right: R) -> Self {
        Self::binary_op(BinaryOperator::Add, left, right)
    }

    pub fn sub<L: Into<Expr>, R: Into<Expr>>(left: L, right: R) -> Self {
        Self::binary_op(BinaryOperator::Subtract, left, right)
    }

    pub fn mul<L: Into<Expr>, R: Into<Expr>>(left: L, right: R) -> Self {
        Self::binary_op(BinaryOperator::Multiply, left, right)
    }

    pub fn div<L: Into<Expr>, R: Into<Expr>>(left: L, right: R) -> Self {
        Self::binary_op(BinaryOperator::Divide, left, right)
    }

    pub fn floor_div<L: Into<Expr>, R: Into<Expr>>(left: L, right: R) -> Self {
        Self::binary_op(BinaryOperator::FloorDivide, left, right)
    }

    pub fn call(function: Function, args: Vec<Expr>) -> Self {
        Self::Call { function, args }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Literal(Value::Int(value))
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::UnaryOperator { op, operand } => write!(f, "{op}{operand}"),
            Expr::BinaryOperator { op, left, right } =>
                write!(f, "({left} {op} {right})"),
            Expr::Call { function, args } => {
                let args = args.iter()
                    .map(Expr::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{function}({args})")
            }
        }
    }
}


#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

impl UnaryOperator {
    pub fn op(&self, value: Value) -> Result<Value> {
        use UnaryOperator as Op;
        match (self, value) {
            (Op::Plus, value) => Ok(value),
            (Op::Minus, Value::Int(v)) => v.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
            (Op::Minus, Value::Float(v)) => Ok(Value::Float(-v))
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Plus => write!(f, "+"),
            UnaryOperator::Minus => write!(f, "-")
        }
    }
}


#[derive(Debug, Clone, PartialEq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
}

impl BinaryOperator {
    /// Applies the operator. `Divide` always produces a float, `FloorDivide`
    /// rounds toward negative infinity and stays integral for integer operands.
    pub fn op(&self, left: Value, right: Value) -> Result<Value> {
        use BinaryOperator as Op;

        if matches!(self, Op::Divide | Op::FloorDivide) && right.is_zero() {
            return Err(EvalError::DivisionByZero);
        }

        match (self, left, right) {
            (Op::Add, Value::Int(l), Value::Int(r)) => l.checked_add(r).map(Value::Int).ok_or(EvalError::Overflow),
            (Op::Subtract, Value::Int(l), Value::Int(r)) => l.checked_sub(r).map(Value::Int).ok_or(EvalError::Overflow),
            (Op::Multiply, Value::Int(l), Value::Int(r)) => l.checked_mul(r).map(Value::Int).ok_or(EvalError::Overflow),
            (Op::FloorDivide, Value::Int(l), Value::Int(r)) => floor_div(l, r).map(Value::Int).ok_or(EvalError::Overflow),

            (op, l, r) => {
                let (l, r) = (l.as_f64(), r.as_f64());
                let value = match op {
                    Op::Add => l + r,
                    Op::Subtract => l - r,
                    Op::Multiply => l * r,
                    Op::Divide => l / r,
                    Op::FloorDivide => (l / r).floor()
                };
                Ok(Value::Float(value))
            }
        }
    }
}

fn floor_div(left: i64, right: i64) -> Option<i64> {
    let quotient = left.checked_div(right)?;
    if left % right != 0 && (left < 0) != (right < 0) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/"),
            BinaryOperator::FloorDivide => write!(f, "//")
        }
    }
}
