use crate::parser::error::*;
use crate::parser::{Function, Value};


#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token {
    Number(Value),
    Function(Function),
    Plus,
    Minus,
    Multiply,
    Divide,
    FloorDivide,
    LeftParenthesis,
    RightParenthesis,
    Comma,
    Eof,
}


#[derive(Debug)]
pub(crate) struct Lexer {
    input: Vec<char>,
    pub position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let Some(&ch) = self.input.get(self.position) else {
            return Ok(Token::Eof);
        };

        match ch {
            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '*' => self.single(Token::Multiply),
            '/' => {
                if self.input.get(self.position + 1) == Some(&'/') {
                    self.position += 2;
                    Ok(Token::FloorDivide)
                } else {
                    self.single(Token::Divide)
                }
            },
            '(' => self.single(Token::LeftParenthesis),
            ')' => self.single(Token::RightParenthesis),
            ',' => self.single(Token::Comma),
            '0'..='9' | '.' => self.read_number(),
            c if c == '_' || c.is_ascii_alphabetic() => self.read_identifier(),
            _ => Err(EvalError::Token(ch))
        }
    }

    fn single(&mut self, token: Token) -> Result<Token> {
        self.position += 1;
        Ok(token)
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && self.input[self.position].is_whitespace() {
            self.position += 1;
        }
    }

    fn read_number(&mut self) -> Result<Token> {
        let start = self.position;
        let mut seen_dot = false;

        while let Some(&c) = self.input.get(self.position) {
            match c {
                '0'..='9' => {},
                '.' if !seen_dot => seen_dot = true,
                _ => break
            }
            self.position += 1;
        }

        let number: String = self.input[start..self.position].iter().collect();

        if seen_dot {
            return match number.parse::<f64>() {
                Ok(value) => Ok(Token::Number(Value::Float(value))),
                Err(_) => Err(EvalError::Number(number))
            };
        }

        number.parse::<i64>()
            .map(|value| Token::Number(Value::Int(value)))
            .map_err(|_| EvalError::Number(number))
    }

    fn read_identifier(&mut self) -> Result<Token> {
        let start = self.position;
        while self.position < self.input.len()
            && (self.input[self.position] == '_' || self.input[self.position].is_ascii_alphanumeric())
        {
            self.position += 1;
        }

        let identifier: String = self.input[start..self.position].iter().collect();
        match Function::lookup(&identifier) {
            Some(function) => Ok(Token::Function(function)),
            None => Err(EvalError::UnknownName(identifier))
        }
    }
}
