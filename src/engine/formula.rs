//! Restricted arithmetic evaluator for user-authored allowance/deduction
//! formulas.
//!
//! Grammar: numeric literals, variables (`Rate` or `{Rate}`), unary and
//! binary `+ - * / //`, parentheses, and calls to exactly `min`, `max`,
//! `round`, `abs`. Everything else fails the parse. Failures never reach
//! the caller: a formula that cannot be parsed or evaluated is worth 0.0,
//! because a single bad formula must not abort a payroll run.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
enum FormulaError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated variable reference")]
    UnterminatedBrace,
    #[error("malformed number '{0}'")]
    BadNumber(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("call to '{0}' is not allowed")]
    DisallowedCall(String),
    #[error("wrong number of arguments to '{0}'")]
    BadArity(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Min,
    Max,
    Round,
    Abs,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Func::Min),
            "max" => Some(Func::Max),
            "round" => Some(Func::Round),
            "abs" => Some(Func::Abs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Expr {
    Num(f64),
    Var(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

fn lex(input: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    tokens.push(Token::SlashSlash);
                } else {
                    tokens.push(Token::Slash);
                }
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            // `{Var}` is normalized to the bare variable form.
            '{' => {
                chars.next();
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() || chars.next() != Some('}') {
                    return Err(FormulaError::UnterminatedBrace);
                }
                tokens.push(Token::Ident(name));
            }
            '0'..='9' | '.' => {
                let mut raw = String::new();
                let mut seen_dot = false;
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() {
                        raw.push(c);
                        chars.next();
                    } else if c == '.' && !seen_dot {
                        seen_dot = true;
                        raw.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let num = raw
                    .parse::<f64>()
                    .map_err(|_| FormulaError::BadNumber(raw.clone()))?;
                tokens.push(Token::Num(num));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            other => return Err(FormulaError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, token: Token) -> Result<(), FormulaError> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            Some(_) => Err(FormulaError::UnexpectedToken),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.next();
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // term := factor (('*' | '/' | '//') factor)*
    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::SlashSlash) => BinOp::FloorDiv,
                _ => break,
            };
            self.next();
            let rhs = self.factor()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // factor := ('+' | '-') factor | primary
    fn factor(&mut self) -> Result<Expr, FormulaError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.next();
                self.factor()
            }
            Some(Token::Minus) => {
                self.next();
                Ok(Expr::Neg(Box::new(self.factor()?)))
            }
            _ => self.primary(),
        }
    }

    // primary := number | ident | ident '(' args ')' | '(' expr ')'
    fn primary(&mut self) -> Result<Expr, FormulaError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let func = Func::from_name(&name)
                        .ok_or(FormulaError::DisallowedCall(name))?;
                    self.next();
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RParen) {
                        loop {
                            args.push(self.expr()?);
                            match self.peek() {
                                Some(Token::Comma) => {
                                    self.next();
                                }
                                _ => break,
                            }
                        }
                    }
                    self.expect(Token::RParen)?;
                    Ok(Expr::Call(func, args))
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(_) => Err(FormulaError::UnexpectedToken),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

fn eval(expr: &Expr, vars: &HashMap<String, f64>) -> Result<f64, FormulaError> {
    Ok(match expr {
        Expr::Num(n) => *n,
        // Unknown variables are worth 0.0: incomplete configuration, not an error.
        Expr::Var(name) => vars.get(name).copied().unwrap_or(0.0),
        Expr::Neg(inner) => -eval(inner, vars)?,
        Expr::Binary(op, lhs, rhs) => {
            let l = eval(lhs, vars)?;
            let r = eval(rhs, vars)?;
            match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => {
                    if r == 0.0 {
                        0.0
                    } else {
                        l / r
                    }
                }
                BinOp::FloorDiv => {
                    if r == 0.0 {
                        0.0
                    } else {
                        (l / r).floor()
                    }
                }
            }
        }
        Expr::Call(func, args) => match func {
            Func::Min => {
                if args.len() < 2 {
                    return Err(FormulaError::BadArity("min"));
                }
                let mut out = f64::INFINITY;
                for a in args {
                    out = out.min(eval(a, vars)?);
                }
                out
            }
            Func::Max => {
                if args.len() < 2 {
                    return Err(FormulaError::BadArity("max"));
                }
                let mut out = f64::NEG_INFINITY;
                for a in args {
                    out = out.max(eval(a, vars)?);
                }
                out
            }
            Func::Round => match args.len() {
                1 => eval(&args[0], vars)?.round(),
                2 => {
                    let v = eval(&args[0], vars)?;
                    let digits = eval(&args[1], vars)?.trunc() as i32;
                    let scale = 10f64.powi(digits);
                    (v * scale).round() / scale
                }
                _ => return Err(FormulaError::BadArity("round")),
            },
            Func::Abs => {
                if args.len() != 1 {
                    return Err(FormulaError::BadArity("abs"));
                }
                eval(&args[0], vars)?.abs()
            }
        },
    })
}

fn try_eval(input: &str, vars: &HashMap<String, f64>) -> Result<f64, FormulaError> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Ok(0.0);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    if parser.peek().is_some() {
        return Err(FormulaError::UnexpectedToken);
    }
    eval(&expr, vars)
}

/// Evaluates a formula against the given variable set. Never fails: any
/// lexing, parsing or evaluation problem yields 0.0, with the detail on the
/// debug log only.
pub fn eval_formula(input: &str, vars: &HashMap<String, f64>) -> f64 {
    match try_eval(input, vars) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(formula = input, error = %e, "Formula evaluation failed");
            0.0
        }
    }
}
