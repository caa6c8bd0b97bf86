// SPDX-License-Identifier: MIT

//! Recursive-descent parser and tree-walking evaluator for Decision-step
//! expressions: operators `== != < <= > >= && || !`,
//! arithmetic on numbers, string concatenation, member access on `file.*`
//! and `vars.*`, and the built-in functions `matches`, `contains`,
//! `endsWith`, `startsWith`, `lower`, `upper`.

use crate::context::ExecutionContext;
use crate::error::ExpressionError;
use crate::lexer::{Lexer, Token};
use crate::value::ExprValue;
use cronplus_core::VariableValue;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    FileMember(FileField),
    VarMember(String),
    Call(String, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileField {
    Size,
    Name,
    Extension,
    Mtime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Parse and evaluate `src` against `ctx` in one call. Expressions are
/// side-effect free so there is no reason to keep the parsed AST around
/// between calls.
pub fn evaluate(src: &str, ctx: &ExecutionContext) -> Result<bool, ExpressionError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    parser.expect_eof()?;
    eval_expr(&expr, ctx)?.as_bool()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect_eof(&self) -> Result<(), ExpressionError> {
        if *self.peek() == Token::Eof {
            Ok(())
        } else {
            Err(ExpressionError::UnexpectedToken { found: format!("{:?}", self.peek()), expected: "end of expression" })
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_and()?;
        while *self.peek() == Token::Or {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary(BinOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_equality()?;
        while *self.peek() == Token::And {
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::Binary(BinOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        match self.peek() {
            Token::Not => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)))
            }
            Token::Minus => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        match self.advance() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::True => Ok(Expr::Bool(true)),
            Token::False => Ok(Expr::Bool(false)),
            Token::LParen => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Token::RParen => Ok(inner),
                    other => Err(ExpressionError::UnexpectedToken { found: format!("{:?}", other), expected: ")" }),
                }
            }
            Token::Ident(name) => self.parse_ident_primary(name),
            other => Err(ExpressionError::UnexpectedToken { found: format!("{:?}", other), expected: "expression" }),
        }
    }

    fn parse_ident_primary(&mut self, name: String) -> Result<Expr, ExpressionError> {
        if *self.peek() == Token::LParen {
            return self.parse_call(name);
        }

        if *self.peek() == Token::Dot {
            self.advance();
            let field = match self.advance() {
                Token::Ident(field) => field,
                other => return Err(ExpressionError::UnexpectedToken { found: format!("{:?}", other), expected: "member name" }),
            };
            return match name.as_str() {
                "file" => Ok(Expr::FileMember(parse_file_field(&field)?)),
                "vars" => Ok(Expr::VarMember(field)),
                other => Err(ExpressionError::UnexpectedToken { found: other.to_string(), expected: "file or vars" }),
            };
        }

        Err(ExpressionError::UnexpectedToken { found: name, expected: "member access or function call" })
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, ExpressionError> {
        self.advance();
        let mut args = Vec::new();
        if *self.peek() != Token::RParen {
            args.push(self.parse_or()?);
            while *self.peek() == Token::Comma {
                self.advance();
                args.push(self.parse_or()?);
            }
        }
        match self.advance() {
            Token::RParen => Ok(Expr::Call(name, args)),
            other => Err(ExpressionError::UnexpectedToken { found: format!("{:?}", other), expected: ")" }),
        }
    }
}

fn parse_file_field(name: &str) -> Result<FileField, ExpressionError> {
    match name {
        "size" => Ok(FileField::Size),
        "name" => Ok(FileField::Name),
        "extension" => Ok(FileField::Extension),
        "mtime" => Ok(FileField::Mtime),
        other => Err(ExpressionError::UnexpectedToken { found: other.to_string(), expected: "size, name, extension, or mtime" }),
    }
}

fn eval_expr(expr: &Expr, ctx: &ExecutionContext) -> Result<ExprValue, ExpressionError> {
    match expr {
        Expr::Number(n) => Ok(ExprValue::Number(*n)),
        Expr::Str(s) => Ok(ExprValue::Str(s.clone())),
        Expr::Bool(b) => Ok(ExprValue::Bool(*b)),
        Expr::FileMember(field) => Ok(eval_file_member(*field, ctx)),
        Expr::VarMember(name) => eval_var_member(name, ctx),
        Expr::Call(name, args) => eval_call(name, args, ctx),
        Expr::Unary(op, inner) => eval_unary(*op, inner, ctx),
        Expr::Binary(op, left, right) => eval_binary(*op, left, right, ctx),
    }
}

fn eval_file_member(field: FileField, ctx: &ExecutionContext) -> ExprValue {
    match field {
        FileField::Size => ExprValue::Number(ctx.file.size as f64),
        FileField::Name => ExprValue::Str(ctx.file.name()),
        FileField::Extension => ExprValue::Str(ctx.file.extension()),
        FileField::Mtime => ExprValue::Str(ctx.file.mtime_utc.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)),
    }
}

fn eval_var_member(name: &str, ctx: &ExecutionContext) -> Result<ExprValue, ExpressionError> {
    let value = ctx
        .variables
        .get(name)
        .ok_or_else(|| ExpressionError::Interpolation(crate::error::InterpolationError::UnknownVariable(format!("vars.{name}"))))?;
    variable_to_expr_value(value)
}

fn variable_to_expr_value(value: &VariableValue) -> Result<ExprValue, ExpressionError> {
    match value {
        VariableValue::String(s) => Ok(ExprValue::Str(s.clone())),
        VariableValue::Integer(n) => Ok(ExprValue::Number(*n as f64)),
        VariableValue::Decimal(d) => d
            .parse::<f64>()
            .map(ExprValue::Number)
            .map_err(|_| ExpressionError::TypeMismatch(format!("decimal variable {d:?} is not a valid number"))),
        VariableValue::Boolean(b) => Ok(ExprValue::Bool(*b)),
        VariableValue::Datetime(dt) => Ok(ExprValue::Str(dt.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true))),
        other => Err(ExpressionError::TypeMismatch(format!("variable of type {:?} cannot be used in an expression", other))),
    }
}

fn eval_unary(op: UnaryOp, inner: &Expr, ctx: &ExecutionContext) -> Result<ExprValue, ExpressionError> {
    let value = eval_expr(inner, ctx)?;
    match op {
        UnaryOp::Not => Ok(ExprValue::Bool(!value.as_bool()?)),
        UnaryOp::Neg => Ok(ExprValue::Number(-value.as_number()?)),
    }
}

fn eval_binary(op: BinOp, left: &Expr, right: &Expr, ctx: &ExecutionContext) -> Result<ExprValue, ExpressionError> {
    match op {
        BinOp::And => return Ok(ExprValue::Bool(eval_expr(left, ctx)?.as_bool()? && eval_expr(right, ctx)?.as_bool()?)),
        BinOp::Or => return Ok(ExprValue::Bool(eval_expr(left, ctx)?.as_bool()? || eval_expr(right, ctx)?.as_bool()?)),
        _ => {}
    }

    let l = eval_expr(left, ctx)?;
    let r = eval_expr(right, ctx)?;

    match op {
        BinOp::Add => match (&l, &r) {
            (ExprValue::Number(a), ExprValue::Number(b)) => Ok(ExprValue::Number(a + b)),
            (ExprValue::Str(_), ExprValue::Str(_)) | (ExprValue::Str(_), _) | (_, ExprValue::Str(_)) => {
                Ok(ExprValue::Str(format!("{}{}", display_value(&l), display_value(&r))))
            }
            _ => Err(ExpressionError::TypeMismatch(format!("cannot add {} and {}", l.type_name(), r.type_name()))),
        },
        BinOp::Sub => Ok(ExprValue::Number(l.as_number()? - r.as_number()?)),
        BinOp::Mul => Ok(ExprValue::Number(l.as_number()? * r.as_number()?)),
        BinOp::Div => Ok(ExprValue::Number(l.as_number()? / r.as_number()?)),
        BinOp::Eq => Ok(ExprValue::Bool(l == r)),
        BinOp::Ne => Ok(ExprValue::Bool(l != r)),
        BinOp::Lt => Ok(ExprValue::Bool(l.as_number()? < r.as_number()?)),
        BinOp::Le => Ok(ExprValue::Bool(l.as_number()? <= r.as_number()?)),
        BinOp::Gt => Ok(ExprValue::Bool(l.as_number()? > r.as_number()?)),
        BinOp::Ge => Ok(ExprValue::Bool(l.as_number()? >= r.as_number()?)),
        BinOp::And | BinOp::Or => unreachable!("short-circuited above"),
    }
}

fn display_value(value: &ExprValue) -> String {
    match value {
        ExprValue::Str(s) => s.clone(),
        ExprValue::Number(n) => n.to_string(),
        ExprValue::Bool(b) => b.to_string(),
    }
}

fn eval_call(name: &str, args: &[Expr], ctx: &ExecutionContext) -> Result<ExprValue, ExpressionError> {
    let values = args.iter().map(|a| eval_expr(a, ctx)).collect::<Result<Vec<_>, _>>()?;

    let arity = |expected: usize| -> Result<(), ExpressionError> {
        if values.len() != expected {
            Err(ExpressionError::ArityMismatch { name: name.to_string(), expected, got: values.len() })
        } else {
            Ok(())
        }
    };

    match name {
        "matches" => {
            arity(2)?;
            let pattern = values[0].as_str()?;
            let subject = values[1].as_str()?;
            let re = Regex::new(pattern).map_err(|e| ExpressionError::TypeMismatch(format!("invalid regex {pattern:?}: {e}")))?;
            Ok(ExprValue::Bool(re.is_match(subject)))
        }
        "contains" => {
            arity(2)?;
            Ok(ExprValue::Bool(values[0].as_str()?.contains(values[1].as_str()?)))
        }
        "endsWith" => {
            arity(2)?;
            Ok(ExprValue::Bool(values[0].as_str()?.ends_with(values[1].as_str()?)))
        }
        "startsWith" => {
            arity(2)?;
            Ok(ExprValue::Bool(values[0].as_str()?.starts_with(values[1].as_str()?)))
        }
        "lower" => {
            arity(1)?;
            Ok(ExprValue::Str(values[0].as_str()?.to_lowercase()))
        }
        "upper" => {
            arity(1)?;
            Ok(ExprValue::Str(values[0].as_str()?.to_uppercase()))
        }
        other => Err(ExpressionError::UnknownFunction(other.to_string())),
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
