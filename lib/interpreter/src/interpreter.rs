use std::io::Write;

use cursor::Line;
use errors::{ErrorKind, LoxError, LoxErrors};
use parser::{Expr, LiteralValue, Stmt};
use scanner::TokenData;

mod value;
pub use value::Value;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings,
    #[error("Cannot divide by zero.")]
    DivisionByZero,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[line {line}] Error: {error}")]
pub struct RuntimeError {
    pub error: Error,
    pub line: Line,
}

impl From<RuntimeError> for LoxError {
    fn from(e: RuntimeError) -> Self {
        LoxError::new(ErrorKind::Runtime, e.line, e.error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    /// Scan and parse diagnostics, in source order per stage. Nothing was executed.
    #[error("{0}")]
    CompileError(LoxErrors),
    #[error("{0}")]
    RuntimeError(LoxError),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RuntimeError> for InterpretError {
    fn from(e: RuntimeError) -> Self {
        Self::RuntimeError(e.into())
    }
}

/// How `+` treats a number paired with a string.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MixedAddition {
    /// `1 + "a"` is a runtime error.
    #[default]
    Reject,
    /// `1 + "a"` stringifies the number and concatenates: `"1a"`.
    Stringify,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    pub mixed_addition: MixedAddition,
}

#[derive(Debug, Default)]
pub struct Interpreter {
    options: Options,
}

impl Interpreter {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Scans, parses and runs `source`, writing printed values to `output`.
    ///
    /// Nothing runs if scanning or parsing reported any error. Each call is independent of the
    /// previous ones, so a REPL can keep using the same interpreter after a failed line.
    pub fn run_source(&self, source: &str, output: &mut impl Write) -> Result<(), InterpretError> {
        let (tokens, mut errors) = scanner::scan(source);
        let (stmts, parse_errors) = parser::parse(tokens);
        errors.extend(parse_errors);

        if !errors.is_empty() {
            return Err(InterpretError::CompileError(errors));
        }

        self.interpret(&stmts, output)
    }

    /// Executes `stmts` in order, stopping at the first runtime error.
    pub fn interpret(&self, stmts: &[Stmt], output: &mut impl Write) -> Result<(), InterpretError> {
        for s in stmts {
            self.execute(s, output)?;
        }
        Ok(())
    }

    fn execute(&self, stmt: &Stmt, output: &mut impl Write) -> Result<(), InterpretError> {
        match stmt {
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(output, "{}", value)?;
                Ok(())
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
        }
    }

    pub(crate) fn evaluate(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        log::trace!("Evaluating {expr}");
        match expr {
            Expr::Literal(LiteralValue::Number(n)) => Ok((*n).into()),
            Expr::Literal(LiteralValue::Str(s)) => Ok((*s).into()),
            Expr::Literal(LiteralValue::Boolean(b)) => Ok((*b).into()),
            Expr::Literal(LiteralValue::Nil) => Ok(Value::Nil),

            Expr::Grouping(expr) => self.evaluate(expr),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                let error = |error: Error| RuntimeError { error, line: operator.line() };
                match (&operator.data, right) {
                    (TokenData::Minus, Value::Number(n)) => Ok((-n).into()),
                    (TokenData::Minus, _) => Err(error(Error::OperandMustBeNumber)),
                    (TokenData::Bang, v) => Ok((!v.is_truthy()).into()),
                    (data, _) => unreachable!("Parser produced unary operator {data:?}"),
                }
            }

            Expr::Binary { left, operator, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                let error = |error: Error, left: &Value, right: &Value| {
                    log::debug!("{error:?} on {} and {}", left.type_name(), right.type_name());
                    RuntimeError { error, line: operator.line() }
                };
                let stringify_mixed = self.options.mixed_addition == MixedAddition::Stringify;

                match (&operator.data, left, right) {
                    (TokenData::Plus, Value::Number(l), Value::Number(r)) => Ok((l + r).into()),
                    (TokenData::Plus, Value::Str(l), Value::Str(r)) => Ok((l + &r).into()),
                    (TokenData::Plus, l @ Value::Number(_), r @ Value::Str(_))
                    | (TokenData::Plus, l @ Value::Str(_), r @ Value::Number(_))
                        if stringify_mixed =>
                    {
                        Ok(format!("{l}{r}").into())
                    }
                    (TokenData::Plus, l, r) => Err(error(Error::OperandsMustBeNumbersOrStrings, &l, &r)),

                    (TokenData::Minus, Value::Number(l), Value::Number(r)) => Ok((l - r).into()),
                    (TokenData::Star, Value::Number(l), Value::Number(r)) => Ok((l * r).into()),
                    (TokenData::Slash, Value::Number(l), Value::Number(r)) => {
                        if r != 0.0 {
                            Ok((l / r).into())
                        } else {
                            Err(RuntimeError { error: Error::DivisionByZero, line: operator.line() })
                        }
                    }

                    (TokenData::Greater, Value::Number(l), Value::Number(r)) => Ok((l > r).into()),
                    (TokenData::GreaterEqual, Value::Number(l), Value::Number(r)) => {
                        Ok((l >= r).into())
                    }
                    (TokenData::Less, Value::Number(l), Value::Number(r)) => Ok((l < r).into()),
                    (TokenData::LessEqual, Value::Number(l), Value::Number(r)) => {
                        Ok((l <= r).into())
                    }

                    (TokenData::EqualEqual, l, r) => Ok(l.equals(&r).into()),
                    (TokenData::BangEqual, l, r) => Ok((!l.equals(&r)).into()),

                    (
                        TokenData::Minus
                        | TokenData::Star
                        | TokenData::Slash
                        | TokenData::Greater
                        | TokenData::GreaterEqual
                        | TokenData::Less
                        | TokenData::LessEqual,
                        l,
                        r,
                    ) => Err(error(Error::OperandsMustBeNumbers, &l, &r)),

                    (data, ..) => unreachable!("Parser produced binary operator {data:?}"),
                }
            }
        }
    }
}
