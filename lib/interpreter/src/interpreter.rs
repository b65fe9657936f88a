use cursor::Line;
use diagnostics::Diagnostic;
use parser::{Expr, LiteralValue};
use scanner::{Token, TokenType};

mod value;
pub use value::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeErrorType {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings,
    #[error("Unknown operator '{0}'.")]
    UnknownOperator(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}\n[line {}]", .operator.line)]
pub struct RuntimeError<'a> {
    pub error: RuntimeErrorType,
    pub operator: Token<'a>,
}

impl<'a> RuntimeError<'a> {
    fn new(error: RuntimeErrorType, operator: &Token<'a>) -> Self {
        Self { error, operator: operator.clone() }
    }

    pub fn line(&self) -> Line {
        self.operator.line
    }
}

impl From<RuntimeError<'_>> for Diagnostic {
    fn from(e: RuntimeError<'_>) -> Self {
        Diagnostic::Runtime { line: e.line(), message: e.error.to_string() }
    }
}

pub type Result<'a, T> = std::result::Result<T, RuntimeError<'a>>;

#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `expr` bottom-up. The first operand type error aborts the
    /// evaluation.
    pub fn evaluate<'a>(&self, expr: &Expr<'a>) -> Result<'a, Value> {
        let value = self.evaluate_expr(expr)?;
        log::trace!("Evaluated {} => {:?}", expr, value);
        Ok(value)
    }

    fn evaluate_expr<'a>(&self, expr: &Expr<'a>) -> Result<'a, Value> {
        use Expr::*;
        match expr {
            Literal(LiteralValue::Number(n)) => Ok((*n).into()),
            Literal(LiteralValue::Str(s)) => Ok((*s).into()),
            Literal(LiteralValue::Boolean(b)) => Ok((*b).into()),
            Literal(LiteralValue::Nil) => Ok(Value::Nil),

            Grouping(expr) => self.evaluate_expr(expr),

            Unary { operator, right } => {
                let right = self.evaluate_expr(right)?;
                match (operator.token_type, right) {
                    (TokenType::Minus, Value::Number(n)) => Ok((-n).into()),
                    (TokenType::Minus, _) => {
                        Err(RuntimeError::new(RuntimeErrorType::OperandMustBeNumber, operator))
                    }
                    (TokenType::Bang, v) => Ok((!v.is_truthy()).into()),
                    _ => Err(unknown_operator(operator)),
                }
            }

            Binary { left, operator, right } => {
                let left = self.evaluate_expr(left)?;
                let right = self.evaluate_expr(right)?;
                binary(operator, left, right)
            }
        }
    }
}

fn binary<'a>(operator: &Token<'a>, left: Value, right: Value) -> Result<'a, Value> {
    use TokenType::*;
    match (&left, &right, operator.token_type) {
        (_, _, EqualEqual) => Ok(left.eq_in_lox(&right).into()),
        (_, _, BangEqual) => Ok((!left.eq_in_lox(&right)).into()),

        (Value::Number(l), Value::Number(r), Plus) => Ok((l + r).into()),
        (Value::Str(l), Value::Str(r), Plus) => Ok((l.clone() + r).into()),
        (_, _, Plus) => Err(RuntimeError::new(
            RuntimeErrorType::OperandsMustBeNumbersOrStrings,
            operator,
        )),

        // Division by zero follows IEEE semantics
        (Value::Number(l), Value::Number(r), Minus) => Ok((l - r).into()),
        (Value::Number(l), Value::Number(r), Slash) => Ok((l / r).into()),
        (Value::Number(l), Value::Number(r), Star) => Ok((l * r).into()),

        (Value::Number(l), Value::Number(r), Greater) => Ok((l > r).into()),
        (Value::Number(l), Value::Number(r), GreaterEqual) => Ok((l >= r).into()),
        (Value::Number(l), Value::Number(r), Less) => Ok((l < r).into()),
        (Value::Number(l), Value::Number(r), LessEqual) => Ok((l <= r).into()),

        (_, _, Minus | Slash | Star | Greater | GreaterEqual | Less | LessEqual) => {
            Err(RuntimeError::new(RuntimeErrorType::OperandsMustBeNumbers, operator))
        }

        _ => Err(unknown_operator(operator)),
    }
}

fn unknown_operator<'a>(operator: &Token<'a>) -> RuntimeError<'a> {
    RuntimeError::new(RuntimeErrorType::UnknownOperator(operator.lexeme.to_string()), operator)
}
