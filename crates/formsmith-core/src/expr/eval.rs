//! Tree-walking interpreter

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::context::{Binding, EvalContext};
use super::value::Value;
use super::EvalError;
use std::cmp::Ordering;

/// Evaluate an expression tree against a context.
pub fn eval(expr: &Expr, ctx: &EvalContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Ident(name) => match ctx.lookup(name) {
            Some(Binding::Value(value)) => Ok(value.clone()),
            Some(Binding::Function(_)) => Err(EvalError::FunctionAsValue(name.clone())),
            None => Err(EvalError::UnknownIdentifier(name.clone())),
        },
        Expr::Unary { op, operand } => {
            let value = eval(operand, ctx)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOp::Neg => Ok(Value::Number(-number("-", &value)?)),
                UnaryOp::Plus => Ok(Value::Number(number("+", &value)?)),
            }
        }
        Expr::Binary { op: BinaryOp::And, lhs, rhs } => {
            let lhs = eval(lhs, ctx)?;
            if !lhs.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval(rhs, ctx)?.is_truthy()))
        }
        Expr::Binary { op: BinaryOp::Or, lhs, rhs } => {
            let lhs = eval(lhs, ctx)?;
            if lhs.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval(rhs, ctx)?.is_truthy()))
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval(lhs, ctx)?;
            let rhs = eval(rhs, ctx)?;
            binary(*op, &lhs, &rhs)
        }
        Expr::Conditional { cond, then, otherwise } => {
            if eval(cond, ctx)?.is_truthy() {
                eval(then, ctx)
            } else {
                eval(otherwise, ctx)
            }
        }
        Expr::Call { name, args } => {
            let function = match ctx.lookup(name) {
                Some(Binding::Function(f)) => *f,
                Some(Binding::Value(_)) => return Err(EvalError::NotCallable(name.clone())),
                None => return Err(EvalError::UnknownIdentifier(name.clone())),
            };
            let args = args
                .iter()
                .map(|arg| eval(arg, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            function(ctx, &args)
        }
    }
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Concat => Ok(Value::Text(format!("{}{}", lhs, rhs))),
        BinaryOp::Eq => Ok(Value::Bool(lhs.strict_eq(rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!lhs.strict_eq(rhs))),
        BinaryOp::Lt => compare(op, lhs, rhs).map(|o| Value::Bool(o == Ordering::Less)),
        BinaryOp::Le => compare(op, lhs, rhs).map(|o| Value::Bool(o != Ordering::Greater)),
        BinaryOp::Gt => compare(op, lhs, rhs).map(|o| Value::Bool(o == Ordering::Greater)),
        BinaryOp::Ge => compare(op, lhs, rhs).map(|o| Value::Bool(o != Ordering::Less)),
        BinaryOp::Add => arithmetic(op, lhs, rhs, |a, b| Ok(a + b)),
        BinaryOp::Sub => arithmetic(op, lhs, rhs, |a, b| Ok(a - b)),
        BinaryOp::Mul => arithmetic(op, lhs, rhs, |a, b| Ok(a * b)),
        BinaryOp::Div => arithmetic(op, lhs, rhs, |a, b| checked_divisor(b).map(|b| a / b)),
        BinaryOp::Mod => arithmetic(op, lhs, rhs, |a, b| checked_divisor(b).map(|b| a % b)),
        BinaryOp::Pow => arithmetic(op, lhs, rhs, |a, b| Ok(a.powf(b))),
        // Short-circuiting happens in `eval`; these only see evaluated operands.
        BinaryOp::And => Ok(Value::Bool(lhs.is_truthy() && rhs.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(lhs.is_truthy() || rhs.is_truthy())),
    }
}

fn arithmetic<F>(op: BinaryOp, lhs: &Value, rhs: &Value, apply: F) -> Result<Value, EvalError>
where
    F: FnOnce(f64, f64) -> Result<f64, EvalError>,
{
    let a = number(op.symbol(), lhs)?;
    let b = number(op.symbol(), rhs)?;
    let result = apply(a, b)?;
    if result.is_finite() {
        Ok(Value::Number(result))
    } else {
        Err(EvalError::NonFinite)
    }
}

fn checked_divisor(b: f64) -> Result<f64, EvalError> {
    if b == 0.0 {
        Err(EvalError::DivisionByZero)
    } else {
        Ok(b)
    }
}

fn number(op: &str, value: &Value) -> Result<f64, EvalError> {
    value.to_number().ok_or_else(|| {
        EvalError::TypeMismatch(format!("'{}' needs numbers, got {} {:?}", op, value.type_name(), value.to_text()))
    })
}

fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Ordering, EvalError> {
    match (lhs, rhs) {
        (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
        _ => {
            let a = number(op.symbol(), lhs)?;
            let b = number(op.symbol(), rhs)?;
            a.partial_cmp(&b).ok_or(EvalError::NonFinite)
        }
    }
}
