//! Comparison opcodes (§4.2). `Eq`/`Neq` use loose equality (`Value::
//! loose_eq`, ported from the teacher's `vm/values.rs::compare_values`);
//! the typed `Lt`/`Gt` variants are strict — a non-matching operand tag
//! is a `TypeMismatch`, not a coercion (§4.2, §7 "Type" error kind).

use super::super::{Directive, Interpreter};
use crate::error::EngineError;
use crate::value::Value;

pub fn eq(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let b = i.pop_operand()?;
    let a = i.pop_operand()?;
    i.push_operand(Value::Bool(a.loose_eq(&b)))?;
    Ok(Directive::Continue)
}

pub fn neq(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let b = i.pop_operand()?;
    let a = i.pop_operand()?;
    i.push_operand(Value::Bool(!a.loose_eq(&b)))?;
    Ok(Directive::Continue)
}

fn strict_ints(i: &mut Interpreter) -> Result<(i64, i64), EngineError> {
    let b = i.pop_operand()?;
    let a = i.pop_operand()?;
    match (&a, &b) {
        (Value::Int(a), Value::Int(b)) => Ok((*a, *b)),
        (Value::Int(_), other) => Err(EngineError::TypeMismatch { expected: "int", found: other.type_name() }),
        (other, _) => Err(EngineError::TypeMismatch { expected: "int", found: other.type_name() }),
    }
}

fn strict_floats(i: &mut Interpreter) -> Result<(f64, f64), EngineError> {
    let b = i.pop_operand()?;
    let a = i.pop_operand()?;
    match (&a, &b) {
        (Value::Float(a), Value::Float(b)) => Ok((*a, *b)),
        (Value::Float(_), other) => Err(EngineError::TypeMismatch { expected: "float", found: other.type_name() }),
        (other, _) => Err(EngineError::TypeMismatch { expected: "float", found: other.type_name() }),
    }
}

pub fn lt_int(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let (a, b) = strict_ints(i)?;
    i.push_operand(Value::Bool(a < b))?;
    Ok(Directive::Continue)
}

pub fn gt_int(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let (a, b) = strict_ints(i)?;
    i.push_operand(Value::Bool(a > b))?;
    Ok(Directive::Continue)
}

pub fn lt_float(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let (a, b) = strict_floats(i)?;
    i.push_operand(Value::Bool(a < b))?;
    Ok(Directive::Continue)
}

pub fn gt_float(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let (a, b) = strict_floats(i)?;
    i.push_operand(Value::Bool(a > b))?;
    Ok(Directive::Continue)
}
