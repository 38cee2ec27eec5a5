//! Float arithmetic opcodes (§4.2).

use super::super::{Directive, Interpreter};
use crate::error::EngineError;
use crate::value::Value;

fn pop_floats(i: &mut Interpreter) -> Result<(f64, f64), EngineError> {
    let b = i.pop_operand()?.to_float();
    let a = i.pop_operand()?.to_float();
    Ok((a, b))
}

pub fn add_float(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let (a, b) = pop_floats(i)?;
    i.push_operand(Value::Float(a + b))?;
    Ok(Directive::Continue)
}

pub fn sub_float(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let (a, b) = pop_floats(i)?;
    i.push_operand(Value::Float(a - b))?;
    Ok(Directive::Continue)
}

pub fn mul_float(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let (a, b) = pop_floats(i)?;
    i.push_operand(Value::Float(a * b))?;
    Ok(Directive::Continue)
}

pub fn div_float(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let (a, b) = pop_floats(i)?;
    if b == 0.0 {
        return Err(EngineError::DivisionByZero);
    }
    i.push_operand(Value::Float(a / b))?;
    Ok(Directive::Continue)
}

pub fn neg_float(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let n = i.pop_operand()?.to_float();
    i.push_operand(Value::Float(-n))?;
    Ok(Directive::Continue)
}

pub fn sqrt(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let n = i.pop_operand()?.to_float();
    i.push_operand(Value::Float(n.sqrt()))?;
    Ok(Directive::Continue)
}
