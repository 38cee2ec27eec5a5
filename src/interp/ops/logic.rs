//! Logic opcodes (§4.2). Operate through `Value::to_bool` so any operand
//! type can feed them, matching PHP's truthiness coercion the teacher's
//! `value_helpers.rs` defines.

use super::super::{Directive, Interpreter};
use crate::error::EngineError;
use crate::value::Value;

pub fn logic_and(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let b = i.pop_operand()?.to_bool();
    let a = i.pop_operand()?.to_bool();
    i.push_operand(Value::Bool(a && b))?;
    Ok(Directive::Continue)
}

pub fn logic_or(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let b = i.pop_operand()?.to_bool();
    let a = i.pop_operand()?.to_bool();
    i.push_operand(Value::Bool(a || b))?;
    Ok(Directive::Continue)
}

pub fn logic_not(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let a = i.pop_operand()?.to_bool();
    i.push_operand(Value::Bool(!a))?;
    Ok(Directive::Continue)
}
