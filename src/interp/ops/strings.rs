//! String opcodes (§4.2).

use super::super::{Directive, Interpreter};
use crate::error::EngineError;
use crate::value::Value;

pub fn concat(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let b = i.pop_operand()?.to_output_string();
    let a = i.pop_operand()?.to_output_string();
    i.push_operand(Value::new_string(a + &b))?;
    Ok(Directive::Continue)
}

pub fn strlen(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let v = i.pop_operand()?;
    i.push_operand(Value::Int(v.to_output_string().len() as i64))?;
    Ok(Directive::Continue)
}
