//! Conversion and type-test opcodes (§4.2). Coercions delegate to
//! `Value::to_*`; `is_*` tests compare the popped value's `TypeTag`.

use super::super::{Directive, Interpreter};
use crate::error::EngineError;
use crate::value::{TypeTag, Value};

pub fn to_int(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let v = i.pop_operand()?;
    i.push_operand(Value::Int(v.to_int()))?;
    Ok(Directive::Continue)
}

pub fn to_float(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let v = i.pop_operand()?;
    i.push_operand(Value::Float(v.to_float()))?;
    Ok(Directive::Continue)
}

pub fn to_bool(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let v = i.pop_operand()?;
    i.push_operand(Value::Bool(v.to_bool()))?;
    Ok(Directive::Continue)
}

pub fn to_string(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let v = i.pop_operand()?;
    i.push_operand(Value::new_string(v.to_output_string()))?;
    Ok(Directive::Continue)
}

fn is_tag(i: &mut Interpreter, tag: TypeTag) -> Result<Directive, EngineError> {
    let v = i.pop_operand()?;
    i.push_operand(Value::Bool(v.type_tag() == tag))?;
    Ok(Directive::Continue)
}

pub fn is_null(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    is_tag(i, TypeTag::Null)
}

pub fn is_int(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    is_tag(i, TypeTag::Int)
}

pub fn is_float(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    is_tag(i, TypeTag::Float)
}

pub fn is_string(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    is_tag(i, TypeTag::String)
}

pub fn is_array(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    is_tag(i, TypeTag::Array)
}

pub fn is_object(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    is_tag(i, TypeTag::Object)
}
