//! Stack opcodes (§4.2 "Stack" category): constant/local/global push-pull
//! and the handful of raw stack-shuffling instructions every bytecode
//! program needs (`dup`, `swap`, `pop`).

use super::super::{Directive, Interpreter};
use crate::bytecode::ConstValue;
use crate::error::EngineError;
use crate::value::Value;

pub fn nop(_i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Continue)
}

pub fn push_const(i: &mut Interpreter, index: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = match i.constant(index) {
        ConstValue::Null => Value::Null,
        ConstValue::Bool(b) => Value::Bool(b),
        ConstValue::Int(n) => Value::Int(n),
        ConstValue::Float(n) => Value::Float(n),
        ConstValue::String(s) => Value::new_string(s),
        ConstValue::FuncRef(id) => {
            let function = i
                .functions
                .get(crate::bytecode::FunctionId(id as u16))
                .cloned()
                .ok_or_else(|| EngineError::UndefinedFunction(format!("#{id}")))?;
            Value::Closure(std::rc::Rc::new(crate::value::ClosureBox {
                function,
                captures: Vec::new(),
                bound_this: None,
                marks: std::cell::Cell::new(0),
            }))
        }
    };
    i.push_operand(value)?;
    Ok(Directive::Continue)
}

pub fn push_local(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = i
        .frame()
        .locals
        .get(slot as usize)
        .cloned()
        .ok_or_else(|| EngineError::UndefinedVariable(format!("local#{slot}")))?;
    i.push_operand(value)?;
    Ok(Directive::Continue)
}

pub fn store_local(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = i.pop_operand()?;
    let frame = i.frame_mut();
    let idx = slot as usize;
    if idx >= frame.locals.len() {
        return Err(EngineError::UndefinedVariable(format!("local#{slot}")));
    }
    frame.locals[idx] = value;
    Ok(Directive::Continue)
}

pub fn push_global(i: &mut Interpreter, name_const: u16, _b: u16) -> Result<Directive, EngineError> {
    let name = i.const_string(name_const);
    let value = i.globals.get(&name).cloned().ok_or(EngineError::UndefinedVariable(name))?;
    i.push_operand(value)?;
    Ok(Directive::Continue)
}

pub fn store_global(i: &mut Interpreter, name_const: u16, _b: u16) -> Result<Directive, EngineError> {
    let name = i.const_string(name_const);
    let value = i.pop_operand()?;
    i.globals.insert(name, value);
    Ok(Directive::Continue)
}

pub fn pop(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    i.pop_operand()?;
    Ok(Directive::Continue)
}

pub fn dup(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let top = i.peek_operand()?.clone();
    i.push_operand(top)?;
    Ok(Directive::Continue)
}

pub fn swap(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let b = i.pop_operand()?;
    let a = i.pop_operand()?;
    i.push_operand(b)?;
    i.push_operand(a)?;
    Ok(Directive::Continue)
}

pub fn push_null(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    i.push_operand(Value::Null)?;
    Ok(Directive::Continue)
}

pub fn push_true(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    i.push_operand(Value::Bool(true))?;
    Ok(Directive::Continue)
}

pub fn push_false(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    i.push_operand(Value::Bool(false))?;
    Ok(Directive::Continue)
}

pub fn push_int0(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    i.push_operand(Value::Int(0))?;
    Ok(Directive::Continue)
}

pub fn push_int1(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    i.push_operand(Value::Int(1))?;
    Ok(Directive::Continue)
}
