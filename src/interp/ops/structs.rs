//! Struct opcodes (§4.2). Structs are closed: field count is fixed by the
//! descriptor's declared arity (§3 invariant), so `new_struct` pops exactly
//! that many values and `struct_get`/`struct_set` index by position rather
//! than by name lookup.

use super::super::{Directive, Interpreter};
use crate::error::EngineError;
use crate::value::Value;

fn struct_at(i: &Interpreter, slot: u16) -> Result<std::rc::Rc<std::cell::RefCell<crate::value::StructBox>>, EngineError> {
    match i.local(slot)? {
        Value::StructInstance(s) => Ok(s.clone()),
        other => Err(EngineError::TypeMismatch { expected: "struct", found: other.type_name() }),
    }
}

pub fn new_struct(i: &mut Interpreter, struct_id: u16, _b: u16) -> Result<Directive, EngineError> {
    let descriptor = i
        .struct_descriptor(struct_id as u32)
        .cloned()
        .ok_or_else(|| EngineError::UndefinedStruct(format!("#{struct_id}")))?;
    let arity = descriptor.arity();
    let mut fields = Vec::with_capacity(arity);
    for _ in 0..arity {
        fields.push(i.pop_operand()?);
    }
    fields.reverse();
    i.push_operand(Value::new_struct(descriptor, fields))?;
    Ok(Directive::Continue)
}

pub fn struct_get(i: &mut Interpreter, slot: u16, field_index: u16) -> Result<Directive, EngineError> {
    let s = struct_at(i, slot)?;
    let value = s
        .borrow()
        .fields
        .get(field_index as usize)
        .cloned()
        .ok_or(EngineError::InvalidArrayIndex)?;
    i.push_operand(value)?;
    Ok(Directive::Continue)
}

pub fn struct_set(i: &mut Interpreter, slot: u16, field_index: u16) -> Result<Directive, EngineError> {
    let s = struct_at(i, slot)?;
    let value = i.pop_operand()?;
    let mut s = s.borrow_mut();
    let idx = field_index as usize;
    if idx >= s.fields.len() {
        return Err(EngineError::InvalidArrayIndex);
    }
    s.fields[idx] = value;
    Ok(Directive::Continue)
}
