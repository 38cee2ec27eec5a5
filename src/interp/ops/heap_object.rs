//! Object opcodes (§4.2 "Heap: objects"). Receiver addressed via local
//! slot, property name via a constant-pool string index — properties are
//! named at compile time, unlike array keys, so there is no dynamic-key
//! stack operand to thread through.
//!
//! §4.1 puts objects under the same COW contract as arrays, so `set_prop`
//! goes through `object_at_for_mutation` the same way array mutators go
//! through `array_at_for_mutation` — a shared receiver is deep-copied and
//! the local rewritten before the write lands.

use super::super::{Directive, Interpreter};
use crate::error::EngineError;
use crate::value::Value;

fn object_at(i: &Interpreter, slot: u16) -> Result<std::rc::Rc<std::cell::RefCell<crate::value::ObjectBox>>, EngineError> {
    match i.local(slot)? {
        Value::Object(o) => Ok(o.clone()),
        other => Err(EngineError::TypeMismatch { expected: "object", found: other.type_name() }),
    }
}

fn object_at_for_mutation(i: &mut Interpreter, slot: u16) -> Result<std::rc::Rc<std::cell::RefCell<crate::value::ObjectBox>>, EngineError> {
    let is_shared = match i.local(slot)? {
        Value::Object(o) => std::rc::Rc::strong_count(o) > 1,
        other => return Err(EngineError::TypeMismatch { expected: "object", found: other.type_name() }),
    };
    if is_shared {
        let copy = match i.local(slot)? {
            Value::Object(o) => o.borrow().deep_clone(),
            _ => unreachable!(),
        };
        let fresh = std::rc::Rc::new(std::cell::RefCell::new(copy));
        i.store_local_slot(slot, Value::Object(fresh.clone()))?;
        return Ok(fresh);
    }
    object_at(i, slot)
}

pub fn new_object(i: &mut Interpreter, class_id: u16, _b: u16) -> Result<Directive, EngineError> {
    let class = i
        .class(class_id as u32)
        .cloned()
        .ok_or_else(|| EngineError::UndefinedClass(format!("#{class_id}")))?;
    i.push_operand(Value::new_object(class))?;
    Ok(Directive::Continue)
}

pub fn get_prop(i: &mut Interpreter, slot: u16, name_const: u16) -> Result<Directive, EngineError> {
    let name = i.const_string(name_const);
    let obj = object_at(i, slot)?;
    let value = obj.borrow().get_prop(&name).cloned().unwrap_or(Value::Null);
    i.push_operand(value)?;
    Ok(Directive::Continue)
}

pub fn set_prop(i: &mut Interpreter, slot: u16, name_const: u16) -> Result<Directive, EngineError> {
    let name = i.const_string(name_const);
    let value = i.pop_operand()?;
    let obj = object_at_for_mutation(i, slot)?;
    obj.borrow_mut().set_prop(&name, value);
    Ok(Directive::Continue)
}

pub fn instance_of(i: &mut Interpreter, slot: u16, name_const: u16) -> Result<Directive, EngineError> {
    let name = i.const_string(name_const);
    let obj = object_at(i, slot)?;
    let is = obj.borrow().class.is_instance_of(&name);
    i.push_operand(Value::Bool(is))?;
    Ok(Directive::Continue)
}

pub fn clone(i: &mut Interpreter, src_slot: u16, dest_slot: u16) -> Result<Directive, EngineError> {
    let copy = i.local(src_slot)?.deep_clone();
    i.store_local_slot(dest_slot, copy)?;
    Ok(Directive::Continue)
}
