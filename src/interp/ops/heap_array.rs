//! Array opcodes (§4.2 "Heap: arrays"). The container lives in a local
//! slot (`operand1`); the key or pushed value, where dynamic, comes off
//! the operand stack. This keeps array mutation addressed the way
//! `store_local`/`push_local` already address locals, instead of
//! round-tripping the array handle itself through the stack on every
//! access.
//!
//! Every mutator (`array_set`/`array_push`/`array_pop`/`array_unset`) goes
//! through `array_at_for_mutation`, which copies the array out from under a
//! shared handle before writing to it. This is the same COW duty
//! `cow_check`/`cow_copy` perform explicitly (§4.1) — here it runs
//! unconditionally so a compiler that skips that hoist still gets a
//! correct result.

use super::super::{Directive, Interpreter};
use crate::error::EngineError;
use crate::value::{ArrayKey, Value};

fn array_at(i: &Interpreter, slot: u16) -> Result<std::rc::Rc<std::cell::RefCell<crate::value::ArrayBox>>, EngineError> {
    match i.local(slot)? {
        Value::Array(a) => Ok(a.clone()),
        other => Err(EngineError::TypeMismatch { expected: "array", found: other.type_name() }),
    }
}

/// Like `array_at`, but for opcodes that mutate the array: if the local's
/// handle is shared with another owner, deep-copies it into a fresh array
/// and rewrites the local *before* returning, so the mutation never aliases
/// into someone else's view. This makes COW correctness independent of
/// whether the compiler already hoisted a `cow_check`/`cow_copy` pair
/// (§4.1) — the interpreter enforces it itself.
fn array_at_for_mutation(i: &mut Interpreter, slot: u16) -> Result<std::rc::Rc<std::cell::RefCell<crate::value::ArrayBox>>, EngineError> {
    let is_shared = match i.local(slot)? {
        Value::Array(a) => std::rc::Rc::strong_count(a) > 1,
        other => return Err(EngineError::TypeMismatch { expected: "array", found: other.type_name() }),
    };
    if is_shared {
        let copy = match i.local(slot)? {
            Value::Array(a) => a.borrow().deep_clone(),
            _ => unreachable!(),
        };
        let fresh = std::rc::Rc::new(std::cell::RefCell::new(copy));
        i.store_local_slot(slot, Value::Array(fresh.clone()))?;
        return Ok(fresh);
    }
    array_at(i, slot)
}

pub fn new_array(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    i.push_operand(Value::new_array(Vec::new()))?;
    Ok(Directive::Continue)
}

pub fn array_get(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let arr = array_at(i, slot)?;
    let key_value = i.pop_operand()?;
    let key = ArrayKey::from_value(&key_value);
    let result = arr.borrow().get(&key).cloned().unwrap_or(Value::Null);
    i.push_operand(result)?;
    Ok(Directive::Continue)
}

pub fn array_set(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = i.pop_operand()?;
    let key_value = i.pop_operand()?;
    let key = ArrayKey::from_value(&key_value);
    let arr = array_at_for_mutation(i, slot)?;
    arr.borrow_mut().set(key, value);
    Ok(Directive::Continue)
}

pub fn array_push(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = i.pop_operand()?;
    let arr = array_at_for_mutation(i, slot)?;
    arr.borrow_mut().push(value);
    Ok(Directive::Continue)
}

pub fn array_pop(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let arr = array_at_for_mutation(i, slot)?;
    let popped = {
        let mut arr = arr.borrow_mut();
        arr.entries.pop().map(|(_, v)| v)
    };
    i.push_operand(popped.unwrap_or(Value::Null))?;
    Ok(Directive::Continue)
}

pub fn array_len(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let arr = array_at(i, slot)?;
    let len = arr.borrow().entries.len() as i64;
    i.push_operand(Value::Int(len))?;
    Ok(Directive::Continue)
}

pub fn array_exists(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let arr = array_at(i, slot)?;
    let key_value = i.pop_operand()?;
    let key = ArrayKey::from_value(&key_value);
    let exists = arr.borrow().find(&key).is_some();
    i.push_operand(Value::Bool(exists))?;
    Ok(Directive::Continue)
}

pub fn array_unset(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let key_value = i.pop_operand()?;
    let key = ArrayKey::from_value(&key_value);
    let arr = array_at_for_mutation(i, slot)?;
    arr.borrow_mut().unset(&key);
    Ok(Directive::Continue)
}
