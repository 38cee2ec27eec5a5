//! Argument-passing / COW opcodes (§4.2, §4.1). `pass_by_value i`/
//! `pass_by_ref i`/`pass_by_move i`/`pass_by_cow i` place the top-of-stack
//! into local slot `i` with the named semantics — operand1 is the
//! destination, not a stack-traffic marker. The four differ only in what,
//! if anything, they do to the value before the store; `pass_by_cow`/
//! `cow_check`/`cow_copy` are the load-bearing ones: a real check against
//! the heap handle's ref count (§4.1 "cow_check").

use super::super::{Directive, Interpreter};
use crate::error::EngineError;
use crate::value::Value;

pub fn pass_by_value(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = i.pop_operand()?;
    i.store_local_slot(slot, value)?;
    Ok(Directive::Continue)
}

pub fn pass_by_ref(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = i.pop_operand()?;
    i.store_local_slot(slot, value)?;
    Ok(Directive::Continue)
}

pub fn pass_by_move(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = i.pop_operand()?;
    i.store_local_slot(slot, value)?;
    Ok(Directive::Continue)
}

pub fn pass_by_cow(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = i.pop_operand()?;
    let value = if value.is_shared() { value.deep_clone() } else { value };
    i.store_local_slot(slot, value)?;
    Ok(Directive::Continue)
}

/// Pushes whether the local at `slot` currently aliases another owner,
/// for compiler-emitted code that branches to an explicit `cow_copy`.
pub fn cow_check(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let shared = i.local(slot)?.is_shared();
    i.push_operand(Value::Bool(shared))?;
    Ok(Directive::Continue)
}

pub fn cow_copy(i: &mut Interpreter, slot: u16, _b: u16) -> Result<Directive, EngineError> {
    let copy = i.local(slot)?.deep_clone();
    i.store_local_slot(slot, copy)?;
    Ok(Directive::Continue)
}
