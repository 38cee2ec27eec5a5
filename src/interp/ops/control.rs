//! Control opcodes (§4.2): jumps, calls, returns. `call`/`call_method`
//! push a new `CallFrame` and hand back `Directive::Jump(0)` to pin the
//! callee's ip at its first instruction without the generic `Continue`
//! increment; `Ret*` variants hand back `Directive::Return`, and the
//! dispatch loop in `interp::run` is what actually pops the frame and
//! resumes the caller at its stored `return_ip` — this split keeps every
//! handler here a plain, frame-count-agnostic function.

use super::super::{Directive, Interpreter};
use crate::bytecode::FunctionId;
use crate::cache::Lookup;
use crate::error::EngineError;
use crate::value::Value;

pub fn jmp(_i: &mut Interpreter, target: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Jump(target as usize))
}

pub fn jz(i: &mut Interpreter, target: u16, _b: u16) -> Result<Directive, EngineError> {
    let cond = i.pop_operand()?;
    if cond.to_bool() {
        Ok(Directive::Continue)
    } else {
        Ok(Directive::Jump(target as usize))
    }
}

pub fn jnz(i: &mut Interpreter, target: u16, _b: u16) -> Result<Directive, EngineError> {
    let cond = i.pop_operand()?;
    if cond.to_bool() {
        Ok(Directive::Jump(target as usize))
    } else {
        Ok(Directive::Continue)
    }
}

fn pop_args(i: &mut Interpreter, argc: u16) -> Result<Vec<Value>, EngineError> {
    let mut args = Vec::with_capacity(argc as usize);
    for _ in 0..argc {
        args.push(i.pop_operand()?);
    }
    args.reverse();
    Ok(args)
}

pub fn call(i: &mut Interpreter, func_id: u16, argc: u16) -> Result<Directive, EngineError> {
    let args = pop_args(i, argc)?;
    let function = i
        .functions
        .get(FunctionId(func_id))
        .cloned()
        .ok_or_else(|| EngineError::UndefinedFunction(format!("#{func_id}")))?;
    let return_ip = i.frame().ip + 1;
    i.push_frame(function, args, return_ip)?;
    Ok(Directive::Jump(0))
}

/// Dispatch a method call through the inline cache (§4.6): `args[0]` is
/// the receiver (callers push it first); on a cache miss the class's
/// method chain is walked and the result is cached for next time.
pub fn call_method(i: &mut Interpreter, name_const: u16, argc: u16) -> Result<Directive, EngineError> {
    let name = i.const_string(name_const);
    let args = pop_args(i, argc)?;
    let receiver = args
        .first()
        .ok_or(EngineError::ArgumentCountMismatch { name: name.clone(), min: 1, max: u16::MAX as usize, got: 0 })?;
    let class_id = match receiver {
        Value::Object(o) => o.borrow().class.id,
        other => return Err(EngineError::TypeMismatch { expected: "object", found: other.type_name() }),
    };
    let method = match i.cache_lookup(&name, class_id) {
        Lookup::Hit(f) => f,
        Lookup::Miss => {
            let class = i.class(class_id).cloned().ok_or(EngineError::UndefinedClass(format!("#{class_id}")))?;
            let resolved = class
                .resolve_method(&name)
                .ok_or_else(|| EngineError::UndefinedMethod { class: class.name.clone(), method: name.clone() })?;
            i.cache_populate(&name, class_id, resolved.clone());
            resolved
        }
    };
    let return_ip = i.frame().ip + 1;
    i.push_frame(method, args, return_ip)?;
    Ok(Directive::Jump(0))
}

pub fn call_builtin(i: &mut Interpreter, name_const: u16, argc: u16) -> Result<Directive, EngineError> {
    let name = i.const_string(name_const);
    let args = pop_args(i, argc)?;
    let result = i.call_native(&name, &args)?;
    i.push_operand(result)?;
    Ok(Directive::Continue)
}

pub fn ret(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Return(i.pop_operand()?))
}

pub fn ret_void(_i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Return(Value::Null))
}

pub fn ret_move(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Return(i.pop_operand()?))
}

/// COW-aware return (§4.1): if the returned heap value is shared with a
/// local/caller reference, deep-copy it first so the caller gets an
/// independent value instead of an alias into the callee's frame.
pub fn ret_cow(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    let value = i.pop_operand()?;
    let value = if value.is_shared() { value.deep_clone() } else { value };
    Ok(Directive::Return(value))
}

pub fn halt(_i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Return(Value::Null))
}

/// `loop_start`/`loop_end` are markers a future JIT tier would use to
/// count back-edge iterations; this engine has no such tier (§1 non-goal),
/// so they are no-ops.
pub fn loop_start(_i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Continue)
}

pub fn loop_end(_i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Continue)
}
