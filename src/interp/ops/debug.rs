//! Debug opcodes (§4.2). `line_number` is redundant with the per-
//! instruction `source_spans` table `CompiledFunction` already carries,
//! but is kept for wire-format parity with the spec's instruction set;
//! `gc_safepoint` is a no-op since this engine has no tracing collector to
//! yield to (§1 non-goal).

use super::super::{Directive, Interpreter};
use crate::error::EngineError;

pub fn debug_break(i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    tracing::debug!(ip = i.frame().ip, "debug_break");
    Ok(Directive::Continue)
}

pub fn line_number(_i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Continue)
}

pub fn gc_safepoint(_i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Ok(Directive::Continue)
}
