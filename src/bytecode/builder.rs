//! Bytecode assembly helper.
//!
//! Stands in for the out-of-scope compiler front end (§1) so tests and the
//! example host can build `CompiledFunction`s directly. Mirrors the
//! fluent-emitter shape of vhp's `vm/compiler.rs::Compiler` (an `emit`-style
//! builder tracking a constant pool and current instruction vector) without
//! any AST-walking: callers emit opcodes by hand.

use super::function::{CompiledFunction, ConstValue, Instruction, TryRange};
use super::opcode::Opcode;

pub struct FunctionBuilder {
    name: String,
    bytecode: Vec<Instruction>,
    constants: Vec<ConstValue>,
    parameter_count: u16,
    local_slot_count: u16,
    source_spans: Vec<u32>,
    try_ranges: Vec<TryRange>,
    current_line: u32,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytecode: Vec::new(),
            constants: Vec::new(),
            parameter_count: 0,
            local_slot_count: 0,
            source_spans: Vec::new(),
            try_ranges: Vec::new(),
            current_line: 0,
        }
    }

    pub fn parameters(mut self, count: u16) -> Self {
        self.parameter_count = count;
        self.local_slot_count = self.local_slot_count.max(count);
        self
    }

    pub fn locals(mut self, count: u16) -> Self {
        self.local_slot_count = self.local_slot_count.max(count);
        self
    }

    pub fn line(mut self, line: u32) -> Self {
        self.current_line = line;
        self
    }

    pub fn const_int(&mut self, n: i64) -> u16 {
        self.push_const(ConstValue::Int(n))
    }

    pub fn const_float(&mut self, n: f64) -> u16 {
        self.push_const(ConstValue::Float(n))
    }

    pub fn const_string(&mut self, s: impl Into<String>) -> u16 {
        self.push_const(ConstValue::String(s.into()))
    }

    pub fn const_func_ref(&mut self, id: u32) -> u16 {
        self.push_const(ConstValue::FuncRef(id))
    }

    fn push_const(&mut self, c: ConstValue) -> u16 {
        let idx = self.constants.len() as u16;
        self.constants.push(c);
        idx
    }

    /// Emit an instruction, returning its absolute address (for patching
    /// forward jumps).
    pub fn emit(&mut self, op: Opcode) -> usize {
        self.emit2(op, 0, 0)
    }

    pub fn emit1(&mut self, op: Opcode, operand1: u16) -> usize {
        self.emit2(op, operand1, 0)
    }

    pub fn emit2(&mut self, op: Opcode, operand1: u16, operand2: u16) -> usize {
        let addr = self.bytecode.len();
        self.bytecode.push(Instruction::with2(op, operand1, operand2));
        self.source_spans.push(self.current_line);
        addr
    }

    pub fn here(&self) -> usize {
        self.bytecode.len()
    }

    /// Patch a previously emitted jump's operand1 to point at `target`.
    pub fn patch_target(&mut self, at: usize, target: usize) {
        self.bytecode[at].operand1 = target as u16;
    }

    pub fn try_range(&mut self, start: usize, end: usize, catch_addr: usize, catch_class: Option<&str>) {
        self.try_ranges.push(TryRange {
            start,
            end,
            catch_addr,
            catch_class: catch_class.map(str::to_string),
        });
    }

    pub fn build(self) -> CompiledFunction {
        CompiledFunction {
            name: self.name,
            bytecode: self.bytecode,
            constants: self.constants,
            parameter_count: self.parameter_count,
            local_slot_count: self.local_slot_count,
            source_spans: self.source_spans,
            try_ranges: self.try_ranges,
        }
    }
}
