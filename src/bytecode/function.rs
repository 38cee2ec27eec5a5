//! Constant pool & compiled function record (§3, §4.2, §6).

use super::opcode::Opcode;
use std::rc::Rc;

/// Fixed 6-byte instruction record: opcode + two 16-bit operands.
/// Branch targets and try-range bounds are absolute indices into the
/// owning function's bytecode vector, never byte offsets (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand1: u16,
    pub operand2: u16,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self { opcode, operand1: 0, operand2: 0 }
    }

    pub fn with1(opcode: Opcode, operand1: u16) -> Self {
        Self { opcode, operand1, operand2: 0 }
    }

    pub fn with2(opcode: Opcode, operand1: u16, operand2: u16) -> Self {
        Self { opcode, operand1, operand2 }
    }
}

/// Constant-pool entry. Same variant set as the runtime `Value`'s scalar
/// half, plus the `FuncRef` variant the wire contract requires for
/// closures and direct function literals (§6).
#[derive(Debug, Clone)]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    FuncRef(u32),
}

/// A compiler-emitted try range: `[start, end)` instructions are guarded;
/// on a catchable error the interpreter unwinds to `catch_addr` if the
/// raised exception's class matches `catch_class` (`None` = catch-all).
/// Mirrors vhp's `ExceptionHandler` (`vm/frame.rs`) with the string-sentinel
/// control flow removed (§7).
#[derive(Debug, Clone)]
pub struct TryRange {
    pub start: usize,
    pub end: usize,
    pub catch_addr: usize,
    pub catch_class: Option<String>,
}

/// Immutable compiled-function record (§3). Registered by the host in two
/// indices: by name and by dense `u16` id (used by `call` opcodes).
#[derive(Debug)]
pub struct CompiledFunction {
    pub name: String,
    pub bytecode: Vec<Instruction>,
    pub constants: Vec<ConstValue>,
    pub parameter_count: u16,
    pub local_slot_count: u16,
    /// Source line per instruction index, for exception descriptors (§7).
    pub source_spans: Vec<u32>,
    pub try_ranges: Vec<TryRange>,
}

impl CompiledFunction {
    pub fn get_constant(&self, index: u16) -> &ConstValue {
        &self.constants[index as usize]
    }

    pub fn line_at(&self, ip: usize) -> u32 {
        self.source_spans.get(ip).copied().unwrap_or(0)
    }

    /// Find the innermost try range covering `ip` whose class filter
    /// matches `thrown_class` (or is catch-all).
    pub fn find_handler(&self, ip: usize, thrown_class: Option<&str>) -> Option<&TryRange> {
        self.try_ranges
            .iter()
            .rev()
            .find(|r| ip >= r.start && ip < r.end && handler_matches(r, thrown_class))
    }
}

fn handler_matches(range: &TryRange, thrown_class: Option<&str>) -> bool {
    match (&range.catch_class, thrown_class) {
        (None, _) => true,
        (Some(c), Some(t)) => c.eq_ignore_ascii_case(t),
        (Some(_), None) => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u16);

/// Registry of compiled functions indexed both by dense id (what `call`
/// opcodes carry) and by name (what the native/reflection layer looks up
/// by), the way vhp's `VM` keeps a `functions: HashMap<String, ..>` plus
/// `Opcode::Call(func_id, argc)`.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    by_id: Vec<Rc<CompiledFunction>>,
    by_name: std::collections::HashMap<String, FunctionId>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, function: CompiledFunction) -> FunctionId {
        let id = FunctionId(self.by_id.len() as u16);
        self.by_name.insert(function.name.clone(), id);
        self.by_id.push(Rc::new(function));
        id
    }

    pub fn get(&self, id: FunctionId) -> Option<&Rc<CompiledFunction>> {
        self.by_id.get(id.0 as usize)
    }

    pub fn get_by_name(&self, name: &str) -> Option<(FunctionId, &Rc<CompiledFunction>)> {
        let id = *self.by_name.get(name)?;
        self.get(id).map(|f| (id, f))
    }
}
