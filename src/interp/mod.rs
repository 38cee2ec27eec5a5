//! Interpreter Core (§4.3).
//!
//! Dispatch is a genuine `[HandlerFn; 256]` table, replacing the teacher's
//! `execute_opcode` single big `match` (`vm/execution.rs`) with the
//! computed-dispatch contract. Each handler has signature
//! `fn(&mut Interpreter, u16, u16) -> Result<Directive, EngineError>`;
//! `Directive` replaces the teacher's `__RETURN__`/`__BREAK__`/
//! `__CONTINUE__` string-sentinel hack with a typed enum. `CallFrame`
//! follows the teacher's `vm/frame.rs` shape (function, ip, locals) minus
//! the PHP-specific `saved_globals`/`called_class` fields, which belong to
//! a compiler front end rather than the core VM.

mod dispatch;
mod ops;

use crate::arena::{GlobalHeap, RequestArena};
use crate::bytecode::{CompiledFunction, ConstValue, FunctionId, FunctionRegistry};
use crate::cache::InlineMethodCache;
use crate::class::{ClassDescriptor, StructDescriptor};
use crate::error::{EngineError, ExceptionObject};
use crate::feedback::TypeFeedbackCollector;
use crate::native::NativeRegistry;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

pub use dispatch::HandlerFn;

/// Control signal an opcode handler hands back to the dispatch loop
/// (§4.3): continue to the next instruction, jump to an absolute address
/// in the current frame, or unwind the current frame with a value.
#[derive(Debug)]
pub enum Directive {
    Continue,
    Jump(usize),
    Return(Value),
}

/// Stack/frame capacities and arena sizing, with the teacher's
/// `VM::new`-with-defaults constructor style rather than an external
/// config-file format (no host config parser is in scope here).
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub operand_stack_capacity: usize,
    pub frame_stack_capacity: usize,
    pub inline_cache_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            operand_stack_capacity: 65_536,
            frame_stack_capacity: 1_024,
            inline_cache_width: 4,
        }
    }
}

/// Append-only host output sink (§6), generalizing the teacher's
/// `VM<W: Write>` type parameter into a trait object so `Interpreter`
/// itself needn't be generic over every embedder.
pub trait OutputSink {
    fn write(&mut self, text: &str);
}

/// An `OutputSink` that discards everything, for tests that only care
/// about the returned `Value`.
#[derive(Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write(&mut self, _text: &str) {}
}

/// An `OutputSink` that accumulates into a `String`, for tests that assert
/// on printed output.
#[derive(Default)]
pub struct StringSink(pub String);

impl OutputSink for StringSink {
    fn write(&mut self, text: &str) {
        self.0.push_str(text);
    }
}

struct CallFrame {
    function: Rc<CompiledFunction>,
    ip: usize,
    locals: Vec<Value>,
    return_ip: usize,
    /// Operand stack depth at the moment this frame was pushed — the low-
    /// water mark a return or exception unwind truncates back to, so a
    /// discarded frame's leftover temporaries never leak into the caller's
    /// view of the stack (§7 "operand stack at the handler entry has
    /// exactly one entry").
    operand_base: usize,
}

pub struct Interpreter {
    config: EngineConfig,
    operand_stack: Vec<Value>,
    frames: Vec<CallFrame>,
    globals: HashMap<String, Value>,
    pub functions: FunctionRegistry,
    classes: HashMap<u32, Rc<ClassDescriptor>>,
    structs: HashMap<u32, Rc<StructDescriptor>>,
    pub arena: RequestArena,
    pub global_heap: GlobalHeap,
    pub feedback: TypeFeedbackCollector,
    cache: InlineMethodCache,
    natives: NativeRegistry,
    output: Box<dyn OutputSink>,
    last_exception: Option<ExceptionObject>,
}

impl Interpreter {
    pub fn new(config: EngineConfig, output: Box<dyn OutputSink>) -> Self {
        Self {
            config,
            operand_stack: Vec::with_capacity(64),
            frames: Vec::with_capacity(16),
            globals: HashMap::new(),
            functions: FunctionRegistry::new(),
            classes: HashMap::new(),
            structs: HashMap::new(),
            arena: RequestArena::new(),
            global_heap: GlobalHeap::new(),
            feedback: TypeFeedbackCollector::new(),
            cache: InlineMethodCache::new(),
            natives: NativeRegistry::new(),
            output,
            last_exception: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn register_class(&mut self, class: Rc<ClassDescriptor>) {
        self.classes.insert(class.id, class);
    }

    pub fn register_struct(&mut self, s: Rc<StructDescriptor>) {
        self.structs.insert(s.id, s);
    }

    pub fn class(&self, id: u32) -> Option<&Rc<ClassDescriptor>> {
        self.classes.get(&id)
    }

    pub fn struct_descriptor(&self, id: u32) -> Option<&Rc<StructDescriptor>> {
        self.structs.get(&id)
    }

    /// Invoke `native_function_invalidate_class` semantics when a class's
    /// method table is rebound at runtime (§4.6 invalidation ordering).
    pub fn invalidate_class_cache(&mut self, class_id: u32) {
        self.cache.invalidate_class(class_id);
    }

    /// Run `function_id` with `args` as a fresh top-level call, driving the
    /// dispatch loop until the outermost frame returns or a fatal/uncaught
    /// error propagates (§4.3).
    pub fn call(&mut self, function_id: FunctionId, args: Vec<Value>) -> Result<Value, EngineError> {
        let function = self
            .functions
            .get(function_id)
            .cloned()
            .ok_or(EngineError::UndefinedFunction(format!("#{}", function_id.0)))?;
        self.push_frame(function, args, 0)?;
        self.run()
    }

    fn push_frame(&mut self, function: Rc<CompiledFunction>, args: Vec<Value>, return_ip: usize) -> Result<(), EngineError> {
        if self.frames.len() >= self.config.frame_stack_capacity {
            return Err(EngineError::FrameStackOverflow);
        }
        let mut locals = vec![Value::Null; function.local_slot_count as usize];
        for (slot, arg) in locals.iter_mut().zip(args) {
            *slot = arg;
        }
        let operand_base = self.operand_stack.len();
        self.frames.push(CallFrame { function, ip: 0, locals, return_ip, operand_base });
        Ok(())
    }

    fn push_operand(&mut self, value: Value) -> Result<(), EngineError> {
        if self.operand_stack.len() >= self.config.operand_stack_capacity {
            return Err(EngineError::StackOverflow);
        }
        self.operand_stack.push(value);
        Ok(())
    }

    fn pop_operand(&mut self) -> Result<Value, EngineError> {
        self.operand_stack.pop().ok_or(EngineError::StackUnderflow)
    }

    fn peek_operand(&self) -> Result<&Value, EngineError> {
        self.operand_stack.last().ok_or(EngineError::StackUnderflow)
    }

    fn frame(&self) -> &CallFrame {
        self.frames.last().expect("dispatch loop always holds a frame")
    }

    fn frame_mut(&mut self) -> &mut CallFrame {
        self.frames.last_mut().expect("dispatch loop always holds a frame")
    }

    fn local(&self, slot: u16) -> Result<&Value, EngineError> {
        self.frame()
            .locals
            .get(slot as usize)
            .ok_or_else(|| EngineError::UndefinedVariable(format!("local#{slot}")))
    }

    fn store_local_slot(&mut self, slot: u16, value: Value) -> Result<(), EngineError> {
        let frame = self.frame_mut();
        let idx = slot as usize;
        if idx >= frame.locals.len() {
            return Err(EngineError::UndefinedVariable(format!("local#{slot}")));
        }
        frame.locals[idx] = value;
        Ok(())
    }

    fn current_line(&self) -> u32 {
        let frame = self.frame();
        frame.function.line_at(frame.ip)
    }

    fn constant(&self, index: u16) -> ConstValue {
        self.frame().function.get_constant(index).clone()
    }

    fn const_string(&self, index: u16) -> String {
        match self.constant(index) {
            ConstValue::String(s) => s,
            other => format!("{:?}", other),
        }
    }

    pub fn print(&mut self, text: &str) {
        self.output.write(text);
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    pub fn operand_stack_len(&self) -> usize {
        self.operand_stack.len()
    }

    /// Number of distinct classes currently cached for `name` in the
    /// inline method cache — exposed for introspection/tests (§4.6).
    pub fn inline_cache_depth(&self, name: &str) -> usize {
        self.cache.entry_count(name)
    }

    pub fn inline_cache_hits(&self, name: &str, class_id: u32) -> Option<u64> {
        self.cache.hit_count(name, class_id)
    }

    /// The dispatch loop proper (§4.3). Runs until the outermost frame
    /// returns a value, an exception unwinds past every try-range, or a
    /// fatal error is raised.
    fn run(&mut self) -> Result<Value, EngineError> {
        loop {
            let (opcode, operand1, operand2) = {
                let frame = self.frame();
                match frame.function.bytecode.get(frame.ip) {
                    Some(instr) => (instr.opcode, instr.operand1, instr.operand2),
                    None => (crate::bytecode::Opcode::RetVoid, 0, 0),
                }
            };
            let handler = dispatch::handler_for(opcode);
            match handler(self, operand1, operand2) {
                Ok(Directive::Continue) => {
                    self.frame_mut().ip += 1;
                }
                Ok(Directive::Jump(target)) => {
                    self.frame_mut().ip = target;
                }
                Ok(Directive::Return(value)) => {
                    let finished = self.frames.pop().expect("return always has a frame");
                    self.operand_stack.truncate(finished.operand_base);
                    if self.frames.is_empty() {
                        return Ok(value);
                    }
                    self.push_operand(value)?;
                    self.frame_mut().ip = finished.return_ip;
                }
                Err(err) => {
                    if err.is_fatal() {
                        return Err(err);
                    }
                    let line = self.current_line();
                    let exc = err.into_exception(line);
                    if !self.unwind_to_handler(&exc) {
                        return Err(EngineError::Uncaught(exc));
                    }
                }
            }
        }
    }

    /// Search frames innermost-out for a try range covering the current ip
    /// whose class filter matches `exc.kind`'s debug name (this engine has
    /// no user-defined exception-class hierarchy, so the kind tag doubles
    /// as the catch-class key), truncating to that frame and resuming at
    /// its catch address (§7).
    fn unwind_to_handler(&mut self, exc: &ExceptionObject) -> bool {
        let kind_name = format!("{:?}", exc.kind);
        for depth in (0..self.frames.len()).rev() {
            let frame = &self.frames[depth];
            if let Some(range) = frame.function.find_handler(frame.ip, Some(&kind_name)) {
                let catch_addr = range.catch_addr;
                let operand_base = frame.operand_base;
                self.frames.truncate(depth + 1);
                self.operand_stack.truncate(operand_base);
                self.operand_stack.push(Value::new_string(exc.to_string()));
                self.last_exception = Some(exc.clone());
                self.frame_mut().ip = catch_addr;
                return true;
            }
        }
        false
    }

    pub fn take_last_exception(&mut self) -> Option<ExceptionObject> {
        self.last_exception.take()
    }

    fn cache_lookup(&mut self, name: &str, class_id: u32) -> crate::cache::Lookup {
        self.cache.lookup(name, class_id)
    }

    fn cache_populate(&mut self, name: &str, class_id: u32, method_ref: Rc<CompiledFunction>) {
        self.cache.populate(name, class_id, method_ref)
    }

    fn call_native(&mut self, name: &str, args: &[Value]) -> Result<Value, EngineError> {
        self.natives.call(name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{CompiledFunction, Instruction, Opcode, TryRange};
    use crate::error::ExceptionKind;

    fn function_with_try_range() -> Rc<CompiledFunction> {
        Rc::new(CompiledFunction {
            name: "f".to_string(),
            bytecode: vec![Instruction::new(Opcode::Nop), Instruction::new(Opcode::RetVoid)],
            constants: Vec::new(),
            parameter_count: 0,
            local_slot_count: 0,
            source_spans: vec![0, 0],
            try_ranges: vec![TryRange { start: 0, end: 1, catch_addr: 1, catch_class: Some("Arithmetic".to_string()) }],
        })
    }

    #[test]
    fn unwind_leaves_exactly_the_exception_value_on_the_operand_stack() {
        let mut i = Interpreter::new(EngineConfig::default(), Box::new(NullSink));
        i.push_frame(function_with_try_range(), vec![], 0).unwrap();
        // simulate leftover temporaries from the guarded instruction
        i.push_operand(Value::Int(1)).unwrap();
        i.push_operand(Value::Int(2)).unwrap();
        i.push_operand(Value::Int(3)).unwrap();

        let exc = ExceptionObject { kind: ExceptionKind::Arithmetic, message: "division by zero".to_string(), line: 1 };
        assert!(i.unwind_to_handler(&exc));

        assert_eq!(i.operand_stack_len(), 1);
        assert_eq!(i.frames.last().unwrap().ip, 1);
        assert_eq!(i.pop_operand().unwrap().to_output_string(), exc.to_string());
    }
}
