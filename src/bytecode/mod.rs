//! Constant Pool & Bytecode (spec §4.2, §6).

pub mod builder;
pub mod function;
pub mod opcode;

pub use builder::FunctionBuilder;
pub use function::{CompiledFunction, ConstValue, FunctionId, FunctionRegistry, Instruction, TryRange};
pub use opcode::Opcode;
