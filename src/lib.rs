//! Bytecode execution engine for a dynamically typed, PHP-flavored
//! scripting language. See the component modules for the value/heap model,
//! bytecode format, request arena, type-feedback collector, inline method
//! cache, native function registry, and the interpreter core that wires
//! them together.

pub mod arena;
pub mod bytecode;
pub mod cache;
pub mod class;
pub mod error;
pub mod feedback;
pub mod interp;
pub mod native;
pub mod value;

pub use error::{EngineError, ExceptionKind, ExceptionObject, NativeError};
pub use interp::{EngineConfig, Interpreter, OutputSink};
