//! Engine error kinds (§7).
//!
//! `EngineError` replaces the teacher's `Result<_, String>` plus magic
//! `"__RETURN__"`/`"__BREAK__"` prefixed strings (vhp's `vm/execution.rs`)
//! with a typed enum. Stack/dispatch/allocation errors are fatal and unwind
//! to the root frame; everything else becomes an `ExceptionObject` raised
//! through the exception channel and catchable by a try-range.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("operand stack overflow")]
    StackOverflow,
    #[error("operand stack underflow")]
    StackUnderflow,
    #[error("frame stack overflow")]
    FrameStackOverflow,
    #[error("invalid opcode {0}")]
    InvalidOpcode(u8),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("undefined function {0}")]
    UndefinedFunction(String),
    #[error("undefined variable {0}")]
    UndefinedVariable(String),
    #[error("undefined class {0}")]
    UndefinedClass(String),
    #[error("undefined method {class}::{method}")]
    UndefinedMethod { class: String, method: String },
    #[error("undefined struct {0}")]
    UndefinedStruct(String),
    #[error("null pointer access")]
    NullPointerAccess,
    #[error("invalid array index")]
    InvalidArrayIndex,
    #[error("out of memory")]
    OutOfMemory,
    #[error("argument count mismatch for {name}: expected {min}..={max}, got {got}")]
    ArgumentCountMismatch {
        name: String,
        min: usize,
        max: usize,
        got: usize,
    },
    #[error("uncaught exception: {0}")]
    Uncaught(ExceptionObject),
}

/// Kind tag carried by a raised exception, per §7's "descriptor containing
/// kind, message, and the source span".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    Type,
    Arithmetic,
    NameResolution,
    Access,
    Arity,
    Native,
    UserThrown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionObject {
    pub kind: ExceptionKind,
    pub message: String,
    pub line: u32,
}

impl std::fmt::Display for ExceptionObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {} (line {})", self.kind, self.message, self.line)
    }
}

impl EngineError {
    /// Fatal errors unwind to the root frame and are surfaced to the host
    /// directly rather than going through the catchable exception channel.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::StackOverflow
                | EngineError::StackUnderflow
                | EngineError::FrameStackOverflow
                | EngineError::InvalidOpcode(_)
                | EngineError::OutOfMemory
        )
    }

    /// Convert a non-fatal error into the exception object raised on the
    /// engine's exception channel.
    pub fn into_exception(self, line: u32) -> ExceptionObject {
        if let EngineError::Uncaught(exc) = self {
            return exc;
        }
        let kind = match &self {
            EngineError::TypeMismatch { .. } => ExceptionKind::Type,
            EngineError::DivisionByZero | EngineError::ModuloByZero => ExceptionKind::Arithmetic,
            EngineError::UndefinedFunction(_)
            | EngineError::UndefinedVariable(_)
            | EngineError::UndefinedClass(_)
            | EngineError::UndefinedMethod { .. }
            | EngineError::UndefinedStruct(_) => ExceptionKind::NameResolution,
            EngineError::NullPointerAccess | EngineError::InvalidArrayIndex => ExceptionKind::Access,
            EngineError::ArgumentCountMismatch { .. } => ExceptionKind::Arity,
            EngineError::Uncaught(_) => unreachable!(),
            _ => ExceptionKind::Native,
        };
        ExceptionObject {
            kind,
            message: self.to_string(),
            line,
        }
    }
}

/// Errors a native handler can raise (§6 native ABI).
#[derive(Debug, Clone, PartialEq)]
pub struct NativeError {
    pub kind: ExceptionKind,
    pub message: String,
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { kind: ExceptionKind::Native, message: message.into() }
    }
}
