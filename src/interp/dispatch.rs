//! Computed dispatch table (§4.3): a `[HandlerFn; 256]` indexed directly
//! by opcode byte, built once via `lazy_static`, the way `bytecode::opcode`
//! builds its own `OPCODE_TABLE`. Slots with no assigned `Opcode` variant
//! are unreachable in practice — `Instruction` only ever carries a typed
//! `Opcode`, never a raw byte — but are filled with a handler that raises
//! `InvalidOpcode` for totality.

use super::{ops, Directive, Interpreter};
use crate::bytecode::Opcode;
use crate::error::EngineError;

pub type HandlerFn = fn(&mut Interpreter, u16, u16) -> Result<Directive, EngineError>;

fn invalid_opcode(_i: &mut Interpreter, _a: u16, _b: u16) -> Result<Directive, EngineError> {
    Err(EngineError::InvalidOpcode(0))
}

macro_rules! dispatch_table {
    ($($variant:ident => $handler:path),* $(,)?) => {
        {
            let mut table: [HandlerFn; Opcode::COUNT] = [invalid_opcode; Opcode::COUNT];
            $(table[Opcode::$variant as usize] = $handler;)*
            table
        }
    };
}

lazy_static::lazy_static! {
    static ref DISPATCH_TABLE: [HandlerFn; Opcode::COUNT] = dispatch_table!(
        Nop => ops::stack::nop,
        PushConst => ops::stack::push_const,
        PushLocal => ops::stack::push_local,
        PushGlobal => ops::stack::push_global,
        Pop => ops::stack::pop,
        Dup => ops::stack::dup,
        Swap => ops::stack::swap,
        PushNull => ops::stack::push_null,
        PushTrue => ops::stack::push_true,
        PushFalse => ops::stack::push_false,
        PushInt0 => ops::stack::push_int0,
        PushInt1 => ops::stack::push_int1,
        StoreLocal => ops::stack::store_local,
        StoreGlobal => ops::stack::store_global,

        AddInt => ops::arith_int::add_int,
        SubInt => ops::arith_int::sub_int,
        MulInt => ops::arith_int::mul_int,
        DivInt => ops::arith_int::div_int,
        ModInt => ops::arith_int::mod_int,
        NegInt => ops::arith_int::neg_int,
        IncInt => ops::arith_int::inc_int,
        DecInt => ops::arith_int::dec_int,
        BitAnd => ops::arith_int::bit_and,
        BitOr => ops::arith_int::bit_or,
        BitXor => ops::arith_int::bit_xor,
        BitNot => ops::arith_int::bit_not,
        Shl => ops::arith_int::shl,
        Shr => ops::arith_int::shr,

        AddFloat => ops::arith_float::add_float,
        SubFloat => ops::arith_float::sub_float,
        MulFloat => ops::arith_float::mul_float,
        DivFloat => ops::arith_float::div_float,
        NegFloat => ops::arith_float::neg_float,
        Sqrt => ops::arith_float::sqrt,

        Eq => ops::compare::eq,
        Neq => ops::compare::neq,
        LtInt => ops::compare::lt_int,
        GtInt => ops::compare::gt_int,
        LtFloat => ops::compare::lt_float,
        GtFloat => ops::compare::gt_float,

        LogicAnd => ops::logic::logic_and,
        LogicOr => ops::logic::logic_or,
        LogicNot => ops::logic::logic_not,

        Jmp => ops::control::jmp,
        Jz => ops::control::jz,
        Jnz => ops::control::jnz,
        Call => ops::control::call,
        CallMethod => ops::control::call_method,
        CallBuiltin => ops::control::call_builtin,
        Ret => ops::control::ret,
        RetVoid => ops::control::ret_void,
        Halt => ops::control::halt,
        LoopStart => ops::control::loop_start,
        LoopEnd => ops::control::loop_end,

        GuardNull => ops::guards::guard_null,
        GuardBool => ops::guards::guard_bool,
        GuardInt => ops::guards::guard_int,
        GuardFloat => ops::guards::guard_float,
        GuardString => ops::guards::guard_string,
        GuardArray => ops::guards::guard_array,
        GuardObject => ops::guards::guard_object,
        GuardStruct => ops::guards::guard_struct,
        GuardClosure => ops::guards::guard_closure,
        GuardResource => ops::guards::guard_resource,

        NewArray => ops::heap_array::new_array,
        ArrayGet => ops::heap_array::array_get,
        ArraySet => ops::heap_array::array_set,
        ArrayPush => ops::heap_array::array_push,
        ArrayPop => ops::heap_array::array_pop,
        ArrayLen => ops::heap_array::array_len,
        ArrayExists => ops::heap_array::array_exists,
        ArrayUnset => ops::heap_array::array_unset,

        NewObject => ops::heap_object::new_object,
        GetProp => ops::heap_object::get_prop,
        SetProp => ops::heap_object::set_prop,
        InstanceOf => ops::heap_object::instance_of,
        Clone => ops::heap_object::clone,

        NewStruct => ops::structs::new_struct,
        StructGet => ops::structs::struct_get,
        StructSet => ops::structs::struct_set,

        ToInt => ops::convert::to_int,
        ToFloat => ops::convert::to_float,
        ToBool => ops::convert::to_bool,
        ToString => ops::convert::to_string,
        IsNull => ops::convert::is_null,
        IsInt => ops::convert::is_int,
        IsFloat => ops::convert::is_float,
        IsString => ops::convert::is_string,
        IsArray => ops::convert::is_array,
        IsObject => ops::convert::is_object,

        Concat => ops::strings::concat,
        Strlen => ops::strings::strlen,

        PassByValue => ops::passing::pass_by_value,
        PassByRef => ops::passing::pass_by_ref,
        PassByCow => ops::passing::pass_by_cow,
        PassByMove => ops::passing::pass_by_move,
        CowCheck => ops::passing::cow_check,
        CowCopy => ops::passing::cow_copy,

        RetMove => ops::control::ret_move,
        RetCow => ops::control::ret_cow,

        DebugBreak => ops::debug::debug_break,
        LineNumber => ops::debug::line_number,
        GcSafepoint => ops::debug::gc_safepoint,
    );
}

pub fn handler_for(opcode: Opcode) -> HandlerFn {
    DISPATCH_TABLE[opcode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_opcode_has_a_non_default_handler() {
        for op in [
            Opcode::Nop,
            Opcode::AddInt,
            Opcode::CallMethod,
            Opcode::GuardInt,
            Opcode::NewArray,
            Opcode::RetCow,
        ] {
            let resolved = handler_for(op);
            assert!(resolved as *const () != invalid_opcode as *const ());
        }
    }
}
