//! Bytecode instruction set (§4.2, §6).
//!
//! The opcode space is dense within `[0, 256)` (§6); `Opcode` is the
//! dispatch table's index type. Organized into the same category comment
//! blocks vhp's own `vm/opcode.rs` uses (stack / arithmetic / comparison /
//! control / heap / ...), but instructions here carry no inline payload —
//! constants and targets live in `Instruction::operand1`/`operand2`, per
//! the spec's fixed 6-byte instruction record.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // ==================== Stack ====================
    Nop = 0,
    PushConst = 1,
    PushLocal = 2,
    PushGlobal = 3,
    Pop = 4,
    Dup = 5,
    Swap = 6,
    PushNull = 7,
    PushTrue = 8,
    PushFalse = 9,
    PushInt0 = 10,
    PushInt1 = 11,
    StoreLocal = 12,
    StoreGlobal = 13,

    // ==================== Integer arithmetic ====================
    AddInt = 20,
    SubInt = 21,
    MulInt = 22,
    DivInt = 23,
    ModInt = 24,
    NegInt = 25,
    IncInt = 26,
    DecInt = 27,
    BitAnd = 28,
    BitOr = 29,
    BitXor = 30,
    BitNot = 31,
    Shl = 32,
    Shr = 33,

    // ==================== Float arithmetic ====================
    AddFloat = 40,
    SubFloat = 41,
    MulFloat = 42,
    DivFloat = 43,
    NegFloat = 44,
    Sqrt = 45,

    // ==================== Comparisons ====================
    Eq = 50,
    Neq = 51,
    LtInt = 52,
    GtInt = 53,
    LtFloat = 54,
    GtFloat = 55,

    // ==================== Logic ====================
    LogicAnd = 60,
    LogicOr = 61,
    LogicNot = 62,

    // ==================== Control ====================
    Jmp = 70,
    Jz = 71,
    Jnz = 72,
    Call = 73,
    CallMethod = 74,
    CallBuiltin = 75,
    Ret = 76,
    RetVoid = 77,
    Halt = 78,
    LoopStart = 79,
    LoopEnd = 80,

    // ==================== Type guards ====================
    GuardNull = 90,
    GuardBool = 91,
    GuardInt = 92,
    GuardFloat = 93,
    GuardString = 94,
    GuardArray = 95,
    GuardObject = 96,
    GuardStruct = 97,
    GuardClosure = 98,
    GuardResource = 99,

    // ==================== Heap: arrays ====================
    NewArray = 110,
    ArrayGet = 111,
    ArraySet = 112,
    ArrayPush = 113,
    ArrayPop = 114,
    ArrayLen = 115,
    ArrayExists = 116,
    ArrayUnset = 117,

    // ==================== Heap: objects ====================
    NewObject = 120,
    GetProp = 121,
    SetProp = 122,
    InstanceOf = 123,
    Clone = 124,

    // ==================== Structs ====================
    NewStruct = 130,
    StructGet = 131,
    StructSet = 132,

    // ==================== Conversions ====================
    ToInt = 140,
    ToFloat = 141,
    ToBool = 142,
    ToString = 143,
    IsNull = 144,
    IsInt = 145,
    IsFloat = 146,
    IsString = 147,
    IsArray = 148,
    IsObject = 149,

    // ==================== String ====================
    Concat = 160,
    Strlen = 161,

    // ==================== Argument passing / COW ====================
    PassByValue = 170,
    PassByRef = 171,
    PassByCow = 172,
    PassByMove = 173,
    CowCheck = 174,
    CowCopy = 175,

    // ==================== Returns ====================
    RetMove = 180,
    RetCow = 181,

    // ==================== Debug ====================
    DebugBreak = 250,
    LineNumber = 251,
    GcSafepoint = 252,
}

impl Opcode {
    pub const COUNT: usize = 256;

    pub fn from_u8(b: u8) -> Option<Opcode> {
        OPCODE_TABLE.get(b as usize).copied().flatten()
    }
}

macro_rules! opcode_table {
    ($($variant:ident),* $(,)?) => {
        {
            let mut table: [Option<Opcode>; 256] = [None; 256];
            $(table[Opcode::$variant as usize] = Some(Opcode::$variant);)*
            table
        }
    };
}

lazy_static::lazy_static! {
    static ref OPCODE_TABLE: [Option<Opcode>; 256] = opcode_table!(
        Nop, PushConst, PushLocal, PushGlobal, Pop, Dup, Swap, PushNull, PushTrue, PushFalse,
        PushInt0, PushInt1, StoreLocal, StoreGlobal,
        AddInt, SubInt, MulInt, DivInt, ModInt, NegInt, IncInt, DecInt, BitAnd, BitOr, BitXor,
        BitNot, Shl, Shr,
        AddFloat, SubFloat, MulFloat, DivFloat, NegFloat, Sqrt,
        Eq, Neq, LtInt, GtInt, LtFloat, GtFloat,
        LogicAnd, LogicOr, LogicNot,
        Jmp, Jz, Jnz, Call, CallMethod, CallBuiltin, Ret, RetVoid, Halt, LoopStart, LoopEnd,
        GuardNull, GuardBool, GuardInt, GuardFloat, GuardString, GuardArray, GuardObject,
        GuardStruct, GuardClosure, GuardResource,
        NewArray, ArrayGet, ArraySet, ArrayPush, ArrayPop, ArrayLen, ArrayExists, ArrayUnset,
        NewObject, GetProp, SetProp, InstanceOf, Clone,
        NewStruct, StructGet, StructSet,
        ToInt, ToFloat, ToBool, ToString, IsNull, IsInt, IsFloat, IsString, IsArray, IsObject,
        Concat, Strlen,
        PassByValue, PassByRef, PassByCow, PassByMove, CowCheck, CowCopy,
        RetMove, RetCow,
        DebugBreak, LineNumber, GcSafepoint,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u8() {
        for op in [Opcode::Nop, Opcode::Call, Opcode::GuardInt, Opcode::RetCow] {
            assert_eq!(Opcode::from_u8(op as u8), Some(op));
        }
    }

    #[test]
    fn unassigned_byte_is_invalid() {
        assert_eq!(Opcode::from_u8(255), None);
    }
}
