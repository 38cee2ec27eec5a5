//! End-to-end interpreter scenarios built directly through the bytecode
//! builder API, in place of a compiler front end.

use crabvm::arena::GlobalHeap;
use crabvm::bytecode::{FunctionBuilder, Opcode};
use crabvm::class::ClassDescriptor;
use crabvm::interp::{EngineConfig, Interpreter, NullSink};
use crabvm::value::{ArrayKey, Value};
use std::rc::Rc;

fn fresh_interpreter() -> Interpreter {
    Interpreter::new(EngineConfig::default(), Box::new(NullSink))
}

#[test]
fn sum_to_n() {
    let mut interp = fresh_interpreter();

    let mut b = FunctionBuilder::new("sum_to_n").locals(3);
    let loop_addr = b.here();
    b.emit1(Opcode::PushLocal, 1); // i
    b.emit1(Opcode::PushLocal, 0); // n
    b.emit(Opcode::LtInt);
    let jz_at = b.emit1(Opcode::Jz, 0);
    b.emit1(Opcode::PushLocal, 2); // acc
    b.emit1(Opcode::PushLocal, 1); // i
    b.emit(Opcode::AddInt);
    b.emit1(Opcode::StoreLocal, 2);
    b.emit1(Opcode::IncInt, 1);
    b.emit1(Opcode::Jmp, loop_addr as u16);
    let end_addr = b.here();
    b.patch_target(jz_at, end_addr);
    b.emit1(Opcode::PushLocal, 2);
    b.emit(Opcode::Ret);

    let id = interp.functions.register(b.build());
    let result = interp
        .call(id, vec![Value::Int(10), Value::Int(0), Value::Int(0)])
        .expect("sum_to_n should not raise");
    assert_eq!(result.to_int(), 45);
}

#[test]
fn array_build_and_sum() {
    let mut interp = fresh_interpreter();

    let mut b = FunctionBuilder::new("array_build_and_sum").locals(1);
    b.emit(Opcode::NewArray);
    b.emit1(Opcode::StoreLocal, 0);

    for (key, val) in [("a", 1i64), ("b", 2), ("c", 3)] {
        let key_c = b.const_string(key);
        let val_c = b.const_int(val);
        b.emit1(Opcode::PushConst, key_c);
        b.emit1(Opcode::PushConst, val_c);
        b.emit1(Opcode::ArraySet, 0);
    }

    b.emit1(Opcode::PushLocal, 0);
    let arr_name = b.const_string("arr");
    b.emit1(Opcode::StoreGlobal, arr_name);

    let key_a = b.const_string("a");
    let key_b = b.const_string("b");
    let key_c = b.const_string("c");
    b.emit1(Opcode::PushConst, key_a);
    b.emit1(Opcode::ArrayGet, 0);
    b.emit1(Opcode::PushConst, key_b);
    b.emit1(Opcode::ArrayGet, 0);
    b.emit(Opcode::AddInt);
    b.emit1(Opcode::PushConst, key_c);
    b.emit1(Opcode::ArrayGet, 0);
    b.emit(Opcode::AddInt);
    b.emit(Opcode::Ret);

    let id = interp.functions.register(b.build());
    let result = interp.call(id, vec![]).expect("array_build_and_sum should not raise");
    assert_eq!(result.to_int(), 6);

    let arr = match interp.global("arr").expect("arr global set") {
        Value::Array(a) => a.clone(),
        other => panic!("expected array, got {other:?}"),
    };
    let arr = arr.borrow();
    assert_eq!(arr.entries.len(), 3);
    let keys: Vec<String> = arr.entries.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn method_dispatch_warms_the_inline_cache() {
    let mut interp = fresh_interpreter();

    let mut inc = FunctionBuilder::new("Counter::inc").locals(1);
    let count_prop = inc.const_string("count");
    inc.emit2(Opcode::GetProp, 0, count_prop);
    inc.emit(Opcode::PushInt1);
    inc.emit(Opcode::AddInt);
    inc.emit2(Opcode::SetProp, 0, count_prop);
    inc.emit(Opcode::RetVoid);
    let inc_id = interp.functions.register(inc.build());
    let inc_rc = interp.functions.get(inc_id).unwrap().clone();

    let mut class = ClassDescriptor::new("Counter", 1);
    class.methods.insert("inc".to_string(), inc_rc);
    class.property_defaults.push(("count".to_string(), Value::Int(0)));
    interp.register_class(Rc::new(class));

    let mut caller = FunctionBuilder::new("call_inc").locals(1);
    caller.emit1(Opcode::PushLocal, 0);
    let method_name = caller.const_string("inc");
    caller.emit2(Opcode::CallMethod, method_name, 1);
    caller.emit(Opcode::RetVoid);
    let caller_id = interp.functions.register(caller.build());

    let counter = Value::new_object(interp.class(1).unwrap().clone());

    interp.call(caller_id, vec![counter.clone()]).unwrap();
    assert_eq!(interp.inline_cache_depth("inc"), 1);
    assert_eq!(interp.inline_cache_hits("inc", 1), Some(0));

    interp.call(caller_id, vec![counter.clone()]).unwrap();
    assert_eq!(interp.inline_cache_depth("inc"), 1);
    assert!(interp.inline_cache_hits("inc", 1).unwrap() >= 1);

    for _ in 2..1000 {
        interp.call(caller_id, vec![counter.clone()]).unwrap();
    }
    // `counter` stays aliased by this binding across every call, so `set_prop`'s
    // COW guard forks a private copy inside each call instead of mutating the
    // shared original — `count` here never advances past its default.
    if let Value::Object(o) = &counter {
        assert_eq!(o.borrow().get_prop("count").unwrap().to_int(), 0);
    }

    interp.invalidate_class_cache(1);
    assert_eq!(interp.inline_cache_depth("inc"), 0);
}

#[test]
fn cow_write_does_not_mutate_the_shared_original() {
    let mut interp = fresh_interpreter();

    let mut b = FunctionBuilder::new("cow_test").locals(2);
    b.emit(Opcode::NewArray);
    b.emit1(Opcode::StoreLocal, 0);
    for v in [1i64, 2, 3] {
        let c = b.const_int(v);
        b.emit1(Opcode::PushConst, c);
        b.emit1(Opcode::ArrayPush, 0);
    }
    b.emit1(Opcode::PushLocal, 0);
    b.emit1(Opcode::StoreLocal, 1); // b = a, same Rc

    b.emit1(Opcode::CowCheck, 1);
    let jz_at = b.emit1(Opcode::Jz, 0);
    b.emit1(Opcode::CowCopy, 1);
    let after_copy = b.here();
    b.patch_target(jz_at, after_copy);

    let zero_c = b.const_int(0);
    let nine_c = b.const_int(9);
    b.emit1(Opcode::PushConst, zero_c);
    b.emit1(Opcode::PushConst, nine_c);
    b.emit1(Opcode::ArraySet, 1);

    b.emit1(Opcode::PushLocal, 0);
    let a_name = b.const_string("a");
    b.emit1(Opcode::StoreGlobal, a_name);
    b.emit1(Opcode::PushLocal, 1);
    let b_name = b.const_string("b");
    b.emit1(Opcode::StoreGlobal, b_name);
    b.emit(Opcode::RetVoid);

    let id = interp.functions.register(b.build());
    interp.call(id, vec![]).unwrap();

    let a = match interp.global("a").unwrap() {
        Value::Array(a) => a.clone(),
        other => panic!("expected array, got {other:?}"),
    };
    let b_val = match interp.global("b").unwrap() {
        Value::Array(a) => a.clone(),
        other => panic!("expected array, got {other:?}"),
    };

    assert!(!Rc::ptr_eq(&a, &b_val));
    assert_eq!(a.borrow().get(&ArrayKey::Integer(0)).unwrap().to_int(), 1);
    assert_eq!(b_val.borrow().get(&ArrayKey::Integer(0)).unwrap().to_int(), 9);
    // one reference lives in the globals map, the other in this local binding
    assert_eq!(Rc::strong_count(&a), 2);
    assert_eq!(Rc::strong_count(&b_val), 2);
}

#[test]
fn exception_raised_in_a_nested_call_is_caught_by_the_outer_try_range() {
    let mut interp = fresh_interpreter();

    let mut divider = FunctionBuilder::new("divider");
    let ten = divider.const_int(10);
    let zero = divider.const_int(0);
    divider.emit1(Opcode::PushConst, ten);
    divider.emit1(Opcode::PushConst, zero);
    divider.emit(Opcode::DivInt);
    divider.emit(Opcode::Ret);
    let divider_id = interp.functions.register(divider.build());

    let mut caller = FunctionBuilder::new("caller_with_try");
    caller.emit2(Opcode::Call, divider_id.0, 0);
    caller.emit(Opcode::RetVoid);
    let catch_addr = caller.here();
    caller.emit(Opcode::Ret);
    caller.try_range(0, 1, catch_addr, Some("Arithmetic"));
    let caller_id = interp.functions.register(caller.build());

    let result = interp.call(caller_id, vec![]).expect("exception should be caught, not propagated");
    assert!(result.to_output_string().contains("division by zero"));
}

#[test]
fn arena_escape_survives_end_request() {
    let mut interp = fresh_interpreter();
    let mut global = GlobalHeap::new();

    interp.arena.begin_request(1, 0);
    let arr = Value::new_array(vec![(ArrayKey::Integer(0), Value::Int(42))]);
    interp.arena.mark_escape(arr.clone(), crabvm::arena::EscapeReason::ReturnedToCaller);

    let stats_before = interp.arena.stats();
    let ids = interp.arena.end_request(5, &mut global);

    assert_eq!(ids.len(), 1);
    let promoted = global.get(ids[0]).unwrap();
    assert!(promoted.loose_eq(&arr));
    assert_eq!(interp.arena.escape_count(), 0);
    assert_eq!(stats_before.allocations, interp.arena.stats().allocations);
}

#[test]
fn failed_type_guard_jumps_to_its_deopt_address() {
    let mut interp = fresh_interpreter();

    let mut b = FunctionBuilder::new("guard_test").locals(1);
    b.emit1(Opcode::PushLocal, 0);
    let fallback = b.const_int(-1);
    let deopt_at = b.emit1(Opcode::GuardInt, 0); // patched below
    b.emit1(Opcode::PushConst, fallback);
    b.emit(Opcode::Ret);
    let deopt_addr = b.here();
    b.patch_target(deopt_at, deopt_addr);
    let ok = b.const_int(1);
    b.emit1(Opcode::PushConst, ok);
    b.emit(Opcode::Ret);

    let id = interp.functions.register(b.build());
    let result = interp.call(id, vec![Value::new_string("not an int")]).unwrap();
    assert_eq!(result.to_int(), 1);

    let result = interp.call(id, vec![Value::Int(7)]).unwrap();
    assert_eq!(result.to_int(), -1);
}

#[test]
fn shift_amount_clamps_to_63_instead_of_wrapping() {
    let mut interp = fresh_interpreter();

    let mut b = FunctionBuilder::new("shift_test");
    let a = b.const_int(1);
    let sixty_three = b.const_int(63);
    let hundred = b.const_int(100);
    b.emit1(Opcode::PushConst, a);
    b.emit1(Opcode::PushConst, sixty_three);
    b.emit(Opcode::Shl);
    b.emit1(Opcode::PushConst, a);
    b.emit1(Opcode::PushConst, hundred);
    b.emit(Opcode::Shl);
    b.emit(Opcode::Eq);
    b.emit(Opcode::Ret);

    let id = interp.functions.register(b.build());
    let result = interp.call(id, vec![]).expect("shift clamp should not raise");
    assert!(result.to_bool(), "shl(a, 100) must clamp to shl(a, 63)");
}

#[test]
fn strict_int_comparison_rejects_a_non_int_operand() {
    let mut interp = fresh_interpreter();

    let mut b = FunctionBuilder::new("strict_cmp_test");
    let one = b.const_int(1);
    let s = b.const_string("nope");
    b.emit1(Opcode::PushConst, one);
    b.emit1(Opcode::PushConst, s);
    b.emit(Opcode::LtInt);
    b.emit(Opcode::Ret);

    let id = interp.functions.register(b.build());
    let err = interp.call(id, vec![]).expect_err("comparing int to string must raise");
    match err {
        crabvm::error::EngineError::Uncaught(exc) => {
            assert_eq!(exc.kind, crabvm::error::ExceptionKind::Type);
        }
        other => panic!("expected an uncaught type exception, got {other:?}"),
    }
}
