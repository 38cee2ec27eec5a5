//! Host harness for crabvm: assembles a couple of demo programs through the
//! builder API (there is no compiler front end, §1) and drives a single
//! request through `begin_request`/`call`/`end_request`. Mirrors the
//! teacher's argv-dispatch `main.rs` shape without a PHP front end.

use crabvm::arena::EscapeReason;
use crabvm::bytecode::{FunctionBuilder, Opcode};
use crabvm::interp::{EngineConfig, Interpreter, OutputSink};
use crabvm::value::Value;
use std::env;
use std::process;

struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&mut self, text: &str) {
        print!("{text}");
    }
}

fn build_sum_to_n() -> crabvm::bytecode::CompiledFunction {
    // locals: n=0, i=1, acc=2 — called with [n, 0, 0]
    let mut b = FunctionBuilder::new("sum_to_n").locals(3);
    let loop_addr = b.here();
    b.emit1(Opcode::PushLocal, 1);
    b.emit1(Opcode::PushLocal, 0);
    b.emit(Opcode::LtInt);
    let jz_at = b.emit1(Opcode::Jz, 0);
    b.emit1(Opcode::PushLocal, 2);
    b.emit1(Opcode::PushLocal, 1);
    b.emit(Opcode::AddInt);
    b.emit1(Opcode::StoreLocal, 2);
    b.emit1(Opcode::IncInt, 1);
    b.emit1(Opcode::Jmp, loop_addr as u16);
    let end_addr = b.here();
    b.patch_target(jz_at, end_addr);
    b.emit1(Opcode::PushLocal, 2);
    b.emit(Opcode::Ret);
    b.build()
}

fn build_fib() -> crabvm::bytecode::CompiledFunction {
    // locals: n=0, a=1, b=2, i=3 — called with [n, 0, 1, 0]
    let mut b = FunctionBuilder::new("fib").locals(4);
    let loop_addr = b.here();
    b.emit1(Opcode::PushLocal, 3);
    b.emit1(Opcode::PushLocal, 0);
    b.emit(Opcode::LtInt);
    let jz_at = b.emit1(Opcode::Jz, 0);
    b.emit1(Opcode::PushLocal, 1);
    b.emit1(Opcode::PushLocal, 2);
    b.emit(Opcode::AddInt);
    b.emit1(Opcode::PushLocal, 2);
    b.emit1(Opcode::StoreLocal, 1);
    b.emit1(Opcode::StoreLocal, 2);
    b.emit1(Opcode::IncInt, 3);
    b.emit1(Opcode::Jmp, loop_addr as u16);
    let end_addr = b.here();
    b.patch_target(jz_at, end_addr);
    b.emit1(Opcode::PushLocal, 1);
    b.emit(Opcode::Ret);
    b.build()
}

fn run_demo(name: &str, n: i64) -> Result<(), String> {
    let mut interp = Interpreter::new(EngineConfig::default(), Box::new(StdoutSink));
    interp.arena.begin_request(1, 0);

    let result = match name {
        "sum-to-n" => {
            let id = interp.functions.register(build_sum_to_n());
            interp.call(id, vec![Value::Int(n), Value::Int(0), Value::Int(0)])
        }
        "fib" => {
            let id = interp.functions.register(build_fib());
            interp.call(id, vec![Value::Int(n), Value::Int(0), Value::Int(1), Value::Int(0)])
        }
        other => return Err(format!("unknown demo {other:?}")),
    };

    match result {
        Ok(value) => {
            interp.arena.mark_escape(value.clone(), EscapeReason::ReturnedToCaller);
            interp.arena.end_request(1, &mut interp.global_heap);
            interp.print(&format!("{}\n", value.to_output_string()));
            Ok(())
        }
        Err(err) => Err(err.to_string()),
    }
}

fn print_usage(program: &str) {
    eprintln!("crabvm v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {program} demo sum-to-n <n>   Sum of 0..n via a hand-assembled loop");
    eprintln!("  {program} demo fib <n>        Nth Fibonacci number, iteratively");
    eprintln!();
    eprintln!("There is no compiler front end here (lexer/parser/AST are out of");
    eprintln!("scope) — demos are bytecode assembled directly through the builder API.");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "demo" => {
            if args.len() < 4 {
                Err("demo requires a name and an integer argument".to_string())
            } else {
                match args[3].parse::<i64>() {
                    Ok(n) => run_demo(&args[2], n),
                    Err(_) => Err(format!("not an integer: {}", args[3])),
                }
            }
        }
        "-h" | "--help" => {
            print_usage(&args[0]);
            Ok(())
        }
        other => Err(format!("unknown command {other:?}")),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
