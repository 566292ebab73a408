//! End-to-end tests through the CLI runtime
//!
//! Tests artifact files flowing through Runtime loading, validation,
//! conversion and the debugger.

use bytecode_system::{Instruction, Program};
use core_types::VmError;
use interpreter::SharedOutput;
use tempfile::TempDir;
use vmes_cli::repl::{Command, Debugger, Reply};
use vmes_cli::{CliError, Runtime};

fn square_program() -> Program {
    // square(x) = x * x; print square(9)
    let mut program = Program::new(0);
    let square = program.emit(Instruction::Load(-3)) as i32;
    program.emit(Instruction::Load(-3));
    program.emit(Instruction::Mul);
    program.emit(Instruction::Return);
    let main = program.emit(Instruction::Const(9));
    program.emit(Instruction::Call {
        target: square,
        argc: 1,
    });
    program.emit(Instruction::Print);
    program.emit(Instruction::Halt);
    program.with_entry(main)
}

/// Test: JSON file to binary file to execution
#[test]
fn test_json_to_binary_conversion() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("square.json");
    let binary = dir.path().join("square.vmes");
    std::fs::write(&json, square_program().to_json().unwrap()).unwrap();

    let runtime = Runtime::new();
    let program = runtime.load_file(&json).unwrap();
    runtime.emit_binary(&program, &binary).unwrap();
    let reloaded = runtime.load_file(&binary).unwrap();
    assert_eq!(reloaded, square_program());

    let output = SharedOutput::new();
    let vm = runtime.build_vm(&reloaded).with_output(output.clone());
    runtime.run_vm(vm).unwrap();
    assert_eq!(output.values(), vec![81]);
}

/// Test: Entry override selects a different start
#[test]
fn test_entry_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("square.json");
    std::fs::write(&path, square_program().to_json().unwrap()).unwrap();

    // starting at the procedure body underflows at top level
    let runtime = Runtime::new().with_entry(Some(0));
    let program = runtime.load_file(&path).unwrap();
    let vm = runtime.build_vm(&program).with_output(SharedOutput::new());
    assert!(matches!(
        runtime.run_vm(vm),
        Err(CliError::Vm(VmError::StackUnderflow { .. }))
    ));
}

/// Test: Validation and disassembly through the runtime
#[test]
fn test_runtime_inspection() {
    let runtime = Runtime::new();
    let program = square_program();

    runtime.validate(&program).unwrap();
    let listing = runtime.disassemble(&program).unwrap();
    assert!(listing.contains(">0006  CONST 9\n"));
    assert!(listing.contains(" 0008  CALL 0 1\n"));
}

/// Test: Debugger walks into and out of a procedure
#[test]
fn test_debugger_session() {
    let runtime = Runtime::new().with_auto_resume(true);
    let output = SharedOutput::new();
    let vm = runtime
        .build_vm(&square_program())
        .with_output(output.clone());
    let mut debugger = Debugger::new(vm);

    let commands = ["step 2", "frames", "continue", "stack"];
    let replies: Vec<Reply> = commands
        .iter()
        .map(|line| debugger.handle(line.parse::<Command>().unwrap()))
        .collect();

    assert_eq!(replies[0], Reply::Show("0000  LOAD -3".to_string()));
    assert_eq!(
        replies[1],
        Reply::Show("#0 fp=3 return=11 argc=1 args=[9]".to_string())
    );
    assert_eq!(replies[2], Reply::Show("halted".to_string()));
    assert_eq!(replies[3], Reply::Show("[]  sp=-1 fp=0".to_string()));
    assert_eq!(output.values(), vec![81]);
}
