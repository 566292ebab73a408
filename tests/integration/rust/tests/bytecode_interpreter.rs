//! Bytecode to Interpreter Integration Tests
//!
//! Tests the integration between bytecode_system and interpreter components.
//! Verifies that assembled and decoded programs are correctly executed by the VM.

use bytecode_system::{Instruction, Opcode, Program, ProgramError};
use core_types::{VmError, Word};
use interpreter::{AutoResume, SharedOutput, VM};

fn run(program: &Program) -> (VM, Vec<Word>) {
    let output = SharedOutput::new();
    let mut vm = VM::from_program(program)
        .with_output(output.clone())
        .with_pause_source(AutoResume::new());
    vm.run().expect("Execution failed");
    (vm, output.take())
}

/// Emit `max(a, b)` and return its address
fn emit_max(program: &mut Program) -> Word {
    let a = -4;
    let b = -3;
    let max = program.emit(Instruction::Load(a)) as Word;
    program.emit(Instruction::Load(b));
    program.emit(Instruction::LessThan);
    let pick_b = program.emit(Instruction::JumpIfTrue(0));
    program.emit(Instruction::Load(a));
    program.emit(Instruction::Return);
    let b_addr = program.here() as Word;
    program.patch_operand(pick_b, 0, b_addr).unwrap();
    program.emit(Instruction::Load(b));
    program.emit(Instruction::Return);
    max
}

fn max_program() -> Program {
    let mut program = Program::new(0);
    let max = emit_max(&mut program);
    let main = program.emit(Instruction::Const(3));
    program.emit(Instruction::Const(11));
    program.emit(Instruction::Call { target: max, argc: 2 });
    program.emit(Instruction::Print);
    program.emit(Instruction::Const(-5));
    program.emit(Instruction::Const(-9));
    program.emit(Instruction::Call { target: max, argc: 2 });
    program.emit(Instruction::Print);
    program.emit(Instruction::Halt);
    program.with_entry(main)
}

/// Test: Assembled program validates and runs
#[test]
fn test_validated_program_runs() {
    let program = max_program();
    program.validate().expect("Validation failed");

    let (vm, output) = run(&program);
    assert_eq!(output, vec![11, -5]);
    assert_eq!(vm.sp(), -1);
    assert_eq!(vm.profile().calls, 2);
}

/// Test: Raw words built from opcode tags run the same as assembled ones
#[test]
fn test_raw_words_match_assembly() {
    let raw = vec![
        Opcode::Const.code(),
        3,
        Opcode::Const.code(),
        5,
        Opcode::LessThan.code(),
        Opcode::Print.code(),
        Opcode::Halt.code(),
    ];
    let mut assembled = Program::new(0);
    assembled.emit(Instruction::Const(3));
    assembled.emit(Instruction::Const(5));
    assembled.emit(Instruction::LessThan);
    assembled.emit(Instruction::Print);
    assembled.emit(Instruction::Halt);

    assert_eq!(assembled.code, raw);
    let (_, output) = run(&Program::from_code(raw, 0, 0));
    assert_eq!(output, vec![1]);
}

/// Test: A program survives the binary artifact format
#[test]
fn test_binary_artifact_executes() {
    let bytes = max_program().to_bytes().expect("Encode failed");
    let decoded = Program::from_bytes(&bytes).expect("Decode failed");

    let (_, output) = run(&decoded);
    assert_eq!(output, vec![11, -5]);
}

/// Test: A program survives the JSON artifact format
#[test]
fn test_json_artifact_executes() {
    let text = Program::demo().to_json().expect("Encode failed");
    let decoded = Program::from_json(&text).expect("Decode failed");

    let (vm, output) = run(&decoded);
    assert_eq!(output, vec![6, 69]);
    assert_eq!(vm.store(), &[69]);
}

/// Test: Disassembly lists the decoded instructions in order
#[test]
fn test_disassembly_matches_execution_order() {
    let program = max_program();
    let listing = program.disassemble().expect("Disassembly failed");

    assert_eq!(listing[0], (0, Instruction::Load(-4)));
    let entry = listing
        .iter()
        .find(|(address, _)| *address == program.entry)
        .map(|(_, inst)| *inst);
    assert_eq!(entry, Some(Instruction::Const(3)));
    assert_eq!(listing.last().map(|(_, inst)| *inst), Some(Instruction::Halt));
}

/// Test: The validator catches what the VM would fault on
#[test]
fn test_validator_and_vm_agree_on_bad_store() {
    let mut program = Program::new(1);
    program.emit(Instruction::Const(1));
    program.emit(Instruction::StoreGlobal(3));
    program.emit(Instruction::Halt);

    assert!(matches!(
        program.validate(),
        Err(ProgramError::StorageOutOfRange { .. })
    ));

    let mut vm = VM::from_program(&program).with_output(SharedOutput::new());
    assert_eq!(
        vm.run(),
        Err(VmError::StorageOutOfRange {
            address: 3,
            size: 1
        })
    );
}

/// Test: Unknown opcodes are fatal at run time and rejected by validation
#[test]
fn test_unknown_opcode_everywhere() {
    let program = Program::from_code(vec![Opcode::Const.code(), 1, 77], 0, 0);
    assert!(program.validate().is_err());

    let mut vm = VM::from_program(&program).with_output(SharedOutput::new());
    assert_eq!(
        vm.run(),
        Err(VmError::UnknownOpcode { opcode: 77, pc: 2 })
    );
    assert_eq!(vm.stack(), &[1]);
}

/// Test: An oversized store is refused before any VM is built
#[test]
fn test_huge_storage_is_refused_at_load() {
    let result = Program::from_json(r#"{"code": [16], "datasize": 18446744073709551615}"#);
    assert!(matches!(
        result,
        Err(ProgramError::StorageTooLarge { .. })
    ));
}
