//! Unit tests for interpreter components

use bytecode_system::{Instruction, Program};
use core_types::VmError;
use interpreter::{AutoResume, SharedOutput, StepOutcome, STACK_CAPACITY, VM};

fn program(instructions: &[Instruction], datasize: usize) -> Program {
    let mut program = Program::new(datasize);
    for inst in instructions {
        program.emit(*inst);
    }
    program
}

fn vm_for(program: &Program) -> (VM, SharedOutput) {
    let output = SharedOutput::new();
    let vm = VM::from_program(program)
        .with_output(output.clone())
        .with_pause_source(AutoResume::new());
    (vm, output)
}

fn run(instructions: &[Instruction]) -> VM {
    let (mut vm, _) = vm_for(&program(instructions, 4));
    vm.run().expect("run failed");
    vm
}

// ============================================================================
// Constants and arithmetic
// ============================================================================

#[test]
fn test_const_then_halt_leaves_single_value() {
    for v in [0, 1, -1, 42, i32::MAX, i32::MIN] {
        let vm = run(&[Instruction::Const(v), Instruction::Halt]);
        assert_eq!(vm.stack(), &[v]);
        assert_eq!(vm.sp(), 0);
    }
}

#[test]
fn test_add() {
    let vm = run(&[
        Instruction::Const(10),
        Instruction::Const(32),
        Instruction::Add,
        Instruction::Halt,
    ]);
    assert_eq!(vm.top(), Some(42));
}

#[test]
fn test_sub_operand_order() {
    let vm = run(&[
        Instruction::Const(50),
        Instruction::Const(8),
        Instruction::Sub,
        Instruction::Halt,
    ]);
    assert_eq!(vm.top(), Some(42));
}

#[test]
fn test_mul() {
    let vm = run(&[
        Instruction::Const(-6),
        Instruction::Const(7),
        Instruction::Mul,
        Instruction::Halt,
    ]);
    assert_eq!(vm.top(), Some(-42));
}

#[test]
fn test_mul_wraps_on_overflow() {
    let vm = run(&[
        Instruction::Const(i32::MAX),
        Instruction::Const(2),
        Instruction::Mul,
        Instruction::Halt,
    ]);
    assert_eq!(vm.top(), Some(-2));
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_less_than() {
    let lt = |a, b| {
        run(&[
            Instruction::Const(a),
            Instruction::Const(b),
            Instruction::LessThan,
            Instruction::Halt,
        ])
        .top()
    };
    assert_eq!(lt(3, 5), Some(1));
    assert_eq!(lt(5, 3), Some(0));
    assert_eq!(lt(4, 4), Some(0));
}

#[test]
fn test_equal() {
    let eq = |a, b| {
        run(&[
            Instruction::Const(a),
            Instruction::Const(b),
            Instruction::Equal,
            Instruction::Halt,
        ])
        .top()
    };
    assert_eq!(eq(4, 4), Some(1));
    assert_eq!(eq(4, 5), Some(0));
}

// ============================================================================
// Global storage
// ============================================================================

#[test]
fn test_global_round_trip() {
    let vm = run(&[
        Instruction::Const(6),
        Instruction::StoreGlobal(0),
        Instruction::Const(0),
        Instruction::LoadGlobal,
        Instruction::Halt,
    ]);
    assert_eq!(vm.stack(), &[6]);
    assert_eq!(vm.store()[0], 6);
}

#[test]
fn test_global_out_of_range() {
    let (mut vm, _) = vm_for(&program(
        &[Instruction::Const(1), Instruction::StoreGlobal(1), Instruction::Halt],
        1,
    ));
    assert_eq!(
        vm.run(),
        Err(VmError::StorageOutOfRange { address: 1, size: 1 })
    );
}

#[test]
fn test_global_load_negative_address() {
    let (mut vm, _) = vm_for(&program(
        &[Instruction::Const(-1), Instruction::LoadGlobal, Instruction::Halt],
        1,
    ));
    assert_eq!(
        vm.run(),
        Err(VmError::StorageOutOfRange { address: -1, size: 1 })
    );
}

// ============================================================================
// Branching
// ============================================================================

#[test]
fn test_jump_skips_const() {
    // 0: JMP 4; 2: CONST 99; 4: CONST 1; 6: HALT
    let vm = run(&[
        Instruction::Jump(4),
        Instruction::Const(99),
        Instruction::Const(1),
        Instruction::Halt,
    ]);
    assert_eq!(vm.stack(), &[1]);
}

#[test]
fn test_jump_if_true_takes_exact_one() {
    // 0: CONST c; 2: JMPT 6; 4: CONST 99; 6: HALT
    let with = |c| {
        run(&[
            Instruction::Const(c),
            Instruction::JumpIfTrue(6),
            Instruction::Const(99),
            Instruction::Halt,
        ])
        .stack()
        .to_vec()
    };
    assert_eq!(with(1), Vec::<i32>::new());
    assert_eq!(with(0), vec![99]);
    assert_eq!(with(2), vec![99]);
}

#[test]
fn test_jump_if_false_takes_exact_zero() {
    let with = |c| {
        run(&[
            Instruction::Const(c),
            Instruction::JumpIfFalse(6),
            Instruction::Const(99),
            Instruction::Halt,
        ])
        .stack()
        .to_vec()
    };
    assert_eq!(with(0), Vec::<i32>::new());
    assert_eq!(with(1), vec![99]);
    assert_eq!(with(-1), vec![99]);
}

#[test]
fn test_jump_to_negative_address() {
    let (mut vm, _) = vm_for(&program(&[Instruction::Jump(-5)], 0));
    assert_eq!(
        vm.run(),
        Err(VmError::ProgramCounterOutOfRange { pc: -5 })
    );
}

#[test]
fn test_jump_past_end() {
    let (mut vm, _) = vm_for(&program(&[Instruction::Jump(50)], 0));
    assert_eq!(
        vm.run(),
        Err(VmError::ProgramCounterOutOfRange { pc: 50 })
    );
}

// ============================================================================
// Stack maintenance and boundaries
// ============================================================================

#[test]
fn test_halt_first_is_empty() {
    let (mut vm, output) = vm_for(&program(&[Instruction::Halt], 1));
    vm.run().unwrap();

    assert!(vm.is_halted());
    assert_eq!(vm.sp(), -1);
    assert!(vm.stack().is_empty());
    assert!(output.values().is_empty());
    assert_eq!(vm.store(), &[0]);
    assert_eq!(vm.profile().steps, 1);
}

#[test]
fn test_pop_discards_top() {
    let vm = run(&[
        Instruction::Const(1),
        Instruction::Const(2),
        Instruction::Pop,
        Instruction::Halt,
    ]);
    assert_eq!(vm.stack(), &[1]);
}

#[test]
fn test_pop_empty_underflows() {
    let (mut vm, _) = vm_for(&program(&[Instruction::Pop], 0));
    assert_eq!(vm.run(), Err(VmError::StackUnderflow { pc: 0 }));
}

#[test]
fn test_arithmetic_with_one_operand_underflows() {
    let (mut vm, _) = vm_for(&program(&[Instruction::Const(1), Instruction::Add], 0));
    assert_eq!(vm.run(), Err(VmError::StackUnderflow { pc: 2 }));
}

#[test]
fn test_stack_overflow() {
    // 0: CONST 1; 2: JMP 0
    let (mut vm, _) = vm_for(&program(&[Instruction::Const(1), Instruction::Jump(0)], 0));
    assert_eq!(
        vm.run(),
        Err(VmError::StackOverflow {
            capacity: STACK_CAPACITY
        })
    );
    assert_eq!(vm.stack().len(), STACK_CAPACITY);
}

#[test]
fn test_unknown_opcode_is_fatal() {
    let mut vm = VM::new(vec![9, 1, 0], 0, 0).with_output(SharedOutput::new());
    assert_eq!(vm.run(), Err(VmError::UnknownOpcode { opcode: 0, pc: 2 }));
}

#[test]
fn test_running_off_the_end() {
    let (mut vm, _) = vm_for(&program(&[Instruction::Const(1)], 0));
    assert_eq!(
        vm.run(),
        Err(VmError::ProgramCounterOutOfRange { pc: 2 })
    );
}

#[test]
fn test_entry_past_end() {
    let mut vm = VM::new(vec![16], 5, 0);
    assert_eq!(
        vm.run(),
        Err(VmError::ProgramCounterOutOfRange { pc: 5 })
    );
}

// ============================================================================
// Side effects
// ============================================================================

#[test]
fn test_print_in_program_order() {
    let (mut vm, output) = vm_for(&program(
        &[
            Instruction::Const(1),
            Instruction::Print,
            Instruction::Const(2),
            Instruction::Print,
            Instruction::Const(3),
            Instruction::Print,
            Instruction::Halt,
        ],
        0,
    ));
    vm.run().unwrap();
    assert_eq!(output.values(), vec![1, 2, 3]);
    assert_eq!(vm.sp(), -1);
}

#[test]
fn test_print_empty_underflows() {
    let (mut vm, output) = vm_for(&program(&[Instruction::Print], 0));
    assert_eq!(vm.run(), Err(VmError::StackUnderflow { pc: 0 }));
    assert!(output.values().is_empty());
}

#[test]
fn test_pause_waits_on_source() {
    let pause = AutoResume::new();
    let mut vm = VM::from_program(&program(
        &[Instruction::Pause, Instruction::Pause, Instruction::Halt],
        0,
    ))
    .with_pause_source(pause.clone());

    vm.run().unwrap();
    assert_eq!(pause.count(), 2);
}

// ============================================================================
// Stepping
// ============================================================================

#[test]
fn test_single_step_cursors() {
    let (mut vm, _) = vm_for(&program(
        &[Instruction::Const(3), Instruction::Const(4), Instruction::Halt],
        0,
    ));

    assert_eq!(vm.step().unwrap(), StepOutcome::Continue);
    assert_eq!((vm.pc(), vm.sp()), (2, 0));

    assert_eq!(vm.step().unwrap(), StepOutcome::Continue);
    assert_eq!((vm.pc(), vm.sp()), (4, 1));

    assert_eq!(vm.step().unwrap(), StepOutcome::Halted);
    assert!(vm.is_halted());
}
