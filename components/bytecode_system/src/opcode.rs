//! Bytecode opcodes for the stack machine
//!
//! Defines the closed instruction vocabulary and the numeric tag each opcode
//! is encoded as in a program's code sequence.

use core_types::Word;
use thiserror::Error;

/// A code word that does not name any opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid opcode {0}")]
pub struct InvalidOpcode(pub Word);

/// Opcode tags as they appear in the code sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Opcode {
    // Arithmetic operations
    /// Add second-top and top
    Add = 1,
    /// Subtract top from second-top
    Sub = 2,
    /// Multiply second-top by top
    Mul = 3,

    // Comparison operations
    /// Less than (second-top < top)
    LessThan = 4,
    /// Equality
    Equal = 5,

    // Control flow
    /// Unconditional jump to an absolute address
    Jump = 6,
    /// Jump if the popped condition is exactly 1
    JumpIfTrue = 7,
    /// Jump if the popped condition is exactly 0
    JumpIfFalse = 8,

    // Literals and variables
    /// Push an inline literal
    Const = 9,
    /// Push a frame-relative call stack slot
    Load = 10,
    /// Pop an address, push the variable store word at that address
    LoadGlobal = 11,
    /// Pop into a frame-relative call stack slot
    Store = 12,
    /// Pop into the variable store at an inline address
    StoreGlobal = 13,

    // Side effects and stack maintenance
    /// Pop and emit to the output sink
    Print = 14,
    /// Discard top of stack
    Pop = 15,
    /// Stop the machine
    Halt = 16,

    // Procedures
    /// Call a procedure with inline target address and argument count
    Call = 17,
    /// Return from the current procedure
    Return = 18,

    /// Block until the pause source acknowledges
    Pause = 19,
}

impl Opcode {
    /// Every opcode, in numeric order
    pub const ALL: [Opcode; 19] = [
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::LessThan,
        Opcode::Equal,
        Opcode::Jump,
        Opcode::JumpIfTrue,
        Opcode::JumpIfFalse,
        Opcode::Const,
        Opcode::Load,
        Opcode::LoadGlobal,
        Opcode::Store,
        Opcode::StoreGlobal,
        Opcode::Print,
        Opcode::Pop,
        Opcode::Halt,
        Opcode::Call,
        Opcode::Return,
        Opcode::Pause,
    ];

    /// Numeric tag of this opcode
    pub fn code(self) -> Word {
        self as Word
    }

    /// Number of inline operands that follow the opcode in the code sequence
    pub fn arity(self) -> usize {
        match self {
            Opcode::Call => 2,
            Opcode::Jump
            | Opcode::JumpIfTrue
            | Opcode::JumpIfFalse
            | Opcode::Const
            | Opcode::Load
            | Opcode::Store
            | Opcode::StoreGlobal => 1,
            _ => 0,
        }
    }

    /// Assembler mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::LessThan => "LT",
            Opcode::Equal => "EQ",
            Opcode::Jump => "JMP",
            Opcode::JumpIfTrue => "JMPT",
            Opcode::JumpIfFalse => "JMPF",
            Opcode::Const => "CONST",
            Opcode::Load => "LOAD",
            Opcode::LoadGlobal => "GLOAD",
            Opcode::Store => "STORE",
            Opcode::StoreGlobal => "GSTORE",
            Opcode::Print => "PRINT",
            Opcode::Pop => "POP",
            Opcode::Halt => "HALT",
            Opcode::Call => "CALL",
            Opcode::Return => "RET",
            Opcode::Pause => "PAUSE",
        }
    }

    /// Check if this opcode carries a code address operand
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Opcode::Jump | Opcode::JumpIfTrue | Opcode::JumpIfFalse | Opcode::Call
        )
    }
}

impl TryFrom<Word> for Opcode {
    type Error = InvalidOpcode;

    fn try_from(word: Word) -> Result<Self, Self::Error> {
        let index = usize::try_from(word)
            .ok()
            .and_then(|w| w.checked_sub(1))
            .ok_or(InvalidOpcode(word))?;
        Opcode::ALL.get(index).copied().ok_or(InvalidOpcode(word))
    }
}

impl From<Opcode> for Word {
    fn from(opcode: Opcode) -> Self {
        opcode.code()
    }
}
