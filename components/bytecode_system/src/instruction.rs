//! Decoded instruction representation
//!
//! A code sequence interleaves opcodes with their inline operands. Decoding
//! turns the words at a program counter into an [`Instruction`] that carries
//! its operands, so the interpreter dispatches over a closed sum type.

use std::fmt;

use core_types::{VmError, VmResult, Word};

use crate::opcode::Opcode;

/// A single decoded instruction with its inline operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `ADD`
    Add,
    /// `SUB`
    Sub,
    /// `MUL`
    Mul,
    /// `LT`
    LessThan,
    /// `EQ`
    Equal,
    /// `JMP target`
    Jump(Word),
    /// `JMPT target`
    JumpIfTrue(Word),
    /// `JMPF target`
    JumpIfFalse(Word),
    /// `CONST value`
    Const(Word),
    /// `LOAD offset` (frame-relative)
    Load(Word),
    /// `GLOAD` (address taken from the stack)
    LoadGlobal,
    /// `STORE offset` (frame-relative)
    Store(Word),
    /// `GSTORE address`
    StoreGlobal(Word),
    /// `PRINT`
    Print,
    /// `POP`
    Pop,
    /// `HALT`
    Halt,
    /// `CALL target argc`
    Call {
        /// Procedure entry address
        target: Word,
        /// Number of arguments the caller pushed
        argc: Word,
    },
    /// `RET`
    Return,
    /// `PAUSE`
    Pause,
}

impl Instruction {
    /// Decode the instruction starting at `pc`
    ///
    /// Returns the instruction and the address of the word following its
    /// last operand.
    ///
    /// # Errors
    ///
    /// * `ProgramCounterOutOfRange` if the opcode or any operand lies past
    ///   the end of `code`
    /// * `UnknownOpcode` if the word at `pc` is not an opcode
    ///
    /// # Example
    ///
    /// ```
    /// use bytecode_system::{Instruction, Opcode};
    ///
    /// let code = [Opcode::Call.code(), 7, 1, Opcode::Halt.code()];
    /// let (inst, next) = Instruction::decode(&code, 0).unwrap();
    /// assert_eq!(inst, Instruction::Call { target: 7, argc: 1 });
    /// assert_eq!(next, 3);
    /// ```
    pub fn decode(code: &[Word], pc: usize) -> VmResult<(Instruction, usize)> {
        let fetch = |at: usize| {
            code.get(at)
                .copied()
                .ok_or(VmError::ProgramCounterOutOfRange { pc: at as i64 })
        };

        let raw = fetch(pc)?;
        let opcode =
            Opcode::try_from(raw).map_err(|_| VmError::UnknownOpcode { opcode: raw, pc })?;

        let inst = match opcode {
            Opcode::Add => Instruction::Add,
            Opcode::Sub => Instruction::Sub,
            Opcode::Mul => Instruction::Mul,
            Opcode::LessThan => Instruction::LessThan,
            Opcode::Equal => Instruction::Equal,
            Opcode::Jump => Instruction::Jump(fetch(pc + 1)?),
            Opcode::JumpIfTrue => Instruction::JumpIfTrue(fetch(pc + 1)?),
            Opcode::JumpIfFalse => Instruction::JumpIfFalse(fetch(pc + 1)?),
            Opcode::Const => Instruction::Const(fetch(pc + 1)?),
            Opcode::Load => Instruction::Load(fetch(pc + 1)?),
            Opcode::LoadGlobal => Instruction::LoadGlobal,
            Opcode::Store => Instruction::Store(fetch(pc + 1)?),
            Opcode::StoreGlobal => Instruction::StoreGlobal(fetch(pc + 1)?),
            Opcode::Print => Instruction::Print,
            Opcode::Pop => Instruction::Pop,
            Opcode::Halt => Instruction::Halt,
            Opcode::Call => Instruction::Call {
                target: fetch(pc + 1)?,
                argc: fetch(pc + 2)?,
            },
            Opcode::Return => Instruction::Return,
            Opcode::Pause => Instruction::Pause,
        };

        Ok((inst, pc + 1 + opcode.arity()))
    }

    /// Opcode of this instruction
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::LessThan => Opcode::LessThan,
            Instruction::Equal => Opcode::Equal,
            Instruction::Jump(_) => Opcode::Jump,
            Instruction::JumpIfTrue(_) => Opcode::JumpIfTrue,
            Instruction::JumpIfFalse(_) => Opcode::JumpIfFalse,
            Instruction::Const(_) => Opcode::Const,
            Instruction::Load(_) => Opcode::Load,
            Instruction::LoadGlobal => Opcode::LoadGlobal,
            Instruction::Store(_) => Opcode::Store,
            Instruction::StoreGlobal(_) => Opcode::StoreGlobal,
            Instruction::Print => Opcode::Print,
            Instruction::Pop => Opcode::Pop,
            Instruction::Halt => Opcode::Halt,
            Instruction::Call { .. } => Opcode::Call,
            Instruction::Return => Opcode::Return,
            Instruction::Pause => Opcode::Pause,
        }
    }

    /// Inline operands in code order
    pub fn operands(&self) -> Vec<Word> {
        match *self {
            Instruction::Jump(w)
            | Instruction::JumpIfTrue(w)
            | Instruction::JumpIfFalse(w)
            | Instruction::Const(w)
            | Instruction::Load(w)
            | Instruction::Store(w)
            | Instruction::StoreGlobal(w) => vec![w],
            Instruction::Call { target, argc } => vec![target, argc],
            _ => Vec::new(),
        }
    }

    /// Number of code words this instruction occupies
    pub fn width(&self) -> usize {
        1 + self.opcode().arity()
    }

    /// Branch or call target, if this instruction transfers control
    pub fn target(&self) -> Option<Word> {
        match *self {
            Instruction::Jump(t)
            | Instruction::JumpIfTrue(t)
            | Instruction::JumpIfFalse(t)
            | Instruction::Call { target: t, .. } => Some(t),
            _ => None,
        }
    }

    /// Append the encoded words of this instruction to `code`
    pub fn encode(&self, code: &mut Vec<Word>) {
        code.push(self.opcode().code());
        code.extend(self.operands());
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode().mnemonic())?;
        for operand in self.operands() {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}
