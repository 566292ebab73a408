//! Bytecode system for the VMES stack machine
//!
//! This crate provides the instruction set definition, the decoder that turns
//! integer code sequences into instructions, and the program container with
//! its loadable artifact formats.
//!
//! # Features
//!
//! - Closed opcode set with fixed operand arity
//! - Tagged-variant decoded instructions
//! - Binary and JSON artifact formats
//! - Disassembly and static validation
//!
//! # Example
//!
//! ```
//! use bytecode_system::{Instruction, Program};
//!
//! let mut program = Program::new(1);
//!
//! // Emit instructions
//! program.emit(Instruction::Const(6));
//! program.emit(Instruction::StoreGlobal(0));
//! program.emit(Instruction::Halt);
//!
//! // Check
//! program.validate().unwrap();
//!
//! // Serialize
//! let bytes = program.to_bytes().unwrap();
//! let restored = Program::from_bytes(&bytes).unwrap();
//! assert_eq!(restored, program);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod verifier;

// Re-export main types at crate root
pub use error::ProgramError;
pub use instruction::Instruction;
pub use opcode::{InvalidOpcode, Opcode};
pub use program::{Program, MAX_DATASIZE};
pub use verifier::Verifier;
