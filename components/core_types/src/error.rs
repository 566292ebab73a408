//! Machine error types.
//!
//! Every variant is fatal to the run that raised it: the interpreter stops
//! and hands the error back to the embedder at the `run()`/`step()` boundary.

use thiserror::Error;

use crate::Word;

/// A fatal machine error
///
/// # Examples
///
/// ```
/// use core_types::VmError;
///
/// let error = VmError::StorageOutOfRange { address: 7, size: 1 };
/// assert_eq!(
///     error.to_string(),
///     "storage address 7 out of range (size 1)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// Fetch (opcode or inline operand) outside the code sequence
    #[error("program counter {pc} out of range")]
    ProgramCounterOutOfRange {
        /// The offending code index, possibly negative after a bad jump
        pc: i64,
    },

    /// Push onto a full call stack
    #[error("stack overflow (capacity {capacity})")]
    StackOverflow {
        /// Fixed capacity of the call stack
        capacity: usize,
    },

    /// Pop from an empty call stack, or a frame index below slot zero
    #[error("stack underflow at pc {pc}")]
    StackUnderflow {
        /// Address of the instruction that underflowed
        pc: usize,
    },

    /// Global address outside the variable store
    #[error("storage address {address} out of range (size {size})")]
    StorageOutOfRange {
        /// The requested address
        address: Word,
        /// Declared size of the variable store
        size: usize,
    },

    /// Frame-relative slot above the current top of stack
    #[error("local slot {slot} out of range (stack pointer {sp})")]
    LocalOutOfRange {
        /// Resolved absolute stack slot
        slot: i64,
        /// Stack pointer at the time of access
        sp: isize,
    },

    /// Code word that does not name an instruction
    #[error("unknown opcode {opcode} at pc {pc}")]
    UnknownOpcode {
        /// The decoded word
        opcode: Word,
        /// Address it was fetched from
        pc: usize,
    },

    /// Negative argument count in a call or in a frame being returned from
    #[error("invalid argument count {argc}")]
    InvalidArgumentCount {
        /// The argument count found
        argc: Word,
    },

    /// The configured instruction budget was used up
    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded {
        /// Configured limit
        limit: u64,
    },

    /// Output sink or pause source failure
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for VmError {
    fn from(err: std::io::Error) -> Self {
        VmError::Io(err.to_string())
    }
}

/// Result type for machine operations
pub type VmResult<T> = Result<T, VmError>;
