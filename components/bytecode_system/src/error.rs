//! Program artifact errors

use core_types::{VmError, Word};
use thiserror::Error;

/// Errors raised while loading, editing or validating a [`Program`](crate::Program)
#[derive(Debug, Error)]
pub enum ProgramError {
    /// Binary artifact does not start with `VMES`
    #[error("invalid magic number")]
    BadMagic,

    /// Binary artifact version this build cannot read
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    /// Binary artifact ended early
    #[error("not enough bytes for {0}")]
    Truncated(&'static str),

    /// Binary artifact has bytes after the last code word
    #[error("{0} trailing bytes after code")]
    TrailingBytes(usize),

    /// A header value does not fit the binary format's `u32` field
    #[error("{0} does not fit in the binary header")]
    FieldTooLarge(&'static str),

    /// Declared variable store exceeds what a program may request
    #[error("storage size {datasize} exceeds the limit of {max} words")]
    StorageTooLarge {
        /// Declared storage size
        datasize: usize,
        /// Largest accepted storage size
        max: usize,
    },

    /// JSON artifact could not be read or written
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A code word sequence did not decode into an instruction
    #[error("cannot decode instruction at {address}: {source}")]
    Decode {
        /// Address of the instruction
        address: usize,
        /// Underlying decode failure
        source: VmError,
    },

    /// Entry address is not the start of an instruction
    #[error("entry address {entry} is not an instruction boundary (code length {len})")]
    EntryOutOfRange {
        /// Declared entry address
        entry: usize,
        /// Number of code words
        len: usize,
    },

    /// Branch or call target is not the start of an instruction
    #[error("instruction at {address} targets {target}, which is not an instruction boundary")]
    MisalignedTarget {
        /// Address of the branching instruction
        address: usize,
        /// Its target operand
        target: Word,
    },

    /// `CALL` with a negative argument count
    #[error("instruction at {address} calls with negative argument count {argc}")]
    NegativeArgumentCount {
        /// Address of the call
        address: usize,
        /// The argument count operand
        argc: Word,
    },

    /// `GSTORE` to an address outside the variable store
    #[error("instruction at {address} stores to slot {slot} outside storage of size {size}")]
    StorageOutOfRange {
        /// Address of the store
        address: usize,
        /// Store slot operand
        slot: Word,
        /// Declared storage size
        size: usize,
    },

    /// Operand patch aimed at an operand the instruction does not have
    #[error("instruction at {address} has no operand {index}")]
    NoSuchOperand {
        /// Address of the instruction
        address: usize,
        /// Requested operand index
        index: usize,
    },
}
