//! Error types for the CLI

use bytecode_system::ProgramError;
use core_types::VmError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The machine stopped on a fatal error
    #[error("Runtime error: {0}")]
    Vm(#[from] VmError),

    /// The program artifact could not be loaded or failed validation
    #[error("Program error: {0}")]
    Program(#[from] ProgramError),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Debugger line editor failure
    #[error("Debugger error: {0}")]
    Repl(String),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
