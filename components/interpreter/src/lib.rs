//! Bytecode interpreter for the VMES stack machine
//!
//! This crate provides the virtual machine that executes integer code
//! sequences:
//! - Fixed-capacity call stack shared by operands, locals and call frames
//! - Flat variable store for absolute (global) addressing
//! - Fetch-decode-execute loop with single-step support
//! - Pluggable output sink and pause acknowledgment source
//! - Execution profile (instruction counts, stack depth, branch outcomes)
//!
//! # Example
//!
//! ```
//! use interpreter::{SharedOutput, VM};
//!
//! // CONST 6; GSTORE 0; CONST 0; GLOAD; PRINT; HALT
//! let code = vec![9, 6, 13, 0, 9, 0, 11, 14, 16];
//! let output = SharedOutput::new();
//! let mut vm = VM::new(code, 0, 1).with_output(output.clone());
//!
//! vm.run().unwrap();
//! assert_eq!(output.values(), vec![6]);
//! assert_eq!(vm.store(), &[6]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call_frame;
pub mod context;
pub mod dispatch;
pub mod io;
pub mod profile;
pub mod vm;

// Re-export main types at crate root
pub use call_frame::CallFrame;
pub use context::{ExecutionState, STACK_CAPACITY};
pub use dispatch::{Dispatcher, StepOutcome};
pub use io::{AutoResume, Output, PauseSource, SharedOutput, StdinPause, StdoutOutput};
pub use profile::{BranchOutcome, ExecutionProfile};
pub use vm::VM;
