//! Virtual Machine for bytecode execution
//!
//! Main entry point for embedding the interpreter.

use bytecode_system::{Instruction, Program};
use core_types::{VmError, VmResult, Word};
use tracing::{debug, instrument, warn};

use crate::call_frame::CallFrame;
use crate::context::ExecutionState;
use crate::dispatch::{Dispatcher, StepOutcome};
use crate::io::{Output, PauseSource};
use crate::profile::ExecutionProfile;

/// Lifecycle of a machine
#[derive(Debug, Clone, PartialEq)]
enum Status {
    /// More instructions may be executed
    Ready,
    /// `HALT` ran
    Halted,
    /// A fatal error stopped the run
    Faulted(VmError),
}

/// Virtual Machine for executing one program
///
/// The VM owns the execution state of a single run:
/// - The code sequence and its cursors
/// - The call stack and the variable store
/// - The output sink and pause source used by `PRINT` and `PAUSE`
///
/// Dropping the VM releases all of it.
#[derive(Debug)]
pub struct VM {
    /// State of the run
    state: ExecutionState,
    /// Dispatcher for bytecode execution
    dispatcher: Dispatcher,
    /// Where the run stands
    status: Status,
    /// Maximum number of instructions to execute, if bounded
    step_limit: Option<u64>,
}

impl VM {
    /// Create a new VM instance
    ///
    /// # Arguments
    ///
    /// * `code` - Opcodes interleaved with their inline operands
    /// * `entry` - Address of the first instruction to execute
    /// * `datasize` - Number of words in the variable store
    ///
    /// The VM prints to standard output and pauses on standard input until
    /// configured otherwise. The store is allocated eagerly; artifacts from
    /// outside should pass `Program::check_limits` first.
    pub fn new(code: Vec<Word>, entry: usize, datasize: usize) -> Self {
        Self {
            state: ExecutionState::new(code, entry, datasize),
            dispatcher: Dispatcher::new(),
            status: Status::Ready,
            step_limit: None,
        }
    }

    /// Create a VM for a program container
    pub fn from_program(program: &Program) -> Self {
        Self::new(program.code.clone(), program.entry, program.datasize)
    }

    /// Send `PRINT` output to `output`
    pub fn with_output(mut self, output: impl Output + 'static) -> Self {
        self.dispatcher.set_output(Box::new(output));
        self
    }

    /// Make `PAUSE` wait on `pause`
    pub fn with_pause_source(mut self, pause: impl PauseSource + 'static) -> Self {
        self.dispatcher.set_pause_source(Box::new(pause));
        self
    }

    /// Fail with `StepLimitExceeded` after `limit` instructions
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Run until `HALT` or a fatal error
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The program halted
    /// * `Err(VmError)` - The run faulted; the machine stays faulted
    ///
    /// # Example
    ///
    /// ```
    /// use interpreter::{SharedOutput, VM};
    ///
    /// // CONST 2; CONST 3; MUL; PRINT; HALT
    /// let output = SharedOutput::new();
    /// let mut vm = VM::new(vec![9, 2, 9, 3, 3, 14, 16], 0, 0).with_output(output.clone());
    ///
    /// vm.run().unwrap();
    /// assert_eq!(output.values(), vec![6]);
    /// assert!(vm.is_halted());
    /// ```
    #[instrument(skip_all, name = "run", fields(entry = self.state.pc))]
    pub fn run(&mut self) -> VmResult<()> {
        debug!(
            code_len = self.state.code.len(),
            datasize = self.state.store.len(),
            "starting run"
        );
        while self.step()? == StepOutcome::Continue {}
        Ok(())
    }

    /// Execute a single instruction
    ///
    /// After `HALT` this keeps returning `Halted` without executing; after a
    /// fatal error it keeps returning that error.
    pub fn step(&mut self) -> VmResult<StepOutcome> {
        match &self.status {
            Status::Halted => return Ok(StepOutcome::Halted),
            Status::Faulted(error) => return Err(error.clone()),
            Status::Ready => {}
        }

        if let Some(limit) = self.step_limit {
            if self.dispatcher.profile().steps >= limit {
                return Err(self.record_fault(VmError::StepLimitExceeded { limit }));
            }
        }

        match self.dispatcher.step(&mut self.state) {
            Ok(StepOutcome::Halted) => {
                self.status = Status::Halted;
                debug!(
                    pc = self.state.current,
                    steps = self.dispatcher.profile().steps,
                    "halted"
                );
                Ok(StepOutcome::Halted)
            }
            Ok(StepOutcome::Continue) => Ok(StepOutcome::Continue),
            Err(error) => Err(self.record_fault(error)),
        }
    }

    fn record_fault(&mut self, error: VmError) -> VmError {
        warn!(pc = self.state.current, %error, "machine fault");
        self.status = Status::Faulted(error.clone());
        error
    }

    /// Address of the next instruction
    pub fn pc(&self) -> usize {
        self.state.pc
    }

    /// Index of the top occupied stack slot, `-1` when empty
    pub fn sp(&self) -> isize {
        self.state.sp()
    }

    /// Base of the current frame
    pub fn fp(&self) -> usize {
        self.state.fp
    }

    /// Occupied call stack slots, bottom to top
    pub fn stack(&self) -> &[Word] {
        self.state.stack.as_slice()
    }

    /// Top of the call stack
    pub fn top(&self) -> Option<Word> {
        self.state.peek()
    }

    /// The variable store
    pub fn store(&self) -> &[Word] {
        &self.state.store
    }

    /// The full execution state
    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Check whether `HALT` has run
    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    /// The error that stopped the run, if any
    pub fn fault(&self) -> Option<&VmError> {
        match &self.status {
            Status::Faulted(error) => Some(error),
            _ => None,
        }
    }

    /// Active procedure frames, innermost first
    pub fn frames(&self) -> Vec<CallFrame> {
        CallFrame::backtrace(self.stack(), self.state.fp)
    }

    /// Statistics for the run so far
    pub fn profile(&self) -> &ExecutionProfile {
        self.dispatcher.profile()
    }

    /// The instruction `step` would execute next, if it decodes
    pub fn current_instruction(&self) -> Option<Instruction> {
        Instruction::decode(&self.state.code, self.state.pc)
            .ok()
            .map(|(inst, _)| inst)
    }
}
