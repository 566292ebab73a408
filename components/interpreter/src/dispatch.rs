//! Dispatch loop for bytecode execution
//!
//! Handles individual instruction execution, including the call convention.

use bytecode_system::Instruction;
use core_types::{flag, is_exactly_false, is_exactly_true, VmError, VmResult, Word};
use tracing::{debug, trace};

use crate::context::ExecutionState;
use crate::io::{Output, PauseSource, StdinPause, StdoutOutput};
use crate::profile::{BranchOutcome, ExecutionProfile};

/// Result of executing one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The machine can execute the next instruction
    Continue,
    /// `HALT` was executed
    Halted,
}

/// Dispatch handler for executing bytecode
pub struct Dispatcher {
    /// Destination of `PRINT`
    output: Box<dyn Output>,
    /// Source `PAUSE` waits on
    pause: Box<dyn PauseSource>,
    /// Statistics for the current run
    profile: ExecutionProfile,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("output", &"dyn Output")
            .field("pause", &"dyn PauseSource")
            .field("profile", &self.profile)
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher wired to standard output and standard input
    pub fn new() -> Self {
        Self::with_io(Box::new(StdoutOutput), Box::new(StdinPause))
    }

    /// Create a dispatcher with explicit side-effect capabilities
    pub fn with_io(output: Box<dyn Output>, pause: Box<dyn PauseSource>) -> Self {
        Self {
            output,
            pause,
            profile: ExecutionProfile::new(),
        }
    }

    /// Replace the output sink
    pub fn set_output(&mut self, output: Box<dyn Output>) {
        self.output = output;
    }

    /// Replace the pause acknowledgment source
    pub fn set_pause_source(&mut self, pause: Box<dyn PauseSource>) {
        self.pause = pause;
    }

    /// Statistics gathered so far
    pub fn profile(&self) -> &ExecutionProfile {
        &self.profile
    }

    /// Fetch, decode and execute the instruction at `pc`
    pub fn step(&mut self, ctx: &mut ExecutionState) -> VmResult<StepOutcome> {
        let inst = ctx.fetch()?;
        trace!(
            pc = ctx.current,
            instruction = %inst,
            sp = ctx.sp(),
            fp = ctx.fp,
            "execute"
        );

        self.profile.record_step(inst.opcode());
        let outcome = self.execute(ctx, inst)?;
        self.profile.record_depth(ctx.stack.len());
        Ok(outcome)
    }

    /// Execute one decoded instruction
    ///
    /// `pc` must already point past the instruction and its operands.
    pub fn execute(
        &mut self,
        ctx: &mut ExecutionState,
        inst: Instruction,
    ) -> VmResult<StepOutcome> {
        match inst {
            Instruction::Const(value) => ctx.push(value)?,
            Instruction::Add => Self::binary(ctx, Word::wrapping_add)?,
            Instruction::Sub => Self::binary(ctx, Word::wrapping_sub)?,
            Instruction::Mul => Self::binary(ctx, Word::wrapping_mul)?,
            Instruction::LessThan => Self::binary(ctx, |a, b| flag(a < b))?,
            Instruction::Equal => Self::binary(ctx, |a, b| flag(a == b))?,
            Instruction::Jump(target) => ctx.jump(target)?,
            Instruction::JumpIfTrue(target) => {
                let condition = ctx.pop()?;
                self.branch(ctx, is_exactly_true(condition), target)?;
            }
            Instruction::JumpIfFalse(target) => {
                let condition = ctx.pop()?;
                self.branch(ctx, is_exactly_false(condition), target)?;
            }
            Instruction::Load(offset) => {
                let value = ctx.load_local(offset)?;
                ctx.push(value)?;
            }
            Instruction::Store(offset) => {
                let value = ctx.pop()?;
                ctx.store_local(offset, value)?;
            }
            Instruction::LoadGlobal => {
                let address = ctx.pop()?;
                let value = ctx.load_global(address)?;
                ctx.push(value)?;
            }
            Instruction::StoreGlobal(address) => {
                let value = ctx.pop()?;
                ctx.store_global(address, value)?;
            }
            Instruction::Print => {
                let value = ctx.pop()?;
                self.output.print(value)?;
            }
            Instruction::Pop => {
                ctx.pop()?;
            }
            Instruction::Halt => return Ok(StepOutcome::Halted),
            Instruction::Call { target, argc } => self.call(ctx, target, argc)?,
            Instruction::Return => self.ret(ctx)?,
            Instruction::Pause => {
                debug!(pc = ctx.current, "paused");
                self.pause.acknowledge()?;
                debug!(pc = ctx.current, "resumed");
            }
        }
        Ok(StepOutcome::Continue)
    }

    /// Pop b, pop a, push `op(a, b)`
    fn binary(ctx: &mut ExecutionState, op: impl Fn(Word, Word) -> Word) -> VmResult<()> {
        let b = ctx.pop()?;
        let a = ctx.pop()?;
        ctx.push(op(a, b))
    }

    fn branch(&mut self, ctx: &mut ExecutionState, taken: bool, target: Word) -> VmResult<()> {
        if taken {
            self.profile.record_branch(BranchOutcome::Taken);
            ctx.jump(target)
        } else {
            self.profile.record_branch(BranchOutcome::NotTaken);
            Ok(())
        }
    }

    /// Push argc, fp and the return address, then enter the callee
    fn call(&mut self, ctx: &mut ExecutionState, target: Word, argc: Word) -> VmResult<()> {
        if argc < 0 {
            return Err(VmError::InvalidArgumentCount { argc });
        }
        let return_address = Word::try_from(ctx.pc).map_err(|_| {
            VmError::ProgramCounterOutOfRange {
                pc: ctx.pc as i64,
            }
        })?;

        ctx.push(argc)?;
        // fp is a stack index, bounded by the stack capacity
        ctx.push(ctx.fp as Word)?;
        ctx.push(return_address)?;
        ctx.fp = ctx.stack.len() - 1;
        ctx.jump(target)?;

        self.profile.record_call();
        debug!(target, argc, fp = ctx.fp, "call");
        Ok(())
    }

    /// Unwind the current frame and push the return value for the caller
    fn ret(&mut self, ctx: &mut ExecutionState) -> VmResult<()> {
        let value = ctx.pop()?;

        // sp := fp
        ctx.truncate(ctx.fp + 1)?;
        let return_address = ctx.pop()?;
        let saved_fp = ctx.pop()?;
        let argc = ctx.pop()?;

        if argc < 0 {
            return Err(VmError::InvalidArgumentCount { argc });
        }
        let remaining = ctx
            .stack
            .len()
            .checked_sub(argc as usize)
            .ok_or(VmError::StackUnderflow { pc: ctx.current })?;
        ctx.truncate(remaining)?;

        ctx.fp = usize::try_from(saved_fp)
            .map_err(|_| VmError::StackUnderflow { pc: ctx.current })?;
        ctx.jump(return_address)?;
        ctx.push(value)?;

        self.profile.record_return();
        debug!(return_address, fp = ctx.fp, "return");
        Ok(())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
