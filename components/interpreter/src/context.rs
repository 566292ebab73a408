//! Execution state for the VM

use arrayvec::ArrayVec;
use bytecode_system::Instruction;
use core_types::{VmError, VmResult, Word};

/// Fixed capacity of the call stack, in words
pub const STACK_CAPACITY: usize = 100;

/// Mutable state of one run
///
/// Holds the code being executed, the two addressable regions and the
/// cursors:
/// - the **call stack**: operand stack, frame-relative locals (`LOAD`/`STORE`)
///   and call bookkeeping (`CALL`/`RET`)
/// - the **variable store**: a flat word array addressed absolutely
///   (`GLOAD`/`GSTORE`)
///
/// The stack pointer is not stored separately: `sp` is always the index of
/// the top occupied slot, `-1` when the stack is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionState {
    /// The code sequence, fixed for the run
    pub code: Vec<Word>,
    /// Flat variable store
    pub store: Vec<Word>,
    /// Call stack
    pub stack: ArrayVec<Word, STACK_CAPACITY>,
    /// Address of the next code word to fetch
    pub pc: usize,
    /// Base of the current frame
    pub fp: usize,
    /// Address of the instruction currently executing
    pub current: usize,
}

impl ExecutionState {
    /// Create the state for a run starting at `entry`
    ///
    /// The variable store holds `datasize` zeroed words.
    pub fn new(code: Vec<Word>, entry: usize, datasize: usize) -> Self {
        Self {
            code,
            store: vec![0; datasize],
            stack: ArrayVec::new(),
            pc: entry,
            fp: 0,
            current: entry,
        }
    }

    /// Index of the top occupied stack slot, `-1` when empty
    pub fn sp(&self) -> isize {
        self.stack.len() as isize - 1
    }

    /// Decode the instruction at `pc` and advance `pc` past it
    pub fn fetch(&mut self) -> VmResult<Instruction> {
        self.current = self.pc;
        let (inst, next) = Instruction::decode(&self.code, self.pc)?;
        self.pc = next;
        Ok(inst)
    }

    /// Set `pc` to a branch target or return address
    pub fn jump(&mut self, target: Word) -> VmResult<()> {
        self.pc = usize::try_from(target).map_err(|_| VmError::ProgramCounterOutOfRange {
            pc: i64::from(target),
        })?;
        Ok(())
    }

    /// Push a word onto the call stack
    pub fn push(&mut self, value: Word) -> VmResult<()> {
        self.stack
            .try_push(value)
            .map_err(|_| VmError::StackOverflow {
                capacity: STACK_CAPACITY,
            })
    }

    /// Pop the top word off the call stack
    pub fn pop(&mut self) -> VmResult<Word> {
        self.stack
            .pop()
            .ok_or(VmError::StackUnderflow { pc: self.current })
    }

    /// Read the top word without popping it
    pub fn peek(&self) -> Option<Word> {
        self.stack.last().copied()
    }

    /// Drop slots so that exactly `len` remain
    pub fn truncate(&mut self, len: usize) -> VmResult<()> {
        if len > self.stack.len() {
            return Err(VmError::StackUnderflow { pc: self.current });
        }
        self.stack.truncate(len);
        Ok(())
    }

    /// Resolve a frame-relative offset to an occupied stack slot
    fn local_slot(&self, offset: Word) -> VmResult<usize> {
        let slot = self.fp as i64 + i64::from(offset);
        if slot < 0 {
            return Err(VmError::StackUnderflow { pc: self.current });
        }
        if slot as usize >= self.stack.len() {
            return Err(VmError::LocalOutOfRange { slot, sp: self.sp() });
        }
        Ok(slot as usize)
    }

    /// Read the stack slot at `fp + offset`
    pub fn load_local(&self, offset: Word) -> VmResult<Word> {
        let slot = self.local_slot(offset)?;
        Ok(self.stack[slot])
    }

    /// Write the stack slot at `fp + offset`
    pub fn store_local(&mut self, offset: Word, value: Word) -> VmResult<()> {
        let slot = self.local_slot(offset)?;
        self.stack[slot] = value;
        Ok(())
    }

    fn global_slot(&self, address: Word) -> VmResult<usize> {
        usize::try_from(address)
            .ok()
            .filter(|slot| *slot < self.store.len())
            .ok_or(VmError::StorageOutOfRange {
                address,
                size: self.store.len(),
            })
    }

    /// Read the variable store at an absolute address
    pub fn load_global(&self, address: Word) -> VmResult<Word> {
        let slot = self.global_slot(address)?;
        Ok(self.store[slot])
    }

    /// Write the variable store at an absolute address
    pub fn store_global(&mut self, address: Word, value: Word) -> VmResult<()> {
        let slot = self.global_slot(address)?;
        self.store[slot] = value;
        Ok(())
    }
}
