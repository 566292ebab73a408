//! Execution statistics for a run
//!
//! Tracks how many instructions ran, which opcodes they were, the deepest
//! the call stack got and how conditional branches went.

use std::collections::BTreeMap;

use bytecode_system::Opcode;

/// Branch outcome for profiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOutcome {
    /// Branch was taken
    Taken,
    /// Branch was not taken
    NotTaken,
}

/// Profiling data for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionProfile {
    /// Number of instructions executed
    pub steps: u64,
    /// Executions per opcode mnemonic
    pub opcode_counts: BTreeMap<&'static str, u64>,
    /// Highest number of occupied stack slots seen
    pub max_stack_depth: usize,
    /// Procedure calls made
    pub calls: u64,
    /// Deepest frame nesting reached
    pub max_call_depth: usize,
    /// Conditional branches that jumped
    pub branches_taken: u64,
    /// Conditional branches that fell through
    pub branches_not_taken: u64,
    call_depth: usize,
}

impl ExecutionProfile {
    /// Create new empty profile data
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one executed instruction
    pub fn record_step(&mut self, opcode: Opcode) {
        self.steps += 1;
        *self.opcode_counts.entry(opcode.mnemonic()).or_insert(0) += 1;
    }

    /// Record the stack depth after an instruction
    pub fn record_depth(&mut self, depth: usize) {
        self.max_stack_depth = self.max_stack_depth.max(depth);
    }

    /// Record a conditional branch outcome
    pub fn record_branch(&mut self, outcome: BranchOutcome) {
        match outcome {
            BranchOutcome::Taken => self.branches_taken += 1,
            BranchOutcome::NotTaken => self.branches_not_taken += 1,
        }
    }

    /// Record entry into a procedure
    pub fn record_call(&mut self) {
        self.calls += 1;
        self.call_depth += 1;
        self.max_call_depth = self.max_call_depth.max(self.call_depth);
    }

    /// Record a return from a procedure
    pub fn record_return(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Executions of one opcode
    pub fn count(&self, opcode: Opcode) -> u64 {
        self.opcode_counts
            .get(opcode.mnemonic())
            .copied()
            .unwrap_or(0)
    }
}
