//! Runtime orchestration for program execution
//!
//! The Runtime struct coordinates the components:
//! - Program loading from JSON or binary artifacts
//! - Static validation and disassembly
//! - VM construction with the configured pause behavior and step limit

use std::path::Path;

use bytecode_system::Program;
use interpreter::{AutoResume, ExecutionProfile, StdinPause, StdoutOutput, VM};
use tracing::{debug, info};

use crate::error::CliResult;
use crate::repl;

/// Main runtime that loads, inspects and executes programs
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    /// Entry address replacing the artifact's
    entry: Option<usize>,
    /// Store size replacing the artifact's
    datasize: Option<usize>,
    /// Whether PAUSE resumes immediately
    auto_resume: bool,
    /// Maximum number of instructions per run
    step_limit: Option<u64>,
}

impl Runtime {
    /// Create a new runtime instance
    ///
    /// # Example
    /// ```
    /// use vmes_cli::Runtime;
    ///
    /// let runtime = Runtime::new().with_auto_resume(true);
    /// assert!(runtime.is_auto_resume_enabled());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry address of every loaded program
    pub fn with_entry(mut self, entry: Option<usize>) -> Self {
        self.entry = entry;
        self
    }

    /// Replace the store size of every loaded program
    pub fn with_datasize(mut self, datasize: Option<usize>) -> Self {
        self.datasize = datasize;
        self
    }

    /// Acknowledge PAUSE without reading standard input
    pub fn with_auto_resume(mut self, enabled: bool) -> Self {
        self.auto_resume = enabled;
        self
    }

    /// Bound the number of executed instructions
    pub fn with_step_limit(mut self, limit: Option<u64>) -> Self {
        self.step_limit = limit;
        self
    }

    /// Check if PAUSE resumes automatically
    pub fn is_auto_resume_enabled(&self) -> bool {
        self.auto_resume
    }

    /// Read a program artifact
    ///
    /// Files ending in `.json` are read as JSON, anything else as the binary
    /// format. Entry and datasize overrides are applied.
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read or decoded
    ///
    /// # Example
    /// ```no_run
    /// use vmes_cli::Runtime;
    ///
    /// let runtime = Runtime::new();
    /// let program = runtime.load_file("program.json").unwrap();
    /// ```
    pub fn load_file(&self, path: impl AsRef<Path>) -> CliResult<Program> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let program = if is_json {
            Program::from_json(&std::fs::read_to_string(path)?)?
        } else {
            Program::from_bytes(&std::fs::read(path)?)?
        };
        info!(path = %path.display(), words = program.len(), "loaded program");
        self.prepare(program)
    }

    /// Apply the entry and datasize overrides
    ///
    /// # Errors
    /// Returns `CliError::Program` if the resulting storage size is over the
    /// limit
    pub fn prepare(&self, mut program: Program) -> CliResult<Program> {
        if let Some(entry) = self.entry {
            program.entry = entry;
        }
        if let Some(datasize) = self.datasize {
            program.datasize = datasize;
        }
        program.check_limits()?;
        Ok(program)
    }

    /// Build a VM wired to standard output with the configured pause source
    pub fn build_vm(&self, program: &Program) -> VM {
        let vm = VM::from_program(program).with_output(StdoutOutput);
        let vm = if self.auto_resume {
            vm.with_pause_source(AutoResume::new())
        } else {
            vm.with_pause_source(StdinPause)
        };
        match self.step_limit {
            Some(limit) => vm.with_step_limit(limit),
            None => vm,
        }
    }

    /// Run a program until HALT
    ///
    /// # Returns
    /// Statistics for the completed run
    ///
    /// # Errors
    /// Returns `CliError::Vm` if the run stops on a fatal error
    pub fn execute(&self, program: &Program) -> CliResult<ExecutionProfile> {
        self.run_vm(self.build_vm(program))
    }

    /// Run an already configured VM until HALT
    pub fn run_vm(&self, mut vm: VM) -> CliResult<ExecutionProfile> {
        vm.run()?;
        debug!(steps = vm.profile().steps, "run complete");
        Ok(vm.profile().clone())
    }

    /// Load and run a program artifact
    pub fn execute_file(&self, path: impl AsRef<Path>) -> CliResult<ExecutionProfile> {
        let program = self.load_file(path)?;
        self.execute(&program)
    }

    /// Run the static checks
    pub fn validate(&self, program: &Program) -> CliResult<()> {
        program.validate()?;
        Ok(())
    }

    /// Disassembly listing of the program
    pub fn disassemble(&self, program: &Program) -> CliResult<String> {
        Ok(program.listing()?)
    }

    /// Write the program in the binary artifact format
    pub fn emit_binary(&self, program: &Program, path: impl AsRef<Path>) -> CliResult<()> {
        std::fs::write(path.as_ref(), program.to_bytes()?)?;
        info!(path = %path.as_ref().display(), "wrote binary program");
        Ok(())
    }

    /// Start the interactive step debugger on a program
    pub fn debug(&self, program: &Program) -> CliResult<()> {
        repl::run_debugger(self.build_vm(program))
    }
}
