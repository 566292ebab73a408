//! Side-effect capabilities of the machine
//!
//! `PRINT` and `PAUSE` are the only instructions that reach outside the
//! execution state. Each goes through a trait object the embedder supplies,
//! so tests can capture output and resume pauses without touching the
//! process's standard streams.

use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use core_types::{VmError, VmResult, Word};

/// Destination of `PRINT`
pub trait Output {
    /// Emit one popped value
    fn print(&mut self, value: Word) -> VmResult<()>;
}

/// Acknowledgment source that `PAUSE` blocks on
pub trait PauseSource {
    /// Block until the run may resume
    fn acknowledge(&mut self) -> VmResult<()>;
}

/// Writes each printed value on its own line to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutOutput;

impl Output for StdoutOutput {
    fn print(&mut self, value: Word) -> VmResult<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", value)?;
        handle.flush()?;
        Ok(())
    }
}

/// Captures printed values in memory
///
/// Clones share one buffer, so a handle kept by the embedder sees everything
/// the VM printed.
#[derive(Debug, Default, Clone)]
pub struct SharedOutput {
    values: Rc<RefCell<Vec<Word>>>,
}

impl SharedOutput {
    /// Create an empty capture buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Values printed so far, in program order
    pub fn values(&self) -> Vec<Word> {
        self.values.borrow().clone()
    }

    /// Take the captured values, leaving the buffer empty
    pub fn take(&self) -> Vec<Word> {
        std::mem::take(&mut *self.values.borrow_mut())
    }
}

impl Output for SharedOutput {
    fn print(&mut self, value: Word) -> VmResult<()> {
        self.values.borrow_mut().push(value);
        Ok(())
    }
}

/// Prompts on standard output and waits for one line on standard input
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPause;

impl PauseSource for StdinPause {
    fn acknowledge(&mut self) -> VmResult<()> {
        {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "Paused. Press enter to continue.")?;
            handle.flush()?;
        }

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(VmError::Io(
                "standard input closed while paused".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resumes immediately, counting how many pauses it acknowledged
#[derive(Debug, Default, Clone)]
pub struct AutoResume {
    count: Rc<Cell<usize>>,
}

impl AutoResume {
    /// Create a source with a zero count
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pauses acknowledged by this source and its clones
    pub fn count(&self) -> usize {
        self.count.get()
    }
}

impl PauseSource for AutoResume {
    fn acknowledge(&mut self) -> VmResult<()> {
        self.count.set(self.count.get() + 1);
        Ok(())
    }
}
