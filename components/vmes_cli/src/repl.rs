//! Interactive step debugger

use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::{CliError, CliResult};
use interpreter::{StepOutcome, VM};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// One debugger command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Execute up to `n` instructions
    Step(usize),
    /// Run until HALT or a fatal error
    Continue,
    /// Show the call stack
    Stack,
    /// Show the variable store
    Store,
    /// Show the active procedure frames
    Frames,
    /// Show the next instruction
    Where,
    /// List the commands
    Help,
    /// Leave the debugger
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = match words.next() {
            None | Some("s") | Some("step") => {
                let count = match words.next() {
                    Some(n) => n
                        .parse()
                        .map_err(|_| format!("invalid step count: {}", n))?,
                    None => 1,
                };
                Command::Step(count)
            }
            Some("c") | Some("continue") => Command::Continue,
            Some("stack") => Command::Stack,
            Some("store") => Command::Store,
            Some("f") | Some("frames") => Command::Frames,
            Some("w") | Some("where") => Command::Where,
            Some("h") | Some("help") => Command::Help,
            Some("q") | Some("quit") | Some("exit") => Command::Quit,
            Some(other) => return Err(format!("Unknown command: {}", other)),
        };
        match words.next() {
            Some(extra) => Err(format!("unexpected argument: {}", extra)),
            None => Ok(command),
        }
    }
}

/// Reply to a debugger command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to show; the session goes on
    Show(String),
    /// The session ends
    Quit,
}

/// Instructions `continue` runs before handing the prompt back
pub const CONTINUE_CHUNK: usize = 1_000_000;

/// Step debugger state around one VM
#[derive(Debug)]
pub struct Debugger {
    vm: VM,
    continue_chunk: usize,
}

impl Debugger {
    /// Wrap a freshly built VM
    pub fn new(vm: VM) -> Self {
        Self {
            vm,
            continue_chunk: CONTINUE_CHUNK,
        }
    }

    /// Set how many instructions one `continue` may run
    pub fn with_continue_chunk(mut self, chunk: usize) -> Self {
        self.continue_chunk = chunk.max(1);
        self
    }

    /// The debugged machine
    pub fn vm(&self) -> &VM {
        &self.vm
    }

    /// Execute one command
    pub fn handle(&mut self, command: Command) -> Reply {
        let text = match command {
            Command::Step(count) => self.step(count),
            Command::Continue => self.resume(),
            Command::Stack => format!(
                "{:?}  sp={} fp={}",
                self.vm.stack(),
                self.vm.sp(),
                self.vm.fp()
            ),
            Command::Store => format!("{:?}", self.vm.store()),
            Command::Frames => self.frames(),
            Command::Where => self.location(),
            Command::Help => HELP.to_string(),
            Command::Quit => return Reply::Quit,
        };
        Reply::Show(text)
    }

    fn step(&mut self, count: usize) -> String {
        for _ in 0..count {
            match self.vm.step() {
                Ok(StepOutcome::Continue) => {}
                Ok(StepOutcome::Halted) => return "halted".to_string(),
                Err(e) => return CliError::from(e).to_string(),
            }
        }
        self.location()
    }

    fn resume(&mut self) -> String {
        let text = self.step(self.continue_chunk);
        if self.vm.is_halted() || self.vm.fault().is_some() {
            return text;
        }
        format!("still running after {} steps\n{}", self.continue_chunk, text)
    }

    fn location(&self) -> String {
        if self.vm.is_halted() {
            return "halted".to_string();
        }
        if let Some(fault) = self.vm.fault() {
            return format!("faulted: {}", fault);
        }
        match self.vm.current_instruction() {
            Some(inst) => format!("{:04}  {}", self.vm.pc(), inst),
            None => format!("{:04}  <no instruction>", self.vm.pc()),
        }
    }

    fn frames(&self) -> String {
        let frames = self.vm.frames();
        if frames.is_empty() {
            return "(top level)".to_string();
        }
        let mut text = String::new();
        for (depth, frame) in frames.iter().enumerate() {
            if depth > 0 {
                text.push('\n');
            }
            let _ = write!(
                text,
                "#{} fp={} return={} argc={}",
                depth, frame.base, frame.return_address, frame.argc
            );
            if let Some(args) = frame.arguments(self.vm.stack()) {
                let _ = write!(text, " args={:?}", args);
            }
        }
        text
    }
}

const HELP: &str = "\
Debugger Commands:
  step [n]   - Execute n instructions (default 1)
  continue   - Run until HALT, an error or the step chunk
  stack      - Show the call stack
  store      - Show the variable store
  frames     - Show active procedure frames
  where      - Show the next instruction
  help       - Show this help message
  quit       - Exit the debugger";

/// Run the interactive debugger
///
/// # Arguments
/// * `vm` - The machine to debug, before its first step
///
/// # Returns
/// `Ok(())` when the debugger exits normally
pub fn run_debugger(vm: VM) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;
    let mut debugger = Debugger::new(vm);

    println!("VMES debugger. Type 'help' for commands.");
    println!("{}", debugger.location());

    loop {
        match editor.readline("(vmes) ") {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = editor.add_history_entry(trimmed);
                }
                let command = match trimmed.parse::<Command>() {
                    Ok(command) => command,
                    Err(message) => {
                        eprintln!("{}", message);
                        continue;
                    }
                };
                match debugger.handle(command) {
                    Reply::Show(text) => println!("{}", text),
                    Reply::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Press Ctrl-D or type 'quit' to exit");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}
