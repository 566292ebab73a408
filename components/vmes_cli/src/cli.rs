//! Command-line arguments and logging setup

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Run, inspect or debug a VMES bytecode program
#[derive(Debug, Parser)]
#[command(name = "vmes", version, about = "Stack bytecode virtual machine")]
pub struct Cli {
    /// Program artifact to load (`.json` or binary)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<String>,

    /// Run the built-in demo program
    #[arg(long, conflicts_with = "file")]
    pub demo: bool,

    /// Override the entry address
    #[arg(short, long, value_name = "ADDR")]
    pub entry: Option<usize>,

    /// Override the variable store size
    #[arg(long, value_name = "N")]
    pub datasize: Option<usize>,

    /// Print the disassembly instead of running
    #[arg(short, long)]
    pub disassemble: bool,

    /// Run the static checks and report
    #[arg(long)]
    pub validate: bool,

    /// Log every executed instruction to stderr
    #[arg(short, long)]
    pub trace: bool,

    /// Resume from PAUSE without waiting for input
    #[arg(long)]
    pub no_pause: bool,

    /// Stop with an error after this many instructions
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u64>,

    /// Start the interactive step debugger
    #[arg(short = 'g', long)]
    pub debug: bool,

    /// Write the loaded program in the binary format
    #[arg(long, value_name = "PATH")]
    pub emit_binary: Option<String>,
}

impl Cli {
    /// Whether a program source was given
    pub fn has_program(&self) -> bool {
        self.file.is_some() || self.demo
    }

    /// Whether the invocation only inspects or converts the program
    pub fn is_inspection(&self) -> bool {
        self.disassemble || self.validate || self.emit_binary.is_some()
    }

    /// Log filter used when `RUST_LOG` is not set, or always under `--trace`
    pub fn log_filter(&self) -> &'static str {
        if self.trace {
            "warn,interpreter=trace"
        } else {
            "warn"
        }
    }
}

/// Initialize logging to stderr
///
/// `RUST_LOG` overrides the default filter unless `trace` is set.
pub fn init_logging(cli: &Cli) {
    let filter = if cli.trace {
        EnvFilter::new(cli.log_filter())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
