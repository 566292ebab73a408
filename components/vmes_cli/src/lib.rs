//! VMES command-line front end
//!
//! Provides the Runtime struct and supporting modules for the `vmes` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod repl;
pub mod runtime;

pub use cli::{init_logging, Cli};
pub use error::{CliError, CliResult};
pub use runtime::Runtime;
