//! VMES bytecode virtual machine CLI
//!
//! Entry point for the `vmes` binary. Parses CLI arguments and delegates to
//! the Runtime for loading, inspection and execution.

use std::process::ExitCode;

use bytecode_system::Program;
use clap::Parser as ClapParser;
use vmes_cli::{init_logging, Cli, CliResult, Runtime};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let runtime = Runtime::new()
        .with_entry(cli.entry)
        .with_datasize(cli.datasize)
        .with_auto_resume(cli.no_pause)
        .with_step_limit(cli.max_steps);

    let program = if let Some(file) = &cli.file {
        runtime.load_file(file)?
    } else if cli.demo {
        runtime.prepare(Program::demo())?
    } else {
        print_usage();
        return Ok(());
    };

    if let Some(path) = &cli.emit_binary {
        runtime.emit_binary(&program, path)?;
    }
    if cli.validate {
        runtime.validate(&program)?;
        println!(
            "ok: {} words, entry {}, datasize {}",
            program.len(),
            program.entry,
            program.datasize
        );
    }
    if cli.disassemble {
        print!("{}", runtime.disassemble(&program)?);
    }
    if cli.is_inspection() {
        return Ok(());
    }

    if cli.debug {
        runtime.debug(&program)
    } else {
        runtime.execute(&program).map(|_| ())
    }
}

fn print_usage() {
    println!("VMES bytecode virtual machine v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  vmes --file <PATH>          Run a program (.json or binary)");
    println!("  vmes --demo                 Run the built-in demo program");
    println!("  vmes --file <PATH> -d       Print the disassembly");
    println!("  vmes --file <PATH> -g       Start the step debugger");
    println!();
    println!("Run 'vmes --help' for more options.");
}
