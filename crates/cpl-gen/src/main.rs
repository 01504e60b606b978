use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    check::{self, CheckArgs},
    generate::{self, GenerateArgs},
    version::{self, VersionArgs},
};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "cpl-gen", about = "Namcouple coupling-configuration compiler")]
struct Cli {
    /// Raise the log level (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the couplings and write namcouple, CF table and manifest.
    Generate(GenerateArgs),
    /// Compile the couplings without writing and print a field summary.
    Check(CheckArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let outcome = match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Check(args) => check::run(&args),
        Command::Version(args) => version::run(&args),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cpl-gen: {err}");
            if let Some(hint) = &err.info().hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
