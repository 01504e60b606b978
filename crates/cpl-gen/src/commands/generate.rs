use std::path::PathBuf;

use clap::Args;
use cpl_core::CplError;
use cpl_namcouple::{compile, load_requests, load_run_info, regenerate, write_outputs};
use tracing::info;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// YAML run context.
    #[arg(long)]
    pub run_info: PathBuf,
    /// YAML file listing the coupling requests.
    #[arg(long)]
    pub couplings: PathBuf,
    /// Directory receiving namcouple, cf_name_table.txt and the manifest.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Skip the regeneration program even when one is configured.
    #[arg(long)]
    pub no_regenerate: bool,
}

pub fn run(args: &GenerateArgs) -> Result<(), CplError> {
    let run_info = load_run_info(&args.run_info)?;
    let requests = load_requests(&args.couplings)?;
    let command = run_info
        .regenerate_command
        .as_deref()
        .map(|command| run_info.resolve_path(command));

    let compiled = compile(run_info, &requests)?;
    let written = write_outputs(&compiled, &args.out)?;
    println!("{}", written.namcouple.display());
    println!("{}", written.cf_table.display());
    println!("{}", written.manifest.display());

    match command {
        Some(command) if !args.no_regenerate => regenerate(&command),
        Some(_) => info!("regeneration skipped"),
        None => {}
    }
    Ok(())
}
