use std::path::PathBuf;

use clap::Args;
use cpl_core::CplError;
use cpl_namcouple::{compile, load_requests, load_run_info};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// YAML run context.
    #[arg(long)]
    pub run_info: PathBuf,
    /// YAML file listing the coupling requests.
    #[arg(long)]
    pub couplings: PathBuf,
}

pub fn run(args: &CheckArgs) -> Result<(), CplError> {
    let run_info = load_run_info(&args.run_info)?;
    let requests = load_requests(&args.couplings)?;
    let compiled = compile(run_info, &requests)?;
    for field in &compiled.rendered.fields {
        println!(
            "{:>4} {:>6} seq={:<2} {} -> {} {} -> {} {} {}x{} every {}s",
            field.index,
            field.weight,
            field.seq,
            field.origin,
            field.dest,
            field.source,
            field.target,
            field.mapping,
            field.grid,
            field.nlev,
            field.period
        );
    }
    println!("{} fields", compiled.rendered.fields.len());
    Ok(())
}
