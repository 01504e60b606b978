use clap::Args;
use cpl_core::{CplError, SchemaVersion};
use cpl_namcouple::serde::to_canonical_json_bytes;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Emit the manifest schema version alongside the crate version.
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
    manifest_schema: SchemaVersion,
}

pub fn run(args: &VersionArgs) -> Result<(), CplError> {
    if !args.long {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let info = VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
        manifest_schema: SchemaVersion::default(),
    };
    let json = to_canonical_json_bytes(&info)?;
    println!("{}", String::from_utf8_lossy(&json));
    Ok(())
}
