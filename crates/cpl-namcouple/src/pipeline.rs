//! End-to-end compilation: build, expand, check, order, render, write.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use cpl_core::errors::CplError;
use cpl_core::{CouplingField, GenerationProvenance};
use tracing::{info, warn};

use crate::checker::check_run_context;
use crate::defaults::expand_defaults;
use crate::hash::stable_hash_string;
use crate::manifest::{io_error, GenerationManifest, MANIFEST_FILE};
use crate::names::ResolveContext;
use crate::requests::CouplingRequest;
use crate::run_info::RunInfo;
use crate::writer::{render, RenderedOutputs};

/// Namcouple file name.
pub const NAMCOUPLE_FILE: &str = "namcouple";
/// CF name table file name.
pub const CF_TABLE_FILE: &str = "cf_name_table.txt";

/// Result of an in-memory compilation.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// Run context after frequency tightening.
    pub run_info: RunInfo,
    /// Weight-ordered records, `remove` records included.
    pub fields: Vec<CouplingField>,
    /// Rendered output text.
    pub rendered: RenderedOutputs,
    /// Input hashes.
    pub provenance: GenerationProvenance,
}

/// Paths of the files written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    /// Written namcouple.
    pub namcouple: PathBuf,
    /// Written CF name table.
    pub cf_table: PathBuf,
    /// Written manifest.
    pub manifest: PathBuf,
}

/// Compiles `requests` against `run_info` without touching the filesystem
/// beyond the STASHmaster read.
pub fn compile(mut run_info: RunInfo, requests: &[CouplingRequest]) -> Result<Compiled, CplError> {
    let mut fields = Vec::new();
    for request in requests {
        fields.extend(request.build()?);
    }
    let mut fields = expand_defaults(fields, &run_info)?;
    check_run_context(&mut run_info, &fields)?;
    fields.sort_by_key(|field| field.weight);

    let rendered = {
        let mut ctx = ResolveContext::new(&run_info);
        render(&mut ctx, &fields)?
    };

    let mut provenance = GenerationProvenance {
        run_info_hash: stable_hash_string(&run_info)?,
        couplings_hash: stable_hash_string(&requests)?,
        ..GenerationProvenance::default()
    };
    provenance.tool_versions.insert(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    info!(fields = rendered.fields.len(), "compiled namcouple");
    Ok(Compiled {
        run_info,
        fields,
        rendered,
        provenance,
    })
}

/// Writes the namcouple, the CF name table and the manifest into `dir`.
pub fn write_outputs(compiled: &Compiled, dir: &Path) -> Result<WrittenOutputs, CplError> {
    fs::create_dir_all(dir).map_err(|err| io_error("mkdir", dir, err))?;
    let written = WrittenOutputs {
        namcouple: dir.join(NAMCOUPLE_FILE),
        cf_table: dir.join(CF_TABLE_FILE),
        manifest: dir.join(MANIFEST_FILE),
    };
    fs::write(&written.namcouple, &compiled.rendered.namcouple)
        .map_err(|err| io_error("namcouple-write", &written.namcouple, err))?;
    fs::write(&written.cf_table, &compiled.rendered.cf_table)
        .map_err(|err| io_error("cf-table-write", &written.cf_table, err))?;
    GenerationManifest::new(compiled.provenance.clone(), &compiled.rendered)
        .write(&written.manifest)?;
    info!(dir = %dir.display(), "wrote namcouple outputs");
    Ok(written)
}

/// Runs the regeneration program; its outcome is logged only.
pub fn regenerate(command: &Path) {
    match Command::new(command).status() {
        Ok(status) if status.success() => {
            info!(command = %command.display(), "regeneration finished");
        }
        Ok(status) => {
            warn!(command = %command.display(), %status, "regeneration reported failure");
        }
        Err(err) => {
            warn!(command = %command.display(), error = %err, "regeneration could not start");
        }
    }
}
