use std::fs;
use std::path::Path;

use cpl_core::errors::{CplError, ErrorInfo, FatalKind};
use cpl_core::{GenerationProvenance, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::hash::text_hash;
use crate::serde::{from_json_slice, to_canonical_json_bytes};
use crate::writer::{FieldSummary, RenderedOutputs};

/// File name of the manifest written next to the namcouple.
pub const MANIFEST_FILE: &str = "namcouple.manifest.json";

/// Record of one generation: input and output hashes plus a field summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationManifest {
    /// Manifest schema version.
    pub schema_version: SchemaVersion,
    /// Hashes of the inputs and tool versions.
    pub provenance: GenerationProvenance,
    /// SHA-256 of the written namcouple.
    pub namcouple_sha256: String,
    /// SHA-256 of the written CF name table.
    pub cf_table_sha256: String,
    /// Written fields in output order.
    pub fields: Vec<FieldSummary>,
}

impl GenerationManifest {
    /// Builds the manifest of rendered outputs.
    pub fn new(provenance: GenerationProvenance, rendered: &RenderedOutputs) -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            provenance,
            namcouple_sha256: text_hash(&rendered.namcouple),
            cf_table_sha256: text_hash(&rendered.cf_table),
            fields: rendered.fields.clone(),
        }
    }

    /// Writes the manifest as canonical JSON.
    pub fn write(&self, path: &Path) -> Result<(), CplError> {
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(path, bytes).map_err(|err| io_error("manifest-write", path, err))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, CplError> {
        let bytes = fs::read(path).map_err(|err| io_error("manifest-read", path, err))?;
        from_json_slice(&bytes).map_err(|err| err.with_context("path", path.display().to_string()))
    }
}

pub(crate) fn io_error(stage: &str, path: &Path, err: std::io::Error) -> CplError {
    CplError::from_info(
        FatalKind::OutputIo,
        ErrorInfo::new(FatalKind::OutputIo.code(), err.to_string())
            .with_context("stage", stage)
            .with_context("path", path.display().to_string()),
    )
}
