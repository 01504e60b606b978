use std::fs;
use std::path::Path;

use cpl_core::errors::{CplError, ErrorInfo, FatalKind};
use cpl_core::{Component, CouplingField};
use serde::{Deserialize, Serialize};

use crate::builder::build_couplings;
use crate::serde::from_yaml_slice;

/// Coupling lines contributed by one calling component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouplingRequest {
    /// Component sending every field of the request.
    pub origin: Component,
    /// Selects hybrid atmosphere-to-atmosphere resolution.
    #[serde(default)]
    pub hybrid: bool,
    /// Index into the direction's frequency schedule.
    #[serde(default)]
    pub freq_selector: usize,
    /// Declarative coupling specifications.
    pub specs: Vec<String>,
}

impl CouplingRequest {
    /// Expands the request through the coupling list builder.
    pub fn build(&self) -> Result<Vec<CouplingField>, CplError> {
        build_couplings(self.origin, self.hybrid, self.freq_selector, &self.specs)
            .map_err(|err| err.with_context("origin", self.origin.tag()))
    }
}

/// Top-level layout of a couplings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouplingsFile {
    /// Requests in call order.
    pub requests: Vec<CouplingRequest>,
}

/// Loads the coupling requests listed in a YAML file.
pub fn load_requests<P: AsRef<Path>>(path: P) -> Result<Vec<CouplingRequest>, CplError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        CplError::from_info(
            FatalKind::RunInfoInvalid,
            ErrorInfo::new(FatalKind::RunInfoInvalid.code(), err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let file: CouplingsFile = from_yaml_slice(&bytes)
        .map_err(|err| err.with_context("path", path.display().to_string()))?;
    Ok(file.requests)
}
