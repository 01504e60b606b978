use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use cpl_core::errors::{CplError, ErrorInfo, FatalKind};
use cpl_core::{Component, CouplingField, Direction};
use serde::{Deserialize, Serialize};

use crate::serde::from_yaml_slice;

/// Name of the atmosphere STASH catalogue inside `stashmaster_dir`.
pub const STASHMASTER_FILE: &str = "STASHmaster_A";

fn missing_var(what: impl Into<String>) -> CplError {
    let what = what.into();
    CplError::from_info(
        FatalKind::NotFoundCplVar,
        ErrorInfo::new(
            FatalKind::NotFoundCplVar.code(),
            format!("run context has no entry for {what}"),
        )
        .with_context("key", what),
    )
}

/// Grid and level description of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// Grid name used to build OASIS grid names and 1D size lookups.
    pub grid: String,
    /// Horizontal resolution as `[nx, ny]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<[u32; 2]>,
    /// Number of model levels (atmosphere instances only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_levels: Option<u32>,
    /// Number of soil levels (atmosphere instances only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_levels: Option<u32>,
}

/// Coupling frequencies of one direction: the primary period and an optional
/// statistics companion, both in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct FrequencySchedule {
    /// Primary coupling period.
    pub primary: u32,
    /// Statistics coupling period, when statistics coupling is enabled.
    pub statistics: Option<u32>,
}

impl FrequencySchedule {
    /// Number of configured frequencies.
    pub fn len(&self) -> usize {
        1 + usize::from(self.statistics.is_some())
    }

    /// Returns the frequency picked by `selector` (0 primary, 1 statistics).
    pub fn select(&self, selector: usize) -> Option<u32> {
        match selector {
            0 => Some(self.primary),
            1 => self.statistics,
            _ => None,
        }
    }
}

impl TryFrom<Vec<u32>> for FrequencySchedule {
    type Error = String;

    fn try_from(values: Vec<u32>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [primary] => Ok(Self {
                primary: *primary,
                statistics: None,
            }),
            [primary, statistics] => Ok(Self {
                primary: *primary,
                statistics: Some(*statistics),
            }),
            other => Err(format!(
                "a coupling frequency schedule holds one or two periods, got {}",
                other.len()
            )),
        }
    }
}

impl From<FrequencySchedule> for Vec<u32> {
    fn from(schedule: FrequencySchedule) -> Self {
        std::iter::once(schedule.primary)
            .chain(schedule.statistics)
            .collect()
    }
}

/// Run context consumed by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Per-component grid and level description.
    pub components: BTreeMap<Component, ComponentInfo>,
    /// Per-direction coupling frequency schedules.
    #[serde(default)]
    pub coupling_frequencies: BTreeMap<Direction, FrequencySchedule>,
    /// Executables listed under `$NBMODEL`, in launch order.
    #[serde(default)]
    pub executables: Vec<String>,
    /// Fields written with `EXPOUT` rather than `EXPORTED`.
    #[serde(default)]
    pub expout_fields: BTreeSet<String>,
    /// Fields whose remapping weights are generated on the fly.
    #[serde(default)]
    pub create_remap_fields: BTreeSet<String>,
    /// Vector lengths of one-dimensional grids, keyed by grid name.
    #[serde(default)]
    pub one_d_grid_sizes: BTreeMap<String, u32>,
    /// Coupler debug verbosity (`$NLOGPRT`).
    #[serde(default)]
    pub nlogprt: u32,
    /// Total run length in seconds (`$RUNTIME`).
    pub runtime: u64,
    /// Initial date (`$INIDATE`).
    pub inidate: String,
    /// Calendar type (`$CALTYPE`).
    #[serde(default = "RunInfo::default_caltype")]
    pub caltype: String,
    /// Directory holding the STASHmaster catalogue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stashmaster_dir: Option<PathBuf>,
    /// Shared namelist the run context was assembled from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_namelist: Option<PathBuf>,
    /// Program regenerating dependent artefacts from the written namcouple.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regenerate_command: Option<PathBuf>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl RunInfo {
    fn default_caltype() -> String {
        "1".into()
    }

    /// Description of `component`, or `NOT_FOUND_CPL_VAR`.
    pub fn component(&self, component: Component) -> Result<&ComponentInfo, CplError> {
        self.components
            .get(&component)
            .ok_or_else(|| missing_var(format!("component {component}")))
    }

    /// Whether `component` is part of this run.
    pub fn has_component(&self, component: Component) -> bool {
        self.components.contains_key(&component)
    }

    /// Frequency schedule of `direction`, or `NOT_FOUND_CPL_VAR`.
    pub fn schedule(&self, direction: Direction) -> Result<&FrequencySchedule, CplError> {
        self.coupling_frequencies
            .get(&direction)
            .ok_or_else(|| missing_var(format!("{direction}_freq")))
    }

    /// Coupling period in seconds for `field`.
    pub fn frequency_for(&self, field: &CouplingField) -> Result<u32, CplError> {
        if let Some(seconds) = field.freq_override {
            return Ok(seconds);
        }
        let direction = field.direction();
        let schedule = self.schedule(direction)?;
        schedule.select(field.freq_selector).ok_or_else(|| {
            CplError::fatal(
                FatalKind::NotEnoughCplFreq,
                format!(
                    "{direction} has {} coupling frequencies, selector {} needs {}",
                    schedule.len(),
                    field.freq_selector,
                    field.freq_selector + 1
                ),
            )
            .with_context("field", field.name_out.clone())
        })
    }

    /// Number of model levels of an atmosphere instance.
    pub fn model_levels(&self, component: Component) -> Result<u32, CplError> {
        self.component(component)?
            .model_levels
            .ok_or_else(|| missing_var(format!("{component} model_levels")))
    }

    /// Number of soil levels of an atmosphere instance.
    pub fn soil_levels(&self, component: Component) -> Result<u32, CplError> {
        self.component(component)?
            .soil_levels
            .ok_or_else(|| missing_var(format!("{component} soil_levels")))
    }

    /// Horizontal resolution `(nx, ny)` of `component`.
    pub fn resolution(&self, component: Component) -> Result<(u32, u32), CplError> {
        let info = self.component(component)?;
        info.resolution
            .map(|[nx, ny]| (nx, ny))
            .ok_or_else(|| {
                CplError::fatal(
                    FatalKind::MissingResolution,
                    format!("no horizontal resolution configured for {component}"),
                )
                .with_context("grid", info.grid.clone())
                .with_hint("set `resolution: [nx, ny]` for the component in the run context")
            })
    }

    /// OASIS grid name for `component` on the grid tagged `grid`.
    pub fn oasis_grid_name(&self, component: Component, grid: char) -> Result<String, CplError> {
        Ok(format!("{}{}", self.component(component)?.grid, grid))
    }

    /// Vector length of the one-dimensional grid of `component`.
    pub fn one_d_size(&self, component: Component) -> Result<u32, CplError> {
        let grid = &self.component(component)?.grid;
        self.one_d_grid_sizes.get(grid).copied().ok_or_else(|| {
            CplError::fatal(
                FatalKind::Unknown1dGridSize,
                format!("no vector length configured for one-dimensional grid '{grid}'"),
            )
            .with_context("component", component.tag())
        })
    }

    /// Location of the STASHmaster catalogue.
    pub fn stashmaster_path(&self) -> Result<PathBuf, CplError> {
        let dir = self.stashmaster_dir.as_ref().ok_or_else(|| {
            CplError::fatal(
                FatalKind::MissingStashmaster,
                "no STASHmaster directory configured",
            )
            .with_hint("hybrid couplings need `stashmaster_dir` in the run context")
        })?;
        Ok(self.resolve_path(dir).join(STASHMASTER_FILE))
    }

    /// Resolves a configured path against the run-context directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Loads a run context from YAML, anchoring relative paths at its directory.
pub fn load_run_info<P: AsRef<Path>>(path: P) -> Result<RunInfo, CplError> {
    let info_path = path.as_ref();
    let bytes = fs::read(info_path).map_err(|err| {
        CplError::from_info(
            FatalKind::RunInfoInvalid,
            ErrorInfo::new(FatalKind::RunInfoInvalid.code(), err.to_string())
                .with_context("path", info_path.display().to_string()),
        )
    })?;
    let mut info: RunInfo = from_yaml_slice(&bytes)
        .map_err(|err| err.with_context("path", info_path.display().to_string()))?;
    info.base_dir = info_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_selects_by_index() {
        let schedule = FrequencySchedule::try_from(vec![3600, 900]).expect("two periods");
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.select(0), Some(3600));
        assert_eq!(schedule.select(1), Some(900));
        assert_eq!(schedule.select(2), None);
        assert!(FrequencySchedule::try_from(Vec::new()).is_err());
        assert!(FrequencySchedule::try_from(vec![1, 2, 3]).is_err());
    }

    #[test]
    fn schedule_round_trips_as_list() {
        let schedule = FrequencySchedule {
            primary: 10800,
            statistics: None,
        };
        assert_eq!(Vec::<u32>::from(schedule), vec![10800]);
    }
}
