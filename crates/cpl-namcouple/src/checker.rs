//! Cross-component consistency checks run before the output is rendered.

use std::collections::BTreeMap;

use cpl_core::errors::{CplError, FatalKind};
use cpl_core::{Component, CouplingField};
use tracing::info;

use crate::run_info::{ComponentInfo, RunInfo};

/// Runs every check, tightening frequencies in place.
pub fn check_run_context(run_info: &mut RunInfo, fields: &[CouplingField]) -> Result<(), CplError> {
    check_atmosphere_levels(run_info)?;
    tighten_frequencies(run_info);
    check_unique_weights(fields)
}

/// ATM and JNR must agree on model and soil levels when both supply them.
pub fn check_atmosphere_levels(run_info: &RunInfo) -> Result<(), CplError> {
    let (Some(atm), Some(jnr)) = (
        run_info.components.get(&Component::Atm),
        run_info.components.get(&Component::Jnr),
    ) else {
        return Ok(());
    };
    compare(atm, jnr, |info| info.model_levels, FatalKind::DifferentModelLevels, "model")?;
    compare(atm, jnr, |info| info.soil_levels, FatalKind::DifferentSoilLevels, "soil")
}

fn compare(
    atm: &ComponentInfo,
    jnr: &ComponentInfo,
    levels: impl Fn(&ComponentInfo) -> Option<u32>,
    kind: FatalKind,
    what: &str,
) -> Result<(), CplError> {
    match (levels(atm), levels(jnr)) {
        (Some(a), Some(j)) if a != j => Err(CplError::fatal(
            kind,
            format!("ATM has {a} {what} levels but JNR has {j}"),
        )),
        _ => Ok(()),
    }
}

/// Lowers each primary frequency above its statistics frequency to match it.
/// Returns the number of schedules changed.
pub fn tighten_frequencies(run_info: &mut RunInfo) -> usize {
    let mut changed = 0;
    for (direction, schedule) in run_info.coupling_frequencies.iter_mut() {
        if let Some(statistics) = schedule.statistics {
            if schedule.primary > statistics {
                info!(
                    %direction,
                    from = schedule.primary,
                    to = statistics,
                    "tightening coupling frequency to statistics frequency"
                );
                schedule.primary = statistics;
                changed += 1;
            }
        }
    }
    changed
}

/// Weights of retained records must be pairwise distinct.
pub fn check_unique_weights(fields: &[CouplingField]) -> Result<(), CplError> {
    let mut seen: BTreeMap<i64, &CouplingField> = BTreeMap::new();
    for field in fields.iter().filter(|field| !field.is_removed()) {
        if let Some(previous) = seen.insert(field.weight, field) {
            return Err(CplError::fatal(
                FatalKind::DuplicateWeighting,
                format!(
                    "weight {} is used by both {} ({}) and {} ({})",
                    field.weight,
                    previous.name_out,
                    previous.direction(),
                    field.name_out,
                    field.direction()
                ),
            )
            .with_context("weight", field.weight.to_string()));
        }
    }
    Ok(())
}
