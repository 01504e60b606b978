//! Expansion of `default` coupling placeholders into the standard field sets.

use std::collections::BTreeSet;

use cpl_core::errors::CplError;
use cpl_core::{Component, CouplingField, Direction};
use tracing::info;

use crate::builder::build_couplings;
use crate::run_info::RunInfo;

const OCN_TO_ATM: &[&str] = &[
    "OCN_SST;1;t;ATM;1;CF;500",
    "OCN_ICEFRC;2;t;ATM;1;;",
    "OCN_ICETHICK;3;t;ATM;1;;",
    "OCN_SNOWTHICK;4;t;ATM;1;;",
    "OCN_UCURR;5;u;ATM;1;Bi;",
    "OCN_VCURR;6;v;ATM;1;;",
];

const ATM_TO_OCN: &[&str] = &[
    "ATM_TAUX;11;u;OCN;1;Bi;600",
    "ATM_TAUY;12;v;OCN;1;;",
    "ATM_SOLAR;13;t;OCN;1;CF;",
    "ATM_NONSOLAR;14;t;OCN;1;;",
    "ATM_TRAIN;15;t;OCN;1;;",
    "ATM_TSNOW;16;t;OCN;1;;",
    "ATM_EVAP;17;t;OCN;1;;",
    "ATM_MSLP;18;t;OCN;1;Bi;",
];

const ATM_TO_RIV: &[&str] = &["ATM_RIVRUN;21;t;RIV;1;CF;700", "ATM_DRAIN;22;t;RIV;1;;"];

const RIV_TO_OCN: &[&str] = &["RIV_RIVOUT;31;t;OCN;1;CF;800"];

/// Standard coupling specifications of `direction`, empty when none exist.
pub fn default_specs(direction: Direction) -> &'static [&'static str] {
    match (direction.origin, direction.dest) {
        (Component::Ocn, Component::Atm) => OCN_TO_ATM,
        (Component::Atm, Component::Ocn) => ATM_TO_OCN,
        (Component::Atm, Component::Riv) => ATM_TO_RIV,
        (Component::Riv, Component::Ocn) => RIV_TO_OCN,
        _ => &[],
    }
}

/// Replaces placeholders with the default couplings of every scheduled
/// direction whose components are both configured. Defaults already coupled
/// explicitly (same name and destination) are skipped.
pub fn expand_defaults(
    fields: Vec<CouplingField>,
    run_info: &RunInfo,
) -> Result<Vec<CouplingField>, CplError> {
    if !fields.iter().any(CouplingField::is_placeholder) {
        return Ok(fields);
    }
    let mut expanded: Vec<CouplingField> = fields
        .into_iter()
        .filter(|field| !field.is_placeholder())
        .collect();
    let explicit: BTreeSet<(String, Component)> = expanded
        .iter()
        .map(|field| (field.name_out.clone(), field.dest))
        .collect();

    let mut added = 0usize;
    for direction in run_info.coupling_frequencies.keys() {
        if !run_info.has_component(direction.origin) || !run_info.has_component(direction.dest) {
            continue;
        }
        let specs = default_specs(*direction);
        if specs.is_empty() {
            continue;
        }
        let defaults = build_couplings(direction.origin, false, 0, specs)?;
        for field in defaults {
            if explicit.contains(&(field.name_out.clone(), field.dest)) {
                continue;
            }
            expanded.push(field);
            added += 1;
        }
    }
    info!(added, "expanded default couplings");
    Ok(expanded)
}
