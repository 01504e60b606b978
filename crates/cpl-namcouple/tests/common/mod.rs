#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use cpl_core::{Component, CouplingField, Direction, Mapping};
use cpl_namcouple::{ComponentInfo, CouplingRequest, FrequencySchedule, RunInfo};

/// STASHmaster records used by the hybrid tests.
pub const STASHMASTER: &str = "\
H1| SUBMODEL_NUMBER=1
1|    1 |    3 |  236 |TEMPERATURE AT 1.5M                 |
2|    2 |    0 |    1 |    1 |    5 |   -1 |   -1 |    0 |    0 |    0 |    0 |
1|    1 |    0 |    2 |U COMPNT OF WIND AFTER TIMESTEP     |
2|    2 |    0 |    1 |   18 |    1 |    1 |    2 |    0 |    0 |    0 |    0 |
1|    1 |    0 |    3 |V COMPNT OF WIND AFTER TIMESTEP     |
2|    2 |    0 |    1 |   19 |    1 |    1 |    2 |    0 |    0 |    0 |    0 |
1|    1 |    8 |  223 |SOIL MOISTURE CONTENT IN A LAYER    |
2|    2 |    0 |    1 |   21 |    6 |    8 |    9 |    0 |    0 |    0 |    0 |
1|    1 |    8 |  224 |SOIL LAYER WITH BAD MARKERS         |
2|    2 |    0 |    1 |   21 |    6 |    8 |    2 |    0 |    0 |    0 |    0 |
1|    1 |    0 |  150 |W COMPNT OF WIND AFTER TIMESTEP     |
2|    2 |    0 |    1 |    5 |    1 |    1 |    2 |    0 |    0 |    0 |    0 |
1|    1 |    0 |    4 |THETA AFTER TIMESTEP                |
2|    2 |    0 |    1 |    1 |    1 |    7 |    2 |    0 |    0 |    0 |    0 |
1|   -1 |   -1 |   -1 |END OF FILE MARK                    |
2|    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |    0 |
";

fn component(
    grid: &str,
    resolution: Option<[u32; 2]>,
    levels: Option<(u32, u32)>,
) -> ComponentInfo {
    ComponentInfo {
        grid: grid.into(),
        resolution,
        model_levels: levels.map(|(model, _)| model),
        soil_levels: levels.map(|(_, soil)| soil),
    }
}

fn schedule(primary: u32, statistics: Option<u32>) -> FrequencySchedule {
    FrequencySchedule {
        primary,
        statistics,
    }
}

/// Run context with ATM, JNR, OCN and RIV, and frequencies for the
/// ATM/OCN and ATM/JNR pairs.
pub fn run_info() -> RunInfo {
    let components = BTreeMap::from([
        (Component::Atm, component("n96", Some([192, 144]), Some((85, 4)))),
        (Component::Jnr, component("n48", Some([96, 72]), Some((85, 4)))),
        (Component::Ocn, component("orca1", Some([360, 290]), None)),
        (Component::Riv, component("rivg", None, None)),
    ]);
    let coupling_frequencies = BTreeMap::from([
        (Direction::new(Component::Atm, Component::Ocn), schedule(3600, None)),
        (Direction::new(Component::Ocn, Component::Atm), schedule(3600, None)),
        (Direction::new(Component::Atm, Component::Jnr), schedule(1800, Some(900))),
        (Direction::new(Component::Jnr, Component::Atm), schedule(1800, None)),
        (Direction::new(Component::Atm, Component::Riv), schedule(86400, None)),
    ]);
    RunInfo {
        components,
        coupling_frequencies,
        executables: vec!["atmos".into(), "ocean".into()],
        expout_fields: BTreeSet::new(),
        create_remap_fields: BTreeSet::new(),
        one_d_grid_sizes: BTreeMap::from([("rivg".to_string(), 500), ("n96".to_string(), 27648)]),
        nlogprt: 0,
        runtime: 86400,
        inidate: "19790101".into(),
        caltype: "1".into(),
        stashmaster_dir: None,
        shared_namelist: None,
        regenerate_command: None,
        base_dir: PathBuf::from("."),
    }
}

/// Writes [`STASHMASTER`] into `dir` and points `info` at it.
pub fn with_stashmaster(mut info: RunInfo, dir: &Path) -> RunInfo {
    fs::write(dir.join("STASHmaster_A"), STASHMASTER).expect("write STASHmaster");
    info.stashmaster_dir = Some(dir.to_path_buf());
    info
}

/// Request from `origin` with the given specifications.
pub fn request(origin: Component, specs: &[&str]) -> CouplingRequest {
    CouplingRequest {
        origin,
        hybrid: false,
        freq_selector: 0,
        specs: specs.iter().map(|spec| spec.to_string()).collect(),
    }
}

/// Fully specified record.
pub fn field(
    name: &str,
    origin: Component,
    dest: Component,
    mapping: Mapping,
    weight: i64,
) -> CouplingField {
    CouplingField {
        name_out: name.into(),
        field_id: 1,
        grid: 't',
        origin,
        dest,
        nlev: Some(1),
        is_soil: Some(false),
        mapping,
        mapping_order: None,
        weight,
        is_hybrid: false,
        freq_selector: 0,
        freq_override: None,
    }
}
