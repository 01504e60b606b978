#![deny(missing_docs)]
#![doc = "Compiles declarative coupling lists into OASIS3-MCT namcouple and CF name table files."]

/// Declarative coupling grammar parser.
pub mod builder;
/// CF metadata table and first-seen index accumulator.
pub mod cf;
/// Run-context consistency checks.
pub mod checker;
/// Default coupling sets and placeholder expansion.
pub mod defaults;
/// STASH grid and level decoding.
pub mod grid;
/// Canonical hashing helpers.
pub mod hash;
/// Generation manifest.
pub mod manifest;
/// Field-name and CF resolvers.
pub mod names;
/// Compilation, output files and regeneration hook.
pub mod pipeline;
/// Couplings file loading.
pub mod requests;
/// Run-context model and YAML loading.
pub mod run_info;
/// Canonical JSON and YAML serde helpers.
pub mod serde;
/// STASHmaster catalogue.
pub mod stash;
/// Namcouple and CF table rendering.
pub mod writer;

pub use builder::{build_couplings, DEFAULT_SPEC, WEIGHT_INCREMENT};
pub use cf::{CfEntry, CfNameTable};
pub use checker::{check_run_context, check_unique_weights, tighten_frequencies};
pub use defaults::{default_specs, expand_defaults};
pub use manifest::{GenerationManifest, MANIFEST_FILE};
pub use names::{FieldNameResolver, ResolveContext, ResolvedNames};
pub use pipeline::{
    compile, regenerate, write_outputs, Compiled, WrittenOutputs, CF_TABLE_FILE, NAMCOUPLE_FILE,
};
pub use requests::{load_requests, CouplingRequest, CouplingsFile};
pub use run_info::{load_run_info, ComponentInfo, FrequencySchedule, RunInfo};
pub use stash::{StashCatalog, StashCode, StashInfo, StashMaster};
pub use writer::{render, FieldSummary, RenderedOutputs};
