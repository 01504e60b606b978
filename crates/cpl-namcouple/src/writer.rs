//! Renders the namcouple and CF name table.

use cpl_core::errors::{CplError, FatalKind};
use cpl_core::{Component, CouplingField, Mapping};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cf::CfNameTable;
use crate::names::{FieldNameResolver, ResolveContext, ResolvedNames};
use crate::run_info::RunInfo;

const RULE: &str =
    "###############################################################################";
const RESTART_FILE: &str = "rstrt.nc";
const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u32 = 3600;
const SECONDS_PER_DAY: u32 = 86400;
const HOURS_THRESHOLD: u32 = 5400;
const DAYS_THRESHOLD: u32 = 129600;

/// One written field, as recorded in the generation manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSummary {
    /// 1-based position in `$STRINGS`.
    pub index: usize,
    /// Sending name.
    pub source: String,
    /// Receiving name.
    pub target: String,
    /// Sending component.
    pub origin: Component,
    /// Receiving component.
    pub dest: Component,
    /// Grid tag after resolution.
    pub grid: char,
    /// Number of levels.
    pub nlev: u32,
    /// Interpolation method.
    pub mapping: Mapping,
    /// Ordering key.
    pub weight: i64,
    /// Coupling period in seconds.
    pub period: u32,
    /// Sequence number.
    pub seq: u32,
    /// Row in the CF name table.
    pub cf_index: usize,
}

/// Text of both output files plus per-field summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutputs {
    /// `namcouple` contents.
    pub namcouple: String,
    /// `cf_name_table.txt` contents.
    pub cf_table: String,
    /// Written fields in output order.
    pub fields: Vec<FieldSummary>,
}

/// Formats a period as `<N><unit>` with unit `d`, `h` or `m`.
pub fn period_label(seconds: u32) -> String {
    let (divisor, unit) = if seconds > DAYS_THRESHOLD {
        (SECONDS_PER_DAY, 'd')
    } else if seconds > HOURS_THRESHOLD {
        (SECONDS_PER_HOUR, 'h')
    } else {
        (SECONDS_PER_MINUTE, 'm')
    };
    if seconds % divisor == 0 {
        return format!("{}{unit}", seconds / divisor);
    }
    let amount = format!("{:.2}", f64::from(seconds) / f64::from(divisor));
    let amount = amount.trim_end_matches('0').trim_end_matches('.');
    format!("{amount}{unit}")
}

/// Per-level names joined by `:`; levels from the second on carry a `%03d` suffix.
pub fn level_names(base: &str, nlev: u32) -> String {
    (1..=nlev.max(1))
        .map(|level| {
            if level == 1 {
                base.to_string()
            } else {
                format!("{base}{level:03}")
            }
        })
        .collect::<Vec<_>>()
        .join(":")
}

/// SCRIP arguments generating weights for `mapping` on the fly.
pub fn scrip_arguments(mapping: Mapping, order: Option<u8>) -> Result<String, CplError> {
    let conserv_order = if order == Some(2) { "SECOND" } else { "FIRST" };
    match mapping {
        Mapping::Bilinear => Ok("BILINEAR LR SCALAR LATLON 1".into()),
        Mapping::Bicubic => Ok("BICUBIC LR SCALAR LATLON 1".into()),
        Mapping::ConservFracarea => Ok(format!(
            "CONSERV LR SCALAR LATLON 1 FRACAREA {conserv_order}"
        )),
        Mapping::ConservDestarea => Ok(format!(
            "CONSERV LR SCALAR LATLON 1 DESTAREA {conserv_order}"
        )),
        Mapping::DistanceWeighted => Ok("DISTWGT LR SCALAR LATLON 1 4".into()),
        other => Err(CplError::fatal(
            FatalKind::MissingRmpMapping,
            format!("remapping weights cannot be generated for mapping {other}"),
        )),
    }
}

fn order_suffix(order: Option<u8>) -> &'static str {
    match order {
        Some(1) => "_1st",
        Some(2) => "_2nd",
        _ => "",
    }
}

fn transdef_grid(field: &CouplingField) -> char {
    match field.mapping {
        Mapping::Scalar => '0',
        Mapping::OneDimensional => '1',
        _ => field.grid.to_ascii_uppercase(),
    }
}

fn grid_dimensions(
    run_info: &RunInfo,
    component: Component,
    grid: char,
) -> Result<(u32, u32), CplError> {
    let (nx, ny) = run_info.resolution(component)?;
    if component.is_atmosphere() && grid == 'v' {
        Ok((nx, ny + 1))
    } else {
        Ok((nx, ny))
    }
}

/// Walks weight-ordered records and emits one block per retained field.
struct Writer<'r, 'c> {
    ctx: &'r mut ResolveContext<'c>,
    cf_table: CfNameTable,
    blocks: String,
    summaries: Vec<FieldSummary>,
    seq: u32,
    previous_origin: Option<Component>,
}

impl<'r, 'c> Writer<'r, 'c> {
    fn run_info(&self) -> &'c RunInfo {
        self.ctx.run_info
    }

    fn emit(&mut self, record: &CouplingField) -> Result<(), CplError> {
        if self.previous_origin != Some(record.origin) {
            self.seq += 1;
            self.previous_origin = Some(record.origin);
        }
        let run_info = self.run_info();
        let period = run_info.frequency_for(record)?;

        let mut field = record.clone();
        let names = FieldNameResolver::for_field(&field).resolve(&mut field, self.ctx)?;
        let nlev = field.nlev.unwrap_or(1);
        let cf_index = self.cf_table.index_of(&names.cf_key, names.cf.clone());
        let create_remap = run_info.create_remap_fields.contains(&field.name_out);
        let index = self.summaries.len() + 1;

        let grid_block = self.grid_block(&field, create_remap)?;
        let ntransfo = match field.mapping {
            Mapping::Scalar | Mapping::OneDimensional => 1,
            _ => 1 + usize::from(create_remap),
        };
        let export = if run_info.expout_fields.contains(&field.name_out) {
            "EXPOUT"
        } else {
            "EXPORTED"
        };

        self.write_banner(&field, &names, index, period, nlev);
        self.blocks.push_str(&format!(
            " {} {} {cf_index} {period} {ntransfo} {RESTART_FILE} {export}\n",
            level_names(&names.source, nlev),
            level_names(&names.target, nlev),
        ));
        self.blocks.push_str(&grid_block);

        debug!(
            index,
            field = %names.source,
            target = %names.target,
            seq = self.seq,
            "emitted coupling field"
        );
        self.summaries.push(FieldSummary {
            index,
            source: names.source,
            target: names.target,
            origin: field.origin,
            dest: field.dest,
            grid: field.grid,
            nlev,
            mapping: field.mapping,
            weight: field.weight,
            period,
            seq: self.seq,
            cf_index,
        });
        Ok(())
    }

    fn write_banner(
        &mut self,
        field: &CouplingField,
        names: &ResolvedNames,
        index: usize,
        period: u32,
        nlev: u32,
    ) {
        let stash = names
            .stash
            .map(|code| format!(" (STASH {},{})", code.section, code.item))
            .unwrap_or_default();
        let plural = if nlev == 1 { "level" } else { "levels" };
        let soil = if field.is_soil == Some(true) { " soil" } else { "" };
        let grid = transdef_grid(field);
        let order = field
            .mapping_order
            .map(|order| format!(" {order}"))
            .unwrap_or_default();
        let out = &mut self.blocks;
        out.push_str("#\n");
        out.push_str(&format!("# {}{stash} | weight {}\n", names.cf.long_name, field.weight));
        out.push_str(&format!(
            "# {} --> {} every {} ({period}s) | {nlev} {plural}{soil}\n",
            field.origin,
            field.dest,
            period_label(period)
        ));
        out.push_str(&format!(
            "# TRANSDEF: {}{grid} {}{grid} {index} {}{order} ###\n",
            field.origin, field.dest, field.field_id
        ));
    }

    fn grid_block(&self, field: &CouplingField, create_remap: bool) -> Result<String, CplError> {
        let run_info = self.run_info();
        let source = run_info.oasis_grid_name(field.origin, field.grid)?;
        let target = run_info.oasis_grid_name(field.dest, field.grid)?;
        let seq = self.seq;
        let mut out = String::new();
        match field.mapping {
            Mapping::Scalar => {
                out.push_str(&format!(" 1 1 1 1 {source} {target} SEQ=+{seq}\n"));
                out.push_str(" LOCTRANS\n INSTANT\n");
            }
            Mapping::OneDimensional => {
                let source_len = run_info.one_d_size(field.origin)?;
                let target_len = run_info.one_d_size(field.dest)?;
                out.push_str(&format!(
                    " {source_len} 1 {target_len} 1 {source} {target} SEQ=+{seq}\n"
                ));
                out.push_str(" LOCTRANS\n INSTANT\n");
            }
            mapping => {
                let (nx_src, ny_src) = grid_dimensions(run_info, field.origin, field.grid)?;
                let (nx_dst, ny_dst) = grid_dimensions(run_info, field.dest, field.grid)?;
                out.push_str(&format!(
                    " {nx_src} {ny_src} {nx_dst} {ny_dst} {source} {target} SEQ=+{seq}\n"
                ));
                out.push_str(&format!(
                    " P {} P {}\n",
                    field.origin.periodicity(),
                    field.dest.periodicity()
                ));
                if create_remap {
                    let arguments = scrip_arguments(mapping, field.mapping_order)
                        .map_err(|err| err.with_context("field", field.name_out.clone()))?;
                    out.push_str(" CHECKIN SCRIPR\n INT=1\n");
                    out.push_str(&format!(" {arguments}\n"));
                } else {
                    out.push_str(" MAPPING\n");
                    out.push_str(&format!(
                        " rmp_{source}_to_{target}_{}{}.nc src\n",
                        mapping.identifier(),
                        order_suffix(field.mapping_order)
                    ));
                }
            }
        }
        Ok(out)
    }
}

fn header(run_info: &RunInfo, nfields: usize) -> String {
    let mut out = String::new();
    let mut section = |name: &str, value: String| {
        out.push_str(&format!("{RULE}\n ${name}\n    {value}\n $END\n"));
    };
    section("NFIELDS", nfields.to_string());
    let mut nbmodel = run_info.executables.len().to_string();
    for executable in &run_info.executables {
        nbmodel.push(' ');
        nbmodel.push_str(executable);
    }
    section("NBMODEL", nbmodel);
    section("RUNTIME", run_info.runtime.to_string());
    section("INIDATE", run_info.inidate.clone());
    section("MODINFO", "NOT".into());
    section("NLOGPRT", run_info.nlogprt.to_string());
    section("CALTYPE", run_info.caltype.clone());
    out.push_str(&format!("{RULE}\n $STRINGS\n"));
    out
}

/// Renders weight-ordered `fields`; `remove` records are skipped.
pub fn render(
    ctx: &mut ResolveContext<'_>,
    fields: &[CouplingField],
) -> Result<RenderedOutputs, CplError> {
    let mut writer = Writer {
        ctx,
        cf_table: CfNameTable::new(),
        blocks: String::new(),
        summaries: Vec::new(),
        seq: 0,
        previous_origin: None,
    };
    for field in fields.iter().filter(|field| !field.is_removed()) {
        writer
            .emit(field)
            .map_err(|err| err.with_context("weight", field.weight.to_string()))?;
    }

    let mut namcouple = header(writer.run_info(), writer.summaries.len());
    namcouple.push_str(&writer.blocks);
    namcouple.push_str(RULE);
    namcouple.push_str("\n $END\n");
    Ok(RenderedOutputs {
        namcouple,
        cf_table: writer.cf_table.render(),
        fields: writer.summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_units_follow_thresholds() {
        assert_eq!(period_label(900), "15m");
        assert_eq!(period_label(5400), "90m");
        assert_eq!(period_label(10800), "3h");
        assert_eq!(period_label(9000), "2.5h");
        assert_eq!(period_label(172800), "2d");
        assert_eq!(period_label(200000), "2.31d");
        assert_eq!(period_label(90), "1.5m");
    }

    #[test]
    fn level_names_suffix_upper_levels() {
        assert_eq!(level_names("A03236", 1), "A03236");
        assert_eq!(level_names("X", 3), "X:X002:X003");
    }

    #[test]
    fn patch_cannot_be_generated() {
        let err = scrip_arguments(Mapping::Patch, None).unwrap_err();
        assert_eq!(err.kind(), Some(FatalKind::MissingRmpMapping));
        assert_eq!(
            scrip_arguments(Mapping::ConservDestarea, Some(2)).expect("conserv"),
            "CONSERV LR SCALAR LATLON 1 DESTAREA SECOND"
        );
    }
}
