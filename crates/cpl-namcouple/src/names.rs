//! Field-name and CF metadata resolution.
//!
//! Atmosphere/ocean couplings derive the receiving name and the CF key from
//! the component tokens embedded in `name_out`. Hybrid couplings between the
//! two atmosphere instances name fields `<marker><SSIII>` and take grid,
//! levels and long name from the STASHmaster catalogue.

use cpl_core::errors::{CplError, FatalKind};
use cpl_core::{Component, CouplingField};
use tracing::warn;

use crate::cf::{self, CfEntry, UNKNOWN};
use crate::grid::{resolve_levels, GridCategory};
use crate::run_info::RunInfo;
use crate::stash::{StashCatalog, StashCode};

const CATEGORY_SUFFIX: &str = "_cat";

/// Lookup state shared by every resolution of one compilation.
#[derive(Debug)]
pub struct ResolveContext<'a> {
    /// Run context supplying level counts and the STASHmaster location.
    pub run_info: &'a RunInfo,
    /// Lazily loaded STASH catalogue.
    pub stash: StashCatalog,
}

impl<'a> ResolveContext<'a> {
    /// Context with a catalogue that loads on first hybrid lookup.
    pub fn new(run_info: &'a RunInfo) -> Self {
        Self {
            run_info,
            stash: StashCatalog::new(),
        }
    }
}

/// Names and metadata of one resolved field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    /// Base name on the sending side.
    pub source: String,
    /// Base name on the receiving side.
    pub target: String,
    /// Key deduplicating CF table rows.
    pub cf_key: String,
    /// CF table row.
    pub cf: CfEntry,
    /// STASH code of hybrid fields.
    pub stash: Option<StashCode>,
}

/// Resolver variant, selected by [`CouplingField::is_hybrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldNameResolver {
    /// Atmosphere to ocean/river couplings and back.
    AtmosOcean,
    /// Atmosphere instance to atmosphere instance.
    Hybrid,
}

impl FieldNameResolver {
    /// Resolver handling `field`.
    pub fn for_field(field: &CouplingField) -> Self {
        if field.is_hybrid {
            FieldNameResolver::Hybrid
        } else {
            FieldNameResolver::AtmosOcean
        }
    }

    /// Resolves names and metadata, filling unresolved grid and level
    /// attributes of `field` in place.
    pub fn resolve(
        self,
        field: &mut CouplingField,
        ctx: &mut ResolveContext<'_>,
    ) -> Result<ResolvedNames, CplError> {
        match self {
            FieldNameResolver::AtmosOcean => Ok(resolve_atmos_ocean(field)),
            FieldNameResolver::Hybrid => resolve_hybrid(field, ctx),
        }
    }
}

/// CF key of an atmosphere/ocean field: the origin token and any category
/// suffix removed.
pub fn cf_key(name_out: &str, origin: Component) -> String {
    let stripped = name_out.replacen(origin.tag(), "", 1);
    let base = match stripped.find(CATEGORY_SUFFIX) {
        Some(position) => &stripped[..position],
        None => stripped.as_str(),
    };
    base.trim_matches('_').to_string()
}

fn resolve_atmos_ocean(field: &mut CouplingField) -> ResolvedNames {
    field.nlev.get_or_insert(1);
    field.is_soil.get_or_insert(false);

    let target = field
        .name_out
        .replacen(field.origin.tag(), field.dest.tag(), 1);
    let key = cf_key(&field.name_out, field.origin);
    let entry = cf::lookup(&key).unwrap_or_else(|| {
        warn!(field = %field.name_out, key = %key, "no CF metadata, using placeholder");
        CfEntry::placeholder()
    });
    ResolvedNames {
        source: field.name_out.clone(),
        target,
        cf_key: key,
        cf: entry,
        stash: None,
    }
}

fn resolve_hybrid(
    field: &mut CouplingField,
    ctx: &mut ResolveContext<'_>,
) -> Result<ResolvedNames, CplError> {
    let (origin_marker, dest_marker) =
        match (field.origin.hybrid_marker(), field.dest.hybrid_marker()) {
            (Some(origin), Some(dest)) => (origin, dest),
            _ => {
                return Err(CplError::fatal(
                    FatalKind::WrongCplFormat,
                    format!(
                        "hybrid coupling {} needs two atmosphere instances",
                        field.direction()
                    ),
                )
                .with_context("field", field.name_out.clone()))
            }
        };

    let code = field
        .name_out
        .strip_prefix(origin_marker)
        .and_then(StashCode::parse)
        .ok_or_else(|| {
            CplError::fatal(
                FatalKind::NotFoundStashCode,
                format!(
                    "hybrid field '{}' is not of the form {origin_marker}SSIII",
                    field.name_out
                ),
            )
        })?;

    let info = ctx
        .stash
        .lookup(code, ctx.run_info)
        .map_err(|err| err.with_context("field", field.name_out.clone()))?
        .clone();
    let category = GridCategory::from_code(info.grid_code)
        .map_err(|err| err.with_context("stash", code.to_string()))?;
    let levels = resolve_levels(
        category,
        info.first_level,
        info.last_level,
        field.origin,
        ctx.run_info,
    )
    .map_err(|err| err.with_context("stash", code.to_string()))?;

    field.grid = category.grid_tag();
    field.nlev = Some(levels.count);
    field.is_soil = Some(levels.is_soil);

    Ok(ResolvedNames {
        source: field.name_out.clone(),
        target: format!("{dest_marker}{code}"),
        cf_key: code.label(),
        cf: CfEntry::new(info.long_name, UNKNOWN),
        stash: Some(code),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cf_key_drops_origin_and_category() {
        assert_eq!(cf_key("SSTOCN", Component::Ocn), "SST");
        assert_eq!(cf_key("OCN_ICEFRC_cat03", Component::Ocn), "ICEFRC");
        assert_eq!(cf_key("TAUXATM", Component::Atm), "TAUX");
    }
}
