//! Parses declarative coupling specifications into [`CouplingField`] records.
//!
//! A specification reads
//! `name_out; field_id; grid; dest1[&dest2...]; [nlev]; [mapping[&order]]; [weight]; [freq]`.
//! Mapping and weighting are sticky within one call: an empty field reuses the
//! value carried over from the previous specification.

use cpl_core::errors::{CplError, FatalKind};
use cpl_core::{Component, CouplingField, Mapping};

/// Value standing for "expand the default couplings here".
pub const DEFAULT_SPEC: &str = "default";
/// Weight step between consecutive records of one call.
pub const WEIGHT_INCREMENT: i64 = 2;
/// Minimum number of `;`-separated fields in a specification.
pub const MIN_SPEC_FIELDS: usize = 6;
const MAX_SPEC_FIELDS: usize = 8;

/// Mapping and next weighting carried from one specification to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StickyDefaults {
    mapping: Option<(Mapping, Option<u8>)>,
    next_weight: Option<i64>,
}

fn spec_error(kind: FatalKind, message: impl Into<String>, spec: &str) -> CplError {
    CplError::fatal(kind, message).with_context("spec", spec)
}

/// Expands the specifications of one calling component into coupling records.
pub fn build_couplings<S: AsRef<str>>(
    origin: Component,
    is_hybrid: bool,
    freq_selector: usize,
    specs: &[S],
) -> Result<Vec<CouplingField>, CplError> {
    let mut fields = Vec::new();
    specs
        .iter()
        .try_fold(StickyDefaults::default(), |sticky, spec| {
            let spec = spec.as_ref().trim();
            if spec == DEFAULT_SPEC {
                fields.push(CouplingField::placeholder());
                return Ok(sticky);
            }
            expand_spec(origin, is_hybrid, freq_selector, spec, sticky, &mut fields)
        })?;
    Ok(fields)
}

fn expand_spec(
    origin: Component,
    is_hybrid: bool,
    freq_selector: usize,
    spec: &str,
    sticky: StickyDefaults,
    fields: &mut Vec<CouplingField>,
) -> Result<StickyDefaults, CplError> {
    if !spec.contains(';') {
        return Err(spec_error(
            FatalKind::WrongCplFormat,
            "coupling value is neither 'default' nor a ';'-separated specification",
            spec,
        ));
    }
    let parts: Vec<&str> = spec.split(';').map(str::trim).collect();
    if parts.len() < MIN_SPEC_FIELDS {
        return Err(spec_error(
            FatalKind::MissingNamcoupleInput,
            format!(
                "coupling specification has {} fields, at least {MIN_SPEC_FIELDS} are required",
                parts.len()
            ),
            spec,
        ));
    }
    if parts.len() > MAX_SPEC_FIELDS {
        return Err(spec_error(
            FatalKind::WrongCplFormat,
            format!(
                "coupling specification has {} fields, at most {MAX_SPEC_FIELDS} are allowed",
                parts.len()
            ),
            spec,
        ));
    }

    let name_out = parts[0];
    if name_out.is_empty() {
        return Err(spec_error(FatalKind::WrongCplFormat, "empty field name", spec));
    }
    let field_id: i64 = parse_number(parts[1], "field_id", spec)?;
    let grid = parse_grid(parts[2], spec)?;
    let dests = parts[3]
        .split('&')
        .map(|dest| parse_dest(dest, origin, spec))
        .collect::<Result<Vec<_>, _>>()?;
    let nlev = match optional(parts[4]) {
        Some(raw) => match parse_number::<u32>(raw, "nlev", spec)? {
            0 => {
                return Err(spec_error(
                    FatalKind::WrongCplFormat,
                    "number of levels must be positive",
                    spec,
                ))
            }
            levels => Some(levels),
        },
        None => None,
    };

    let (mapping, mapping_order) = match optional(parts[5]) {
        Some(raw) => parse_mapping(raw, spec)?,
        None => sticky.mapping.ok_or_else(|| {
            spec_error(
                FatalKind::MissingMapping,
                "first coupling specification of a call must name a mapping",
                spec,
            )
        })?,
    };
    let mut weight = match parts.get(6).copied().and_then(optional) {
        Some(raw) => parse_number(raw, "weight", spec)?,
        None => sticky.next_weight.ok_or_else(|| {
            spec_error(
                FatalKind::MissingWeighting,
                "first coupling specification of a call must give a weighting",
                spec,
            )
        })?,
    };
    let freq_override = match parts.get(7).copied().and_then(optional) {
        Some(raw) => Some(parse_number(raw, "freq", spec)?),
        None => None,
    };

    for dest in dests {
        fields.push(CouplingField {
            name_out: name_out.to_string(),
            field_id,
            grid,
            origin,
            dest,
            nlev,
            is_soil: None,
            mapping,
            mapping_order,
            weight,
            is_hybrid,
            freq_selector,
            freq_override,
        });
        weight = weight.checked_add(WEIGHT_INCREMENT).ok_or_else(|| {
            spec_error(
                FatalKind::WrongCplFormat,
                format!("weighting {weight} leaves no room for the next record"),
                spec,
            )
        })?;
    }

    Ok(StickyDefaults {
        mapping: Some((mapping, mapping_order)),
        next_weight: Some(weight),
    })
}

fn optional(raw: &str) -> Option<&str> {
    (!raw.is_empty()).then_some(raw)
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str, spec: &str) -> Result<T, CplError> {
    raw.parse().map_err(|_| {
        spec_error(
            FatalKind::WrongCplFormat,
            format!("{what} '{raw}' is not a valid integer"),
            spec,
        )
    })
}

fn parse_dest(raw: &str, origin: Component, spec: &str) -> Result<Component, CplError> {
    let dest = raw.parse::<Component>().map_err(|err| err.with_context("spec", spec))?;
    if dest == Component::Unresolved || dest == origin {
        return Err(spec_error(
            FatalKind::WrongCplFormat,
            format!("'{raw}' is not a valid destination for {origin}"),
            spec,
        ));
    }
    Ok(dest)
}

fn parse_grid(raw: &str, spec: &str) -> Result<char, CplError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(grid), None) if grid.is_ascii_alphabetic() => Ok(grid.to_ascii_lowercase()),
        _ => Err(spec_error(
            FatalKind::WrongCplFormat,
            format!("grid '{raw}' is not a single letter"),
            spec,
        )),
    }
}

fn parse_mapping(raw: &str, spec: &str) -> Result<(Mapping, Option<u8>), CplError> {
    let (token, order) = match raw.split_once('&') {
        Some((token, order)) => (token.trim(), Some(order.trim())),
        None => (raw, None),
    };
    let mapping = Mapping::from_token(token).ok_or_else(|| {
        spec_error(
            FatalKind::UnrecognisedMapping,
            format!("unrecognised mapping '{token}'"),
            spec,
        )
    })?;
    let order = match order {
        None => None,
        Some("1") => Some(1),
        Some("2") => Some(2),
        Some(other) => {
            return Err(spec_error(
                FatalKind::UnrecognisedMapping,
                format!("unrecognised mapping order '{other}'"),
                spec,
            ))
        }
    };
    Ok((mapping, order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_letters_are_lowercased() {
        assert_eq!(parse_grid("T", "spec").expect("grid"), 't');
        assert!(parse_grid("tu", "spec").is_err());
        assert!(parse_grid("", "spec").is_err());
    }

    #[test]
    fn destinations_exclude_placeholder_and_origin() {
        assert_eq!(parse_dest("ATM", Component::Ocn, "spec").expect("dest"), Component::Atm);
        for raw in ["?", "OCN"] {
            let err = parse_dest(raw, Component::Ocn, "spec").unwrap_err();
            assert_eq!(err.kind(), Some(FatalKind::WrongCplFormat));
        }
    }

    #[test]
    fn mapping_order_is_one_or_two() {
        assert_eq!(
            parse_mapping("CF&2", "spec").expect("order"),
            (Mapping::ConservFracarea, Some(2))
        );
        let err = parse_mapping("CF&3", "spec").unwrap_err();
        assert_eq!(err.kind(), Some(FatalKind::UnrecognisedMapping));
    }
}
