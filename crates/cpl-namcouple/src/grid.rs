//! Grid and vertical-level decoding of STASHmaster codes.

use cpl_core::errors::{CplError, FatalKind};
use cpl_core::Component;

use crate::run_info::RunInfo;

/// Level marker of a single-level field.
pub const SINGLE_LEVEL: i32 = -1;
/// First soil level marker.
pub const FIRST_SOIL_LEVEL: i32 = 8;
/// Last soil level marker.
pub const LAST_SOIL_LEVEL: i32 = 9;

/// Horizontal grid category of a STASH field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCategory {
    /// Temperature (theta) points.
    Temperature,
    /// Zonal velocity points.
    U,
    /// Meridional velocity points.
    V,
    /// Land points, coupled on the temperature grid.
    Land,
}

impl GridCategory {
    /// Classifies a STASHmaster grid code.
    pub fn from_code(code: i32) -> Result<Self, CplError> {
        match code {
            1..=3 => Ok(GridCategory::Temperature),
            18 => Ok(GridCategory::U),
            19 => Ok(GridCategory::V),
            21 => Ok(GridCategory::Land),
            other => Err(CplError::fatal(
                FatalKind::UnrecognisedGrid,
                format!("unrecognised STASH grid code {other}"),
            )),
        }
    }

    /// One-letter grid tag the category is coupled on.
    pub const fn grid_tag(self) -> char {
        match self {
            GridCategory::Temperature | GridCategory::Land => 't',
            GridCategory::U => 'u',
            GridCategory::V => 'v',
        }
    }
}

/// Decoded vertical extent of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Levels {
    /// Number of levels exchanged.
    pub count: u32,
    /// Whether the levels are soil levels.
    pub is_soil: bool,
}

impl Levels {
    const SINGLE: Levels = Levels {
        count: 1,
        is_soil: false,
    };
}

/// Index of the lowest level for an atmosphere first-level marker.
pub fn first_level_index(code: i32) -> Option<i32> {
    match code {
        SINGLE_LEVEL | 1 | 40 => Some(1),
        38 => Some(0),
        _ => None,
    }
}

/// Index of the highest level for an atmosphere last-level marker.
pub fn last_level_index(code: i32, model_levels: u32) -> Option<i32> {
    let top = i32::try_from(model_levels).ok()?;
    match code {
        SINGLE_LEVEL => Some(1),
        2 | 19 => Some(top),
        3 => Some(top - 1),
        _ => None,
    }
}

/// Number of atmosphere levels between two markers, `None` when either marker
/// is unknown or the range is empty.
pub fn atmosphere_level_count(first: i32, last: i32, model_levels: u32) -> Option<u32> {
    let first = first_level_index(first)?;
    let last = last_level_index(last, model_levels)?;
    u32::try_from(last - first + 1).ok().filter(|count| *count > 0)
}

/// Levels of a land field: one level or the soil column.
pub fn land_levels(
    first: i32,
    last: i32,
    soil_levels: impl FnOnce() -> Result<u32, CplError>,
) -> Result<Levels, CplError> {
    match (first, last) {
        (SINGLE_LEVEL, SINGLE_LEVEL) => Ok(Levels::SINGLE),
        (FIRST_SOIL_LEVEL, LAST_SOIL_LEVEL) => Ok(Levels {
            count: soil_levels()?,
            is_soil: true,
        }),
        _ => Err(unrecognised_level(first, last)),
    }
}

/// Resolves the vertical extent of a field sent by `component`.
pub fn resolve_levels(
    category: GridCategory,
    first: i32,
    last: i32,
    component: Component,
    run_info: &RunInfo,
) -> Result<Levels, CplError> {
    if category == GridCategory::Land {
        return land_levels(first, last, || run_info.soil_levels(component));
    }
    let model_levels = run_info.model_levels(component)?;
    atmosphere_level_count(first, last, model_levels)
        .map(|count| Levels {
            count,
            is_soil: false,
        })
        .ok_or_else(|| unrecognised_level(first, last))
}

fn unrecognised_level(first: i32, last: i32) -> CplError {
    CplError::fatal(
        FatalKind::UnrecognisedLevel,
        format!("unrecognised level markers ({first}, {last})"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atmosphere_counts_span_both_markers() {
        assert_eq!(atmosphere_level_count(1, 2, 85), Some(85));
        assert_eq!(atmosphere_level_count(38, 19, 85), Some(86));
        assert_eq!(atmosphere_level_count(40, 3, 85), Some(84));
        assert_eq!(atmosphere_level_count(SINGLE_LEVEL, SINGLE_LEVEL, 85), Some(1));
    }

    #[test]
    fn land_markers_are_single_or_soil() {
        let single = land_levels(SINGLE_LEVEL, SINGLE_LEVEL, || Ok(4)).expect("single");
        assert_eq!((single.count, single.is_soil), (1, false));
        let soil = land_levels(FIRST_SOIL_LEVEL, LAST_SOIL_LEVEL, || Ok(4)).expect("soil");
        assert_eq!((soil.count, soil.is_soil), (4, true));
        for (first, last) in [(8, 2), (1, 2), (SINGLE_LEVEL, LAST_SOIL_LEVEL)] {
            let err = land_levels(first, last, || Ok(4)).unwrap_err();
            assert_eq!(err.kind(), Some(FatalKind::UnrecognisedLevel));
        }
    }

    #[test]
    fn unknown_markers_have_no_count() {
        assert_eq!(atmosphere_level_count(7, 2, 85), None);
        assert_eq!(atmosphere_level_count(1, 77, 85), None);
    }
}
