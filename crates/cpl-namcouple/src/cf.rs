//! CF metadata for coupled fields and the `cf_name_table.txt` accumulator.

use serde::{Deserialize, Serialize};

/// Placeholder used for unknown CF long names and units.
pub const UNKNOWN: &str = "unknown";

/// Long names and units keyed by the field name stripped of component tokens.
const CF_TABLE: &[(&str, &str, &str)] = &[
    ("SST", "sea_surface_temperature", "K"),
    ("ICE", "sea_ice_area_fraction", "1"),
    ("ICEFRC", "sea_ice_area_fraction", "1"),
    ("ICETHICK", "sea_ice_thickness", "m"),
    ("SNOWTHICK", "surface_snow_thickness", "m"),
    ("ICETEMP", "sea_ice_surface_temperature", "K"),
    ("ICECOND", "sea_ice_thermal_conductivity", "W m-1 K-1"),
    ("PONDFRC", "melt_pond_area_fraction", "1"),
    ("PONDDEP", "melt_pond_depth", "m"),
    ("UCURR", "eastward_sea_water_velocity", "m s-1"),
    ("VCURR", "northward_sea_water_velocity", "m s-1"),
    ("CO2FLX", "surface_upward_mass_flux_of_carbon_dioxide", "kg m-2 s-1"),
    ("DMS", "surface_upward_mass_flux_of_dimethyl_sulfide", "kg m-2 s-1"),
    ("CHL", "mass_concentration_of_chlorophyll_in_sea_water", "kg m-3"),
    ("HEATFLX", "surface_downward_heat_flux_in_sea_water", "W m-2"),
    ("SOLAR", "surface_net_downward_shortwave_flux", "W m-2"),
    ("NONSOLAR", "surface_net_downward_non_solar_flux", "W m-2"),
    ("RUNOFF", "water_flux_into_sea_water_from_rivers", "kg m-2 s-1"),
    ("TRAIN", "rainfall_flux", "kg m-2 s-1"),
    ("TSNOW", "snowfall_flux", "kg m-2 s-1"),
    ("EVAP", "water_evaporation_flux", "kg m-2 s-1"),
    ("SUBLIM", "surface_snow_and_ice_sublimation_flux", "kg m-2 s-1"),
    ("TOPMELT", "surface_snow_and_ice_melt_heat_flux", "W m-2"),
    ("BOTMELT", "heat_flux_into_sea_ice_base", "W m-2"),
    ("TAUX", "surface_downward_eastward_stress", "N m-2"),
    ("TAUY", "surface_downward_northward_stress", "N m-2"),
    ("WIND10", "wind_speed_at_10m", "m s-1"),
    ("MSLP", "air_pressure_at_mean_sea_level", "Pa"),
    ("PRESS", "surface_air_pressure", "Pa"),
    ("RIVRUN", "surface_runoff_flux", "kg m-2 s-1"),
    ("DRAIN", "subsurface_runoff_flux", "kg m-2 s-1"),
    ("RIVOUT", "water_flux_from_rivers_into_ocean", "kg m-2 s-1"),
];

/// Long name and unit written for one CF table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfEntry {
    /// CF long name.
    pub long_name: String,
    /// Physical unit.
    pub unit: String,
}

impl CfEntry {
    /// Creates an entry.
    pub fn new(long_name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            long_name: long_name.into(),
            unit: unit.into(),
        }
    }

    /// `('unknown', 'unknown')`.
    pub fn placeholder() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }

    /// Whether this is the placeholder entry.
    pub fn is_placeholder(&self) -> bool {
        self.long_name == UNKNOWN && self.unit == UNKNOWN
    }
}

/// Looks a stripped field name up in the static CF table.
pub fn lookup(key: &str) -> Option<CfEntry> {
    CF_TABLE
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|(_, long_name, unit)| CfEntry::new(*long_name, *unit))
}

/// CF rows in first-seen order, deduplicated by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfNameTable {
    rows: Vec<(String, CfEntry)>,
}

impl CfNameTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based index of `key`, inserting `entry` the first time the key is seen.
    pub fn index_of(&mut self, key: &str, entry: CfEntry) -> usize {
        if let Some(position) = self.rows.iter().position(|(seen, _)| seen == key) {
            return position + 1;
        }
        self.rows.push((key.to_string(), entry));
        self.rows.len()
    }

    /// Number of distinct rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row has been recorded.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders `cf_name_table.txt`.
    pub fn render(&self) -> String {
        let count = self.rows.len();
        let mut out = format!("{count} {count}\n# index 'long name' 'unit'\n");
        for (index, (_, entry)) in self.rows.iter().enumerate() {
            out.push_str(&format!("{} '{}' '{}'\n", index + 1, entry.long_name, entry.unit));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_lookup_hits_and_misses() {
        let sst = lookup("SST").expect("sst");
        assert_eq!(sst.unit, "K");
        assert!(lookup("NOPE").is_none());
        assert!(CfEntry::placeholder().is_placeholder());
    }

    #[test]
    fn indices_are_first_seen_positions() {
        let mut table = CfNameTable::new();
        assert_eq!(table.index_of("SST", CfEntry::new("a", "K")), 1);
        assert_eq!(table.index_of("ICE", CfEntry::new("b", "1")), 2);
        assert_eq!(table.index_of("SST", CfEntry::new("ignored", "x")), 1);
        assert_eq!(
            table.render(),
            "2 2\n# index 'long name' 'unit'\n1 'a' 'K'\n2 'b' '1'\n"
        );
    }
}
