#![deny(missing_docs)]
#![doc = "Shared vocabulary for the namcouple compiler: components, coupling directions, mappings and coupling records."]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod provenance;

pub use errors::{CplError, ErrorInfo, FatalKind};
pub use provenance::{GenerationProvenance, SchemaVersion};

/// Model component taking part in coupling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Component {
    /// Primary atmosphere instance.
    #[serde(rename = "ATM")]
    Atm,
    /// Secondary ("junior") atmosphere instance used by hybrid coupling.
    #[serde(rename = "JNR")]
    Jnr,
    /// Ocean and sea ice.
    #[serde(rename = "OCN")]
    Ocn,
    /// River routing.
    #[serde(rename = "RIV")]
    Riv,
    /// Placeholder emitted for `default` couplings before expansion.
    #[serde(rename = "?")]
    Unresolved,
}

impl Component {
    /// Components that can appear in a resolved coupling.
    pub const MODELS: [Component; 4] = [
        Component::Atm,
        Component::Jnr,
        Component::Ocn,
        Component::Riv,
    ];

    /// Tag used in the grammar, in field names and in namcouple comments.
    pub const fn tag(self) -> &'static str {
        match self {
            Component::Atm => "ATM",
            Component::Jnr => "JNR",
            Component::Ocn => "OCN",
            Component::Riv => "RIV",
            Component::Unresolved => "?",
        }
    }

    /// Single character distinguishing the two atmosphere instances in hybrid field names.
    pub const fn hybrid_marker(self) -> Option<char> {
        match self {
            Component::Atm => Some('A'),
            Component::Jnr => Some('J'),
            _ => None,
        }
    }

    /// Periodicity/overlap marker written in the grid block (`P <n>`).
    pub const fn periodicity(self) -> u8 {
        match self {
            Component::Ocn => 2,
            _ => 0,
        }
    }

    /// Whether the component is one of the atmosphere instances.
    pub const fn is_atmosphere(self) -> bool {
        matches!(self, Component::Atm | Component::Jnr)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Component {
    type Err = CplError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ATM" => Ok(Component::Atm),
            "JNR" => Ok(Component::Jnr),
            "OCN" => Ok(Component::Ocn),
            "RIV" => Ok(Component::Riv),
            "?" => Ok(Component::Unresolved),
            other => Err(CplError::fatal(
                FatalKind::WrongCplFormat,
                format!("unknown component '{other}'"),
            )),
        }
    }
}

/// Ordered pair of components, written `ATM2OCN` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Direction {
    /// Sending component.
    pub origin: Component,
    /// Receiving component.
    pub dest: Component,
}

impl Direction {
    /// Creates a direction from its two endpoints.
    pub const fn new(origin: Component, dest: Component) -> Self {
        Self { origin, dest }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}2{}", self.origin, self.dest)
    }
}

impl FromStr for Direction {
    type Err = CplError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (origin, dest) = value.split_once('2').ok_or_else(|| {
            CplError::fatal(
                FatalKind::RunInfoInvalid,
                format!("direction '{value}' is not of the form ORIGIN2DEST"),
            )
        })?;
        let parse = |part: &str| {
            part.parse::<Component>().map_err(|err| {
                CplError::fatal(FatalKind::RunInfoInvalid, err.info().message.clone())
                    .with_context("direction", value)
            })
        };
        Ok(Self::new(parse(origin)?, parse(dest)?))
    }
}

impl TryFrom<String> for Direction {
    type Error = CplError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.to_string()
    }
}

/// Interpolation method requested for a coupling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mapping {
    /// Bilinear interpolation.
    #[serde(rename = "BILINEA")]
    Bilinear,
    /// Bicubic interpolation.
    #[serde(rename = "BICUBIC")]
    Bicubic,
    /// Conservative remapping normalised by the fractional area.
    #[serde(rename = "CONSERV_FRACAREA")]
    ConservFracarea,
    /// Conservative remapping normalised by the destination area.
    #[serde(rename = "CONSERV_DESTAREA")]
    ConservDestarea,
    /// Distance weighted nearest neighbours.
    #[serde(rename = "DISTWGT")]
    DistanceWeighted,
    /// Patch recovery; only available through pre-built weights.
    #[serde(rename = "PATCH")]
    Patch,
    /// Scalar (zero-dimensional) exchange.
    #[serde(rename = "0D")]
    Scalar,
    /// One-dimensional vector exchange.
    #[serde(rename = "1D")]
    OneDimensional,
    /// Drops the coupling from the output.
    #[serde(rename = "remove")]
    Remove,
}

impl Mapping {
    /// Parses a grammar token such as `CF` or `Bi`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Bi" => Some(Mapping::Bilinear),
            "Bc" => Some(Mapping::Bicubic),
            "CF" => Some(Mapping::ConservFracarea),
            "CD" => Some(Mapping::ConservDestarea),
            "NN" => Some(Mapping::DistanceWeighted),
            "Pa" => Some(Mapping::Patch),
            "0D" => Some(Mapping::Scalar),
            "1D" => Some(Mapping::OneDimensional),
            "remove" => Some(Mapping::Remove),
            _ => None,
        }
    }

    /// Identifier used in remap file names and diagnostics.
    pub const fn identifier(self) -> &'static str {
        match self {
            Mapping::Bilinear => "BILINEA",
            Mapping::Bicubic => "BICUBIC",
            Mapping::ConservFracarea => "CONSERV_FRACAREA",
            Mapping::ConservDestarea => "CONSERV_DESTAREA",
            Mapping::DistanceWeighted => "DISTWGT",
            Mapping::Patch => "PATCH",
            Mapping::Scalar => "0D",
            Mapping::OneDimensional => "1D",
            Mapping::Remove => "remove",
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// One field exchange for one coupling timestep group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouplingField {
    /// Field identifier on the sending side.
    pub name_out: String,
    /// Numeric field code from the declarative input.
    pub field_id: i64,
    /// One-letter grid tag (`t`, `u`, `v`, ...); `?` until resolved.
    pub grid: char,
    /// Sending component.
    pub origin: Component,
    /// Receiving component.
    pub dest: Component,
    /// Number of vertical levels, `None` while unresolved.
    pub nlev: Option<u32>,
    /// Whether the levels are soil levels, `None` while unresolved.
    pub is_soil: Option<bool>,
    /// Interpolation method.
    pub mapping: Mapping,
    /// Optional mapping order (1 or 2).
    pub mapping_order: Option<u8>,
    /// Total-order key for output.
    pub weight: i64,
    /// Selects the hybrid atmosphere-to-atmosphere resolver.
    pub is_hybrid: bool,
    /// Index into the direction's coupling frequency schedule.
    pub freq_selector: usize,
    /// Explicit frequency in seconds bypassing the schedule lookup.
    pub freq_override: Option<u32>,
}

impl CouplingField {
    /// Unresolved record produced by a `default` coupling value.
    pub fn placeholder() -> Self {
        Self {
            name_out: "?".into(),
            field_id: 0,
            grid: '?',
            origin: Component::Unresolved,
            dest: Component::Unresolved,
            nlev: None,
            is_soil: None,
            mapping: Mapping::Remove,
            mapping_order: None,
            weight: 0,
            is_hybrid: false,
            freq_selector: 0,
            freq_override: None,
        }
    }

    /// Whether this record still awaits default-coupling expansion.
    pub fn is_placeholder(&self) -> bool {
        self.origin == Component::Unresolved
    }

    /// Whether the record is excluded from the written output.
    pub fn is_removed(&self) -> bool {
        self.mapping == Mapping::Remove
    }

    /// Direction the field travels in.
    pub fn direction(&self) -> Direction {
        Direction::new(self.origin, self.dest)
    }
}
