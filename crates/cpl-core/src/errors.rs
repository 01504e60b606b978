//! Structured error types shared across the namcouple crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`CplError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (field names, directions, paths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the namcouple compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CplError {
    /// Malformed declarative coupling input.
    #[error("input error: {0}")]
    Input(ErrorInfo),
    /// Grid, level, STASH or mapping codes that cannot be resolved.
    #[error("resolve error: {0}")]
    Resolve(ErrorInfo),
    /// Cross-record or cross-component inconsistencies.
    #[error("consistency error: {0}")]
    Consistency(ErrorInfo),
    /// Missing or invalid run-context entries.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Failures while rendering a field block.
    #[error("emit error: {0}")]
    Emit(ErrorInfo),
    /// Filesystem and serialization failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl CplError {
    /// Builds an error of the given kind, placed in the family that owns it.
    pub fn fatal(kind: FatalKind, message: impl Into<String>) -> Self {
        Self::from_info(kind, ErrorInfo::new(kind.code(), message))
    }

    /// Wraps an already populated payload in the family owning `kind`.
    pub fn from_info(kind: FatalKind, info: ErrorInfo) -> Self {
        match kind.family() {
            Family::Input => CplError::Input(info),
            Family::Resolve => CplError::Resolve(info),
            Family::Consistency => CplError::Consistency(info),
            Family::Config => CplError::Config(info),
            Family::Emit => CplError::Emit(info),
            Family::Io => CplError::Io(info),
        }
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CplError::Input(info)
            | CplError::Resolve(info)
            | CplError::Consistency(info)
            | CplError::Config(info)
            | CplError::Emit(info)
            | CplError::Io(info) => info,
        }
    }

    fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            CplError::Input(info)
            | CplError::Resolve(info)
            | CplError::Consistency(info)
            | CplError::Config(info)
            | CplError::Emit(info)
            | CplError::Io(info) => info,
        }
    }

    /// Adds a context entry to the wrapped payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info_mut().context.insert(key.into(), value.into());
        self
    }

    /// Sets the remediation hint of the wrapped payload.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.info_mut().hint = Some(hint.into());
        self
    }

    /// Returns the fatal kind encoded in the payload code, if it is a known one.
    pub fn kind(&self) -> Option<FatalKind> {
        FatalKind::from_code(&self.info().code)
    }

    /// Process exit code for this error. Unknown codes exit with 1.
    pub fn exit_code(&self) -> u8 {
        self.kind().map(FatalKind::exit_code).unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Input,
    Resolve,
    Consistency,
    Config,
    Emit,
    Io,
}

/// Every fatal condition the compiler can report, each with its own exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FatalKind {
    /// A coupling value that is not in the semicolon-delimited grammar.
    WrongCplFormat,
    /// A coupling specification with fewer than six fields.
    MissingNamcoupleInput,
    /// Unknown mapping token or mapping order.
    UnrecognisedMapping,
    /// First specification of a call omitted the mapping.
    MissingMapping,
    /// First specification of a call omitted the weighting.
    MissingWeighting,
    /// STASH grid code outside the supported set.
    UnrecognisedGrid,
    /// Level boundary markers that cannot be decoded.
    UnrecognisedLevel,
    /// STASH code absent from the field name or the catalogue.
    NotFoundStashCode,
    /// STASHmaster catalogue file could not be found.
    MissingStashmaster,
    /// Hybrid atmosphere instances disagree on model levels.
    DifferentModelLevels,
    /// Hybrid atmosphere instances disagree on soil levels.
    DifferentSoilLevels,
    /// Two retained fields share a weighting.
    DuplicateWeighting,
    /// A run-context entry required for resolution is absent.
    NotFoundCplVar,
    /// Fewer coupling frequencies configured than the selector needs.
    NotEnoughCplFreq,
    /// A one-dimensional grid without a configured vector length.
    Unknown1dGridSize,
    /// Remap generation requested for a mapping SCRIP cannot produce.
    MissingRmpMapping,
    /// A component without a horizontal resolution.
    MissingResolution,
    /// The run-context or couplings file could not be parsed.
    RunInfoInvalid,
    /// Output files could not be written.
    OutputIo,
}

impl FatalKind {
    /// All kinds, in exit-code order.
    pub const ALL: [FatalKind; 19] = [
        FatalKind::WrongCplFormat,
        FatalKind::MissingNamcoupleInput,
        FatalKind::UnrecognisedMapping,
        FatalKind::MissingMapping,
        FatalKind::MissingWeighting,
        FatalKind::UnrecognisedGrid,
        FatalKind::UnrecognisedLevel,
        FatalKind::NotFoundStashCode,
        FatalKind::MissingStashmaster,
        FatalKind::DifferentModelLevels,
        FatalKind::DifferentSoilLevels,
        FatalKind::DuplicateWeighting,
        FatalKind::NotFoundCplVar,
        FatalKind::NotEnoughCplFreq,
        FatalKind::Unknown1dGridSize,
        FatalKind::MissingRmpMapping,
        FatalKind::MissingResolution,
        FatalKind::RunInfoInvalid,
        FatalKind::OutputIo,
    ];

    /// Stable code written into [`ErrorInfo::code`].
    pub const fn code(self) -> &'static str {
        match self {
            FatalKind::WrongCplFormat => "WRONG_CPL_FORMAT",
            FatalKind::MissingNamcoupleInput => "MISSING_NAMCOUPLE_INPUT",
            FatalKind::UnrecognisedMapping => "UNRECOGNISED_MAPPING",
            FatalKind::MissingMapping => "MISSING_MAPPING",
            FatalKind::MissingWeighting => "MISSING_WEIGHTING",
            FatalKind::UnrecognisedGrid => "UNRECOGNISED_GRID",
            FatalKind::UnrecognisedLevel => "UNRECOGNISED_LEVEL",
            FatalKind::NotFoundStashCode => "NOT_FOUND_STASH_CODE",
            FatalKind::MissingStashmaster => "MISSING_STASHMASTER_A",
            FatalKind::DifferentModelLevels => "DIFFERENT_MODEL_LEVELS",
            FatalKind::DifferentSoilLevels => "DIFFERENT_SOIL_LEVELS",
            FatalKind::DuplicateWeighting => "DUPLICATE_WEIGHTING",
            FatalKind::NotFoundCplVar => "NOT_FOUND_CPL_VAR",
            FatalKind::NotEnoughCplFreq => "NOT_ENOUGH_CPL_FREQ",
            FatalKind::Unknown1dGridSize => "UNKNOWN_1D_GRID_SIZE",
            FatalKind::MissingRmpMapping => "MISSING_RMP_MAPPING",
            FatalKind::MissingResolution => "MISSING_RESOLUTION",
            FatalKind::RunInfoInvalid => "RUN_INFO_INVALID",
            FatalKind::OutputIo => "OUTPUT_IO",
        }
    }

    /// Process exit code reported by the command-line driver.
    pub const fn exit_code(self) -> u8 {
        match self {
            FatalKind::WrongCplFormat => 11,
            FatalKind::MissingNamcoupleInput => 12,
            FatalKind::UnrecognisedMapping => 13,
            FatalKind::MissingMapping => 14,
            FatalKind::MissingWeighting => 15,
            FatalKind::UnrecognisedGrid => 21,
            FatalKind::UnrecognisedLevel => 22,
            FatalKind::NotFoundStashCode => 23,
            FatalKind::MissingStashmaster => 24,
            FatalKind::DifferentModelLevels => 31,
            FatalKind::DifferentSoilLevels => 32,
            FatalKind::DuplicateWeighting => 33,
            FatalKind::NotFoundCplVar => 41,
            FatalKind::NotEnoughCplFreq => 42,
            FatalKind::Unknown1dGridSize => 43,
            FatalKind::MissingRmpMapping => 44,
            FatalKind::MissingResolution => 45,
            FatalKind::RunInfoInvalid => 51,
            FatalKind::OutputIo => 61,
        }
    }

    /// Looks a kind up by its stable code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    const fn family(self) -> Family {
        match self {
            FatalKind::WrongCplFormat
            | FatalKind::MissingNamcoupleInput
            | FatalKind::UnrecognisedMapping
            | FatalKind::MissingMapping
            | FatalKind::MissingWeighting => Family::Input,
            FatalKind::UnrecognisedGrid
            | FatalKind::UnrecognisedLevel
            | FatalKind::NotFoundStashCode
            | FatalKind::MissingStashmaster => Family::Resolve,
            FatalKind::DifferentModelLevels
            | FatalKind::DifferentSoilLevels
            | FatalKind::DuplicateWeighting => Family::Consistency,
            FatalKind::NotFoundCplVar
            | FatalKind::NotEnoughCplFreq
            | FatalKind::MissingResolution
            | FatalKind::RunInfoInvalid => Family::Config,
            FatalKind::Unknown1dGridSize | FatalKind::MissingRmpMapping => Family::Emit,
            FatalKind::OutputIo => Family::Io,
        }
    }
}

impl Display for FatalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
