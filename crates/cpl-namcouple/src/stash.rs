//! STASHmaster catalogue used by hybrid atmosphere couplings.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use cpl_core::errors::{CplError, ErrorInfo, FatalKind};
use tracing::debug;

use crate::run_info::RunInfo;

const ATMOSPHERE_MODEL: i32 = 1;

/// Section/item pair identifying an atmosphere diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StashCode {
    /// STASH section number.
    pub section: u16,
    /// STASH item number within the section.
    pub item: u16,
}

impl StashCode {
    /// Creates a code from its section and item.
    pub const fn new(section: u16, item: u16) -> Self {
        Self { section, item }
    }

    /// Parses the 5-digit `SSIII` form.
    pub fn parse(digits: &str) -> Option<Self> {
        if digits.len() != 5 || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            section: digits[..2].parse().ok()?,
            item: digits[2..].parse().ok()?,
        })
    }

    /// Conventional `m01sSSiIII` label.
    pub fn label(&self) -> String {
        format!("m01s{:02}i{:03}", self.section, self.item)
    }
}

impl fmt::Display for StashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:03}", self.section, self.item)
    }
}

/// Catalogue entry for one STASH code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashInfo {
    /// Descriptive name of the diagnostic.
    pub long_name: String,
    /// Horizontal grid code.
    pub grid_code: i32,
    /// First-level marker.
    pub first_level: i32,
    /// Last-level marker.
    pub last_level: i32,
}

/// Parsed STASHmaster catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StashMaster {
    entries: BTreeMap<StashCode, StashInfo>,
}

impl StashMaster {
    /// Parses STASHmaster text. Records that do not parse are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut lines = text.lines().map(str::trim);
        while let Some(line) = lines.next() {
            let Some(header) = line.strip_prefix("1|") else {
                continue;
            };
            let Some(body) = lines.next().and_then(|next| next.strip_prefix("2|")) else {
                continue;
            };
            match parse_record(header, body) {
                Some((code, info)) => {
                    entries.insert(code, info);
                }
                None => debug!(record = header, "skipping STASHmaster record"),
            }
        }
        Self { entries }
    }

    /// Reads and parses the catalogue at `path`.
    pub fn load(path: &Path) -> Result<Self, CplError> {
        let text = fs::read_to_string(path).map_err(|err| {
            CplError::from_info(
                FatalKind::MissingStashmaster,
                ErrorInfo::new(
                    FatalKind::MissingStashmaster.code(),
                    format!("cannot read STASHmaster: {err}"),
                )
                .with_context("path", path.display().to_string()),
            )
        })?;
        Ok(Self::parse(&text))
    }

    /// Entry for `code`, or `NOT_FOUND_STASH_CODE`.
    pub fn get(&self, code: StashCode) -> Result<&StashInfo, CplError> {
        self.entries.get(&code).ok_or_else(|| {
            CplError::fatal(
                FatalKind::NotFoundStashCode,
                format!("STASH code {code} is not in the STASHmaster catalogue"),
            )
        })
    }

    /// Number of catalogued codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_record(header: &str, body: &str) -> Option<(StashCode, StashInfo)> {
    let header: Vec<&str> = header.split('|').map(str::trim).collect();
    let body: Vec<&str> = body.split('|').map(str::trim).collect();
    let model: i32 = header.first()?.parse().ok()?;
    let section: i32 = header.get(1)?.parse().ok()?;
    let item: i32 = header.get(2)?.parse().ok()?;
    if model != ATMOSPHERE_MODEL || section < 0 || item < 0 {
        return None;
    }
    let code = StashCode::new(u16::try_from(section).ok()?, u16::try_from(item).ok()?);
    let info = StashInfo {
        long_name: header.get(3)?.to_string(),
        grid_code: body.get(3)?.parse().ok()?,
        first_level: body.get(5)?.parse().ok()?,
        last_level: body.get(6)?.parse().ok()?,
    };
    Some((code, info))
}

/// Lazily loaded catalogue: the file is read on the first hybrid lookup only.
#[derive(Debug, Default)]
pub struct StashCatalog {
    loaded: Option<StashMaster>,
}

impl StashCatalog {
    /// Creates an empty, not yet loaded catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the catalogue file has been read.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Looks `code` up, loading the catalogue named by `run_info` on first use.
    pub fn lookup(&mut self, code: StashCode, run_info: &RunInfo) -> Result<&StashInfo, CplError> {
        if self.loaded.is_none() {
            let path = run_info.stashmaster_path()?;
            let master = StashMaster::load(&path)?;
            debug!(path = %path.display(), entries = master.len(), "loaded STASHmaster");
            self.loaded = Some(master);
        }
        match &self.loaded {
            Some(master) => master.get(code),
            None => Err(CplError::fatal(
                FatalKind::MissingStashmaster,
                "STASHmaster catalogue unavailable",
            )),
        }
    }
}
