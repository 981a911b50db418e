//! Catalog of well-known SMC keys.
//!
//! The built-in table covers the temperature probes and status keys found on
//! Intel Macs. A JSON file with the same shape can replace it:
//!
//! ```json
//! { "keys": [ { "key": "TC0P", "name": "CPU 0 proximity", "kind": "temperature" } ] }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use smcprims_codec::{CodecError, Key};

/// Battery-power flag (`flag`).
pub const BATTERY_POWERED: Key = Key::from_bytes(*b"BATP");
/// Number of fans (`ui8 `).
pub const FAN_COUNT: Key = Key::from_bytes(*b"FNum");
/// Optical disk drive full flag (`flag`).
pub const OPTICAL_DRIVE_FULL: Key = Key::from_bytes(*b"MSDI");

/// What a catalog key measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Flag,
    Count,
}

/// One named key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: Key,
    pub name: String,
    pub kind: SensorKind,
}

#[derive(Deserialize)]
struct CatalogFile {
    keys: Vec<CatalogFileEntry>,
}

#[derive(Deserialize)]
struct CatalogFileEntry {
    key: String,
    name: String,
    kind: SensorKind,
}

/// Errors that can occur while loading a key catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid catalog key: {0}")]
    InvalidKey(#[from] CodecError),

    #[error("duplicate catalog key {0}")]
    Duplicate(String),
}

const BUILTIN: &[(&[u8; 4], &str, SensorKind)] = &[
    (b"TA0P", "Ambient air 0", SensorKind::Temperature),
    (b"TA1P", "Ambient air 1", SensorKind::Temperature),
    (b"TC0D", "CPU 0 diode", SensorKind::Temperature),
    (b"TC0H", "CPU 0 heatsink", SensorKind::Temperature),
    (b"TC0P", "CPU 0 proximity", SensorKind::Temperature),
    (b"TB0T", "Enclosure base 0", SensorKind::Temperature),
    (b"TB1T", "Enclosure base 1", SensorKind::Temperature),
    (b"TB2T", "Enclosure base 2", SensorKind::Temperature),
    (b"TB3T", "Enclosure base 3", SensorKind::Temperature),
    (b"TG0D", "GPU 0 diode", SensorKind::Temperature),
    (b"TG0H", "GPU 0 heatsink", SensorKind::Temperature),
    (b"TG0P", "GPU 0 proximity", SensorKind::Temperature),
    (b"TH0P", "Hard drive bay", SensorKind::Temperature),
    (b"TM0S", "Memory slot 0", SensorKind::Temperature),
    (b"TM0P", "Memory slots proximity", SensorKind::Temperature),
    (b"TN0H", "Northbridge", SensorKind::Temperature),
    (b"TN0D", "Northbridge diode", SensorKind::Temperature),
    (b"TN0P", "Northbridge proximity", SensorKind::Temperature),
    (b"TI0P", "Thunderbolt 0", SensorKind::Temperature),
    (b"TI1P", "Thunderbolt 1", SensorKind::Temperature),
    (b"TW0P", "Wireless module", SensorKind::Temperature),
    (b"BATP", "Battery powered", SensorKind::Flag),
    (b"MSDI", "Optical drive full", SensorKind::Flag),
    (b"FNum", "Fan count", SensorKind::Count),
];

/// Named keys, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for KeyCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeyCatalog {
    /// The built-in table.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(key, name, kind)| CatalogEntry {
                key: Key::from_bytes(**key),
                name: (*name).to_string(),
                kind: *kind,
            })
            .collect();
        Self { entries }
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(file.keys.len());

        for entry in file.keys {
            let key = Key::new(&entry.key)?;
            if !seen.insert(key) {
                return Err(CatalogError::Duplicate(entry.key));
            }
            entries.push(CatalogEntry {
                key,
                name: entry.name,
                kind: entry.kind,
            });
        }
        Ok(Self { entries })
    }

    /// Load a catalog file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries of one kind.
    pub fn of_kind(&self, kind: SensorKind) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Look up the entry for `key`.
    pub fn get(&self, key: Key) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
