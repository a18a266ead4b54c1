//! TLE catalog
use itertools::Itertools;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    tle::{OrbitalElements, TleRecord},
    Error,
};

#[cfg(feature = "serde")]
use serde::Deserialize;

/// One catalog entry, with its elements parsed once at load time
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Catalog identifier
    pub id: u32,
    /// Raw record
    pub tle: Arc<TleRecord>,
    /// Parsed elements
    pub elements: OrbitalElements,
}

/// Structured catalog entry, as produced by the text to JSON converter
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct JsonEntry {
    #[serde(rename = "ID")]
    id: u32,
    name: String,
    #[serde(rename = "line-1")]
    line1: String,
    #[serde(rename = "line-2")]
    line2: String,
}

/// Read-only, ordered TLE catalog. Iteration order is load order,
/// satellite names are unique.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds new [Catalog] from (identifier, record) pairs.
    /// Aborts on the first malformed record or duplicate name.
    pub fn from_records<I: IntoIterator<Item = (u32, TleRecord)>>(
        records: I,
    ) -> Result<Self, Error> {
        let records = records.into_iter().collect::<Vec<_>>();
        if let Some(name) = records.iter().map(|(_, tle)| &tle.name).duplicates().next() {
            return Err(Error::DuplicateName(name.clone()));
        }
        let mut catalog = Self::default();
        for (id, tle) in records {
            catalog.push(id, tle)?;
        }
        Ok(catalog)
    }
    /// Builds new [Catalog] from (identifier, record) pairs, skipping
    /// malformed records and duplicate names. Skipped entries are returned
    /// alongside, so they can be reported.
    pub fn from_records_lossy<I: IntoIterator<Item = (u32, TleRecord)>>(
        records: I,
    ) -> (Self, Vec<Error>) {
        let mut catalog = Self::default();
        let mut errors = Vec::new();
        for (id, tle) in records {
            if let Err(e) = catalog.push(id, tle) {
                warn!("{}", e);
                errors.push(e);
            }
        }
        (catalog, errors)
    }
    /// Parses 3-line text blocks. Identifiers are 1-based block positions.
    pub fn from_text(content: &str) -> Result<Self, Error> {
        Self::from_records(Self::numbered(content))
    }
    /// Lossy version of [Catalog::from_text]
    pub fn from_text_lossy(content: &str) -> (Self, Vec<Error>) {
        Self::from_records_lossy(Self::numbered(content))
    }
    fn numbered(content: &str) -> impl Iterator<Item = (u32, TleRecord)> {
        TleRecord::parse_blocks(content)
            .into_iter()
            .enumerate()
            .map(|(i, tle)| (i as u32 + 1, tle))
    }
    /// Parses the structured JSON form: an array of
    /// `{"ID", "name", "line-1", "line-2"}` objects.
    #[cfg(feature = "serde")]
    #[cfg_attr(docrs, doc(cfg(feature = "serde")))]
    pub fn from_json(content: &str) -> Result<Self, Error> {
        Self::from_records(Self::json_records(content)?)
    }
    /// Lossy version of [Catalog::from_json]. Invalid JSON is still an error.
    #[cfg(feature = "serde")]
    #[cfg_attr(docrs, doc(cfg(feature = "serde")))]
    pub fn from_json_lossy(content: &str) -> Result<(Self, Vec<Error>), Error> {
        Ok(Self::from_records_lossy(Self::json_records(content)?))
    }
    #[cfg(feature = "serde")]
    fn json_records(content: &str) -> Result<Vec<(u32, TleRecord)>, Error> {
        let entries: Vec<JsonEntry> =
            serde_json::from_str(content).map_err(|e| Error::Json(e.to_string()))?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                (
                    entry.id,
                    TleRecord::new(&entry.name, &entry.line1, &entry.line2),
                )
            })
            .collect())
    }
    /// Appends a new record, parsing its elements.
    pub fn push(&mut self, id: u32, tle: TleRecord) -> Result<(), Error> {
        if self.index.contains_key(&tle.name) {
            return Err(Error::DuplicateName(tle.name));
        }
        let elements = tle.elements().map_err(|e| Error::CatalogEntry {
            id,
            name: tle.name.clone(),
            source: Box::new(e),
        })?;
        if !tle.checksums_ok() {
            warn!("{} (#{}): invalid tle checksum", tle.name, id);
        }
        debug!("{} (#{}): epoch {}", tle.name, id, elements.epoch);
        self.index.insert(tle.name.clone(), self.entries.len());
        self.entries.push(CatalogEntry {
            id,
            tle: Arc::new(tle),
            elements,
        });
        Ok(())
    }
    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// True if this [Catalog] is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Entries, in catalog order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
    /// Iterates entries in catalog order
    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }
    /// Name lookup
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
