use super::{Catalog, CatalogOptions, StatusDefinition};
use crate::error::SnapshotError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// A catalog frozen to bytes, so an edit session can start without refetching it.
///
/// Loading re-runs every catalog check, so a snapshot can never smuggle in a
/// catalog the builder would reject.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub format_version: u32,
    pub options: CatalogOptions,
    pub statuses: Vec<StatusDefinition>,
}

impl CatalogSnapshot {
    pub const FORMAT_VERSION: u32 = 1;

    pub fn new(catalog: &Catalog) -> Self {
        Self {
            format_version: Self::FORMAT_VERSION,
            options: catalog.options().clone(),
            statuses: catalog.statuses().to_vec(),
        }
    }

    /// Rebuilds the catalog, validating it again.
    pub fn into_catalog(self) -> Result<Catalog, SnapshotError> {
        if self.format_version != Self::FORMAT_VERSION {
            return Err(SnapshotError::Generic(format!(
                "Unsupported snapshot format version {} (expected {})",
                self.format_version,
                Self::FORMAT_VERSION
            )));
        }
        Ok(Catalog::builder(self.statuses)
            .with_options(self.options)
            .build()?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_to_vec(self, standard())
            .map_err(|e| SnapshotError::Generic(format!("Serialization failed: {}", e)))
    }

    /// Saves the snapshot to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), SnapshotError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| {
            SnapshotError::Generic(format!("Could not create file '{}': {}", path, e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            SnapshotError::Generic(format!("Could not write to file '{}': {}", path, e))
        })?;
        tracing::debug!(path, bytes = bytes.len(), "catalog snapshot saved");
        Ok(())
    }

    /// Loads a snapshot from a file.
    pub fn from_file(path: &str) -> Result<Self, SnapshotError> {
        let mut file = fs::File::open(path).map_err(|e| {
            SnapshotError::Generic(format!("Could not open file '{}': {}", path, e))
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            SnapshotError::Generic(format!("Could not read from file '{}': {}", path, e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes a snapshot from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        decode_from_slice(bytes, standard())
            .map(|(snapshot, _)| snapshot) // bincode 2 returns (value, bytes_read)
            .map_err(|e| SnapshotError::Generic(format!("Deserialization failed: {}", e)))
    }
}

impl Catalog {
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::new(self)
    }
}
