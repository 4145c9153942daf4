use super::bgf::{BgfError, BgfFile};
use super::pqr::{PqrError, PqrFile};
use super::traits::MolecularFile;
use crate::core::models::system::MolecularSystem;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Structure file formats accepted as solute input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    Bgf,
    Pqr,
}

#[derive(Debug, Error)]
pub enum StructureError {
    #[error(transparent)]
    Bgf(#[from] BgfError),
    #[error(transparent)]
    Pqr(#[from] PqrError),
    #[error("Cannot determine structure format of '{0}' (expected a .bgf or .pqr extension)")]
    UnknownFormat(String),
}

impl StructureFormat {
    /// Guesses the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for StructureFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bgf" => Ok(StructureFormat::Bgf),
            "pqr" => Ok(StructureFormat::Pqr),
            _ => Err(()),
        }
    }
}

/// Reads a solute structure, using `format` or falling back to the file extension.
pub fn read_structure(
    path: &Path,
    format: Option<StructureFormat>,
) -> Result<MolecularSystem, StructureError> {
    let format = format
        .or_else(|| StructureFormat::from_path(path))
        .ok_or_else(|| StructureError::UnknownFormat(path.display().to_string()))?;
    match format {
        StructureFormat::Bgf => Ok(BgfFile::read_from_path(path)?),
        StructureFormat::Pqr => Ok(PqrFile::read_from_path(path)?),
    }
}
