use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One molecule of a benchmark dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetEntry {
    /// Identifier of the molecule.
    pub name: String,
    /// Path to the structure file, resolved against the dataset directory.
    pub structure: PathBuf,
    /// Reference nonpolar solvation free energy in kcal/mol, when known.
    pub experimental: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DatasetRecord {
    name: String,
    structure: String,
    #[serde(default)]
    experimental: Option<f64>,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Dataset '{0}' contains no entries")]
    Empty(String),
}

/// Loads a `name,structure,experimental` CSV file.
///
/// Relative structure paths are resolved against the directory containing the
/// CSV file; an empty `experimental` field yields `None`.
pub fn load_dataset(path: &Path) -> Result<Vec<DatasetEntry>, DatasetError> {
    let path_str = path.to_string_lossy().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DatasetError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut entries = Vec::new();
    for result in reader.deserialize::<DatasetRecord>() {
        let record = result.map_err(|e| DatasetError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        let structure = PathBuf::from(&record.structure);
        let structure = if structure.is_absolute() {
            structure
        } else {
            base_dir.join(structure)
        };
        entries.push(DatasetEntry {
            name: record.name,
            structure,
            experimental: record.experimental,
        });
    }

    if entries.is_empty() {
        return Err(DatasetError::Empty(path_str));
    }
    Ok(entries)
}
