use thiserror::Error;

use super::config::ConfigError;
use crate::core::bem::solver::SolverError;
use crate::core::forcefield::parameterization::ParameterizationError;
use crate::core::forcefield::params::ParamLoadError;
use crate::core::io::format::StructureError;
use crate::core::mesh::error::MeshError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to load force field: {source}")]
    Forcefield {
        #[from]
        source: ParamLoadError,
    },

    #[error("Failed to read structure: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Parameterization failed: {source}")]
    Parameterization {
        #[from]
        source: ParameterizationError,
    },

    #[error("Surface construction failed: {source}")]
    Mesh {
        #[from]
        source: MeshError,
    },

    #[error("Linear solve failed: {source}")]
    Solver {
        #[from]
        source: SolverError,
    },

    #[error("Atom '{atom_name}' (serial {serial}) has no Lennard-Jones parameters")]
    Unparameterized { atom_name: String, serial: usize },
}
