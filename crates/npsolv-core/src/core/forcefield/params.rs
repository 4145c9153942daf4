use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Continuum description of the solvent.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SolventParams {
    pub name: String,
    /// Number density of interaction sites in Å^-3.
    pub number_density: f64,
    /// Probe radius separating the SES from the SAS, in Å.
    pub probe_radius: f64,
    /// Lennard-Jones σ of the solvent site, in Å.
    pub sigma: f64,
    /// Lennard-Jones ε of the solvent site, in kcal/mol.
    pub well_depth: f64,
}

/// Per-type Lennard-Jones parameters in the `r_min/2` convention.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct VdwParam {
    /// Half of the pair-potential minimum distance, in Å.
    pub radius: f64,
    /// Well depth in kcal/mol.
    pub well_depth: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Forcefield {
    pub solvent: SolventParams,
    pub vdw: HashMap<String, VdwParam>,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid parameter in '{path}': {message}")]
    Invalid { path: String, message: String },
}

impl Forcefield {
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let forcefield: Forcefield = toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path_str.clone(),
            source: e,
        })?;
        forcefield
            .validate()
            .map_err(|message| ParamLoadError::Invalid {
                path: path_str,
                message,
            })?;
        Ok(forcefield)
    }

    fn validate(&self) -> Result<(), String> {
        let s = &self.solvent;
        if s.number_density <= 0.0 {
            return Err(format!("solvent number-density must be positive, got {}", s.number_density));
        }
        if s.probe_radius <= 0.0 {
            return Err(format!("solvent probe-radius must be positive, got {}", s.probe_radius));
        }
        if s.sigma <= 0.0 {
            return Err(format!("solvent sigma must be positive, got {}", s.sigma));
        }
        if s.well_depth < 0.0 {
            return Err(format!("solvent well-depth must not be negative, got {}", s.well_depth));
        }
        for (ff_type, param) in &self.vdw {
            if param.radius <= 0.0 {
                return Err(format!("vdw.{}: radius must be positive, got {}", ff_type, param.radius));
            }
            if param.well_depth < 0.0 {
                return Err(format!(
                    "vdw.{}: well-depth must not be negative, got {}",
                    ff_type, param.well_depth
                ));
            }
        }
        Ok(())
    }
}
