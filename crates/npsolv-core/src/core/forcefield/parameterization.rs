use super::params::Forcefield;
use super::potentials::sigma_from_r_min_half;
use crate::core::models::{
    atom::{Atom, LjParam},
    element::{bondi_radius, element_symbol_for_atom},
    system::MolecularSystem,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Where the cavity radius of an atom comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadiusSource {
    /// The `r_min/2` radius of the atom's force field type, scaled.
    #[default]
    Forcefield,
    /// The radius column of the structure file, used as is.
    File,
    /// The Bondi radius of the atom's element, scaled.
    Bondi,
}

impl std::str::FromStr for RadiusSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forcefield" => Ok(Self::Forcefield),
            "file" => Ok(Self::File),
            "bondi" => Ok(Self::Bondi),
            other => Err(format!("unknown radius source '{}'", other)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterizationError {
    #[error("Missing VDW parameter for force field type '{ff_type}' in atom '{atom_name}' (serial {serial})")]
    MissingVdwParams {
        ff_type: String,
        atom_name: String,
        serial: usize,
    },
    #[error("Atom '{atom_name}' (serial {serial}) has no radius in the structure file")]
    MissingRadius { atom_name: String, serial: usize },
    #[error("Cannot determine a Bondi radius for atom '{atom_name}' (serial {serial})")]
    UnknownElement { atom_name: String, serial: usize },
}

/// Assigns Lennard-Jones parameters and cavity radii to the atoms of a system.
pub struct Parameterizer<'a> {
    forcefield: &'a Forcefield,
    radius_source: RadiusSource,
    radius_scale: f64,
}

impl<'a> Parameterizer<'a> {
    pub fn new(forcefield: &'a Forcefield, radius_source: RadiusSource, radius_scale: f64) -> Self {
        Self {
            forcefield,
            radius_source,
            radius_scale,
        }
    }

    pub fn parameterize_system(
        &self,
        system: &mut MolecularSystem,
    ) -> Result<(), ParameterizationError> {
        let atom_ids = system.atom_ids().to_vec();
        for atom_id in atom_ids {
            if let Some(atom) = system.atom_mut(atom_id) {
                self.parameterize_atom(atom)?;
            }
        }
        debug!(
            atoms = system.len(),
            source = ?self.radius_source,
            scale = self.radius_scale,
            "Assigned cavity radii and Lennard-Jones parameters."
        );
        Ok(())
    }

    fn parameterize_atom(&self, atom: &mut Atom) -> Result<(), ParameterizationError> {
        let vdw = self
            .forcefield
            .vdw
            .get(&atom.force_field_type)
            .ok_or_else(|| ParameterizationError::MissingVdwParams {
                ff_type: atom.force_field_type.clone(),
                atom_name: atom.name.clone(),
                serial: atom.serial,
            })?;

        atom.radius = match self.radius_source {
            RadiusSource::Forcefield => vdw.radius * self.radius_scale,
            RadiusSource::File => {
                atom.file_radius
                    .ok_or_else(|| ParameterizationError::MissingRadius {
                        atom_name: atom.name.clone(),
                        serial: atom.serial,
                    })?
            }
            RadiusSource::Bondi => {
                let radius = element_symbol_for_atom(&atom.name, &atom.residue_name)
                    .and_then(|symbol| bondi_radius(&symbol))
                    .ok_or_else(|| ParameterizationError::UnknownElement {
                        atom_name: atom.name.clone(),
                        serial: atom.serial,
                    })?;
                radius * self.radius_scale
            }
        };
        atom.lj = Some(LjParam {
            sigma: sigma_from_r_min_half(vdw.radius),
            well_depth: vdw.well_depth,
        });
        Ok(())
    }
}
