use nalgebra::Point3;
use serde::Serialize;

/// Lennard-Jones parameters in the `σ`/`ε` convention.
///
/// `U(r) = 4ε[(σ/r)^12 - (σ/r)^6]`, with `σ` in Angstroms and `ε` in kcal/mol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LjParam {
    /// Distance at which the pair potential crosses zero, in Angstroms.
    pub sigma: f64,
    /// Well depth in kcal/mol.
    pub well_depth: f64,
}

/// Represents an atom of the solute.
///
/// Atoms come out of the structure readers carrying identity, coordinates and
/// (optionally) an explicit radius. The cavity radius used for meshing and the
/// Lennard-Jones parameters used for dispersion are filled in by the
/// [`Parameterizer`](crate::core::forcefield::parameterization::Parameterizer).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "C1", "OH").
    pub name: String,
    /// The residue (molecule) name the atom belongs to.
    pub residue_name: String,
    /// The residue sequence number.
    pub residue_number: isize,
    /// The serial number read from the structure file.
    pub serial: usize,
    /// The force field atom type used to look up Lennard-Jones parameters.
    pub force_field_type: String,
    /// The partial atomic charge in elementary charge units.
    pub partial_charge: f64,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Radius given by the structure file, if any (PQR).
    pub file_radius: Option<f64>,
    /// Cavity radius used to build the molecular surfaces, in Angstroms.
    pub radius: f64,
    /// Lennard-Jones parameters assigned during parameterization.
    pub lj: Option<LjParam>,
}

impl Atom {
    /// Creates a new `Atom` with default values for most fields.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `residue_name` - The name of the residue containing the atom.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, residue_name: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_name: residue_name.to_string(),
            residue_number: 1,
            serial: 0,
            force_field_type: String::new(),
            partial_charge: 0.0,
            position,
            file_radius: None,
            radius: 0.0,
            lj: None,
        }
    }

    /// Returns `true` once Lennard-Jones parameters have been assigned.
    pub fn is_parameterized(&self) -> bool {
        self.lj.is_some()
    }
}
