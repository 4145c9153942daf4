use crate::core::bem::quadrature::{SEVEN_POINT_RULE, integrate};
use crate::core::forcefield::params::SolventParams;
use crate::core::forcefield::potentials::{lj_radial_flux, mix_lorentz_berthelot};
use crate::core::mesh::surface::SurfaceMesh;
use crate::core::models::atom::{Atom, LjParam};
use crate::core::models::system::MolecularSystem;
use crate::engine::config::DispersionSurface;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AtomDispersion {
    pub serial: usize,
    pub name: String,
    /// Contribution of this atom in kcal/mol.
    pub energy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DispersionReport {
    /// Solute-solvent dispersion free energy in kcal/mol.
    pub energy: f64,
    pub surface: DispersionSurface,
    pub surface_area: f64,
    pub number_density: f64,
    pub atoms: Vec<AtomDispersion>,
}

/// Integrates the Lennard-Jones interaction of every atom with a uniform
/// solvent occupying the exterior of `surface`.
///
/// For atom `i`, `U_i = ∇·F_i` with `F_i(d) = g_i(|d|) d`, so the volume
/// integral over the solvent becomes `-∮ F_i·n dS` over the surface.
#[instrument(skip_all, name = "dispersion_task")]
pub fn run(
    system: &MolecularSystem,
    surface: &SurfaceMesh,
    which: DispersionSurface,
    solvent: &SolventParams,
    reporter: &ProgressReporter,
) -> Result<DispersionReport, EngineError> {
    let _phase = reporter.phase("Dispersion");
    let solvent_lj = LjParam {
        sigma: solvent.sigma,
        well_depth: solvent.well_depth,
    };

    let atoms: Vec<&Atom> = system.atoms_iter().map(|(_, atom)| atom).collect();
    let pairs = atoms
        .iter()
        .map(|atom| {
            atom.lj
                .map(|lj| (*atom, mix_lorentz_berthelot(lj, solvent_lj)))
                .ok_or_else(|| EngineError::Unparameterized {
                    atom_name: atom.name.clone(),
                    serial: atom.serial,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pairs.par_iter();

    let contributions: Vec<AtomDispersion> = iterator
        .map(|(atom, mixed)| {
            let energy = -solvent.number_density * surface_flux(surface, atom, *mixed);
            reporter.report(Progress::TaskIncrement);
            AtomDispersion {
                serial: atom.serial,
                name: atom.name.clone(),
                energy,
            }
        })
        .collect();
    reporter.report(Progress::TaskFinish);

    let energy = contributions.iter().map(|a| a.energy).sum();
    info!(energy, atoms = contributions.len(), surface = ?which, "Dispersion term finished.");

    Ok(DispersionReport {
        energy,
        surface: which,
        surface_area: surface.area(),
        number_density: solvent.number_density,
        atoms: contributions,
    })
}

/// `∮ F·n dS` of the radial field of one atom over the surface.
fn surface_flux(surface: &SurfaceMesh, atom: &Atom, lj: LjParam) -> f64 {
    let centre = atom.position;
    surface
        .panels()
        .iter()
        .map(|panel| {
            integrate(panel, &SEVEN_POINT_RULE, |x| {
                let d = x - centre;
                let r = d.norm();
                lj_radial_flux(r, lj.sigma, lj.well_depth) * d.dot(&panel.normal)
            })
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::potentials::lj_exterior_sphere_integral;
    use crate::core::mesh::generators::icosphere;
    use nalgebra::Point3;

    fn tip3p() -> SolventParams {
        SolventParams {
            name: "tip3p".to_string(),
            number_density: 0.0334,
            probe_radius: 1.4,
            sigma: 3.15061,
            well_depth: 0.1521,
        }
    }

    fn atom_at(position: Point3<f64>, serial: usize, lj: Option<LjParam>) -> Atom {
        let mut atom = Atom::new("C1", "MOL", position);
        atom.serial = serial;
        atom.lj = lj;
        atom
    }

    const CARBON: LjParam = LjParam {
        sigma: 3.4,
        well_depth: 0.1094,
    };

    #[test]
    fn single_atom_in_sphere_matches_closed_form() {
        let centre = Point3::new(1.0, 2.0, -1.0);
        let mut system = MolecularSystem::new();
        system.add_atom(atom_at(centre, 1, Some(CARBON)));

        let radius = 3.2;
        let (v, f) = icosphere(centre, radius, 4);
        let mesh = SurfaceMesh::new(v, f).unwrap();
        let solvent = tip3p();
        let report = run(&system, &mesh, DispersionSurface::Sas, &solvent, &ProgressReporter::new())
            .unwrap();

        let mixed = mix_lorentz_berthelot(
            CARBON,
            LjParam {
                sigma: solvent.sigma,
                well_depth: solvent.well_depth,
            },
        );
        let expected =
            solvent.number_density * lj_exterior_sphere_integral(radius, mixed.sigma, mixed.well_depth);
        assert!(expected < 0.0);
        assert!(
            (report.energy - expected).abs() / expected.abs() < 0.01,
            "{} vs {}",
            report.energy,
            expected
        );
        assert_eq!(report.atoms.len(), 1);
        assert_eq!(report.atoms[0].serial, 1);
    }

    #[test]
    fn total_is_sum_of_atom_contributions() {
        let mut system = MolecularSystem::new();
        system.add_atom(atom_at(Point3::new(-0.7, 0.0, 0.0), 1, Some(CARBON)));
        system.add_atom(atom_at(Point3::new(0.7, 0.0, 0.0), 2, Some(CARBON)));
        let (v, f) = icosphere(Point3::origin(), 4.0, 3);
        let mesh = SurfaceMesh::new(v, f).unwrap();

        let report = run(&system, &mesh, DispersionSurface::Ses, &tip3p(), &ProgressReporter::new())
            .unwrap();
        let sum: f64 = report.atoms.iter().map(|a| a.energy).sum();
        assert!((report.energy - sum).abs() < 1e-12);
        // Symmetric placement gives equal contributions.
        assert!((report.atoms[0].energy - report.atoms[1].energy).abs() < 1e-6);
        assert_eq!(report.surface, DispersionSurface::Ses);
    }

    #[test]
    fn unparameterized_atom_is_an_error() {
        let mut system = MolecularSystem::new();
        system.add_atom(atom_at(Point3::origin(), 7, None));
        let (v, f) = icosphere(Point3::origin(), 3.0, 1);
        let mesh = SurfaceMesh::new(v, f).unwrap();
        let result = run(&system, &mesh, DispersionSurface::Sas, &tip3p(), &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::Unparameterized { serial: 7, .. })));
    }
}
