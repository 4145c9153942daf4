use crate::core::forcefield::parameterization::Parameterizer;
use crate::core::forcefield::params::Forcefield;
use crate::core::mesh::error::MeshError;
use crate::core::mesh::mesher::{SurfaceMesher, SurfacePair, build_surfaces};
use crate::core::mesh::surface::SurfaceMesh;
use crate::core::models::system::MolecularSystem;
use crate::engine::config::{DispersionSurface, SolvationConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::tasks::cavity::{self, CavityReport};
use crate::engine::tasks::dispersion::{self, DispersionReport};
use serde::Serialize;
use tracing::{info, instrument};

/// Geometry of the two surfaces a result was computed on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SurfaceSummary {
    pub mesher: String,
    pub probe_radius: f64,
    pub ses_triangles: usize,
    pub ses_area: f64,
    pub ses_volume: f64,
    pub sas_triangles: usize,
    pub sas_area: f64,
    pub sas_volume: f64,
}

impl SurfaceSummary {
    fn new(mesher: &str, probe_radius: f64, surfaces: &SurfacePair) -> Self {
        Self {
            mesher: mesher.to_string(),
            probe_radius,
            ses_triangles: surfaces.ses.len(),
            ses_area: surfaces.ses.area(),
            ses_volume: surfaces.ses.enclosed_volume(),
            sas_triangles: surfaces.sas.len(),
            sas_area: surfaces.sas.area(),
            sas_volume: surfaces.sas.enclosed_volume(),
        }
    }
}

/// Nonpolar solvation free energy of one solute, in kcal/mol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SolvationResult {
    pub total: f64,
    pub cavity: CavityReport,
    pub dispersion: DispersionReport,
    pub surfaces: SurfaceSummary,
}

/// A parameterized solute together with its SES/SAS pair.
#[derive(Debug, Clone)]
pub struct PreparedSystem {
    pub system: MolecularSystem,
    pub surfaces: SurfacePair,
    pub probe_radius: f64,
}

impl PreparedSystem {
    pub fn dispersion_surface(&self, which: DispersionSurface) -> &SurfaceMesh {
        match which {
            DispersionSurface::Sas => &self.surfaces.sas,
            DispersionSurface::Ses => &self.surfaces.ses,
        }
    }
}

/// Assigns radii and Lennard-Jones parameters to a copy of `system` and
/// triangulates its SES and SAS.
pub fn prepare(
    system: &MolecularSystem,
    forcefield: &Forcefield,
    config: &SolvationConfig,
    mesher: &dyn SurfaceMesher,
    reporter: &ProgressReporter,
) -> Result<PreparedSystem, EngineError> {
    let mut working_system = system.clone();
    {
        let _phase = reporter.phase("Parameterization");
        Parameterizer::new(forcefield, config.radius_source, config.radius_scale)
            .parameterize_system(&mut working_system)?;
    }

    let _phase = reporter.phase("Meshing");
    let probe_radius = config
        .surface
        .probe_radius
        .unwrap_or(forcefield.solvent.probe_radius);
    let spheres = working_system.spheres();
    if spheres.is_empty() {
        return Err(MeshError::NoSpheres.into());
    }
    let surfaces = build_surfaces(
        mesher,
        &spheres,
        probe_radius,
        config.surface.density,
        config.surface.sas_probe_radius,
    )?;

    Ok(PreparedSystem {
        system: working_system,
        surfaces,
        probe_radius,
    })
}

/// Loads the force field named by `config` and computes the solvation energy.
#[instrument(skip_all, name = "solvation_workflow")]
pub fn run(
    system: &MolecularSystem,
    config: &SolvationConfig,
    mesher: &dyn SurfaceMesher,
    reporter: &ProgressReporter,
) -> Result<SolvationResult, EngineError> {
    let forcefield = Forcefield::load(&config.forcefield_path)?;
    run_with_forcefield(system, &forcefield, config, mesher, reporter)
}

/// Computes the solvation energy with an already loaded force field.
pub fn run_with_forcefield(
    system: &MolecularSystem,
    forcefield: &Forcefield,
    config: &SolvationConfig,
    mesher: &dyn SurfaceMesher,
    reporter: &ProgressReporter,
) -> Result<SolvationResult, EngineError> {
    info!(atoms = system.len(), mesher = mesher.name(), "Starting solvation workflow.");
    let prepared = prepare(system, forcefield, config, mesher, reporter)?;

    let cavity = cavity::run(&prepared.surfaces, prepared.probe_radius, config, reporter)?;
    let which = config.dispersion.surface;
    let dispersion = dispersion::run(
        &prepared.system,
        prepared.dispersion_surface(which),
        which,
        &forcefield.solvent,
        reporter,
    )?;

    let total = cavity.energy + dispersion.energy;
    info!(
        total,
        cavity = cavity.energy,
        dispersion = dispersion.energy,
        "Solvation workflow complete."
    );
    Ok(SolvationResult {
        total,
        cavity,
        dispersion,
        surfaces: SurfaceSummary::new(mesher.name(), prepared.probe_radius, &prepared.surfaces),
    })
}
