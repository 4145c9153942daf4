use crate::core::bem::quadrature::QuadratureParams;
use crate::core::bem::solver::LinearSolver;
use crate::core::forcefield::parameterization::RadiusSource;
use crate::core::mesh::mesher::{MesherKind, MsmsMesher, SphereUnionMesher, SurfaceMesher};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },
}

/// Which surface carries the dispersion integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispersionSurface {
    #[default]
    Sas,
    Ses,
}

impl std::str::FromStr for DispersionSurface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sas" => Ok(Self::Sas),
            "ses" => Ok(Self::Ses),
            other => Err(format!("unknown dispersion surface '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig {
    pub mesher: MesherKind,
    pub msms_executable: PathBuf,
    pub msms_extra_args: Vec<String>,
    /// Target vertex density in vertices per Å².
    pub density: f64,
    /// Overrides the solvent probe radius of the force field when set.
    pub probe_radius: Option<f64>,
    /// Probe used when triangulating the inflated spheres of the SAS.
    pub sas_probe_radius: f64,
    /// Refinement cap of the built-in sphere-union mesher.
    pub max_subdivisions: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            mesher: MesherKind::Msms,
            msms_executable: PathBuf::from("msms"),
            msms_extra_args: Vec::new(),
            density: 3.0,
            probe_radius: None,
            sas_probe_radius: 0.1,
            max_subdivisions: 5,
        }
    }
}

impl SurfaceConfig {
    /// Instantiates the configured mesher.
    pub fn build_mesher(&self) -> Box<dyn SurfaceMesher> {
        match self.mesher {
            MesherKind::Msms => Box::new(MsmsMesher {
                executable: self.msms_executable.clone(),
                extra_args: self.msms_extra_args.clone(),
            }),
            MesherKind::SphereUnion => Box::new(SphereUnionMesher {
                max_subdivisions: self.max_subdivisions,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CavityConfig {
    /// Macroscopic surface tension in kcal/(mol·Å²).
    pub surface_tension: f64,
}

impl Default for CavityConfig {
    fn default() -> Self {
        Self {
            surface_tension: 0.1036,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispersionConfig {
    pub surface: DispersionSurface,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolvationConfig {
    pub forcefield_path: PathBuf,
    pub radius_source: RadiusSource,
    pub radius_scale: f64,
    pub surface: SurfaceConfig,
    pub cavity: CavityConfig,
    pub dispersion: DispersionConfig,
    pub solver: LinearSolver,
    pub quadrature: QuadratureParams,
}

#[derive(Default)]
pub struct SolvationConfigBuilder {
    forcefield_path: Option<PathBuf>,
    radius_source: Option<RadiusSource>,
    radius_scale: Option<f64>,
    surface: Option<SurfaceConfig>,
    cavity: Option<CavityConfig>,
    dispersion: Option<DispersionConfig>,
    solver: Option<LinearSolver>,
    quadrature: Option<QuadratureParams>,
}

impl SolvationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forcefield_path(mut self, path: PathBuf) -> Self {
        self.forcefield_path = Some(path);
        self
    }
    pub fn radius_source(mut self, source: RadiusSource) -> Self {
        self.radius_source = Some(source);
        self
    }
    pub fn radius_scale(mut self, scale: f64) -> Self {
        self.radius_scale = Some(scale);
        self
    }
    pub fn surface(mut self, surface: SurfaceConfig) -> Self {
        self.surface = Some(surface);
        self
    }
    pub fn cavity(mut self, cavity: CavityConfig) -> Self {
        self.cavity = Some(cavity);
        self
    }
    pub fn dispersion(mut self, dispersion: DispersionConfig) -> Self {
        self.dispersion = Some(dispersion);
        self
    }
    pub fn solver(mut self, solver: LinearSolver) -> Self {
        self.solver = Some(solver);
        self
    }
    pub fn quadrature(mut self, quadrature: QuadratureParams) -> Self {
        self.quadrature = Some(quadrature);
        self
    }

    pub fn build(self) -> Result<SolvationConfig, ConfigError> {
        let config = SolvationConfig {
            forcefield_path: self
                .forcefield_path
                .ok_or(ConfigError::MissingParameter("forcefield_path"))?,
            radius_source: self.radius_source.unwrap_or_default(),
            radius_scale: self.radius_scale.unwrap_or(1.0),
            surface: self.surface.unwrap_or_default(),
            cavity: self.cavity.unwrap_or_default(),
            dispersion: self.dispersion.unwrap_or_default(),
            solver: self.solver.unwrap_or_default(),
            quadrature: self.quadrature.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

fn require(condition: bool, name: &'static str, message: String) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, message })
    }
}

impl SolvationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require(
            self.radius_scale > 0.0,
            "radius_scale",
            format!("must be positive, got {}", self.radius_scale),
        )?;
        let surface = &self.surface;
        require(
            surface.density > 0.0,
            "surface.density",
            format!("must be positive, got {}", surface.density),
        )?;
        if let Some(probe) = surface.probe_radius {
            require(probe > 0.0, "surface.probe_radius", format!("must be positive, got {}", probe))?;
        }
        require(
            surface.sas_probe_radius > 0.0,
            "surface.sas_probe_radius",
            format!("must be positive, got {}", surface.sas_probe_radius),
        )?;
        require(
            self.cavity.surface_tension >= 0.0,
            "cavity.surface_tension",
            format!("must not be negative, got {}", self.cavity.surface_tension),
        )?;
        let q = &self.quadrature;
        require(
            q.near_field_ratio > 0.0 && q.far_field_ratio >= q.near_field_ratio,
            "quadrature",
            format!(
                "expected 0 < near-field-ratio <= far-field-ratio, got {} and {}",
                q.near_field_ratio, q.far_field_ratio
            ),
        )?;
        if let LinearSolver::Gmres(gmres) = &self.solver {
            require(
                gmres.restart > 0 && gmres.tolerance > 0.0 && gmres.max_restarts > 0,
                "solver",
                format!(
                    "GMRES needs a positive restart, tolerance and restart cap, got {}, {} and {}",
                    gmres.restart, gmres.tolerance, gmres.max_restarts
                ),
            )?;
        }
        Ok(())
    }
}
