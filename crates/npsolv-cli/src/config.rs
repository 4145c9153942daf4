use crate::cli::ConfigOverrides;
use crate::error::{CliError, Result};
use npsolv::core::bem::quadrature::QuadratureParams;
use npsolv::core::bem::solver::{GmresConfig, LinearSolver};
use npsolv::core::forcefield::parameterization::RadiusSource;
use npsolv::core::mesh::mesher::MesherKind;
use npsolv::engine::config::{self as core_config, DispersionSurface};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSurfaceConfig {
    mesher: Option<MesherKind>,
    msms_executable: Option<PathBuf>,
    msms_extra_args: Option<Vec<String>>,
    density: Option<f64>,
    probe_radius: Option<f64>,
    sas_probe_radius: Option<f64>,
    max_subdivisions: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialCavityConfig {
    surface_tension: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialDispersionConfig {
    surface: Option<DispersionSurface>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum SolverMethod {
    Gmres,
    Direct,
}

impl FromStr for SolverMethod {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gmres" => Ok(Self::Gmres),
            "direct" => Ok(Self::Direct),
            _ => Err(()),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSolverConfig {
    method: Option<SolverMethod>,
    restart: Option<usize>,
    tolerance: Option<f64>,
    max_restarts: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialQuadratureConfig {
    near_field_ratio: Option<f64>,
    near_subdivisions: Option<u32>,
    far_field_ratio: Option<f64>,
}

/// The TOML configuration file, every key optional.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialSolvationConfig {
    forcefield_path: Option<PathBuf>,
    radius_source: Option<RadiusSource>,
    radius_scale: Option<f64>,
    surface: Option<PartialSurfaceConfig>,
    cavity: Option<PartialCavityConfig>,
    dispersion: Option<PartialDispersionConfig>,
    solver: Option<PartialSolverConfig>,
    quadrature: Option<PartialQuadratureConfig>,
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

impl PartialSolvationConfig {
    /// Reads a config file. A relative `forcefield-path` is resolved against
    /// the directory containing the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        if let (Some(ff_path), Some(base)) = (config.forcefield_path.as_mut(), path.parent()) {
            if ff_path.is_relative() {
                *ff_path = base.join(&*ff_path);
            }
        }
        Ok(config)
    }

    /// Applies `-S` values, then the dedicated flags, and builds the core config.
    pub fn merge_with_cli(
        mut self,
        overrides: &ConfigOverrides,
    ) -> Result<core_config::SolvationConfig> {
        self.apply_set_values(&overrides.set_values)?;

        let forcefield_path = overrides
            .forcefield
            .clone()
            .or(self.forcefield_path.take())
            .ok_or_else(|| {
                CliError::Config(
                    "A value for 'forcefield-path' is required either in the config file or via --forcefield."
                        .to_string(),
                )
            })?;

        let mut builder = core_config::SolvationConfigBuilder::new()
            .forcefield_path(forcefield_path)
            .surface(Self::merge_surface(
                self.surface.take().unwrap_or_default(),
                overrides,
            ))
            .solver(Self::merge_solver(self.solver.take().unwrap_or_default())?)
            .quadrature(Self::merge_quadrature(
                self.quadrature.take().unwrap_or_default(),
            ));
        if let Some(source) = self.radius_source {
            builder = builder.radius_source(source);
        }
        if let Some(scale) = self.radius_scale {
            builder = builder.radius_scale(scale);
        }
        if let Some(surface_tension) = self.cavity.and_then(|c| c.surface_tension) {
            builder = builder.cavity(core_config::CavityConfig { surface_tension });
        }
        if let Some(surface) = self.dispersion.and_then(|d| d.surface) {
            builder = builder.dispersion(core_config::DispersionConfig { surface });
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_surface(
        partial: PartialSurfaceConfig,
        overrides: &ConfigOverrides,
    ) -> core_config::SurfaceConfig {
        let defaults = core_config::SurfaceConfig::default();
        core_config::SurfaceConfig {
            mesher: overrides
                .mesher
                .or(partial.mesher)
                .unwrap_or(defaults.mesher),
            msms_executable: overrides
                .msms
                .clone()
                .or(partial.msms_executable)
                .unwrap_or(defaults.msms_executable),
            msms_extra_args: partial.msms_extra_args.unwrap_or(defaults.msms_extra_args),
            density: overrides
                .density
                .or(partial.density)
                .unwrap_or(defaults.density),
            probe_radius: overrides.probe_radius.or(partial.probe_radius),
            sas_probe_radius: partial
                .sas_probe_radius
                .unwrap_or(defaults.sas_probe_radius),
            max_subdivisions: partial
                .max_subdivisions
                .unwrap_or(defaults.max_subdivisions),
        }
    }

    fn merge_solver(partial: PartialSolverConfig) -> Result<LinearSolver> {
        match partial.method.unwrap_or(SolverMethod::Gmres) {
            SolverMethod::Gmres => {
                let defaults = GmresConfig::default();
                Ok(LinearSolver::Gmres(GmresConfig {
                    restart: partial.restart.unwrap_or(defaults.restart),
                    tolerance: partial.tolerance.unwrap_or(defaults.tolerance),
                    max_restarts: partial.max_restarts.unwrap_or(defaults.max_restarts),
                }))
            }
            SolverMethod::Direct => {
                if partial.restart.is_some()
                    || partial.tolerance.is_some()
                    || partial.max_restarts.is_some()
                {
                    return Err(CliError::Config(
                        "`solver.restart`, `solver.tolerance` and `solver.max-restarts` only apply to method = \"gmres\""
                            .to_string(),
                    ));
                }
                Ok(LinearSolver::Direct)
            }
        }
    }

    fn merge_quadrature(partial: PartialQuadratureConfig) -> QuadratureParams {
        let defaults = QuadratureParams::default();
        QuadratureParams {
            near_field_ratio: partial
                .near_field_ratio
                .unwrap_or(defaults.near_field_ratio),
            near_subdivisions: partial
                .near_subdivisions
                .unwrap_or(defaults.near_subdivisions),
            far_field_ratio: partial.far_field_ratio.unwrap_or(defaults.far_field_ratio),
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "forcefield-path" => self.forcefield_path = Some(PathBuf::from(value)),
                "radius-source" => self.radius_source = Some(parse_value(key, value)?),
                "radius-scale" => self.radius_scale = Some(parse_value(key, value)?),
                "surface.mesher" => {
                    self.surface.get_or_insert_with(Default::default).mesher =
                        Some(parse_value(key, value)?);
                }
                "surface.msms-executable" => {
                    self.surface.get_or_insert_with(Default::default).msms_executable =
                        Some(PathBuf::from(value));
                }
                "surface.density" => {
                    self.surface.get_or_insert_with(Default::default).density =
                        Some(parse_value(key, value)?);
                }
                "surface.probe-radius" => {
                    self.surface.get_or_insert_with(Default::default).probe_radius =
                        Some(parse_value(key, value)?);
                }
                "surface.sas-probe-radius" => {
                    self.surface.get_or_insert_with(Default::default).sas_probe_radius =
                        Some(parse_value(key, value)?);
                }
                "surface.max-subdivisions" => {
                    self.surface.get_or_insert_with(Default::default).max_subdivisions =
                        Some(parse_value(key, value)?);
                }
                "cavity.surface-tension" => {
                    self.cavity.get_or_insert_with(Default::default).surface_tension =
                        Some(parse_value(key, value)?);
                }
                "dispersion.surface" => {
                    self.dispersion.get_or_insert_with(Default::default).surface =
                        Some(parse_value(key, value)?);
                }
                "solver.method" => {
                    self.solver.get_or_insert_with(Default::default).method =
                        Some(parse_value(key, value)?);
                }
                "solver.restart" => {
                    self.solver.get_or_insert_with(Default::default).restart =
                        Some(parse_value(key, value)?);
                }
                "solver.tolerance" => {
                    self.solver.get_or_insert_with(Default::default).tolerance =
                        Some(parse_value(key, value)?);
                }
                "solver.max-restarts" => {
                    self.solver.get_or_insert_with(Default::default).max_restarts =
                        Some(parse_value(key, value)?);
                }
                "quadrature.near-field-ratio" => {
                    self.quadrature
                        .get_or_insert_with(Default::default)
                        .near_field_ratio = Some(parse_value(key, value)?);
                }
                "quadrature.near-subdivisions" => {
                    self.quadrature
                        .get_or_insert_with(Default::default)
                        .near_subdivisions = Some(parse_value(key, value)?);
                }
                "quadrature.far-field-ratio" => {
                    self.quadrature
                        .get_or_insert_with(Default::default)
                        .far_field_ratio = Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn write_config_file(dir: &Path, content: &str) -> PathBuf {
        let file_path = dir.join("config.toml");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn overrides_from(config_path: &Path, extra: &[&str]) -> ConfigOverrides {
        let mut args = vec![
            "npsolv".to_string(),
            "compute".to_string(),
            "-i".to_string(),
            "mol.pqr".to_string(),
            "-c".to_string(),
            config_path.to_str().unwrap().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        match Cli::parse_from(args).command {
            Commands::Compute(compute) => compute.overrides,
            other => panic!("Expected 'compute' subcommand, got {:?}", other),
        }
    }

    #[test]
    fn load_from_file_and_merge_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            r#"
            forcefield-path = "params/tip3p.toml"
            radius-source = "bondi"

            [surface]
            mesher = "sphere-union"
            density = 2.0

            [cavity]
            surface-tension = 0.08
            "#,
        );

        let config = PartialSolvationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&overrides_from(&config_path, &[]))
            .unwrap();

        assert_eq!(config.forcefield_path, dir.path().join("params/tip3p.toml"));
        assert_eq!(config.radius_source, RadiusSource::Bondi);
        assert_eq!(config.radius_scale, 1.0);
        assert_eq!(config.surface.mesher, MesherKind::SphereUnion);
        assert_eq!(config.surface.density, 2.0);
        assert_eq!(config.surface.sas_probe_radius, 0.1);
        assert_eq!(config.cavity.surface_tension, 0.08);
        assert_eq!(config.dispersion.surface, DispersionSurface::Sas);
        assert_eq!(config.solver, LinearSolver::Gmres(GmresConfig::default()));
        assert_eq!(config.quadrature, QuadratureParams::default());
    }

    #[test]
    fn cli_args_override_file_values() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            r#"
            forcefield-path = "/data/ff.toml"

            [surface]
            density = 2.0
            probe-radius = 1.4
            "#,
        );
        let overrides = overrides_from(
            &config_path,
            &[
                "--forcefield",
                "/other/ff.toml",
                "--density",
                "5.0",
                "--probe-radius",
                "1.6",
                "--msms",
                "/opt/msms/msms.x86_64",
            ],
        );

        let config = PartialSolvationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&overrides)
            .unwrap();
        assert_eq!(config.forcefield_path, PathBuf::from("/other/ff.toml"));
        assert_eq!(config.surface.density, 5.0);
        assert_eq!(config.surface.probe_radius, Some(1.6));
        assert_eq!(
            config.surface.msms_executable,
            PathBuf::from("/opt/msms/msms.x86_64")
        );
    }

    #[test]
    fn set_values_override_file_but_not_flags() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            r#"
            forcefield-path = "/data/ff.toml"

            [solver]
            restart = 30
            "#,
        );
        let overrides = overrides_from(
            &config_path,
            &[
                "-S",
                "solver.tolerance=1e-8",
                "-S",
                "dispersion.surface=ses",
                "-S",
                "surface.density=4.0",
                "--density",
                "6.0",
            ],
        );

        let config = PartialSolvationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&overrides)
            .unwrap();
        assert_eq!(
            config.solver,
            LinearSolver::Gmres(GmresConfig {
                restart: 30,
                tolerance: 1e-8,
                max_restarts: 20,
            })
        );
        assert_eq!(config.dispersion.surface, DispersionSurface::Ses);
        assert_eq!(config.surface.density, 6.0);
    }

    #[test]
    fn missing_forcefield_returns_error() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(dir.path(), "[cavity]\nsurface-tension = 0.1\n");
        let result = PartialSolvationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&overrides_from(&config_path, &[]));
        match result {
            Err(CliError::Config(msg)) => assert!(msg.contains("forcefield-path")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            "forcefield-path = \"/ff.toml\"\n[surface]\nresolution = 2\n",
        );
        let result = PartialSolvationConfig::from_file(&config_path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn unsupported_or_malformed_set_values_are_rejected() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(dir.path(), "forcefield-path = \"/ff.toml\"\n");

        for bad in ["surface.resolution=2", "cavity.surface-tension", "radius-scale=big"] {
            let result = PartialSolvationConfig::from_file(&config_path)
                .unwrap()
                .merge_with_cli(&overrides_from(&config_path, &["-S", bad]));
            assert!(
                matches!(result, Err(CliError::Config(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn direct_solver_rejects_gmres_settings() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            "forcefield-path = \"/ff.toml\"\n[solver]\nmethod = \"direct\"\nrestart = 10\n",
        );
        let result = PartialSolvationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&overrides_from(&config_path, &[]));
        assert!(matches!(result, Err(CliError::Config(_))));

        let config_path =
            write_config_file(dir.path(), "forcefield-path = \"/ff.toml\"\n[solver]\nmethod = \"direct\"\n");
        let config = PartialSolvationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&overrides_from(&config_path, &[]))
            .unwrap();
        assert_eq!(config.solver, LinearSolver::Direct);
    }

    #[test]
    fn invalid_values_are_reported_by_core_validation() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            dir.path(),
            "forcefield-path = \"/ff.toml\"\n[surface]\ndensity = -1.0\n",
        );
        let result = PartialSolvationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&overrides_from(&config_path, &[]));
        match result {
            Err(CliError::Config(msg)) => assert!(msg.contains("surface.density")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
