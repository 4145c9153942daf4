use crate::cli::MeshArgs;
use crate::config::PartialSolvationConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use npsolv::core::forcefield::params::Forcefield;
use npsolv::core::io::format::read_structure;
use npsolv::core::io::xyzr::write_xyzr;
use npsolv::core::mesh::msms::write_msms;
use npsolv::engine::error::EngineError;
use npsolv::engine::progress::ProgressReporter;
use npsolv::workflows::solvate;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// `<prefix><suffix>`, keeping the directory of `prefix`.
fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub fn run(args: MeshArgs, show_progress: bool) -> Result<()> {
    let config = PartialSolvationConfig::from_file(&args.config)?.merge_with_cli(&args.overrides)?;
    let forcefield = Forcefield::load(&config.forcefield_path).map_err(EngineError::from)?;
    let system = read_structure(&args.input, args.format).map_err(EngineError::from)?;

    let mesher = config.surface.build_mesher();
    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let prepared = solvate::prepare(&system, &forcefield, &config, mesher.as_ref(), &reporter)?;

    for (label, mesh) in [("ses", &prepared.surfaces.ses), ("sas", &prepared.surfaces.sas)] {
        let prefix = with_suffix(&args.output, &format!("-{}", label));
        write_msms(mesh, &prefix).map_err(EngineError::from)?;
        info!(surface = label, triangles = mesh.len(), area = mesh.area(), "Wrote {:?}", &prefix);
        println!(
            "{}: {} triangles, area {:.3} Å², volume {:.3} Å³ -> {}.{{vert,face}}",
            label.to_uppercase(),
            mesh.len(),
            mesh.area(),
            mesh.enclosed_volume(),
            prefix.display()
        );
    }

    if args.xyzr {
        let path = with_suffix(&args.output, ".xyzr");
        let mut writer = BufWriter::new(File::create(&path)?);
        write_xyzr(&prepared.system.spheres(), &mut writer).map_err(|e| CliError::Output {
            path: path.clone(),
            source: e.into(),
        })?;
        println!("Atomic spheres written to: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_suffix_appends_to_file_name() {
        assert_eq!(
            with_suffix(Path::new("out/benzene"), "-ses"),
            PathBuf::from("out/benzene-ses")
        );
        assert_eq!(with_suffix(Path::new("mol"), ".xyzr"), PathBuf::from("mol.xyzr"));
    }
}
