use crate::cli::ComputeArgs;
use crate::config::PartialSolvationConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use npsolv::core::io::format::read_structure;
use npsolv::engine::error::EngineError;
use npsolv::engine::progress::ProgressReporter;
use npsolv::workflows::solvate::{self, SolvationResult};
use tracing::info;

pub fn run(args: ComputeArgs, show_progress: bool) -> Result<()> {
    let partial_config = PartialSolvationConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args.overrides)?;

    info!("Loading input structure from {:?}", &args.input);
    let system = read_structure(&args.input, args.format).map_err(EngineError::from)?;

    let mesher = config.surface.build_mesher();
    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = solvate::run(&system, &config, mesher.as_ref(), &reporter)?;
    print_summary(&args.input.display().to_string(), &result);

    if let Some(output) = &args.output {
        let report = toml::to_string_pretty(&result).map_err(|e| CliError::Output {
            path: output.clone(),
            source: e.into(),
        })?;
        std::fs::write(output, report)?;
        println!("Report written to: {}", output.display());
    }
    Ok(())
}

fn print_summary(name: &str, result: &SolvationResult) {
    println!("Nonpolar solvation free energy of {}", name);
    println!("  Cavity      {:>12.4} kcal/mol", result.cavity.energy);
    println!("  Dispersion  {:>12.4} kcal/mol", result.dispersion.energy);
    println!("  Total       {:>12.4} kcal/mol", result.total);
    println!(
        "  Capacitance {:>12.4} Å   (SES {} / SAS {} triangles)",
        result.cavity.capacitance, result.surfaces.ses_triangles, result.surfaces.sas_triangles
    );
    if !result.cavity.solver.converged {
        println!("  Warning: the linear solver did not converge.");
    }
}
