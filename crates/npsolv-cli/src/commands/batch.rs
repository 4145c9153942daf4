use crate::cli::BatchArgs;
use crate::config::PartialSolvationConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use npsolv::core::io::dataset::load_dataset;
use npsolv::engine::progress::ProgressReporter;
use npsolv::workflows::benchmark::{self, BenchmarkRecord};
use std::path::Path;
use tracing::info;

pub fn run(args: BatchArgs, show_progress: bool) -> Result<()> {
    let config = PartialSolvationConfig::from_file(&args.config)?.merge_with_cli(&args.overrides)?;

    let entries = load_dataset(&args.dataset).map_err(|e| CliError::FileParsing {
        path: args.dataset.clone(),
        source: e.into(),
    })?;
    info!("Loaded {} dataset entries from {:?}", entries.len(), &args.dataset);

    let mesher = config.surface.build_mesher();
    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let report = benchmark::run(&entries, &config, mesher.as_ref(), &reporter)?;
    write_records(&args.output, &report.records)?;

    let summary = &report.summary;
    println!(
        "Evaluated {} molecule(s), {} failed. Results written to: {}",
        summary.evaluated,
        summary.failed,
        args.output.display()
    );
    if let (Some(mae), Some(rmse), Some(mse)) = (summary.mae, summary.rmse, summary.mean_signed_error) {
        println!(
            "Against {} reference value(s): MAE {:.3}, RMSE {:.3}, mean signed error {:.3} kcal/mol",
            summary.compared, mae, rmse, mse
        );
    }
    Ok(())
}

fn write_records(path: &Path, records: &[BenchmarkRecord]) -> Result<()> {
    let to_output_error = |e: csv::Error| CliError::Output {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_output_error)?;
    for record in records {
        writer.serialize(record).map_err(to_output_error)?;
    }
    writer.flush()?;
    Ok(())
}
