use super::solvate::{self, SolvationResult};
use crate::core::forcefield::params::Forcefield;
use crate::core::io::dataset::DatasetEntry;
use crate::core::io::format::read_structure;
use crate::core::mesh::mesher::SurfaceMesher;
use crate::engine::config::SolvationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// One row of a benchmark run, flat so that it can be written as CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRecord {
    pub name: String,
    pub structure: String,
    pub experimental: Option<f64>,
    pub total: Option<f64>,
    pub cavity: Option<f64>,
    pub dispersion: Option<f64>,
    pub capacitance: Option<f64>,
    pub converged: Option<bool>,
    pub error: Option<String>,
}

impl BenchmarkRecord {
    fn new(entry: &DatasetEntry, outcome: Result<SolvationResult, EngineError>) -> Self {
        let mut record = Self {
            name: entry.name.clone(),
            structure: entry.structure.display().to_string(),
            experimental: entry.experimental,
            total: None,
            cavity: None,
            dispersion: None,
            capacitance: None,
            converged: None,
            error: None,
        };
        match outcome {
            Ok(result) => {
                record.total = Some(result.total);
                record.cavity = Some(result.cavity.energy);
                record.dispersion = Some(result.dispersion.energy);
                record.capacitance = Some(result.cavity.capacitance);
                record.converged = Some(result.cavity.solver.converged);
            }
            Err(e) => record.error = Some(e.to_string()),
        }
        record
    }

    /// `computed - experimental`, when both are known.
    pub fn signed_error(&self) -> Option<f64> {
        Some(self.total? - self.experimental?)
    }
}

/// Error statistics against the experimental reference values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BenchmarkSummary {
    pub evaluated: usize,
    pub failed: usize,
    /// Entries with both a computed and an experimental value.
    pub compared: usize,
    pub mae: Option<f64>,
    pub rmse: Option<f64>,
    pub mean_signed_error: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub records: Vec<BenchmarkRecord>,
    pub summary: BenchmarkSummary,
}

pub fn summarize(records: &[BenchmarkRecord]) -> BenchmarkSummary {
    let failed = records.iter().filter(|r| r.error.is_some()).count();
    let errors: Vec<f64> = records.iter().filter_map(BenchmarkRecord::signed_error).collect();
    let mut summary = BenchmarkSummary {
        evaluated: records.len() - failed,
        failed,
        compared: errors.len(),
        ..BenchmarkSummary::default()
    };
    if !errors.is_empty() {
        let n = errors.len() as f64;
        summary.mae = Some(errors.iter().map(|e| e.abs()).sum::<f64>() / n);
        summary.rmse = Some((errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt());
        summary.mean_signed_error = Some(errors.iter().sum::<f64>() / n);
    }
    summary
}

/// Runs the solvation workflow over a dataset.
///
/// The force field is loaded once. A failing entry is recorded with its error
/// message and the run continues with the next one.
#[instrument(skip_all, name = "benchmark_workflow")]
pub fn run(
    entries: &[DatasetEntry],
    config: &SolvationConfig,
    mesher: &dyn SurfaceMesher,
    reporter: &ProgressReporter,
) -> Result<BenchmarkReport, EngineError> {
    let forcefield = Forcefield::load(&config.forcefield_path)?;
    info!(entries = entries.len(), "Starting benchmark.");

    let _phase = reporter.phase("Benchmark");
    reporter.report(Progress::TaskStart {
        total_steps: entries.len() as u64,
    });
    let silent = ProgressReporter::new();
    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let outcome = read_structure(&entry.structure, None)
            .map_err(EngineError::from)
            .and_then(|system| {
                solvate::run_with_forcefield(&system, &forcefield, config, mesher, &silent)
            });
        if let Err(e) = &outcome {
            warn!(entry = %entry.name, error = %e, "Benchmark entry failed.");
            reporter.report(Progress::Message(format!("{}: {}", entry.name, e)));
        }
        records.push(BenchmarkRecord::new(entry, outcome));
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let summary = summarize(&records);
    info!(
        evaluated = summary.evaluated,
        failed = summary.failed,
        mae = ?summary.mae,
        rmse = ?summary.rmse,
        "Benchmark complete."
    );
    Ok(BenchmarkReport { records, summary })
}
