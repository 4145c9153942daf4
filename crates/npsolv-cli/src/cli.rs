use clap::{Args, Parser, Subcommand};
use npsolv::core::io::format::StructureFormat;
use npsolv::core::mesh::mesher::MesherKind;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "npsolv - nonpolar solvation free energies from boundary integral methods on molecular surfaces.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the cavity and dispersion free energies of one molecule.
    Compute(ComputeArgs),
    /// Run the calculation over a CSV dataset and compare with reference values.
    Batch(BatchArgs),
    /// Build the SES and SAS of a molecule and write them as MSMS files.
    Mesh(MeshArgs),
}

/// Arguments for the `compute` subcommand.
#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// Path to the input structure file (.bgf or .pqr).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Write the full result report to this TOML file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Structure format, when it cannot be inferred from the file extension.
    #[arg(long, value_name = "FORMAT", value_parser = parse_structure_format)]
    pub format: Option<StructureFormat>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// CSV file with `name,structure,experimental` columns.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub dataset: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the per-molecule CSV results.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Arguments for the `mesh` subcommand.
#[derive(Args, Debug)]
pub struct MeshArgs {
    /// Path to the input structure file (.bgf or .pqr).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Output prefix; writes `<prefix>-ses.{vert,face}` and `<prefix>-sas.{vert,face}`.
    #[arg(short, long, required = true, value_name = "PREFIX")]
    pub output: PathBuf,

    /// Structure format, when it cannot be inferred from the file extension.
    #[arg(long, value_name = "FORMAT", value_parser = parse_structure_format)]
    pub format: Option<StructureFormat>,

    /// Also write the parameterized atomic spheres as `<prefix>.xyzr`.
    #[arg(long)]
    pub xyzr: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Command-line overrides shared by all subcommands, applied on top of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override the force field parameter file.
    #[arg(long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    /// Override the surface vertex density (vertices per square Angstrom).
    #[arg(long, value_name = "FLOAT")]
    pub density: Option<f64>,

    /// Override the solvent probe radius in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub probe_radius: Option<f64>,

    /// Surface mesher to use ('msms' or 'sphere-union').
    #[arg(long, value_name = "NAME")]
    pub mesher: Option<MesherKind>,

    /// Path to the MSMS executable.
    #[arg(long, value_name = "PATH")]
    pub msms: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S cavity.surface-tension=0.08
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

fn parse_structure_format(s: &str) -> Result<StructureFormat, String> {
    s.parse()
        .map_err(|_| format!("unknown structure format '{}', expected 'bgf' or 'pqr'", s))
}
