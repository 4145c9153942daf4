//! # Workflows Module
//!
//! Top-level entry points that run a complete calculation.
//!
//! - **Solvation** ([`solvate`]) - Parameterize one solute, build its SES/SAS pair and
//!   evaluate the cavity and dispersion terms.
//! - **Benchmark** ([`benchmark`]) - Run the solvation workflow over a dataset and compare
//!   against reference values.

pub mod benchmark;
pub mod solvate;
