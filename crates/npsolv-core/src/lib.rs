//! # npsolv Core Library
//!
//! Nonpolar solvation free energies of small molecules from boundary integral
//! formulations on triangulated molecular surfaces.
//!
//! The nonpolar free energy is split into two contributions:
//!
//! - **Cavity formation** (`ΔG_cav`), from a capacitor model in which the
//!   solvent-excluded surface (SES) and the solvent-accessible surface (SAS)
//!   form the two plates of a capacitor. The Laplace problem in the shell
//!   between them is solved with a collocation boundary element method.
//! - **Dispersion** (`ΔG_disp`), the solute-solvent Lennard-Jones energy of a
//!   uniform continuum solvent, rewritten as a surface integral by the
//!   divergence theorem.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the three-layer layout used throughout the project:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`),
//!   structure and mesh I/O, force field parameters, and the boundary element
//!   kernels, operators and linear solvers.
//!
//! - **[`engine`]: The Logic Core.** Configuration, error types, progress
//!   reporting and the two energy tasks (`cavity`, `dispersion`).
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures: a single
//!   solvation calculation and a benchmark over a dataset of molecules.

pub mod core;
pub mod engine;
pub mod workflows;
