//! # Core Module
//!
//! Fundamental building blocks for the nonpolar solvation calculation.
//!
//! - **Molecular Representation** ([`models`]) - Atoms and the molecular system container
//! - **File I/O** ([`io`]) - Structure readers (BGF, PQR), mesher input, benchmark datasets
//! - **Force Field** ([`forcefield`]) - Solvent and Lennard-Jones parameters, potentials, parameterization
//! - **Surfaces** ([`mesh`]) - Triangulated surfaces, MSMS files, surface meshers
//! - **Boundary Elements** ([`bem`]) - Quadrature, operator assembly, linear solvers

pub mod bem;
pub mod forcefield;
pub mod io;
pub mod mesh;
pub mod models;
