//! # Force Field Module
//!
//! Parameters and pair potentials for the solute-solvent interaction.
//!
//! ## Key Components
//!
//! - [`params`] - Solvent description and per-type Lennard-Jones parameters loaded from TOML
//! - [`potentials`] - The 12-6 potential, mixing rules, and the radial flux used by the
//!   surface reformulation of the dispersion integral
//! - [`parameterization`] - Assignment of cavity radii and Lennard-Jones parameters to atoms
//!
//! ```ignore
//! use npsolv::core::forcefield::{params::Forcefield, parameterization::Parameterizer};
//!
//! let forcefield = Forcefield::load(&path)?;
//! Parameterizer::new(&forcefield, RadiusSource::Forcefield, 1.0).parameterize_system(&mut system)?;
//! ```

pub mod parameterization;
pub mod params;
pub mod potentials;
