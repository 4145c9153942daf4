//! # Engine Module
//!
//! Computation of the two nonpolar free energy terms on prepared surfaces.
//!
//! - **Configuration** ([`config`]) - Surface, cavity, dispersion and solver settings
//! - **Tasks** ([`tasks`]) - The capacitor-based cavity term and the surface-integral dispersion term
//! - **Progress Monitoring** ([`progress`]) - Phase and task events for front ends
//! - **Error Handling** ([`error`]) - Errors raised while running a calculation

pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
