//! # Boundary Element Module
//!
//! Collocation boundary element machinery for the Laplace equation on closed
//! triangulated surfaces.
//!
//! ## Key Components
//!
//! - [`quadrature`] - Triangle rules, panel subdivision and the analytic self term
//! - [`operators`] - Dense single- and double-layer blocks assembled in parallel
//! - [`solver`] - Restarted GMRES, preconditioners and the direct fallback

pub mod operators;
pub mod quadrature;
pub mod solver;
