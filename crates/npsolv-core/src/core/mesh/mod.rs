//! # Mesh Module
//!
//! Triangulated molecular surfaces and the programs that produce them.
//!
//! ## Key Components
//!
//! - [`surface`] - The [`SurfaceMesh`](surface::SurfaceMesh) type with per-triangle geometry
//! - [`msms`] - Reader and writer for the MSMS `.vert`/`.face` file pair
//! - [`generators`] - Icosphere construction used by the built-in mesher and by tests
//! - [`mesher`] - The [`SurfaceMesher`](mesher::SurfaceMesher) trait, the external MSMS
//!   mesher, the built-in sphere-union mesher, and construction of the SES/SAS pair

pub mod error;
pub mod generators;
pub mod mesher;
pub mod msms;
pub mod surface;
