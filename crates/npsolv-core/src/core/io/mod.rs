//! Provides input/output functionality for the solvation pipeline.
//!
//! Structure readers share the [`traits::MolecularFile`] interface. The
//! remaining modules cover the mesher's sphere input ([`xyzr`]) and the
//! benchmark dataset description ([`dataset`]).

pub mod bgf;
pub mod dataset;
pub mod format;
pub mod pqr;
pub mod traits;
pub mod xyzr;
