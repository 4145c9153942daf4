//! The two computational terms of the nonpolar solvation energy.
//!
//! Each task takes prepared surfaces and returns a serializable report; the
//! workflows combine them.

pub mod cavity;
pub mod dispersion;
