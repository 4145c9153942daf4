//! # Core Models Module
//!
//! Data structures describing the solute.
//!
//! - [`atom`] - Atom with coordinates, force field type, cavity radius and Lennard-Jones parameters
//! - [`element`] - Element symbols and Bondi van der Waals radii
//! - [`system`] - The molecular system container
//! - [`ids`] - Slot map keys
//!
//! ```ignore
//! use npsolv::core::models::{atom::Atom, system::MolecularSystem};
//! use nalgebra::Point3;
//!
//! let mut system = MolecularSystem::new();
//! let id = system.add_atom(Atom::new("C1", "MOL", Point3::new(0.0, 0.0, 0.0)));
//! ```

pub mod atom;
pub mod element;
pub mod ids;
pub mod system;
