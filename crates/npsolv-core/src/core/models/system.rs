use super::atom::Atom;
use super::ids::AtomId;
use nalgebra::Point3;
use slotmap::SlotMap;

/// A sphere used as input to surface generation: centre and radius in Angstroms.
pub type Sphere = (Point3<f64>, f64);

/// Represents the solute as a collection of atoms.
///
/// Atoms are stored in a slot map so that identifiers stay valid while the
/// parameterizer mutates them; iteration follows insertion order, which is the
/// order of the structure file.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Atom identifiers in insertion order.
    order: Vec<AtomId>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an atom and returns its identifier.
    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let id = self.atoms.insert(atom);
        self.order.push(id);
        id
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in insertion order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(AtomId, &Atom)` pairs.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.order.iter().map(|&id| (id, &self.atoms[id]))
    }

    /// Returns the atom identifiers in insertion order.
    pub fn atom_ids(&self) -> &[AtomId] {
        &self.order
    }

    /// Returns the number of atoms in the system.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the system has no atoms.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the cavity spheres of all atoms with a positive radius, in insertion order.
    pub fn spheres(&self) -> Vec<Sphere> {
        self.atoms_iter()
            .filter(|(_, atom)| atom.radius > 0.0)
            .map(|(_, atom)| (atom.position, atom.radius))
            .collect()
    }
}
