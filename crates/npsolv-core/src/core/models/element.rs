use phf::phf_map;

/// Bondi (1964) van der Waals radii in Angstroms, keyed by element symbol.
static BONDI_RADII: phf::Map<&'static str, f64> = phf_map! {
    "H" => 1.20,
    "He" => 1.40,
    "Li" => 1.82,
    "C" => 1.70,
    "N" => 1.55,
    "O" => 1.52,
    "F" => 1.47,
    "Ne" => 1.54,
    "Na" => 2.27,
    "Mg" => 1.73,
    "Si" => 2.10,
    "P" => 1.80,
    "S" => 1.80,
    "Cl" => 1.75,
    "Ar" => 1.88,
    "K" => 2.75,
    "As" => 1.85,
    "Se" => 1.90,
    "Br" => 1.85,
    "Kr" => 2.02,
    "I" => 1.98,
    "Xe" => 2.16,
};

/// Returns the Bondi radius of an element, if tabulated.
pub fn bondi_radius(symbol: &str) -> Option<f64> {
    BONDI_RADII.get(symbol).copied()
}

/// PDB remoteness letters that follow the element in biomolecular atom names.
const REMOTENESS_LETTERS: &[char] = &['A', 'B', 'G', 'D', 'E', 'Z', 'H'];

/// Derives an element symbol from an atom name.
///
/// Leading digits are skipped and the leading alphabetic run is used. A
/// two-letter symbol is chosen only when it is present in the radius table
/// (so "CL1" is chlorine while "CA" stays carbon). An upper-case C, N, O or H
/// followed by a remoteness letter is always the one-letter element, so "NE"
/// and "NA" are nitrogen rather than neon and sodium.
pub fn element_symbol_from_name(name: &str) -> Option<String> {
    let letters: Vec<char> = name
        .trim()
        .chars()
        .skip_while(|c| c.is_ascii_digit())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    let first = letters.first()?.to_ascii_uppercase();
    if let Some(&second) = letters.get(1) {
        let remoteness = second.is_ascii_uppercase()
            && matches!(first, 'C' | 'N' | 'O' | 'H')
            && REMOTENESS_LETTERS.contains(&second);
        let candidate = format!("{}{}", first, second.to_ascii_lowercase());
        if !remoteness && BONDI_RADII.contains_key(candidate.as_str()) {
            return Some(candidate);
        }
    }
    Some(first.to_string())
}

/// Like [`element_symbol_from_name`], except that a single-atom residue named
/// after its atom ("NA" in residue "NA") is read as the two-letter element.
pub fn element_symbol_for_atom(name: &str, residue_name: &str) -> Option<String> {
    let name = name.trim();
    let mut chars = name.chars();
    if let (Some(first), Some(second), None) = (chars.next(), chars.next(), chars.next()) {
        if name.eq_ignore_ascii_case(residue_name.trim()) {
            let candidate = format!(
                "{}{}",
                first.to_ascii_uppercase(),
                second.to_ascii_lowercase()
            );
            if BONDI_RADII.contains_key(candidate.as_str()) {
                return Some(candidate);
            }
        }
    }
    element_symbol_from_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bondi_radius_returns_tabulated_values() {
        assert_eq!(bondi_radius("C"), Some(1.70));
        assert_eq!(bondi_radius("Cl"), Some(1.75));
        assert_eq!(bondi_radius("Zz"), None);
    }

    #[test]
    fn element_symbol_handles_common_atom_names() {
        assert_eq!(element_symbol_from_name("C1").as_deref(), Some("C"));
        assert_eq!(element_symbol_from_name("CA").as_deref(), Some("C"));
        assert_eq!(element_symbol_from_name("CL1").as_deref(), Some("Cl"));
        assert_eq!(element_symbol_from_name("Br").as_deref(), Some("Br"));
        assert_eq!(element_symbol_from_name("1HB").as_deref(), Some("H"));
        assert_eq!(element_symbol_from_name(" o2 ").as_deref(), Some("O"));
    }

    #[test]
    fn upper_case_remoteness_names_stay_one_letter_elements() {
        assert_eq!(element_symbol_from_name("NE").as_deref(), Some("N"));
        assert_eq!(element_symbol_from_name("NA").as_deref(), Some("N"));
        assert_eq!(element_symbol_from_name("HE2").as_deref(), Some("H"));
        assert_eq!(element_symbol_from_name("Na").as_deref(), Some("Na"));
        assert_eq!(element_symbol_from_name("BR").as_deref(), Some("Br"));
    }

    #[test]
    fn single_atom_residues_are_read_as_ions() {
        assert_eq!(element_symbol_for_atom("NA", "NA").as_deref(), Some("Na"));
        assert_eq!(element_symbol_for_atom(" CL ", "CL").as_deref(), Some("Cl"));
        assert_eq!(element_symbol_for_atom("NA", "ADE").as_deref(), Some("N"));
        assert_eq!(element_symbol_for_atom("NE", "ARG").as_deref(), Some("N"));
        assert_eq!(element_symbol_for_atom("CA", "CA").as_deref(), Some("C"));
    }

    #[test]
    fn element_symbol_is_none_without_letters() {
        assert_eq!(element_symbol_from_name(""), None);
        assert_eq!(element_symbol_from_name("123"), None);
    }
}
