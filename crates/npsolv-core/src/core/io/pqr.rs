use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::element_symbol_for_atom;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PqrError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

/// Reader for whitespace-delimited PQR files.
///
/// Records look like `ATOM serial name resName [chain] resSeq x y z charge radius`.
/// Fields are taken from the end of the line so the optional chain identifier
/// does not shift the numeric columns. The force field type of each atom is
/// its element symbol.
pub struct PqrFile;

impl MolecularFile for PqrFile {
    type Error = PqrError;

    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, Self::Error> {
        let mut system = MolecularSystem::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts.first().copied() {
                Some("ATOM") | Some("HETATM") => {}
                Some("END") => break,
                _ => continue,
            }

            if parts.len() < 10 || parts.len() > 11 {
                return Err(PqrError::Parse {
                    line: line_num,
                    message: format!("expected 10 or 11 fields, found {}", parts.len()),
                });
            }

            let parse_f64 = |idx: usize, what: &str| -> Result<f64, PqrError> {
                parts[idx].parse().map_err(|_| PqrError::Parse {
                    line: line_num,
                    message: format!("invalid {} '{}'", what, parts[idx]),
                })
            };

            let n = parts.len();
            let serial: usize = parts[1].parse().map_err(|_| PqrError::Parse {
                line: line_num,
                message: format!("invalid serial '{}'", parts[1]),
            })?;
            let residue_number: isize = parts[n - 6].parse().map_err(|_| PqrError::Parse {
                line: line_num,
                message: format!("invalid residue number '{}'", parts[n - 6]),
            })?;
            let x = parse_f64(n - 5, "x coordinate")?;
            let y = parse_f64(n - 4, "y coordinate")?;
            let z = parse_f64(n - 3, "z coordinate")?;
            let charge = parse_f64(n - 2, "charge")?;
            let radius = parse_f64(n - 1, "radius")?;
            if radius < 0.0 {
                return Err(PqrError::Parse {
                    line: line_num,
                    message: format!("negative radius {}", radius),
                });
            }

            let name = parts[2];
            let element = element_symbol_for_atom(name, parts[3]).ok_or_else(|| PqrError::Parse {
                line: line_num,
                message: format!("cannot derive an element from atom name '{}'", name),
            })?;

            let mut atom = Atom::new(name, parts[3], Point3::new(x, y, z));
            atom.serial = serial;
            atom.residue_number = residue_number;
            atom.partial_charge = charge;
            atom.file_radius = Some(radius);
            atom.force_field_type = element;
            system.add_atom(atom);
        }

        if system.is_empty() {
            return Err(PqrError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok(system)
    }
}
