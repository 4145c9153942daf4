use crate::core::models::system::Sphere;
use std::io::{self, Write};

/// Writes spheres in the `x y z r` format read by surface triangulation programs.
pub fn write_xyzr(spheres: &[Sphere], writer: &mut impl Write) -> io::Result<()> {
    for (centre, radius) in spheres {
        writeln!(
            writer,
            "{:.6} {:.6} {:.6} {:.6}",
            centre.x, centre.y, centre.z, radius
        )?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn write_xyzr_emits_one_line_per_sphere() {
        let spheres = vec![
            (Point3::new(0.0, 1.0, -2.5), 1.7),
            (Point3::new(1.25, 0.0, 0.0), 3.1),
        ];
        let mut out = Vec::new();
        write_xyzr(&spheres, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "0.000000 1.000000 -2.500000 1.700000");
        assert_eq!(lines[1], "1.250000 0.000000 0.000000 3.100000");
    }

    #[test]
    fn write_xyzr_with_no_spheres_writes_nothing() {
        let mut out = Vec::new();
        write_xyzr(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
