use super::error::MeshError;
use super::surface::SurfaceMesh;
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const VERT_FIELDS: usize = 9;
const FACE_FIELDS: usize = 5;
const COUNT_FIELDS: usize = 4;

/// Returns the `.vert` and `.face` paths for an output prefix.
pub fn msms_paths(prefix: &Path) -> (PathBuf, PathBuf) {
    let base = prefix.as_os_str().to_owned();
    let mut vert = base.clone();
    vert.push(".vert");
    let mut face = base;
    face.push(".face");
    (PathBuf::from(vert), PathBuf::from(face))
}

/// Reads a `.vert`/`.face` pair into an oriented surface mesh.
pub fn read_msms(vert_path: &Path, face_path: &Path) -> Result<SurfaceMesh, MeshError> {
    let (vertices, normals) = parse_vert(open(vert_path)?, &vert_path.to_string_lossy())?;
    let triangles = parse_face(open(face_path)?, &face_path.to_string_lossy())?;

    let mut mesh = SurfaceMesh::new(vertices, triangles)?;
    let flipped = mesh.orient_with(&normals);
    debug!(
        vertices = mesh.vertices().len(),
        triangles = mesh.len(),
        flipped,
        "Read MSMS surface."
    );
    Ok(mesh)
}

/// Writes a mesh as `<prefix>.vert` and `<prefix>.face`.
pub fn write_msms(mesh: &SurfaceMesh, prefix: &Path) -> Result<(), MeshError> {
    let (vert_path, face_path) = msms_paths(prefix);
    write_vert(mesh, &mut create(&vert_path)?).map_err(|e| io_error(&vert_path, e))?;
    write_face(mesh, &mut create(&face_path)?).map_err(|e| io_error(&face_path, e))?;
    Ok(())
}

fn write_vert(mesh: &SurfaceMesh, writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer, "# MSMS-format vertex file")?;
    writeln!(writer, "#vertex #sphere density probe_r")?;
    writeln!(writer, "{:7} {:7} {:6.2} {:6.2}", mesh.vertices().len(), 0, 0.0, 0.0)?;
    for (p, n) in mesh.vertices().iter().zip(mesh.vertex_normals()) {
        writeln!(
            writer,
            "{:9.3} {:9.3} {:9.3} {:9.3} {:9.3} {:9.3} {:7} {:7} {:2}",
            p.x, p.y, p.z, n.x, n.y, n.z, 0, 0, 1
        )?;
    }
    writer.flush()
}

fn write_face(mesh: &SurfaceMesh, writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer, "# MSMS-format face file")?;
    writeln!(writer, "#faces  #sphere density probe_r")?;
    writeln!(writer, "{:7} {:7} {:6.2} {:6.2}", mesh.len(), 0, 0.0, 0.0)?;
    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "{:6} {:6} {:6} {:2} {:6}", a + 1, b + 1, c + 1, 1, 0)?;
    }
    writer.flush()
}

/// Parses `.vert` content into positions and vertex normals.
pub fn parse_vert(
    reader: impl BufRead,
    source: &str,
) -> Result<(Vec<Point3<f64>>, Vec<Vector3<f64>>), MeshError> {
    let (rows, declared) = read_rows(reader, source, VERT_FIELDS)?;
    let mut positions = Vec::with_capacity(rows.len());
    let mut normals = Vec::with_capacity(rows.len());
    for (line, fields) in &rows {
        let v = parse_floats::<6>(fields, *line, source)?;
        positions.push(Point3::new(v[0], v[1], v[2]));
        normals.push(Vector3::new(v[3], v[4], v[5]));
    }
    check_count(source, declared, positions.len())?;
    Ok((positions, normals))
}

/// Parses `.face` content into zero-based triangles.
pub fn parse_face(reader: impl BufRead, source: &str) -> Result<Vec<[usize; 3]>, MeshError> {
    let (rows, declared) = read_rows(reader, source, FACE_FIELDS)?;
    let mut triangles = Vec::with_capacity(rows.len());
    for (line, fields) in &rows {
        let mut tri = [0usize; 3];
        for (slot, field) in tri.iter_mut().zip(fields) {
            let index: usize = field.parse().map_err(|_| MeshError::Parse {
                path: source.to_string(),
                line: *line,
                message: format!("invalid vertex index '{}'", field),
            })?;
            if index == 0 {
                return Err(MeshError::Parse {
                    path: source.to_string(),
                    line: *line,
                    message: "vertex indices are 1-based".to_string(),
                });
            }
            *slot = index - 1;
        }
        triangles.push(tri);
    }
    check_count(source, declared, triangles.len())?;
    Ok(triangles)
}

type Row = (usize, Vec<String>);

/// Splits the data rows, skipping `#` comments and capturing a leading count line.
fn read_rows(
    reader: impl BufRead,
    source: &str,
    fields_per_row: usize,
) -> Result<(Vec<Row>, Option<usize>), MeshError> {
    let mut rows = Vec::new();
    let mut declared = None;
    for (i, line) in reader.lines().enumerate() {
        let line_num = i + 1;
        let line = line.map_err(|e| MeshError::Io {
            path: source.to_string(),
            source: e,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();
        if rows.is_empty() && declared.is_none() && fields.len() == COUNT_FIELDS {
            let count = fields[0].parse().map_err(|_| MeshError::Parse {
                path: source.to_string(),
                line: line_num,
                message: format!("invalid record count '{}'", fields[0]),
            })?;
            declared = Some(count);
            continue;
        }
        if fields.len() < fields_per_row {
            return Err(MeshError::Parse {
                path: source.to_string(),
                line: line_num,
                message: format!(
                    "expected {} fields, found {}",
                    fields_per_row,
                    fields.len()
                ),
            });
        }
        rows.push((line_num, fields));
    }
    Ok((rows, declared))
}

fn parse_floats<const N: usize>(
    fields: &[String],
    line: usize,
    source: &str,
) -> Result<[f64; N], MeshError> {
    let mut values = [0.0; N];
    for (value, field) in values.iter_mut().zip(fields) {
        *value = field.parse().map_err(|_| MeshError::Parse {
            path: source.to_string(),
            line,
            message: format!("invalid number '{}'", field),
        })?;
    }
    Ok(values)
}

fn check_count(source: &str, declared: Option<usize>, found: usize) -> Result<(), MeshError> {
    match declared {
        Some(expected) if expected != found => Err(MeshError::CountMismatch {
            path: source.to_string(),
            expected,
            found,
        }),
        _ => Ok(()),
    }
}

fn open(path: &Path) -> Result<BufReader<File>, MeshError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| io_error(path, e))
}

fn create(path: &Path) -> Result<BufWriter<File>, MeshError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> MeshError {
    MeshError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::generators::icosphere;
    use std::io::Cursor;
    use tempfile::tempdir;

    const TETRA_VERT: &str = "\
# MSMS solvent excluded surface vertices for test
#vertex #sphere density probe_r
      4       1  1.00  1.40
    0.000     0.000     0.000    -0.577    -0.577    -0.577       0       1  2
    1.000     0.000     0.000     0.816    -0.408    -0.408       0       1  2
    0.000     1.000     0.000    -0.408     0.816    -0.408       0       1  2
    0.000     0.000     1.000    -0.408    -0.408     0.816       0       1  2
";

    // Every face is wound inward; the vertex normals must fix that.
    const TETRA_FACE: &str = "\
# MSMS solvent excluded surface faces for test
#faces  #sphere density probe_r
      4       1  1.00  1.40
     1      2      3  2      1
     1      4      2  2      1
     1      3      4  2      1
     2      4      3  2      1
";

    #[test]
    fn parse_vert_reads_positions_and_normals() {
        let (p, n) = parse_vert(Cursor::new(TETRA_VERT), "t.vert").unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(p[3], Point3::new(0.0, 0.0, 1.0));
        assert_eq!(n[1], Vector3::new(0.816, -0.408, -0.408));
    }

    #[test]
    fn parse_face_converts_to_zero_based_indices() {
        let faces = parse_face(Cursor::new(TETRA_FACE), "t.face").unwrap();
        assert_eq!(faces, vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]]);
    }

    #[test]
    fn headerless_files_are_accepted() {
        let body: String = TETRA_FACE.lines().skip(3).map(|l| format!("{}\n", l)).collect();
        let faces = parse_face(Cursor::new(body), "t.face").unwrap();
        assert_eq!(faces.len(), 4);
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let truncated: String = TETRA_VERT.lines().take(6).map(|l| format!("{}\n", l)).collect();
        let result = parse_vert(Cursor::new(truncated), "t.vert");
        assert!(matches!(
            result,
            Err(MeshError::CountMismatch {
                expected: 4,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn short_rows_and_zero_indices_are_rejected() {
        let result = parse_face(Cursor::new("1 2 3\n"), "t.face");
        assert!(matches!(result, Err(MeshError::Parse { line: 1, .. })));

        let result = parse_face(Cursor::new("0 1 2 2 1\n"), "t.face");
        assert!(matches!(result, Err(MeshError::Parse { .. })));

        let result = parse_vert(Cursor::new("0 0 x 0 0 1 0 1 2\n"), "t.vert");
        assert!(matches!(result, Err(MeshError::Parse { .. })));
    }

    #[test]
    fn read_msms_orients_triangles_with_vertex_normals() {
        let dir = tempdir().unwrap();
        let (vert, face) = msms_paths(&dir.path().join("tetra"));
        std::fs::write(&vert, TETRA_VERT).unwrap();
        std::fs::write(&face, TETRA_FACE).unwrap();

        let mesh = read_msms(&vert, &face).unwrap();
        assert_eq!(mesh.len(), 4);
        assert!((mesh.enclosed_volume() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn write_then_read_preserves_mesh_shape() {
        let dir = tempdir().unwrap();
        let (v, f) = icosphere(Point3::new(1.0, 2.0, 3.0), 2.0, 2);
        let mesh = SurfaceMesh::new(v, f).unwrap();
        let prefix = dir.path().join("sphere");
        write_msms(&mesh, &prefix).unwrap();

        let (vert, face) = msms_paths(&prefix);
        let reread = read_msms(&vert, &face).unwrap();
        assert_eq!(reread.len(), mesh.len());
        assert_eq!(reread.triangles(), mesh.triangles());
        assert!((reread.area() - mesh.area()).abs() / mesh.area() < 1e-3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = read_msms(&dir.path().join("a.vert"), &dir.path().join("a.face"));
        assert!(matches!(result, Err(MeshError::Io { .. })));
    }
}
