use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to start mesher '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Mesher '{program}' exited with {status}: {stderr}")]
    Process {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("Parse error in '{path}' on line {line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },
    #[error("'{path}' declares {expected} records but contains {found}")]
    CountMismatch {
        path: String,
        expected: usize,
        found: usize,
    },
    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },
    #[error("Surface mesh contains no usable triangles")]
    Empty,
    #[error("No atom spheres with a positive radius to triangulate")]
    NoSpheres,
}
