use super::error::MeshError;
use nalgebra::{Point3, Vector3};
use tracing::warn;

/// Triangles with an area below this threshold (Å²) are dropped.
pub const DEGENERATE_AREA: f64 = 1e-12;

/// Flat triangular boundary element with precomputed geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub corners: [Point3<f64>; 3],
    pub centroid: Point3<f64>,
    /// Unit normal following the right-hand rule over `corners`.
    pub normal: Vector3<f64>,
    pub area: f64,
}

impl Panel {
    /// Builds the panel for three corners. Returns `None` for a degenerate triangle.
    pub fn from_corners(corners: [Point3<f64>; 3]) -> Option<Self> {
        let cross = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
        let area = 0.5 * cross.norm();
        if area.is_nan() || area < DEGENERATE_AREA {
            return None;
        }
        let centroid = Point3::from(
            (corners[0].coords + corners[1].coords + corners[2].coords) / 3.0,
        );
        Some(Self {
            corners,
            centroid,
            normal: cross / (2.0 * area),
            area,
        })
    }

    /// Length of the longest edge.
    pub fn diameter(&self) -> f64 {
        let [a, b, c] = self.corners;
        (b - a).norm().max((c - b).norm()).max((a - c).norm())
    }

    /// Maps barycentric coordinates `(xi, eta)` on the reference triangle to a point.
    #[inline]
    pub fn point_at(&self, xi: f64, eta: f64) -> Point3<f64> {
        let [a, b, c] = self.corners;
        a + (b - a) * xi + (c - a) * eta
    }

    fn flip(&mut self) {
        self.corners.swap(1, 2);
        self.normal = -self.normal;
    }
}

/// A closed triangulated surface.
///
/// Triangle normals point away from the enclosed solute.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
    panels: Vec<Panel>,
}

impl SurfaceMesh {
    /// Creates a mesh, validating indices and removing degenerate triangles.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::IndexOutOfRange`] for an invalid vertex index and
    /// [`MeshError::Empty`] if no triangle survives.
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        let vertex_count = vertices.len();
        let mut kept = Vec::with_capacity(triangles.len());
        let mut panels = Vec::with_capacity(triangles.len());
        let mut degenerate = 0usize;

        for (t, tri) in triangles.into_iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle: t,
                    index,
                    vertex_count,
                });
            }
            match Panel::from_corners([vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]]) {
                Some(panel) => {
                    kept.push(tri);
                    panels.push(panel);
                }
                None => degenerate += 1,
            }
        }

        if degenerate > 0 {
            warn!(
                removed = degenerate,
                remaining = kept.len(),
                "Removed degenerate triangles from surface mesh."
            );
        }
        if kept.is_empty() {
            return Err(MeshError::Empty);
        }

        Ok(Self {
            vertices,
            triangles: kept,
            panels,
        })
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Total surface area in Å².
    pub fn area(&self) -> f64 {
        self.panels.iter().map(|p| p.area).sum()
    }

    /// Volume enclosed by the surface in Å³ (divergence theorem; positive for
    /// outward normals).
    pub fn enclosed_volume(&self) -> f64 {
        self.panels
            .iter()
            .map(|p| p.centroid.coords.dot(&p.normal) * p.area)
            .sum::<f64>()
            / 3.0
    }

    /// Flips every triangle whose geometric normal disagrees with the average
    /// of the supplied per-vertex normals. Returns the number of flipped triangles.
    ///
    /// `vertex_normals` must have one entry per vertex; triangles whose
    /// averaged normal vanishes are left untouched.
    pub fn orient_with(&mut self, vertex_normals: &[Vector3<f64>]) -> usize {
        let mut flipped = 0;
        for (tri, panel) in self.triangles.iter_mut().zip(self.panels.iter_mut()) {
            let reference: Vector3<f64> = tri
                .iter()
                .filter_map(|&i| vertex_normals.get(i))
                .sum();
            if reference.dot(&panel.normal) < 0.0 {
                tri.swap(1, 2);
                panel.flip();
                flipped += 1;
            }
        }
        flipped
    }

    /// Area-weighted vertex normals derived from the triangle normals.
    pub fn vertex_normals(&self) -> Vec<Vector3<f64>> {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for (tri, panel) in self.triangles.iter().zip(&self.panels) {
            for &i in tri {
                normals[i] += panel.normal * panel.area;
            }
        }
        for n in &mut normals {
            let len = n.norm();
            if len > 0.0 {
                *n /= len;
            }
        }
        normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let triangles = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
        (vertices, triangles)
    }

    #[test]
    fn panel_geometry_is_computed() {
        let panel = Panel::from_corners([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ])
        .unwrap();
        assert!((panel.area - 2.0).abs() < 1e-12);
        assert_eq!(panel.normal, Vector3::new(0.0, 0.0, 1.0));
        assert!((panel.centroid - Point3::new(2.0 / 3.0, 2.0 / 3.0, 0.0)).norm() < 1e-12);
        assert!((panel.diameter() - 8.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(panel.point_at(0.5, 0.5), Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn tetrahedron_has_outward_normals_and_positive_volume() {
        let (v, t) = tetrahedron();
        let mesh = SurfaceMesh::new(v, t).unwrap();
        assert_eq!(mesh.len(), 4);
        assert!((mesh.enclosed_volume() - 1.0 / 6.0).abs() < 1e-12);
        let expected_area = 1.5 + 3.0_f64.sqrt() / 2.0;
        assert!((mesh.area() - expected_area).abs() < 1e-12);
    }

    #[test]
    fn degenerate_triangles_are_removed() {
        let (mut v, mut t) = tetrahedron();
        v.push(Point3::new(2.0, 0.0, 0.0));
        t.push([0, 1, 4]);
        let mesh = SurfaceMesh::new(v, t).unwrap();
        assert_eq!(mesh.len(), 4);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let (v, mut t) = tetrahedron();
        t.push([0, 1, 9]);
        let result = SurfaceMesh::new(v, t);
        assert!(matches!(
            result,
            Err(MeshError::IndexOutOfRange {
                triangle: 4,
                index: 9,
                vertex_count: 4
            })
        ));
    }

    #[test]
    fn all_degenerate_mesh_is_empty() {
        let v = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        assert!(matches!(SurfaceMesh::new(v, vec![[0, 1, 2]]), Err(MeshError::Empty)));
    }

    #[test]
    fn orient_with_flips_inverted_triangles() {
        let (v, mut t) = tetrahedron();
        t[0].swap(1, 2);
        t[3].swap(1, 2);
        let mut mesh = SurfaceMesh::new(v, t).unwrap();
        assert!(mesh.enclosed_volume() < 0.0);

        let centre = Point3::new(0.25, 0.25, 0.25);
        let normals: Vec<_> = mesh
            .vertices()
            .iter()
            .map(|p| (p - centre).normalize())
            .collect();
        assert_eq!(mesh.orient_with(&normals), 2);
        assert!((mesh.enclosed_volume() - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(mesh.orient_with(&normals), 0);
    }

    #[test]
    fn vertex_normals_are_unit_and_outward() {
        let (v, t) = tetrahedron();
        let mesh = SurfaceMesh::new(v, t).unwrap();
        let centre = Point3::new(0.25, 0.25, 0.25);
        for (p, n) in mesh.vertices().iter().zip(mesh.vertex_normals()) {
            assert!((n.norm() - 1.0).abs() < 1e-12);
            assert!(n.dot(&(p - centre)) > 0.0);
        }
    }
}
