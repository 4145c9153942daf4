use super::error::MeshError;
use super::generators::{icosphere, icosphere_vertex_count};
use super::msms::{msms_paths, read_msms};
use super::surface::SurfaceMesh;
use crate::core::io::xyzr::write_xyzr;
use crate::core::models::system::Sphere;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use serde::Deserialize;
use std::fs::File;
use std::io::BufWriter;
use std::f64::consts::PI;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Produces a closed triangulated surface around a set of spheres.
pub trait SurfaceMesher: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// True when the meshes are left open where spheres intersect. The Gauss
    /// identity does not hold near such seams.
    fn leaves_seams(&self) -> bool {
        false
    }

    /// Triangulates the molecular surface of `spheres` for a probe of radius
    /// `probe_radius` (Å) at roughly `density` vertices per Å².
    fn triangulate(
        &self,
        spheres: &[Sphere],
        probe_radius: f64,
        density: f64,
    ) -> Result<SurfaceMesh, MeshError>;
}

/// Selects a mesher from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MesherKind {
    #[default]
    Msms,
    SphereUnion,
}

impl std::str::FromStr for MesherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "msms" => Ok(Self::Msms),
            "sphere-union" => Ok(Self::SphereUnion),
            other => Err(format!("unknown mesher '{}'", other)),
        }
    }
}

/// Runs the external MSMS program.
#[derive(Debug, Clone)]
pub struct MsmsMesher {
    pub executable: PathBuf,
    pub extra_args: Vec<String>,
}

impl Default for MsmsMesher {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("msms"),
            extra_args: Vec::new(),
        }
    }
}

impl SurfaceMesher for MsmsMesher {
    fn name(&self) -> &str {
        "msms"
    }

    fn triangulate(
        &self,
        spheres: &[Sphere],
        probe_radius: f64,
        density: f64,
    ) -> Result<SurfaceMesh, MeshError> {
        if spheres.is_empty() {
            return Err(MeshError::NoSpheres);
        }
        let workdir = tempfile::tempdir().map_err(|e| MeshError::Io {
            path: std::env::temp_dir().to_string_lossy().to_string(),
            source: e,
        })?;
        let input = workdir.path().join("input.xyzr");
        let output = workdir.path().join("surface");

        let file = File::create(&input).map_err(|e| MeshError::Io {
            path: input.to_string_lossy().to_string(),
            source: e,
        })?;
        write_xyzr(spheres, &mut BufWriter::new(file)).map_err(|e| MeshError::Io {
            path: input.to_string_lossy().to_string(),
            source: e,
        })?;

        let program = self.executable.to_string_lossy().to_string();
        debug!(program = %program, spheres = spheres.len(), probe_radius, density, "Running MSMS.");
        let result = Command::new(&self.executable)
            .arg("-if")
            .arg(&input)
            .arg("-of")
            .arg(&output)
            .arg("-p")
            .arg(probe_radius.to_string())
            .arg("-d")
            .arg(density.to_string())
            .arg("-no_header")
            .args(&self.extra_args)
            .current_dir(workdir.path())
            .output()
            .map_err(|e| MeshError::Spawn {
                program: program.clone(),
                source: e,
            })?;

        if !result.status.success() {
            return Err(MeshError::Process {
                program,
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let (vert, face) = msms_paths(&output);
        read_msms(&vert, &face)
    }
}

/// Built-in mesher for the surface of a union of spheres.
///
/// Each sphere is triangulated as an icosphere and triangles whose centroid
/// lies inside another sphere are discarded. The probe radius is not used:
/// the result is the van der Waals surface of the input spheres, which is
/// exactly the SAS geometry when the radii are already inflated by the probe.
#[derive(Debug, Clone)]
pub struct SphereUnionMesher {
    pub max_subdivisions: u32,
}

impl Default for SphereUnionMesher {
    fn default() -> Self {
        Self {
            max_subdivisions: 5,
        }
    }
}

impl SphereUnionMesher {
    /// Smallest icosphere level reaching `density` on a sphere of `radius`.
    fn subdivisions_for(&self, radius: f64, density: f64) -> u32 {
        let target = density * 4.0 * PI * radius * radius;
        (0..self.max_subdivisions)
            .find(|&level| icosphere_vertex_count(level) as f64 >= target)
            .unwrap_or(self.max_subdivisions)
    }
}

impl SurfaceMesher for SphereUnionMesher {
    fn name(&self) -> &str {
        "sphere-union"
    }

    fn leaves_seams(&self) -> bool {
        true
    }

    fn triangulate(
        &self,
        spheres: &[Sphere],
        probe_radius: f64,
        density: f64,
    ) -> Result<SurfaceMesh, MeshError> {
        let mut unique: Vec<Sphere> = Vec::with_capacity(spheres.len());
        for &sphere in spheres.iter().filter(|(_, r)| *r > 0.0) {
            if !unique.contains(&sphere) {
                unique.push(sphere);
            }
        }
        if unique.is_empty() {
            return Err(MeshError::NoSpheres);
        }
        debug!(spheres = unique.len(), probe_radius, "Probe radius is ignored by the sphere-union mesher.");

        let centres: Vec<[f64; 3]> = unique.iter().map(|(c, _)| [c.x, c.y, c.z]).collect();
        let kdtree: KdTree<f64, 3> = (&centres).into();
        let max_radius = unique.iter().map(|(_, r)| *r).fold(0.0, f64::max);

        #[cfg(not(feature = "parallel"))]
        let iterator = unique.iter();

        #[cfg(feature = "parallel")]
        let iterator = unique.par_iter();

        let pieces: Vec<(Vec<Point3<f64>>, Vec<[usize; 3]>)> = iterator
            .enumerate()
            .map(|(i, &(centre, radius))| {
                let reach = radius + max_radius;
                let neighbours: Vec<&Sphere> = kdtree
                    .within_unsorted::<SquaredEuclidean>(&centres[i], reach * reach)
                    .into_iter()
                    .map(|found| found.item as usize)
                    .filter(|&j| j != i)
                    .map(|j| &unique[j])
                    .filter(|(c, r)| (c - centre).norm() < r + radius)
                    .collect();
                let (vertices, faces) =
                    icosphere(centre, radius, self.subdivisions_for(radius, density));
                let kept = faces
                    .into_iter()
                    .filter(|f| {
                        let centroid = Point3::from(
                            (vertices[f[0]].coords + vertices[f[1]].coords + vertices[f[2]].coords)
                                / 3.0,
                        );
                        !neighbours.iter().any(|(c, r)| (centroid - c).norm() < *r)
                    })
                    .collect::<Vec<_>>();
                compact(vertices, kept)
            })
            .collect();

        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        for (piece_vertices, piece_faces) in pieces {
            let offset = vertices.len();
            triangles.extend(
                piece_faces
                    .into_iter()
                    .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
            );
            vertices.extend(piece_vertices);
        }
        SurfaceMesh::new(vertices, triangles)
    }
}

/// Drops vertices no kept face refers to and renumbers the faces.
fn compact(
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut remap = vec![usize::MAX; vertices.len()];
    let mut used = Vec::new();
    let faces: Vec<[usize; 3]> = faces
        .into_iter()
        .map(|face| {
            face.map(|i| {
                if remap[i] == usize::MAX {
                    remap[i] = used.len();
                    used.push(vertices[i]);
                }
                remap[i]
            })
        })
        .collect();
    (used, faces)
}

/// The two boundaries of the solvation shell.
#[derive(Debug, Clone)]
pub struct SurfacePair {
    /// Solvent-excluded surface (inner boundary).
    pub ses: SurfaceMesh,
    /// Solvent-accessible surface (outer boundary).
    pub sas: SurfaceMesh,
    /// Both meshes have open seams along sphere intersections.
    pub open_seams: bool,
}

/// Builds the SES from the atomic spheres and the SAS from the same spheres
/// inflated by the probe radius.
///
/// The SAS is triangulated with `sas_probe_radius`, a small probe that keeps
/// the reentrant smoothing of an SES mesher negligible.
pub fn build_surfaces(
    mesher: &dyn SurfaceMesher,
    spheres: &[Sphere],
    probe_radius: f64,
    density: f64,
    sas_probe_radius: f64,
) -> Result<SurfacePair, MeshError> {
    let ses = mesher.triangulate(spheres, probe_radius, density)?;
    let inflated: Vec<Sphere> = spheres
        .iter()
        .map(|&(centre, radius)| (centre, radius + probe_radius))
        .collect();
    let sas = mesher.triangulate(&inflated, sas_probe_radius, density)?;

    info!(
        mesher = mesher.name(),
        ses_triangles = ses.len(),
        ses_area = ses.area(),
        sas_triangles = sas.len(),
        sas_area = sas.area(),
        "Built molecular surfaces."
    );
    Ok(SurfacePair {
        ses,
        sas,
        open_seams: mesher.leaves_seams(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn union_area(radius: f64, distance: f64) -> f64 {
        let cap_height = radius - distance / 2.0;
        2.0 * (4.0 * PI * radius * radius - 2.0 * PI * radius * cap_height)
    }

    #[test]
    fn mesher_kind_parses_from_str() {
        assert_eq!("msms".parse::<MesherKind>(), Ok(MesherKind::Msms));
        assert_eq!("Sphere-Union".parse::<MesherKind>(), Ok(MesherKind::SphereUnion));
        assert!("nanoshaper".parse::<MesherKind>().is_err());
    }

    #[test]
    fn subdivisions_follow_density_and_are_capped() {
        let mesher = SphereUnionMesher { max_subdivisions: 4 };
        assert_eq!(mesher.subdivisions_for(0.5, 1.0), 0);
        // 4π·9·3 ≈ 339 vertices -> level 3 (642 vertices)
        assert_eq!(mesher.subdivisions_for(3.0, 3.0), 3);
        assert_eq!(mesher.subdivisions_for(30.0, 10.0), 4);
    }

    #[test]
    fn single_sphere_matches_analytic_area() {
        let mesher = SphereUnionMesher::default();
        let mesh = mesher
            .triangulate(&[(Point3::new(1.0, 1.0, 1.0), 2.0)], 1.4, 10.0)
            .unwrap();
        let area = 4.0 * PI * 4.0;
        assert!((mesh.area() - area).abs() / area < 0.01);
    }

    #[test]
    fn overlapping_spheres_lose_buried_triangles() {
        let mesher = SphereUnionMesher::default();
        let spheres = [
            (Point3::new(0.0, 0.0, 0.0), 1.0),
            (Point3::new(1.0, 0.0, 0.0), 1.0),
        ];
        let mesh = mesher.triangulate(&spheres, 0.0, 200.0).unwrap();
        let expected = union_area(1.0, 1.0);
        assert!((mesh.area() - expected).abs() / expected < 0.05);
        let midpoint = Point3::new(0.5, 0.0, 0.0);
        assert!(
            mesh.panels()
                .iter()
                .all(|p| (p.centroid - midpoint).norm() > 0.5)
        );
    }

    #[test]
    fn duplicate_and_empty_spheres_are_ignored() {
        let mesher = SphereUnionMesher { max_subdivisions: 2 };
        let sphere = (Point3::origin(), 1.0);
        let single = mesher.triangulate(&[sphere], 0.0, 1.0).unwrap();
        let doubled = mesher
            .triangulate(&[sphere, sphere, (Point3::new(5.0, 0.0, 0.0), 0.0)], 0.0, 1.0)
            .unwrap();
        assert_eq!(single.len(), doubled.len());

        let result = mesher.triangulate(&[(Point3::origin(), 0.0)], 0.0, 1.0);
        assert!(matches!(result, Err(MeshError::NoSpheres)));
    }

    #[test]
    fn sas_encloses_ses() {
        let mesher = SphereUnionMesher { max_subdivisions: 3 };
        let spheres = [(Point3::origin(), 1.7), (Point3::new(1.5, 0.0, 0.0), 1.5)];
        let pair = build_surfaces(&mesher, &spheres, 1.4, 2.0, 0.1).unwrap();
        assert!(pair.sas.area() > pair.ses.area());
        assert!(pair.sas.enclosed_volume() > pair.ses.enclosed_volume());
        let farthest_ses = pair
            .ses
            .vertices()
            .iter()
            .map(|p| p.coords.norm())
            .fold(0.0, f64::max);
        let farthest_sas = pair
            .sas
            .vertices()
            .iter()
            .map(|p| p.coords.norm())
            .fold(0.0, f64::max);
        assert!(farthest_sas > farthest_ses + 1.0);
    }

    #[test]
    fn surface_pair_records_open_seams_of_the_mesher() {
        let spheres = [(Point3::origin(), 1.7)];
        let pair = build_surfaces(&SphereUnionMesher::default(), &spheres, 1.4, 1.0, 0.1).unwrap();
        assert!(pair.open_seams);
        assert!(!MsmsMesher::default().leaves_seams());
    }

    #[test]
    fn missing_msms_executable_is_a_spawn_error() {
        let mesher = MsmsMesher {
            executable: PathBuf::from("/nonexistent/path/to/msms"),
            extra_args: Vec::new(),
        };
        let result = mesher.triangulate(&[(Point3::origin(), 1.5)], 1.4, 3.0);
        assert!(matches!(result, Err(MeshError::Spawn { .. })));
    }

    #[test]
    fn msms_without_spheres_is_rejected() {
        let result = MsmsMesher::default().triangulate(&[], 1.4, 3.0);
        assert!(matches!(result, Err(MeshError::NoSpheres)));
    }
}
