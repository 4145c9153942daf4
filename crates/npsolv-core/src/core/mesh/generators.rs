use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// Number of vertices of an icosphere after `subdivisions` refinements.
pub fn icosphere_vertex_count(subdivisions: u32) -> usize {
    10 * 4usize.pow(subdivisions) + 2
}

/// Triangulates a sphere by repeatedly subdividing an icosahedron.
///
/// Vertices lie exactly on the sphere and every triangle is wound so that its
/// normal points away from `centre`.
///
/// # Return
///
/// The vertex positions and triangle index triples.
pub fn icosphere(
    centre: Point3<f64>,
    radius: f64,
    subdivisions: u32,
) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let mut directions: Vec<Vector3<f64>> = [
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ]
    .iter()
    .map(|&[x, y, z]| Vector3::new(x, y, z).normalize())
    .collect();

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut refined = Vec::with_capacity(faces.len() * 4);
        for &[a, b, c] in &faces {
            let ab = midpoint(&mut directions, &mut midpoints, a, b);
            let bc = midpoint(&mut directions, &mut midpoints, b, c);
            let ca = midpoint(&mut directions, &mut midpoints, c, a);
            refined.push([a, ab, ca]);
            refined.push([b, bc, ab]);
            refined.push([c, ca, bc]);
            refined.push([ab, bc, ca]);
        }
        faces = refined;
    }

    for face in &mut faces {
        let [a, b, c] = face.map(|i| directions[i]);
        if (b - a).cross(&(c - a)).dot(&(a + b + c)) < 0.0 {
            face.swap(1, 2);
        }
    }

    let vertices = directions
        .into_iter()
        .map(|d| centre + d * radius)
        .collect();
    (vertices, faces)
}

fn midpoint(
    directions: &mut Vec<Vector3<f64>>,
    cache: &mut HashMap<(usize, usize), usize>,
    a: usize,
    b: usize,
) -> usize {
    let key = if a < b { (a, b) } else { (b, a) };
    *cache.entry(key).or_insert_with(|| {
        directions.push(((directions[a] + directions[b]) * 0.5).normalize());
        directions.len() - 1
    })
}
