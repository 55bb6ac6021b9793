//! Geometry primitives for scanned seat shapes
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{AlignError, AlignResult};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(x: f64, y: f64, z: f64, nx: f64, ny: f64, nz: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    /// Apply a rigid transform: positions as points, normals as directions.
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Self {
        let normal = matrix.transform_vector(&self.normal);
        Self {
            position: matrix.transform_point(&self.position),
            normal: normal.try_normalize(f64::EPSILON).unwrap_or(normal),
        }
    }
}

/// Non-normalized normal and centroid of the triangle `v1, v2, v3`.
///
/// The normal is `(v2 - v1) × (v3 - v1)`; its length is twice the triangle's
/// area. Collinear points give a zero normal.
pub fn triangle_normal_and_centroid(
    v1: &Point3<f64>,
    v2: &Point3<f64>,
    v3: &Point3<f64>,
) -> (Vector3<f64>, Point3<f64>) {
    let a = v2 - v1;
    let b = v3 - v1;
    let normal = a.cross(&b);
    let centroid = Point3::from((v1.coords + v2.coords + v3.coords) / 3.0);
    (normal, centroid)
}

/// Like [`triangle_normal_and_centroid`], but rejects collinear points.
///
/// The threshold is relative to the edges: with `a = v2 - v1` and
/// `b = v3 - v1`, the points are collinear when
/// `|a × b|² <= epsilon * |a|² * |b|²`, i.e. when `sin²` of the angle at `v1`
/// is at most `epsilon`. A zero-length edge always fails. The result does not
/// depend on the size of the triangle.
///
/// Fails with [`AlignError::DegenerateInput`] for collinear points.
pub fn checked_triangle_normal_and_centroid(
    v1: &Point3<f64>,
    v2: &Point3<f64>,
    v3: &Point3<f64>,
    epsilon: f64,
) -> AlignResult<(Vector3<f64>, Point3<f64>)> {
    let (normal, centroid) = triangle_normal_and_centroid(v1, v2, v3);
    let edges = (v2 - v1).norm_squared() * (v3 - v1).norm_squared();
    if normal.norm_squared() <= epsilon * edges {
        return Err(AlignError::degenerate("triangle points are collinear"));
    }
    Ok((normal, centroid))
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Unit face normal, or zero for a degenerate face
    pub fn calculate_normal(&self) -> Vector3<f64> {
        let (normal, _) = self.normal_and_centroid();
        normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    pub fn normal_and_centroid(&self) -> (Vector3<f64>, Point3<f64>) {
        let [v0, v1, v2] = &self.vertices;
        triangle_normal_and_centroid(&v0.position, &v1.position, &v2.position)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds {
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

/// A scanned mesh stored as a triangle soup.
///
/// Vertex `i` addresses corner `i % 3` of triangle `i / 3`; shared corners are
/// not welded, so every triangle contributes three vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    pub fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.triangles
            .get(index / 3)
            .map(|triangle| &triangle.vertices[index % 3])
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.triangles.iter().flat_map(|t| t.vertices.iter())
    }

    /// Bounding box of all vertex positions, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.vertices().map(|v| v.position);
        let first = positions.next()?;
        let bounds = positions.fold(
            Bounds {
                min: first,
                max: first,
            },
            |acc, p| Bounds {
                min: acc.min.inf(&p),
                max: acc.max.sup(&p),
            },
        );
        Some(bounds)
    }

    /// Bake `matrix` into every vertex.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                *vertex = vertex.transformed(matrix);
            }
        }
    }

    /// Create a simple cube mesh for testing
    pub fn cube(size: f64) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(12);
        // (normal, four corners counter-clockwise seen from outside)
        #[rustfmt::skip]
        let faces: [([f64; 3], [[f64; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
            ([0.0, 0.0, -1.0], [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]]),
            ([0.0, 1.0, 0.0], [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]]),
            ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
            ([1.0, 0.0, 0.0], [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]]),
            ([-1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
        ];

        for ([nx, ny, nz], corners) in faces {
            let v = |[x, y, z]: [f64; 3]| Vertex::new(x * half, y * half, z * half, nx, ny, nz);
            mesh.add_triangle(Triangle::new(v(corners[0]), v(corners[1]), v(corners[2])));
            mesh.add_triangle(Triangle::new(v(corners[0]), v(corners[2]), v(corners[3])));
        }

        mesh
    }
}
