//! Alignment operators: a precondition plus a pure transform, applied to a
//! [`SceneObject`] by [`Operator::execute`].
use log::info;
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{AlignError, AlignResult};
use crate::geometry::checked_triangle_normal_and_centroid;
use crate::scene::SceneObject;
use crate::transform::{AlignConfig, Transform};

/// A named action on the active object.
pub trait Operator {
    /// Stable identifier, e.g. `object.align_to_origin`
    fn id(&self) -> &'static str;

    /// Button label
    fn label(&self) -> &'static str;

    /// Whether the operator can run at all.
    fn poll(&self, active: Option<&SceneObject>) -> bool {
        active.is_some()
    }

    /// The world-space transform this operator would apply to `object`.
    fn transform(&self, object: &SceneObject) -> AlignResult<Matrix4<f64>>;

    /// Apply the transform to the object's world matrix and bake it into the
    /// mesh, so the object ends with an identity world matrix.
    fn execute(&self, object: &mut SceneObject) -> AlignResult<Matrix4<f64>> {
        let transform = self.transform(object)?;
        object.apply(&transform);
        object.bake();
        info!("{} applied to '{}'", self.id(), object.name);
        Ok(transform)
    }
}

/// Moves the triangle spanned by the three selected vertices onto the XY
/// plane: its centroid to the origin and its normal to +Z.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignToOrigin {
    pub config: AlignConfig,
}

impl AlignToOrigin {
    pub const ID: &'static str = "object.align_to_origin";
    pub const LABEL: &'static str = "Align To Origin";
    pub const REQUIRED_VERTICES: usize = 3;

    pub fn new(config: AlignConfig) -> Self {
        Self { config }
    }
}

impl Operator for AlignToOrigin {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> &'static str {
        Self::LABEL
    }

    fn transform(&self, object: &SceneObject) -> AlignResult<Matrix4<f64>> {
        let points = object.selected_world_points()?;
        let [v1, v2, v3] = points.as_slice() else {
            return Err(AlignError::InvalidSelection {
                required: Self::REQUIRED_VERTICES,
                actual: points.len(),
            });
        };

        let (normal, centroid) =
            checked_triangle_normal_and_centroid(v1, v2, v3, self.config.collinear_epsilon)?;
        // Small scans have short normals; only the direction matters here
        let direction = normal.unscale(normal.amax());
        Transform::rotation_between_with(
            &self.config,
            &direction,
            &centroid,
            &Vector3::z(),
            &Point3::origin(),
        )
    }
}

/// Turns the object upside down: a half turn mapping +Z onto -Z.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlipZ {
    pub config: AlignConfig,
}

impl FlipZ {
    pub const ID: &'static str = "object.flip_about_xy";
    pub const LABEL: &'static str = "Flip Model";

    pub fn new(config: AlignConfig) -> Self {
        Self { config }
    }
}

impl Operator for FlipZ {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> &'static str {
        Self::LABEL
    }

    fn transform(&self, _object: &SceneObject) -> AlignResult<Matrix4<f64>> {
        Transform::rotation_between_with(
            &self.config,
            &Vector3::z(),
            &Point3::origin(),
            &-Vector3::z(),
            &Point3::origin(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, Triangle, Vertex};
    use approx::assert_relative_eq;

    fn tilted_triangle() -> SceneObject {
        // Plane through (5, 5, 5) tilted about X
        let v = |x: f64, y: f64, z: f64| Vertex::new(x, y, z, 0.0, 0.0, 0.0);
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::new(
            v(4.0, 4.0, 4.0),
            v(7.0, 4.0, 4.0),
            v(4.0, 7.0, 7.0),
        ));
        let mut object = SceneObject::new("scan", mesh);
        object.select(&[0, 1, 2]).unwrap();
        object
    }

    #[test]
    fn test_poll_needs_active_object() {
        let object = SceneObject::new("cube", Mesh::cube(1.0));
        assert!(AlignToOrigin::default().poll(Some(&object)));
        assert!(!AlignToOrigin::default().poll(None));
        assert!(!FlipZ::default().poll(None));
    }

    #[test]
    fn test_align_moves_triangle_onto_xy_plane() {
        let mut object = tilted_triangle();
        AlignToOrigin::default().execute(&mut object).unwrap();

        assert_eq!(object.world, Matrix4::identity());
        let triangle = &object.mesh.triangles[0];
        for vertex in &triangle.vertices {
            assert_relative_eq!(vertex.position.z, 0.0, epsilon = 1e-9);
        }
        let (normal, centroid) = triangle.normal_and_centroid();
        assert_relative_eq!(normal.normalize(), Vector3::z(), epsilon = 1e-9);
        assert_relative_eq!(centroid, Point3::origin(), epsilon = 1e-9);
    }

    #[test]
    fn test_align_uses_world_space_selection() {
        let mut object = tilted_triangle();
        object.apply(&Matrix4::new_translation(&Vector3::new(-20.0, 0.0, 3.0)));
        AlignToOrigin::default().execute(&mut object).unwrap();

        let (_, centroid) = object.mesh.triangles[0].normal_and_centroid();
        assert_relative_eq!(centroid, Point3::origin(), epsilon = 1e-9);
    }

    #[test]
    fn test_align_requires_three_vertices() {
        let mut object = tilted_triangle();
        object.select(&[0, 1]).unwrap();
        let result = AlignToOrigin::default().execute(&mut object);
        assert_eq!(
            result,
            Err(AlignError::InvalidSelection {
                required: 3,
                actual: 2
            })
        );
        // Nothing was applied
        assert_eq!(object.mesh, tilted_triangle().mesh);
    }

    #[test]
    fn test_align_rejects_collinear_selection() {
        let mut object = SceneObject::new("cube", Mesh::cube(2.0));
        // Vertex 3 is corner 0 of triangle 1, which shares the position of vertex 0
        object.select(&[0, 2, 3]).unwrap();
        let result = AlignToOrigin::default().execute(&mut object);
        assert!(matches!(result, Err(AlignError::DegenerateInput { .. })));
    }

    #[test]
    fn test_flip_turns_cube_upside_down() {
        let mut mesh = Mesh::cube(2.0);
        mesh.transform(&Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0)));
        let mut object = SceneObject::new("cube", mesh);

        let applied = FlipZ::default().execute(&mut object).unwrap();
        assert_relative_eq!(applied.transform_vector(&Vector3::z()), -Vector3::z());

        let center = object.mesh.bounds().unwrap().center();
        assert_relative_eq!(center, Point3::new(-1.0, 2.0, -3.0), epsilon = 1e-12);
        // Top face normal now points down
        assert_relative_eq!(object.mesh.triangles[0].vertices[0].normal, -Vector3::z());
    }

    #[test]
    fn test_flip_with_exact_comparison() {
        let mut object = SceneObject::new("cube", Mesh::cube(2.0));
        let flip = FlipZ::new(AlignConfig::new().with_parallel_epsilon(0.0));
        let applied = flip.execute(&mut object).unwrap();
        assert_eq!(applied.transform_vector(&Vector3::z()), -Vector3::z());
    }

    #[test]
    fn test_align_accepts_tiny_triangle() {
        let v = |x: f64, y: f64, z: f64| Vertex::new(x, y, z, 0.0, 0.0, 0.0);
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::new(
            v(1e-5, 0.0, 0.0),
            v(2e-5, 0.0, 0.0),
            v(1e-5, 0.0, 1e-5),
        ));
        let mut object = SceneObject::new("tiny", mesh);
        object.select(&[0, 1, 2]).unwrap();

        AlignToOrigin::default().execute(&mut object).unwrap();
        for vertex in object.mesh.vertices() {
            assert_relative_eq!(vertex.position.z, 0.0, epsilon = 1e-18);
        }
    }
}
