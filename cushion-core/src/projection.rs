//! Camera and projection utilities for scan previews
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Bounds;

/// Perspective camera for scan previews
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f64::consts::PI / 4.0, // 45 degrees
            aspect: width as f64 / height.max(1) as f64,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Aim at the centre of `bounds` from far enough along +Z to see all of it
    pub fn frame(&mut self, bounds: &Bounds) {
        let radius = (bounds.extent().norm() / 2.0).max(1e-3);
        let distance = radius / (self.fov / 2.0).sin();
        self.target = bounds.center();
        self.position = self.target + Vector3::z() * distance;
        self.near = (distance - radius).max(distance * 1e-3);
        self.far = distance + radius * 2.0;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Perspective projection for the current framing
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a 3D point to 2D screen space as `(x, y, depth)`
    pub fn project_to_screen(
        &self,
        point: &Point3<f64>,
        model_matrix: &Matrix4<f64>,
        width: u32,
        height: u32,
    ) -> Option<(f64, f64, f64)> {
        let mvp = self.projection_matrix() * self.view_matrix() * model_matrix;
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero w
        if clip.w.abs() < 1e-9 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;

        // Clip test
        if ndc.iter().any(|c| !(-1.0..=1.0).contains(c)) {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f64;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f64;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let camera = Camera::new(800, 600);
        let (x, y, _) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 800, 600)
            .unwrap();
        assert!((x - 400.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_framed_scan_is_visible() {
        let mut mesh = Mesh::cube(40.0);
        mesh.transform(&Matrix4::new_translation(&Vector3::new(100.0, -50.0, 10.0)));
        let mut camera = Camera::new(80, 80);
        camera.frame(&mesh.bounds().unwrap());

        for vertex in mesh.vertices() {
            let projected =
                camera.project_to_screen(&vertex.position, &Matrix4::identity(), 80, 80);
            assert!(projected.is_some(), "{:?} was clipped", vertex.position);
        }
    }

    #[test]
    fn test_points_behind_camera_are_clipped() {
        let camera = Camera::new(800, 600);
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 800, 600)
            .is_none());
    }
}
