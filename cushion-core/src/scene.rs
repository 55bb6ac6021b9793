//! Scene object: a scan mesh with its world matrix and vertex selection
use nalgebra::{Matrix4, Point3};

use crate::error::{AlignError, AlignResult};
use crate::geometry::Mesh;

/// An object in the scene that alignment operators act on.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub mesh: Mesh,
    /// Object-to-world transform, applied on top of the mesh's own coordinates
    pub world: Matrix4<f64>,
    selection: Vec<usize>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            world: Matrix4::identity(),
            selection: Vec::new(),
        }
    }

    /// Replace the selection. Indices keep their order; duplicates are dropped.
    pub fn select(&mut self, indices: &[usize]) -> AlignResult<()> {
        let count = self.mesh.vertex_count();
        if let Some(&index) = indices.iter().find(|&&index| index >= count) {
            return Err(AlignError::VertexOutOfRange { index, count });
        }

        self.selection.clear();
        for &index in indices {
            if !self.selection.contains(&index) {
                self.selection.push(index);
            }
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Selected vertex positions mapped through `world`, in selection order
    pub fn selected_world_points(&self) -> AlignResult<Vec<Point3<f64>>> {
        let count = self.mesh.vertex_count();
        self.selection
            .iter()
            .map(|&index| {
                self.mesh
                    .vertex(index)
                    .map(|vertex| self.world.transform_point(&vertex.position))
                    .ok_or(AlignError::VertexOutOfRange { index, count })
            })
            .collect()
    }

    /// Left-multiply the world matrix: `world = transform * world`.
    pub fn apply(&mut self, transform: &Matrix4<f64>) {
        self.world = transform * self.world;
    }

    /// Write the world matrix into the mesh and reset it to identity.
    pub fn bake(&mut self) {
        if self.world != Matrix4::identity() {
            self.mesh.transform(&self.world);
            self.world = Matrix4::identity();
        }
    }
}
