//! Rigid transforms that carry one direction and pivot onto another
use log::{debug, warn};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::error::{AlignError, AlignResult};

/// Tolerances used when building alignment transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignConfig {
    /// `|cosθ - 1|` (or `|cosθ + 1|`) at or below this counts as parallel
    /// (or antiparallel). Zero means exact comparison.
    pub parallel_epsilon: f64,
    /// Squared length below which a direction is rejected.
    pub degenerate_epsilon: f64,
    /// `sin²` of the angle between two triangle edges at or below which the
    /// triangle counts as collinear.
    pub collinear_epsilon: f64,
    /// Allowed deviation of `R * Rᵀ` from identity.
    pub orthonormal_tolerance: f64,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            parallel_epsilon: 1e-10,
            degenerate_epsilon: 1e-12,
            collinear_epsilon: 1e-12,
            orthonormal_tolerance: 1e-6,
        }
    }
}

impl AlignConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_parallel_epsilon(mut self, epsilon: f64) -> Self {
        self.parallel_epsilon = epsilon;
        self
    }

    #[must_use]
    pub const fn with_degenerate_epsilon(mut self, epsilon: f64) -> Self {
        self.degenerate_epsilon = epsilon;
        self
    }

    #[must_use]
    pub const fn with_collinear_epsilon(mut self, epsilon: f64) -> Self {
        self.collinear_epsilon = epsilon;
        self
    }

    #[must_use]
    pub const fn with_orthonormal_tolerance(mut self, tolerance: f64) -> Self {
        self.orthonormal_tolerance = tolerance;
        self
    }

    /// Every tolerance must be finite and non-negative.
    pub fn validate(&self) -> AlignResult<()> {
        let tolerances = [
            ("parallel_epsilon", self.parallel_epsilon),
            ("degenerate_epsilon", self.degenerate_epsilon),
            ("collinear_epsilon", self.collinear_epsilon),
            ("orthonormal_tolerance", self.orthonormal_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(AlignError::InvalidConfig {
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Fallback rotation axes for the antiparallel case, tried in this order.
pub fn world_axes() -> [Vector3<f64>; 3] {
    [Vector3::x(), Vector3::y(), Vector3::z()]
}

/// Index and value of the first entry that differs from `sentinel`.
///
/// Scans front to back; `None` when every entry equals `sentinel`.
pub fn first_non_match<T: PartialEq + Copy>(values: &[T], sentinel: T) -> Option<(usize, T)> {
    values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| *value != sentinel)
}

/// Orbit angles around three axes (in radians), used by scan previews
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

/// Transform builder for scan alignment
pub struct Transform;

impl Transform {
    /// Transform rotating `source_dir` onto `dest_dir` and moving
    /// `source_pivot` by `dest_pivot - source_pivot`, with default tolerances.
    ///
    /// See [`Transform::rotation_between_with`].
    pub fn rotation_between(
        source_dir: &Vector3<f64>,
        source_pivot: &Point3<f64>,
        dest_dir: &Vector3<f64>,
        dest_pivot: &Point3<f64>,
    ) -> AlignResult<Matrix4<f64>> {
        Self::rotation_between_with(
            &AlignConfig::default(),
            source_dir,
            source_pivot,
            dest_dir,
            dest_pivot,
        )
    }

    /// Build `R * Tr`, where `R` is the minimal rotation taking the direction
    /// of `source_dir` to that of `dest_dir` and `Tr` translates by
    /// `dest_pivot - source_pivot`.
    ///
    /// Applied to a point `p` this gives `R * (p + dest_pivot - source_pivot)`:
    /// the offset is added first and the rotation is about the world origin,
    /// not about `source_pivot`. The two coincide when `dest_pivot` is the
    /// origin, which is how the operators call it.
    ///
    /// Fails with [`AlignError::DegenerateInput`] for a (near) zero or
    /// non-finite direction, and with [`AlignError::InvalidConfig`] for a
    /// negative or non-finite tolerance.
    pub fn rotation_between_with(
        config: &AlignConfig,
        source_dir: &Vector3<f64>,
        source_pivot: &Point3<f64>,
        dest_dir: &Vector3<f64>,
        dest_pivot: &Point3<f64>,
    ) -> AlignResult<Matrix4<f64>> {
        let rotation = Self::rotation_block(config, source_dir, dest_dir)?;
        let translation = Self::translation_matrix(&(dest_pivot - source_pivot));
        Ok(rotation.to_homogeneous() * translation)
    }

    /// The 3x3 rotation taking the direction of `from` onto that of `to`.
    pub fn rotation_block(
        config: &AlignConfig,
        from: &Vector3<f64>,
        to: &Vector3<f64>,
    ) -> AlignResult<Matrix3<f64>> {
        config.validate()?;
        let a = unit_direction(config, from, "source direction")?;
        let b = unit_direction(config, to, "destination direction")?;
        let cross = a.cross(&b);
        let cross_squared = cross.norm_squared();
        let cos_theta = a.dot(&b);

        // A vanishing cross product leaves no axis for the general case
        let rotation = if (cos_theta + 1.0).abs() <= config.parallel_epsilon
            || (cross_squared == 0.0 && cos_theta < 0.0)
        {
            debug!("directions are antiparallel (cos = {cos_theta})");
            Self::half_turn(config, &a)?
        } else if (cos_theta - 1.0).abs() <= config.parallel_epsilon || cross_squared == 0.0 {
            debug!("directions are parallel, no rotation");
            Matrix3::identity()
        } else {
            // Rodrigues: R = I + K + K²(1 - cosθ)/|a × b|²
            let k = cross.cross_matrix();
            let scale = (1.0 - cos_theta) / cross_squared;
            Matrix3::identity() + k + k * k * scale
        };

        if !Self::is_rigid_rotation(&rotation, config.orthonormal_tolerance) {
            warn!("rotation block failed the orthonormality check: {rotation}");
            return Err(AlignError::NotRigid);
        }
        Ok(rotation)
    }

    /// 180° rotation mapping unit `a` onto `-a`: `R = 2vvᵀ - I` for a unit
    /// axis `v` perpendicular to `a`.
    fn half_turn(config: &AlignConfig, a: &Vector3<f64>) -> AlignResult<Matrix3<f64>> {
        let axes = world_axes();
        // An axis (anti)parallel to `a` has no usable cross product
        let collinear: Vec<bool> = axes
            .iter()
            .map(|axis| (a.dot(axis).abs() - 1.0).abs() <= config.parallel_epsilon)
            .collect();
        let (index, _) = first_non_match(&collinear, true)
            .ok_or_else(|| AlignError::degenerate("no world axis is independent of the direction"))?;
        debug!("half turn uses world axis {index} as reference");

        let v = a.cross(&axes[index]).normalize();
        Ok(v * v.transpose() * 2.0 - Matrix3::identity())
    }

    /// `true` when `rotation` is orthonormal with determinant +1.
    pub fn is_rigid_rotation(rotation: &Matrix3<f64>, tolerance: f64) -> bool {
        let deviation = (rotation * rotation.transpose() - Matrix3::identity()).norm();
        deviation <= tolerance && (rotation.determinant() - 1.0).abs() <= tolerance
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f64>) -> Matrix4<f64> {
        Matrix4::new_translation(offset)
    }

    /// Orbit matrix for a preview rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f64> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }
}

/// Unit vector along `direction`.
///
/// Divides by the largest component first so huge inputs do not overflow
/// the squared length.
fn unit_direction(
    config: &AlignConfig,
    direction: &Vector3<f64>,
    name: &str,
) -> AlignResult<Vector3<f64>> {
    if direction.iter().any(|c| !c.is_finite()) {
        return Err(AlignError::degenerate(format!("{name} is not finite")));
    }
    let scale = direction.amax();
    let scaled = direction / scale;
    let length = scale * scaled.norm();
    if scale == 0.0 || length * length < config.degenerate_epsilon {
        return Err(AlignError::degenerate(format!("{name} has zero length")));
    }
    Ok(scaled / scaled.norm())
}
