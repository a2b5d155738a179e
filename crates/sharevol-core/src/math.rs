//! Matrix stack and quaternion helpers shared by both renderers.

use glam::{Mat4, Quat, Vec3};

/// Near clipping distance used by every perspective projection.
pub const NEAR_PLANE: f32 = 0.1;

/// Far clipping distance used by every perspective projection.
pub const FAR_PLANE: f32 = 100.0;

/// A model-view matrix with a push/pop save stack.
///
/// Operations post-multiply the current matrix, so a chain of
/// `translate` / `rotate` / `scale` calls reads in the order the
/// transforms are applied to the model.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    /// Creates a stack holding the identity matrix.
    pub fn new() -> Self {
        Self {
            current: Mat4::IDENTITY,
            saved: Vec::new(),
        }
    }

    /// Resets the current matrix to identity.
    pub fn identity(&mut self) -> &mut Self {
        self.current = Mat4::IDENTITY;
        self
    }

    /// Saves the current matrix.
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restores the most recently saved matrix.
    ///
    /// Popping an empty stack leaves the current matrix unchanged.
    pub fn pop(&mut self) {
        if let Some(m) = self.saved.pop() {
            self.current = m;
        }
    }

    /// Returns the number of saved matrices.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Applies a translation.
    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.current *= Mat4::from_translation(offset);
        self
    }

    /// Applies a rotation of `degrees` about `axis`.
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) -> &mut Self {
        self.current *= Mat4::from_axis_angle(axis.normalize(), degrees.to_radians());
        self
    }

    /// Applies a non-uniform scale.
    pub fn scale(&mut self, factors: Vec3) -> &mut Self {
        self.current *= Mat4::from_scale(factors);
        self
    }

    /// Post-multiplies by an arbitrary matrix.
    pub fn mult(&mut self, m: Mat4) -> &mut Self {
        self.current *= m;
        self
    }

    /// Returns the current matrix.
    pub fn matrix(&self) -> Mat4 {
        self.current
    }
}

/// OpenGL-convention perspective projection with the field of view in degrees.
pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_degrees.to_radians(), aspect, near, far)
}

/// Normalized rotation of `degrees` about `axis`.
pub fn axis_rotation(degrees: f32, axis: Vec3) -> Quat {
    Quat::from_axis_angle(axis.normalize(), degrees.to_radians()).normalize()
}

/// Pre-multiplies `current` by a rotation of `degrees` about `axis`.
pub fn rotate_quat(current: Quat, degrees: f32, axis: Vec3) -> Quat {
    axis_rotation(degrees, axis) * current
}

/// Builds an orientation from scene Euler angles in degrees.
///
/// Angles are applied Z first, then Y, then X, each negated.
pub fn quat_from_scene_euler(angles: Vec3) -> Quat {
    let q = rotate_quat(Quat::IDENTITY, -angles.z, Vec3::Z);
    let q = rotate_quat(q, -angles.y, Vec3::Y);
    rotate_quat(q, -angles.x, Vec3::X)
}

/// Interprets a scene `rotate` record, either Euler degrees or an `[x, y, z, w]` quaternion.
///
/// Returns `None` for a quaternion whose w component is zero, or for any
/// other element count.
pub fn quat_from_scene_rotate(values: &[f32]) -> Option<Quat> {
    match values {
        [x, y, z] => Some(quat_from_scene_euler(Vec3::new(*x, *y, *z))),
        [x, y, z, w] if *w != 0.0 => Some(Quat::from_xyzw(*x, *y, *z, *w)),
        _ => None,
    }
}
