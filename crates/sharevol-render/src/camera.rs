//! Orbit camera for the volume raycaster.
//!
//! The camera keeps a translation, a rotation quaternion and a focal point.
//! Two model-view chains are derived from it: [`OrbitCamera::model_view`]
//! for lines drawn in model space, and [`OrbitCamera::ray_model_view`],
//! which additionally maps the anisotropic bounding box onto a unit cube so
//! the raycast step size does not depend on voxel scale.

use glam::{Mat4, Quat, Vec3};
use sharevol_core::math::{self, MatrixStack, FAR_PLANE, NEAR_PLANE};

/// Default vertical field of view in degrees.
pub const DEFAULT_FOV: f32 = 45.0;

/// Degrees of rotation per pixel of pointer drag.
pub const ROTATE_DIVISOR: f32 = 5.0;

/// Orbit camera state.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    translate: Vec3,
    rotate: Quat,
    focus: Vec3,
    centre: Vec3,
    scaling: Vec3,
    model_size: f32,
    orientation: f32,
    fov: f32,
    near: f32,
}

impl OrbitCamera {
    /// Creates a camera framing a bounding box of size `scaling`.
    pub fn new(scaling: Vec3) -> Self {
        let model_size = 3.0_f32.sqrt();
        let centre = scaling * 0.5;
        log::debug!("new model size: {model_size}, focal point: {centre}");
        Self {
            translate: Vec3::new(0.0, 0.0, -model_size * 1.25),
            rotate: Quat::IDENTITY,
            focus: centre,
            centre,
            scaling,
            model_size,
            orientation: 1.0,
            fov: DEFAULT_FOV,
            near: NEAR_PLANE,
        }
    }

    pub fn translate(&self) -> Vec3 {
        self.translate
    }

    pub fn set_translate(&mut self, translate: Vec3) {
        self.translate = translate;
    }

    pub fn rotation(&self) -> Quat {
        self.rotate
    }

    pub fn set_rotation(&mut self, rotate: Quat) {
        self.rotate = rotate.normalize();
    }

    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Vec3) {
        self.focus = focus;
    }

    pub fn centre(&self) -> Vec3 {
        self.centre
    }

    pub fn scaling(&self) -> Vec3 {
        self.scaling
    }

    pub fn model_size(&self) -> f32 {
        self.model_size
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Near clipping distance.
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Rotates by `degrees` about `axis`, applied after the current rotation.
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        self.rotate = math::rotate_quat(self.rotate, degrees, axis);
    }

    pub fn rotate_x(&mut self, degrees: f32) {
        self.rotate(degrees, Vec3::X);
    }

    pub fn rotate_y(&mut self, degrees: f32) {
        self.rotate(degrees, Vec3::Y);
    }

    pub fn rotate_z(&mut self, degrees: f32) {
        self.rotate(degrees, Vec3::Z);
    }

    /// Dollies along the view axis by `factor` model sizes.
    pub fn zoom(&mut self, factor: f32) {
        self.translate.z += factor * self.model_size;
    }

    /// Pans by a pointer delta in pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let adjust = self.model_size / 1000.0;
        self.translate.x += dx * adjust;
        self.translate.y -= dy * adjust;
    }

    /// Moves the near clipping plane, keeping it in front of the far plane.
    pub fn adjust_near(&mut self, delta: f32) {
        self.near = (self.near + delta).clamp(0.01, FAR_PLANE * 0.5);
    }

    /// Model-view matrix for model-space geometry.
    pub fn model_view(&self) -> Mat4 {
        let offset = self.focus - self.centre;
        let mut stack = MatrixStack::new();
        stack
            .translate(self.translate)
            .translate(-offset)
            .mult(Mat4::from_quat(self.rotate))
            .translate(offset)
            .translate(Vec3::new(
                -self.focus.x,
                -self.focus.y,
                -self.focus.z * self.orientation,
            ));
        stack.matrix()
    }

    /// Model-view matrix for the raycast pass.
    pub fn ray_model_view(&self) -> Mat4 {
        let mut stack = MatrixStack::new();
        stack
            .translate(self.translate)
            .mult(Mat4::from_quat(self.rotate))
            .translate(-self.scaling * 0.5)
            .scale(self.scaling.recip());
        stack.matrix()
    }

    /// Perspective projection for a viewport aspect ratio.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        math::perspective(self.fov, aspect, self.near, FAR_PLANE)
    }

    /// Inverse of [`OrbitCamera::projection`].
    pub fn inv_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect).inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let cam = OrbitCamera::new(Vec3::ONE);
        assert!((cam.translate().z + 3.0_f32.sqrt() * 1.25).abs() < 1e-6);
        assert_eq!(cam.focus(), Vec3::splat(0.5));
        assert_eq!(cam.rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_model_view_centres_focus() {
        let cam = OrbitCamera::new(Vec3::new(1.0, 0.5, 0.25));
        let p = cam.model_view().transform_point3(cam.focus());
        assert!((p - cam.translate()).length() < 1e-5);
    }

    #[test]
    fn test_ray_model_view_maps_unit_cube_centre() {
        let cam = OrbitCamera::new(Vec3::ONE);
        let p = cam.ray_model_view().transform_point3(Vec3::splat(1.0));
        // unit scaling: corner (1,1,1) lands half a unit off the translation
        assert!((p - (cam.translate() + Vec3::splat(0.5))).length() < 1e-5);
    }

    #[test]
    fn test_zoom_and_pan() {
        let mut cam = OrbitCamera::new(Vec3::ONE);
        let z = cam.translate().z;
        cam.zoom(0.05);
        assert!((cam.translate().z - (z + 0.05 * cam.model_size())).abs() < 1e-6);
        cam.pan(1000.0, 1000.0);
        assert!((cam.translate().x - cam.model_size()).abs() < 1e-5);
        assert!((cam.translate().y + cam.model_size()).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_composes_on_the_left() {
        let mut cam = OrbitCamera::new(Vec3::ONE);
        cam.rotate_y(90.0);
        cam.rotate_x(90.0);
        let expected = math::axis_rotation(90.0, Vec3::X) * math::axis_rotation(90.0, Vec3::Y);
        assert!(cam.rotation().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_inverse_projection() {
        let cam = OrbitCamera::new(Vec3::ONE);
        let m = cam.projection(1.5) * cam.inv_projection(1.5);
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }
}
