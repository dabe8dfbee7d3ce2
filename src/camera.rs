use log::trace;
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::CameraConfig;
use crate::error::{Result, SceneError};
use crate::math;
use crate::projection::{ViewProjection, Viewport};

/// Free-flying perspective camera.
///
/// `up`, `pointer` and `left` always form an orthonormal basis; every
/// rotation re-orthonormalises them so f32 drift cannot accumulate.
#[derive(Debug, Clone)]
pub(crate) struct Camera {
    config: CameraConfig,
    position: Point3<f32>,
    up: Vector3<f32>,
    pointer: Vector3<f32>,
    left: Vector3<f32>,
    /// Every rotation applied since the last reset, latest on the left
    rotation: Matrix4<f32>,
    /// Vertical field of view in degrees
    fov: f32,
    near: f32,
    far: f32,
    aspect: f32,
}

impl Camera {
    pub(crate) fn new(config: CameraConfig) -> Self {
        Self {
            position: config.position,
            up: config.up,
            pointer: config.pointer,
            left: config.left,
            rotation: Matrix4::identity(),
            fov: config.fov,
            near: config.near,
            far: config.far,
            aspect: 1.0,
            config,
        }
    }

    pub(crate) fn position(&self) -> &Point3<f32> {
        &self.position
    }

    pub(crate) fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    #[cfg(test)]
    pub(crate) fn up(&self) -> &Vector3<f32> {
        &self.up
    }

    #[cfg(test)]
    pub(crate) fn pointer(&self) -> &Vector3<f32> {
        &self.pointer
    }

    #[cfg(test)]
    pub(crate) fn left(&self) -> &Vector3<f32> {
        &self.left
    }

    pub(crate) fn rotation(&self) -> &Matrix4<f32> {
        &self.rotation
    }

    pub(crate) fn fov(&self) -> f32 {
        self.fov
    }

    #[cfg(test)]
    pub(crate) fn near(&self) -> f32 {
        self.near
    }

    #[cfg(test)]
    pub(crate) fn far(&self) -> f32 {
        self.far
    }

    #[cfg(test)]
    pub(crate) fn aspect(&self) -> f32 {
        self.aspect
    }

    pub(crate) fn build_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &(self.position + self.pointer), &self.up)
    }

    fn perspective(&self, aspect: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect, self.fov.to_radians(), self.near, far)
    }

    pub(crate) fn build_projection_matrix(&self) -> Matrix4<f32> {
        self.perspective(self.aspect, self.far)
    }

    /// Updates the aspect ratio from the drawable size
    pub(crate) fn set_lens(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// View and projection for the given viewport, using the lens set by [`Camera::set_lens`]
    pub(crate) fn view_projection(&self, viewport: Viewport) -> ViewProjection {
        ViewProjection::new(self.build_view_matrix(), self.build_projection_matrix(), viewport)
    }

    /// The fixed point scene rotations turn about: halfway down the depth range
    pub(crate) fn pivot(&self) -> Point3<f32> {
        self.position + self.pointer * (self.far - self.near) * 0.5
    }

    /// Rotates the camera about its pivot and records the rotation
    pub(crate) fn rotate(&mut self, rotation: &Matrix4<f32>) {
        debug_assert!(math::is_orthonormal(rotation, 1e-3));
        let transform = math::rotation_about_pivot(&self.pivot(), rotation);

        self.position = math::transform_point(&transform, &self.position);
        self.up = math::transform_vector(&transform, &self.up);
        self.pointer = math::transform_vector(&transform, &self.pointer);
        self.left = math::transform_vector(&transform, &self.left);
        self.rotation = math::matrix_by_matrix(rotation, &self.rotation);
        self.orthonormalize();

        trace!("camera rotated, eye at {:?}", self.position);
    }

    fn orthonormalize(&mut self) {
        self.pointer = self.pointer.normalize();
        self.up = (self.up - self.pointer * self.up.dot(&self.pointer)).normalize();
        self.left = self.up.cross(&self.pointer);
    }

    pub(crate) fn move_up(&mut self) {
        self.position += self.up * self.config.move_step;
    }

    pub(crate) fn move_down(&mut self) {
        self.position -= self.up * self.config.move_step;
    }

    pub(crate) fn move_left(&mut self) {
        self.position += self.left * self.config.move_step;
    }

    pub(crate) fn move_right(&mut self) {
        self.position -= self.left * self.config.move_step;
    }

    pub(crate) fn move_forward(&mut self) {
        self.position += self.pointer * self.config.move_step;
    }

    pub(crate) fn move_backward(&mut self) {
        self.position -= self.pointer * self.config.move_step;
    }

    /// World position under a window point, on the plane midway between near and far.
    ///
    /// The far plane is pulled in to `(far - near) / 2` and the point is
    /// unprojected at the maximum depth of that shortened frustum.
    pub(crate) fn scene_position(&self, viewport: Viewport, x: f32, y: f32) -> Result<Point3<f32>> {
        let mid_far = (self.far - self.near) * 0.5;
        let vp = self
            .view_projection(viewport)
            .with_projection(self.perspective(self.aspect, mid_far));
        vp.unproject(x, y, 1.0)
    }

    /// Narrows the field of view by one step
    pub(crate) fn zoom_in(&mut self) {
        self.fov = (self.fov - self.config.zoom_step).clamp(self.config.min_fov, self.config.max_fov);
    }

    /// Widens the field of view by one step
    pub(crate) fn zoom_out(&mut self) {
        self.fov = (self.fov + self.config.zoom_step).clamp(self.config.min_fov, self.config.max_fov);
    }

    pub(crate) fn set_fov(&mut self, fov: f32) -> Result<()> {
        if !(self.config.min_fov..=self.config.max_fov).contains(&fov) {
            return Err(SceneError::InvalidFov(fov));
        }
        self.fov = fov;
        Ok(())
    }

    /// Restores position, orientation and field of view from the configuration
    pub(crate) fn reset(&mut self) {
        self.position = self.config.position;
        self.up = self.config.up;
        self.pointer = self.config.pointer;
        self.left = self.config.left;
        self.rotation = Matrix4::identity();
        self.reset_fovy();
    }

    pub(crate) fn reset_fovy(&mut self) {
        self.fov = self.config.fov;
    }

    /// Backs the camera away along its pointer until the sphere fills the view
    pub(crate) fn look_at_sphere(&mut self, center: &Point3<f32>, radius: f32) {
        self.reset_fovy();
        let distance = radius / (self.fov * 0.5).to_radians().sin();
        self.position = *center - self.pointer * distance;
    }
}

/// Maps OpenGL clip depth `[-1, 1]` onto the `[0, 1]` range wgpu expects
#[rustfmt::skip]
fn opengl_to_wgpu() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct CameraUniform {
    pub(crate) view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub(crate) fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }

    pub(crate) fn update_view_proj(&mut self, view_proj: &Matrix4<f32>) {
        self.view_proj = (opengl_to_wgpu() * view_proj).into();
    }
}
