//! Arcball rotation controller.
//!
//! Maps screen positions onto a virtual unit hemisphere facing the viewer and
//! turns consecutive pairs of hemisphere points into rotation matrices. The
//! same controller drives object, group and whole-scene rotation; only the
//! anchor of the virtual sphere differs.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{Result, SceneError};
use crate::math::{self, EPSILON};
use crate::projection::ViewProjection;

/// Where the arcball's virtual sphere sits on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Anchor {
    /// Sphere around a world-space point, sized by its projected radius
    World { center: Point3<f32>, radius: f32 },
    /// Sphere centered in the viewport, reaching its corners
    Viewport,
}

#[derive(Debug, Clone)]
pub(crate) struct ArcBall {
    anchor: Anchor,
    /// Hemisphere point at the start of the current step
    initial_pt: Vector3<f32>,
    /// Hemisphere point at the end of the last step
    final_pt: Vector3<f32>,
}

impl ArcBall {
    pub(crate) fn new(anchor: Anchor) -> Self {
        Self {
            anchor,
            initial_pt: Vector3::z(),
            final_pt: Vector3::z(),
        }
    }

    /// An arcball around a world-space sphere
    pub(crate) fn world(center: Point3<f32>, radius: f32) -> Self {
        Self::new(Anchor::World { center, radius })
    }

    /// An arcball spanning the whole viewport, used for scene rotation
    pub(crate) fn viewport() -> Self {
        Self::new(Anchor::Viewport)
    }

    #[cfg(test)]
    pub(crate) fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    pub(crate) fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    #[cfg(test)]
    pub(crate) fn initial_pt(&self) -> &Vector3<f32> {
        &self.initial_pt
    }

    #[cfg(test)]
    pub(crate) fn final_pt(&self) -> &Vector3<f32> {
        &self.final_pt
    }

    /// Screen-space center and radius of the virtual sphere
    fn screen_disk(&self, vp: &ViewProjection) -> Result<((f32, f32), f32)> {
        let (center, radius) = match self.anchor {
            Anchor::World { center, radius } => {
                let screen_center = vp.project(&center);
                let border = center + vp.camera_up() * radius;
                let screen_border = vp.project(&border);
                let screen_radius =
                    (screen_border.x - screen_center.x).hypot(screen_border.y - screen_center.y);
                ((screen_center.x, screen_center.y), screen_radius)
            }
            Anchor::Viewport => (vp.viewport().center(), vp.viewport().half_diagonal()),
        };

        if !(radius.is_finite() && center.0.is_finite() && center.1.is_finite()) || radius < EPSILON
        {
            return Err(SceneError::DegenerateAnchor);
        }
        Ok((center, radius))
    }

    /// Maps window coordinates onto the unit hemisphere, in world orientation.
    ///
    /// Points outside the projected disk are clamped to its rim (z = 0). The
    /// result is un-rotated by the view so it stays put while the camera
    /// itself turns during a drag.
    pub(crate) fn screen_to_sphere(&self, vp: &ViewProjection, x: f32, y: f32) -> Result<Vector3<f32>> {
        let ((cx, cy), screen_radius) = self.screen_disk(vp)?;

        let mut sx = (x - cx) / screen_radius;
        let mut sy = (y - cy) / screen_radius;
        let r = sx * sx + sy * sy;
        let sz = if r > 1.0 {
            let norm = r.sqrt();
            sx /= norm;
            sy /= norm;
            0.0
        } else {
            (1.0 - r).sqrt()
        };

        let eye_point = Vector3::new(sx, sy, sz);
        Ok(math::transform_vector(&vp.view_rotation().transpose(), &eye_point))
    }

    /// Starts a drag at the given window position
    pub(crate) fn set_initial_pt(&mut self, vp: &ViewProjection, x: f32, y: f32) -> Result<()> {
        self.initial_pt = self.screen_to_sphere(vp, x, y)?;
        self.final_pt = self.initial_pt;
        Ok(())
    }

    /// Advances the drag and returns the rotation since the previous step.
    ///
    /// The final point becomes the next initial point, so consecutive calls
    /// compose incrementally. `inverse` returns the transpose, which is the
    /// inverse for a rotation.
    pub(crate) fn set_final_pt(
        &mut self,
        vp: &ViewProjection,
        x: f32,
        y: f32,
        inverse: bool,
    ) -> Result<Matrix4<f32>> {
        self.final_pt = self.screen_to_sphere(vp, x, y)?;
        let rotation = rotation_between(&self.initial_pt, &self.final_pt);
        self.initial_pt = self.final_pt;

        if inverse {
            Ok(rotation.transpose())
        } else {
            Ok(rotation)
        }
    }
}

/// Rotation taking `from` onto `to` about their common normal.
///
/// No movement, opposite points and degenerate inputs all have a zero cross
/// product and return exactly the identity.
pub(crate) fn rotation_between(from: &Vector3<f32>, to: &Vector3<f32>) -> Matrix4<f32> {
    let axis = math::cross(from, to);
    if math::length(&axis) < EPSILON {
        return Matrix4::identity();
    }
    math::axis_angle_matrix(&axis, math::angle_degrees(from, to))
}
