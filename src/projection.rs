//! Projection between world space and viewport (window) coordinates.
//!
//! Window coordinates put the origin at the bottom-left of the viewport with
//! y increasing upwards, and depth in `[0, 1]` from the near to the far plane.

use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::error::{Result, SceneError};

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Viewport {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Viewport {
    /// A viewport anchored at the window origin
    pub(crate) fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub(crate) fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Distance from the center to a corner
    pub(crate) fn half_diagonal(&self) -> f32 {
        (self.width * 0.5).hypot(self.height * 0.5)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A snapshot of the view and projection matrices plus the viewport they map into.
///
/// Everything that needs to go between screen and world space takes one of
/// these explicitly instead of reaching into shared rendering state.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ViewProjection {
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    viewport: Viewport,
}

impl ViewProjection {
    pub(crate) fn new(view: Matrix4<f32>, projection: Matrix4<f32>, viewport: Viewport) -> Self {
        Self {
            view,
            projection,
            viewport,
        }
    }

    #[cfg(test)]
    pub(crate) fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    #[cfg(test)]
    pub(crate) fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub(crate) fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Combined `projection * view`
    pub(crate) fn matrix(&self) -> Matrix4<f32> {
        self.projection * self.view
    }

    /// Same view and viewport with a different projection
    pub(crate) fn with_projection(&self, projection: Matrix4<f32>) -> Self {
        Self {
            projection,
            ..self.clone()
        }
    }

    /// Maps a world point to window coordinates `(x, y, depth)`.
    ///
    /// Points on the eye plane have no finite projection and come back
    /// non-finite; points behind the eye come back with depth outside `[0, 1]`.
    pub(crate) fn project(&self, point: &Point3<f32>) -> Point3<f32> {
        let clip = self.matrix() * point.to_homogeneous();
        let ndc = clip.xyz() / clip.w;
        Point3::new(
            self.viewport.x + self.viewport.width * (ndc.x * 0.5 + 0.5),
            self.viewport.y + self.viewport.height * (ndc.y * 0.5 + 0.5),
            ndc.z * 0.5 + 0.5,
        )
    }

    /// Maps window coordinates and a depth in `[0, 1]` back to world space
    pub(crate) fn unproject(&self, x: f32, y: f32, depth: f32) -> Result<Point3<f32>> {
        if self.viewport.is_empty() {
            return Err(SceneError::SingularTransform);
        }
        let inverse = self
            .matrix()
            .try_inverse()
            .ok_or(SceneError::SingularTransform)?;
        let ndc = Vector4::new(
            (x - self.viewport.x) / self.viewport.width * 2.0 - 1.0,
            (y - self.viewport.y) / self.viewport.height * 2.0 - 1.0,
            depth * 2.0 - 1.0,
            1.0,
        );
        let world = inverse * ndc;
        if world.w.abs() < f32::EPSILON {
            return Err(SceneError::SingularTransform);
        }
        Ok(Point3::from(world.xyz() / world.w))
    }

    /// The camera's up direction in world space (second row of the view rotation)
    pub(crate) fn camera_up(&self) -> Vector3<f32> {
        Vector3::new(self.view[(1, 0)], self.view[(1, 1)], self.view[(1, 2)])
    }

    /// The view matrix with its translation removed
    pub(crate) fn view_rotation(&self) -> Matrix4<f32> {
        let mut rotation = self.view;
        rotation[(0, 3)] = 0.0;
        rotation[(1, 3)] = 0.0;
        rotation[(2, 3)] = 0.0;
        rotation
    }
}
