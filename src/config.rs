//! Editor configuration.
//!
//! All defaults live in immutable structs handed to the components that need
//! them; resetting the camera reads its own copy instead of shared globals.

use nalgebra::{Point3, Vector3, Vector4};

use crate::error::{Result, SceneError};
use crate::math;

/// Initial camera placement, lens and movement steps
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CameraConfig {
    /// Eye position in world space
    pub(crate) position: Point3<f32>,
    /// Unit up direction
    pub(crate) up: Vector3<f32>,
    /// Unit viewing direction
    pub(crate) pointer: Vector3<f32>,
    /// Unit direction to the camera's left, `up × pointer`
    pub(crate) left: Vector3<f32>,
    /// Vertical field of view in degrees
    pub(crate) fov: f32,
    pub(crate) near: f32,
    pub(crate) far: f32,
    /// Distance covered by one move command
    pub(crate) move_step: f32,
    /// Degrees of field of view changed by one zoom command
    pub(crate) zoom_step: f32,
    pub(crate) min_fov: f32,
    pub(crate) max_fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 3.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            pointer: Vector3::new(0.0, 0.0, -1.0),
            left: Vector3::new(-1.0, 0.0, 0.0),
            fov: 45.0,
            near: 1.0,
            far: 21.0,
            move_step: 0.1,
            zoom_step: 1.0,
            min_fov: 1.0,
            max_fov: 179.0,
        }
    }
}

impl CameraConfig {
    /// Builds a configuration from raw component slices (3 or 4 components each)
    pub(crate) fn from_slices(
        position: &[f32],
        up: &[f32],
        pointer: &[f32],
        left: &[f32],
    ) -> Result<Self> {
        let config = Self {
            position: math::point_from_slice(position)?,
            up: math::vector_from_slice(up)?,
            pointer: math::vector_from_slice(pointer)?,
            left: math::vector_from_slice(left)?,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the lens and the orthonormality of the basis
    pub(crate) fn validate(&self) -> Result<()> {
        let mid_far = (self.far - self.near) * 0.5;
        if !(self.near > 0.0 && self.near < self.far && mid_far > self.near) {
            return Err(SceneError::InvalidClipPlanes {
                near: self.near,
                far: self.far,
            });
        }
        if !(self.min_fov > 0.0 && self.max_fov < 180.0 && self.min_fov <= self.max_fov) {
            return Err(SceneError::InvalidFov(self.min_fov));
        }
        if !(self.min_fov..=self.max_fov).contains(&self.fov) {
            return Err(SceneError::InvalidFov(self.fov));
        }

        const TOLERANCE: f32 = 1e-4;
        let basis = [self.up, self.pointer, self.left];
        let unit = basis.iter().all(|v| (v.norm() - 1.0).abs() < TOLERANCE);
        let orthogonal = self.up.dot(&self.pointer).abs() < TOLERANCE
            && self.up.dot(&self.left).abs() < TOLERANCE
            && self.pointer.dot(&self.left).abs() < TOLERANCE;
        if !(unit && orthogonal) {
            return Err(SceneError::NonOrthonormalBasis);
        }
        Ok(())
    }
}

/// Fixed colors used when drawing the scene
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Palette {
    pub(crate) unselected: Vector4<f32>,
    pub(crate) selected: Vector4<f32>,
    /// Halo drawn around an object while it is being rotated
    pub(crate) rotating: Vector4<f32>,
    /// Group bounding indicator while idle
    pub(crate) group_idle: Vector4<f32>,
    /// Group bounding indicator during a rotation drag
    pub(crate) group_rotating: Vector4<f32>,
    pub(crate) background: Vector4<f32>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            unselected: Vector4::new(1.0, 0.0, 0.0, 1.0),
            selected: Vector4::new(0.0, 1.0, 0.0, 1.0),
            rotating: Vector4::new(0.3, 0.6, 1.0, 1.0),
            group_idle: Vector4::new(0.1, 0.3, 0.5, 0.2),
            group_rotating: Vector4::new(0.1, 0.3, 0.5, 0.6),
            background: Vector4::new(0.6, 0.7, 0.9, 1.0),
        }
    }
}

/// Top-level editor settings
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EditorConfig {
    pub(crate) camera: CameraConfig,
    /// Size given to newly created objects until the size control changes
    pub(crate) creation_size: f32,
    pub(crate) min_size: f32,
    pub(crate) max_size: f32,
    /// Side of the square pick region in pixels
    pub(crate) pick_size: f32,
    /// Vertical pixels of middle-button drag per zoom step
    pub(crate) zoom_pixels_per_step: f32,
    /// Slices and stacks used to tessellate wire spheres
    pub(crate) wire_segments: usize,
    pub(crate) palette: Palette,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            creation_size: 0.5,
            min_size: 0.1,
            max_size: 5.0,
            pick_size: 2.0,
            zoom_pixels_per_step: 4.0,
            wire_segments: 20,
            palette: Palette::default(),
        }
    }
}

impl EditorConfig {
    /// Coarser tessellation and a larger pick region, for slow machines or touch input
    pub(crate) fn coarse() -> Self {
        Self {
            pick_size: 6.0,
            wire_segments: 12,
            ..Default::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.camera.validate()?;
        if !(self.min_size > 0.0 && self.min_size <= self.max_size) {
            return Err(SceneError::InvalidSize(self.min_size));
        }
        if !(self.min_size..=self.max_size).contains(&self.creation_size) {
            return Err(SceneError::InvalidSize(self.creation_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EditorConfig::default().validate(), Ok(()));
        assert_eq!(EditorConfig::coarse().validate(), Ok(()));
    }

    #[test]
    fn slices_build_camera_config() {
        let config = CameraConfig::from_slices(
            &[0.0, 0.0, 5.0, 1.0],
            &[0.0, 1.0, 0.0, 0.0],
            &[0.0, 0.0, -1.0, 0.0],
            &[-1.0, 0.0, 0.0, 0.0],
        )
        .unwrap();
        assert_eq!(config.position, Point3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn short_slices_are_rejected() {
        let result = CameraConfig::from_slices(&[0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, -1.0], &[-1.0, 0.0, 0.0]);
        assert!(matches!(result, Err(SceneError::DimensionMismatch { found: 2, .. })));
    }

    #[test]
    fn skewed_basis_is_rejected() {
        let result = CameraConfig::from_slices(&[0.0, 0.0, 3.0], &[0.0, 1.0, 0.0], &[0.0, 0.6, -0.8], &[-1.0, 0.0, 0.0]);
        assert_eq!(result, Err(SceneError::NonOrthonormalBasis));
    }

    #[test]
    fn clip_planes_must_leave_room_for_mid_plane() {
        let config = CameraConfig {
            near: 1.0,
            far: 2.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SceneError::InvalidClipPlanes { .. })));
    }

    #[test]
    fn fov_outside_range_is_rejected() {
        let config = CameraConfig {
            fov: 180.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SceneError::InvalidFov(180.0)));
    }
}
