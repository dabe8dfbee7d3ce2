//! Error types for the scene editor core.

use thiserror::Error;

use crate::object::ObjectId;

/// Errors raised at the boundaries of the editor core.
///
/// Degenerate geometry inside the math routines never produces one of these;
/// those cases are clamped or collapse to the identity instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum SceneError {
    /// A vector or point was built from a slice with the wrong component count
    #[error("expected {expected} components, found {found}")]
    DimensionMismatch { expected: &'static str, found: usize },

    /// A command-line component was not a number
    #[error("not a number: {0:?}")]
    InvalidNumber(String),

    /// Object sizes must be finite and strictly positive
    #[error("invalid object size: {0}")]
    InvalidSize(f32),

    /// Clip planes must satisfy 0 < near < far with the mid-depth plane beyond near
    #[error("invalid clip planes: near = {near}, far = {far}")]
    InvalidClipPlanes { near: f32, far: f32 },

    /// Field of view must lie strictly between 0 and 180 degrees
    #[error("invalid field of view: {0} degrees")]
    InvalidFov(f32),

    /// Camera basis vectors must be unit length and mutually orthogonal
    #[error("camera basis is not orthonormal")]
    NonOrthonormalBasis,

    /// The arcball anchor projects to a zero-sized disk on screen
    #[error("arcball anchor has no screen-space extent")]
    DegenerateAnchor,

    /// The handle does not refer to an object in the scene
    #[error("object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    /// The view-projection matrix could not be inverted
    #[error("view-projection matrix is singular")]
    SingularTransform,
}

/// Result type for editor core operations
pub(crate) type Result<T> = std::result::Result<T, SceneError>;
