//! Vector and matrix helpers shared by the camera, arcballs and groups.
//!
//! Positions are `Point3` (homogeneous w = 1) and directions are `Vector3`
//! (w = 0). Matrices follow nalgebra's column-vector convention, so `a * b`
//! applies `b` first.

use nalgebra::{Matrix3, Matrix4, Point3, Unit, Vector3};

use crate::error::{Result, SceneError};

/// Lengths below this are treated as zero when deriving axes and angles
pub(crate) const EPSILON: f32 = 1e-6;

/// Cross product of two 3-component vectors
pub(crate) fn cross(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    a.cross(b)
}

pub(crate) fn length(v: &Vector3<f32>) -> f32 {
    v.norm()
}

/// Euclidean distance between two points
pub(crate) fn distance(a: &Point3<f32>, b: &Point3<f32>) -> f32 {
    (b - a).norm()
}

/// Angle between two vectors in degrees.
///
/// The cosine is clamped to `[-1, 1]` before `acos` so rounding on nearly
/// parallel inputs cannot push it out of the domain. Parallel and
/// antiparallel inputs (zero cross product) snap to exactly 0 and 180.
/// Zero-length inputs have no direction and yield 0.
pub(crate) fn angle_degrees(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    let lengths = length(a) * length(b);
    if lengths < EPSILON {
        return 0.0;
    }
    let dot = a.dot(b);
    if length(&cross(a, b)) <= EPSILON * lengths {
        return if dot < 0.0 { 180.0 } else { 0.0 };
    }
    (dot / lengths).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Vector from `from` to `to`
pub(crate) fn vector_between(from: &Point3<f32>, to: &Point3<f32>) -> Vector3<f32> {
    to - from
}

/// Shifts `point` by `shift`
pub(crate) fn apply_vector(point: &Point3<f32>, shift: &Vector3<f32>) -> Point3<f32> {
    point + shift
}

/// Product `a * b`: the result applies `b` first, then `a`
pub(crate) fn matrix_by_matrix(a: &Matrix4<f32>, b: &Matrix4<f32>) -> Matrix4<f32> {
    a * b
}

/// Transforms a point, including translation and the homogeneous divide
pub(crate) fn transform_point(m: &Matrix4<f32>, p: &Point3<f32>) -> Point3<f32> {
    m.transform_point(p)
}

/// Transforms a direction; translation does not apply
pub(crate) fn transform_vector(m: &Matrix4<f32>, v: &Vector3<f32>) -> Vector3<f32> {
    m.transform_vector(v)
}

/// Rotation of `angle_degrees` about `axis`, right-handed.
///
/// A zero-length axis has no defined rotation and yields the identity.
pub(crate) fn axis_angle_matrix(axis: &Vector3<f32>, angle_degrees: f32) -> Matrix4<f32> {
    match Unit::try_new(*axis, EPSILON) {
        Some(axis) => {
            nalgebra::Rotation3::from_axis_angle(&axis, angle_degrees.to_radians()).to_homogeneous()
        }
        None => Matrix4::identity(),
    }
}

/// `T(pivot) * rotation * T(-pivot)`: rotates about `pivot` instead of the origin
pub(crate) fn rotation_about_pivot(pivot: &Point3<f32>, rotation: &Matrix4<f32>) -> Matrix4<f32> {
    Matrix4::new_translation(&pivot.coords) * rotation * Matrix4::new_translation(&-pivot.coords)
}

/// The upper-left 3x3 block of a homogeneous transform
pub(crate) fn linear_part(m: &Matrix4<f32>) -> Matrix3<f32> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// True when the rotation block satisfies `Rᵀ·R ≈ I`
pub(crate) fn is_orthonormal(m: &Matrix4<f32>, tolerance: f32) -> bool {
    let r = linear_part(m);
    let error = r.transpose() * r - Matrix3::identity();
    error.iter().all(|e| e.abs() <= tolerance)
}

/// Builds a point from 3 components, or 4 homogeneous ones.
///
/// A 4-component slice with `w` other than 0 or 1 is divided through by `w`.
pub(crate) fn point_from_slice(values: &[f32]) -> Result<Point3<f32>> {
    match *values {
        [x, y, z] => Ok(Point3::new(x, y, z)),
        [x, y, z, w] if w != 0.0 && w != 1.0 => Ok(Point3::new(x / w, y / w, z / w)),
        [x, y, z, _] => Ok(Point3::new(x, y, z)),
        _ => Err(SceneError::DimensionMismatch {
            expected: "3 or 4",
            found: values.len(),
        }),
    }
}

/// Builds a direction from 3 components, or 4 with the `w` component ignored
pub(crate) fn vector_from_slice(values: &[f32]) -> Result<Vector3<f32>> {
    match *values {
        [x, y, z] | [x, y, z, _] => Ok(Vector3::new(x, y, z)),
        _ => Err(SceneError::DimensionMismatch {
            expected: "3 or 4",
            found: values.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn angle_of_vector_with_itself_is_zero() {
        for v in [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.3, -0.4, 0.866_025_4).normalize(),
            Vector3::new(0.577_350_3, 0.577_350_3, 0.577_350_3),
        ] {
            assert_eq!(angle_degrees(&v, &v), 0.0);
        }
    }

    #[test]
    fn angle_of_opposite_vectors_is_180() {
        for v in [
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.1, 0.7, -0.2).normalize(),
        ] {
            assert_eq!(angle_degrees(&v, &-v), 180.0);
        }
    }

    #[test]
    fn angle_of_zero_vector_is_zero() {
        assert_eq!(angle_degrees(&Vector3::zeros(), &Vector3::x()), 0.0);
    }

    #[test]
    fn angle_between_axes() {
        assert_relative_eq!(angle_degrees(&Vector3::x(), &Vector3::y()), 90.0, epsilon = 1e-4);
    }

    #[test]
    fn cross_product_follows_right_hand_rule() {
        assert_eq!(cross(&Vector3::x(), &Vector3::y()), Vector3::z());
    }

    #[test]
    fn zero_axis_gives_identity() {
        assert_eq!(axis_angle_matrix(&Vector3::zeros(), 90.0), Matrix4::identity());
    }

    #[test]
    fn pivot_stays_fixed_under_rotation() {
        let pivot = Point3::new(1.0, 2.0, 3.0);
        let m = rotation_about_pivot(&pivot, &axis_angle_matrix(&Vector3::z(), 37.0));
        assert_relative_eq!(transform_point(&m, &pivot), pivot, epsilon = 1e-5);
        assert!(is_orthonormal(&m, 1e-5));
    }

    #[test]
    fn vectors_ignore_translation() {
        let m = Matrix4::new_translation(&Vector3::new(5.0, 5.0, 5.0));
        assert_eq!(transform_vector(&m, &Vector3::x()), Vector3::x());
        assert_eq!(transform_point(&m, &Point3::origin()), Point3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn slices_with_wrong_length_are_rejected() {
        assert!(matches!(
            point_from_slice(&[1.0, 2.0]),
            Err(SceneError::DimensionMismatch { found: 2, .. })
        ));
        assert!(vector_from_slice(&[1.0; 5]).is_err());
        assert_eq!(point_from_slice(&[2.0, 4.0, 6.0, 2.0]), Ok(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(vector_from_slice(&[0.0, 1.0, 0.0, 0.0]), Ok(Vector3::y()));
    }

    #[test]
    fn distance_and_shift() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert_relative_eq!(distance(&a, &b), 5.0);
        assert_eq!(apply_vector(&a, &vector_between(&a, &b)), b);
    }
}
