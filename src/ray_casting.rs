//! Ray casting against the scene's primitives.
//!
//! Rays run from the near plane to the far plane through a window point, so
//! the ray parameter `t` is 0 on the near plane and 1 on the far plane.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::Result;
use crate::math;
use crate::projection::ViewProjection;

/// 3D ray for intersection testing
#[derive(Debug, Clone)]
pub(crate) struct Ray {
    pub(crate) origin: Point3<f32>,
    /// Not normalized: `origin + direction` is the far end
    pub(crate) direction: Vector3<f32>,
}

impl Ray {
    pub(crate) fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box in 3D space
#[derive(Debug, Clone)]
pub(crate) struct AABB {
    pub(crate) min: Point3<f32>,
    pub(crate) max: Point3<f32>,
}

impl AABB {
    /// A cube-shaped box centered at a point with the given side
    pub(crate) fn from_center_size(center: Point3<f32>, size: f32) -> Self {
        let half = Vector3::repeat(size * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }
}

/// Ray from the near plane to the far plane through window point `(x, y)`
pub(crate) fn ray_through_window(vp: &ViewProjection, x: f32, y: f32) -> Result<Ray> {
    let near = vp.unproject(x, y, 0.0)?;
    let far = vp.unproject(x, y, 1.0)?;
    Ok(Ray {
        origin: near,
        direction: far - near,
    })
}

/// Entry and exit parameters of a ray through a box, using the slab method.
///
/// Returns `None` when the ray misses or the box lies entirely behind the
/// origin. The entry parameter is negative when the origin is inside.
pub(crate) fn ray_aabb_intersection(ray: &Ray, aabb: &AABB) -> Option<(f32, f32)> {
    let inv_dir = ray.direction.map(|d| 1.0 / d);

    let t1 = (aabb.min - ray.origin).component_mul(&inv_dir);
    let t2 = (aabb.max - ray.origin).component_mul(&inv_dir);

    // latest entry across the three slabs, earliest exit
    let tmin = t1.x.min(t2.x).max(t1.y.min(t2.y)).max(t1.z.min(t2.z));
    let tmax = t1.x.max(t2.x).min(t1.y.max(t2.y)).min(t1.z.max(t2.z));

    if tmax < 0.0 || tmin > tmax {
        None
    } else {
        Some((tmin, tmax))
    }
}

/// Entry and exit parameters of a ray through a sphere
pub(crate) fn ray_sphere_intersection(ray: &Ray, center: &Point3<f32>, radius: f32) -> Option<(f32, f32)> {
    let a = ray.direction.norm_squared();
    if a < math::EPSILON {
        return None;
    }
    let to_origin = ray.origin - center;
    let b = to_origin.dot(&ray.direction);
    let c = to_origin.norm_squared() - radius * radius;
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let (enter, exit) = ((-b - root) / a, (-b + root) / a);
    if exit < 0.0 { None } else { Some((enter, exit)) }
}

/// Entry and exit parameters of a ray through a rotated cube.
///
/// The ray is moved into the cube's local frame, where the cube is an
/// axis-aligned box; rotations preserve the ray parameter.
pub(crate) fn ray_cube_intersection(
    ray: &Ray,
    center: &Point3<f32>,
    rotation: &Matrix4<f32>,
    side: f32,
) -> Option<(f32, f32)> {
    let inverse = math::linear_part(rotation).transpose();
    let local = Ray {
        origin: Point3::from(inverse * (ray.origin - center)),
        direction: inverse * ray.direction,
    };
    ray_aabb_intersection(&local, &AABB::from_center_size(Point3::origin(), side))
}
