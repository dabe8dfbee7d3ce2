//! Primitive solids placed in the scene.
//!
//! Objects are owned by the [`Scene`] and addressed through [`ObjectId`]
//! handles; groups and pickers only ever hold handles.

use std::fmt;

use log::trace;
use nalgebra::{Matrix4, Point3, Vector4};

use crate::arcball::{Anchor, ArcBall};
use crate::config::Palette;
use crate::error::{Result, SceneError};
use crate::math;
use crate::projection::ViewProjection;
use crate::render::{Primitive, Style, Surface};

/// Gap between an object's bounding sphere and the halo drawn while rotating
pub(crate) const HALO_MARGIN: f32 = 0.005;

/// Stable handle to an object in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ObjectId(u64);

/// The solid an object draws, with its defining size
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Shape {
    Cube { side: f32 },
    Sphere { radius: f32 },
}

impl Shape {
    /// Side length for cubes, radius for spheres
    pub(crate) fn size(&self) -> f32 {
        match *self {
            Shape::Cube { side } => side,
            Shape::Sphere { radius } => radius,
        }
    }

    fn with_size(self, size: f32) -> Self {
        match self {
            Shape::Cube { .. } => Shape::Cube { side: size },
            Shape::Sphere { .. } => Shape::Sphere { radius: size },
        }
    }

    /// Radius of the smallest sphere around the shape's center that contains it
    pub(crate) fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Cube { side } => side * 3f32.sqrt() / 2.0,
            Shape::Sphere { radius } => radius,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Cube { side } => write!(f, "cube (side {side})"),
            Shape::Sphere { radius } => write!(f, "sphere (radius {radius})"),
        }
    }
}

fn check_size(size: f32) -> Result<()> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidSize(size))
    }
}

/// A positioned, rotated primitive
#[derive(Debug, Clone)]
pub(crate) struct SceneObject {
    id: ObjectId,
    shape: Shape,
    position: Point3<f32>,
    rotation: Matrix4<f32>,
    selected: bool,
    /// Set while the object is turned on its own arcball
    rotating: bool,
    arc_ball: ArcBall,
}

impl SceneObject {
    fn new(id: ObjectId, shape: Shape, position: Point3<f32>, rotation: Matrix4<f32>) -> Self {
        Self {
            id,
            shape,
            position,
            rotation,
            selected: false,
            rotating: false,
            arc_ball: ArcBall::world(position, shape.bounding_radius()),
        }
    }

    pub(crate) fn cube(id: ObjectId, side: f32, position: Point3<f32>, rotation: Matrix4<f32>) -> Self {
        Self::new(id, Shape::Cube { side }, position, rotation)
    }

    pub(crate) fn sphere(id: ObjectId, radius: f32, position: Point3<f32>, rotation: Matrix4<f32>) -> Self {
        Self::new(id, Shape::Sphere { radius }, position, rotation)
    }

    pub(crate) fn id(&self) -> ObjectId {
        self.id
    }

    #[cfg(test)]
    pub(crate) fn shape(&self) -> &Shape {
        &self.shape
    }

    pub(crate) fn size(&self) -> f32 {
        self.shape.size()
    }

    /// Resizes the object; the bounding radius follows immediately
    pub(crate) fn set_size(&mut self, size: f32) -> Result<()> {
        check_size(size)?;
        self.shape = self.shape.with_size(size);
        Ok(())
    }

    /// Bounding-sphere radius, always derived from the current size
    pub(crate) fn radius(&self) -> f32 {
        self.shape.bounding_radius()
    }

    pub(crate) fn position(&self) -> &Point3<f32> {
        &self.position
    }

    pub(crate) fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    pub(crate) fn rotation(&self) -> &Matrix4<f32> {
        &self.rotation
    }

    pub(crate) fn set_rotation(&mut self, rotation: Matrix4<f32>) {
        self.rotation = rotation;
    }

    pub(crate) fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn select(&mut self, selected: bool) {
        self.selected = selected;
    }

    #[cfg(test)]
    pub(crate) fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Draw color, decided only by the selection state
    pub(crate) fn color(&self, palette: &Palette) -> Vector4<f32> {
        if self.is_selected() {
            palette.selected
        } else {
            palette.unselected
        }
    }

    /// Starts rotating the object on an arcball around its bounding sphere
    pub(crate) fn right_click_event(&mut self, vp: &ViewProjection, x: f32, y: f32) -> Result<()> {
        self.arc_ball.set_anchor(Anchor::World {
            center: self.position,
            radius: self.radius(),
        });
        self.arc_ball.set_initial_pt(vp, x, y)?;
        self.rotating = true;
        Ok(())
    }

    pub(crate) fn right_click_move_event(&mut self, vp: &ViewProjection, x: f32, y: f32) -> Result<()> {
        if !self.rotating {
            return Ok(());
        }
        let rotation = self.arc_ball.set_final_pt(vp, x, y, false)?;
        self.rotation = math::matrix_by_matrix(&rotation, &self.rotation);
        trace!("object {:?} rotated", self.id);
        Ok(())
    }

    pub(crate) fn right_click_release_event(&mut self) {
        self.rotating = false;
    }

    /// Issues the draw calls for this object
    pub(crate) fn render(&self, surface: &mut impl Surface, palette: &Palette, style: Style) {
        let color = self.color(palette);
        let primitive = match self.shape {
            Shape::Cube { side } => Primitive::Cube {
                center: self.position,
                rotation: self.rotation,
                side,
                color,
                style,
            },
            Shape::Sphere { radius } => Primitive::Sphere {
                center: self.position,
                rotation: self.rotation,
                radius,
                color,
                style,
            },
        };
        surface.draw(primitive);

        if self.rotating && style == Style::Wire {
            surface.draw(Primitive::Sphere {
                center: self.position,
                rotation: self.rotation,
                radius: self.radius() + HALO_MARGIN,
                color: palette.rotating,
                style: Style::Wire,
            });
        }
    }
}

/// Owns every object in the scene, in creation order
#[derive(Debug, Clone, Default)]
pub(crate) struct Scene {
    objects: Vec<SceneObject>,
    next_id: u64,
}

impl Scene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a new object and returns its handle
    pub(crate) fn insert(
        &mut self,
        shape: Shape,
        position: Point3<f32>,
        rotation: Matrix4<f32>,
    ) -> Result<ObjectId> {
        check_size(shape.size())?;
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        let object = match shape {
            Shape::Cube { side } => SceneObject::cube(id, side, position, rotation),
            Shape::Sphere { radius } => SceneObject::sphere(id, radius, position, rotation),
        };
        self.objects.push(object);
        Ok(id)
    }

    pub(crate) fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        Some(self.objects.remove(index))
    }

    pub(crate) fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Position of the object in draw order, used as its picking tag
    pub(crate) fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub(crate) fn by_index(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub(crate) fn ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Viewport;
    use crate::render::Recorder;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn front_view() -> ViewProjection {
        let view = Matrix4::look_at_rh(
            &Point3::new(0.0, 0.0, 3.0),
            &Point3::new(0.0, 0.0, 2.0),
            &Vector3::y(),
        );
        let projection = Matrix4::new_perspective(1.0, 45f32.to_radians(), 1.0, 21.0);
        ViewProjection::new(view, projection, Viewport::new(400.0, 400.0))
    }

    fn scene_with(shape: Shape) -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let id = scene.insert(shape, Point3::origin(), Matrix4::identity()).unwrap();
        (scene, id)
    }

    #[test]
    fn cube_radius_tracks_size() {
        let (mut scene, id) = scene_with(Shape::Cube { side: 1.0 });
        let cube = scene.get_mut(id).unwrap();
        for s in [0.5, 2.0, 3.7] {
            cube.set_size(s).unwrap();
            assert_relative_eq!(cube.radius(), s * 3f32.sqrt() / 2.0);
            assert_eq!(cube.size(), s);
        }
    }

    #[test]
    fn sphere_radius_equals_size() {
        let (mut scene, id) = scene_with(Shape::Sphere { radius: 1.0 });
        let sphere = scene.get_mut(id).unwrap();
        sphere.set_size(2.5).unwrap();
        assert_eq!(sphere.radius(), 2.5);
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        let (mut scene, id) = scene_with(Shape::Cube { side: 1.0 });
        let cube = scene.get_mut(id).unwrap();
        assert_eq!(cube.set_size(0.0), Err(SceneError::InvalidSize(0.0)));
        assert!(cube.set_size(f32::NAN).is_err());
        assert_eq!(cube.size(), 1.0);
        assert!(scene.insert(Shape::Sphere { radius: -1.0 }, Point3::origin(), Matrix4::identity()).is_err());
    }

    #[test]
    fn selection_switches_palette() {
        let (mut scene, id) = scene_with(Shape::Cube { side: 1.0 });
        let palette = Palette::default();
        let cube = scene.get_mut(id).unwrap();
        assert_eq!(cube.color(&palette), palette.unselected);
        cube.select(true);
        assert!(cube.is_selected());
        assert_eq!(cube.color(&palette), palette.selected);
    }

    #[test]
    fn object_rotation_accumulates_until_release() {
        let vp = front_view();
        let (mut scene, id) = scene_with(Shape::Sphere { radius: 1.0 });
        let sphere = scene.get_mut(id).unwrap();

        sphere.right_click_event(&vp, 200.0, 200.0).unwrap();
        assert!(sphere.is_rotating());
        sphere.right_click_move_event(&vp, 230.0, 200.0).unwrap();
        sphere.right_click_move_event(&vp, 260.0, 200.0).unwrap();
        let turned = *sphere.rotation();
        assert!(math::is_orthonormal(&turned, 1e-5));
        assert!(math::transform_vector(&turned, &Vector3::z()).x > 0.0);
        assert_eq!(*sphere.position(), Point3::origin());

        sphere.right_click_release_event();
        sphere.right_click_move_event(&vp, 100.0, 100.0).unwrap();
        assert_eq!(*sphere.rotation(), turned);
    }

    #[test]
    fn rotating_objects_draw_a_halo() {
        let vp = front_view();
        let (mut scene, id) = scene_with(Shape::Cube { side: 1.0 });
        let palette = Palette::default();
        let mut recorder = Recorder::default();

        scene.get(id).unwrap().render(&mut recorder, &palette, Style::Wire);
        assert_eq!(recorder.primitives.len(), 1);

        scene.get_mut(id).unwrap().right_click_event(&vp, 200.0, 200.0).unwrap();
        recorder.primitives.clear();
        scene.get(id).unwrap().render(&mut recorder, &palette, Style::Wire);
        assert_eq!(recorder.primitives.len(), 2);
    }

    #[test]
    fn handles_survive_removal_of_other_objects() {
        let mut scene = Scene::new();
        let a = scene.insert(Shape::Cube { side: 1.0 }, Point3::origin(), Matrix4::identity()).unwrap();
        let b = scene.insert(Shape::Sphere { radius: 1.0 }, Point3::new(1.0, 0.0, 0.0), Matrix4::identity()).unwrap();
        assert_ne!(a, b);
        assert!(scene.remove(a).is_some());
        assert!(scene.remove(a).is_none());
        assert_eq!(scene.index_of(b), Some(0));
        assert_eq!(scene.get(b).unwrap().position().x, 1.0);
        assert_eq!(scene.len(), 1);
    }
}
