//! The current selection, handled as one rigid group.
//!
//! The group keeps an approximate bounding sphere of its members. Adding a
//! member updates it incrementally from the farthest pair of centers seen so
//! far; removing one recomputes it from all pairs.

use log::{debug, trace};
use nalgebra::{Matrix4, Point3};

use crate::arcball::{Anchor, ArcBall};
use crate::config::Palette;
use crate::error::{Result, SceneError};
use crate::math;
use crate::object::{HALO_MARGIN, ObjectId, Scene, SceneObject};
use crate::projection::ViewProjection;
use crate::render::{Primitive, Style, Surface};

#[derive(Debug, Clone)]
pub(crate) struct Group {
    members: Vec<ObjectId>,
    central_position: Point3<f32>,
    radius: f32,
    /// Rotation applied through group drags, shown on the indicator
    rotation: Matrix4<f32>,
    /// Largest center distance between two members seen since the last full recompute
    max_distance: f32,
    /// Size of the largest member
    max_object_size: f32,
    arc_ball: ArcBall,
    rotating: bool,
    /// Window offset from the projected center to the point a drag started at
    from_center: (f32, f32),
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

/// Members still present in the scene
fn resolve<'m, 's>(members: &'m [ObjectId], scene: &'s Scene) -> impl Iterator<Item = &'s SceneObject> {
    members.iter().filter_map(|&id| scene.get(id))
}

/// Extent of a member's bounding sphere measured from `center`
fn reach(center: &Point3<f32>, object: &SceneObject) -> f32 {
    math::distance(center, object.position()) + object.radius()
}

impl Group {
    pub(crate) fn new() -> Self {
        Self {
            members: Vec::new(),
            central_position: Point3::origin(),
            radius: 0.0,
            rotation: Matrix4::identity(),
            max_distance: 0.0,
            max_object_size: 0.0,
            arc_ball: ArcBall::world(Point3::origin(), 0.0),
            rotating: false,
            from_center: (0.0, 0.0),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn contains(&self, id: ObjectId) -> bool {
        self.members.contains(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.members.iter().copied()
    }

    pub(crate) fn central_position(&self) -> &Point3<f32> {
        &self.central_position
    }

    pub(crate) fn radius(&self) -> f32 {
        self.radius
    }

    #[cfg(test)]
    pub(crate) fn rotation(&self) -> &Matrix4<f32> {
        &self.rotation
    }

    pub(crate) fn max_object_size(&self) -> f32 {
        self.max_object_size
    }

    #[cfg(test)]
    pub(crate) fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Adds an object, optionally selecting it, and grows the bounding sphere.
    ///
    /// The center only moves when the new object extends the farthest pair;
    /// otherwise the radius is widened just enough to cover it.
    pub(crate) fn add(&mut self, scene: &mut Scene, id: ObjectId, auto_select: bool) -> Result<()> {
        let object = scene.get_mut(id).ok_or(SceneError::ObjectNotFound(id))?;
        if auto_select {
            object.select(true);
        }
        if self.members.contains(&id) {
            return Ok(());
        }

        let object = scene.get(id).ok_or(SceneError::ObjectNotFound(id))?;
        let mut farthest_pair = None;
        for member in resolve(&self.members, scene) {
            let distance = math::distance(member.position(), object.position());
            if distance > self.max_distance {
                self.max_distance = distance;
                farthest_pair = Some(member);
            }
        }
        self.max_object_size = self.max_object_size.max(object.size());
        self.members.push(id);

        if self.members.len() == 1 {
            self.central_position = *object.position();
            self.radius = object.radius();
            return Ok(());
        }

        match farthest_pair {
            None => {
                self.radius = self.radius.max(reach(&self.central_position, object));
            }
            Some(partner) => {
                self.enclose_pair(partner, object);
                self.widen(scene);
            }
        }
        trace!("group of {} around {:?}, radius {}", self.len(), self.central_position, self.radius);
        Ok(())
    }

    /// Removes an object, optionally deselecting it, and recomputes the bounds
    pub(crate) fn remove(&mut self, scene: &mut Scene, id: ObjectId, auto_deselect: bool) -> Result<()> {
        let index = self
            .members
            .iter()
            .position(|&m| m == id)
            .ok_or(SceneError::ObjectNotFound(id))?;
        self.members.remove(index);
        if auto_deselect {
            if let Some(object) = scene.get_mut(id) {
                object.select(false);
            }
        }
        self.update_radius_and_center(scene);
        Ok(())
    }

    /// Deselects and drops every member
    pub(crate) fn remove_all(&mut self, scene: &mut Scene) {
        for &id in &self.members {
            if let Some(object) = scene.get_mut(id) {
                object.select(false);
            }
        }
        self.members.clear();
        self.radius = 0.0;
        self.max_distance = 0.0;
        self.max_object_size = 0.0;
        self.rotating = false;
    }

    /// Full O(n²) recompute of the bounding sphere and the largest member size
    pub(crate) fn update_radius_and_center(&mut self, scene: &Scene) {
        self.members.retain(|&id| scene.get(id).is_some());
        self.radius = 0.0;
        self.max_distance = 0.0;
        self.max_object_size = resolve(&self.members, scene).map(SceneObject::size).fold(0.0, f32::max);

        let Some(first) = resolve(&self.members, scene).next() else {
            return;
        };
        self.central_position = *first.position();
        self.radius = first.radius();

        let mut farthest_pair = None;
        for a in resolve(&self.members, scene) {
            for b in resolve(&self.members, scene) {
                let distance = math::distance(a.position(), b.position());
                if distance > self.max_distance {
                    self.max_distance = distance;
                    farthest_pair = Some((a, b));
                }
            }
        }

        if let Some((a, b)) = farthest_pair {
            self.enclose_pair(a, b);
        }
        // also covers coincident members, which have no farthest pair
        self.widen(scene);
    }

    /// Centers the sphere between two members and sizes it to hold both
    fn enclose_pair(&mut self, a: &SceneObject, b: &SceneObject) {
        self.central_position = nalgebra::center(a.position(), b.position());
        self.radius = self.max_distance * 0.5 + a.radius().max(b.radius());
    }

    /// Grows the radius to cover every member; never shrinks it
    fn widen(&mut self, scene: &Scene) {
        for member in resolve(&self.members, scene) {
            self.radius = self.radius.max(reach(&self.central_position, member));
        }
    }

    /// Moves the group rigidly so its center lands on `position`
    pub(crate) fn set_central_position(&mut self, scene: &mut Scene, position: Point3<f32>) {
        let shift = math::vector_between(&self.central_position, &position);
        for &id in &self.members {
            if let Some(object) = scene.get_mut(id) {
                object.set_position(math::apply_vector(object.position(), &shift));
            }
        }
        self.central_position = position;
    }

    /// Remembers where on screen, relative to the center, a drag started
    pub(crate) fn left_click_press_event(&mut self, vp: &ViewProjection, x: f32, y: f32) {
        let screen = vp.project(&self.central_position);
        self.from_center = (x - screen.x, y - screen.y);
    }

    /// Drags the group so the grabbed point follows the cursor, at constant depth
    pub(crate) fn left_click_move_event(&mut self, scene: &mut Scene, vp: &ViewProjection, x: f32, y: f32) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let screen = vp.project(&self.central_position);
        let target = vp.unproject(x - self.from_center.0, y - self.from_center.1, screen.z)?;
        self.set_central_position(scene, target);
        Ok(())
    }

    /// Starts a rigid rotation on the group's arcball
    pub(crate) fn right_click_event(&mut self, vp: &ViewProjection, x: f32, y: f32) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.arc_ball.set_anchor(Anchor::World {
            center: self.central_position,
            radius: self.radius,
        });
        self.arc_ball.set_initial_pt(vp, x, y)?;
        self.rotating = true;
        debug!("group rotation started with {} members", self.len());
        Ok(())
    }

    /// Turns every member about the group center, preserving their relative offsets
    pub(crate) fn right_click_move_event(&mut self, scene: &mut Scene, vp: &ViewProjection, x: f32, y: f32) -> Result<()> {
        if !self.rotating {
            return Ok(());
        }
        let rotation = self.arc_ball.set_final_pt(vp, x, y, false)?;
        self.rotation = math::matrix_by_matrix(&rotation, &self.rotation);

        let about_center = math::rotation_about_pivot(&self.central_position, &rotation);
        for &id in &self.members {
            if let Some(object) = scene.get_mut(id) {
                object.set_position(math::transform_point(&about_center, object.position()));
                object.set_rotation(math::matrix_by_matrix(&rotation, object.rotation()));
            }
        }
        Ok(())
    }

    pub(crate) fn right_click_release_event(&mut self) {
        if self.rotating {
            debug!("group rotation finished");
        }
        self.rotating = false;
    }

    /// Draws the bounding indicator, or a solid hit target in picking mode
    pub(crate) fn render(&self, surface: &mut impl Surface, palette: &Palette, picking_mode: bool) {
        if self.is_empty() {
            return;
        }
        let primitive = if picking_mode {
            Primitive::Sphere {
                center: self.central_position,
                rotation: Matrix4::identity(),
                radius: self.radius,
                color: palette.group_idle,
                style: Style::Solid,
            }
        } else {
            let color = if self.rotating {
                palette.group_rotating
            } else {
                palette.group_idle
            };
            Primitive::Sphere {
                center: self.central_position,
                rotation: self.rotation,
                radius: self.radius + HALO_MARGIN,
                color,
                style: Style::Wire,
            }
        };
        surface.draw(primitive);
    }
}
