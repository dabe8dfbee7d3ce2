//! Hit testing under the cursor.
//!
//! Picking replays the same draw calls used for display into a
//! [`SelectionBuffer`], which records a tagged hit with its depth range for
//! every primitive that covers the pick rectangle.

use log::debug;

use crate::config::Palette;
use crate::error::Result;
use crate::group::Group;
use crate::object::{ObjectId, Scene};
use crate::projection::ViewProjection;
use crate::ray_casting::{self, Ray};
use crate::render::{Primitive, Style, Surface};

/// One primitive found under the pick rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hit {
    /// Smallest window depth of the hit, in `[0, 1]`
    pub(crate) near: f32,
    /// Largest window depth of the hit
    pub(crate) far: f32,
    /// Name loaded before the primitive was drawn
    pub(crate) tag: usize,
}

/// Selection-mode surface: draw calls are hit-tested instead of rasterized.
///
/// Rays are cast through the center and the four corners of a square pick
/// rectangle; a primitive hit by any of them is reported once.
#[derive(Debug)]
pub(crate) struct SelectionBuffer<'a> {
    vp: &'a ViewProjection,
    rays: Vec<Ray>,
    tag: usize,
    hits: Vec<Hit>,
}

impl<'a> SelectionBuffer<'a> {
    pub(crate) fn new(vp: &'a ViewProjection, x: f32, y: f32, pick_size: f32) -> Result<Self> {
        let h = pick_size * 0.5;
        let samples = [(x, y), (x - h, y - h), (x + h, y - h), (x - h, y + h), (x + h, y + h)];
        let rays = samples
            .iter()
            .map(|&(sx, sy)| ray_casting::ray_through_window(vp, sx, sy))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            vp,
            rays,
            tag: 0,
            hits: Vec::new(),
        })
    }

    /// Tags every following draw call until the next call
    pub(crate) fn load_name(&mut self, tag: usize) {
        self.tag = tag;
    }

    pub(crate) fn hits(&self) -> &[Hit] {
        &self.hits
    }

    fn depth_at(&self, ray: &Ray, t: f32) -> f32 {
        self.vp.project(&ray.at(t.clamp(0.0, 1.0))).z
    }
}

impl Surface for SelectionBuffer<'_> {
    fn draw(&mut self, primitive: Primitive) {
        let mut span: Option<(f32, f32)> = None;
        for ray in &self.rays {
            let hit = match &primitive {
                Primitive::Cube {
                    center,
                    rotation,
                    side,
                    ..
                } => ray_casting::ray_cube_intersection(ray, center, rotation, *side),
                Primitive::Sphere { center, radius, .. } => {
                    ray_casting::ray_sphere_intersection(ray, center, *radius)
                }
                // lines have no area to hit
                Primitive::Line { .. } => None,
            };
            // only the part between the near and far planes is visible
            let Some((enter, exit)) = hit.filter(|&(enter, _)| enter <= 1.0) else {
                continue;
            };
            let near = self.depth_at(ray, enter);
            let far = self.depth_at(ray, exit);
            span = Some(match span {
                Some((n, f)) => (n.min(near), f.max(far)),
                None => (near, far),
            });
        }

        if let Some((near, far)) = span {
            self.hits.push(Hit {
                near,
                far,
                tag: self.tag,
            });
        }
    }
}

/// The object nearest to the viewer under `(x, y)`, if any.
///
/// Each object is tagged with its index in the scene. On equal depths the
/// first object drawn wins.
pub(crate) fn try_pick(
    scene: &Scene,
    vp: &ViewProjection,
    palette: &Palette,
    x: f32,
    y: f32,
    pick_size: f32,
) -> Result<Option<ObjectId>> {
    if scene.is_empty() {
        return Ok(None);
    }

    let mut buffer = SelectionBuffer::new(vp, x, y, pick_size)?;
    for (index, object) in scene.iter().enumerate() {
        buffer.load_name(index);
        object.render(&mut buffer, palette, Style::Solid);
    }

    let mut nearest: Option<&Hit> = None;
    for hit in buffer.hits() {
        if nearest.is_none_or(|n| hit.near < n.near) {
            nearest = Some(hit);
        }
    }

    let picked = nearest.and_then(|hit| scene.by_index(hit.tag)).map(|object| object.id());
    debug!("picked {picked:?} at ({x}, {y})");
    Ok(picked)
}

/// Whether `(x, y)` lies over the selection's bounding sphere
pub(crate) fn mouse_over_group(
    group: &Group,
    vp: &ViewProjection,
    palette: &Palette,
    x: f32,
    y: f32,
    pick_size: f32,
) -> Result<bool> {
    if group.is_empty() {
        return Ok(false);
    }

    let mut buffer = SelectionBuffer::new(vp, x, y, pick_size)?;
    buffer.load_name(0);
    group.render(&mut buffer, palette, true);
    Ok(!buffer.hits().is_empty())
}
