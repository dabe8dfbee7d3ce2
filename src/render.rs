//! Draw calls issued by the editor core.
//!
//! The core never talks to the GPU directly. It describes each frame as a
//! sequence of [`Primitive`]s handed to a [`Surface`]; the display tessellates
//! them into line segments, while picking intersects them with pick rays.

use std::f32::consts::{PI, TAU};

use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::config::Palette;
use crate::group::Group;
use crate::object::Scene;

/// Radius of the white marker sphere drawn at the world origin
const ORIGIN_MARKER_RADIUS: f32 = 0.1;

/// How a solid is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Style {
    Wire,
    /// Filled hit target, only meaningful while picking
    Solid,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Primitive {
    Cube {
        center: Point3<f32>,
        rotation: Matrix4<f32>,
        side: f32,
        color: Vector4<f32>,
        style: Style,
    },
    Sphere {
        center: Point3<f32>,
        rotation: Matrix4<f32>,
        radius: f32,
        color: Vector4<f32>,
        style: Style,
    },
    Line {
        from: Point3<f32>,
        to: Point3<f32>,
        color: Vector4<f32>,
    },
}

/// Anything that accepts draw calls
pub(crate) trait Surface {
    fn draw(&mut self, primitive: Primitive);
}

/// Draws one frame: reference axes, every object, then the selection indicator
pub(crate) fn render_scene(surface: &mut impl Surface, scene: &Scene, group: &Group, palette: &Palette) {
    render_axes(surface);
    for object in scene.iter() {
        object.render(surface, palette, Style::Wire);
    }
    group.render(surface, palette, false);
}

/// A small white sphere and unit X/Y/Z axes at the origin
pub(crate) fn render_axes(surface: &mut impl Surface) {
    let origin = Point3::origin();
    surface.draw(Primitive::Sphere {
        center: origin,
        rotation: Matrix4::identity(),
        radius: ORIGIN_MARKER_RADIUS,
        color: Vector4::new(1.0, 1.0, 1.0, 1.0),
        style: Style::Wire,
    });
    let axes = [
        (Vector3::x(), Vector4::new(1.0, 0.0, 0.0, 1.0)),
        (Vector3::y(), Vector4::new(0.0, 1.0, 0.0, 1.0)),
        (Vector3::z(), Vector4::new(0.0, 0.0, 1.0, 1.0)),
    ];
    for (axis, color) in axes {
        surface.draw(Primitive::Line {
            from: origin,
            to: origin + axis,
            color,
        });
    }
}

/// The 12 edges of a cube as world-space segments
pub(crate) fn wire_cube(center: &Point3<f32>, rotation: &Matrix4<f32>, side: f32) -> Vec<[Point3<f32>; 2]> {
    let h = side * 0.5;
    let corner = |i: usize| {
        let local = Vector3::new(
            if i & 1 == 0 { -h } else { h },
            if i & 2 == 0 { -h } else { h },
            if i & 4 == 0 { -h } else { h },
        );
        center + rotation.transform_vector(&local)
    };

    let mut edges = Vec::with_capacity(12);
    for i in 0..8 {
        for bit in [1, 2, 4] {
            if i & bit == 0 {
                edges.push([corner(i), corner(i | bit)]);
            }
        }
    }
    edges
}

/// Meridians and parallels of a sphere as world-space segments.
///
/// `segments` is the number of slices around the axis; stacks from pole to
/// pole are half of that.
pub(crate) fn wire_sphere(
    center: &Point3<f32>,
    rotation: &Matrix4<f32>,
    radius: f32,
    segments: usize,
) -> Vec<[Point3<f32>; 2]> {
    let slices = segments.max(3);
    let stacks = (segments / 2).max(2);
    let point = |stack: usize, slice: usize| {
        let theta = PI * stack as f32 / stacks as f32;
        let phi = TAU * slice as f32 / slices as f32;
        let local = Vector3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()) * radius;
        center + rotation.transform_vector(&local)
    };

    let mut lines = Vec::with_capacity(slices * (2 * stacks - 1));
    for slice in 0..slices {
        for stack in 0..stacks {
            lines.push([point(stack, slice), point(stack + 1, slice)]);
        }
    }
    for stack in 1..stacks {
        for slice in 0..slices {
            lines.push([point(stack, slice), point(stack, (slice + 1) % slices)]);
        }
    }
    lines
}

/// Vertex uploaded to the line pipeline
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct LineVertex {
    pub(crate) position: [f32; 3],
    pub(crate) color: [f32; 4],
}

/// Surface that tessellates every primitive into a GPU line list.
///
/// Solid primitives have no filled rendering on screen and come out as wire.
#[derive(Debug, Clone, Default)]
pub(crate) struct LineList {
    segments: usize,
    vertices: Vec<LineVertex>,
}

impl LineList {
    pub(crate) fn new(segments: usize) -> Self {
        Self {
            segments,
            vertices: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub(crate) fn into_vertices(self) -> Vec<LineVertex> {
        self.vertices
    }

    fn push_segments(&mut self, segments: &[[Point3<f32>; 2]], color: &Vector4<f32>) {
        let color: [f32; 4] = (*color).into();
        for [a, b] in segments {
            self.vertices.push(LineVertex {
                position: a.coords.into(),
                color,
            });
            self.vertices.push(LineVertex {
                position: b.coords.into(),
                color,
            });
        }
    }
}

impl Surface for LineList {
    fn draw(&mut self, primitive: Primitive) {
        match primitive {
            Primitive::Cube {
                center,
                rotation,
                side,
                color,
                ..
            } => self.push_segments(&wire_cube(&center, &rotation, side), &color),
            Primitive::Sphere {
                center,
                rotation,
                radius,
                color,
                ..
            } => {
                let segments = wire_sphere(&center, &rotation, radius, self.segments);
                self.push_segments(&segments, &color);
            }
            Primitive::Line { from, to, color } => self.push_segments(&[[from, to]], &color),
        }
    }
}

/// Surface that keeps every draw call, for inspecting what a frame contains
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub(crate) primitives: Vec<Primitive>,
}

#[cfg(test)]
impl Surface for Recorder {
    fn draw(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }
}
