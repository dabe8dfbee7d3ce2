//! Shader widget hosting the editor viewport.
//!
//! The program forwards iced input to the application as editor
//! [`InputEvent`]s and draws whatever the editor renders for the frame. The
//! editor itself lives in the application so the side panel can drive it
//! too.

use std::collections::HashSet;

use iced::keyboard::{self, key};
use iced::widget::shader::{self, wgpu};
use iced::{Point, Rectangle, Size, event, mouse};
use nalgebra::{Matrix4, Vector4};

use crate::Message;
use crate::editor::Editor;
use crate::input::{InputEvent, Key, Modifiers, PointerButton};
use crate::projection::Viewport;
use crate::render::LineVertex;
use crate::renderer::Renderer;

/// One frame of the viewport, ready for upload
#[derive(Debug, Clone)]
pub(crate) struct ScenePrimitive {
    vertices: Vec<LineVertex>,
    view_proj: Matrix4<f32>,
    background: Vector4<f32>,
}

impl shader::Primitive for ScenePrimitive {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        storage: &mut shader::Storage,
        bounds: &Rectangle,
        viewport: &shader::Viewport,
    ) {
        let physical_bounds = *bounds * viewport.scale_factor() as f32;
        if !storage.has::<Renderer>() {
            let renderer = pollster::block_on(Renderer::new(
                device,
                format,
                physical_bounds,
                viewport.physical_size(),
            ));
            storage.store(renderer);
        }
        if let Some(renderer) = storage.get_mut::<Renderer>() {
            renderer.resize(device, physical_bounds, viewport.physical_size());
            renderer.update_camera(queue, &self.view_proj);
            renderer.update_background(queue, &self.background);
            renderer.update_lines(device, queue, &self.vertices);
        }
    }

    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        storage: &shader::Storage,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        if let Some(renderer) = storage.get::<Renderer>() {
            renderer.render(encoder, target, clip_bounds);
        }
    }
}

/// Widget-side bookkeeping kept between events
#[derive(Debug, Default)]
pub(crate) struct ViewportState {
    /// Size last reported to the editor
    size: Size,
    /// Buttons pressed inside the viewport and not yet released
    pressed: HashSet<PointerButton>,
}

pub(crate) struct ViewportProgram<'a> {
    editor: &'a Editor,
}

impl<'a> ViewportProgram<'a> {
    pub(crate) fn new(editor: &'a Editor) -> Self {
        Self { editor }
    }
}

impl shader::Program<Message> for ViewportProgram<'_> {
    type State = ViewportState;
    type Primitive = ScenePrimitive;

    fn update(
        &self,
        state: &mut Self::State,
        event: shader::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
        shell: &mut iced::advanced::Shell<'_, Message>,
    ) -> (event::Status, Option<Message>) {
        if bounds.size() != state.size && bounds.width > 0.0 && bounds.height > 0.0 {
            state.size = bounds.size();
            let viewport = Viewport::new(bounds.width, bounds.height);
            shell.publish(Message::Input(InputEvent::Resized(viewport)));
        }

        let input = match event {
            shader::Event::Mouse(mouse_event) => handle_mouse_event(state, mouse_event, bounds, cursor),
            shader::Event::Keyboard(keyboard_event) => {
                handle_keyboard_event(keyboard_event, cursor.is_over(bounds))
            }
            _ => None,
        };

        match input {
            Some(input) => (event::Status::Captured, Some(Message::Input(input))),
            None => (event::Status::Ignored, None),
        }
    }

    fn draw(&self, _state: &Self::State, _cursor: mouse::Cursor, _bounds: Rectangle) -> Self::Primitive {
        ScenePrimitive {
            vertices: self.editor.line_list().into_vertices(),
            view_proj: self.editor.view_projection().matrix(),
            background: self.editor.config().palette.background,
        }
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if !state.pressed.is_empty() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Widget-relative position flipped to the bottom-up pixel rows of the viewport
fn viewport_position(position: Point, bounds: Rectangle) -> (f32, f32) {
    let x = position.x - bounds.x;
    let y = position.y - bounds.y;
    (x, bounds.height - y - 1.0)
}

fn pointer_button(button: mouse::Button) -> Option<PointerButton> {
    match button {
        mouse::Button::Left => Some(PointerButton::Left),
        mouse::Button::Middle => Some(PointerButton::Middle),
        mouse::Button::Right => Some(PointerButton::Right),
        _ => None,
    }
}

/// Presses start only over the viewport; moves and releases follow a drag
/// outside of it
fn handle_mouse_event(
    state: &mut ViewportState,
    mouse_event: mouse::Event,
    bounds: Rectangle,
    cursor: mouse::Cursor,
) -> Option<InputEvent> {
    let position = cursor.position()?;
    let (x, y) = viewport_position(position, bounds);
    match mouse_event {
        mouse::Event::CursorMoved { .. } => {
            (cursor.is_over(bounds) || !state.pressed.is_empty()).then_some(InputEvent::Moved { x, y })
        }
        mouse::Event::ButtonPressed(button) => {
            let button = pointer_button(button)?;
            if !cursor.is_over(bounds) || !state.pressed.insert(button) {
                return None;
            }
            Some(InputEvent::Pressed { button, x, y })
        }
        mouse::Event::ButtonReleased(button) => {
            let button = pointer_button(button)?;
            state
                .pressed
                .remove(&button)
                .then_some(InputEvent::Released { button, x, y })
        }
        _ => None,
    }
}

fn editor_key(key: &keyboard::Key) -> Option<Key> {
    match key {
        keyboard::Key::Named(key::Named::Home) => Some(Key::Home),
        keyboard::Key::Named(key::Named::Control) => Some(Key::Control),
        keyboard::Key::Named(key::Named::Shift) => Some(Key::Shift),
        keyboard::Key::Character(text) => text.chars().next().map(|c| Key::Char(c.to_ascii_uppercase())),
        _ => None,
    }
}

fn editor_modifiers(modifiers: keyboard::Modifiers) -> Modifiers {
    Modifiers {
        control: modifiers.control(),
        shift: modifiers.shift(),
    }
}

/// Key presses reach the editor only while the cursor is over the viewport
fn handle_keyboard_event(keyboard_event: keyboard::Event, hovered: bool) -> Option<InputEvent> {
    match keyboard_event {
        keyboard::Event::KeyPressed { key, .. } if hovered => editor_key(&key).map(InputEvent::KeyPressed),
        keyboard::Event::KeyReleased { key, .. } => editor_key(&key).map(InputEvent::KeyReleased),
        keyboard::Event::ModifiersChanged(modifiers) => {
            Some(InputEvent::ModifiersChanged(editor_modifiers(modifiers)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rectangle {
        Rectangle::new(Point::new(100.0, 50.0), Size::new(400.0, 300.0))
    }

    #[test]
    fn positions_are_flipped_to_bottom_up_rows() {
        assert_eq!(viewport_position(Point::new(100.0, 50.0), bounds()), (0.0, 299.0));
        assert_eq!(viewport_position(Point::new(499.0, 349.0), bounds()), (399.0, 0.0));
    }

    #[test]
    fn characters_are_uppercased() {
        assert_eq!(editor_key(&keyboard::Key::Character("c".into())), Some(Key::Char('C')));
        assert_eq!(editor_key(&keyboard::Key::Named(key::Named::Home)), Some(Key::Home));
        assert_eq!(editor_key(&keyboard::Key::Named(key::Named::Escape)), None);
    }

    #[test]
    fn presses_outside_the_viewport_are_ignored() {
        let mut state = ViewportState::default();
        let outside = mouse::Cursor::Available(Point::new(10.0, 10.0));
        let event = mouse::Event::ButtonPressed(mouse::Button::Left);
        assert_eq!(handle_mouse_event(&mut state, event, bounds(), outside), None);
        assert!(state.pressed.is_empty());
    }

    #[test]
    fn drags_keep_reporting_outside_the_viewport() {
        let mut state = ViewportState::default();
        let inside = mouse::Cursor::Available(Point::new(200.0, 100.0));
        let press = mouse::Event::ButtonPressed(mouse::Button::Right);
        assert_eq!(
            handle_mouse_event(&mut state, press, bounds(), inside),
            Some(InputEvent::Pressed {
                button: PointerButton::Right,
                x: 100.0,
                y: 249.0
            })
        );

        let outside = mouse::Cursor::Available(Point::new(600.0, 100.0));
        let moved = mouse::Event::CursorMoved {
            position: Point::new(600.0, 100.0),
        };
        assert!(handle_mouse_event(&mut state, moved, bounds(), outside).is_some());

        let release = mouse::Event::ButtonReleased(mouse::Button::Right);
        assert!(matches!(
            handle_mouse_event(&mut state, release, bounds(), outside),
            Some(InputEvent::Released { .. })
        ));
        // a second release has no matching press
        assert_eq!(handle_mouse_event(&mut state, release, bounds(), outside), None);
    }

    #[test]
    fn keys_need_hover_but_releases_do_not() {
        let press = keyboard::Event::KeyPressed {
            key: keyboard::Key::Character("x".into()),
            modified_key: keyboard::Key::Character("x".into()),
            physical_key: key::Physical::Code(key::Code::KeyX),
            location: keyboard::Location::Standard,
            modifiers: keyboard::Modifiers::empty(),
            text: None,
        };
        assert_eq!(handle_keyboard_event(press.clone(), false), None);
        assert_eq!(
            handle_keyboard_event(press, true),
            Some(InputEvent::KeyPressed(Key::Char('X')))
        );

        let changed = keyboard::Event::ModifiersChanged(keyboard::Modifiers::SHIFT);
        assert_eq!(
            handle_keyboard_event(changed, false),
            Some(InputEvent::ModifiersChanged(Modifiers {
                control: false,
                shift: true
            }))
        );
    }
}
