//! Turns pointer and keyboard input into camera, selection and object edits.
//!
//! Each mouse button runs its own press / drag / release cycle:
//!
//! * left picks on press, then drags the selection (or the camera when
//!   nothing is selected); a click without movement picks again on release
//!   so clicking a selected object can deselect it
//! * right rotates the selection when pressed over its bounding sphere
//!   (each object about its own center with Shift held), otherwise the
//!   whole scene
//! * middle zooms with vertical movement

use log::{debug, info, warn};

use crate::arcball::ArcBall;
use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::error::{Result, SceneError};
use crate::group::Group;
use crate::input::{InputEvent, InputHandler, InputState, Key, Modifiers, PointerButton};
use crate::math;
use crate::object::{ObjectId, Scene, Shape};
use crate::picking;
use crate::projection::{ViewProjection, Viewport};
use crate::render::{self, LineList, Surface};

/// What a right-button drag is turning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rotation {
    Scene,
    Group,
    /// Every selected object about its own center
    Objects,
}

#[derive(Debug)]
pub(crate) struct Editor {
    config: EditorConfig,
    scene: Scene,
    /// The current selection
    group: Group,
    camera: Camera,
    scene_arc_ball: ArcBall,
    viewport: Viewport,
    input: InputState,
    /// Object selected by the current left press; the release must not deselect it
    pre_selected: Option<ObjectId>,
    /// Whether the current left press has moved
    translated: bool,
    rotation: Option<Rotation>,
    /// Vertical middle-drag distance not yet turned into zoom steps
    zoom_carry: f32,
    /// Size for new objects, and the value shown by the size control
    size_control: f32,
}

/// Logs a failed interaction step; the editor keeps its previous state
fn report(result: Result<()>, action: &str) {
    if let Err(err) = result {
        warn!("{action} failed: {err}");
    }
}

impl Editor {
    pub(crate) fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scene: Scene::new(),
            group: Group::new(),
            camera: Camera::new(config.camera.clone()),
            scene_arc_ball: ArcBall::viewport(),
            viewport: Viewport::new(0.0, 0.0),
            input: InputState::new(),
            pre_selected: None,
            translated: false,
            rotation: None,
            zoom_carry: 0.0,
            size_control: config.creation_size,
            config,
        })
    }

    pub(crate) fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub(crate) fn scene(&self) -> &Scene {
        &self.scene
    }

    pub(crate) fn group(&self) -> &Group {
        &self.group
    }

    #[cfg(test)]
    pub(crate) fn camera(&self) -> &Camera {
        &self.camera
    }

    #[cfg(test)]
    pub(crate) fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub(crate) fn view_projection(&self) -> ViewProjection {
        self.camera.view_projection(self.viewport)
    }

    pub(crate) fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.camera.set_lens(width, height);
    }

    pub(crate) fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    pub(crate) fn mouse_press(&mut self, button: PointerButton, x: f32, y: f32) {
        self.input.update_mouse_position(x, y);
        if !self.input.press(button) {
            warn!("{button:?} pressed while already down, ignoring");
            return;
        }

        match button {
            PointerButton::Left => {
                self.translated = false;
                report(self.press_event_picking(), "picking");
            }
            PointerButton::Right => report(self.start_rotation(), "starting rotation"),
            PointerButton::Middle => self.zoom_carry = 0.0,
        }
    }

    pub(crate) fn mouse_move(&mut self, x: f32, y: f32) {
        self.input.update_mouse_position(x, y);

        if self.input.is_pressed(PointerButton::Left) {
            report(self.handle_translation(), "translation");
        }
        if self.input.is_pressed(PointerButton::Middle) {
            self.handle_zoom();
        }
        if self.input.is_pressed(PointerButton::Right) {
            report(self.handle_rotation(), "rotation");
        }
    }

    pub(crate) fn mouse_release(&mut self, button: PointerButton, x: f32, y: f32) {
        self.input.update_mouse_position(x, y);
        if !self.input.release(button) {
            debug!("{button:?} released without a press");
            return;
        }

        match button {
            PointerButton::Left => {
                if !self.translated {
                    report(self.release_event_picking(), "picking");
                }
                self.translated = false;
            }
            PointerButton::Right => self.finish_rotation(),
            PointerButton::Middle => self.zoom_carry = 0.0,
        }
    }

    pub(crate) fn key_press(&mut self, key: Key) {
        match key {
            Key::Control => self.input.set_control(true),
            Key::Shift => self.input.set_shift(true),
            Key::Home => self.view_all(),
            Key::Char(c) => match c.to_ascii_uppercase() {
                'C' => report(self.create_cube().map(drop), "creating cube"),
                'E' => report(self.create_sphere().map(drop), "creating sphere"),
                'X' => self.delete_selected(),
                'W' => self.camera.move_up(),
                'S' => self.camera.move_down(),
                'A' => self.camera.move_left(),
                'D' => self.camera.move_right(),
                'F' => self.camera.move_forward(),
                'B' => self.camera.move_backward(),
                'R' => self.reset_view(),
                'T' => self.select_all(),
                _ => {}
            },
        }
    }

    pub(crate) fn key_release(&mut self, key: Key) {
        match key {
            Key::Control => self.input.set_control(false),
            Key::Shift => self.input.set_shift(false),
            _ => {}
        }
    }

    fn pick(&self) -> Result<Option<ObjectId>> {
        let (x, y) = self.input.mouse_position();
        let vp = self.view_projection();
        picking::try_pick(&self.scene, &vp, &self.config.palette, x, y, self.config.pick_size)
    }

    /// Selection changes applied when the left button goes down
    fn press_event_picking(&mut self) -> Result<()> {
        let picked = self.pick()?;

        match picked {
            Some(id) => {
                if !self.input.modifiers().control {
                    if !self.group.contains(id) {
                        self.group.remove_all(&mut self.scene);
                        self.group.add(&mut self.scene, id, true)?;
                        self.pre_selected = Some(id);
                    }
                } else if !self.group.contains(id) {
                    self.group.add(&mut self.scene, id, true)?;
                    self.pre_selected = Some(id);
                }
                let (x, y) = self.input.mouse_position();
                let vp = self.view_projection();
                self.group.left_click_press_event(&vp, x, y);
            }
            None => self.group.remove_all(&mut self.scene),
        }

        self.sync_size_control();
        Ok(())
    }

    /// Selection changes applied by a left click that did not drag
    fn release_event_picking(&mut self) -> Result<()> {
        let picked = self.pick()?;

        match picked {
            Some(id) if picked != self.pre_selected => {
                if !self.input.modifiers().control {
                    if self.group.contains(id) {
                        if self.group.len() > 1 {
                            self.group.remove_all(&mut self.scene);
                            self.group.add(&mut self.scene, id, true)?;
                        } else {
                            self.group.remove(&mut self.scene, id, true)?;
                        }
                    }
                } else if self.group.contains(id) {
                    self.group.remove(&mut self.scene, id, true)?;
                }
            }
            _ if picked == self.pre_selected => self.pre_selected = None,
            _ => {}
        }

        self.sync_size_control();
        Ok(())
    }

    fn sync_size_control(&mut self) {
        if !self.group.is_empty() {
            self.size_control = self.group.max_object_size();
        }
    }

    /// Left drag: moves the selection, or the camera when nothing is selected
    fn handle_translation(&mut self) -> Result<()> {
        let (x, y) = self.input.mouse_position();
        let (last_x, last_y) = self.input.last_mouse_position();
        if (x, y) != (last_x, last_y) {
            self.translated = true;
        }

        if self.group.is_empty() {
            let from = self.camera.scene_position(self.viewport, last_x, last_y)?;
            let to = self.camera.scene_position(self.viewport, x, y)?;
            let shift = math::vector_between(&to, &from);
            self.camera.set_position(math::apply_vector(self.camera.position(), &shift));
        } else {
            let vp = self.view_projection();
            self.group.left_click_move_event(&mut self.scene, &vp, x, y)?;
        }
        Ok(())
    }

    /// Middle drag: moving up zooms in, moving down zooms out
    fn handle_zoom(&mut self) {
        let (_, y) = self.input.mouse_position();
        let (_, last_y) = self.input.last_mouse_position();
        self.zoom_carry += y - last_y;

        let step = self.config.zoom_pixels_per_step;
        while self.zoom_carry >= step {
            self.camera.zoom_in();
            self.zoom_carry -= step;
        }
        while self.zoom_carry <= -step {
            self.camera.zoom_out();
            self.zoom_carry += step;
        }
    }

    fn start_rotation(&mut self) -> Result<()> {
        let (x, y) = self.input.mouse_position();
        let vp = self.view_projection();
        let over_group =
            picking::mouse_over_group(&self.group, &vp, &self.config.palette, x, y, self.config.pick_size)?;

        let rotation = if !over_group {
            self.scene_arc_ball.set_initial_pt(&vp, x, y)?;
            Rotation::Scene
        } else if self.input.modifiers().shift {
            // set first so the release stops objects started before a failure
            self.rotation = Some(Rotation::Objects);
            for id in self.group.iter() {
                let object = self.scene.get_mut(id).ok_or(SceneError::ObjectNotFound(id))?;
                object.right_click_event(&vp, x, y)?;
            }
            Rotation::Objects
        } else {
            self.group.right_click_event(&vp, x, y)?;
            Rotation::Group
        };
        debug!("{rotation:?} rotation started");
        self.rotation = Some(rotation);
        Ok(())
    }

    fn handle_rotation(&mut self) -> Result<()> {
        let (x, y) = self.input.mouse_position();
        let vp = self.view_projection();
        match self.rotation {
            Some(Rotation::Scene) => {
                let rotation = self.scene_arc_ball.set_final_pt(&vp, x, y, true)?;
                self.camera.rotate(&rotation);
            }
            Some(Rotation::Group) => self.group.right_click_move_event(&mut self.scene, &vp, x, y)?,
            Some(Rotation::Objects) => {
                for id in self.group.iter() {
                    if let Some(object) = self.scene.get_mut(id) {
                        object.right_click_move_event(&vp, x, y)?;
                    }
                }
            }
            None => {}
        }
        Ok(())
    }

    fn finish_rotation(&mut self) {
        match self.rotation.take() {
            Some(Rotation::Group) => self.group.right_click_release_event(),
            Some(Rotation::Objects) => {
                for id in self.group.iter() {
                    if let Some(object) = self.scene.get_mut(id) {
                        object.right_click_release_event();
                    }
                }
            }
            Some(Rotation::Scene) | None => {}
        }
    }

    fn create(&mut self, shape: Shape) -> Result<ObjectId> {
        let (x, y) = self.input.mouse_position();
        let position = self.camera.scene_position(self.viewport, x, y)?;
        let id = self.scene.insert(shape, position, *self.camera.rotation())?;
        info!("created {shape} at {position:?}");
        Ok(id)
    }

    /// Adds a cube of the current creation size under the cursor
    pub(crate) fn create_cube(&mut self) -> Result<ObjectId> {
        self.create(Shape::Cube {
            side: self.size_control,
        })
    }

    /// Adds a sphere of the current creation size under the cursor
    pub(crate) fn create_sphere(&mut self) -> Result<ObjectId> {
        self.create(Shape::Sphere {
            radius: self.size_control,
        })
    }

    pub(crate) fn delete_selected(&mut self) {
        let selected: Vec<ObjectId> = self.group.iter().collect();
        self.group.remove_all(&mut self.scene);
        for id in &selected {
            self.scene.remove(*id);
        }
        if !selected.is_empty() {
            info!("deleted {} objects", selected.len());
        }
    }

    pub(crate) fn select_all(&mut self) {
        for id in self.scene.ids() {
            if !self.group.contains(id) {
                report(self.group.add(&mut self.scene, id, true), "selecting");
            }
        }
        self.sync_size_control();
    }

    pub(crate) fn reset_view(&mut self) {
        self.camera.reset();
        info!("view reset");
    }

    /// Points the camera so every object fits in view
    pub(crate) fn view_all(&mut self) {
        if self.scene.is_empty() {
            return;
        }
        let mut everything = Group::new();
        for id in self.scene.ids() {
            report(everything.add(&mut self.scene, id, false), "fitting view");
        }
        self.camera.look_at_sphere(everything.central_position(), everything.radius());
        info!(
            "viewing {} objects around {:?}",
            self.scene.len(),
            everything.central_position()
        );
    }

    pub(crate) fn size_control(&self) -> f32 {
        self.size_control
    }

    /// Sets the creation size and resizes every selected object to it
    pub(crate) fn set_size_control(&mut self, size: f32) -> Result<()> {
        if !(self.config.min_size..=self.config.max_size).contains(&size) {
            return Err(SceneError::InvalidSize(size));
        }
        self.size_control = size;
        for id in self.group.iter() {
            let object = self.scene.get_mut(id).ok_or(SceneError::ObjectNotFound(id))?;
            object.set_size(size)?;
        }
        self.group.update_radius_and_center(&self.scene);
        Ok(())
    }

    /// Field of view in degrees
    pub(crate) fn zoom_control(&self) -> f32 {
        self.camera.fov()
    }

    pub(crate) fn set_zoom_control(&mut self, fov: f32) -> Result<()> {
        self.camera.set_fov(fov)
    }

    /// Issues the draw calls for one frame
    pub(crate) fn render(&self, surface: &mut impl Surface) {
        render::render_scene(surface, &self.scene, &self.group, &self.config.palette);
    }

    /// One frame tessellated into line segments
    pub(crate) fn line_list(&self) -> LineList {
        let mut lines = LineList::new(self.config.wire_segments);
        self.render(&mut lines);
        lines
    }
}

impl InputHandler for Editor {
    fn handle_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::Pressed { button, x, y } => self.mouse_press(button, x, y),
            InputEvent::Released { button, x, y } => self.mouse_release(button, x, y),
            InputEvent::Moved { x, y } => {
                self.mouse_move(x, y);
                let buttons = [PointerButton::Left, PointerButton::Middle, PointerButton::Right];
                return buttons.iter().any(|&b| self.input.is_pressed(b));
            }
            InputEvent::KeyPressed(key) => self.key_press(key),
            InputEvent::KeyReleased(key) => self.key_release(key),
            InputEvent::ModifiersChanged(modifiers) => self.set_modifiers(modifiers),
            InputEvent::Resized(viewport) => self.resize(viewport.width, viewport.height),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Primitive, Recorder};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Point3};

    const CENTER: (f32, f32) = (200.0, 200.0);

    fn editor() -> Editor {
        let mut editor = Editor::new(EditorConfig::default()).unwrap();
        editor.resize(400.0, 400.0);
        editor
    }

    fn insert(editor: &mut Editor, shape: Shape, x: f32, y: f32, z: f32) -> ObjectId {
        editor
            .scene
            .insert(shape, Point3::new(x, y, z), Matrix4::identity())
            .unwrap()
    }

    fn click(editor: &mut Editor, x: f32, y: f32) {
        editor.mouse_press(PointerButton::Left, x, y);
        editor.mouse_release(PointerButton::Left, x, y);
    }

    fn drag(editor: &mut Editor, button: PointerButton, from: (f32, f32), to: (f32, f32)) {
        editor.mouse_press(button, from.0, from.1);
        for step in 1..=10 {
            let t = step as f32 / 10.0;
            editor.mouse_move(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
        }
        editor.mouse_release(button, to.0, to.1);
    }

    fn is_selected(editor: &Editor, id: ObjectId) -> bool {
        editor.scene().get(id).unwrap().is_selected()
    }

    #[test]
    fn click_selects_then_deselects() {
        let mut editor = editor();
        let cube = insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);

        click(&mut editor, CENTER.0, CENTER.1);
        assert!(is_selected(&editor, cube));
        assert!(editor.group().contains(cube));

        click(&mut editor, CENTER.0, CENTER.1);
        assert!(!is_selected(&editor, cube));
        assert!(editor.group().is_empty());
    }

    #[test]
    fn clicking_empty_space_clears_selection() {
        let mut editor = editor();
        let cube = insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);
        click(&mut editor, CENTER.0, CENTER.1);
        click(&mut editor, 20.0, 20.0);
        assert!(!is_selected(&editor, cube));
        assert!(editor.group().is_empty());
    }

    #[test]
    fn control_click_extends_and_shrinks_selection() {
        let mut editor = editor();
        let left = insert(&mut editor, Shape::Cube { side: 0.5 }, -1.0, 0.0, 0.0);
        let right = insert(&mut editor, Shape::Cube { side: 0.5 }, 1.0, 0.0, 0.0);
        let left_screen = editor.view_projection().project(&Point3::new(-1.0, 0.0, 0.0));
        let right_screen = editor.view_projection().project(&Point3::new(1.0, 0.0, 0.0));

        click(&mut editor, left_screen.x, left_screen.y);
        editor.key_press(Key::Control);
        click(&mut editor, right_screen.x, right_screen.y);
        assert_eq!(editor.group().len(), 2);
        assert!(is_selected(&editor, left) && is_selected(&editor, right));

        // a second ctrl click on an already selected object drops it
        click(&mut editor, left_screen.x, left_screen.y);
        assert!(!is_selected(&editor, left));
        assert_eq!(editor.group().len(), 1);

        editor.key_release(Key::Control);
        editor.set_modifiers(Modifiers::default());
        click(&mut editor, left_screen.x, left_screen.y);
        assert!(is_selected(&editor, left));
        assert!(!is_selected(&editor, right));
    }

    #[test]
    fn plain_click_on_multi_selection_keeps_only_that_object() {
        let mut editor = editor();
        let a = insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);
        let b = insert(&mut editor, Shape::Cube { side: 0.5 }, 1.5, 0.0, 0.0);
        editor.select_all();
        assert_eq!(editor.group().len(), 2);

        click(&mut editor, CENTER.0, CENTER.1);
        assert!(is_selected(&editor, a));
        assert!(!is_selected(&editor, b));
        assert_eq!(editor.group().len(), 1);
    }

    #[test]
    fn left_drag_moves_selection_without_repicking() {
        let mut editor = editor();
        let cube = insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);

        drag(&mut editor, PointerButton::Left, CENTER, (260.0, 200.0));

        let position = *editor.scene().get(cube).unwrap().position();
        assert!(position.x > 0.0);
        assert_relative_eq!(position.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(position.z, 0.0, epsilon = 1e-4);
        // the drag was not followed by a deselecting release pick
        assert!(is_selected(&editor, cube));
        assert_eq!(*editor.camera().position(), Point3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn left_drag_on_empty_scene_pans_camera() {
        let mut editor = editor();
        drag(&mut editor, PointerButton::Left, CENTER, (260.0, 200.0));
        let position = *editor.camera().position();
        assert!(position.x < 0.0);
        assert_relative_eq!(position.z, 3.0, epsilon = 1e-4);
        assert_eq!(*editor.camera().rotation(), Matrix4::identity());
    }

    #[test]
    fn right_drag_off_selection_rotates_scene() {
        let mut editor = editor();
        let cube = insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);
        drag(&mut editor, PointerButton::Right, (300.0, 300.0), (340.0, 280.0));

        assert_ne!(*editor.camera().rotation(), Matrix4::identity());
        assert!(math::is_orthonormal(editor.camera().rotation(), 1e-4));
        assert_eq!(*editor.scene().get(cube).unwrap().rotation(), Matrix4::identity());
    }

    #[test]
    fn right_drag_on_selection_rotates_group() {
        let mut editor = editor();
        let a = insert(&mut editor, Shape::Sphere { radius: 0.3 }, -0.4, 0.0, 0.0);
        let b = insert(&mut editor, Shape::Sphere { radius: 0.3 }, 0.4, 0.0, 0.0);
        editor.select_all();

        drag(&mut editor, PointerButton::Right, CENTER, (230.0, 200.0));

        let pa = *editor.scene().get(a).unwrap().position();
        let pb = *editor.scene().get(b).unwrap().position();
        assert_relative_eq!(math::distance(&pa, &pb), 0.8, epsilon = 1e-4);
        assert!(pa.z.abs() > 1e-3);
        assert_eq!(*editor.camera().rotation(), Matrix4::identity());
        assert!(!editor.group().is_rotating());
    }

    #[test]
    fn shift_right_drag_rotates_objects_in_place() {
        let mut editor = editor();
        let a = insert(&mut editor, Shape::Cube { side: 0.3 }, -0.4, 0.0, 0.0);
        let b = insert(&mut editor, Shape::Cube { side: 0.3 }, 0.4, 0.0, 0.0);
        editor.select_all();
        editor.key_press(Key::Shift);

        editor.mouse_press(PointerButton::Right, CENTER.0, CENTER.1);
        editor.mouse_move(215.0, 205.0);
        assert!(editor.scene().get(a).unwrap().is_rotating());
        editor.mouse_release(PointerButton::Right, 215.0, 205.0);

        for (id, x) in [(a, -0.4), (b, 0.4)] {
            let object = editor.scene().get(id).unwrap();
            assert_eq!(*object.position(), Point3::new(x, 0.0, 0.0));
            assert_ne!(*object.rotation(), Matrix4::identity());
            assert!(!object.is_rotating());
        }
    }

    #[test]
    fn release_stops_every_object_when_one_fails_to_start() {
        let mut editor = editor();
        let a = insert(&mut editor, Shape::Sphere { radius: 0.5 }, 0.0, 0.0, 0.0);
        // on the eye plane: its arcball anchor cannot be projected
        let b = insert(&mut editor, Shape::Sphere { radius: 0.5 }, 1.0, 0.0, 3.0);
        editor.select_all();
        editor.key_press(Key::Shift);

        let center = editor.view_projection().project(editor.group().central_position());
        editor.mouse_press(PointerButton::Right, center.x, center.y);
        editor.mouse_release(PointerButton::Right, center.x, center.y);

        assert_eq!(editor.rotation, None);
        for id in [a, b] {
            assert!(!editor.scene().get(id).unwrap().is_rotating());
        }
    }

    #[test]
    fn middle_drag_up_zooms_in() {
        let mut editor = editor();
        editor.mouse_press(PointerButton::Middle, CENTER.0, CENTER.1);
        editor.mouse_move(CENTER.0, CENTER.1 + 6.0);
        editor.mouse_move(CENTER.0, CENTER.1 + 9.0);
        assert_eq!(editor.zoom_control(), 43.0);
        // 20 px down: four steps out, with 3 px carried over
        editor.mouse_move(CENTER.0, CENTER.1 - 11.0);
        assert_eq!(editor.zoom_control(), 47.0);
        editor.mouse_release(PointerButton::Middle, CENTER.0, CENTER.1 - 11.0);
    }

    #[test]
    fn created_objects_land_on_the_mid_plane() {
        let mut editor = editor();
        editor.mouse_move(CENTER.0, CENTER.1);
        editor.key_press(Key::Char('c'));
        editor.key_press(Key::Char('E'));
        assert_eq!(editor.scene().len(), 2);

        let cube = editor.scene().by_index(0).unwrap();
        assert_eq!(*cube.shape(), Shape::Cube { side: 0.5 });
        assert_relative_eq!(*cube.position(), Point3::new(0.0, 0.0, -7.0), epsilon = 1e-3);
        assert!(!cube.is_selected());
        assert!(matches!(editor.scene().by_index(1).unwrap().shape(), Shape::Sphere { .. }));
    }

    #[test]
    fn new_objects_inherit_camera_rotation() {
        let mut editor = editor();
        drag(&mut editor, PointerButton::Right, (300.0, 300.0), (340.0, 280.0));
        editor.mouse_move(CENTER.0, CENTER.1);
        let id = editor.create_cube().unwrap();
        assert_eq!(editor.scene().get(id).unwrap().rotation(), editor.camera().rotation());
    }

    #[test]
    fn delete_removes_only_selected_objects() {
        let mut editor = editor();
        let kept = insert(&mut editor, Shape::Cube { side: 0.5 }, 2.0, 2.0, 0.0);
        let gone = insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);
        click(&mut editor, CENTER.0, CENTER.1);
        editor.key_press(Key::Char('x'));

        assert!(editor.scene().get(gone).is_none());
        assert!(editor.scene().get(kept).is_some());
        assert!(editor.group().is_empty());
    }

    #[test]
    fn size_control_resizes_selection() {
        let mut editor = editor();
        let a = insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);
        let b = insert(&mut editor, Shape::Sphere { radius: 1.0 }, 3.0, 0.0, 0.0);
        editor.select_all();
        assert_eq!(editor.size_control(), 1.0);

        editor.set_size_control(2.0).unwrap();
        assert_eq!(editor.scene().get(a).unwrap().size(), 2.0);
        assert_eq!(editor.scene().get(b).unwrap().radius(), 2.0);
        assert_relative_eq!(editor.group().radius(), 1.5 + 3f32.sqrt().max(2.0));
        assert_eq!(editor.group().max_object_size(), 2.0);

        assert_eq!(editor.set_size_control(50.0), Err(SceneError::InvalidSize(50.0)));
        assert_eq!(editor.size_control(), 2.0);
    }

    #[test]
    fn zoom_control_is_validated() {
        let mut editor = editor();
        editor.set_zoom_control(30.0).unwrap();
        assert_eq!(editor.zoom_control(), 30.0);
        assert!(editor.set_zoom_control(180.0).is_err());
        editor.key_press(Key::Char('r'));
        assert_eq!(editor.zoom_control(), 45.0);
    }

    #[test]
    fn view_all_fits_every_object_without_selecting() {
        let mut editor = editor();
        let a = insert(&mut editor, Shape::Sphere { radius: 1.0 }, 0.0, 0.0, 0.0);
        insert(&mut editor, Shape::Cube { side: 1.0 }, 5.0, 0.0, 0.0);
        editor.set_zoom_control(20.0).unwrap();
        editor.key_press(Key::Home);

        let distance = 3.5 / 22.5f32.to_radians().sin();
        assert_eq!(editor.zoom_control(), 45.0);
        assert_relative_eq!(*editor.camera().position(), Point3::new(2.5, 0.0, distance), epsilon = 1e-4);
        assert!(!is_selected(&editor, a));
        assert!(editor.group().is_empty());
    }

    #[test]
    fn movement_keys_translate_camera() {
        let mut editor = editor();
        for key in ['w', 'a', 'f'] {
            editor.key_press(Key::Char(key));
        }
        assert_relative_eq!(*editor.camera().position(), Point3::new(-0.1, 0.1, 2.9), epsilon = 1e-6);
        for key in ['s', 'd', 'b'] {
            editor.key_press(Key::Char(key));
        }
        assert_relative_eq!(*editor.camera().position(), Point3::new(0.0, 0.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn duplicate_press_is_ignored() {
        let mut editor = editor();
        let cube = insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);
        editor.mouse_press(PointerButton::Left, CENTER.0, CENTER.1);
        editor.mouse_press(PointerButton::Left, 20.0, 20.0);
        // the ignored press did not clear the selection
        assert!(is_selected(&editor, cube));
        editor.mouse_release(PointerButton::Left, CENTER.0, CENTER.1);
        assert!(is_selected(&editor, cube));
    }

    #[test]
    fn events_before_first_resize_are_harmless() {
        let mut editor = Editor::new(EditorConfig::default()).unwrap();
        insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);
        click(&mut editor, 0.0, 0.0);
        assert!(editor.group().is_empty());
        assert!(editor.create_cube().is_err());
    }

    #[test]
    fn frame_contains_axes_objects_and_indicator() {
        let mut editor = editor();
        insert(&mut editor, Shape::Cube { side: 0.5 }, 0.0, 0.0, 0.0);
        insert(&mut editor, Shape::Sphere { radius: 0.5 }, 2.0, 0.0, 0.0);
        let mut recorder = Recorder::default();
        editor.render(&mut recorder);
        // origin marker, three axes, two objects
        assert_eq!(recorder.primitives.len(), 6);

        click(&mut editor, CENTER.0, CENTER.1);
        recorder.primitives.clear();
        editor.render(&mut recorder);
        assert_eq!(recorder.primitives.len(), 7);
        assert!(matches!(recorder.primitives.last(), Some(Primitive::Sphere { .. })));
        assert!(!editor.line_list().vertices().is_empty());
    }

    #[test]
    fn input_events_drive_the_editor() {
        let mut editor = Editor::new(EditorConfig::default()).unwrap();
        assert!(editor.handle_event(&InputEvent::Resized(Viewport::new(400.0, 400.0))));
        assert_eq!(*editor.viewport(), Viewport::new(400.0, 400.0));
        assert!(!editor.handle_event(&InputEvent::Moved { x: 200.0, y: 200.0 }));
        editor.handle_event(&InputEvent::KeyPressed(Key::Char('c')));
        assert_eq!(editor.scene().len(), 1);
    }
}
