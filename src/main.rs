//! Interactive editor for a scene of cubes and spheres.
//!
//! Objects are created, selected, moved, rotated and resized with the mouse
//! and keyboard in a 3D viewport. Uses iced for UI and wgpu for GPU rendering.

use iced::widget::{Button, Column, Row, Shader, Slider, container, text};
use iced::{Element, Length, Settings, Task};
use log::{error, info, warn};

mod arcball;
mod camera;
mod config;
mod editor;
mod error;
mod group;
mod input;
mod math;
mod object;
mod picking;
mod projection;
mod ray_casting;
mod render;
mod renderer;
mod shader_widget;

use config::{CameraConfig, EditorConfig};
use editor::Editor;
use input::{InputEvent, InputHandler};
use shader_widget::ViewportProgram;

/// Main application state; the editor owns the scene and camera
#[derive(Debug)]
pub(crate) struct SketchApp {
    editor: Editor,
}

/// Messages that the application can receive
#[derive(Debug, Clone)]
pub(crate) enum Message {
    Input(InputEvent),
    SizeChanged(f32),
    ZoomChanged(f32),
    ResetView,
    ViewAll,
}

impl SketchApp {
    pub(crate) fn new(editor: Editor) -> Self {
        Self { editor }
    }

    pub(crate) fn title(&self) -> &'static str {
        "Solid Sketch"
    }

    pub(crate) fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Input(event) => {
                self.editor.handle_event(&event);
            }
            Message::SizeChanged(size) => {
                if let Err(err) = self.editor.set_size_control(size) {
                    warn!("size control rejected {size}: {err}");
                }
            }
            Message::ZoomChanged(fov) => {
                if let Err(err) = self.editor.set_zoom_control(fov) {
                    warn!("zoom control rejected {fov}: {err}");
                }
            }
            Message::ResetView => self.editor.reset_view(),
            Message::ViewAll => self.editor.view_all(),
        }

        Task::none()
    }

    pub(crate) fn view(&self) -> Element<Message> {
        let config = self.editor.config();
        let camera = &config.camera;

        // Left pane with controls
        let controls = Column::new()
            .spacing(20)
            .push(
                Column::new()
                    .spacing(5)
                    .push(text("Object Size"))
                    .push(
                        Slider::new(
                            config.min_size..=config.max_size,
                            self.editor.size_control(),
                            Message::SizeChanged,
                        )
                        .step(0.1)
                        .width(250),
                    ),
            )
            .push(
                Column::new()
                    .spacing(5)
                    .push(text("Zoom"))
                    .push(
                        Slider::new(
                            camera.min_fov..=camera.max_fov,
                            self.editor.zoom_control(),
                            Message::ZoomChanged,
                        )
                        .step(camera.zoom_step)
                        .width(250),
                    ),
            )
            .push(
                Row::new()
                    .spacing(10)
                    .push(Button::new(text("Reset View")).on_press(Message::ResetView))
                    .push(Button::new(text("View All")).on_press(Message::ViewAll)),
            )
            .push(text(format!(
                "{} objects, {} selected",
                self.editor.scene().len(),
                self.editor.group().len()
            )));

        // Right pane with 3D viewport
        let viewport = Shader::new(ViewportProgram::new(&self.editor))
            .width(Length::Fill)
            .height(Length::Fill);

        Row::new()
            .spacing(10)
            .padding(10)
            .push(container(controls).width(Length::Shrink).height(Length::Fill))
            .push(viewport)
            .into()
    }
}

/// Comma-separated components, e.g. `1,2.5,-3`; any part that is not a number fails
fn parse_components(text: &str) -> error::Result<Vec<f32>> {
    text.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse()
                .map_err(|_| error::SceneError::InvalidNumber(part.to_string()))
        })
        .collect()
}

/// Reads the command line: `--coarse` selects the lighter preset and
/// `--eye x,y,z` moves the starting camera
fn editor_config(mut args: impl Iterator<Item = String>) -> error::Result<EditorConfig> {
    let mut config = EditorConfig::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--coarse" => {
                config = EditorConfig {
                    camera: config.camera,
                    ..EditorConfig::coarse()
                };
            }
            "--eye" => {
                let values = parse_components(&args.next().unwrap_or_default())?;
                let camera = &config.camera;
                config.camera = CameraConfig::from_slices(
                    &values,
                    camera.up.as_slice(),
                    camera.pointer.as_slice(),
                    camera.left.as_slice(),
                )?;
            }
            other => warn!("ignoring unknown argument {other}"),
        }
    }
    Ok(config)
}

fn main() -> iced::Result {
    env_logger::builder().format_timestamp(None).init();

    let editor = match editor_config(std::env::args().skip(1)).and_then(Editor::new) {
        Ok(editor) => editor,
        Err(err) => {
            error!("invalid editor configuration: {err}");
            std::process::exit(1);
        }
    };
    info!("starting with {:?}", editor.config());

    let app = SketchApp::new(editor);
    iced::application(app.title(), SketchApp::update, SketchApp::view)
        .settings(Settings {
            antialiasing: true,
            ..Settings::default()
        })
        .run_with(move || (app, Task::none()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use error::SceneError;
    use nalgebra::Point3;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn eye_sets_the_starting_position() {
        let config = editor_config(args(&["--eye", "1, 2,-3"])).unwrap();
        assert_eq!(config.camera.position, Point3::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn eye_with_a_bad_component_is_rejected() {
        assert_eq!(
            editor_config(args(&["--eye", "1,x,3,4"])),
            Err(SceneError::InvalidNumber("x".to_string()))
        );
        assert_eq!(
            editor_config(args(&["--eye"])),
            Err(SceneError::InvalidNumber(String::new()))
        );
    }

    #[test]
    fn eye_with_too_few_components_is_rejected() {
        assert!(matches!(
            editor_config(args(&["--eye", "1,2"])),
            Err(SceneError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn coarse_keeps_the_chosen_eye() {
        let config = editor_config(args(&["--eye", "0,1,5", "--coarse"])).unwrap();
        assert_eq!(config.camera.position, Point3::new(0.0, 1.0, 5.0));
        assert_eq!(config.pick_size, EditorConfig::coarse().pick_size);
    }
}
