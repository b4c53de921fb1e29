//! Platform layer: windowing, event loop and input routing.
//!
//! - Redraws continuously; the scene advances on wall-clock time.
//! - The cursor is locked for mouse look and released on focus loss.
//! - Keyboard keys are mapped to logical [`Action`]s before reaching the scene.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, anyhow};
use corelib::input::{Action, InputState};
use renderer::{GpuState, Scene, SurfaceError};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

/// Window and GPU options for [`run`].
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub backends: wgpu::Backends,
}

/// Keyboard layout of the demo.
pub fn action_for_key(code: KeyCode) -> Option<Action> {
    Some(match code {
        KeyCode::KeyW => Action::MoveForward,
        KeyCode::KeyS => Action::MoveBack,
        KeyCode::KeyA => Action::StrafeLeft,
        KeyCode::KeyD => Action::StrafeRight,
        KeyCode::KeyQ => Action::MoveDown,
        KeyCode::KeyE => Action::MoveUp,
        KeyCode::KeyF => Action::ToggleDayNight,
        KeyCode::KeyG => Action::ToggleFog,
        KeyCode::KeyH => Action::ToggleOverlay,
        _ => return None,
    })
}

/// Open a window, initialise the scene and run until the window closes.
pub fn run<S: Scene>(options: RunOptions, scene: S) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow!("Failed to create event loop: {e}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        options,
        scene,
        window: None,
        gpu: None,
        input: InputState::new(),
        start: Instant::now(),
        cursor_locked: false,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App<S> {
    options: RunOptions,
    scene: S,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    input: InputState,
    start: Instant,
    cursor_locked: bool,
    /// First fatal error; reported once the loop has exited.
    error: Option<anyhow::Error>,
}

impl<S: Scene> App<S> {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| anyhow!("Failed to create window: {e}"))?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let gpu = GpuState::new_blocking(window.clone(), self.options.backends)?;
        self.scene.init(&gpu)?;

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.set_cursor_lock(true);
        self.start = Instant::now();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }

    fn set_cursor_lock(&mut self, locked: bool) {
        let Some(window) = &self.window else {
            return;
        };
        let result = if locked {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        match result {
            Ok(()) => {
                window.set_cursor_visible(!locked);
                self.cursor_locked = locked;
            }
            Err(e) => log::warn!("Cursor grab change failed: {e}"),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let t = self.start.elapsed().as_secs_f32();
        self.scene.update(t, &mut self.input);

        match self.scene.render(gpu) {
            Ok(()) => {}
            Err(err) if GpuState::is_surface_lost(&err) => {
                log::warn!("Surface {err:?}, reconfiguring");
                gpu.recreate_surface();
            }
            Err(SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow!("GPU out of memory"));
            }
            Err(err) => log::warn!("Dropped frame: {err:?}"),
        }
    }
}

impl<S: Scene> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                log::info!("Resized: {}x{}", new_size.width, new_size.height);
                if new_size.width == 0 || new_size.height == 0 {
                    return;
                }
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size.width, new_size.height);
                    self.scene.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.input.clear();
                self.set_cursor_lock(false);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !self.cursor_locked => self.set_cursor_lock(true),
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let pressed = event.state.is_pressed();
                if code == KeyCode::Escape && pressed {
                    if self.cursor_locked {
                        self.set_cursor_lock(false);
                    } else {
                        event_loop.exit();
                    }
                } else if let Some(action) = action_for_key(code) {
                    self.input.set(action, pressed);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.cursor_locked {
                self.input.add_mouse_delta(dx as f32, dy as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_qe_and_toggles_are_mapped() {
        assert_eq!(action_for_key(KeyCode::KeyW), Some(Action::MoveForward));
        assert_eq!(action_for_key(KeyCode::KeyD), Some(Action::StrafeRight));
        assert_eq!(action_for_key(KeyCode::KeyQ), Some(Action::MoveDown));
        assert_eq!(action_for_key(KeyCode::KeyF), Some(Action::ToggleDayNight));
        assert_eq!(action_for_key(KeyCode::KeyG), Some(Action::ToggleFog));
        assert_eq!(action_for_key(KeyCode::Space), None);
    }
}
