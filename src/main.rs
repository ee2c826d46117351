use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info};
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::color::Color;
use crate::display::SharedFrame;
use crate::frame_loop::FrameLoop;
use crate::input::codes;
use crate::scaler::{ScaleLut, blit_led_matrix, build_scale_lut};
use crate::settings::{Settings, SettingsError};
use crate::world::{Palette, WorldError, WorldMap};

mod camera;
mod color;
mod display;
mod frame_loop;
mod input;
mod raycast;
mod renderer;
mod scaler;
mod settings;
mod world;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Stands in for the IR receiver: arrows or WASD send the remote's codes,
/// keyboard auto-repeat sends the repeat code, anything else releases.
fn remote_code(key: KeyCode, repeat: bool) -> u64 {
    if repeat {
        return codes::REPEAT;
    }
    match key {
        KeyCode::ArrowUp | KeyCode::KeyW => codes::UP,
        KeyCode::ArrowDown | KeyCode::KeyS => codes::DOWN,
        KeyCode::ArrowLeft | KeyCode::KeyA => codes::LEFT,
        KeyCode::ArrowRight | KeyCode::KeyD => codes::RIGHT,
        _ => codes::OK,
    }
}

/// Desktop preview of the LED panel. The window plays the refresh side:
/// it redraws from the shared frame on its own cadence while the frame loop
/// renders on another thread.
struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    frame: SharedFrame,
    panel: Vec<Color>,
    scale_lut: ScaleLut,
    pixel_scale: u32,
    led_gap: f32,
    refresh_interval: Duration,

    input: Option<Sender<u64>>,
    frame_thread: Option<JoinHandle<()>>,
}

impl App {
    fn new(
        settings: &Settings,
        frame: SharedFrame,
        input: Sender<u64>,
        frame_thread: JoinHandle<()>,
    ) -> Self {
        Self {
            window: None,
            surface: None,
            panel: vec![Color::BLACK; frame.width() * frame.height()],
            frame,
            scale_lut: ScaleLut::empty(),
            pixel_scale: settings.panel.pixel_scale,
            led_gap: settings.panel.led_gap,
            refresh_interval: settings.timing.refresh_interval(),
            input: Some(input),
            frame_thread: Some(frame_thread),
        }
    }

    fn send(&self, code: u64) {
        if let Some(input) = &self.input {
            // a closed channel means the frame loop is already gone
            let _ = input.send(code);
        }
    }

    fn shutdown(&mut self) {
        self.input.take();
        if let Some(handle) = self.frame_thread.take() {
            if handle.join().is_err() {
                error!("frame loop panicked");
            }
        }
    }

    fn redraw(&mut self, id: WindowId) {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return,
        };

        let size = window.inner_size();
        let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return; // Minimized window, skip drawing
        };
        if let Err(e) = surface.resize(dw, dh) {
            error!("surface resize failed: {e}");
            return;
        }

        let (dw, dh) = (dw.get() as usize, dh.get() as usize);
        if self.scale_lut.dst_width() != dw || self.scale_lut.dst_height() != dh {
            self.scale_lut =
                build_scale_lut(dw, dh, self.frame.width(), self.frame.height(), self.led_gap);
        }

        self.frame.load_into(&mut self.panel);

        let mut buf = match surface.buffer_mut() {
            Ok(buf) => buf,
            Err(e) => {
                error!("surface buffer unavailable: {e}");
                return;
            }
        };
        blit_led_matrix(&mut buf, dw, &self.panel, self.frame.width(), &self.scale_lut);
        if let Err(e) = buf.present() {
            error!("present failed: {e}");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let inner = LogicalSize::new(
            self.frame.width() as f64 * self.pixel_scale as f64,
            self.frame.height() as f64 * self.pixel_scale as f64,
        );
        let attributes = Window::default_attributes()
            .with_title("LED Stein")
            .with_inner_size(inner);

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Rc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        match surface {
            Ok(surface) => self.surface = Some(surface),
            Err(e) => {
                error!("failed to create softbuffer surface: {e}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("window closed; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                } else {
                    self.send(remote_code(code, repeat));
                }
            }

            WindowEvent::RedrawRequested => self.redraw(id),

            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Refresh the panel at a fixed rate regardless of the frame loop.
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + self.refresh_interval));
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn main() -> Result<(), StartupError> {
    env_logger::init();

    let settings = Settings::embedded().inspect_err(|e| error!("{e}"))?;

    let world = WorldMap::classic().inspect_err(|e| error!("{e}"))?;
    let palette = Palette::classic();
    world.check_palette(&palette).inspect_err(|e| error!("{e}"))?;
    let camera = settings.start_camera(&world).inspect_err(|e| error!("{e}"))?;

    info!(
        "{}x{} panel, {} ray columns, {}x{} map",
        settings.panel.width,
        settings.panel.height,
        settings.panel.columns,
        world.width(),
        world.height()
    );

    let frame = SharedFrame::new(settings.panel.width, settings.panel.height);
    let (tx, rx) = mpsc::channel();
    let frame_loop = FrameLoop::new(world, palette, camera, settings.motion(), settings.view());
    let shared = frame.clone();
    let frame_delay = settings.timing.frame_delay();
    let frame_thread = thread::spawn(move || frame_loop.run(rx, shared, frame_delay));

    let event_loop = EventLoop::new()?;
    let mut app = App::new(&settings, frame, tx, frame_thread);
    let result = event_loop.run_app(&mut app);
    app.shutdown();
    result.map_err(StartupError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_remote_codes() {
        assert_eq!(remote_code(KeyCode::ArrowUp, false), codes::UP);
        assert_eq!(remote_code(KeyCode::KeyS, false), codes::DOWN);
        assert_eq!(remote_code(KeyCode::ArrowLeft, false), codes::LEFT);
        assert_eq!(remote_code(KeyCode::KeyD, false), codes::RIGHT);
        assert_eq!(remote_code(KeyCode::Space, false), codes::OK);
    }

    #[test]
    fn held_keys_send_repeat() {
        assert_eq!(remote_code(KeyCode::ArrowUp, true), codes::REPEAT);
        assert_eq!(remote_code(KeyCode::Space, true), codes::REPEAT);
    }
}
