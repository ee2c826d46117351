use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::camera::CameraState;
use crate::display::{Framebuffer, SharedFrame};
use crate::input::{self, DirectionLatch, Motion};
use crate::renderer::{RenderView, render_frame};
use crate::world::{Palette, WorldMap};

/// Sole owner of the camera. Each step applies at most one input code and
/// then renders a full frame into the back buffer.
pub struct FrameLoop {
    world: WorldMap,
    palette: Palette,
    camera: CameraState,
    latch: DirectionLatch,
    motion: Motion,
    view: RenderView,
    back: Framebuffer,
}

impl FrameLoop {
    pub fn new(
        world: WorldMap,
        palette: Palette,
        camera: CameraState,
        motion: Motion,
        view: RenderView,
    ) -> Self {
        Self {
            world,
            palette,
            camera,
            latch: DirectionLatch::default(),
            motion,
            back: Framebuffer::new(view.width, view.height),
            view,
        }
    }

    #[cfg(test)]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    #[cfg(test)]
    pub fn frame(&self) -> &Framebuffer {
        &self.back
    }

    fn handle_input(&mut self, code: u64) {
        let direction = self.latch.resolve(code);
        debug!("input {code:#x} -> {}", direction.name());
        input::apply(direction, &mut self.camera, &self.world, &self.motion);
    }

    fn render(&mut self) {
        render_frame(
            &mut self.back,
            &self.world,
            &self.palette,
            &self.camera,
            &self.view,
        );
    }

    pub fn step(&mut self, code: Option<u64>) {
        if let Some(code) = code {
            self.handle_input(code);
        }
        self.render();
    }

    /// Poll, update, wait, render, publish. Codes that arrive faster than the
    /// frame delay are coalesced to the newest. Returns once every input
    /// sender has been dropped.
    pub fn run(mut self, input: Receiver<u64>, shared: SharedFrame, frame_delay: Duration) {
        info!(
            "frame loop started at ({:.2}, {:.2}), {} ms per frame",
            self.camera.pos[0],
            self.camera.pos[1],
            frame_delay.as_millis()
        );
        loop {
            let (code, closed) = poll_latest(&input);
            if let Some(code) = code {
                self.handle_input(code);
            }

            thread::sleep(frame_delay);

            let started = Instant::now();
            self.step(None);
            shared.publish(&self.back);
            trace!("frame rendered in {:?}", started.elapsed());

            if closed {
                break;
            }
        }
        info!("input closed, frame loop stopped");
    }
}

/// Single pending slot: everything queued since the last poll collapses to
/// the newest code. Also reports whether every sender is gone.
fn poll_latest(input: &Receiver<u64>) -> (Option<u64>, bool) {
    let mut latest = None;
    loop {
        match input.try_recv() {
            Ok(code) => latest = Some(code),
            Err(TryRecvError::Empty) => return (latest, false),
            Err(TryRecvError::Disconnected) => return (latest, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgb_to_color;
    use crate::input::codes;
    use std::sync::mpsc;

    fn frame_loop() -> FrameLoop {
        let camera = CameraState::new([22.0, 12.0], [-1.0, 0.0], [0.0, 0.66]).unwrap();
        FrameLoop::new(
            WorldMap::classic().unwrap(),
            Palette::classic(),
            camera,
            Motion {
                move_speed: 0.5,
                rot_speed: 0.1,
            },
            RenderView {
                width: 32,
                height: 16,
                columns: 32,
                marker: rgb_to_color(0, 255, 0),
            },
        )
    }

    #[test]
    fn repeat_moves_again() {
        let mut fl = frame_loop();
        fl.step(Some(codes::UP));
        fl.step(Some(codes::REPEAT));
        assert_eq!(fl.camera().pos, [21.0, 12.0]);
        fl.step(None);
        assert_eq!(fl.camera().pos, [21.0, 12.0]);
    }

    #[test]
    fn release_then_repeat_stays_put() {
        let mut fl = frame_loop();
        fl.step(Some(codes::OK));
        fl.step(Some(codes::REPEAT));
        assert_eq!(fl.camera().pos, [22.0, 12.0]);
        assert_eq!(fl.camera().dir, [-1.0, 0.0]);
    }

    #[test]
    fn unchanged_camera_renders_same_frame() {
        let mut fl = frame_loop();
        fl.step(Some(codes::LEFT));
        let first = fl.frame().pixels().to_vec();
        fl.step(None);
        assert_eq!(fl.frame().pixels(), first.as_slice());
        assert!(first.iter().any(|&c| c != crate::color::Color::BLACK));
    }

    #[test]
    fn run_publishes_and_stops_when_input_closes() {
        let (tx, rx) = mpsc::channel();
        let shared = SharedFrame::new(32, 16);
        tx.send(codes::UP).unwrap();
        drop(tx);

        // the code queued before the drop is still delivered first
        frame_loop().run(rx, shared.clone(), Duration::ZERO);

        let mut expected = frame_loop();
        expected.step(Some(codes::UP));
        let mut out = vec![crate::color::Color::BLACK; 32 * 16];
        shared.load_into(&mut out);
        assert_eq!(out.as_slice(), expected.frame().pixels());
    }

    #[test]
    fn burst_of_codes_applies_only_the_newest() {
        let burst = [codes::UP, codes::REPEAT, codes::UP, codes::OK];
        let (tx, rx) = mpsc::channel();
        let shared = SharedFrame::new(32, 16);
        for code in burst {
            tx.send(code).unwrap();
        }
        drop(tx);

        frame_loop().run(rx, shared.clone(), Duration::ZERO);
        let mut out = vec![crate::color::Color::BLACK; 32 * 16];
        shared.load_into(&mut out);

        // the release arrived last, so the camera never moved
        let mut newest_only = frame_loop();
        newest_only.step(Some(codes::OK));
        assert_eq!(newest_only.camera().pos, [22.0, 12.0]);
        assert_eq!(out.as_slice(), newest_only.frame().pixels());

        let mut every_code = frame_loop();
        for code in burst {
            every_code.step(Some(code));
        }
        assert_eq!(every_code.camera().pos, [20.5, 12.0]);
        assert_ne!(out.as_slice(), every_code.frame().pixels());
    }

    #[test]
    fn poll_keeps_newest_and_reports_close() {
        let (tx, rx) = mpsc::channel();
        assert_eq!(poll_latest(&rx), (None, false));
        tx.send(codes::LEFT).unwrap();
        tx.send(codes::OK).unwrap();
        assert_eq!(poll_latest(&rx), (Some(codes::OK), false));
        assert_eq!(poll_latest(&rx), (None, false));
        tx.send(codes::DOWN).unwrap();
        drop(tx);
        assert_eq!(poll_latest(&rx), (Some(codes::DOWN), true));
    }
}
