use crate::camera::CameraState;
use crate::world::WorldMap;

/// Codes sent by the remote.
pub mod codes {
    pub const UP: u64 = 0xFF_C03F;
    pub const DOWN: u64 = 0xFF_40BF;
    pub const LEFT: u64 = 0xFF_708F;
    pub const RIGHT: u64 = 0xFF_58A7;
    /// Sent while a button is held down.
    pub const REPEAT: u64 = 0xFFFF_FFFF_FFFF_FFFF;
    /// The centre button. Not bound, so it releases.
    pub const OK: u64 = 0xFF_E01F;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Direction::None => "NONE",
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Set(Direction),
    Hold,
}

const TRANSITIONS: [(u64, Transition); 5] = [
    (codes::UP, Transition::Set(Direction::Up)),
    (codes::DOWN, Transition::Set(Direction::Down)),
    (codes::LEFT, Transition::Set(Direction::Left)),
    (codes::RIGHT, Transition::Set(Direction::Right)),
    (codes::REPEAT, Transition::Hold),
];

fn transition(code: u64) -> Transition {
    TRANSITIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(Transition::Set(Direction::None), |&(_, t)| t)
}

/// Remembers the last resolved direction so a repeat code can re-issue it.
#[derive(Debug, Default)]
pub struct DirectionLatch {
    held: Direction,
}

impl DirectionLatch {
    pub fn resolve(&mut self, code: u64) -> Direction {
        if let Transition::Set(direction) = transition(code) {
            self.held = direction;
        }
        self.held
    }
}

/// Fixed step per input event. Assumes a constant polling cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub move_speed: f32, // cells
    pub rot_speed: f32,  // radians
}

pub fn apply(direction: Direction, camera: &mut CameraState, world: &WorldMap, motion: &Motion) {
    match direction {
        Direction::Up => translate(camera, world, motion.move_speed),
        Direction::Down => translate(camera, world, -motion.move_speed),
        Direction::Left => camera.rotate(motion.rot_speed),
        Direction::Right => camera.rotate(-motion.rot_speed),
        Direction::None => {}
    }
}

/// Move along `dir`, checking each axis on its own so the camera slides
/// along walls instead of stopping dead.
fn translate(camera: &mut CameraState, world: &WorldMap, speed: f32) {
    let next_x = camera.pos[0] + camera.dir[0] * speed;
    if world.is_open(next_x.floor() as i32, camera.pos[1].floor() as i32) {
        camera.pos[0] = next_x;
    }
    let next_y = camera.pos[1] + camera.dir[1] * speed;
    if world.is_open(camera.pos[0].floor() as i32, next_y.floor() as i32) {
        camera.pos[1] = next_y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tests::walled_box;

    const MOTION: Motion = Motion {
        move_speed: 0.5,
        rot_speed: 0.1,
    };

    fn start() -> CameraState {
        CameraState::new([22.0, 12.0], [-1.0, 0.0], [0.0, 0.66]).unwrap()
    }

    #[test]
    fn maps_remote_codes() {
        let mut latch = DirectionLatch::default();
        assert_eq!(latch.resolve(codes::UP), Direction::Up);
        assert_eq!(latch.resolve(codes::DOWN), Direction::Down);
        assert_eq!(latch.resolve(codes::LEFT), Direction::Left);
        assert_eq!(latch.resolve(codes::RIGHT), Direction::Right);
    }

    #[test]
    fn repeat_reissues_last_direction() {
        let mut latch = DirectionLatch::default();
        latch.resolve(codes::LEFT);
        assert_eq!(latch.resolve(codes::REPEAT), Direction::Left);
        assert_eq!(latch.resolve(codes::REPEAT), Direction::Left);
    }

    #[test]
    fn unknown_code_releases_and_repeat_keeps_it_released() {
        let mut latch = DirectionLatch::default();
        latch.resolve(codes::UP);
        assert_eq!(latch.resolve(codes::OK), Direction::None);
        assert_eq!(latch.resolve(codes::REPEAT), Direction::None);
        assert_eq!(latch.resolve(0x1234), Direction::None);
    }

    #[test]
    fn three_right_turns_are_reproducible() {
        let world = WorldMap::classic().unwrap();
        let mut cam = start();
        for _ in 0..3 {
            apply(Direction::Right, &mut cam, &world, &MOTION);
        }
        let expected_dir = [-(0.3f32.cos()), 0.3f32.sin()];
        let expected_plane = [0.66 * 0.3f32.sin(), 0.66 * 0.3f32.cos()];
        assert!((cam.dir[0] - expected_dir[0]).abs() < 1e-5);
        assert!((cam.dir[1] - expected_dir[1]).abs() < 1e-5);
        assert!((cam.plane[0] - expected_plane[0]).abs() < 1e-5);
        assert!((cam.plane[1] - expected_plane[1]).abs() < 1e-5);
        assert_eq!(cam.pos, [22.0, 12.0]);
    }

    #[test]
    fn left_then_right_restores_orientation() {
        let world = WorldMap::classic().unwrap();
        let mut cam = start();
        apply(Direction::Left, &mut cam, &world, &MOTION);
        apply(Direction::Right, &mut cam, &world, &MOTION);
        assert!((cam.dir[0] + 1.0).abs() < 1e-5 && cam.dir[1].abs() < 1e-5);
        assert!(cam.plane[0].abs() < 1e-5 && (cam.plane[1] - 0.66).abs() < 1e-5);
    }

    #[test]
    fn forward_and_back_move_along_dir() {
        let world = WorldMap::classic().unwrap();
        let mut cam = start();
        apply(Direction::Up, &mut cam, &world, &MOTION);
        assert_eq!(cam.pos, [21.5, 12.0]);
        apply(Direction::Down, &mut cam, &world, &MOTION);
        assert_eq!(cam.pos, [22.0, 12.0]);
        apply(Direction::None, &mut cam, &world, &MOTION);
        assert_eq!(cam.pos, [22.0, 12.0]);
    }

    #[test]
    fn slides_along_walls() {
        let world = WorldMap::from_columns(&walled_box(8, 8)).unwrap();
        // heading diagonally into the west wall
        let mut cam = CameraState::new([1.2, 4.0], [-0.6, 0.8], [0.528, 0.396]).unwrap();
        apply(Direction::Up, &mut cam, &world, &MOTION);
        assert_eq!(cam.pos[0], 1.2);
        assert!((cam.pos[1] - 4.4).abs() < 1e-5);
    }

    #[test]
    fn never_enters_an_occupied_cell() {
        let world = WorldMap::classic().unwrap();
        let mut cam = CameraState::new([3.5, 3.5], [1.0, 0.0], [0.0, 0.66]).unwrap();
        for step in 0..400 {
            let direction = match step % 7 {
                0 | 1 | 2 => Direction::Up,
                3 => Direction::Left,
                4 => Direction::Down,
                _ => Direction::Up,
            };
            apply(direction, &mut cam, &world, &MOTION);
            if step % 13 == 0 {
                cam.rotate(0.9);
            }
            let (x, y) = cam.cell();
            assert!(world.is_open(x, y), "step {step}: entered ({x}, {y})");
        }
    }
}
