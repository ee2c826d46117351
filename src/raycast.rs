use crate::camera::CameraState;
use crate::world::WorldMap;

/// Which kind of grid boundary a ray crossed when it hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Vertical boundary (x stepped).
    X,
    /// Horizontal boundary (y stepped). Drawn shaded.
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32, // perpendicular to the camera plane, never euclidean
    pub side: Side,
    pub cell: u8,
}

/// Distance along the ray between two boundaries of one axis. A zero
/// component never crosses that axis.
#[inline]
fn delta_dist(axis: f32, other: f32) -> f32 {
    if axis == 0.0 {
        f32::INFINITY
    } else {
        (1.0 + (other * other) / (axis * axis)).sqrt()
    }
}

/// Step direction and distance to the first boundary on one axis.
#[inline]
fn initial_step(pos: f32, cell: i32, ray: f32, delta: f32) -> (i32, f32) {
    if delta.is_infinite() {
        // 0 * inf would poison the comparison with NaN
        return (1, f32::INFINITY);
    }
    if ray < 0.0 {
        (-1, (pos - cell as f32) * delta)
    } else {
        (1, (cell as f32 + 1.0 - pos) * delta)
    }
}

/// Walk the grid one boundary at a time from the camera until a wall cell is
/// entered. `camera_x` is the column in camera space, -1 left to 1 right.
///
/// Terminates because the map border is solid and at least one ray component
/// is non-zero whenever `dir` is.
pub fn cast_ray(map: &WorldMap, camera: &CameraState, camera_x: f32) -> RayHit {
    let [pos_x, pos_y] = camera.pos;
    let [ray_x, ray_y] = camera.ray_dir(camera_x);
    let (mut map_x, mut map_y) = camera.cell();

    let delta_x = delta_dist(ray_x, ray_y);
    let delta_y = delta_dist(ray_y, ray_x);
    let (step_x, mut side_x) = initial_step(pos_x, map_x, ray_x, delta_x);
    let (step_y, mut side_y) = initial_step(pos_y, map_y, ray_y, delta_y);

    let mut side;
    loop {
        if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            side = Side::X;
        } else {
            side_y += delta_y;
            map_y += step_y;
            side = Side::Y;
        }
        if !map.is_open(map_x, map_y) {
            break;
        }
    }

    let distance = match side {
        Side::X => (map_x as f32 - pos_x + (1 - step_x) as f32 / 2.0) / ray_x,
        Side::Y => (map_y as f32 - pos_y + (1 - step_y) as f32 / 2.0) / ray_y,
    }
    .abs();

    RayHit {
        distance,
        side,
        cell: map.cell_at(map_x, map_y),
    }
}
