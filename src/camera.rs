use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CameraError {
    #[error("camera {0} vector has zero length")]
    ZeroVector(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub pos: [f32; 2],   // (x, y) in map cells, fractional
    pub dir: [f32; 2],   // facing
    pub plane: [f32; 2], // orthogonal to dir, length sets half the FOV
}

impl CameraState {
    pub fn new(pos: [f32; 2], dir: [f32; 2], plane: [f32; 2]) -> Result<Self, CameraError> {
        let camera = Self { pos, dir, plane };
        camera.validate()?;
        Ok(camera)
    }

    pub fn validate(&self) -> Result<(), CameraError> {
        if length_sq(self.dir) <= f32::EPSILON {
            return Err(CameraError::ZeroVector("direction"));
        }
        if length_sq(self.plane) <= f32::EPSILON {
            return Err(CameraError::ZeroVector("plane"));
        }
        Ok(())
    }

    /// Rotate `dir` and `plane` together so the field of view stays in sync.
    pub fn rotate(&mut self, angle: f32) {
        let (s, c) = angle.sin_cos();
        self.dir = rotate(self.dir, c, s);
        self.plane = rotate(self.plane, c, s);
    }

    /// Ray direction for a camera-space column coordinate in [-1, 1].
    #[inline]
    pub fn ray_dir(&self, camera_x: f32) -> [f32; 2] {
        [
            self.dir[0] + self.plane[0] * camera_x,
            self.dir[1] + self.plane[1] * camera_x,
        ]
    }

    #[inline]
    pub fn cell(&self) -> (i32, i32) {
        (self.pos[0].floor() as i32, self.pos[1].floor() as i32)
    }
}

#[inline]
fn rotate(v: [f32; 2], c: f32, s: f32) -> [f32; 2] {
    [v[0] * c - v[1] * s, v[0] * s + v[1] * c]
}

#[inline]
fn length_sq(v: [f32; 2]) -> f32 {
    v[0] * v[0] + v[1] * v[1]
}
