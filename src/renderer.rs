use crate::camera::CameraState;
use crate::color::Color;
use crate::raycast::{Side, cast_ray};
use crate::world::{Palette, WorldMap};

// Anything closer than this is drawn as if it were this close.
const MIN_WALL_DIST: f32 = 1e-3;

/// Write-only drawing surface. Coordinates outside the surface are the
/// sink's to clip.
pub trait PixelSink {
    fn clear(&mut self);
    fn set_pixel(&mut self, x: i32, y: i32, color: Color);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub width: usize,
    pub height: usize,
    /// Rays per frame; each covers `width / columns` physical columns.
    pub columns: usize,
    pub marker: Color,
}

impl RenderView {
    #[inline]
    fn column_width(&self) -> usize {
        (self.width / self.columns.max(1)).max(1)
    }
}

/// Projected height of a wall slice at `distance`.
#[inline]
pub fn line_height(screen_h: usize, distance: f32) -> i32 {
    // float to int casts saturate
    (screen_h as f32 / distance.max(MIN_WALL_DIST)).floor() as i32
}

/// Vertically centred span `[start, end)` clamped to the screen.
#[inline]
pub fn column_span(screen_h: usize, line_height: i32) -> (i32, i32) {
    let h = screen_h as i32;
    let start = (h / 2 - line_height / 2).max(0);
    let end = (h / 2).saturating_add(line_height / 2).min(h);
    (start, end)
}

pub fn render_frame<S: PixelSink>(
    sink: &mut S,
    world: &WorldMap,
    palette: &Palette,
    camera: &CameraState,
    view: &RenderView,
) {
    sink.clear();

    // crosshair at the camera's map cell
    let (cx, cy) = camera.cell();
    sink.draw_line(cx - 1, cy, cx + 1, cy, view.marker);
    sink.draw_line(cx, cy - 1, cx, cy + 1, view.marker);

    let col_w = view.column_width();
    for col in 0..view.columns {
        let camera_x = 2.0 * col as f32 / view.columns as f32 - 1.0;
        let hit = cast_ray(world, camera, camera_x);

        let (start, end) = column_span(view.height, line_height(view.height, hit.distance));

        let mut color = palette.color_for(hit.cell);
        if hit.side == Side::Y {
            color = color.shaded();
        }

        let x0 = (col * col_w) as i32;
        for x in x0..x0 + col_w as i32 {
            for y in start..end {
                sink.set_pixel(x, y, color);
            }
        }
    }
}
