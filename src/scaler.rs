use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::color::Color;

/// Color of the board between LEDs.
const GAP_COLOR: u32 = 0x0010_1010;

/// Precomputed mapping from window pixels to panel pixels. `None` lands in
/// the dark gap between two LEDs.
pub struct ScaleLut {
    xs: Vec<Option<usize>>,
    ys: Vec<Option<usize>>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            xs: Vec::new(),
            ys: Vec::new(),
        }
    }

    pub fn dst_width(&self) -> usize {
        self.xs.len()
    }

    pub fn dst_height(&self) -> usize {
        self.ys.len()
    }
}

fn build_axis(dst: usize, src: usize, gap: f32) -> Vec<Option<usize>> {
    let cell = dst as f32 / src as f32;
    (0..dst)
        .map(|d| {
            let f = (d as f32 + 0.5) / cell;
            let s = (f.floor() as usize).min(src.saturating_sub(1));
            // only draw gaps once an LED is a few pixels wide
            let inside = f - s as f32;
            if cell >= 3.0 && inside >= 1.0 - gap {
                None
            } else {
                Some(s)
            }
        })
        .collect()
}

/// `gap` is the fraction of each LED cell left dark, in [0, 1).
pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize, gap: f32) -> ScaleLut {
    if src_w == 0 || src_h == 0 {
        return ScaleLut::empty();
    }
    let gap = gap.clamp(0.0, 0.9);
    ScaleLut {
        xs: build_axis(dst_w, src_w, gap),
        ys: build_axis(dst_h, src_h, gap),
    }
}

/// Parallel nearest-neighbour stretch of the panel into the window.
/// Rows are processed in parallel for cache friendly writes.
pub fn blit_led_matrix(dst: &mut [u32], dw: usize, src: &[Color], sw: usize, lut: &ScaleLut) {
    if dw == 0 || lut.dst_width() != dw {
        return;
    }
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let Some(Some(sy)) = lut.ys.get(y) else {
            dst_row.fill(GAP_COLOR);
            return;
        };
        let row = sy * sw;
        for (out, sx) in dst_row.iter_mut().zip(&lut.xs) {
            *out = match sx {
                Some(sx) => src[row + sx].to_xrgb(),
                None => GAP_COLOR,
            };
        }
    });
}
