use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use rust_bresenham::Bresenham;

use crate::color::Color;
use crate::renderer::PixelSink;

/// Panel-sized RGB565 back buffer. Writes outside the panel are dropped,
/// the way the LED driver ignores them.
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
        }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.offset(x, y).map(|i| self.pixels[i])
    }
}

impl PixelSink for Framebuffer {
    fn clear(&mut self) {
        self.pixels.fill(Color::BLACK);
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = color;
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let from = (x0 as isize, y0 as isize);
        let to = (x1 as isize, y1 as isize);
        // the iterator steps before it yields, so it never returns the start
        self.set_pixel(x0, y0, color);
        for (x, y) in Bresenham::new(from, to) {
            self.set_pixel(x as i32, y as i32, color);
        }
    }
}

/// Panel state shared between the frame loop and the refresh side.
///
/// One writer publishes whole frames; readers load whatever was last
/// published. Every pixel is an independent atomic, so no lock is needed and
/// a reader racing a publish sees at worst a mix of two complete frames.
#[derive(Clone)]
pub struct SharedFrame {
    width: usize,
    height: usize,
    pixels: Arc<[AtomicU16]>,
}

impl SharedFrame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: (0..width * height).map(|_| AtomicU16::new(0)).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn publish(&self, frame: &Framebuffer) {
        debug_assert_eq!(frame.pixels().len(), self.pixels.len());
        for (dst, src) in self.pixels.iter().zip(frame.pixels()) {
            dst.store(src.0, Ordering::Relaxed);
        }
    }

    pub fn load_into(&self, out: &mut [Color]) {
        for (dst, src) in out.iter_mut().zip(self.pixels.iter()) {
            *dst = Color(src.load(Ordering::Relaxed));
        }
    }
}
