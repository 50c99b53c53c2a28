//! Greyscale frame for particle positions
//!
//! Black background with a small white square per particle. `y` grows
//! upward in simulation space and downward in the image.

use glam::Vec2;
use std::io::Write;
use std::path::Path;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 800;

/// Side length of the square drawn per particle, in pixels
const MARKER_SIZE: u32 = 2;

pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Clear the frame and draw every position in `[0, 1]²`.
    pub fn draw(&mut self, positions: impl IntoIterator<Item = Vec2>) {
        self.clear();
        for position in positions {
            let x = (position.x * self.width as f32) as i64;
            let y = ((1.0 - position.y) * self.height as f32) as i64;
            self.fill_marker(x, y);
        }
    }

    fn fill_marker(&mut self, x: i64, y: i64) {
        for dy in 0..MARKER_SIZE as i64 {
            for dx in 0..MARKER_SIZE as i64 {
                let (px, py) = (x + dx, y + dy);
                if px >= 0 && py >= 0 && px < self.width as i64 && py < self.height as i64 {
                    self.pixels[(py as u32 * self.width + px as u32) as usize] = 255;
                }
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&p| p > 0).count()
    }

    /// Encode as binary PGM (P5).
    pub fn write_pgm(&self, mut out: impl Write) -> std::io::Result<()> {
        write!(out, "P5\n{} {}\n255\n", self.width, self.height)?;
        out.write_all(&self.pixels)
    }

    pub fn save_pgm(&self, path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_pgm(std::io::BufWriter::new(file))
    }
}
