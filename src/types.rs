// Core pixel types shared by capture, the visualizer and the window.

use image::{Rgba, RgbaImage};

/// One captured or derived image: RGBA, 8 bits per channel, row-major.
/// Dimensions are fixed for the lifetime of the value.
pub type Frame = RgbaImage;

/// Overlay colour for a pixel that changed recently.
pub const MARK: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Overlay colour for a pixel with nothing to show.
/// Same RGB as `MARK` so a smooth upscale only fades alpha at the overlay edge.
pub const CLEAR: Rgba<u8> = Rgba([255, 0, 0, 0]);

/// What the window shows: each entry is 0x00RRGGBB for minifb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u32; width * height],
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_and_unpack_agree() {
        let px = pack_rgb(0x12, 0x34, 0x56);
        assert_eq!(px, 0x0012_3456);
        assert_eq!(unpack_rgb(px), (0x12, 0x34, 0x56));
    }

    #[test]
    fn new_framebuffer_is_black() {
        let fb = FrameBuffer::new(3, 2);
        assert_eq!(fb.pixels.len(), 6);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }
}
