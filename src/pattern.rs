// Synthetic capture source: a bright square bouncing over a dark background.
// Visual: with no webcam, the red trail follows the square around the window.

use image::Rgba;

use crate::types::Frame;
use crate::visualizer::CaptureSource;

const BACKGROUND: Rgba<u8> = Rgba([16, 16, 24, 255]);
const SQUARE: Rgba<u8> = Rgba([240, 240, 220, 255]);

pub struct PatternSource {
    width: u32,
    height: u32,
    side: u32,
    speed: (i64, i64),
    warmup: u32,
    frame_index: u64,
}

impl PatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            side: (width.min(height) / 6).max(1),
            speed: (7, 5),
            warmup: 0,
            frame_index: 0,
        }
    }

    /// Report "not ready" for the first `ticks` calls, like a camera still negotiating.
    pub fn with_warmup(mut self, ticks: u32) -> Self {
        self.warmup = ticks;
        self
    }

    /// Top-left corner of the square for a given frame number.
    pub fn square_origin(&self, frame_index: u64) -> (u32, u32) {
        let x = bounce(frame_index as i64 * self.speed.0, self.width.saturating_sub(self.side));
        let y = bounce(frame_index as i64 * self.speed.1, self.height.saturating_sub(self.side));
        (x, y)
    }

    fn render(&self, frame_index: u64) -> Frame {
        let (ox, oy) = self.square_origin(frame_index);
        let mut frame = Frame::from_pixel(self.width, self.height, BACKGROUND);
        for y in oy..(oy + self.side).min(self.height) {
            for x in ox..(ox + self.side).min(self.width) {
                frame.put_pixel(x, y, SQUARE);
            }
        }
        frame
    }
}

impl CaptureSource for PatternSource {
    fn try_frame(&mut self) -> Option<Frame> {
        if self.warmup > 0 {
            self.warmup -= 1;
            return None;
        }
        let frame = self.render(self.frame_index);
        self.frame_index += 1;
        Some(frame)
    }
}

/// Triangle wave over `0..=span`.
fn bounce(travel: i64, span: u32) -> u32 {
    if span == 0 {
        return 0;
    }
    let span = span as i64;
    let period = 2 * span;
    let t = travel.rem_euclid(period);
    (if t <= span { t } else { period - t }) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_reports_not_ready() {
        let mut src = PatternSource::new(32, 24).with_warmup(2);
        assert!(src.try_frame().is_none());
        assert!(src.try_frame().is_none());
        let frame = src.try_frame().expect("ready after warmup");
        assert_eq!(frame.dimensions(), (32, 24));
    }

    #[test]
    fn square_moves_between_frames() {
        let mut src = PatternSource::new(64, 48);
        let a = src.try_frame().unwrap();
        let b = src.try_frame().unwrap();
        assert_ne!(a, b);
        assert_eq!(*a.get_pixel(0, 0), SQUARE);
        assert_eq!(*a.get_pixel(63, 47), BACKGROUND);
    }

    #[test]
    fn bounce_reflects_at_edges() {
        assert_eq!(bounce(0, 10), 0);
        assert_eq!(bounce(10, 10), 10);
        assert_eq!(bounce(13, 10), 7);
        assert_eq!(bounce(20, 10), 0);
        assert_eq!(bounce(-3, 10), 3);
        assert_eq!(bounce(99, 0), 0);
    }

    #[test]
    fn square_stays_inside_the_frame() {
        let src = PatternSource::new(40, 30);
        for i in 0..500 {
            let (x, y) = src.square_origin(i);
            assert!(x + src.side <= 40 && y + src.side <= 30);
        }
    }
}
