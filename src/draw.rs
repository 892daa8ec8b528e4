// Window, keyboard controls and software drawing.
// Visual effects provided here:
// 1) A window that shows the pixelated camera image with the red change overlay.
// 2) Keyboard "sliders" for persistence and working resolution.
// 3) A tiny 5x7 bitmap font for the persistence/resolution readout.

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::error::{Error, Result};
use crate::types::{Frame, FrameBuffer};
use crate::vision::{ResampleFilter, scale_to};
use crate::visualizer::DisplaySink;

/// Inputs gathered once per loop iteration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub persistence_step: i64,
    pub resolution_step: i64,
    pub reset: bool,
    pub next_camera: bool,
    pub toggle_hud: bool,
}

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::window_init(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::window_update(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Arrow keys repeat while held, like dragging a slider. Shift moves ten at a time.
    pub fn controls(&self) -> Controls {
        let step = if self.window.is_key_down(Key::LeftShift)
            || self.window.is_key_down(Key::RightShift)
        {
            10
        } else {
            1
        };
        let held = |key| self.window.is_key_pressed(key, KeyRepeat::Yes);
        let once = |key| self.window.is_key_pressed(key, KeyRepeat::No);

        let mut c = Controls::default();
        if held(Key::Up) {
            c.persistence_step += step;
        }
        if held(Key::Down) {
            c.persistence_step -= step;
        }
        if held(Key::Right) {
            c.resolution_step += step;
        }
        if held(Key::Left) {
            c.resolution_step -= step;
        }
        c.reset = once(Key::R);
        c.next_camera = once(Key::N);
        c.toggle_hud = once(Key::H);
        c
    }
}

/// Display sink that keeps the last delta buffer scaled to window size.
pub struct OverlayLayer {
    width: u32,
    height: u32,
    filter: ResampleFilter,
    image: Option<Frame>,
}

impl OverlayLayer {
    pub fn new(width: u32, height: u32, filter: ResampleFilter) -> Self {
        Self {
            width,
            height,
            filter,
            image: None,
        }
    }

    /// Forget the last overlay; call once per loop before ticking.
    pub fn clear(&mut self) {
        self.image = None;
    }

    pub fn image(&self) -> Option<&Frame> {
        self.image.as_ref()
    }
}

impl DisplaySink for OverlayLayer {
    fn present(&mut self, buffer: &Frame, target_width: u32, target_height: u32) -> Result<()> {
        if buffer.width() == 0 || buffer.height() == 0 {
            return Err(Error::invalid_frame("overlay: empty delta buffer"));
        }
        self.image = Some(scale_to(buffer, target_width, target_height, self.filter));
        Ok(())
    }

    fn target_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/* ---------- Software drawing: filled blocks and a 5x7 bitmap font ---------- */

/// Fill a `size` x `size` block with its top-left at (x,y), clipped to the buffer.
#[inline]
fn put_block(fb: &mut FrameBuffer, x: i32, y: i32, size: i32, color: u32) {
    for by in y.max(0)..(y + size).min(fb.height as i32) {
        for bx in x.max(0)..(x + size).min(fb.width as i32) {
            fb.pixels[by as usize * fb.width + bx as usize] = color;
        }
    }
}

/// 5x7 glyph rows; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b01110,0b00000,0b00000,0b00000),

        _ => None,
    }
}

/// Visual: a glyph with a black drop shadow so it reads over any camera image.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32, scale: i32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (shadow, c) in [(scale.max(1), 0x0000_0000), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_block(
                        fb,
                        x + rx * scale + shadow,
                        y + ry as i32 * scale + shadow,
                        scale,
                        c,
                    );
                }
            }
        }
    }
}

/// Pixel width of `text` at `scale` (5 px glyph + 1 px gap, no trailing gap).
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 { 0 } else { (n * 6 - 1) * scale }
}

pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32, scale: i32) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color, scale);
        x += 6 * scale;
    }
}

/// Draw `text` horizontally centred with its vertical middle at `center_y`.
pub fn draw_text_centered(fb: &mut FrameBuffer, center_y: i32, text: &str, color: u32, scale: i32) {
    let scale = scale.max(1);
    let x = (fb.width as i32 - text_width(text, scale)) / 2;
    let y = center_y - 7 * scale / 2;
    draw_text_5x7(fb, x, y, text, color, scale);
}

/// The two readout lines shown over the visualizer.
pub fn hud_lines(persistence_frames: u32, working: (u32, u32)) -> [String; 2] {
    let plural = if persistence_frames == 1 { "" } else { "S" };
    [
        format!("PERSISTENCE: {persistence_frames} FRAME{plural}"),
        format!("RESOLUTION: {} X {} PIXELS", working.0, working.1),
    ]
}
