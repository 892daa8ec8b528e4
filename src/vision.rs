// Per-pixel helpers for the change visualizer.
// Visual expectation: the camera image gets pixelated down to the working grid,
// and the red change overlay is scaled back up and laid over it.

use image::Rgba;
use image::imageops::{self, FilterType};

use crate::error::{Error, Result};
use crate::gamma::GammaLut;
use crate::types::{Frame, FrameBuffer, pack_rgb, unpack_rgb};

/// How frames are scaled up to the window. Downsampling always uses a triangle filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ResampleFilter {
    /// Hard pixel edges (blocky look).
    #[default]
    Nearest,
    /// Smooth edges; overlay alpha becomes fractional at borders.
    Bilinear,
}

impl ResampleFilter {
    fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Bilinear => FilterType::Triangle,
        }
    }
}

/// Aspect-preserving height for a grid `working_width` columns wide.
/// Rounds to nearest and never returns 0.
/// Visual: grid cells stay square whatever the camera's aspect ratio.
pub fn working_height(working_width: u32, src_width: u32, src_height: u32) -> u32 {
    if src_width == 0 {
        return 1;
    }
    let w = working_width as u64;
    let num = w * src_height as u64 + src_width as u64 / 2;
    let h = num / src_width as u64;
    h.clamp(1, u32::MAX as u64) as u32
}

/// Scale `src` to exactly `width` x `height`. Same-size input is copied untouched.
/// Visual: each grid cell shows the average colour of the camera pixels it covers.
pub fn downsample(src: &Frame, width: u32, height: u32) -> Frame {
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    imageops::resize(src, width, height, FilterType::Triangle)
}

/// Summed absolute RGB difference. Alpha is ignored.
/// Visual: a dim flicker stays under the threshold; a hand passing by does not.
#[inline]
pub fn change_magnitude(current: &Rgba<u8>, previous: &Rgba<u8>) -> u32 {
    let [cr, cg, cb, _] = current.0;
    let [pr, pg, pb, _] = previous.0;
    cr.abs_diff(pr) as u32 + cg.abs_diff(pg) as u32 + cb.abs_diff(pb) as u32
}

/// Scale `src` to an overlay of `width` x `height`, keeping alpha.
/// Visual: nearest gives hard red blocks; bilinear softens their borders.
pub fn scale_to(src: &Frame, width: u32, height: u32, filter: ResampleFilter) -> Frame {
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    imageops::resize(src, width, height, filter.filter_type())
}

/// Paint `src` (alpha ignored) over the whole window buffer.
/// Visual: the pixelated camera image filling the window.
pub fn upscale_into(src: &Frame, dst: &mut FrameBuffer, filter: ResampleFilter) {
    if dst.width == 0 || dst.height == 0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let scaled = scale_to(src, dst.width as u32, dst.height as u32, filter);
    for (out, px) in dst.pixels.iter_mut().zip(scaled.pixels()) {
        let [r, g, b, _] = px.0;
        *out = pack_rgb(r, g, b);
    }
}

/// Alpha-composite a window-sized overlay onto `dst` in linear light.
/// Fully transparent pixels are skipped and fully opaque pixels replace outright.
/// Visual: red cells sit on the camera image; soft edges blend without darkening.
pub fn composite_over(dst: &mut FrameBuffer, overlay: &Frame, lut: &GammaLut) -> Result<()> {
    if overlay.width() as usize != dst.width || overlay.height() as usize != dst.height {
        return Err(Error::invalid_frame(format!(
            "composite: overlay {}x{} does not match window {}x{}",
            overlay.width(),
            overlay.height(),
            dst.width,
            dst.height
        )));
    }

    for (out, px) in dst.pixels.iter_mut().zip(overlay.pixels()) {
        let [r, g, b, a] = px.0;
        if a == 0 {
            continue;
        }
        if a == 255 {
            *out = pack_rgb(r, g, b);
            continue;
        }

        let (br, bg, bb) = unpack_rgb(*out);
        let alpha = a as f32 / 255.0;
        *out = pack_rgb(lut.mix(r, br, alpha), lut.mix(g, bg, alpha), lut.mix(b, bb, alpha));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CLEAR, MARK};

    #[test]
    fn working_height_rounds_and_preserves_aspect() {
        assert_eq!(working_height(20, 640, 480), 15);
        assert_eq!(working_height(4, 4, 4), 4);
        // 10 * 480 / 640 = 7.5 -> 8
        assert_eq!(working_height(10, 640, 480), 8);
        // 3 * 720 / 1280 = 1.6875 -> 2
        assert_eq!(working_height(3, 1280, 720), 2);
    }

    #[test]
    fn working_height_is_never_zero() {
        assert_eq!(working_height(2, 1920, 10), 1);
        assert_eq!(working_height(0, 640, 480), 1);
        assert_eq!(working_height(5, 0, 480), 1);
    }

    #[test]
    fn downsample_hits_requested_dimensions() {
        let src = Frame::from_pixel(64, 48, Rgba([10, 20, 30, 255]));
        let small = downsample(&src, 8, 6);
        assert_eq!(small.dimensions(), (8, 6));
        assert_eq!(*small.get_pixel(3, 3), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn downsample_same_size_is_identity() {
        let mut src = Frame::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        src.put_pixel(2, 2, Rgba([200, 0, 0, 255]));
        assert_eq!(downsample(&src, 4, 4), src);
    }

    #[test]
    fn change_magnitude_sums_rgb_and_ignores_alpha() {
        let a = Rgba([200, 10, 0, 0]);
        let b = Rgba([100, 30, 5, 255]);
        assert_eq!(change_magnitude(&a, &b), 100 + 20 + 5);
        assert_eq!(change_magnitude(&b, &a), 125);
        assert_eq!(change_magnitude(&a, &a), 0);
    }

    #[test]
    fn upscale_nearest_replicates_blocks() {
        let mut src = Frame::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        let mut fb = FrameBuffer::new(4, 4);
        upscale_into(&src, &mut fb, ResampleFilter::Nearest);
        assert_eq!(fb.pixels[0], 0);
        assert_eq!(fb.pixels[3], 0x00FF_FFFF);
        assert_eq!(fb.pixels[4 * 3], 0);
    }

    #[test]
    fn composite_skips_clear_and_replaces_opaque() {
        let lut = GammaLut::new();
        let mut fb = FrameBuffer::new(2, 1);
        fb.clear(0x0011_2233);
        let mut overlay = Frame::from_pixel(2, 1, CLEAR);
        overlay.put_pixel(1, 0, MARK);
        composite_over(&mut fb, &overlay, &lut).unwrap();
        assert_eq!(fb.pixels, vec![0x0011_2233, 0x00FF_0000]);
    }

    #[test]
    fn composite_blends_partial_alpha_between_layers() {
        let lut = GammaLut::new();
        let mut fb = FrameBuffer::new(1, 1);
        fb.clear(0);
        let overlay = Frame::from_pixel(1, 1, Rgba([255, 0, 0, 128]));
        composite_over(&mut fb, &overlay, &lut).unwrap();
        let (r, g, b) = unpack_rgb(fb.pixels[0]);
        assert!(r > 0 && r < 255, "red should be partially mixed, got {r}");
        assert_eq!((g, b), (0, 0));
    }

    fn mark_then_clear() -> Frame {
        let mut row = Frame::from_pixel(2, 1, CLEAR);
        row.put_pixel(0, 0, MARK);
        row
    }

    #[test]
    fn bilinear_overlay_edge_fades_alpha_only() {
        let wide = scale_to(&mark_then_clear(), 8, 1, ResampleFilter::Bilinear);
        assert!(wide.pixels().any(|p| p[3] > 0 && p[3] < 255), "edge should be soft");
        for (x, _, px) in wide.enumerate_pixels() {
            if px[3] > 0 {
                assert_eq!(px[0], 255, "red dropped at x={x}: {px:?}");
            }
        }
    }

    #[test]
    fn bilinear_edge_over_white_has_no_dark_fringe() {
        let lut = GammaLut::new();
        let wide = scale_to(&mark_then_clear(), 8, 1, ResampleFilter::Bilinear);
        let mut fb = FrameBuffer::new(8, 1);
        fb.clear(0x00FF_FFFF);
        composite_over(&mut fb, &wide, &lut).unwrap();

        let row: Vec<(u8, u8, u8)> = fb.pixels.iter().map(|&p| unpack_rgb(p)).collect();
        assert_eq!(row[0], (255, 0, 0));
        assert_eq!(row[7], (255, 255, 255));
        assert!(row.iter().all(|&(r, _, _)| r == 255), "{row:?}");
        // red fades straight into white: green and blue only ever rise
        assert!(
            row.windows(2).all(|w| w[0].1 <= w[1].1 && w[0].2 <= w[1].2),
            "{row:?}"
        );
    }

    #[test]
    fn composite_rejects_mismatched_sizes() {
        let lut = GammaLut::new();
        let mut fb = FrameBuffer::new(2, 2);
        let overlay = Frame::from_pixel(3, 2, MARK);
        assert!(composite_over(&mut fb, &overlay, &lut).is_err());
    }
}
