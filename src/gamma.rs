// Lookup tables for gamma-correct overlay compositing.
// Visual: smooth-scaled overlay edges fade into the camera image without dark halos.

/// Steps in the linear -> sRGB table.
const LINEAR_STEPS: usize = 4096;

fn decode(c: f32) -> f32 {
    if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
}

fn encode(l: f32) -> f32 {
    if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 }
}

pub struct GammaLut {
    to_linear: [f32; 256],
    // index = (linear * (LINEAR_STEPS - 1)).round()
    to_srgb: [u8; LINEAR_STEPS],
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaLut {
    pub fn new() -> Self {
        let top = (LINEAR_STEPS - 1) as f32;
        Self {
            to_linear: std::array::from_fn(|v| decode(v as f32 / 255.0)),
            to_srgb: std::array::from_fn(|i| {
                (encode(i as f32 / top) * 255.0).round().clamp(0.0, 255.0) as u8
            }),
        }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * (LINEAR_STEPS - 1) as f32).round() as usize;
        self.to_srgb[idx]
    }

    /// One channel of straight-alpha `over` on top of `under`, mixed in linear light.
    /// Visual: a half-covered red cell over a bright background reads pink, not grey.
    #[inline]
    pub fn mix(&self, over: u8, under: u8, alpha: f32) -> u8 {
        let alpha = alpha.clamp(0.0, 1.0);
        let l = alpha * self.srgb_u8_to_linear(over)
            + (1.0 - alpha) * self.srgb_u8_to_linear(under);
        self.linear_to_srgb_u8(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_exactly() {
        let lut = GammaLut::new();
        assert_eq!(lut.srgb_u8_to_linear(0), 0.0);
        assert!((lut.srgb_u8_to_linear(255) - 1.0).abs() < 1e-6);
        assert_eq!(lut.linear_to_srgb_u8(0.0), 0);
        assert_eq!(lut.linear_to_srgb_u8(1.0), 255);
        assert_eq!(lut.linear_to_srgb_u8(7.0), 255);
    }

    #[test]
    fn round_trip_stays_within_one_step() {
        let lut = GammaLut::new();
        for v in 0..=255u8 {
            let back = lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(v));
            assert!(back.abs_diff(v) <= 1, "{v} -> {back}");
        }
    }

    #[test]
    fn mixing_a_channel_with_itself_keeps_it() {
        let lut = GammaLut::new();
        for a in 0..=255u8 {
            let alpha = a as f32 / 255.0;
            assert_eq!(lut.mix(255, 255, alpha), 255, "alpha {a}");
            assert_eq!(lut.mix(0, 0, alpha), 0, "alpha {a}");
        }
    }

    #[test]
    fn mix_is_brighter_than_a_straight_srgb_average() {
        let lut = GammaLut::new();
        // linear-light mixing of black and white at 50% lands well above 128
        let m = lut.mix(255, 0, 0.5);
        assert!(m > 180 && m < 200, "got {m}");
        assert!(lut.mix(200, 40, 1.0).abs_diff(200) <= 1);
        assert!(lut.mix(200, 40, 0.0).abs_diff(40) <= 1);
    }
}
