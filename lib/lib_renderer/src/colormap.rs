//! The stress colormap: a blue-cyan-green-yellow-red ramp stored as 256 RGB
//! entries and uploaded as a 1D texture.

use half::f16;

pub const COLORMAP_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    entries: [[f32; 3]; COLORMAP_LEN],
}

impl Colormap {
    pub fn new() -> Self {
        Self {
            entries: std::array::from_fn(|i| ramp(i as f32 / (COLORMAP_LEN - 1) as f32)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[[f32; 3]; COLORMAP_LEN] {
        &self.entries
    }

    /// Interleaved `r, g, b` values, `3 * COLORMAP_LEN` floats.
    pub fn as_floats(&self) -> &[f32] {
        self.entries.as_flattened()
    }

    /// CPU reference for the shader's `textureSample` lookup: `s` is clamped
    /// to `[0, 1]`, texel centers sit at `(i + 0.5) / len`, and values are
    /// linear between neighbours.
    pub fn sample(&self, s: f32) -> [f32; 3] {
        let u = s.clamp(0.0, 1.0) * COLORMAP_LEN as f32 - 0.5;
        let u = u.clamp(0.0, (COLORMAP_LEN - 1) as f32);

        let lo = u.floor() as usize;
        let hi = (lo + 1).min(COLORMAP_LEN - 1);
        let frac = u - lo as f32;

        let [r0, g0, b0] = self.entries[lo];
        let [r1, g1, b1] = self.entries[hi];

        [
            r0 + (r1 - r0) * frac,
            g0 + (g1 - g0) * frac,
            b0 + (b1 - b0) * frac,
        ]
    }

    /// Little-endian texel data for an `Rgba16Float` texture, alpha fixed at 1.
    pub fn to_rgba16f(&self) -> Vec<u8> {
        self.entries
            .iter()
            .flat_map(|&[r, g, b]| [r, g, b, 1.0])
            .flat_map(|value| f16::from_f32(value).to_le_bytes())
            .collect()
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::new()
    }
}

/// Piecewise-linear ramp over `t` in `[0, 1]`: each channel is a clamped tent
/// centred at 0.75 (red), 0.5 (green) and 0.25 (blue).
pub fn ramp(t: f32) -> [f32; 3] {
    let channel = |center: f32| (1.5 - (4.0 * t - center).abs()).clamp(0.0, 1.0);

    [channel(3.0), channel(2.0), channel(1.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
        for (a, e) in actual.into_iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn has_768_floats_in_unit_range() {
        let colormap = Colormap::new();

        assert_eq!(colormap.len(), 256);
        assert_eq!(colormap.as_floats().len(), 768);
        assert!(
            colormap
                .as_floats()
                .iter()
                .all(|value| (0.0..=1.0).contains(value))
        );
    }

    #[test]
    fn ends_are_dark_blue_and_dark_red() {
        let colormap = Colormap::new();

        assert_close(colormap.entries()[0], [0.0, 0.0, 0.5]);
        assert_close(colormap.entries()[255], [0.5, 0.0, 0.0]);
    }

    #[test]
    fn middle_is_green() {
        let colormap = Colormap::new();

        for entry in &colormap.entries()[112..144] {
            assert_eq!(entry[1], 1.0);
            assert!(entry[0] < 1.0 && entry[2] < 1.0);
        }
    }

    #[test]
    fn ramp_saturates_between_tents() {
        assert_close(ramp(0.375), [0.0, 1.0, 1.0]);
        assert_close(ramp(0.625), [1.0, 1.0, 0.0]);
    }

    #[test]
    fn sample_clamps_out_of_range_stress() {
        let colormap = Colormap::new();

        assert_eq!(colormap.sample(-3.0), colormap.entries()[0]);
        assert_eq!(colormap.sample(0.0), colormap.entries()[0]);
        assert_eq!(colormap.sample(1.0), colormap.entries()[255]);
        assert_eq!(colormap.sample(7.5), colormap.entries()[255]);
    }

    #[test]
    fn sample_interpolates_between_texel_centers() {
        let colormap = Colormap::new();
        let entries = colormap.entries();

        let halfway = colormap.sample(11.0 / 256.0);
        let expected = std::array::from_fn(|c| (entries[10][c] + entries[11][c]) / 2.0);

        assert_close(halfway, expected);
    }

    fn decode(texels: &[u8]) -> Vec<f32> {
        texels
            .chunks_exact(2)
            .map(|bytes| f16::from_le_bytes([bytes[0], bytes[1]]).to_f32())
            .collect()
    }

    #[test]
    fn rgba16f_texels() {
        let texels = decode(&Colormap::new().to_rgba16f());

        assert_eq!(texels.len(), 256 * 4);
        assert_eq!(&texels[..4], &[0.0, 0.0, 0.5, 1.0]);
        assert_eq!(&texels[texels.len() - 4..], &[0.5, 0.0, 0.0, 1.0]);
        assert!(texels.chunks_exact(4).all(|texel| texel[3] == 1.0));
    }

    #[test]
    fn rgba16f_keeps_colors_within_half_precision() {
        let colormap = Colormap::new();
        let texels = decode(&colormap.to_rgba16f());

        for (entry, texel) in colormap.entries().iter().zip(texels.chunks_exact(4)) {
            for (expected, actual) in entry.iter().zip(texel) {
                // Half of an 8-bit step would be 1/510; f16 below 1.0 is
                // within 2^-12.
                assert!((expected - actual).abs() <= 1.0 / 4096.0, "{entry:?}");
            }
        }
    }
}
