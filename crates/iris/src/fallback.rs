//! Static placeholder shown when no GPU surface can be acquired.

use glam::{Vec2, Vec4};

use crate::shader::{edge_alpha, polar, smoothstep, Palette};

/// A flat radial gradient disc in the palette colours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackDisc {
    pub palette: Palette,
}

impl FallbackDisc {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Straight-alpha colour at `uv`: secondary in the centre fading to
    /// primary at the rim, with a thin glint band and the lens edge feather.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let (r, _) = polar(uv);
        let gradient = smoothstep(0.0, 0.95, r);
        let mut color = self.palette.secondary.lerp(self.palette.primary, gradient);
        let band = smoothstep(0.7, 0.8, r) * smoothstep(0.9, 0.8, r);
        color = color.lerp(self.palette.glint, 0.15 * band);
        color.extend(edge_alpha(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn centre_uses_secondary_and_rim_is_clear() {
        let palette = Palette::new(Vec3::ZERO, Vec3::ONE, Vec3::splat(0.5));
        let disc = FallbackDisc::new(palette);

        let centre = disc.sample(Vec2::splat(0.5));
        assert_eq!(centre, Vec4::new(1.0, 1.0, 1.0, 1.0));

        let corner = disc.sample(Vec2::ZERO);
        assert_eq!(corner.w, 0.0);
    }

    #[test]
    fn gradient_darkens_outward() {
        let palette = Palette::new(Vec3::ZERO, Vec3::ONE, Vec3::ZERO);
        let disc = FallbackDisc::new(palette);
        let inner = disc.sample(Vec2::new(0.6, 0.5)).x;
        let outer = disc.sample(Vec2::new(0.95, 0.5)).x;
        assert!(inner > outer);
    }
}
