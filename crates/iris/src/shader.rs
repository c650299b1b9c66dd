//! The iris colour field.
//!
//! The same function exists twice: [`iris_color`] evaluates it on the CPU
//! (exports, fallbacks, tests) and [`IRIS_GLSL`] carries the GLSL twin that
//! the renderer wraps into its lens fragment shader. Any change to one must be
//! mirrored in the other.

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};
use serde::Serialize;

/// Colours fed into the iris shader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Palette {
    pub primary: Vec3,
    pub secondary: Vec3,
    pub glint: Vec3,
}

impl Palette {
    pub fn new(primary: Vec3, secondary: Vec3, glint: Vec3) -> Self {
        Self {
            primary,
            secondary,
            glint,
        }
    }

    pub fn from_rgb(primary: [f32; 3], secondary: [f32; 3], glint: [f32; 3]) -> Self {
        Self::new(
            Vec3::from_array(primary),
            Vec3::from_array(secondary),
            Vec3::from_array(glint),
        )
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_rgb(
            [0x1b as f32 / 255.0, 0x3a as f32 / 255.0, 0x4b as f32 / 255.0],
            [0x5f as f32 / 255.0, 0xa8 as f32 / 255.0, 0xa3 as f32 / 255.0],
            [0xf2 as f32 / 255.0, 0xe6 as f32 / 255.0, 0xc9 as f32 / 255.0],
        )
    }
}

/// Uniform inputs of one iris program instance.
///
/// Every mounted component builds its own state through [`ShaderState::new`];
/// nothing is shared between instances, so two backdrops never advance each
/// other's clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderState {
    pub time: f32,
    pub palette: Palette,
}

impl ShaderState {
    pub fn new(palette: Palette) -> Self {
        Self { time: 0.0, palette }
    }

    pub fn shade(&self, uv: Vec2) -> Vec4 {
        iris_color(uv, self.time, &self.palette)
    }
}

/// Clamped cubic Hermite interpolation, matching GLSL `smoothstep`.
///
/// Reversed edges (`edge0 > edge1`) produce the mirrored curve.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Radius and angle of `uv` after recentring onto `[-1, 1]²`.
pub fn polar(uv: Vec2) -> (f32, f32) {
    let p = uv * 2.0 - Vec2::ONE;
    (p.length(), p.y.atan2(p.x))
}

/// Coverage of the lens disc at radius `r`: opaque inside 0.96, gone by 0.99.
pub fn edge_alpha(r: f32) -> f32 {
    smoothstep(0.99, 0.96, r)
}

/// Straight-alpha iris colour at surface coordinate `uv` and time `t`.
pub fn iris_color(uv: Vec2, t: f32, palette: &Palette) -> Vec4 {
    let (r, a) = polar(uv);

    let stripes = 0.5 + 0.5 * (32.0 * a + 24.0 * r - 0.6 * t).sin();
    let fibers = 0.5 + 0.5 * (96.0 * a - 0.9 * t).sin();
    let mut base = palette
        .primary
        .lerp(palette.secondary, 0.7 * stripes + 0.3 * fibers);

    let glint_mask = smoothstep(0.68, 0.86, r) * (0.7 + 0.3 * (6.0 * a + 0.7 * t).sin());
    base = base.lerp(palette.glint, 0.08 * glint_mask);

    let vignette = smoothstep(0.0, 0.1, r);
    base *= mix(0.2, 1.0, vignette);

    base.extend(edge_alpha(r))
}

/// Premultiplies a straight-alpha colour.
pub fn premultiply(color: Vec4) -> Vec4 {
    (color.xyz() * color.w).extend(color.w)
}

/// GLSL twin of [`iris_color`] (GLSL 450, no uniforms of its own).
pub const IRIS_GLSL: &str = r"
float iris_smoothstep(float edge0, float edge1, float x) {
    float t = clamp((x - edge0) / (edge1 - edge0), 0.0, 1.0);
    return t * t * (3.0 - 2.0 * t);
}

vec4 iris_color(vec2 uv, float t, vec3 primary, vec3 secondary, vec3 glint) {
    vec2 p = uv * 2.0 - 1.0;
    float r = length(p);
    float a = atan(p.y, p.x);

    float stripes = 0.5 + 0.5 * sin(32.0 * a + 24.0 * r - 0.6 * t);
    float fibers = 0.5 + 0.5 * sin(96.0 * a - 0.9 * t);
    vec3 base = mix(primary, secondary, 0.7 * stripes + 0.3 * fibers);

    float glint_mask = iris_smoothstep(0.68, 0.86, r) * (0.7 + 0.3 * sin(6.0 * a + 0.7 * t));
    base = mix(base, glint, 0.08 * glint_mask);

    float vignette = iris_smoothstep(0.0, 0.1, r);
    base *= mix(0.2, 1.0, vignette);

    return vec4(base, iris_smoothstep(0.99, 0.96, r));
}
";

#[cfg(test)]
mod tests {
    use super::*;

    fn uv_at_radius(r: f32) -> Vec2 {
        // Along +x from the centre: p = (r, 0) → uv = (p + 1) / 2.
        Vec2::new((r + 1.0) * 0.5, 0.5)
    }

    #[test]
    fn smoothstep_matches_expected_values() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(1.0, 0.0, 0.25) - smoothstep(0.0, 1.0, 0.75)).abs() < 1e-6);
    }

    #[test]
    fn alpha_is_opaque_inside_and_clear_outside() {
        let palette = Palette::default();
        assert_eq!(edge_alpha(0.96), 1.0);
        assert_eq!(edge_alpha(0.99), 0.0);
        assert_eq!(iris_color(uv_at_radius(0.5), 3.0, &palette).w, 1.0);
        assert_eq!(iris_color(uv_at_radius(0.995), 0.0, &palette).w, 0.0);
        assert_eq!(iris_color(Vec2::new(1.0, 1.0), 0.0, &palette).w, 0.0);

        let feather = iris_color(uv_at_radius(0.975), 0.0, &palette).w;
        assert!(feather > 0.0 && feather < 1.0, "feather alpha {feather}");
    }

    #[test]
    fn alpha_never_reaches_zero_below_edge() {
        for step in 0..99 {
            let r = step as f32 / 100.0;
            assert!(edge_alpha(r) > 0.0, "alpha vanished at r={r}");
        }
    }

    #[test]
    fn centre_is_darkened_by_vignette() {
        let palette = Palette::new(Vec3::ONE, Vec3::ONE, Vec3::ONE);
        let centre = iris_color(Vec2::splat(0.5), 0.0, &palette);
        assert!((centre.x - 0.2).abs() < 1e-6);
        let outside_vignette = iris_color(uv_at_radius(0.5), 0.0, &palette);
        assert!((outside_vignette.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn colour_stays_between_palette_bounds() {
        let palette = Palette::new(Vec3::splat(0.2), Vec3::splat(0.6), Vec3::splat(0.6));
        for step in 0..64 {
            let uv = Vec2::new(step as f32 / 63.0, 0.3);
            let color = iris_color(uv, step as f32 * 0.25, &palette);
            assert!(color.x <= 0.6 + 1e-5 && color.x >= 0.0);
        }
    }

    #[test]
    fn time_moves_the_pattern() {
        let state = ShaderState::new(Palette::default());
        let mut later = state;
        later.time = 1.5;
        let uv = uv_at_radius(0.5);
        assert_ne!(state.shade(uv), later.shade(uv));
    }

    #[test]
    fn premultiply_scales_rgb_by_alpha() {
        let color = premultiply(Vec4::new(1.0, 0.5, 0.25, 0.5));
        assert_eq!(color, Vec4::new(0.5, 0.25, 0.125, 0.5));
    }

    #[test]
    fn glsl_twin_declares_entry_point() {
        assert!(IRIS_GLSL.contains("vec4 iris_color(vec2 uv, float t"));
        assert!(IRIS_GLSL.contains("96.0 * a - 0.9 * t"));
    }
}
