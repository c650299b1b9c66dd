use bytemuck::{Pod, Zeroable};
use iris::{Camera, FrameSnapshot, Palette, MARKER_RADIUS};
use winit::dpi::PhysicalSize;

/// CPU mirror of the `SceneParams` uniform block declared in `compile.rs`.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug)]
pub(crate) struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub ring_model: [[f32; 4]; 4],
    pub lens_model: [[f32; 4]; 4],
    /// Primary colour; `w` holds the shader time.
    pub primary: [f32; 4],
    pub secondary: [f32; 4],
    pub glint: [f32; 4],
    /// Surface width, height, marker radius, unused.
    pub surface: [f32; 4],
}

unsafe impl Zeroable for SceneUniforms {}
unsafe impl Pod for SceneUniforms {}

impl SceneUniforms {
    pub fn new(palette: &Palette, size: PhysicalSize<u32>) -> Self {
        let identity = glam::Mat4::IDENTITY.to_cols_array_2d();
        let mut uniforms = Self {
            view_proj: identity,
            ring_model: identity,
            lens_model: identity,
            primary: palette.primary.extend(0.0).to_array(),
            secondary: palette.secondary.extend(0.0).to_array(),
            glint: palette.glint.extend(0.0).to_array(),
            surface: [0.0, 0.0, MARKER_RADIUS, 0.0],
        };
        uniforms.set_surface(size);
        uniforms
    }

    pub fn set_surface(&mut self, size: PhysicalSize<u32>) {
        self.surface[0] = size.width.max(1) as f32;
        self.surface[1] = size.height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.surface[0] / self.surface[1]
    }

    /// Copies one frame's shader inputs and transforms into the block.
    pub fn update(&mut self, camera: &Camera, snapshot: &FrameSnapshot) {
        self.view_proj = camera.view_projection(self.aspect()).to_cols_array_2d();
        self.ring_model = snapshot.ring.matrix().to_cols_array_2d();
        self.lens_model = snapshot.lens.matrix().to_cols_array_2d();

        let palette = &snapshot.shader.palette;
        self.primary = palette.primary.extend(snapshot.shader.time).to_array();
        self.secondary = palette.secondary.extend(0.0).to_array();
        self.glint = palette.glint.extend(0.0).to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris::{FrameDriver, MotionPreference, PointerFollow, PointerSample, ShaderState};
    use std::mem::{align_of, size_of};

    /// Checks that the CPU mirror matches the std140 layout of the GLSL block.
    #[test]
    fn scene_uniforms_follow_std140_layout() {
        let uniforms = SceneUniforms::new(&Palette::default(), PhysicalSize::new(1920, 1080));
        let base = &uniforms as *const _ as usize;

        assert_eq!(align_of::<SceneUniforms>(), 16);
        assert_eq!(size_of::<SceneUniforms>(), 256);
        assert_eq!((&uniforms.view_proj as *const _ as usize) - base, 0);
        assert_eq!((&uniforms.ring_model as *const _ as usize) - base, 64);
        assert_eq!((&uniforms.lens_model as *const _ as usize) - base, 128);
        assert_eq!((&uniforms.primary as *const _ as usize) - base, 192);
        assert_eq!((&uniforms.secondary as *const _ as usize) - base, 208);
        assert_eq!((&uniforms.glint as *const _ as usize) - base, 224);
        assert_eq!((&uniforms.surface as *const _ as usize) - base, 240);
    }

    #[test]
    fn update_carries_time_in_primary_alpha() {
        let mut driver = FrameDriver::new(
            ShaderState::new(Palette::default()),
            MotionPreference::NoPreference,
            PointerFollow::WithMotion,
        );
        driver.advance(0.25, PointerSample::default());

        let mut uniforms = SceneUniforms::new(&Palette::default(), PhysicalSize::new(800, 400));
        uniforms.update(&Camera::default(), &driver.snapshot());

        assert_eq!(uniforms.primary[3], 0.25);
        assert_eq!(uniforms.aspect(), 2.0);
        assert_eq!(
            uniforms.ring_model,
            driver.ring().matrix().to_cols_array_2d()
        );
    }

    #[test]
    fn zero_sized_surface_keeps_finite_aspect() {
        let uniforms = SceneUniforms::new(&Palette::default(), PhysicalSize::new(0, 0));
        assert_eq!(uniforms.aspect(), 1.0);
    }
}
