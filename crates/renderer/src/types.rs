use std::time::Duration;

use iris::IrisOptions;
use scheduler::Cadence;

/// Declares how the compositor should treat the swapchain alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceAlpha {
    /// Frames fully cover the window without transparency.
    #[default]
    Opaque,
    /// Frames may contain transparency and should be blended by the compositor.
    Transparent,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Range the window scale factor is clamped to before sizing the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRatio {
    pub min: f32,
    pub max: f32,
}

impl Default for PixelRatio {
    fn default() -> Self {
        Self { min: 1.0, max: 2.0 }
    }
}

impl PixelRatio {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, scale_factor: f64) -> f32 {
        (scale_factor as f32).clamp(self.min, self.max)
    }

    /// Surface size for a window of `physical` pixels at `scale_factor`.
    ///
    /// The logical size is kept and only the density changes, so a 2x window
    /// with `max = 1.0` renders at half its physical resolution.
    pub fn surface_size(&self, physical: (u32, u32), scale_factor: f64) -> (u32, u32) {
        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let ratio = f64::from(self.clamp(scale_factor));
        let scale =
            |value: u32| ((f64::from(value) / scale_factor) * ratio).round().max(1.0) as u32;
        (scale(physical.0), scale(physical.1))
    }
}

/// Summary of the GPU adapter wgpu picked for the surface.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub driver: String,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            driver: info.driver.clone(),
        }
    }

    pub fn is_software(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        let driver = self.driver.to_ascii_lowercase();
        matches!(self.device_type, wgpu::DeviceType::Cpu)
            || ["llvmpipe", "softpipe", "swiftshader"]
                .iter()
                .any(|needle| name.contains(needle) || driver.contains(needle))
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors the resolved config file and CLI flags: window
/// geometry and presentation on one side, the mounted iris options on the
/// other.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in logical pixels.
    pub surface_size: (u32, u32),
    pub fullscreen: bool,
    pub decorations: bool,
    pub surface_alpha: SurfaceAlpha,
    pub pixel_ratio: PixelRatio,
    /// Optional FPS cap while animating; None = render every vblank.
    pub target_fps: Option<f32>,
    pub antialiasing: Antialiasing,
    /// Upper bound for a single frame delta after stalls.
    pub max_frame_delta: Duration,
    pub iris: IrisOptions,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 800),
            fullscreen: false,
            decorations: false,
            surface_alpha: SurfaceAlpha::Transparent,
            pixel_ratio: PixelRatio::default(),
            target_fps: None,
            antialiasing: Antialiasing::default(),
            max_frame_delta: Duration::from_millis(100),
            iris: IrisOptions::default(),
        }
    }
}

impl RendererConfig {
    /// Continuous rendering while animating, on-demand once motion is reduced.
    pub fn cadence(&self) -> Cadence {
        if self.iris.motion.is_reduced() {
            Cadence::OnDemand
        } else {
            Cadence::Continuous {
                target_fps: self.target_fps,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris::MotionPreference;

    #[test]
    fn surface_size_clamps_density() {
        let ratio = PixelRatio::new(1.0, 2.0);
        assert_eq!(ratio.surface_size((1280, 800), 1.0), (1280, 800));
        assert_eq!(ratio.surface_size((2560, 1600), 2.0), (2560, 1600));
        assert_eq!(ratio.surface_size((3840, 2400), 3.0), (2560, 1600));

        let capped = PixelRatio::new(1.0, 1.0);
        assert_eq!(capped.surface_size((2560, 1600), 2.0), (1280, 800));
    }

    #[test]
    fn surface_size_never_collapses_to_zero() {
        let ratio = PixelRatio::default();
        assert_eq!(ratio.surface_size((0, 0), 1.0), (1, 1));
        assert_eq!(ratio.surface_size((100, 50), 0.0), (100, 50));
    }

    #[test]
    fn reduced_motion_renders_on_demand() {
        let mut config = RendererConfig {
            target_fps: Some(30.0),
            ..RendererConfig::default()
        };
        assert_eq!(
            config.cadence(),
            Cadence::Continuous {
                target_fps: Some(30.0)
            }
        );
        config.iris.motion = MotionPreference::Reduce;
        assert_eq!(config.cadence(), Cadence::OnDemand);
    }

    #[test]
    fn software_adapters_are_detected_by_name() {
        let profile = AdapterProfile {
            name: "llvmpipe (LLVM 17.0.6, 256 bits)".into(),
            backend: wgpu::Backend::Vulkan,
            device_type: wgpu::DeviceType::Other,
            driver: String::new(),
        };
        assert!(profile.is_software());

        let hardware = AdapterProfile {
            name: "AMD Radeon RX 7800 XT".into(),
            device_type: wgpu::DeviceType::DiscreteGpu,
            ..profile
        };
        assert!(!hardware.is_software());
    }
}
