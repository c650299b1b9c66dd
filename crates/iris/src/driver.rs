use glam::{EulerRot, Mat4, Vec2, Vec3, Vec3Swizzles};
use scheduler::Redraw;

use crate::motion::MotionPreference;
use crate::pointer::PointerSample;
use crate::shader::ShaderState;

/// Ring assembly spin around z, radians per second.
pub const RING_SPIN: f32 = 0.03;
/// Lens assembly spin around z, radians per second.
pub const LENS_SPIN: f32 = 0.1;
/// Lens tilt at the viewport edge, radians.
pub const POINTER_TILT: f32 = 0.12;
/// Fraction of the remaining tilt covered each frame.
pub const SMOOTHING: f32 = 0.075;

const SETTLE_EPSILON: f32 = 1e-4;

/// Euler rotation of one scene group, applied in XYZ order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformState {
    pub rotation: Vec3,
}

impl TransformState {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }
}

/// Whether the lens follows the pointer when motion is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerFollow {
    /// Tilt toward the pointer regardless of the motion preference.
    Always,
    /// Freeze the tilt together with every other animation.
    #[default]
    WithMotion,
}

/// Everything the renderer needs from one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub shader: ShaderState,
    pub ring: TransformState,
    pub lens: TransformState,
}

/// Advances shader time and group rotations once per rendered frame.
#[derive(Debug, Clone)]
pub struct FrameDriver {
    motion: MotionPreference,
    follow: PointerFollow,
    shader: ShaderState,
    ring: TransformState,
    lens: TransformState,
}

impl FrameDriver {
    pub fn new(shader: ShaderState, motion: MotionPreference, follow: PointerFollow) -> Self {
        Self {
            motion,
            follow,
            shader,
            ring: TransformState::default(),
            lens: TransformState::default(),
        }
    }

    pub fn motion(&self) -> MotionPreference {
        self.motion
    }

    pub fn pointer_follow_active(&self) -> bool {
        !self.motion.is_reduced() || self.follow == PointerFollow::Always
    }

    /// Runs one frame of `dt` seconds against the latest pointer sample.
    ///
    /// Returns [`Redraw::Continue`] while something is still moving, which is
    /// always the case with motion enabled and only while the lens tilt is
    /// settling when motion is reduced.
    pub fn advance(&mut self, dt: f32, pointer: PointerSample) -> Redraw {
        let animating = !self.motion.is_reduced();
        if animating {
            self.shader.time += dt;
            self.ring.rotation.z += dt * RING_SPIN;
            self.lens.rotation.z += dt * LENS_SPIN;
        }

        if !self.pointer_follow_active() {
            return if animating {
                Redraw::Continue
            } else {
                Redraw::Idle
            };
        }

        let target = tilt_target(pointer);
        let current = self.lens.rotation.xy();
        let next = current + (target - current) * SMOOTHING;
        self.lens.rotation.x = next.x;
        self.lens.rotation.y = next.y;

        let settling = (target - next).abs().max_element() > SETTLE_EPSILON;
        if animating || settling {
            Redraw::Continue
        } else {
            Redraw::Idle
        }
    }

    pub fn shader(&self) -> &ShaderState {
        &self.shader
    }

    pub fn ring(&self) -> &TransformState {
        &self.ring
    }

    pub fn lens(&self) -> &TransformState {
        &self.lens
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            shader: self.shader,
            ring: self.ring,
            lens: self.lens,
        }
    }
}

/// Lens x/y rotation the pointer asks for. Vertical pointer motion tilts
/// around x, horizontal motion around y.
pub fn tilt_target(pointer: PointerSample) -> Vec2 {
    Vec2::new(pointer.y * POINTER_TILT, pointer.x * POINTER_TILT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::Palette;

    fn driver(motion: MotionPreference, follow: PointerFollow) -> FrameDriver {
        FrameDriver::new(ShaderState::new(Palette::default()), motion, follow)
    }

    #[test]
    fn smoothing_converges_without_overshoot() {
        let mut driver = driver(MotionPreference::NoPreference, PointerFollow::WithMotion);
        let pointer = PointerSample::new(0.0, 1.0);
        let mut previous = 0.0;
        for _ in 0..400 {
            driver.advance(0.016, pointer);
            let x = driver.lens().rotation.x;
            assert!(x >= previous, "rotation must approach monotonically");
            assert!(x <= POINTER_TILT, "rotation overshot: {x}");
            previous = x;
        }
        assert!((previous - POINTER_TILT).abs() < 1e-5);
    }

    #[test]
    fn reduced_motion_freezes_time_and_spin() {
        for follow in [PointerFollow::Always, PointerFollow::WithMotion] {
            let mut driver = driver(MotionPreference::Reduce, follow);
            for dt in [0.016, 0.5, 3.0, 0.0] {
                driver.advance(dt, PointerSample::new(0.8, -0.4));
            }
            assert_eq!(driver.shader().time, 0.0);
            assert_eq!(driver.ring().rotation.z, 0.0);
            assert_eq!(driver.lens().rotation.z, 0.0);
        }
    }

    #[test]
    fn pointer_follow_option_controls_tilt_under_reduced_motion() {
        let pointer = PointerSample::new(1.0, 1.0);

        let mut frozen = driver(MotionPreference::Reduce, PointerFollow::WithMotion);
        assert_eq!(frozen.advance(0.016, pointer), Redraw::Idle);
        assert_eq!(frozen.lens().rotation, Vec3::ZERO);

        let mut following = driver(MotionPreference::Reduce, PointerFollow::Always);
        assert_eq!(following.advance(0.016, pointer), Redraw::Continue);
        assert!(following.lens().rotation.x > 0.0);
    }

    #[test]
    fn reduced_motion_goes_idle_once_tilt_settles() {
        let mut driver = driver(MotionPreference::Reduce, PointerFollow::Always);
        let pointer = PointerSample::new(-0.5, 0.25);
        let mut frames = 0;
        while driver.advance(0.016, pointer) == Redraw::Continue {
            frames += 1;
            assert!(frames < 1000, "tilt never settled");
        }
        let target = tilt_target(pointer);
        assert!((driver.lens().rotation.x - target.x).abs() <= SETTLE_EPSILON);
        assert!((driver.lens().rotation.y - target.y).abs() <= SETTLE_EPSILON);
    }

    #[test]
    fn three_frames_end_to_end() {
        let mut driver = driver(MotionPreference::NoPreference, PointerFollow::WithMotion);
        let pointer = PointerSample::new(1.0, -1.0);
        for _ in 0..3 {
            assert_eq!(driver.advance(0.016, pointer), Redraw::Continue);
        }

        let progress = 1.0 - (1.0 - SMOOTHING).powi(3);
        assert!((progress - 0.2085).abs() < 1e-4);
        assert!((driver.shader().time - 0.048).abs() < 1e-6);
        assert!((driver.lens().rotation.z - 0.0048).abs() < 1e-6);
        assert!((driver.ring().rotation.z - 0.00144).abs() < 1e-6);
        assert!((driver.lens().rotation.x - -0.02505).abs() < 1e-4);
        assert!((driver.lens().rotation.y - 0.02505).abs() < 1e-4);
    }

    #[test]
    fn transform_matrix_applies_z_spin() {
        let transform = TransformState {
            rotation: Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
        };
        let rotated = transform.matrix().transform_point3(Vec3::X);
        assert!(rotated.distance(Vec3::Y) < 1e-6);
    }
}
