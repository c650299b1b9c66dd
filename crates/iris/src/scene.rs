use glam::{Mat4, Vec3};

/// Radius of the lens disc in world units, centred at the origin on z = 0.
pub const LENS_RADIUS: f32 = 0.82;
/// Radius of a ring node marker in world units.
pub const MARKER_RADIUS: f32 = 0.018;

/// Perspective camera on the +z axis looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y_degrees: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y_degrees: 35.0,
            distance: 4.2,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    /// Projection into wgpu clip space (depth in `[0, 1]`).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// Half the visible height at the z = 0 plane.
    pub fn half_height_at_origin(&self) -> f32 {
        self.distance * (self.fov_y_degrees.to_radians() * 0.5).tan()
    }
}

/// Lens disc corners (unit quad scaled to [`LENS_RADIUS`]) with their uv.
///
/// Two triangles, counter-clockwise, uv origin at the top-left so the GPU
/// and CPU paths agree on orientation.
pub fn lens_quad() -> [([f32; 3], [f32; 2]); 6] {
    let r = LENS_RADIUS;
    let top_left = ([-r, r, 0.0], [0.0, 0.0]);
    let top_right = ([r, r, 0.0], [1.0, 0.0]);
    let bottom_left = ([-r, -r, 0.0], [0.0, 1.0]);
    let bottom_right = ([r, -r, 0.0], [1.0, 1.0]);
    [
        bottom_left,
        bottom_right,
        top_right,
        bottom_left,
        top_right,
        top_left,
    ]
}
