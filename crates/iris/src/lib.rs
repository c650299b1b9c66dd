//! Domain core of the iris backdrop.
//!
//! The scene is built once per mounted [`IrisComponent`]: ring geometry is
//! generated up front, and afterwards only shader time and two group
//! rotations change from frame to frame. Nothing in this crate touches the
//! GPU; the `renderer` crate samples [`FrameSnapshot`]s and draws them.

mod component;
mod driver;
mod fallback;
mod geometry;
mod motion;
mod pointer;
mod scene;
mod shader;

pub use component::{IrisComponent, IrisOptions};
pub use driver::{
    tilt_target, FrameDriver, FrameSnapshot, PointerFollow, TransformState, LENS_SPIN,
    POINTER_TILT, RING_SPIN, SMOOTHING,
};
pub use fallback::FallbackDisc;
pub use geometry::{build_rings, RingParams, RingSpec};
pub use motion::{
    query_motion_preference, EnvMotionQuery, GnomeAnimationsQuery, MotionPreference,
    MotionQuery, SystemMotionQuery, ENV_REDUCED_MOTION,
};
pub use pointer::{normalize, PointerSample, PointerSampler};
pub use scene::{lens_quad, Camera, LENS_RADIUS, MARKER_RADIUS};
pub use shader::{
    edge_alpha, iris_color, mix, polar, premultiply, smoothstep, Palette, ShaderState, IRIS_GLSL,
};
