//! GPU side of the backdrop.
//!
//! - `context` owns wgpu instance/device/surface wiring: adapter choice,
//!   MSAA resolution, alpha mode, and reconfiguration on resize.
//! - `mesh` uploads the lens quad, ring strips and marker instances once.
//! - `pipeline` compiles the GLSL scene shaders into three pipelines sharing
//!   one uniform bind group layout.
//! - `uniforms` mirrors the `SceneParams` block and refreshes it from each
//!   frame snapshot.
//! - `state` glues everything together behind the `GpuState` API used by
//!   `window`.

mod context;
mod mesh;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
