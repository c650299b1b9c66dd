//! Renderer crate for the iris backdrop.
//!
//! The crate glues the `winit` window, the `wgpu` pipelines and the mounted
//! [`iris::IrisComponent`] together. The overall flow is:
//!
//! ```text
//!   irisd
//!     │ RendererConfig
//!     ▼
//!   Renderer::run ──▶ IrisComponent::mount ──▶ winit event loop
//!                            │                      │
//!          pointer bus ◀─────┘                      ├─▶ FrameScheduler::dispatch
//!          frame callback                           └─▶ GpuState::render(snapshot)
//! ```
//!
//! The `raster` module evaluates the same iris colour field on the CPU so
//! stills and the static fallback disc can be written without a GPU.

mod compile;
mod gpu;
mod raster;
mod types;
mod window;

use std::path::PathBuf;

pub use raster::{render_fallback_image, render_iris_image, write_png};
pub use types::{AdapterProfile, Antialiasing, PixelRatio, RendererConfig, SurfaceAlpha};

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    /// No GPU surface could be created for the window.
    #[error("GPU surface unavailable: {0:#}")]
    SurfaceUnavailable(anyhow::Error),
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to write image to {}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Opens the backdrop window and blocks until it is closed.
    ///
    /// Surface acquisition failures come back as
    /// [`RendererError::SurfaceUnavailable`] so the caller can fall back to
    /// a static image.
    pub fn run(&mut self) -> Result<(), RendererError> {
        window::run_window(&self.config)
    }
}
