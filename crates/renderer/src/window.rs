use std::sync::Arc;
use std::time::Instant;

use iris::IrisComponent;
use scheduler::{Cadence, FrameClock, FrameScheduler, PointerBus, PointerEvent};
use tracing::{debug, error, info, trace, warn};
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::types::{PixelRatio, RendererConfig, SurfaceAlpha};
use crate::RendererError;

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// Everything the event loop owns while the backdrop is on screen.
///
/// Field order matters: the GPU surface is dropped before the window it was
/// created from.
struct WindowState {
    gpu: GpuState,
    window: Arc<Window>,
    frames: FrameScheduler,
    pointer: PointerBus,
    clock: FrameClock,
    component: Option<IrisComponent>,
    pixel_ratio: PixelRatio,
}

impl WindowState {
    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn surface_size(&self) -> PhysicalSize<u32> {
        surface_size_for(self.window(), self.pixel_ratio)
    }

    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        let viewport = self.window.inner_size();
        let delivered = self.pointer.publish(&PointerEvent {
            client_x: position.x,
            client_y: position.y,
            viewport_width: f64::from(viewport.width),
            viewport_height: f64::from(viewport.height),
        });
        trace!(x = position.x, y = position.y, delivered, "pointer moved");
        if self
            .component
            .as_ref()
            .is_some_and(IrisComponent::follows_pointer)
        {
            self.frames.request_redraw();
        }
    }

    fn resize(&mut self) {
        let size = self.surface_size();
        self.gpu.resize(size);
        self.frames.request_redraw();
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(component) = self.component.as_ref() else {
            return Ok(());
        };
        let now = Instant::now();
        let delta = self.clock.tick(now);
        self.frames.dispatch(delta);
        self.gpu.render(&component.snapshot())?;
        self.frames.mark_rendered(now);
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(component) = self.component.take() {
            if let Err(err) = component.unmount(&mut self.frames, &mut self.pointer) {
                warn!(error = %err, "failed to unmount iris component cleanly");
            }
        }
    }
}

fn surface_size_for(window: &Window, pixel_ratio: PixelRatio) -> PhysicalSize<u32> {
    let physical = window.inner_size();
    let (width, height) =
        pixel_ratio.surface_size((physical.width, physical.height), window.scale_factor());
    PhysicalSize::new(width, height)
}

/// Opens the backdrop window, mounts the iris and drives the `winit` loop.
///
/// Returns [`RendererError::SurfaceUnavailable`] when no GPU surface can be
/// created for the window; the component is unmounted again before returning.
pub(crate) fn run_window(config: &RendererConfig) -> Result<(), RendererError> {
    let event_loop = EventLoop::new()?;
    let (width, height) = config.surface_size;
    let mut builder = WindowBuilder::new()
        .with_title("iris")
        .with_inner_size(LogicalSize::new(width, height))
        .with_decorations(config.decorations)
        .with_transparent(config.surface_alpha == SurfaceAlpha::Transparent);
    if config.fullscreen {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = Arc::new(builder.build(&event_loop)?);

    let mut frames = FrameScheduler::new(config.cadence());
    let mut pointer = PointerBus::new();
    let component = IrisComponent::mount(config.iris, &mut frames, &mut pointer);

    let gpu = match GpuState::new(
        window.as_ref(),
        surface_size_for(window.as_ref(), config.pixel_ratio),
        config.antialiasing,
        config.surface_alpha,
        &config.iris.palette,
        component.rings(),
    ) {
        Ok(gpu) => gpu,
        Err(err) => {
            if let Err(unmount_err) = component.unmount(&mut frames, &mut pointer) {
                warn!(error = %unmount_err, "failed to unmount iris component");
            }
            return Err(RendererError::SurfaceUnavailable(err));
        }
    };

    let profile = gpu.adapter_profile().clone();
    if profile.is_software() && config.target_fps.is_none() && !config.iris.motion.is_reduced() {
        frames.set_cadence(Cadence::Continuous {
            target_fps: Some(SOFTWARE_FPS_CAP),
        });
        warn!(
            adapter = %profile.name,
            backend = ?profile.backend,
            cap = SOFTWARE_FPS_CAP,
            "software rasterizer detected; capping backdrop to {} FPS (override with --fps)",
            SOFTWARE_FPS_CAP
        );
    }
    info!(
        adapter = %profile.name,
        backend = ?profile.backend,
        cadence = ?frames.cadence(),
        reduced_motion = config.iris.motion.is_reduced(),
        "iris backdrop running"
    );

    let mut state = WindowState {
        gpu,
        window,
        frames,
        pointer,
        clock: FrameClock::new(config.max_frame_delta),
        component: Some(component),
        pixel_ratio: config.pixel_ratio,
    };
    state.window().request_redraw();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    state.handle_cursor_moved(position);
                }
                WindowEvent::Resized(_) => {
                    state.resize();
                }
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    debug!(scale_factor, "scale factor changed");
                    state.frames.request_redraw();
                }
                WindowEvent::RedrawRequested => match state.render_frame() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.gpu.reconfigure();
                        state.frames.request_redraw();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory; exiting");
                        elwt.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        warn!("surface timeout; retrying next frame");
                        state.frames.request_redraw();
                    }
                    Err(other) => {
                        warn!(error = ?other, "surface error; retrying next frame");
                        state.frames.request_redraw();
                    }
                },
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if state.frames.ready_for_frame(now) {
                trace!("scheduler: issuing redraw now");
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = state.frames.next_deadline() {
                let ms = deadline.saturating_duration_since(now).as_millis();
                trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                trace!("scheduler: idle (no redraw requested)");
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        Event::LoopExiting => {
            state.unmount();
        }
        _ => {}
    })?;

    Ok(())
}
