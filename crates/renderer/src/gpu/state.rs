use std::time::{Duration, Instant};

use anyhow::Result;
use iris::{Camera, FrameSnapshot, Palette, RingSpec};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, warn};
use winit::dpi::PhysicalSize;

use crate::types::{AdapterProfile, Antialiasing, SurfaceAlpha};

use super::context::GpuContext;
use super::mesh::SceneMesh;
use super::pipeline::{PipelineLayouts, ScenePipelines};
use super::uniforms::SceneUniforms;

/// Frame budget used to flag slow swapchain acquisition.
const ACQUIRE_BUDGET: Duration = Duration::from_millis(50);

pub(crate) struct GpuState {
    context: GpuContext,
    pipelines: ScenePipelines,
    mesh: SceneMesh,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: SceneUniforms,
    camera: Camera,
    clear_color: wgpu::Color,
    multisample_target: Option<MultisampleTarget>,
    stats: FrameStats,
}

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Rolling frame counter that reports throughput once per second.
struct FrameStats {
    last_update: Instant,
    frames_since_update: u32,
    frame_count: u64,
}

impl FrameStats {
    fn new(now: Instant) -> Self {
        Self {
            last_update: now,
            frames_since_update: 0,
            frame_count: 0,
        }
    }

    fn record(&mut self, now: Instant, time: f32) {
        self.frames_since_update += 1;
        self.frame_count += 1;
        let elapsed = now.saturating_duration_since(self.last_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_update as f32 / elapsed.as_secs_f32();
            debug!(
                fps = fps.round(),
                frame_count = self.frame_count,
                time,
                "render stats"
            );
            self.frames_since_update = 0;
            self.last_update = now;
        }
    }
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        surface_alpha: SurfaceAlpha,
        palette: &Palette,
        rings: &[RingSpec],
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, antialiasing, surface_alpha)?;
        let layouts = PipelineLayouts::new(&context.device);
        let pipelines = ScenePipelines::new(
            &context.device,
            &layouts,
            context.surface_format,
            context.sample_count,
        )?;
        let mesh = SceneMesh::new(&context.device, rings);

        let uniforms = SceneUniforms::new(palette, context.size);
        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene uniform buffer"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("scene uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
        context
            .queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let clear_color = if context.is_transparent() {
            wgpu::Color::TRANSPARENT
        } else {
            wgpu::Color::BLACK
        };
        let multisample_target = (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });

        Ok(Self {
            context,
            pipelines,
            mesh,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            camera: Camera::default(),
            clear_color,
            multisample_target,
            stats: FrameStats::new(Instant::now()),
        })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 || new_size == self.context.size {
            return;
        }
        self.context.resize(new_size);
        self.uniforms.set_surface(new_size);
        self.multisample_target = (self.context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &self.context.device,
                self.context.surface_format,
                self.context.size,
                self.context.sample_count,
            )
        });
        debug!(width = new_size.width, height = new_size.height, "surface resized");
    }

    /// Forces the surface to be configured again after it was lost.
    pub(crate) fn reconfigure(&mut self) {
        let size = self.context.size;
        self.context.resize(size);
    }

    /// Draws rings, markers and the lens for `snapshot` and presents the frame.
    pub(crate) fn render(&mut self, snapshot: &FrameSnapshot) -> Result<(), wgpu::SurfaceError> {
        let acquire_start = Instant::now();
        let frame = self.context.surface.get_current_texture()?;
        let acquire_duration = acquire_start.elapsed();
        if acquire_duration > ACQUIRE_BUDGET {
            warn!(
                acquire_ms = acquire_duration.as_millis(),
                "acquiring the swapchain frame exceeded the frame budget"
            );
        }

        self.uniforms.update(&self.camera, snapshot);
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        self.encode_scene(&mut encoder, &view);
        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        self.stats.record(Instant::now(), snapshot.shader.time);
        Ok(())
    }

    fn encode_scene(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(view)),
            None => (view, None),
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("iris pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: attachment_view,
                depth_slice: None,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

        // Back to front: rings and markers sit behind the lens.
        render_pass.set_pipeline(&self.pipelines.rings);
        render_pass.set_vertex_buffer(0, self.mesh.rings.slice(..));
        for range in &self.mesh.ring_ranges {
            render_pass.draw(range.clone(), 0..1);
        }

        if self.mesh.marker_count > 0 {
            render_pass.set_pipeline(&self.pipelines.markers);
            render_pass.set_vertex_buffer(0, self.mesh.markers.slice(..));
            render_pass.draw(0..6, 0..self.mesh.marker_count);
        }

        render_pass.set_pipeline(&self.pipelines.lens);
        render_pass.set_vertex_buffer(0, self.mesh.lens.slice(..));
        render_pass.draw(0..self.mesh.lens_vertex_count, 0..1);
    }
}
