use anyhow::{Context, Result};

use crate::compile::{compile_shader, SceneShader};

use super::mesh::{marker_instance_layout, ring_vertex_layout, LensVertex};

pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub pipeline_layout: wgpu::PipelineLayout,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        Self {
            uniform_layout,
            pipeline_layout,
        }
    }
}

/// One render pipeline per scene element, all sharing the uniform layout.
pub(crate) struct ScenePipelines {
    pub lens: wgpu::RenderPipeline,
    pub rings: wgpu::RenderPipeline,
    pub markers: wgpu::RenderPipeline,
}

struct PipelineTarget {
    format: wgpu::TextureFormat,
    sample_count: u32,
}

impl ScenePipelines {
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Result<Self> {
        let target = PipelineTarget {
            format: surface_format,
            sample_count,
        };

        let lens = build_pipeline(
            device,
            layouts,
            &target,
            "lens pipeline",
            (SceneShader::LensVertex, SceneShader::LensFragment),
            &[LensVertex::layout()],
            wgpu::PrimitiveTopology::TriangleList,
        )
        .context("failed to build lens pipeline")?;
        let rings = build_pipeline(
            device,
            layouts,
            &target,
            "ring pipeline",
            (SceneShader::RingVertex, SceneShader::RingFragment),
            &[ring_vertex_layout()],
            wgpu::PrimitiveTopology::LineStrip,
        )
        .context("failed to build ring pipeline")?;
        let markers = build_pipeline(
            device,
            layouts,
            &target,
            "marker pipeline",
            (SceneShader::MarkerVertex, SceneShader::MarkerFragment),
            &[marker_instance_layout()],
            wgpu::PrimitiveTopology::TriangleList,
        )
        .context("failed to build marker pipeline")?;

        Ok(Self {
            lens,
            rings,
            markers,
        })
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layouts: &PipelineLayouts,
    target: &PipelineTarget,
    label: &str,
    (vertex, fragment): (SceneShader, SceneShader),
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
) -> Result<wgpu::RenderPipeline> {
    let vertex_module = compile_shader(device, vertex)?;
    let fragment_module = compile_shader(device, fragment)?;

    Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layouts.pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some("main"),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: target.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target.format,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    }))
}
