use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use iris::{lens_quad, RingSpec};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct LensVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl LensVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// Per-vertex positions for the ring line strips.
pub(crate) fn ring_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    position_layout(wgpu::VertexStepMode::Vertex)
}

/// Per-instance centres for the marker quads.
pub(crate) fn marker_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    position_layout(wgpu::VertexStepMode::Instance)
}

fn position_layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode,
        attributes: &POSITION_ATTRIBUTES,
    }
}

pub(crate) fn lens_vertices() -> Vec<LensVertex> {
    lens_quad()
        .into_iter()
        .map(|(position, uv)| LensVertex { position, uv })
        .collect()
}

/// Concatenates every ring into one vertex list and records the vertex
/// range each ring's line strip occupies.
pub(crate) fn flatten_rings(rings: &[RingSpec]) -> (Vec<[f32; 3]>, Vec<Range<u32>>) {
    let mut vertices = Vec::with_capacity(rings.iter().map(|ring| ring.points.len()).sum());
    let mut ranges = Vec::with_capacity(rings.len());
    for ring in rings {
        let start = vertices.len() as u32;
        vertices.extend(ring.points.iter().map(|point| point.to_array()));
        ranges.push(start..vertices.len() as u32);
    }
    (vertices, ranges)
}

pub(crate) fn flatten_markers(rings: &[RingSpec]) -> Vec<[f32; 3]> {
    rings
        .iter()
        .flat_map(|ring| ring.markers.iter().map(|marker| marker.to_array()))
        .collect()
}

/// Static vertex data uploaded once per mounted component.
pub(crate) struct SceneMesh {
    pub lens: wgpu::Buffer,
    pub lens_vertex_count: u32,
    pub rings: wgpu::Buffer,
    pub ring_ranges: Vec<Range<u32>>,
    pub markers: wgpu::Buffer,
    pub marker_count: u32,
}

impl SceneMesh {
    pub fn new(device: &wgpu::Device, rings: &[RingSpec]) -> Self {
        let lens_vertices = lens_vertices();
        let (ring_vertices, ring_ranges) = flatten_rings(rings);
        let marker_centres = flatten_markers(rings);

        Self {
            lens: vertex_buffer(device, "lens vertices", bytemuck::cast_slice(&lens_vertices)),
            lens_vertex_count: lens_vertices.len() as u32,
            rings: vertex_buffer(device, "ring vertices", bytemuck::cast_slice(&ring_vertices)),
            ring_ranges,
            markers: vertex_buffer(
                device,
                "marker instances",
                bytemuck::cast_slice(&marker_centres),
            ),
            marker_count: marker_centres.len() as u32,
        }
    }
}

fn vertex_buffer(device: &wgpu::Device, label: &str, contents: &[u8]) -> wgpu::Buffer {
    // Zero-length vertex buffers cannot be bound; keep one padding vertex.
    let padding = [0u8; 12];
    let contents = if contents.is_empty() { &padding[..] } else { contents };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::VERTEX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris::{build_rings, RingParams};

    #[test]
    fn ring_ranges_cover_each_strip() {
        let rings = build_rings(&RingParams::default());
        let (vertices, ranges) = flatten_rings(&rings);
        assert_eq!(vertices.len(), 3 * 181);
        assert_eq!(ranges, vec![0..181, 181..362, 362..543]);
        assert_eq!(vertices[181], vertices[361]);
    }

    #[test]
    fn markers_flatten_in_ring_order() {
        let rings = build_rings(&RingParams::default());
        let markers = flatten_markers(&rings);
        assert_eq!(markers.len(), 36);
        assert_eq!(markers[12], rings[1].markers[0].to_array());
    }

    #[test]
    fn lens_vertices_match_vertex_layout() {
        assert_eq!(lens_vertices().len(), 6);
        assert_eq!(LensVertex::layout().array_stride, 20);
        assert_eq!(ring_vertex_layout().array_stride, 12);
        assert_eq!(
            marker_instance_layout().step_mode,
            wgpu::VertexStepMode::Instance
        );
    }
}
