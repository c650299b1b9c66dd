//! Procedural ring geometry placed behind the lens.
//!
//! Rings are closed polylines traced around the z axis at a fixed depth, with
//! a handful of evenly spaced marker positions per ring for the node dots.
//! Everything here is deterministic: the same parameters always produce the
//! same point sequences, so the geometry is built once per component and only
//! the owning group's rotation animates afterwards.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::Serialize;

/// Inputs for [`build_rings`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingParams {
    pub ring_count: usize,
    pub base_radius: f32,
    pub radius_step: f32,
    /// Segments per ring; each ring holds `angular_steps + 1` points.
    pub angular_steps: usize,
    /// Z coordinate shared by every ring point and marker.
    pub depth: f32,
    pub markers_per_ring: usize,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            ring_count: 3,
            base_radius: 0.9,
            radius_step: 0.22,
            angular_steps: 180,
            depth: -0.2,
            markers_per_ring: 12,
        }
    }
}

impl RingParams {
    pub fn radius_of(&self, index: usize) -> f32 {
        self.base_radius + self.radius_step * index as f32
    }
}

/// One traced ring plus the node markers that sit on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingSpec {
    pub radius: f32,
    pub points: Vec<Vec3>,
    pub markers: Vec<Vec3>,
}

impl RingSpec {
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }
}

/// Builds every ring described by `params`.
pub fn build_rings(params: &RingParams) -> Vec<RingSpec> {
    (0..params.ring_count)
        .map(|index| {
            let radius = params.radius_of(index);
            RingSpec {
                radius,
                points: trace_circle(radius, params.depth, params.angular_steps),
                markers: place_markers(radius, params.depth, params.markers_per_ring),
            }
        })
        .collect()
}

fn point_on_circle(radius: f32, depth: f32, angle: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), radius * angle.sin(), depth)
}

fn trace_circle(radius: f32, depth: f32, steps: usize) -> Vec<Vec3> {
    if steps == 0 {
        let start = point_on_circle(radius, depth, 0.0);
        return vec![start, start];
    }

    let mut points: Vec<Vec3> = (0..steps)
        .map(|step| point_on_circle(radius, depth, TAU * step as f32 / steps as f32))
        .collect();
    // Reuse the first point verbatim so the loop closes without float drift.
    points.push(points[0]);
    points
}

fn place_markers(radius: f32, depth: f32, count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|index| point_on_circle(radius, depth, TAU * index as f32 / count as f32))
        .collect()
}
