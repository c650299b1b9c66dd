use std::cell::Cell;
use std::rc::Rc;

use scheduler::PointerEvent;

/// Pointer position normalised to `[-1, 1]` on both axes, with `(-1, -1)` at
/// the top-left corner of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Maps viewport-relative client coordinates onto `[-1, 1]`.
///
/// No clamping is applied; coordinates outside the viewport map outside the
/// range. Degenerate viewports are treated as one unit wide.
pub fn normalize(event: &PointerEvent) -> PointerSample {
    let width = event.viewport_width.max(1.0);
    let height = event.viewport_height.max(1.0);
    PointerSample {
        x: ((event.client_x / width) * 2.0 - 1.0) as f32,
        y: ((event.client_y / height) * 2.0 - 1.0) as f32,
    }
}

/// Holds the most recent pointer sample.
///
/// Clones share the same slot: the pointer listener writes through one clone
/// and the frame callback reads through another. There is no history; every
/// event overwrites the previous sample.
#[derive(Debug, Clone, Default)]
pub struct PointerSampler {
    latest: Rc<Cell<PointerSample>>,
}

impl PointerSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: &PointerEvent) {
        self.latest.set(normalize(event));
    }

    pub fn latest(&self) -> PointerSample {
        self.latest.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(x: f64, y: f64, width: f64, height: f64) -> PointerEvent {
        PointerEvent {
            client_x: x,
            client_y: y,
            viewport_width: width,
            viewport_height: height,
        }
    }

    #[test]
    fn corners_map_to_unit_square() {
        assert_eq!(
            normalize(&event(0.0, 0.0, 1920.0, 1080.0)),
            PointerSample::new(-1.0, -1.0)
        );
        assert_eq!(
            normalize(&event(1920.0, 1080.0, 1920.0, 1080.0)),
            PointerSample::new(1.0, 1.0)
        );
        assert_eq!(
            normalize(&event(960.0, 540.0, 1920.0, 1080.0)),
            PointerSample::new(0.0, 0.0)
        );
    }

    #[test]
    fn sampler_starts_centred_and_keeps_latest() {
        let sampler = PointerSampler::new();
        assert_eq!(sampler.latest(), PointerSample::default());

        let reader = sampler.clone();
        sampler.record(&event(0.0, 100.0, 100.0, 100.0));
        sampler.record(&event(75.0, 25.0, 100.0, 100.0));
        assert_eq!(reader.latest(), PointerSample::new(0.5, -0.5));
    }

    #[test]
    fn degenerate_viewport_does_not_produce_nan() {
        let sample = normalize(&event(0.0, 0.0, 0.0, 0.0));
        assert!(sample.x.is_finite() && sample.y.is_finite());
    }
}
