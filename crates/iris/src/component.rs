use std::cell::Cell;
use std::rc::Rc;

use scheduler::{FrameScheduler, ListenerId, PointerBus, SchedulerError, SubscriptionId};
use tracing::debug;

use crate::driver::{FrameDriver, FrameSnapshot, PointerFollow};
use crate::geometry::{build_rings, RingParams, RingSpec};
use crate::motion::MotionPreference;
use crate::pointer::PointerSampler;
use crate::shader::{Palette, ShaderState};

/// Everything fixed for the lifetime of one mounted backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IrisOptions {
    pub motion: MotionPreference,
    pub follow: PointerFollow,
    pub palette: Palette,
    pub rings: RingParams,
}

/// A mounted iris backdrop.
///
/// Mounting builds the ring geometry, registers a pointer listener and a
/// frame callback, and hands back a handle the renderer reads snapshots
/// from. [`IrisComponent::unmount`] removes both registrations again.
pub struct IrisComponent {
    options: IrisOptions,
    rings: Vec<RingSpec>,
    snapshot: Rc<Cell<FrameSnapshot>>,
    subscription: SubscriptionId,
    listener: ListenerId,
}

impl IrisComponent {
    pub fn mount(
        options: IrisOptions,
        frames: &mut FrameScheduler,
        pointer: &mut PointerBus,
    ) -> Self {
        let rings = build_rings(&options.rings);

        let sampler = PointerSampler::new();
        let writer = sampler.clone();
        let listener = pointer.subscribe(move |event| writer.record(event));

        let mut driver = FrameDriver::new(
            ShaderState::new(options.palette),
            options.motion,
            options.follow,
        );
        let snapshot = Rc::new(Cell::new(driver.snapshot()));
        let published = Rc::clone(&snapshot);
        let subscription = frames.subscribe(move |tick| {
            let redraw = driver.advance(tick.delta, sampler.latest());
            published.set(driver.snapshot());
            redraw
        });

        debug!(
            rings = rings.len(),
            reduced_motion = options.motion.is_reduced(),
            follow = ?options.follow,
            %subscription,
            %listener,
            "iris component mounted"
        );

        Self {
            options,
            rings,
            snapshot,
            subscription,
            listener,
        }
    }

    pub fn options(&self) -> &IrisOptions {
        &self.options
    }

    pub fn rings(&self) -> &[RingSpec] {
        &self.rings
    }

    /// State produced by the most recent frame callback.
    pub fn snapshot(&self) -> FrameSnapshot {
        self.snapshot.get()
    }

    /// Whether pointer movement should trigger a redraw.
    pub fn follows_pointer(&self) -> bool {
        !self.options.motion.is_reduced() || self.options.follow == PointerFollow::Always
    }

    pub fn unmount(
        self,
        frames: &mut FrameScheduler,
        pointer: &mut PointerBus,
    ) -> Result<(), SchedulerError> {
        let frame_result = frames.unsubscribe(self.subscription);
        let pointer_result = pointer.unsubscribe(self.listener);
        debug!(
            subscription = %self.subscription,
            listener = %self.listener,
            "iris component unmounted"
        );
        frame_result.and(pointer_result)
    }
}
