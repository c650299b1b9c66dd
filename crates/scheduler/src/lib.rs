use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

mod pointer;

pub use pointer::{ListenerId, PointerBus, PointerEvent, PointerListener};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("frame subscription {0} is not registered")]
    UnknownSubscription(SubscriptionId),
    #[error("pointer listener {0} is not registered")]
    UnknownListener(ListenerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Values handed to every frame callback for a single rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds elapsed since the previous dispatched frame.
    pub delta: f32,
    /// Monotonic counter of dispatched frames.
    pub frame_index: u64,
}

/// What a frame callback wants after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    /// Nothing left to animate; an on-demand loop may go idle.
    Idle,
    /// Another frame is needed even when rendering on demand.
    Continue,
}

/// How often frames should be produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cadence {
    /// Render every frame, optionally capped to `target_fps`.
    Continuous { target_fps: Option<f32> },
    /// Render only after an explicit redraw request or when a callback asks
    /// for another frame.
    OnDemand,
}

impl Default for Cadence {
    fn default() -> Self {
        Self::Continuous { target_fps: None }
    }
}

pub type FrameCallback = Box<dyn FnMut(&FrameTick) -> Redraw>;

pub struct FrameScheduler {
    cadence: Cadence,
    callbacks: BTreeMap<SubscriptionId, FrameCallback>,
    next_id: u64,
    frame_index: u64,
    last_rendered: Option<Instant>,
    redraw_requested: bool,
    continuation: bool,
}

fn normalize_fps(value: Option<f32>) -> Option<f32> {
    value.and_then(|fps| if fps > 0.0 { Some(fps) } else { None })
}

/// A cap too small to express as a `Duration` is treated as uncapped.
fn frame_interval(target_fps: Option<f32>) -> Option<Duration> {
    normalize_fps(target_fps).and_then(|fps| Duration::try_from_secs_f32(1.0 / fps).ok())
}

impl FrameScheduler {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            callbacks: BTreeMap::new(),
            next_id: 0,
            frame_index: 0,
            last_rendered: None,
            redraw_requested: true,
            continuation: false,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn set_cadence(&mut self, cadence: Cadence) {
        if self.cadence != cadence {
            tracing::debug!(?cadence, "frame cadence changed");
            self.cadence = cadence;
            self.redraw_requested = true;
        }
    }

    /// Registers a callback that runs once per dispatched frame until it is
    /// removed with [`FrameScheduler::unsubscribe`].
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&FrameTick) -> Redraw + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.insert(id, Box::new(callback));
        self.redraw_requested = true;
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), SchedulerError> {
        self.callbacks
            .remove(&id)
            .map(|_| ())
            .ok_or(SchedulerError::UnknownSubscription(id))
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.len()
    }

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Runs every registered callback with the supplied frame delta.
    pub fn dispatch(&mut self, delta: Duration) -> FrameTick {
        let tick = FrameTick {
            delta: delta.as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.saturating_add(1);

        let mut continuation = false;
        for callback in self.callbacks.values_mut() {
            if callback(&tick) == Redraw::Continue {
                continuation = true;
            }
        }
        self.continuation = continuation;
        tick
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_rendered = Some(now);
        self.redraw_requested = false;
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        if self.redraw_requested {
            return true;
        }
        match self.cadence {
            Cadence::Continuous { target_fps } => {
                match (frame_interval(target_fps), self.last_rendered) {
                    (Some(interval), Some(last)) => last
                        .checked_add(interval)
                        .map_or(true, |deadline| now >= deadline),
                    _ => true,
                }
            }
            Cadence::OnDemand => self.continuation,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.cadence {
            Cadence::Continuous { target_fps } => {
                let interval = frame_interval(target_fps)?;
                self.last_rendered
                    .and_then(|last| last.checked_add(interval))
            }
            Cadence::OnDemand => None,
        }
    }
}

/// Converts wall-clock instants into per-frame deltas.
///
/// The first tick after construction or [`FrameClock::reset`] reports zero so
/// animations never jump on their first frame, and long stalls (hidden
/// windows, suspended sessions) are clamped to `max_delta`.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    pub fn tick(&mut self, now: Instant) -> Duration {
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        delta.min(self.max_delta)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
