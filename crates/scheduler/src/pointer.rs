use std::collections::BTreeMap;
use std::fmt;

use crate::SchedulerError;

/// Raw pointer movement as reported by the windowing layer.
///
/// Coordinates are relative to the top-left corner of the viewport and share
/// units with the viewport dimensions (both physical or both logical).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client_x: f64,
    pub client_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type PointerListener = Box<dyn FnMut(&PointerEvent)>;

/// Fans pointer-move events out to every registered listener.
#[derive(Default)]
pub struct PointerBus {
    listeners: BTreeMap<ListenerId, PointerListener>,
    next_id: u64,
}

impl PointerBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&PointerEvent) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> Result<(), SchedulerError> {
        self.listeners
            .remove(&id)
            .map(|_| ())
            .ok_or(SchedulerError::UnknownListener(id))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Delivers `event` to all listeners and returns how many received it.
    pub fn publish(&mut self, event: &PointerEvent) -> usize {
        for listener in self.listeners.values_mut() {
            listener(event);
        }
        self.listeners.len()
    }
}
