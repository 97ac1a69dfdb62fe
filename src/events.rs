//! Buffered contact events.

use crate::api::ContactListener;
use crate::types::ColliderRef;

/// Event discriminator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContactEventKind {
    CollisionEnter,
    CollisionExit,
    TriggerEnter,
    TriggerExit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContactEvent {
    pub kind: ContactEventKind,
    pub a: ColliderRef,
    pub b: ColliderRef,
}

impl ContactEvent {
    /// True if the event concerns `collider` on either side.
    pub fn involves(&self, collider: ColliderRef) -> bool {
        self.a == collider || self.b == collider
    }
}

/// Listener that records every notification in arrival order.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<ContactEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    /// Take the accumulated events, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn count(&self, kind: ContactEventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    fn push(&mut self, kind: ContactEventKind, a: ColliderRef, b: ColliderRef) {
        self.events.push(ContactEvent { kind, a, b });
    }
}

impl ContactListener for EventCollector {
    fn on_collision_enter(&mut self, a: ColliderRef, b: ColliderRef) {
        self.push(ContactEventKind::CollisionEnter, a, b);
    }

    fn on_collision_exit(&mut self, a: ColliderRef, b: ColliderRef) {
        self.push(ContactEventKind::CollisionExit, a, b);
    }

    fn on_trigger_enter(&mut self, a: ColliderRef, b: ColliderRef) {
        self.push(ContactEventKind::TriggerEnter, a, b);
    }

    fn on_trigger_exit(&mut self, a: ColliderRef, b: ColliderRef) {
        self.push(ContactEventKind::TriggerExit, a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_and_drains() {
        let (a, b) = (ColliderRef::new(0, 0), ColliderRef::new(1, 0));
        let mut c = EventCollector::new();
        c.on_trigger_enter(a, b);
        c.on_collision_exit(b, a);
        assert_eq!(c.count(ContactEventKind::TriggerEnter), 1);
        assert!(c.events()[1].involves(a));
        let drained = c.drain();
        assert_eq!(drained.len(), 2);
        assert!(c.events().is_empty());
    }
}
