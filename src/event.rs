//! Collision and domain-exit events recorded during `advance`.
//!
//! An [`Event`] is a snapshot, not a live reference: by the time the caller
//! inspects the log the particle that produced it may already be dead or
//! compacted away, so the event carries its own copy of the particle state.

use crate::collision::CollisionKind;
use crate::particle::Particle;

/// Sentinel collision index used for an event that represents the particle
/// leaving the simulation domain rather than undergoing a real collision.
pub const WENT_OUTSIDE_INDEX: i32 = -1;

/// What kind of event was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EventKind {
    /// The particle's `outside_check` callback returned a positive reason
    /// code; the particle was marked dead without a physical collision.
    WentOutside {
        /// The caller-defined reason code (`outside_check`'s return value).
        reason: i32,
    },
    /// A real collision of the given kind occurred at the recorded
    /// collision-table column index.
    Collision(CollisionKind),
}

/// A single recorded event: the particle's state at the moment of the
/// event, which collision-table column (or [`WENT_OUTSIDE_INDEX`]) produced
/// it, and its kind.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Event {
    /// Snapshot of the particle at the moment of the event.
    pub particle: Particle,
    /// Column index into the collision table, or [`WENT_OUTSIDE_INDEX`].
    pub coll_index: i32,
    /// What happened.
    pub kind: EventKind,
}

impl Event {
    /// Builds a domain-exit event.
    pub fn went_outside(particle: Particle, reason: i32) -> Self {
        Event {
            particle,
            coll_index: WENT_OUTSIDE_INDEX,
            kind: EventKind::WentOutside { reason },
        }
    }

    /// Builds a collision event for the given table column and kind.
    pub fn collision(particle: Particle, coll_index: usize, kind: CollisionKind) -> Self {
        Event {
            particle,
            coll_index: coll_index as i32,
            kind: EventKind::Collision(kind),
        }
    }
}

/// A dynamically-growing log of events.
///
/// Backed by `Vec`, which already doubles its backing allocation on
/// overflow; this wrapper exists so call sites name the concept ("the event
/// log") rather than reach for a bare `Vec<Event>`, and so the count used in
/// the external-interface table (`events.n_stored`) has a home.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        EventLog { events: Vec::new() }
    }

    /// Number of events currently stored.
    pub fn n_stored(&self) -> usize {
        self.events.len()
    }

    /// Appends a single event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Appends a batch of events, e.g. draining a per-thread buffer.
    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    /// Removes and returns all stored events, leaving the log empty.
    pub fn drain_all(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view of the stored events.
    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vec3;

    fn dummy_particle() -> Particle {
        Particle::new(Vec3::zero(), Vec3::zero(), Vec3::zero(), 1.0, 0.0, 0, 0)
    }

    #[test]
    fn push_and_count() {
        let mut log = EventLog::new();
        assert_eq!(log.n_stored(), 0);
        log.push(Event::went_outside(dummy_particle(), 1));
        assert_eq!(log.n_stored(), 1);
        assert_eq!(log.as_slice()[0].coll_index, WENT_OUTSIDE_INDEX);
    }

    #[test]
    fn drain_empties_log() {
        let mut log = EventLog::new();
        log.push(Event::collision(dummy_particle(), 2, CollisionKind::Elastic));
        let drained = log.drain_all();
        assert_eq!(drained.len(), 1);
        assert_eq!(log.n_stored(), 0);
    }
}
