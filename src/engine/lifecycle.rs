//! Particle add/remove and the deferred-removal clean list.
//!
//! Removing a particle mid-wave by shifting the array would invalidate
//! every other index a concurrent worker might be holding, so `remove_part`
//! only marks the slot dead and records its index; `clean_up` does the
//! actual compaction afterward, in one pass, outside any parallel section.

use crate::engine::Engine;
use crate::particle::Particle;
use crate::vector::Vec3;

impl Engine {
    /// Checks that at least `n` more particles can be added without
    /// exceeding capacity. Callers that are about to add a caller-known
    /// batch (e.g. ionization secondaries) should check this first and
    /// treat a `false` result as fatal misconfiguration (see the "fatal
    /// configuration" convention) rather than silently dropping particles.
    pub fn check_space(&self, n: usize) -> bool {
        self.parts.len() + n <= self.capacity
    }

    /// Warns once per call when the live array is at or above 90% of
    /// capacity, short of the hard `panic!` an actual overflow triggers.
    fn warn_if_near_capacity(&self) {
        if self.parts.len() as f64 >= 0.9 * self.capacity as f64 {
            log::warn!("particle array at {}/{} capacity", self.parts.len(), self.capacity);
        }
    }

    /// Appends a new live particle, returning its slot index.
    ///
    /// Panics if the array is already at capacity — there is no resize
    /// path; capacity is fixed for the engine's lifetime and exhausting it
    /// is a configuration error the caller must size around up front.
    pub fn add(&mut self, x: Vec3, v: Vec3, a: Vec3, w: f64, t_left: f64, ptype: i32) -> usize {
        assert!(
            self.parts.len() < self.capacity,
            "particle array exhausted: capacity {} reached",
            self.capacity
        );
        let id = self.next_particle_id();
        self.parts.push(Particle::new(x, v, a, w, t_left, id, ptype));
        self.warn_if_near_capacity();
        self.parts.len() - 1
    }

    /// Inserts an already-constructed particle (e.g. an ionization
    /// secondary produced by [`crate::collision::kernels::apply_ionize`]).
    /// Panics on capacity exhaustion, same as [`Self::add`].
    pub fn add_particle(&mut self, p: Particle) -> usize {
        assert!(
            self.parts.len() < self.capacity,
            "particle array exhausted: capacity {} reached",
            self.capacity
        );
        self.parts.push(p);
        self.warn_if_near_capacity();
        self.parts.len() - 1
    }

    /// Marks the particle at `idx` dead and queues it for compaction.
    /// Idempotent: queuing an already-dead slot twice is harmless beyond a
    /// duplicate clean-list entry, which `clean_up` tolerates.
    pub fn remove_part(&mut self, idx: usize) {
        self.parts[idx].mark_dead();
        self.clean_list.push(idx);
    }

    /// Compacts away every dead slot, including ones marked dead outside
    /// the clean list (e.g. by a caller poking `w` directly). Uses
    /// `retain`, so the relative order of surviving particles is
    /// preserved — callers must not assume indices survive across a
    /// `clean_up` call.
    pub fn clean_up(&mut self) {
        self.parts.retain(|p| p.is_alive());
        self.clean_list.clear();
    }

    /// Number of slots queued for removal since the last `clean_up`.
    pub fn n_pending_removal(&self) -> usize {
        self.clean_list.len()
    }
}
