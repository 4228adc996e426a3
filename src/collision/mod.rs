//! Collision descriptors and the velocity-indexed cumulative rate table.
//!
//! The rate table is the core data structure of the null-collision method
//! (see [`rate_table`]): a 2-D lookup where each row is a uniformly spaced
//! velocity and each column accumulates one more collision's contribution to
//! the total rate, so a single draw against the row's last column picks
//! which (if any) collision fires.

pub mod kernels;
pub mod rate_table;
pub mod sampler;

pub use rate_table::RateTable;

/// The four collision families the engine knows how to apply.
///
/// Each maps to one kernel in [`kernels`]. Adding a new collision family
/// means adding a variant here and a matching arm in
/// [`kernels::apply_collision`] — exhaustive matches elsewhere catch the
/// miss at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CollisionKind {
    /// Momentum-redirecting collision with no energy loss beyond the
    /// center-of-mass correction; particle count unchanged.
    Elastic,
    /// Inelastic collision that deposits `en_loss` into an internal
    /// excitation; particle count unchanged.
    Excite,
    /// Inelastic collision that deposits `en_loss` (the ionization
    /// threshold) and splits the remaining energy between the incident and
    /// a newly created secondary particle; particle count +1.
    Ionize,
    /// The incident particle is absorbed by the background; particle count
    /// -1.
    Attach,
}

/// Immutable description of one collision channel, built once at
/// `Engine::initialize` time and never mutated afterward.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CollisionDescriptor {
    /// Which kernel this channel invokes.
    pub kind: CollisionKind,
    /// Energy lost to the channel per occurrence, in joules.
    pub en_loss: f64,
    /// Rest mass of the incident (simulated) particle species, kg.
    pub part_mass: f64,
    /// Ratio of the incident particle's mass to the background species'
    /// mass, used by the elastic center-of-mass correction.
    pub rel_mass: f64,
    /// When true, a firing of this channel is recorded as an [`crate::event::Event`];
    /// otherwise it is applied silently. Kept alongside the descriptor
    /// rather than as the source's parallel `coll_is_event[]` array, since
    /// a struct field can never drift out of sync with its owning
    /// descriptor the way a same-indexed side array can.
    pub is_event: bool,
}

impl CollisionDescriptor {
    /// Convenience constructor matching the field order above.
    pub fn new(kind: CollisionKind, en_loss: f64, part_mass: f64, rel_mass: f64, is_event: bool) -> Self {
        CollisionDescriptor { kind, en_loss, part_mass, rel_mass, is_event }
    }
}
