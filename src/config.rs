//! Plain configuration data the caller assembles before calling
//! [`crate::engine::Engine::initialize`].
//!
//! Parsing cross-section files or simulation config files is explicitly out
//! of scope for this crate (see the spec's "Out of scope" list) — these
//! types are what a caller's own file-parsing code is expected to produce.
//! They derive `serde` like every other data-carrying type in this crate so
//! a caller *may* round-trip them through `serde_json`/their own format, but
//! this crate performs no file I/O to build them.

use crate::collision::CollisionKind;
use crate::mover::MoverKind;

/// One collision channel's cross-section, tabulated by energy.
///
/// `energies_ev` must be sorted ascending and the same length as
/// `sigma_m2`; [`crate::collision::rate_table::RateTable::build`] linearly
/// interpolates within this table and clamps outside its range.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrossSectionTable {
    /// Which collision kernel this channel applies.
    pub kind: CollisionKind,
    /// Energy threshold/loss for this channel, in eV. Ignored for
    /// `Elastic`, where the center-of-mass correction already accounts for
    /// energy exchange.
    pub en_loss_ev: f64,
    /// Ratio of the simulated particle's mass to this channel's background
    /// species mass.
    pub rel_mass: f64,
    /// Tabulated energies, eV, ascending.
    pub energies_ev: Vec<f64>,
    /// Cross-section at each tabulated energy, m^2.
    pub sigma_m2: Vec<f64>,
    /// Whether a firing of this channel should be recorded in the event
    /// log.
    pub is_event: bool,
}

/// Configuration for [`crate::engine::Engine::initialize`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Rest mass of the simulated particle species, kg.
    pub mass: f64,
    /// One entry per collision channel. Must be non-empty (see §7 "Fatal
    /// configuration").
    pub cross_sections: Vec<CrossSectionTable>,
    /// Background number density (m^-3) for each entry in `cross_sections`,
    /// same length and order.
    pub densities_m3: Vec<f64>,
    /// Number of rows in the rate table (`N` in spec terms).
    pub table_size: usize,
    /// Energy at the top row of the rate table, eV.
    pub e_max_ev: f64,
    /// Fixed particle array capacity.
    pub capacity: usize,
    /// Seed for the engine's master RNG. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    /// Which mover this engine uses.
    pub mover: MoverKind,
    /// Per-substep cap on a single ballistic step (`dt_max`).
    pub dt_max: f64,
}
