//! The particle engine: owns the live particle array, the collision rate
//! table, and the bookkeeping (clean list, RNG, event log) that the rest of
//! this module's files operate on.
//!
//! Acceleration and domain-exit checks are the caller's concern (an
//! external field solver and domain geometry, respectively) and are passed
//! as closures into [`advance::Engine::advance`]/`advance_parallel` rather
//! than stored on `Engine` — that keeps the engine's own state plainly
//! serializable for [`persistence`] and keeps this crate blind to what the
//! field solver or domain shape actually are.

pub mod advance;
pub mod diagnostics;
pub mod lifecycle;
pub mod merge_split;
pub mod move_and_collide;
pub mod persistence;
pub mod sharing;
#[cfg(test)]
mod tests;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::collision::rate_table::ChannelInput;
use crate::collision::{CollisionDescriptor, RateTable};
use crate::config::EngineConfig;
use crate::event::EventLog;
use crate::mover::MoverKind;
use crate::particle::Particle;

/// Current schema version written by [`persistence::Engine::to_file`];
/// bumped whenever the on-disk layout changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

/// Owns one species' live particle array and everything needed to advance
/// it: the collision rate table, mover choice, master RNG, and the
/// deferred-removal bookkeeping used by [`lifecycle`].
pub struct Engine {
    pub(crate) parts: Vec<Particle>,
    pub(crate) capacity: usize,
    pub(crate) clean_list: Vec<usize>,
    pub(crate) rate_table: RateTable,
    pub(crate) mover: MoverKind,
    pub(crate) mass: f64,
    pub(crate) dt_max: f64,
    pub(crate) rng: StdRng,
    pub(crate) events: EventLog,
    pub(crate) next_id: i64,
}

impl Engine {
    /// Builds a new, empty engine from a caller-assembled configuration.
    ///
    /// Panics if `config.cross_sections` is empty, if `densities_m3` does
    /// not match it in length, or if `capacity` is zero — these are all
    /// programming-bug-class misconfigurations, not recoverable errors.
    pub fn initialize(config: &EngineConfig) -> Self {
        assert!(!config.cross_sections.is_empty(), "engine requires at least one collision channel");
        assert_eq!(
            config.cross_sections.len(),
            config.densities_m3.len(),
            "cross_sections and densities_m3 must have the same length, got {} and {}",
            config.cross_sections.len(),
            config.densities_m3.len()
        );
        assert!(config.capacity > 0, "engine capacity must be positive, got {}", config.capacity);

        let descriptors: Vec<CollisionDescriptor> = config
            .cross_sections
            .iter()
            .map(|xs| CollisionDescriptor::new(xs.kind, xs.en_loss_ev * 1.602_176_634e-19, config.mass, xs.rel_mass, xs.is_event))
            .collect();

        let channels: Vec<ChannelInput> = config
            .cross_sections
            .iter()
            .zip(descriptors.iter())
            .zip(config.densities_m3.iter())
            .map(|((xs, desc), &density_m3)| ChannelInput { descriptor: *desc, density_m3, cross_section: xs })
            .collect();

        let rate_table = RateTable::build(&channels, config.mass, config.e_max_ev, config.table_size);

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        log::info!(
            "engine initialized: capacity={}, table_size={}, channels={}",
            config.capacity,
            config.table_size,
            config.cross_sections.len()
        );

        Engine {
            parts: Vec::with_capacity(config.capacity),
            capacity: config.capacity,
            clean_list: Vec::new(),
            rate_table,
            mover: config.mover,
            mass: config.mass,
            dt_max: config.dt_max,
            rng,
            events: EventLog::new(),
            next_id: 0,
        }
    }

    /// Rest mass of the simulated species, kg.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Fixed particle-array capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read-only view of the live-or-pending-removal particle array.
    /// Includes dead slots awaiting `clean_up`; use [`Self::iter_alive`] to
    /// skip them.
    pub fn parts(&self) -> &[Particle] {
        &self.parts
    }

    /// Iterator over live particles only.
    pub fn iter_alive(&self) -> impl Iterator<Item = &Particle> {
        self.parts.iter().filter(|p| p.is_alive())
    }

    /// The engine's collision rate table.
    pub fn rate_table(&self) -> &RateTable {
        &self.rate_table
    }

    /// The event log accumulated since it was last drained.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drains and returns all accumulated events.
    pub fn drain_events(&mut self) -> Vec<crate::event::Event> {
        self.events.drain_all()
    }

    fn next_particle_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
