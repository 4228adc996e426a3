//! Command-line interface for driving an [`Engine`](crate::engine::Engine)
//! standalone.
//!
//! Loading real cross-section data and simulation configuration from files
//! is out of scope for this crate (see [`crate::config`]'s docs) — `run`
//! instead builds a small built-in elastic-scattering configuration so the
//! binary has something to demonstrate end to end.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use crate::config::{CrossSectionTable, EngineConfig};
use crate::engine::Engine;
use crate::mover::MoverKind;
use crate::vector::Vec3;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs a demonstration engine for a fixed number of steps and reports
    /// mean particle energy and live count at the end.
    Run {
        /// Number of macro-particles to seed the engine with.
        #[arg(short = 'n', long, default_value_t = 100)]
        particles: usize,

        /// Number of advance steps to run.
        #[arg(short, long, default_value_t = 1000)]
        steps: u64,

        /// Time step per advance call, seconds.
        #[arg(long, default_value_t = 1e-9)]
        dt: f64,

        /// Master RNG seed; omit for an entropy-seeded run.
        #[arg(long)]
        seed: Option<u64>,

        /// Snapshot the final engine state to this path, if given.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Builds the demonstration config `run` uses: a single elastic channel
/// against a sparse background, loose enough that particles mostly drift
/// ballistically with occasional scattering.
fn demo_config(capacity: usize, seed: Option<u64>) -> EngineConfig {
    EngineConfig {
        mass: 9.109_383_7e-31,
        cross_sections: vec![CrossSectionTable {
            kind: crate::collision::CollisionKind::Elastic,
            en_loss_ev: 0.0,
            rel_mass: 1.0 / 1836.0,
            energies_ev: vec![0.0, 1.0, 10.0, 100.0],
            sigma_m2: vec![1e-20, 5e-20, 1e-19, 8e-20],
            is_event: false,
        }],
        densities_m3: vec![1e20],
        table_size: 64,
        e_max_ev: 200.0,
        capacity,
        rng_seed: seed,
        mover: MoverKind::Verlet,
        dt_max: 1e-9,
    }
}

pub fn run(cli: Cli) {
    match cli.command {
        Commands::Run { particles, steps, dt, seed, output } => {
            let config = demo_config(particles * 2, seed);
            let mut engine = Engine::initialize(&config);
            for i in 0..particles {
                let v = Vec3::new(1.0e5 + i as f64, 0.0, 0.0);
                engine.add(Vec3::zero(), v, Vec3::zero(), 1.0, 0.0, 0);
            }

            info!("seeded {} particles, running {} steps at dt={}", particles, steps, dt);
            for _ in 0..steps {
                engine.advance(dt, &|_p| Vec3::zero(), &|_p| 0);
                engine.clean_up();
            }

            info!(
                "done: {} live particles, mean energy {:.6e} J, {} events logged",
                engine.n_sim_part(),
                engine.get_mean_energy(),
                engine.events().n_stored()
            );

            if let Some(path) = output {
                if let Err(err) = engine.to_file(&path) {
                    log::error!("failed to write snapshot to {}: {err}", path.display());
                }
            }
        }
    }
}
