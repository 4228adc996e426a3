//! Two-file binary persistence via `bincode`: a parameters file holding the
//! collision table plus the handful of scalars that size it, and a
//! separate rate-table file written by [`RateTable`] itself.
//!
//! Live particles, the mover, `dt_max`, and the master RNG's state are
//! deliberately not part of either file: the documented persisted format is
//! `[n_max, n_colls, mass, max_rate, colls[n_colls]]` plus the rate-table
//! grid, nothing more, so a restored engine is always empty and takes its
//! mover, `dt_max`, and RNG seed from the caller, the same way
//! [`crate::engine::Engine::initialize`] does.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::collision::{CollisionDescriptor, RateTable};
use crate::engine::{Engine, SCHEMA_VERSION};
use crate::error::EngineError;
use crate::event::EventLog;
use crate::mover::MoverKind;

#[derive(serde::Serialize, serde::Deserialize)]
struct EngineParams {
    schema_version: u32,
    n_max: usize,
    n_colls: usize,
    mass: f64,
    max_rate: f64,
    colls: Vec<CollisionDescriptor>,
}

fn params_path(base: impl AsRef<Path>) -> PathBuf {
    sibling_path(base, "params")
}

fn rate_table_path(base: impl AsRef<Path>) -> PathBuf {
    sibling_path(base, "ratetable")
}

/// Appends `.{suffix}` onto `base`'s file name rather than replacing
/// whatever extension `base` already carries, so a caller's chosen name
/// (e.g. `run1.bin`) yields `run1.bin.params` / `run1.bin.ratetable`.
fn sibling_path(base: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let base = base.as_ref();
    let mut name: OsString = base.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    base.with_file_name(name)
}

impl Engine {
    /// Writes this engine's collision table to two files alongside `path`:
    /// `{path}.params` (the scalars and collision descriptors) and
    /// `{path}.ratetable` (the velocity-indexed grid, written by
    /// [`RateTable::to_file`]).
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let params = EngineParams {
            schema_version: SCHEMA_VERSION,
            n_max: self.capacity,
            n_colls: self.rate_table.descriptors().len(),
            mass: self.mass,
            max_rate: self.rate_table.max_rate(),
            colls: self.rate_table.descriptors().to_vec(),
        };
        let file = File::create(params_path(&path))?;
        bincode::serialize_into(BufWriter::new(file), &params)?;

        self.rate_table.to_file(rate_table_path(&path))
    }

    /// Loads the two files written by [`Self::to_file`] into a fresh, empty
    /// engine.
    ///
    /// `mover`, `dt_max`, and `rng_seed` are not part of the persisted
    /// format and must be supplied by the caller, exactly as they would be
    /// to [`Engine::initialize`]. Returns [`EngineError::SchemaMismatch`]
    /// if the params file's schema version doesn't match this build's, or
    /// if the rate-table file's channel count disagrees with `n_colls`.
    pub fn init_from_file(
        path: impl AsRef<Path>,
        mover: MoverKind,
        dt_max: f64,
        rng_seed: Option<u64>,
    ) -> Result<Self, EngineError> {
        let file = File::open(params_path(&path))?;
        let params: EngineParams = bincode::deserialize_from(BufReader::new(file))?;

        if params.schema_version != SCHEMA_VERSION {
            return Err(EngineError::SchemaMismatch { found: params.schema_version, expected: SCHEMA_VERSION });
        }

        let rate_table = RateTable::from_file(rate_table_path(&path))?;
        if rate_table.descriptors().len() != params.n_colls {
            return Err(EngineError::SchemaMismatch {
                found: rate_table.descriptors().len() as u32,
                expected: params.n_colls as u32,
            });
        }

        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Engine {
            parts: Vec::with_capacity(params.n_max),
            capacity: params.n_max,
            clean_list: Vec::new(),
            rate_table,
            mover,
            mass: params.mass,
            dt_max,
            rng,
            events: EventLog::new(),
            next_id: 0,
        })
    }
}
