//! Recoverable error types.
//!
//! Only the persistence path can fail for reasons outside the caller's
//! control (disk full, corrupt file, version skew) — everything else in
//! this crate is either infallible or a programming-bug class failure
//! (bad configuration, exhausted capacity) that `panic!`/`assert!` report
//! directly, per the logging/error-handling convention the rest of the
//! engine follows.

use thiserror::Error;

/// Errors returned by [`crate::engine::persistence`] and
/// [`crate::collision::rate_table::RateTable`]'s own file I/O.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The underlying file could not be read or written.
    #[error("I/O error during engine persistence: {0}")]
    Io(#[from] std::io::Error),

    /// The particle array or rate tables could not be encoded/decoded.
    #[error("failed to (de)serialize engine state: {0}")]
    Serialize(#[from] bincode::Error),

    /// A loaded snapshot's schema version does not match this build's.
    #[error("snapshot schema version {found} does not match expected version {expected}")]
    SchemaMismatch {
        /// Version recorded in the snapshot file.
        found: u32,
        /// Version this build expects.
        expected: u32,
    },
}
