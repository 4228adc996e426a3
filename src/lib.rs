//! A kinetic particle engine combining ballistic motion with null-collision
//! Monte Carlo Collisions (MCC) against a background gas.
//!
//! [`engine::Engine`] owns a fixed-capacity array of macro-particles and
//! advances them through [`engine::advance`], interleaving the configured
//! [`mover`] with collisions drawn from a [`collision::RateTable`]. Field
//! solvers, domain geometry, and cross-section/config file parsing are all
//! the caller's concern — this crate only consumes them through narrow
//! closures and plain data.

pub mod cli;
pub mod collision;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod mover;
pub mod particle;
pub mod rng;
pub mod spatial;
pub mod vector;
