//! Read-only summary statistics over the live particle array.
//!
//! Every function here is a pure reduction over [`Engine::iter_alive`] —
//! no mutation, safe to call between or during diagnostics windows without
//! disturbing the simulation state.

use crate::engine::Engine;
use crate::vector::Vec3;

impl Engine {
    /// Number of live macro-particles.
    pub fn n_sim_part(&self) -> usize {
        self.iter_alive().count()
    }

    /// Total number of real particles represented, `sum(w)` over live
    /// macro-particles.
    pub fn n_real_part(&self) -> f64 {
        self.iter_alive().map(|p| p.w).sum()
    }

    /// Weighted sum of a scalar quantity extracted by `f` over all live
    /// particles.
    pub fn compute_scalar_sum(&self, f: impl Fn(&crate::particle::Particle) -> f64) -> f64 {
        self.iter_alive().map(|p| f(p) * p.w).sum()
    }

    /// Weighted sum of a vector quantity extracted by `f` over all live
    /// particles.
    pub fn compute_vector_sum(&self, f: impl Fn(&crate::particle::Particle) -> Vec3) -> Vec3 {
        self.iter_alive().fold(Vec3::zero(), |acc, p| acc + f(p) * p.w)
    }

    /// Mean kinetic energy per real particle, joules. Returns `0.0` when
    /// there are no live particles rather than dividing by zero.
    pub fn get_mean_energy(&self) -> f64 {
        let n_real = self.n_real_part();
        if n_real <= 0.0 {
            return 0.0;
        }
        let mass = self.mass;
        self.compute_scalar_sum(|p| p.kinetic_energy(mass)) / n_real
    }

    /// Weighted histogram of `value_fn(particle)` into `n_bins` equal-width
    /// bins spanning `[lo, hi)`; values outside the range are clamped into
    /// the first/last bin, matching the rate table's clamp-at-the-edges
    /// convention elsewhere in this crate.
    ///
    /// `filter_fn` restricts which live particles are binned at all — a
    /// particle only contributes its weight when `filter_fn(p)` is true.
    /// The source's separate `filter_args` parameter has no counterpart
    /// here: a closure already owns whatever state it captures, so callers
    /// reach for a capturing closure (`|p| p.ptype == wanted`) instead of
    /// threading extra arguments through.
    pub fn histogram(
        &self,
        n_bins: usize,
        lo: f64,
        hi: f64,
        value_fn: impl Fn(&crate::particle::Particle) -> f64,
        filter_fn: impl Fn(&crate::particle::Particle) -> bool,
    ) -> Vec<f64> {
        assert!(n_bins > 0, "histogram requires at least one bin");
        assert!(hi > lo, "histogram range must be non-empty, got [{lo}, {hi})");
        let mut bins = vec![0.0; n_bins];
        let width = (hi - lo) / n_bins as f64;
        for p in self.iter_alive().filter(|p| filter_fn(p)) {
            let value = value_fn(p);
            let raw_bin = ((value - lo) / width).floor() as isize;
            let bin = raw_bin.clamp(0, n_bins as isize - 1) as usize;
            bins[bin] += p.w;
        }
        bins
    }
}
