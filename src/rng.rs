//! Per-thread RNG pool for the parallel particle-advance.
//!
//! Splitting one RNG across worker threads would make the result depend on
//! thread-scheduling order, so each worker gets its own [`rand::rngs::StdRng`]
//! instead. To keep a run reproducible for a given `(master_seed,
//! n_threads)` pair regardless of OS scheduling, every worker's seed is
//! drawn from the single master RNG *up front, in thread order* — the
//! nondeterminism of `rayon`'s scheduler then only affects the order
//! batches of work complete in, never which random numbers a given thread
//! consumes.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

/// A fixed-size pool of independently seeded RNGs, one per worker thread.
#[derive(Debug, Clone)]
pub struct PrngPool {
    rngs: Vec<StdRng>,
}

impl PrngPool {
    /// Draws `n_threads` seeds from `master`, in order, and builds one
    /// [`StdRng`] per thread. The pool then owns each thread's RNG state
    /// for the lifetime of the engine — later calls reuse and advance the
    /// same generators rather than reseeding, so a sequence of
    /// `advance_parallel` calls is reproducible as a whole, not just
    /// within a single call.
    pub fn init_parallel(n_threads: usize, master: &mut StdRng) -> Self {
        let rngs = (0..n_threads).map(|_| StdRng::seed_from_u64(master.random())).collect();
        PrngPool { rngs }
    }

    /// Number of per-thread generators held.
    pub fn n_threads(&self) -> usize {
        self.rngs.len()
    }

    /// Mutable access to one thread's generator.
    pub fn thread_rng(&mut self, idx: usize) -> &mut StdRng {
        &mut self.rngs[idx]
    }

    /// Splits the pool into disjoint mutable slices for `rayon::scope` fan-out.
    pub fn as_mut_slice(&mut self) -> &mut [StdRng] {
        &mut self.rngs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_master_seed_yields_same_thread_seeds() {
        let mut m1 = StdRng::seed_from_u64(7);
        let mut m2 = StdRng::seed_from_u64(7);
        let mut p1 = PrngPool::init_parallel(4, &mut m1);
        let mut p2 = PrngPool::init_parallel(4, &mut m2);
        for i in 0..4 {
            let a: u64 = p1.thread_rng(i).random();
            let b: u64 = p2.thread_rng(i).random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_threads_get_independent_streams() {
        let mut m = StdRng::seed_from_u64(7);
        let mut pool = PrngPool::init_parallel(2, &mut m);
        let a: u64 = pool.thread_rng(0).random();
        let b: u64 = pool.thread_rng(1).random();
        assert_ne!(a, b);
    }
}
