//! Particle migration between sibling engine instances.
//!
//! A caller running several `Engine`s side by side (e.g. one per spatial
//! domain slab) uses the per-engine primitives [`Engine::share`] /
//! [`Engine::receive`] and the free functions [`share_all`] /
//! [`reorder_by_bins_all`] to keep load balanced across the pool. None of
//! this assumes anything about what the bins represent — the caller
//! supplies the binning key.

use crate::engine::Engine;
use crate::particle::Particle;

impl Engine {
    /// Stable-sorts the live particle array by `key(particle)` bucketed
    /// into `n_bins` equal-width bins over `[lo, hi)` (out-of-range values
    /// clamp into the first/last bin), then returns the `n_bins + 1`
    /// cumulative offsets delimiting each bin's run in the now-sorted
    /// array (`offsets[i]..offsets[i+1]` is bin `i`).
    ///
    /// Runs `clean_up` first so offsets aren't thrown off by dead slots
    /// awaiting compaction. A single-engine convenience; [`reorder_by_bins_all`]
    /// is the cross-engine operation the spec describes.
    pub fn reorder_by_bins(&mut self, n_bins: usize, lo: f64, hi: f64, key: impl Fn(&Particle) -> f64) -> Vec<usize> {
        assert!(n_bins > 0, "reorder_by_bins requires at least one bin");
        assert!(hi > lo, "reorder_by_bins range must be non-empty, got [{lo}, {hi})");
        self.clean_up();

        let width = (hi - lo) / n_bins as f64;
        let bin_of = |p: &Particle| -> usize {
            let raw = ((key(p) - lo) / width).floor() as isize;
            raw.clamp(0, n_bins as isize - 1) as usize
        };

        self.parts.sort_by_key(bin_of);

        let mut offsets = vec![0usize; n_bins + 1];
        for p in &self.parts {
            offsets[bin_of(p) + 1] += 1;
        }
        for i in 1..=n_bins {
            offsets[i] += offsets[i - 1];
        }
        offsets
    }

    /// Removes and returns the last `count` particles in array order —
    /// a pure tail truncation, so the donor's `n_part` just decreases with
    /// no shift of the remaining particles and no clean-up required.
    pub fn share(&mut self, count: usize) -> Vec<Particle> {
        assert!(count <= self.parts.len(), "cannot share {count} particles out of {}", self.parts.len());
        let split_at = self.parts.len() - count;
        self.parts.split_off(split_at)
    }

    /// Absorbs particles shared in from a sibling engine, assigning each a
    /// fresh id local to this engine so ids stay unique per-engine rather
    /// than leaking a remote engine's id space.
    ///
    /// Panics on capacity exhaustion, same as [`Self::add`].
    pub fn receive(&mut self, incoming: impl IntoIterator<Item = Particle>) {
        for mut p in incoming {
            assert!(
                self.parts.len() < self.capacity,
                "particle array exhausted receiving shared particles: capacity {} reached",
                self.capacity
            );
            p.id = self.next_particle_id();
            self.parts.push(p);
        }
    }
}

/// Moves particles from the most-loaded engine to the least-loaded one,
/// repeatedly, until `max(n) - min(n) < engines.len()` across the pool (or
/// no further progress is possible).
///
/// Each iteration's transfer size is `min(n_max - n_avg, n_avg - n_min)`
/// with `n_avg = ceil(sum(n) / engines.len())`, matching the spec's
/// per-iteration bound — small enough that no single transfer overshoots
/// past the average in either direction.
pub fn share_all(engines: &mut [Engine]) {
    let n_engines = engines.len();
    if n_engines < 2 {
        return;
    }

    loop {
        let counts: Vec<usize> = engines.iter().map(Engine::n_sim_part).collect();
        let total: usize = counts.iter().sum();
        let n_avg = total.div_ceil(n_engines);

        let max_idx = (0..n_engines).max_by_key(|&i| counts[i]).expect("non-empty engines checked above");
        let min_idx = (0..n_engines).min_by_key(|&i| counts[i]).expect("non-empty engines checked above");
        let n_max = counts[max_idx];
        let n_min = counts[min_idx];

        if n_max.saturating_sub(n_min) < n_engines {
            break;
        }
        let transfer = (n_max - n_avg).min(n_avg.saturating_sub(n_min));
        if transfer == 0 {
            break;
        }

        log::info!("share: moving {transfer} particles from engine {max_idx} to engine {min_idx}");

        let (lo, hi) = if max_idx < min_idx { (max_idx, min_idx) } else { (min_idx, max_idx) };
        let (left, right) = engines.split_at_mut(hi);
        let (donor, recipient) = if max_idx < min_idx { (&mut left[lo], &mut right[0]) } else { (&mut right[0], &mut left[lo]) };

        let batch = donor.share(transfer);
        recipient.receive(batch);
    }
}

/// Assigns every bin of `key`-space to an owning engine (greedily, filling
/// each in turn to roughly the pool average) and migrates every
/// out-of-place particle to its owning engine.
///
/// `n_bins` bins span `[lo, hi)`, clamped at the ends, the same convention
/// [`Engine::reorder_by_bins`] and [`Engine::histogram`] use.
pub fn reorder_by_bins_all(engines: &mut [Engine], n_bins: usize, lo: f64, hi: f64, key: impl Fn(&Particle) -> f64) {
    let n_engines = engines.len();
    assert!(n_engines > 0, "reorder_by_bins_all requires at least one engine");
    assert!(n_bins > 0, "reorder_by_bins_all requires at least one bin");
    assert!(hi > lo, "reorder_by_bins_all range must be non-empty, got [{lo}, {hi})");

    let width = (hi - lo) / n_bins as f64;
    let bin_of = |p: &Particle| -> usize {
        let raw = ((key(p) - lo) / width).floor() as isize;
        raw.clamp(0, n_bins as isize - 1) as usize
    };

    // Step 1: bin occupancy, summed across the whole pool.
    let mut bin_counts = vec![0usize; n_bins];
    for engine in engines.iter() {
        for p in engine.iter_alive() {
            bin_counts[bin_of(p)] += 1;
        }
    }
    let total: usize = bin_counts.iter().sum();
    let n_avg = total.div_ceil(n_engines);

    // Step 2: sweep bins in order, greedily filling each owner engine to
    // ~n_avg before handing off to the next.
    let mut owner_of_bin = vec![0usize; n_bins];
    let mut owner = 0usize;
    let mut running = 0usize;
    for (bin, &count) in bin_counts.iter().enumerate() {
        if running >= n_avg && owner + 1 < n_engines {
            owner += 1;
            running = 0;
        }
        owner_of_bin[bin] = owner;
        running += count;
    }

    // Step 3: pull every out-of-place particle out of its current engine
    // and queue it for its owner.
    let mut incoming: Vec<Vec<Particle>> = (0..n_engines).map(|_| Vec::new()).collect();
    for (src_idx, engine) in engines.iter_mut().enumerate() {
        let stray_slots: Vec<usize> = engine
            .parts()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_alive())
            .filter(|(_, p)| owner_of_bin[bin_of(p)] != src_idx)
            .map(|(slot, p)| {
                incoming[owner_of_bin[bin_of(p)]].push(*p);
                slot
            })
            .collect();
        for slot in stray_slots {
            engine.remove_part(slot);
        }
    }

    for (engine, batch) in engines.iter_mut().zip(incoming) {
        let moved = batch.len();
        engine.receive(batch);
        if moved > 0 {
            log::info!("reorder_by_bins: engine received {moved} particles");
        }
    }

    // Step 4: clean_up every engine.
    for engine in engines.iter_mut() {
        engine.clean_up();
    }
}
