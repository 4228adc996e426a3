//! Weight-based macro-particle rebalancing via nearest-neighbor merge and
//! ratio-triggered split.
//!
//! `merge_and_split` keeps each particle's weight within a band around a
//! caller-supplied target by merging low-weight pairs that are close in
//! `(masked position, scaled velocity)` space, and splitting high-weight
//! particles in two. Finding "closest in that space" is the one place this
//! engine needs a real nearest-neighbor index, hence the
//! [`NearestNeighborIndex`] seam rather than an O(n^2) scan.

use std::collections::HashSet;

use rand::Rng;
use rand::rngs::StdRng;

use crate::engine::Engine;
use crate::particle::Particle;
use crate::spatial::{MergeCoord, NearestNeighborIndex};

/// A particle whose weight ratio to its target is `<= 1/1.5` is a merge
/// candidate; `>= 1.5` is a split candidate. Particles in between are left
/// alone.
const SMALL: f64 = 1.0 / 1.5;
const LARGE: f64 = 1.5;

/// Combines two particles into one, called with the weight-lightest pair
/// found by nearest-neighbor search. Must conserve `a.w + b.w` in the
/// result's weight for the crate's weight-conservation invariant to hold.
pub type MergeFn = fn(&Particle, &Particle, &mut StdRng) -> Particle;

/// Splits one particle (whose ratio to its target is `r`) into two. Must
/// conserve the original's weight across the pair.
pub type SplitFn = fn(&Particle, f64, &mut StdRng) -> (Particle, Particle);

/// Parameters controlling a `merge_and_split` pass.
pub struct MergeSplitParams<'a> {
    /// Which position axes participate in the nearest-neighbor distance;
    /// an axis set to `false` is omitted (zeroed identically for every
    /// particle, so it can't perturb ranking).
    pub x_mask: [bool; 3],
    /// Scale applied to the velocity (or velocity-norm) coordinate before
    /// distance comparison, to weigh position against velocity similarity.
    pub v_fac: f64,
    /// When true, use `v_fac * |v|` (one coordinate) instead of
    /// `v_fac * v` (three coordinates).
    pub use_v_norm: bool,
    /// Nearest-neighbor pairs farther apart than this (in the combined
    /// coordinate space) are not merged, even if both are merge
    /// candidates.
    pub max_merge_distance: f64,
    /// Target weight for a particle; `w / w_target(p)` is the ratio that
    /// decides whether `p` is a merge or split candidate.
    pub w_target: &'a dyn Fn(&Particle) -> f64,
}

impl Engine {
    /// Runs `merge_and_split_range` over the whole live array.
    pub fn merge_and_split<Idx: NearestNeighborIndex>(&mut self, params: &MergeSplitParams, merge_fn: MergeFn, split_fn: SplitFn) {
        let n = self.parts.len();
        self.merge_and_split_range::<Idx>(0, n, params, merge_fn, split_fn);
    }

    /// Rebalances weights within the contiguous slot range `[i0, i1)`.
    ///
    /// Disjoint ranges touch disjoint slots (merges only ever write within
    /// `[i0, i1)` and recycle freed slots from the same range before
    /// appending), so concurrent callers with non-overlapping ranges don't
    /// step on each other; the trailing `clean_up` is the one step that
    /// isn't range-scoped and must run after every caller's range has been
    /// processed.
    pub fn merge_and_split_range<Idx: NearestNeighborIndex>(
        &mut self,
        i0: usize,
        i1: usize,
        params: &MergeSplitParams,
        merge_fn: MergeFn,
        split_fn: SplitFn,
    ) {
        assert!(i0 <= i1 && i1 <= self.parts.len(), "merge_and_split_range: invalid range [{i0}, {i1})");

        let ratios: Vec<(usize, f64)> = (i0..i1)
            .filter(|&i| self.parts[i].is_alive())
            .map(|i| {
                let p = &self.parts[i];
                (i, p.w / (params.w_target)(p))
            })
            .collect();

        let mut merge_candidates: Vec<usize> = ratios.iter().filter(|&&(_, r)| r <= SMALL).map(|&(i, _)| i).collect();
        let mut split_candidates: Vec<(usize, f64)> = ratios.iter().filter(|&&(_, r)| r >= LARGE).map(|&(i, r)| (i, r)).collect();

        let mut free_ixs: Vec<usize> = Vec::new();
        let mut merged_away: HashSet<usize> = HashSet::new();

        if merge_candidates.len() > 1 {
            // Ascending by ratio: the lightest-relative-to-target particles
            // look for a merge partner first.
            merge_candidates.sort_by(|&a, &b| {
                let ra = self.parts[a].w / (params.w_target)(&self.parts[a]);
                let rb = self.parts[b].w / (params.w_target)(&self.parts[b]);
                ra.partial_cmp(&rb).unwrap()
            });

            let coords: Vec<MergeCoord> = merge_candidates.iter().map(|&i| self.merge_coord(i, params)).collect();
            let index = Idx::build(&coords);

            for (local_i, &global_i) in merge_candidates.iter().enumerate() {
                if merged_away.contains(&global_i) {
                    continue;
                }
                let Some(local_j) = index.nearest_excluding(coords[local_i], local_i) else {
                    continue;
                };
                let global_j = merge_candidates[local_j];
                if merged_away.contains(&global_j) {
                    continue;
                }

                let dist = squared_distance(coords[local_i], coords[local_j]).sqrt();
                if dist > params.max_merge_distance {
                    continue;
                }

                let pa = self.parts[global_i];
                let pb = self.parts[global_j];
                let merged = merge_fn(&pa, &pb, &mut self.rng);
                self.parts[global_i] = merged;
                self.remove_part(global_j);

                merged_away.insert(global_i);
                merged_away.insert(global_j);
                free_ixs.push(global_j);
            }
        }

        // Descending by ratio: the most overweight particles split first.
        split_candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        for (i, r) in split_candidates {
            let p = self.parts[i];
            let (new_a, new_b) = split_fn(&p, r, &mut self.rng);
            self.parts[i] = new_a;

            if let Some(slot) = free_ixs.pop() {
                self.parts[slot] = new_b;
            } else {
                assert!(self.check_space(1), "particle array exhausted during split: capacity {} reached", self.capacity);
                self.parts.push(new_b);
            }
        }

        self.clean_up();
    }

    /// Builds the merge/split coordinate point for the particle at `idx`
    /// per `params.x_mask`/`v_fac`/`use_v_norm`.
    fn merge_coord(&self, idx: usize, params: &MergeSplitParams) -> MergeCoord {
        let p = &self.parts[idx];
        let x = p.x.to_array();
        let mut coord: MergeCoord = [0.0; 6];
        for axis in 0..3 {
            if params.x_mask[axis] {
                coord[axis] = x[axis];
            }
        }
        if params.use_v_norm {
            coord[3] = params.v_fac * p.speed();
        } else {
            let v = p.v.to_array();
            coord[3] = params.v_fac * v[0];
            coord[4] = params.v_fac * v[1];
            coord[5] = params.v_fac * v[2];
        }
        coord
    }
}

fn squared_distance(a: MergeCoord, b: MergeCoord) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Default [`MergeFn`]: weighted random selection of one particle's
/// kinematics (probability `w_a / (w_a + w_b)` for `a`), with the new
/// weight set to the exact sum so total weight is conserved up to
/// floating-point error regardless of which side is kept.
pub fn merge_part_rxv(a: &Particle, b: &Particle, rng: &mut StdRng) -> Particle {
    let w_total = a.w + b.w;
    let keep_a = rng.random_bool(a.w / w_total);
    let mut merged = if keep_a { *a } else { *b };
    merged.w = w_total;
    merged
}

/// Default [`SplitFn`]: halves the weight and duplicates the particle
/// verbatim otherwise, so the pair's combined weight exactly matches the
/// original's.
pub fn split_half(p: &Particle, _ratio: f64, _rng: &mut StdRng) -> (Particle, Particle) {
    let mut half = *p;
    half.w = p.w * 0.5;
    (half, half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionKind;
    use crate::config::{CrossSectionTable, EngineConfig};
    use crate::mover::MoverKind;
    use crate::spatial::KdTreeIndex;
    use crate::vector::Vec3;
    use rand::SeedableRng;

    fn engine_with_capacity(capacity: usize) -> Engine {
        let xs = CrossSectionTable {
            kind: CollisionKind::Elastic,
            en_loss_ev: 0.0,
            rel_mass: 1.0,
            energies_ev: vec![0.0, 100.0],
            sigma_m2: vec![0.0, 0.0],
            is_event: false,
        };
        let config = EngineConfig {
            mass: 9.11e-31,
            cross_sections: vec![xs],
            densities_m3: vec![0.0],
            table_size: 8,
            e_max_ev: 50.0,
            capacity,
            rng_seed: Some(1),
            mover: MoverKind::Verlet,
            dt_max: 1e-6,
        };
        Engine::initialize(&config)
    }

    fn unmasked_params(w_target: &dyn Fn(&Particle) -> f64) -> MergeSplitParams<'_> {
        MergeSplitParams {
            x_mask: [false, false, false],
            v_fac: 1.0,
            use_v_norm: false,
            max_merge_distance: f64::INFINITY,
            w_target,
        }
    }

    #[test]
    fn merging_reduces_count_and_conserves_total_weight() {
        let mut engine = engine_with_capacity(16);
        for i in 0..8 {
            engine.add(Vec3::zero(), Vec3::new(i as f64 * 1e-3, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0);
        }
        let total_w_before: f64 = engine.iter_alive().map(|p| p.w).sum();

        let w_target = |_p: &Particle| 4.0;
        let params = unmasked_params(&w_target);
        engine.merge_and_split::<KdTreeIndex>(&params, merge_part_rxv, split_half);

        assert!(engine.iter_alive().count() < 8);
        let total_w_after: f64 = engine.iter_alive().map(|p| p.w).sum();
        assert!((total_w_after - total_w_before).abs() < 1e-9);
    }

    #[test]
    fn splitting_increases_count_and_conserves_total_weight() {
        let mut engine = engine_with_capacity(16);
        engine.add(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), 8.0, 0.0, 0);
        let total_w_before: f64 = engine.iter_alive().map(|p| p.w).sum();

        let w_target = |_p: &Particle| 1.0;
        let params = unmasked_params(&w_target);
        engine.merge_and_split::<KdTreeIndex>(&params, merge_part_rxv, split_half);

        assert_eq!(engine.iter_alive().count(), 2);
        let total_w_after: f64 = engine.iter_alive().map(|p| p.w).sum();
        assert!((total_w_after - total_w_before).abs() < 1e-9);
    }

    #[test]
    fn merge_part_rxv_conserves_weight_and_keeps_one_sides_kinematics() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let a = Particle::new(Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), Vec3::zero(), 3.0, 0.0, 1, 0);
        let b = Particle::new(Vec3::new(2.0, 0.0, 0.0), Vec3::zero(), Vec3::zero(), 1.0, 0.0, 2, 0);
        for _ in 0..50 {
            let merged = merge_part_rxv(&a, &b, &mut rng);
            assert_eq!(merged.w, 4.0);
            assert!(merged.x == a.x || merged.x == b.x);
        }
    }

    #[test]
    fn split_half_conserves_weight() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let p = Particle::new(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), 6.0, 0.0, 0, 0);
        let (a, b) = split_half(&p, 3.0, &mut rng);
        assert_eq!(a.w + b.w, 6.0);
    }

    #[test]
    fn max_merge_distance_blocks_a_too_far_pair() {
        let mut engine = engine_with_capacity(8);
        engine.add(Vec3::zero(), Vec3::new(0.0, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0);
        engine.add(Vec3::zero(), Vec3::new(1.0e9, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0);

        let w_target = |_p: &Particle| 4.0;
        let params = MergeSplitParams {
            x_mask: [false, false, false],
            v_fac: 1.0,
            use_v_norm: false,
            max_merge_distance: 1.0,
            w_target: &w_target,
        };
        engine.merge_and_split::<KdTreeIndex>(&params, merge_part_rxv, split_half);
        assert_eq!(engine.iter_alive().count(), 2);
    }
}
