//! Nearest-neighbor lookup used by particle merge/split rebalancing.
//!
//! The k-d tree itself is an external collaborator: this module only
//! defines the narrow [`NearestNeighborIndex`] seam the merge/split pass
//! needs and a real implementation backed by `kiddo`. Internals of the
//! tree (node layout, bucket size, splitting heuristic) are entirely
//! `kiddo`'s concern.

use kiddo::{ImmutableKdTree, SquaredEuclidean};

/// A merge/split query point: up to 3 masked position axes followed by
/// either 3 scaled velocity components or a single scaled speed padded
/// with zeros, per `merge_and_split`'s `x_mask`/`v_fac`/`use_v_norm`
/// parameters (see [`crate::engine::merge_split`]). Unused axes are zeroed
/// identically for every point, so they never perturb a nearest-neighbor
/// ranking — they just add a constant offset to every squared distance.
pub type MergeCoord = [f64; 6];

/// A point index lookup that can answer "which other live particle is
/// closest to this one in merge/split coordinate space" — the query
/// merge/split uses to find a partner for a low-weight particle.
pub trait NearestNeighborIndex {
    /// Builds an index over `points`, where the position in the slice is
    /// the id a query result refers back to.
    fn build(points: &[MergeCoord]) -> Self
    where
        Self: Sized;

    /// Finds the closest point to `query` other than `exclude` itself.
    /// Returns `None` if the index has fewer than two points.
    fn nearest_excluding(&self, query: MergeCoord, exclude: usize) -> Option<usize>;
}

/// `kiddo`-backed [`NearestNeighborIndex`].
pub struct KdTreeIndex {
    tree: ImmutableKdTree<f64, 6>,
    len: usize,
}

impl NearestNeighborIndex for KdTreeIndex {
    fn build(points: &[MergeCoord]) -> Self {
        KdTreeIndex { tree: ImmutableKdTree::new_from_slice(points), len: points.len() }
    }

    fn nearest_excluding(&self, query: MergeCoord, exclude: usize) -> Option<usize> {
        if self.len < 2 {
            return None;
        }
        // Ask for the two closest and skip `exclude`; a query point that is
        // itself a member of the index is always its own nearest neighbor.
        let hits = self.tree.nearest_n::<SquaredEuclidean>(&query, 2);
        hits.into_iter().map(|n| n.item as usize).find(|&idx| idx != exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(x: f64, y: f64, z: f64) -> MergeCoord {
        [x, y, z, 0.0, 0.0, 0.0]
    }

    #[test]
    fn finds_nearest_excluding_self() {
        let points = vec![pad(0.0, 0.0, 0.0), pad(1.0, 0.0, 0.0), pad(5.0, 0.0, 0.0)];
        let index = KdTreeIndex::build(&points);
        let nearest = index.nearest_excluding(points[0], 0);
        assert_eq!(nearest, Some(1));
    }

    #[test]
    fn single_point_index_has_no_neighbor() {
        let points = vec![pad(0.0, 0.0, 0.0)];
        let index = KdTreeIndex::build(&points);
        assert_eq!(index.nearest_excluding(points[0], 0), None);
    }
}
