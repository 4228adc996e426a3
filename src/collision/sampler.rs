//! Draws collision wait times and channel indices from a built
//! [`RateTable`].
//!
//! Two independent uniform draws are needed per collision event: one picks
//! *when* the next null-collision candidate occurs (a Poisson process at
//! the table's shared `max_rate`), the other picks *which* channel (if
//! any) actually fires once the candidate time arrives. Keeping these as
//! free functions over explicit inputs, rather than methods that also grab
//! an RNG, keeps the sampler deterministic and easy to test without
//! depending on `rand`'s trait machinery.

use crate::collision::RateTable;

/// Samples the time to the next null-collision candidate given a uniform
/// draw `u` in `(0, 1]` and the table's `1/max_rate`.
///
/// `tau = -ln(u) / max_rate`. Returns `f64::INFINITY` when the table has no
/// rate at all (`inv_max_rate == 0.0`), meaning no channel can ever fire.
pub fn sample_coll_time(u: f64, inv_max_rate: f64) -> f64 {
    debug_assert!(u > 0.0 && u <= 1.0, "uniform draw must be in (0, 1], got {u}");
    if inv_max_rate == 0.0 {
        return f64::INFINITY;
    }
    -u.ln() * inv_max_rate
}

/// Given the particle's speed `v` at the candidate time and a second
/// uniform draw `u` in `[0, 1)`, finds which channel (if any) fires.
///
/// Returns `Some(index)` into the table's channel list for a real hit, or
/// `None` for the null channel (the draw landed past every channel's
/// cumulative rate, i.e. in `(row_total, max_rate]`). Ties resolve to the
/// first channel whose cumulative rate is not less than the scaled draw,
/// matching `cumulative_rates_at`'s ascending order.
pub fn get_coll_index(v: f64, u: f64, table: &RateTable) -> Option<usize> {
    debug_assert!((0.0..1.0).contains(&u), "uniform draw must be in [0, 1), got {u}");
    let target = u * table.max_rate();
    let row = table.cumulative_rates_at(v);
    row.iter().position(|&cum| target < cum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionDescriptor, CollisionKind};
    use crate::collision::rate_table::ChannelInput;
    use crate::config::CrossSectionTable;

    fn two_channel_table() -> RateTable {
        let xs_a = CrossSectionTable {
            kind: CollisionKind::Elastic,
            en_loss_ev: 0.0,
            rel_mass: 1.0,
            energies_ev: vec![0.0, 1000.0],
            sigma_m2: vec![1e-20, 1e-20],
            is_event: false,
        };
        let xs_b = CrossSectionTable {
            kind: CollisionKind::Ionize,
            en_loss_ev: 15.8,
            rel_mass: 1.0,
            energies_ev: vec![0.0, 1000.0],
            sigma_m2: vec![1e-21, 1e-21],
            is_event: true,
        };
        let a = ChannelInput {
            descriptor: CollisionDescriptor::new(CollisionKind::Elastic, 0.0, 9.11e-31, 1.0, false),
            density_m3: 1e20,
            cross_section: &xs_a,
        };
        let b = ChannelInput {
            descriptor: CollisionDescriptor::new(CollisionKind::Ionize, 15.8 * 1.602_176_634e-19, 9.11e-31, 1.0, true),
            density_m3: 1e20,
            cross_section: &xs_b,
        };
        RateTable::build(&[a, b], 9.11e-31, 100.0, 32)
    }

    #[test]
    fn sample_coll_time_is_finite_for_nonzero_rate() {
        let table = two_channel_table();
        let tau = sample_coll_time(0.5, table.inv_max_rate());
        assert!(tau.is_finite() && tau > 0.0);
    }

    #[test]
    fn sample_coll_time_is_infinite_for_zero_rate() {
        let tau = sample_coll_time(0.5, 0.0);
        assert!(tau.is_infinite());
    }

    #[test]
    fn get_coll_index_draw_near_zero_hits_first_channel() {
        let table = two_channel_table();
        let v_max = table.cumulative_rates_at(f64::MAX).len(); // sanity: non-empty
        assert!(v_max > 0);
        let idx = get_coll_index(1.0e6, 0.0, &table);
        assert_eq!(idx, Some(0));
    }

    #[test]
    fn get_coll_index_draw_at_one_is_null_channel() {
        let table = two_channel_table();
        let idx = get_coll_index(1.0e6, 1.0 - 1e-12, &table);
        assert_eq!(idx, None);
    }
}
