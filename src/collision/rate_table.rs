//! Velocity-indexed cumulative rate table: the core data structure of the
//! null-collision method.
//!
//! Each row corresponds to a uniformly spaced speed `v_i` in `[0, v_max]`.
//! Within a row, column `j` holds the *cumulative* rate
//! `sum_{k<=j} n_k * sigma_k(E(v_i)) * v_i` for channel `k`, so a single
//! uniform draw `u * max_rate` against a row picks at most one channel: the
//! first column whose cumulative value exceeds the draw. Rows beyond the
//! last real channel hold `max_rate` itself, which is what makes "no
//! collision fires" (the null channel) fall out of the same search as a
//! real hit.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::collision::CollisionDescriptor;
use crate::config::CrossSectionTable;
use crate::error::EngineError;

/// Linear interpolation of `ys` over `xs` at `x`, clamped at the ends of
/// the table rather than extrapolated.
fn interpolate_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.is_empty() {
        return 0.0;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    // xs has >= 2 entries here since x strictly exceeds xs[0].
    let i = match xs.binary_search_by(|probe| probe.partial_cmp(&x).unwrap()) {
        Ok(i) => return ys[i],
        Err(i) => i,
    };
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    let frac = (x - x0) / (x1 - x0);
    y0 + frac * (y1 - y0)
}

/// A built rate table for one particle species against its full set of
/// collision channels.
///
/// Built once by [`RateTable::build`] and never mutated afterward; `Engine`
/// holds one per simulated species.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RateTable {
    /// One descriptor per channel, same order as the columns below.
    descriptors: Vec<CollisionDescriptor>,
    /// Number density of the background species for each channel, m^-3.
    densities: Vec<f64>,
    /// Row speeds, uniformly spaced in `[0, v_max]`.
    speeds: Vec<f64>,
    /// Cumulative rate per row: `rows[i][j]` is the sum over channels
    /// `0..=j` at speed `speeds[i]`. `rows[i][last]` is the row's total
    /// rate, used as the null-channel ceiling.
    rows: Vec<Vec<f64>>,
    /// Maximum total rate over all rows; the null-collision ceiling shared
    /// by every row.
    max_rate: f64,
    /// `1 / max_rate`, cached since every substep sampler call divides by
    /// it.
    inv_max_rate: f64,
}

/// One collision channel's static description plus its background density,
/// as fed into [`RateTable::build`].
pub struct ChannelInput<'a> {
    pub descriptor: CollisionDescriptor,
    pub density_m3: f64,
    pub cross_section: &'a CrossSectionTable,
}

impl RateTable {
    /// Builds a rate table from the full set of `(descriptor, density,
    /// cross-section)` triples for one particle species.
    ///
    /// # Arguments
    /// * `channels` - One entry per collision channel, column order preserved
    /// * `mass` - Incident particle's rest mass, kg
    /// * `e_max_ev` - Sets the top row's speed via `v_max = sqrt(2*e_max_ev*EV_TO_J/mass)`
    /// * `table_size` - Row count `N`, at least 2
    ///
    /// # Examples
    /// ```
    /// # use pic_mcc::collision::{CollisionDescriptor, CollisionKind};
    /// # use pic_mcc::collision::rate_table::{ChannelInput, RateTable};
    /// # use pic_mcc::config::CrossSectionTable;
    /// let xs = CrossSectionTable {
    ///     kind: CollisionKind::Elastic,
    ///     en_loss_ev: 0.0,
    ///     rel_mass: 1.0 / 1836.0,
    ///     energies_ev: vec![0.0, 100.0],
    ///     sigma_m2: vec![1e-20, 1e-20],
    ///     is_event: false,
    /// };
    /// let channel = ChannelInput {
    ///     descriptor: CollisionDescriptor::new(CollisionKind::Elastic, 0.0, 9.11e-31, 1.0 / 1836.0, false),
    ///     density_m3: 1e20,
    ///     cross_section: &xs,
    /// };
    /// let table = RateTable::build(&[channel], 9.11e-31, 100.0, 16);
    /// assert_eq!(table.len(), 16);
    /// ```
    pub fn build(channels: &[ChannelInput], mass: f64, e_max_ev: f64, table_size: usize) -> Self {
        assert!(!channels.is_empty(), "rate table requires at least one collision channel");
        assert!(table_size >= 2, "rate table needs at least two rows, got {table_size}");
        assert!(mass > 0.0, "particle mass must be positive, got {mass}");
        assert!(e_max_ev > 0.0, "e_max_ev must be positive, got {e_max_ev}");

        const EV_TO_J: f64 = 1.602_176_634e-19;
        let e_max_j = e_max_ev * EV_TO_J;
        let v_max = (2.0 * e_max_j / mass).sqrt();

        let speeds: Vec<f64> = (0..table_size)
            .map(|i| v_max * (i as f64) / ((table_size - 1) as f64))
            .collect();

        let descriptors: Vec<CollisionDescriptor> = channels.iter().map(|c| c.descriptor).collect();
        let densities: Vec<f64> = channels.iter().map(|c| c.density_m3).collect();

        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(table_size);
        let mut max_rate = 0.0_f64;
        for &v in &speeds {
            let energy_ev = 0.5 * mass * v * v / EV_TO_J;
            let mut cum = 0.0_f64;
            let mut row = Vec::with_capacity(channels.len());
            for c in channels {
                let sigma = interpolate_linear(&c.cross_section.energies_ev, &c.cross_section.sigma_m2, energy_ev);
                cum += c.density_m3 * sigma * v;
                row.push(cum);
            }
            max_rate = max_rate.max(cum);
            rows.push(row);
        }

        let inv_max_rate = if max_rate > 0.0 { max_rate.recip() } else { 0.0 };

        RateTable { descriptors, densities, speeds, rows, max_rate, inv_max_rate }
    }

    /// The channel descriptors, in column order.
    pub fn descriptors(&self) -> &[CollisionDescriptor] {
        &self.descriptors
    }

    /// Background number densities, in column order.
    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    /// The table's shared null-collision ceiling.
    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }

    /// `1 / max_rate`, or `0.0` if every channel has zero rate everywhere.
    pub fn inv_max_rate(&self) -> f64 {
        self.inv_max_rate
    }

    /// The row count `N`.
    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    /// Writes the full velocity-indexed grid (speeds, cumulative rows,
    /// descriptors, densities) to `path` as its own `bincode` stream — the
    /// table-file half of the engine's two-file persisted format, owned by
    /// this module rather than [`crate::engine::persistence`] since the
    /// grid is this struct's private layout.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Loads a table written by [`Self::to_file`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let file = File::open(path)?;
        Ok(bincode::deserialize_from(BufReader::new(file))?)
    }

    /// Linearly interpolates the cumulative-rate row at speed `v`, clamped
    /// to the table's first/last row outside `[0, v_max]`.
    pub fn cumulative_rates_at(&self, v: f64) -> Vec<f64> {
        let n = self.descriptors.len();
        if self.speeds.len() == 1 {
            return self.rows[0].clone();
        }
        let v_max = self.speeds[self.speeds.len() - 1];
        if v <= self.speeds[0] {
            return self.rows[0].clone();
        }
        if v >= v_max {
            return self.rows[self.rows.len() - 1].clone();
        }
        let i = match self.speeds.binary_search_by(|probe| probe.partial_cmp(&v).unwrap()) {
            Ok(i) => return self.rows[i].clone(),
            Err(i) => i,
        };
        let (v0, v1) = (self.speeds[i - 1], self.speeds[i]);
        let frac = (v - v0) / (v1 - v0);
        (0..n)
            .map(|j| self.rows[i - 1][j] + frac * (self.rows[i][j] - self.rows[i - 1][j]))
            .collect()
    }
}
