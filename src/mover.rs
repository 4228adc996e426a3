//! Particle movers: Velocity Verlet and Boris integrators.
//!
//! Both share the conceptual contract `mover(engine, particle, dt)` from the
//! spec; here that's split into pure, engine-independent step functions
//! (easy to unit-test in isolation) plus a small [`MoverKind`] tag that
//! [`crate::engine::Engine`] matches on to decide which one to call and how
//! to refresh acceleration between substeps.
//!
//! The mover choice is fixed at configuration time — a closed two-variant
//! enum is the right shape here, not a trait object, since there is no
//! plan to add a third integrator and every call site already knows which
//! one it has.

use crate::particle::Particle;
use crate::vector::Vec3;

/// Which integrator an engine uses to advance ballistic flight.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MoverKind {
    /// Velocity Verlet. Requires `accel` to be set; acceleration is held
    /// constant across a single ballistic flight and refreshed only at
    /// substep boundaries via [`verlet_correct_accel`].
    Verlet,
    /// Boris integrator for motion in a constant magnetic field. Samples
    /// `accel` fresh on every call since there is no between-substep
    /// refresh step for this mover.
    Boris {
        /// Constant magnetic field, tesla.
        b_field: Vec3,
        /// Charge-to-mass ratio of the simulated species, C/kg.
        charge_to_mass: f64,
    },
}

/// Velocity Verlet position/velocity update for one sub-step of length
/// `dt`, using the particle's current `a` (refreshed between substeps, not
/// here).
///
/// `x <- x + v*dt + 1/2*a*dt^2`, `v <- v + a*dt`.
///
/// # Examples
/// ```
/// # use pic_mcc::mover::verlet_step;
/// # use pic_mcc::particle::Particle;
/// # use pic_mcc::vector::Vec3;
/// let mut p = Particle::new(Vec3::zero(), Vec3::zero(), Vec3::new(0.0, -9.8, 0.0), 1.0, 1.0, 0, 0);
/// verlet_step(&mut p, 1.0);
/// assert!((p.x.y - (-4.9)).abs() < 1e-9);
/// ```
pub fn verlet_step(p: &mut Particle, dt: f64) {
    p.x = p.x + p.v * dt + p.a * (0.5 * dt * dt);
    p.v = p.v + p.a * dt;
    p.t_left -= dt;
}

/// The Verlet `after_mover` correction: given the acceleration `new_a`
/// evaluated at the particle's *new* position, applies the trailing half of
/// the velocity update and stores `new_a` as the particle's acceleration
/// for the next flight.
///
/// `v <- v + 1/2*(new_a - a)*dt`, `a <- new_a`.
pub fn verlet_correct_accel(p: &mut Particle, new_a: Vec3, dt: f64) {
    p.v = p.v + (new_a - p.a) * (0.5 * dt);
    p.a = new_a;
}

/// Boris position/velocity update for one sub-step of length `dt`.
///
/// `e_accel` is the electric-field acceleration at the particle's current
/// position (fresh every call, unlike Verlet). Implements the half-kick,
/// t/s rotation, half-kick, half-drift sequence from the spec.
pub fn boris_step(p: &mut Particle, dt: f64, e_accel: Vec3, b_field: Vec3, charge_to_mass: f64) {
    p.a = e_accel;
    let half_dt = 0.5 * dt;

    let v_minus = p.v + e_accel * half_dt;

    let t = b_field * (charge_to_mass * half_dt);
    let s = t * (2.0 / (1.0 + t.norm_squared()));

    let v_prime = v_minus + v_minus.cross(&t);
    let v_plus = v_minus + v_prime.cross(&s);

    let v_new = v_plus + e_accel * half_dt;

    p.x = p.x + v_new * dt;
    p.v = v_new;
    p.t_left -= dt;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verlet_matches_analytic_constant_acceleration() {
        let mut p = Particle::new(Vec3::zero(), Vec3::zero(), Vec3::new(0.0, -9.8, 0.0), 1.0, 1.0, 0, 0);
        verlet_step(&mut p, 1.0);
        assert!((p.x.y - (-4.9)).abs() < 1e-12);
        assert!((p.v.y - (-9.8)).abs() < 1e-12);
    }

    #[test]
    fn verlet_time_reversible_with_zero_accel() {
        let start = Particle::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, -0.25, 0.1), Vec3::zero(), 1.0, 1.0, 0, 0);
        let mut p = start;
        for _ in 0..10 {
            verlet_step(&mut p, 0.1);
        }
        p.v = -p.v;
        for _ in 0..10 {
            verlet_step(&mut p, 0.1);
        }
        assert!(p.x.approx_eq(&start.x, 1e-9));
    }

    #[test]
    fn boris_preserves_speed_in_pure_magnetic_field() {
        let mut p = Particle::new(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), 1.0, 1.0, 0, 0);
        let speed0 = p.speed();
        for _ in 0..1000 {
            boris_step(&mut p, 1e-3, Vec3::zero(), Vec3::z_hat(), 1.0);
        }
        assert!((p.speed() - speed0).abs() < 1e-9);
    }
}
