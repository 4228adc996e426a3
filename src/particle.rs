//! Simulation particle: the fundamental entity the engine advances.
//!
//! A `Particle` is a macro-particle — it stands in for `w` real physical
//! particles sharing the same kinematics. Everything in this module is plain
//! data manipulated by value; the engine is the only thing that owns an
//! array of them.
//!
//! ## Example Usage
//! ```
//! use pic_mcc::particle::Particle;
//! use pic_mcc::vector::Vec3;
//!
//! let mut p = Particle::new(Vec3::zero(), Vec3::new(1.0e5, 0.0, 0.0), Vec3::zero(), 2.0, 0.0, 1, 0);
//! assert!(p.is_alive());
//!
//! p.mark_dead();
//! assert!(!p.is_alive());
//! ```

use crate::vector::Vec3;

/// Weight value used to mark a particle slot as pending removal.
///
/// Any `w <= DEAD` slot must never be read by a physics kernel; it is only
/// valid as a placeholder until `Engine::clean_up` compacts it away. The
/// large negative magnitude makes an accidental live read (e.g. a stale
/// energy sum) obviously wrong rather than silently small.
pub const DEAD: f64 = -1e100;

/// A single simulation (macro-)particle.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Particle {
    /// Position (m).
    pub x: Vec3,
    /// Velocity (m/s).
    pub v: Vec3,
    /// Acceleration (m/s^2), refreshed by the mover's `after_mover` hook.
    pub a: Vec3,
    /// Statistical weight: number of real particles this one represents.
    /// `w <= DEAD` marks the slot as removed.
    pub w: f64,
    /// Remaining time to advance within the current substep.
    pub t_left: f64,
    /// Opaque identifier reserved for the caller.
    pub id: i64,
    /// Opaque particle-type tag reserved for the caller.
    pub ptype: i32,
}

impl Particle {
    /// Creates a new live particle.
    ///
    /// # Arguments
    /// * `x` - Initial position, m
    /// * `v` - Initial velocity, m/s
    /// * `a` - Initial acceleration, m/s^2
    /// * `w` - Statistical weight; must be positive
    /// * `t_left` - Remaining substep time, usually `0.0` at creation
    /// * `id` - Caller-assigned identifier
    /// * `ptype` - Caller-assigned species/type tag
    ///
    /// # Examples
    /// ```
    /// # use pic_mcc::particle::Particle;
    /// # use pic_mcc::vector::Vec3;
    /// let electron = Particle::new(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0, 0);
    /// assert!(electron.is_alive());
    /// assert_eq!(electron.speed(), 1.0);
    /// ```
    pub fn new(x: Vec3, v: Vec3, a: Vec3, w: f64, t_left: f64, id: i64, ptype: i32) -> Self {
        assert!(w > 0.0, "new particle must have positive weight, got {w}");
        Particle { x, v, a, w, t_left, id, ptype }
    }

    /// True when the particle is live (`w > 0`), false once marked dead.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.w > 0.0
    }

    /// Marks the particle dead in place. Idempotent: marking an
    /// already-dead particle again is harmless.
    #[inline]
    pub fn mark_dead(&mut self) {
        self.w = DEAD;
    }

    /// Speed `|v|`.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.v.norm()
    }

    /// Kinetic energy `1/2 * m * |v|^2` for the given particle rest mass.
    ///
    /// # Examples
    /// ```
    /// # use pic_mcc::particle::Particle;
    /// # use pic_mcc::vector::Vec3;
    /// let p = Particle::new(Vec3::zero(), Vec3::new(2.0, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0, 0);
    /// assert_eq!(p.kinetic_energy(2.0), 4.0);
    /// ```
    #[inline]
    pub fn kinetic_energy(&self, mass: f64) -> f64 {
        0.5 * mass * self.v.norm_squared()
    }
}

impl Default for Particle {
    /// A dead, zeroed particle — used to pre-size buffers before the first
    /// write lands in them.
    fn default() -> Self {
        Particle {
            x: Vec3::zero(),
            v: Vec3::zero(),
            a: Vec3::zero(),
            w: DEAD,
            t_left: 0.0,
            id: 0,
            ptype: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_is_alive() {
        let p = Particle::new(Vec3::zero(), Vec3::x_hat(), Vec3::zero(), 1.0, 0.0, 1, 0);
        assert!(p.is_alive());
    }

    #[test]
    fn mark_dead_flips_liveness() {
        let mut p = Particle::new(Vec3::zero(), Vec3::zero(), Vec3::zero(), 1.0, 0.0, 1, 0);
        p.mark_dead();
        assert!(!p.is_alive());
        assert_eq!(p.w, DEAD);
    }

    #[test]
    fn default_particle_is_dead() {
        assert!(!Particle::default().is_alive());
    }

    #[test]
    fn kinetic_energy_matches_half_m_v_squared() {
        let p = Particle::new(Vec3::zero(), Vec3::new(2.0, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0, 0);
        assert_eq!(p.kinetic_energy(2.0), 4.0);
    }

    #[test]
    #[should_panic]
    fn new_rejects_nonpositive_weight() {
        Particle::new(Vec3::zero(), Vec3::zero(), Vec3::zero(), 0.0, 0.0, 0, 0);
    }
}
