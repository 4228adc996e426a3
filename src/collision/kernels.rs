//! Collision kernels: the velocity (and, for ionization, particle-count)
//! update applied once [`crate::collision::sampler::get_coll_index`] has
//! picked a channel.
//!
//! Every kernel takes the incident particle's *speed* and a fresh isotropic
//! direction drawn via [`isotropic_unit_vector`] rather than assuming any
//! particular scattering-angle distribution — this matches the common
//! simplified MCC treatment where elastic, excitation, and ionization
//! products are all scattered isotropically in the lab frame and only
//! their outgoing *speed* differs.

use rand::Rng;
use rand_distr::UnitSphere;

use crate::collision::CollisionDescriptor;
use crate::particle::Particle;
use crate::vector::Vec3;

/// Draws a uniformly distributed unit vector via `rand_distr`'s
/// `UnitSphere` distribution (Marsaglia's disk method under the hood).
pub fn isotropic_unit_vector(rng: &mut impl Rng) -> Vec3 {
    let [x, y, z]: [f64; 3] = rng.sample(UnitSphere);
    Vec3::new(x, y, z)
}

/// Elastic scatter: moves to the center-of-mass frame (background velocity
/// taken as zero — a hook for a thermal background lives here), rotates the
/// relative velocity isotropically preserving its magnitude, then
/// transforms back. Leaves weight and position untouched.
pub fn apply_elastic(p: &mut Particle, desc: &CollisionDescriptor, rng: &mut impl Rng) {
    let bg_v = Vec3::zero();
    let com_v = (p.v * desc.rel_mass + bg_v) / (1.0 + desc.rel_mass);
    let rel = p.v - com_v;
    let rel_speed = rel.norm();
    p.v = isotropic_unit_vector(rng) * rel_speed + com_v;
}

/// Excitation: deposits `desc.en_loss` (joules) into the background and
/// redirects the particle isotropically with the remaining kinetic energy.
/// Energy loss is clamped so the outgoing speed never goes negative.
///
/// # Examples
/// ```
/// # use pic_mcc::collision::{CollisionDescriptor, CollisionKind};
/// # use pic_mcc::collision::kernels::apply_excite;
/// # use pic_mcc::particle::Particle;
/// # use pic_mcc::vector::Vec3;
/// # use rand::{SeedableRng, rngs::StdRng};
/// let mut rng = StdRng::seed_from_u64(0);
/// let mut p = Particle::new(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0, 0);
/// // An energy loss larger than the incident kinetic energy clamps to rest.
/// let desc = CollisionDescriptor::new(CollisionKind::Excite, 1e10, 9.11e-31, 1.0, true);
/// apply_excite(&mut p, &desc, &mut rng);
/// assert_eq!(p.speed(), 0.0);
/// ```
pub fn apply_excite(p: &mut Particle, desc: &CollisionDescriptor, rng: &mut impl Rng) {
    let ke = p.kinetic_energy(desc.part_mass);
    let remaining = (ke - desc.en_loss).max(0.0);
    let new_speed = (2.0 * remaining / desc.part_mass).sqrt();
    p.v = isotropic_unit_vector(rng) * new_speed;
}

/// Ionization: deposits `desc.en_loss` (the ionization threshold) and
/// splits the remaining kinetic energy evenly between the incident
/// particle and a newly created secondary, both scattered isotropically.
/// The secondary is a full copy of the incident particle (same weight,
/// position, id lineage left to the caller) except for its fresh velocity.
///
/// Returns the secondary particle; the caller is responsible for finding
/// it a slot via `Engine::add`.
pub fn apply_ionize(p: &mut Particle, desc: &CollisionDescriptor, secondary_id: i64, rng: &mut impl Rng) -> Particle {
    let ke = p.kinetic_energy(desc.part_mass);
    let remaining = (ke - desc.en_loss).max(0.0);
    let each = remaining * 0.5;
    let new_speed = (2.0 * each / desc.part_mass).sqrt();

    let mut secondary = *p;
    secondary.id = secondary_id;
    secondary.v = isotropic_unit_vector(rng) * new_speed;
    p.v = isotropic_unit_vector(rng) * new_speed;
    secondary
}

/// Attachment: the incident particle is absorbed by the background and
/// marked dead. Removal from the engine's live array is handled by the
/// caller via the deferred clean list, not here.
pub fn apply_attach(p: &mut Particle) {
    p.mark_dead();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn descriptor(kind: CollisionKind, en_loss: f64, rel_mass: f64) -> CollisionDescriptor {
        CollisionDescriptor::new(kind, en_loss, 9.11e-31, rel_mass, true)
    }

    #[test]
    fn isotropic_vectors_are_unit_length() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let v = isotropic_unit_vector(&mut rng);
            assert!((v.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn elastic_reduces_speed_and_preserves_weight() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Particle::new(Vec3::zero(), Vec3::new(1000.0, 0.0, 0.0), Vec3::zero(), 2.5, 0.0, 0, 0);
        let w_before = p.w;
        let desc = descriptor(CollisionKind::Elastic, 0.0, 1.0 / 1836.0);
        apply_elastic(&mut p, &desc, &mut rng);
        assert!(p.speed() < 1000.0);
        assert_eq!(p.w, w_before);
    }

    #[test]
    fn excite_never_goes_below_zero_energy() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut p = Particle::new(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0, 0);
        let desc = descriptor(CollisionKind::Excite, 1e10, 1.0);
        apply_excite(&mut p, &desc, &mut rng);
        assert_eq!(p.speed(), 0.0);
    }

    #[test]
    fn ionize_splits_energy_and_returns_live_secondary() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = Particle::new(Vec3::zero(), Vec3::new(1.0e6, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0, 0);
        let desc = descriptor(CollisionKind::Ionize, 15.8 * 1.602_176_634e-19, 1.0);
        let secondary = apply_ionize(&mut p, &desc, 99, &mut rng);
        assert!(p.is_alive());
        assert!(secondary.is_alive());
        assert_eq!(secondary.id, 99);
        assert_eq!(secondary.w, p.w);
    }

    #[test]
    fn attach_marks_particle_dead() {
        let mut p = Particle::new(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0, 0);
        apply_attach(&mut p);
        assert!(!p.is_alive());
    }
}
