//! Per-particle substep driver: the inner loop that advances one particle
//! through a wall-clock interval `dt`, capped to `dt_max` per substep, and
//! checks for a domain exit or a null-collision candidate after each
//! substep.
//!
//! This is the one piece of the engine genuinely shared between the serial
//! and parallel advance paths — both call [`move_and_collide_one`] per
//! particle, the only difference being whether the caller drives it from a
//! single thread or a `rayon` worker with its own RNG.

use rand::Rng;

use crate::collision::kernels::{apply_attach, apply_elastic, apply_excite, apply_ionize};
use crate::collision::{CollisionKind, RateTable};
use crate::event::Event;
use crate::mover::{boris_step, verlet_correct_accel, verlet_step, MoverKind};
use crate::particle::Particle;
use crate::vector::Vec3;

/// Caps `requested` at `dt_max`, matching the per-step contract: no single
/// mover call is ever allowed to exceed the mover's stability bound.
pub fn limit_advance_dt(requested: f64, dt_max: f64) -> f64 {
    requested.min(dt_max)
}

/// A secondary particle produced by an ionization event during this
/// particle's flight, queued for the caller to insert via `Engine::add`.
///
/// Its `t_left` already holds the remaining time within the current
/// substep (inherited from the parent at the moment of the event), so the
/// caller can run it back through [`move_and_collide_one`] before the
/// substep ends, exactly like any other live particle.
pub struct Spawned {
    pub particle: Particle,
}

/// Advances `p` for its current `p.t_left`, substepping at `dt_max`,
/// sampling one null-collision candidate per substep, and checking for a
/// domain exit after every substep.
///
/// The caller sets `p.t_left` to the interval to advance through before
/// calling; this function drives the loop off that field and leaves it at
/// `0.0` (or whatever a collision kernel copied onto a spawned secondary)
/// when it returns. `accel` and `outside_check` are the caller's field
/// solver and domain geometry. On an attachment or domain exit the
/// particle is marked dead and the loop stops early. Ionization events
/// push a [`Spawned`] secondary into `spawned`, inheriting `p`'s leftover
/// `t_left` so the caller can finish advancing it within the same
/// substep; the caller is responsible for giving it a slot and a fresh id.
#[allow(clippy::too_many_arguments)]
pub fn move_and_collide_one(
    p: &mut Particle,
    dt_max: f64,
    mover: &MoverKind,
    rate_table: &RateTable,
    accel: &dyn Fn(&Particle) -> Vec3,
    outside_check: &dyn Fn(&Particle) -> i32,
    rng: &mut impl Rng,
    events: &mut Vec<Event>,
    spawned: &mut Vec<Spawned>,
) {
    while p.t_left > 0.0 && p.is_alive() {
        let step = limit_advance_dt(p.t_left, dt_max);

        match mover {
            MoverKind::Verlet => {
                verlet_step(p, step);
                let new_a = accel(p);
                verlet_correct_accel(p, new_a, step);
            }
            MoverKind::Boris { b_field, charge_to_mass } => {
                let e_accel = accel(p);
                boris_step(p, step, e_accel, *b_field, *charge_to_mass);
            }
        }

        let reason = outside_check(p);
        if reason > 0 {
            events.push(Event::went_outside(*p, reason));
            p.mark_dead();
            return;
        }

        if rate_table.inv_max_rate() == 0.0 {
            continue;
        }
        let u1: f64 = rng.random_range(f64::EPSILON..1.0);
        let tau = crate::collision::sampler::sample_coll_time(u1, rate_table.inv_max_rate());
        if tau > step {
            continue;
        }

        let u2: f64 = rng.random();
        let Some(idx) = crate::collision::sampler::get_coll_index(p.speed(), u2, rate_table) else {
            continue;
        };
        let desc = rate_table.descriptors()[idx];

        // Snapshot before the kernel mutates `p` (or marks it dead, for
        // attachment): the event records the incident state that picked
        // this channel, not the outgoing state the kernel produces.
        if desc.is_event {
            events.push(Event::collision(*p, idx, desc.kind));
        }

        match desc.kind {
            CollisionKind::Elastic => apply_elastic(p, &desc, rng),
            CollisionKind::Excite => apply_excite(p, &desc, rng),
            CollisionKind::Ionize => {
                // Secondary id assignment is deferred to the caller, which
                // owns `next_id` bookkeeping; 0 is a placeholder overwritten
                // on insertion.
                let secondary = apply_ionize(p, &desc, 0, rng);
                spawned.push(Spawned { particle: secondary });
            }
            CollisionKind::Attach => apply_attach(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionDescriptor;
    use crate::collision::rate_table::ChannelInput;
    use crate::config::CrossSectionTable;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn limit_advance_dt_caps_at_dt_max() {
        assert_eq!(limit_advance_dt(5.0, 1.0), 1.0);
        assert_eq!(limit_advance_dt(0.5, 1.0), 0.5);
    }

    #[test]
    fn went_outside_event_snapshots_particle_while_still_alive() {
        let mut p = Particle::new(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), 1.0, 1.0, 0, 0);
        let xs = CrossSectionTable {
            kind: CollisionKind::Elastic,
            en_loss_ev: 0.0,
            rel_mass: 1.0,
            energies_ev: vec![0.0, 100.0],
            sigma_m2: vec![0.0, 0.0],
            is_event: false,
        };
        let channel = ChannelInput {
            descriptor: CollisionDescriptor::new(CollisionKind::Elastic, 0.0, 1.0, 1.0, false),
            density_m3: 0.0,
            cross_section: &xs,
        };
        let rate_table = RateTable::build(&[channel], 1.0, 10.0, 4);
        let mover = MoverKind::Verlet;
        let mut rng = StdRng::seed_from_u64(1);
        let mut events = Vec::new();
        let mut spawned = Vec::new();
        move_and_collide_one(
            &mut p,
            1.0,
            &mover,
            &rate_table,
            &|_p| Vec3::zero(),
            &|p| if p.x.x > 0.5 { 1 } else { 0 },
            &mut rng,
            &mut events,
            &mut spawned,
        );
        assert_eq!(events.len(), 1);
        assert!(events[0].particle.w > 0.0, "went_outside snapshot must capture the particle while still alive");
    }

    #[test]
    fn attach_event_snapshots_particle_before_the_kernel_marks_it_dead() {
        let mut p = Particle::new(Vec3::zero(), Vec3::new(1.0e6, 0.0, 0.0), Vec3::zero(), 1.0, 1e-3, 0, 0);
        let xs = CrossSectionTable {
            kind: CollisionKind::Attach,
            en_loss_ev: 0.0,
            rel_mass: 1.0,
            energies_ev: vec![0.0, 1.0e6],
            sigma_m2: vec![1.0, 1.0],
            is_event: true,
        };
        let channel = ChannelInput {
            descriptor: CollisionDescriptor::new(CollisionKind::Attach, 0.0, 9.11e-31, 1.0, true),
            density_m3: 1e30,
            cross_section: &xs,
        };
        let rate_table = RateTable::build(&[channel], 9.11e-31, 1.0e6, 8);
        let mover = MoverKind::Verlet;
        let mut rng = StdRng::seed_from_u64(2);
        let mut events = Vec::new();
        let mut spawned = Vec::new();
        move_and_collide_one(&mut p, 1e-3, &mover, &rate_table, &|_p| Vec3::zero(), &|_p| 0, &mut rng, &mut events, &mut spawned);
        assert!(events.iter().any(|e| matches!(e.kind, crate::event::EventKind::Collision(CollisionKind::Attach))));
        for e in &events {
            assert!(e.particle.w > 0.0, "collision snapshot must capture the particle before the kernel mutates it");
        }
    }
}
