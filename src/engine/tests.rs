//! End-to-end engine behavior: the scenarios a caller actually depends on
//! the whole `advance` pipeline doing right, as opposed to the
//! unit-scoped tests living alongside each submodule.

use crate::collision::CollisionKind;
use crate::config::{CrossSectionTable, EngineConfig};
use crate::engine::Engine;
use crate::mover::MoverKind;
use crate::vector::Vec3;

fn single_channel_engine(kind: CollisionKind, en_loss_ev: f64, capacity: usize) -> Engine {
    let xs = CrossSectionTable {
        kind,
        en_loss_ev,
        rel_mass: 1.0,
        energies_ev: vec![0.0, 1.0e6],
        sigma_m2: vec![1.0, 1.0],
        is_event: true,
    };
    let config = EngineConfig {
        mass: 9.11e-31,
        cross_sections: vec![xs],
        densities_m3: vec![1e30],
        table_size: 8,
        e_max_ev: 1.0e6,
        capacity,
        rng_seed: Some(1),
        mover: MoverKind::Verlet,
        dt_max: 1e-3,
    };
    Engine::initialize(&config)
}

#[test]
fn advancing_an_empty_engine_is_a_no_op() {
    let mut engine = single_channel_engine(CollisionKind::Elastic, 0.0, 4);
    engine.advance(1.0, &|_p| Vec3::zero(), &|_p| 0);
    assert_eq!(engine.n_sim_part(), 0);
    assert_eq!(engine.events().n_stored(), 0);
}

#[test]
fn ballistic_flight_with_no_collisions_and_no_field_is_a_straight_line() {
    let config = EngineConfig {
        mass: 1.0,
        cross_sections: vec![CrossSectionTable {
            kind: CollisionKind::Elastic,
            en_loss_ev: 0.0,
            rel_mass: 1.0,
            energies_ev: vec![0.0, 100.0],
            sigma_m2: vec![0.0, 0.0],
            is_event: false,
        }],
        densities_m3: vec![0.0],
        table_size: 4,
        e_max_ev: 10.0,
        capacity: 2,
        rng_seed: Some(5),
        mover: MoverKind::Verlet,
        dt_max: 0.1,
    };
    let mut engine = Engine::initialize(&config);
    engine.add(Vec3::zero(), Vec3::new(2.0, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0);
    engine.advance(3.0, &|_p| Vec3::zero(), &|_p| 0);
    let p = engine.parts()[0];
    assert!((p.x.x - 6.0).abs() < 1e-9);
    assert_eq!(p.v.x, 2.0);
}

#[test]
fn ionization_channel_increases_simulated_particle_count() {
    let mut engine = single_channel_engine(CollisionKind::Ionize, 15.8, 8);
    engine.add(Vec3::zero(), Vec3::new(1.0e6, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0);
    let before = engine.n_sim_part();
    engine.advance(1e-3, &|_p| Vec3::zero(), &|_p| 0);
    assert!(engine.n_sim_part() > before);
    assert!(engine.events().n_stored() >= 1);
}

#[test]
fn attachment_channel_empties_the_engine() {
    let mut engine = single_channel_engine(CollisionKind::Attach, 0.0, 8);
    engine.add(Vec3::zero(), Vec3::new(1.0e6, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0);
    engine.advance(1e-3, &|_p| Vec3::zero(), &|_p| 0);
    engine.clean_up();
    assert_eq!(engine.n_sim_part(), 0);
}

#[test]
fn leaving_the_domain_produces_a_went_outside_event() {
    let config = EngineConfig {
        mass: 1.0,
        cross_sections: vec![CrossSectionTable {
            kind: CollisionKind::Elastic,
            en_loss_ev: 0.0,
            rel_mass: 1.0,
            energies_ev: vec![0.0, 100.0],
            sigma_m2: vec![0.0, 0.0],
            is_event: false,
        }],
        densities_m3: vec![0.0],
        table_size: 4,
        e_max_ev: 10.0,
        capacity: 2,
        rng_seed: Some(5),
        mover: MoverKind::Verlet,
        dt_max: 0.1,
    };
    let mut engine = Engine::initialize(&config);
    engine.add(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0);
    engine.advance(10.0, &|_p| Vec3::zero(), &|p| if p.x.x > 5.0 { 3 } else { 0 });
    // advance's trailing clean_up already compacted the dead particle away.
    assert_eq!(engine.n_sim_part(), 0);

    let events = engine.events().as_slice();
    assert_eq!(events.len(), 1);
    assert!(events[0].particle.w > 0.0, "logged snapshot must predate the dead-marking, per the particle liveness invariant");
    match events[0].kind {
        crate::event::EventKind::WentOutside { reason } => assert_eq!(reason, 3),
        _ => panic!("expected a WentOutside event"),
    }
}

#[test]
#[should_panic]
fn initialize_rejects_empty_cross_section_list() {
    let config = EngineConfig {
        mass: 1.0,
        cross_sections: vec![],
        densities_m3: vec![],
        table_size: 4,
        e_max_ev: 10.0,
        capacity: 2,
        rng_seed: Some(1),
        mover: MoverKind::Verlet,
        dt_max: 0.1,
    };
    Engine::initialize(&config);
}
