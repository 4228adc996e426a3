use pic_mcc::collision::CollisionKind;
use pic_mcc::config::{CrossSectionTable, EngineConfig};
use pic_mcc::engine::Engine;
use pic_mcc::mover::MoverKind;
use pic_mcc::vector::Vec3;

/// Builds a tiny engine, runs it for a handful of steps, persists its
/// collision table to a pair of files, then reloads it to show the round
/// trip.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig {
        mass: 9.109_383_7e-31,
        cross_sections: vec![CrossSectionTable {
            kind: CollisionKind::Elastic,
            en_loss_ev: 0.0,
            rel_mass: 1.0 / 1836.0,
            energies_ev: vec![0.0, 100.0],
            sigma_m2: vec![1e-20, 1e-20],
            is_event: false,
        }],
        densities_m3: vec![1e20],
        table_size: 32,
        e_max_ev: 100.0,
        capacity: 16,
        rng_seed: Some(42),
        mover: MoverKind::Verlet,
        dt_max: 1e-9,
    };
    let mut engine = Engine::initialize(&config);
    for i in 0..8 {
        engine.add(Vec3::zero(), Vec3::new(1.0e5 + i as f64 * 1e3, 0.0, 0.0), Vec3::zero(), 1.0, 0.0, 0);
    }

    for _ in 0..100 {
        engine.advance(1e-9, &|_p| Vec3::zero(), &|_p| 0);
        engine.clean_up();
    }
    println!("before snapshot: {} live particles, mean energy {:.6e} J", engine.n_sim_part(), engine.get_mean_energy());

    let path = std::env::temp_dir().join("pic_mcc_io_demo.bin");
    engine.to_file(&path)?;
    println!("wrote collision table to {}.params / {}.ratetable", path.display(), path.display());

    // Live particles aren't part of the persisted format, so the restored
    // engine starts empty; mover/dt_max/seed are caller-supplied the same
    // way they would be to `Engine::initialize`.
    let restored = Engine::init_from_file(&path, MoverKind::Verlet, 1e-9, Some(7))?;
    println!("restored: {} live particles, {} collision channels", restored.n_sim_part(), restored.rate_table().descriptors().len());

    Ok(())
}
