//! Serial and data-parallel particle advance.
//!
//! Both entry points drive every live particle through
//! [`move_and_collide_one`]; `advance_parallel` additionally splits the
//! particle array into per-thread chunks via `rayon::scope` so each worker
//! only ever touches its own disjoint slice and its own RNG from a
//! [`PrngPool`] — no particle-level locking, and no unsafe raw-pointer
//! aliasing to get there.

use crate::engine::move_and_collide::{move_and_collide_one, Spawned};
use crate::engine::Engine;
use crate::event::Event;
use crate::particle::Particle;
use crate::rng::PrngPool;
use crate::vector::Vec3;

impl Engine {
    /// Advances every live particle by `dt` on the calling thread.
    ///
    /// Sets `t_left = dt` on every live particle, runs each through
    /// [`move_and_collide_one`], then drains any ionization secondaries
    /// through the same driver with their inherited `t_left` — so a
    /// secondary born mid-substep still finishes out its flight (and may
    /// itself spawn further secondaries) before this call returns, per the
    /// "newly born particles are advanced within the same substep"
    /// contract. Finishes with `clean_up` so dead slots never linger into
    /// the next `advance` call.
    pub fn advance(&mut self, dt: f64, accel: &dyn Fn(&Particle) -> Vec3, outside_check: &dyn Fn(&Particle) -> i32) {
        assert!(dt >= 0.0, "advance requires dt >= 0, got {dt}");
        let dt_max = self.dt_max;
        let mover = self.mover;
        let mut events: Vec<Event> = Vec::new();
        let mut spawn_queue: Vec<Particle> = Vec::new();

        log::debug!("advance: dt={dt}, dt_max={dt_max}, live={}", self.n_sim_part());

        {
            let rate_table = &self.rate_table;
            for p in self.parts.iter_mut() {
                if !p.is_alive() {
                    continue;
                }
                p.t_left = dt;
                let mut spawned: Vec<Spawned> = Vec::new();
                move_and_collide_one(p, dt_max, &mover, rate_table, accel, outside_check, &mut self.rng, &mut events, &mut spawned);
                spawn_queue.extend(spawned.into_iter().map(|s| s.particle));
            }

            let mut i = 0;
            while i < spawn_queue.len() {
                let mut p = spawn_queue[i];
                let mut more: Vec<Spawned> = Vec::new();
                move_and_collide_one(&mut p, dt_max, &mover, rate_table, accel, outside_check, &mut self.rng, &mut events, &mut more);
                spawn_queue[i] = p;
                spawn_queue.extend(more.into_iter().map(|s| s.particle));
                i += 1;
            }
        }

        log::trace!("advance: {} events, {} secondaries spawned", events.len(), spawn_queue.len());
        self.events.extend(events);
        for p in spawn_queue {
            if p.is_alive() {
                self.commit_one(p);
            }
        }
        self.clean_up();
    }

    /// Advances every live particle by `dt`, fanning the work out across
    /// `n_threads` `rayon` workers.
    ///
    /// Builds a fresh [`PrngPool`] seeded from `self.rng` at the start of
    /// the wave — one draw per thread, in thread order — and writes
    /// thread 0's post-wave state back into `self.rng` before returning.
    /// That keeps the engine's own RNG the single source of truth a
    /// caller's repeated `advance_parallel` calls advance through, the
    /// same way `self.rng` already drives `advance`; only the *order*
    /// results complete in is left to `rayon`'s scheduler, never which
    /// random numbers a given thread consumes.
    pub fn advance_parallel(
        &mut self,
        dt: f64,
        accel: &(dyn Fn(&Particle) -> Vec3 + Sync),
        outside_check: &(dyn Fn(&Particle) -> i32 + Sync),
        n_threads: usize,
    ) {
        assert!(dt >= 0.0, "advance_parallel requires dt >= 0, got {dt}");
        assert!(n_threads > 0, "advance_parallel requires at least one thread");
        let dt_max = self.dt_max;
        let mover = self.mover;

        let mut pool = PrngPool::init_parallel(n_threads, &mut self.rng);

        let rate_table = &self.rate_table;
        let chunk_size = self.parts.len().div_ceil(n_threads).max(1);

        log::debug!("advance_parallel: dt={dt}, dt_max={dt_max}, live={}, threads={n_threads}", self.parts.len());

        let mut thread_events: Vec<Vec<Event>> = (0..n_threads).map(|_| Vec::new()).collect();
        let mut thread_spawned: Vec<Vec<Particle>> = (0..n_threads).map(|_| Vec::new()).collect();
        let rngs = pool.as_mut_slice();

        rayon::scope(|scope| {
            let chunks = self.parts.chunks_mut(chunk_size);
            for (((chunk, rng), events_buf), spawn_queue) in
                chunks.zip(rngs.iter_mut()).zip(thread_events.iter_mut()).zip(thread_spawned.iter_mut())
            {
                scope.spawn(move |_| {
                    for p in chunk.iter_mut() {
                        if !p.is_alive() {
                            continue;
                        }
                        p.t_left = dt;
                        let mut spawned: Vec<Spawned> = Vec::new();
                        move_and_collide_one(p, dt_max, &mover, rate_table, accel, outside_check, rng, events_buf, &mut spawned);
                        spawn_queue.extend(spawned.into_iter().map(|s| s.particle));
                    }

                    // Secondaries spawned by this thread's own particles
                    // finish their remaining t_left here, on the same
                    // thread and RNG that produced them, before the wave
                    // commits — so a thread's reproducibility only ever
                    // depends on its own RNG stream.
                    let mut i = 0;
                    while i < spawn_queue.len() {
                        let mut p = spawn_queue[i];
                        let mut more: Vec<Spawned> = Vec::new();
                        move_and_collide_one(&mut p, dt_max, &mover, rate_table, accel, outside_check, rng, events_buf, &mut more);
                        spawn_queue[i] = p;
                        spawn_queue.extend(more.into_iter().map(|s| s.particle));
                        i += 1;
                    }
                });
            }
        });

        for buf in thread_events {
            self.events.extend(buf);
        }
        for p in thread_spawned.into_iter().flatten() {
            if p.is_alive() {
                self.commit_one(p);
            }
        }
        self.clean_up();

        self.rng = pool.as_mut_slice()[0].clone();
    }

    /// Assigns a fresh id to an ionization secondary produced during this
    /// wave and inserts it. Called serially, after the parallel section,
    /// since `next_id` is a single shared counter.
    fn commit_one(&mut self, mut p: Particle) {
        p.id = self.next_particle_id();
        assert!(
            self.parts.len() < self.capacity,
            "particle array exhausted by ionization: capacity {} reached",
            self.capacity
        );
        self.parts.push(p);
    }
}
