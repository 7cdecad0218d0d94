//! Ordering of pool callbacks and instance hooks.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use common::{Drone, DroneFactory, EventLog, Spot};
use pretty_assertions::assert_eq;
use respawn_pool::Pool;

fn observed_pool(log: &EventLog, initial_size: usize, max_size: usize) -> Pool<Drone> {
    let (c, a, r, i) = (log.clone(), log.clone(), log.clone(), log.clone());
    Pool::builder("drones", DroneFactory::new(log))
        .initial_size(initial_size)
        .max_size(max_size)
        .on_create(move |p: &Drone| c.push(format!("pool:create:{}", p.id)))
        .on_acquire(move |p: &Drone| a.push(format!("pool:acquire:{}", p.id)))
        .on_release(move |p: &Drone| r.push(format!("pool:release:{}", p.id)))
        .on_initialized(move || i.push("pool:initialized"))
        .build()
        .unwrap()
}

#[test]
fn pool_callbacks_run_before_instance_hooks() {
    let log = EventLog::default();
    let pool = observed_pool(&log, 1, 2);

    let drone = pool.acquire().unwrap();
    drone.release().unwrap();

    assert_eq!(
        log.events(),
        vec![
            "pool:create:0",
            "pool:initialized",
            "pool:acquire:0",
            "instance:acquired:0",
            "instance:activated:0",
            "pool:release:0",
            "instance:released:0",
            "instance:deactivated:0:false",
        ]
    );
}

#[test]
fn growth_runs_create_before_acquire() {
    let log = EventLog::default();
    let pool = observed_pool(&log, 0, 1);

    let _drone = pool.acquire().unwrap();

    assert_eq!(
        log.events(),
        vec![
            "pool:initialized",
            "pool:create:0",
            "pool:acquire:0",
            "instance:acquired:0",
            "instance:activated:0",
        ]
    );
}

#[test]
fn on_create_fires_once_per_instance() {
    let log = EventLog::default();
    let pool = observed_pool(&log, 1, 3);

    for _ in 0..5 {
        let drone = pool.acquire().unwrap();
        drone.release().unwrap();
    }

    assert_eq!(log.count("pool:create"), 1);
    assert_eq!(log.count("pool:acquire"), 5);
    assert_eq!(log.count("pool:release"), 5);
    assert_eq!(log.count("instance:acquired"), 5);
    assert_eq!(log.count("instance:released"), 5);
}

#[test]
fn on_initialized_fires_once_after_initial_instances() {
    let log = EventLog::default();
    let factory = DroneFactory::new(&log);
    let created = Arc::clone(&factory.created);
    let seen_at_init = Arc::new(AtomicU32::new(u32::MAX));
    let calls = Arc::new(AtomicU32::new(0));

    let (seen, count) = (Arc::clone(&seen_at_init), Arc::clone(&calls));
    let pool = Pool::builder("drones", factory)
        .initial_size(4)
        .max_size(8)
        .on_initialized(move || {
            seen.store(created.load(Ordering::SeqCst), Ordering::SeqCst);
            count.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    assert_eq!(seen_at_init.load(Ordering::SeqCst), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let _drone = pool.acquire().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn placement_is_applied_then_detached() {
    let log = EventLog::default();
    let pool = observed_pool(&log, 1, 1);
    let spot = Spot {
        position: [1.0, 2.0, 3.0],
        parent: Some(7),
    };

    let drone = pool.acquire_with(spot).unwrap();
    assert_eq!(drone.spot, Some(spot));
    assert!(drone.active);
    drone.release().unwrap();

    // Detached before it was deactivated.
    assert_eq!(log.count("instance:deactivated:0:false"), 1);

    let drone = pool.acquire().unwrap();
    assert_eq!(drone.spot, Some(Spot::default()));
}

#[test]
fn callbacks_may_reenter_the_pool() {
    let log = EventLog::default();
    let slot: Arc<parking_lot::Mutex<Option<Pool<Drone>>>> = Arc::default();
    let seen = Arc::new(AtomicU32::new(0));

    let (pool_ref, seen_c) = (Arc::clone(&slot), Arc::clone(&seen));
    let pool = Pool::builder("drones", DroneFactory::new(&log))
        .initial_size(0)
        .max_size(2)
        .on_acquire(move |_: &Drone| {
            if let Some(pool) = pool_ref.lock().as_ref() {
                seen_c.store(pool.in_use() as u32, Ordering::SeqCst);
            }
        })
        .build()
        .unwrap();
    *slot.lock() = Some(pool.clone());

    let _drone = pool.acquire().unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    // Break the reference cycle so the pool can drop.
    slot.lock().take();
}
