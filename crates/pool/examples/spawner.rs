//! Spawner demo
//!
//! Drives a pool the way a game loop would: every tick a few projectiles are
//! fired, each lives for a fixed number of ticks and then releases itself
//! through its handle.
//!
//! Run with `RUST_LOG=debug cargo run -p respawn-pool --example spawner`.

use std::sync::atomic::{AtomicU32, Ordering};

use respawn_pool::{Pool, PoolConfig, Poolable, Pooled};
use tracing_subscriber::EnvFilter;

/// Where a projectile appears.
#[derive(Debug, Clone, Copy, Default)]
struct Muzzle {
    position: [f32; 3],
    heading: f32,
}

#[derive(Debug)]
struct Projectile {
    serial: u32,
    muzzle: Option<Muzzle>,
    ticks_left: u32,
    visible: bool,
}

impl Poolable for Projectile {
    type Placement = Muzzle;

    fn place(&mut self, placement: Muzzle) {
        tracing::debug!(
            serial = self.serial,
            x = placement.position[0],
            z = placement.position[2],
            heading = placement.heading,
            "projectile placed"
        );
        self.muzzle = Some(placement);
    }

    fn on_acquired(&mut self) {
        self.ticks_left = 3;
        tracing::info!(serial = self.serial, "projectile fired");
    }

    fn on_released(&mut self) {
        tracing::info!(serial = self.serial, "projectile expired");
    }

    fn detach(&mut self) {
        self.muzzle = None;
    }

    fn set_active(&mut self, active: bool) {
        self.visible = active;
    }
}

const POOL_CONFIG: &str = r#"{ "initial_size": 4, "max_size": 8 }"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config: PoolConfig = serde_json::from_str(POOL_CONFIG)?;

    let serial = AtomicU32::new(0);
    let pool = Pool::builder("projectiles", move || {
        Projectile {
            serial: serial.fetch_add(1, Ordering::Relaxed) + 1,
            muzzle: None,
            ticks_left: 0,
            visible: false,
        }
    })
    .config(config)
    .on_create(|p: &Projectile| tracing::info!(serial = p.serial, "created new projectile"))
    .on_acquire(|p: &Projectile| tracing::debug!(serial = p.serial, "get from pool"))
    .on_release(|p: &Projectile| tracing::debug!(serial = p.serial, "release to pool"))
    .on_initialized(|| tracing::info!("pool initialized"))
    .build()?;

    let mut live: Vec<Pooled<Projectile>> = Vec::new();
    for tick in 0..10u8 {
        for shot in 0..3u8 {
            let muzzle = Muzzle {
                position: [f32::from(tick), 0.0, f32::from(shot)],
                heading: f32::from(shot) * 15.0,
            };
            match pool.acquire_with(muzzle) {
                Ok(projectile) => live.push(projectile),
                Err(err) if err.is_capacity() => {
                    tracing::warn!(tick, %err, "magazine empty, skipping shot");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let mut still_flying = Vec::with_capacity(live.len());
        for mut projectile in live.drain(..) {
            projectile.ticks_left -= 1;
            tracing::trace!(
                serial = projectile.serial,
                visible = projectile.visible,
                muzzle = ?projectile.muzzle,
                ticks_left = projectile.ticks_left,
                "projectile moved"
            );
            if projectile.ticks_left == 0 {
                projectile.release()?;
            } else {
                still_flying.push(projectile);
            }
        }
        live = still_flying;

        let stats = pool.stats();
        tracing::info!(
            tick,
            in_use = stats.in_use,
            free = stats.free,
            created = stats.created,
            "tick done"
        );
    }

    drop(live);
    let stats = pool.stats();
    println!(
        "created {} projectiles for {} shots (reuse rate {:.0}%)",
        stats.created,
        stats.acquisitions,
        stats.reuse_rate() * 100.0
    );
    Ok(())
}
