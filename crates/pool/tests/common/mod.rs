//! Shared fixtures for the pool integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use respawn_pool::{BoxError, Factory, Poolable};

/// Ordered record of lifecycle events, shared by callbacks and instances.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0.lock().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// Where an instance is put when it is acquired.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spot {
    pub position: [f32; 3],
    pub parent: Option<u32>,
}

/// Poolable instance that records its own hooks.
#[derive(Debug)]
pub struct Drone {
    pub id: u32,
    pub active: bool,
    pub spot: Option<Spot>,
    log: EventLog,
}

impl Drone {
    pub fn stray(id: u32, log: &EventLog) -> Self {
        Self {
            id,
            active: true,
            spot: None,
            log: log.clone(),
        }
    }
}

impl Poolable for Drone {
    type Placement = Spot;

    fn place(&mut self, placement: Spot) {
        self.spot = Some(placement);
    }

    fn on_acquired(&mut self) {
        self.log.push(format!("instance:acquired:{}", self.id));
    }

    fn on_released(&mut self) {
        self.log.push(format!("instance:released:{}", self.id));
    }

    fn detach(&mut self) {
        self.spot = None;
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
        if active {
            self.log.push(format!("instance:activated:{}", self.id));
        } else {
            self.log.push(format!(
                "instance:deactivated:{}:{}",
                self.id,
                self.spot.is_some()
            ));
        }
    }
}

/// Factory that numbers drones and counts creations and destructions.
#[derive(Debug, Clone, Default)]
pub struct DroneFactory {
    pub log: EventLog,
    pub created: Arc<AtomicU32>,
    pub destroyed: Arc<AtomicU32>,
}

impl DroneFactory {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            ..Self::default()
        }
    }

    pub fn created(&self) -> u32 {
        self.created.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> u32 {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl Factory<Drone> for DroneFactory {
    fn create(&self) -> Result<Drone, BoxError> {
        let id = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Drone {
            id,
            active: false,
            spot: None,
            log: self.log.clone(),
        })
    }

    fn destroy(&self, instance: Drone) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("factory:destroy:{}", instance.id));
    }
}
