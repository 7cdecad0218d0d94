//! Object pool that recycles instances built by a [`Factory`].
//!
//! `Pool<T>` keeps a FIFO free list and a count of instances currently
//! handed out. The capacity check and the slot it reserves happen under one
//! lock; the factory, the pool callbacks and the [`Poolable`] hooks all run
//! after the lock is released.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::callbacks::Callbacks;
use crate::config::PoolConfig;
use crate::error::{Error, Operation, Result};
use crate::factory::Factory;
use crate::poolable::Poolable;
use crate::pooled::Pooled;

// ---------------------------------------------------------------------------
// PoolStats
// ---------------------------------------------------------------------------

/// Pool statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances ever built by the factory.
    pub created: u64,
    /// Instances destroyed by the pool: rejected releases, [`Pool::clear`],
    /// pool teardown, and in-flight instances dropped after a hook panicked.
    pub destroyed: u64,
    /// Successful acquisitions.
    pub acquisitions: u64,
    /// Acquisitions served from the free list.
    pub reused: u64,
    /// Successful releases into the free list.
    pub releases: u64,
    /// Acquire or release calls rejected at capacity.
    pub rejections: u64,
    /// Instances currently handed out.
    pub in_use: usize,
    /// Instances currently in the free list.
    pub free: usize,
}

impl PoolStats {
    /// Share of acquisitions served without building a new instance (0.0 to 1.0).
    pub fn reuse_rate(&self) -> f64 {
        if self.acquisitions == 0 {
            0.0
        } else {
            self.reused as f64 / self.acquisitions as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Pool internals
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Counters {
    created: u64,
    destroyed: u64,
    acquisitions: u64,
    reused: u64,
    releases: u64,
    rejections: u64,
}

struct State<T> {
    free: VecDeque<T>,
    /// Instances owned by callers, plus slots reserved by calls in flight.
    in_use: usize,
    counters: Counters,
}

impl<T> State<T> {
    fn tracked(&self) -> usize {
        self.free.len() + self.in_use
    }
}

/// Inner shared state for the pool.
struct Shared<T: Poolable> {
    name: String,
    max_size: usize,
    factory: Box<dyn Factory<T>>,
    callbacks: Callbacks<T>,
    state: Mutex<State<T>>,
}

impl<T: Poolable> Shared<T> {
    /// Build one instance and run `on_create`. The caller owns the slot.
    fn create(&self) -> Result<T> {
        let instance = self.factory.create().map_err(|source| {
            tracing::warn!(pool = %self.name, error = %source, "Factory failed to create instance");
            Error::creation(&self.name, source)
        })?;
        self.state.lock().counters.created += 1;
        tracing::debug!(pool = %self.name, "Instance created");
        self.callbacks.created(&instance);
        Ok(instance)
    }

    /// Move an instance into the free list.
    ///
    /// `tracked` instances already hold an in-use slot; untracked ones need a
    /// free slot under `max_size`.
    fn checkin(&self, mut instance: T, tracked: bool) -> Result<()> {
        {
            let mut state = self.state.lock();
            let current = if tracked {
                state.free.len()
            } else {
                state.tracked()
            };
            if current >= self.max_size {
                state.counters.rejections += 1;
                state.counters.destroyed += 1;
                if tracked {
                    state.in_use = state.in_use.saturating_sub(1);
                }
                drop(state);
                tracing::warn!(
                    pool = %self.name,
                    current,
                    max_size = self.max_size,
                    "Release rejected, pool at capacity"
                );
                self.factory.destroy(instance);
                return Err(Error::capacity_exceeded(
                    &self.name,
                    Operation::Release,
                    current,
                    self.max_size,
                ));
            }
            if !tracked {
                state.in_use += 1;
            }
        }

        let reservation = Reservation::holding(self);
        self.callbacks.released(&instance);
        instance.on_released();
        instance.detach();
        instance.set_active(false);
        reservation.disarm();

        let (free, in_use) = {
            let mut state = self.state.lock();
            state.free.push_back(instance);
            state.in_use = state.in_use.saturating_sub(1);
            state.counters.releases += 1;
            (state.free.len(), state.in_use)
        };
        tracing::debug!(pool = %self.name, free, in_use, "Instance released");
        Ok(())
    }
}

impl<T: Poolable> Drop for Shared<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        let free = std::mem::take(&mut state.free);
        let count = free.len();
        state.counters.destroyed += count as u64;
        for instance in free {
            self.factory.destroy(instance);
        }
        tracing::debug!(pool = %self.name, destroyed = count, "Pool dropped");
    }
}

/// An in-use slot held while hooks run.
///
/// Dropping it armed (a failed factory call or a panicking hook) gives the
/// slot back so the instance never stays half-transitioned. If an instance
/// was in flight it is dropped with the unwinding frame and counted as
/// destroyed.
struct Reservation<'a, T: Poolable> {
    shared: &'a Shared<T>,
    armed: bool,
    holding: bool,
}

impl<'a, T: Poolable> Reservation<'a, T> {
    fn new(shared: &'a Shared<T>) -> Self {
        Self {
            shared,
            armed: true,
            holding: false,
        }
    }

    fn holding(shared: &'a Shared<T>) -> Self {
        Self {
            holding: true,
            ..Self::new(shared)
        }
    }

    fn hold(&mut self) {
        self.holding = true;
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T: Poolable> Drop for Reservation<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.shared.state.lock();
            state.in_use = state.in_use.saturating_sub(1);
            if self.holding {
                state.counters.destroyed += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pool<T>
// ---------------------------------------------------------------------------

/// Generic object pool.
///
/// Cloning a `Pool` is cheap and yields another handle to the same free
/// list.
pub struct Pool<T: Poolable> {
    shared: Arc<Shared<T>>,
}

impl<T: Poolable> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Poolable> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.shared.name)
            .field("max_size", &self.shared.max_size)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<T: Poolable> Pool<T> {
    /// Start building a pool named `name` around `factory`.
    pub fn builder(name: impl Into<String>, factory: impl Factory<T>) -> PoolBuilder<T> {
        PoolBuilder {
            name: name.into(),
            factory: Box::new(factory),
            config: PoolConfig::default(),
            callbacks: Callbacks::default(),
            on_initialized: None,
        }
    }

    /// Create a pool without callbacks.
    ///
    /// # Errors
    /// Returns error if `config` is invalid or the factory fails while
    /// building the initial instances.
    pub fn new(name: impl Into<String>, factory: impl Factory<T>, config: PoolConfig) -> Result<Self> {
        Self::builder(name, factory).config(config).build()
    }

    /// The pool name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Maximum number of instances tracked (free + in use).
    pub fn max_size(&self) -> usize {
        self.shared.max_size
    }

    /// Instances waiting in the free list.
    pub fn free_len(&self) -> usize {
        self.shared.state.lock().free.len()
    }

    /// Instances currently handed out.
    pub fn in_use(&self) -> usize {
        self.shared.state.lock().in_use
    }

    /// Instances tracked in either state.
    pub fn len(&self) -> usize {
        self.shared.state.lock().tracked()
    }

    /// Whether the pool tracks no instances at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.state.lock();
        let c = &state.counters;
        PoolStats {
            created: c.created,
            destroyed: c.destroyed,
            acquisitions: c.acquisitions,
            reused: c.reused,
            releases: c.releases,
            rejections: c.rejections,
            in_use: state.in_use,
            free: state.free.len(),
        }
    }

    /// Acquire an instance with the default placement.
    pub fn acquire(&self) -> Result<Pooled<T>>
    where
        T::Placement: Default,
    {
        self.acquire_with(T::Placement::default())
    }

    /// Acquire an instance and apply `placement` to it.
    ///
    /// Reuses the oldest free instance, or builds a new one while the pool
    /// tracks fewer than `max_size` instances.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] when the free list is empty and the pool is
    /// full (the factory is not called), [`Error::Creation`] when the factory
    /// fails.
    pub fn acquire_with(&self, placement: T::Placement) -> Result<Pooled<T>> {
        let shared = &*self.shared;

        let reused = {
            let mut state = shared.state.lock();
            if let Some(instance) = state.free.pop_front() {
                state.in_use += 1;
                Some(instance)
            } else if state.tracked() < shared.max_size {
                state.in_use += 1;
                None
            } else {
                state.counters.rejections += 1;
                let current = state.tracked();
                drop(state);
                tracing::warn!(
                    pool = %shared.name,
                    current,
                    max_size = shared.max_size,
                    "Acquire rejected, pool at capacity"
                );
                return Err(Error::capacity_exceeded(
                    &shared.name,
                    Operation::Acquire,
                    current,
                    shared.max_size,
                ));
            }
        };

        let mut reservation = Reservation::new(shared);
        let was_reused = reused.is_some();
        let mut instance = match reused {
            Some(instance) => instance,
            None => shared.create()?,
        };
        reservation.hold();

        instance.place(placement);
        shared.callbacks.acquired(&instance);
        instance.on_acquired();
        instance.set_active(true);
        reservation.disarm();

        let (free, in_use) = {
            let mut state = shared.state.lock();
            state.counters.acquisitions += 1;
            if was_reused {
                state.counters.reused += 1;
            }
            (state.free.len(), state.in_use)
        };
        tracing::debug!(pool = %shared.name, free, in_use, reused = was_reused, "Instance acquired");

        Ok(Pooled::new(instance, self.clone()))
    }

    /// Return an instance to the free list.
    ///
    /// # Errors
    /// [`Error::ContractViolation`] when `pooled` was issued by another pool;
    /// the handle then goes back to its own pool as it drops.
    /// [`Error::CapacityExceeded`] when the free list already holds
    /// `max_size` instances; the instance is destroyed and its slot freed.
    pub fn release(&self, mut pooled: Pooled<T>) -> Result<()> {
        if !self.same_pool(pooled.pool()) {
            let owner = pooled.pool().name().to_owned();
            tracing::warn!(pool = %self.shared.name, owner = %owner, "Release of a foreign instance");
            return Err(Error::contract_violation(
                &self.shared.name,
                format!("instance was issued by pool '{owner}'"),
            ));
        }
        let instance = pooled.take();
        self.shared.checkin(instance, true)
    }

    /// Take ownership of an instance the pool does not track, such as one
    /// taken out with [`Pooled::detach`], and put it in the free list.
    ///
    /// Runs the same callbacks and hooks as [`release`](Self::release).
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] when the pool already tracks `max_size`
    /// instances. The instance is handed to [`Factory::destroy`].
    pub fn adopt(&self, instance: T) -> Result<()> {
        self.shared.checkin(instance, false)
    }

    /// Destroy every free instance through the factory.
    ///
    /// Instances currently in use are untouched. Returns how many were
    /// destroyed.
    pub fn clear(&self) -> usize {
        let drained: Vec<T> = self.shared.state.lock().free.drain(..).collect();
        let count = drained.len();
        for instance in drained {
            self.shared.factory.destroy(instance);
        }
        if count > 0 {
            self.shared.state.lock().counters.destroyed += count as u64;
        }
        tracing::debug!(pool = %self.shared.name, destroyed = count, "Free list cleared");
        count
    }

    pub(crate) fn checkin(&self, instance: T) -> Result<()> {
        self.shared.checkin(instance, true)
    }

    /// Destroy an in-use instance without running any release hook.
    pub(crate) fn discard(&self, instance: T) {
        {
            let mut state = self.shared.state.lock();
            state.in_use = state.in_use.saturating_sub(1);
            state.counters.destroyed += 1;
        }
        tracing::warn!(pool = %self.shared.name, "Instance dropped during a panic, destroying it");
        self.shared.factory.destroy(instance);
    }

    /// Stop tracking one in-use instance.
    pub(crate) fn forget(&self) {
        let in_use = {
            let mut state = self.shared.state.lock();
            state.in_use = state.in_use.saturating_sub(1);
            state.in_use
        };
        tracing::debug!(pool = %self.shared.name, in_use, "Instance detached");
    }

    fn same_pool(&self, other: &Pool<T>) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

// ---------------------------------------------------------------------------
// PoolBuilder<T>
// ---------------------------------------------------------------------------

/// Builder for [`Pool`]. Created by [`Pool::builder`].
pub struct PoolBuilder<T: Poolable> {
    name: String,
    factory: Box<dyn Factory<T>>,
    config: PoolConfig,
    callbacks: Callbacks<T>,
    on_initialized: Option<Box<dyn FnOnce() + Send>>,
}

impl<T: Poolable> PoolBuilder<T> {
    /// Replace the sizing configuration.
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of instances built eagerly.
    pub fn initial_size(mut self, initial_size: usize) -> Self {
        self.config.initial_size = initial_size;
        self
    }

    /// Maximum number of tracked instances.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.config.max_size = max_size;
        self
    }

    /// Called once per instance, right after the factory builds it.
    pub fn on_create(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.callbacks.on_create = Some(Box::new(f));
        self
    }

    /// Called on every acquire, before [`Poolable::on_acquired`].
    pub fn on_acquire(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.callbacks.on_acquire = Some(Box::new(f));
        self
    }

    /// Called on every release, before [`Poolable::on_released`].
    pub fn on_release(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.callbacks.on_release = Some(Box::new(f));
        self
    }

    /// Called once, after the initial instances are built.
    pub fn on_initialized(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_initialized = Some(Box::new(f));
        self
    }

    /// Validate the configuration, build the initial instances and return
    /// the pool.
    ///
    /// # Errors
    /// [`Error::Configuration`] for invalid sizing, [`Error::Creation`] if
    /// the factory fails. Instances built before a factory failure are
    /// destroyed.
    pub fn build(self) -> Result<Pool<T>> {
        self.config.validate()?;
        let PoolConfig {
            initial_size,
            max_size,
        } = self.config;

        let shared = Shared {
            name: self.name,
            max_size,
            factory: self.factory,
            callbacks: self.callbacks,
            state: Mutex::new(State {
                free: VecDeque::with_capacity(initial_size),
                in_use: 0,
                counters: Counters::default(),
            }),
        };

        for _ in 0..initial_size {
            let instance = shared.create()?;
            shared.state.lock().free.push_back(instance);
        }

        if let Some(f) = self.on_initialized {
            f();
        }
        tracing::info!(pool = %shared.name, initial_size, max_size, "Pool initialized");

        Ok(Pool {
            shared: Arc::new(shared),
        })
    }
}

impl<T: Poolable> std::fmt::Debug for PoolBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("callbacks", &self.callbacks)
            .field("on_initialized", &self.on_initialized.is_some())
            .finish_non_exhaustive()
    }
}
