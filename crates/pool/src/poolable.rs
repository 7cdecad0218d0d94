//! The capability trait for pooled instances.

/// An instance type a [`Pool`](crate::Pool) can manage.
///
/// Every hook has a no-op default, so a type opts into exactly the hooks it
/// needs. The pool calls them in this order:
///
/// - acquire: [`place`](Self::place), pool `on_acquire` callback,
///   [`on_acquired`](Self::on_acquired), `set_active(true)`
/// - release: pool `on_release` callback, [`on_released`](Self::on_released),
///   [`detach`](Self::detach), `set_active(false)`
///
/// Hooks run outside the pool's lock.
pub trait Poolable: Send + 'static {
    /// Data applied at acquisition (position, parent, context). The pool
    /// forwards it without looking at it.
    type Placement;

    /// Apply the placement passed to `acquire_with`.
    fn place(&mut self, placement: Self::Placement) {
        let _ = placement;
    }

    /// Called after the pool-level `on_acquire` callback.
    fn on_acquired(&mut self) {}

    /// Called after the pool-level `on_release` callback.
    fn on_released(&mut self) {}

    /// Drop whatever context the caller attached while the instance was in use.
    fn detach(&mut self) {}

    /// Toggle the instance's visible/active state.
    fn set_active(&mut self, active: bool) {
        let _ = active;
    }
}
