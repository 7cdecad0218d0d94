//! Instance factories.
//!
//! A [`Factory`] builds the raw instances a pool hands out and tears them
//! down when the pool lets go of them. Any `Fn() -> T` closure is a factory;
//! [`try_from_fn`] adapts a fallible closure.

use crate::error::BoxError;

/// Capability that constructs and destroys pooled instances.
///
/// The pool owns its factory for its entire lifetime and is the only caller
/// of these methods.
pub trait Factory<T>: Send + Sync + 'static {
    /// Build a new instance.
    fn create(&self) -> Result<T, BoxError>;

    /// Destroy an instance the pool no longer keeps.
    fn destroy(&self, instance: T) {
        drop(instance);
    }
}

impl<T, F> Factory<T> for F
where
    F: Fn() -> T + Send + Sync + 'static,
{
    fn create(&self) -> Result<T, BoxError> {
        Ok(self())
    }
}

/// Factory built from a closure that may fail. See [`try_from_fn`].
pub struct TryFromFn<F>(F);

/// Adapt a fallible closure into a [`Factory`].
pub fn try_from_fn<T, E, F>(f: F) -> TryFromFn<F>
where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    TryFromFn(f)
}

impl<T, E, F> Factory<T> for TryFromFn<F>
where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    fn create(&self) -> Result<T, BoxError> {
        (self.0)().map_err(Into::into)
    }
}

impl<F> std::fmt::Debug for TryFromFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TryFromFn").finish_non_exhaustive()
    }
}
