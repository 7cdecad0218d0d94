//! RAII handle for acquired instances

use crate::error::Result;
use crate::pool::Pool;
use crate::poolable::Poolable;

/// An instance checked out of a [`Pool`].
///
/// The handle keeps a reference to the pool that issued it, so the holder
/// can give the instance back with [`release`](Self::release) without
/// reaching for the pool. Dropping the handle releases it as well; if that
/// release fails the error is logged and the instance destroyed.
///
/// A handle dropped while its thread is already panicking skips the release
/// callbacks and hooks. The instance goes straight to [`Factory::destroy`]
/// and its slot is freed.
///
/// [`Factory::destroy`]: crate::Factory::destroy
pub struct Pooled<T: Poolable> {
    instance: Option<T>,
    pool: Pool<T>,
}

impl<T: Poolable> Pooled<T> {
    pub(crate) fn new(instance: T, pool: Pool<T>) -> Self {
        Self {
            instance: Some(instance),
            pool,
        }
    }

    /// The pool that issued this instance.
    pub fn pool(&self) -> &Pool<T> {
        &self.pool
    }

    /// Return the instance to the pool that issued it.
    pub fn release(self) -> Result<()> {
        let pool = self.pool.clone();
        pool.release(self)
    }

    /// Take the instance out of the pool for good.
    ///
    /// The pool stops counting it against `max_size`; it can come back
    /// through [`Pool::adopt`].
    #[must_use]
    pub fn detach(mut self) -> T {
        let instance = self.take();
        self.pool.forget();
        instance
    }

    pub(crate) fn take(&mut self) -> T {
        self.instance.take().expect("pooled instance used after release")
    }
}

impl<T: Poolable> std::ops::Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.instance
            .as_ref()
            .expect("pooled instance used after release")
    }
}

impl<T: Poolable> std::ops::DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.instance
            .as_mut()
            .expect("pooled instance used after release")
    }
}

impl<T: Poolable> Drop for Pooled<T> {
    fn drop(&mut self) {
        let Some(instance) = self.instance.take() else {
            return;
        };
        if std::thread::panicking() {
            self.pool.discard(instance);
        } else if let Err(error) = self.pool.checkin(instance) {
            tracing::warn!(pool = %self.pool.name(), %error, "Dropped instance was not returned");
        }
    }
}

impl<T: Poolable + std::fmt::Debug> std::fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pooled")
            .field("instance", &self.instance)
            .field("pool", &self.pool.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::error::Error;

    #[derive(Debug, Default)]
    struct Token {
        uses: u32,
    }

    impl Poolable for Token {
        type Placement = ();

        fn on_acquired(&mut self) {
            self.uses += 1;
        }
    }

    fn pool(name: &str, max_size: usize) -> Pool<Token> {
        Pool::new(name, Token::default, PoolConfig::new(0, max_size)).unwrap()
    }

    #[test]
    fn deref_reaches_instance() {
        let pool = pool("tokens", 1);
        let mut token = pool.acquire().unwrap();
        assert_eq!(token.uses, 1);
        token.uses = 10;
        assert_eq!(token.uses, 10);
    }

    #[test]
    fn self_release_returns_to_issuing_pool() {
        let pool = pool("tokens", 1);
        let token = pool.acquire().unwrap();
        token.release().unwrap();
        assert_eq!(pool.free_len(), 1);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn drop_returns_to_pool() {
        let pool = pool("tokens", 1);
        {
            let _token = pool.acquire().unwrap();
            assert_eq!(pool.in_use(), 1);
        }
        assert_eq!(pool.free_len(), 1);
        assert_eq!(pool.acquire().unwrap().uses, 2);
    }

    #[test]
    fn detach_frees_capacity() {
        let pool = pool("tokens", 1);
        let token = pool.acquire().unwrap().detach();
        assert_eq!(pool.len(), 0);

        let _other = pool.acquire().unwrap();
        assert_eq!(token.uses, 1);
    }

    #[test]
    fn foreign_release_is_contract_violation() {
        let ours = pool("ours", 1);
        let theirs = pool("theirs", 1);
        let token = theirs.acquire().unwrap();

        let err = ours.release(token).unwrap_err();
        assert!(matches!(err, Error::ContractViolation { ref pool, .. } if pool == "ours"));
        assert_eq!(ours.free_len(), 0);
        // The rejected handle went home as it dropped.
        assert_eq!(theirs.free_len(), 1);
        assert_eq!(theirs.in_use(), 0);
    }
}
