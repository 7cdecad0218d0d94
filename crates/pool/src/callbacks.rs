//! Pool-level lifecycle observers.

/// Observer invoked with a shared reference to an instance.
pub(crate) type Observer<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Optional observers attached to a pool at construction.
///
/// Each observer receives `&T`, runs outside the pool lock, and cannot
/// reach the free list.
pub(crate) struct Callbacks<T> {
    pub(crate) on_create: Option<Observer<T>>,
    pub(crate) on_acquire: Option<Observer<T>>,
    pub(crate) on_release: Option<Observer<T>>,
}

impl<T> Callbacks<T> {
    pub(crate) fn created(&self, instance: &T) {
        if let Some(f) = &self.on_create {
            f(instance);
        }
    }

    pub(crate) fn acquired(&self, instance: &T) {
        if let Some(f) = &self.on_acquire {
            f(instance);
        }
    }

    pub(crate) fn released(&self, instance: &T) {
        if let Some(f) = &self.on_release {
            f(instance);
        }
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            on_create: None,
            on_acquire: None,
            on_release: None,
        }
    }
}

impl<T> std::fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_create", &self.on_create.is_some())
            .field("on_acquire", &self.on_acquire.is_some())
            .field("on_release", &self.on_release.is_some())
            .finish()
    }
}
