//! # Respawn Pool
//!
//! Object reuse pool. A [`Pool`] recycles instances built by a [`Factory`]
//! instead of creating and destroying them on every use, and refuses to
//! track more than `max_size` instances.
//!
//! ```
//! use respawn_pool::{Pool, Poolable};
//!
//! struct Bullet {
//!     active: bool,
//! }
//!
//! impl Poolable for Bullet {
//!     type Placement = ();
//!
//!     fn set_active(&mut self, active: bool) {
//!         self.active = active;
//!     }
//! }
//!
//! let pool: Pool<Bullet> = Pool::builder("bullets", || Bullet { active: false })
//!     .initial_size(2)
//!     .max_size(3)
//!     .build()?;
//!
//! let bullet = pool.acquire()?;
//! assert!(bullet.active);
//! assert_eq!(pool.free_len(), 1);
//!
//! bullet.release()?;
//! assert_eq!(pool.free_len(), 2);
//! # Ok::<(), respawn_pool::Error>(())
//! ```

#![warn(missing_docs)]

mod callbacks;
pub mod config;
pub mod error;
pub mod factory;
pub mod pool;
pub mod poolable;
pub mod pooled;

pub use config::PoolConfig;
pub use error::{BoxError, Error, Operation, Result};
pub use factory::{Factory, try_from_fn};
pub use pool::{Pool, PoolBuilder, PoolStats};
pub use poolable::Poolable;
pub use pooled::Pooled;
