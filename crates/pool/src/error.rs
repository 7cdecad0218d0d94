//! Error types for pool operations
use thiserror::Error;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a [`Factory`](crate::Factory).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The pool operation that ran into the capacity bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Handing an instance out to a caller.
    Acquire,
    /// Taking an instance back into the free list.
    Release,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acquire => write!(f, "acquire"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// Error type for pool construction, acquisition and release
#[derive(Error, Debug)]
pub enum Error {
    /// Pool configuration is invalid
    #[error("Configuration error: {message}")]
    Configuration {
        /// The error message
        message: String,
    },

    /// The operation would push the pool past its `max_size`
    #[error(
        "Pool '{pool}' cannot {operation}: {current}/{max_size} instances already tracked"
    )]
    CapacityExceeded {
        /// The pool name
        pool: String,
        /// Which operation was rejected
        operation: Operation,
        /// Instances counted against the bound when the call was rejected
        current: usize,
        /// Configured maximum
        max_size: usize,
    },

    /// The caller broke the acquire/release contract
    #[error("Contract violation in pool '{pool}': {reason}")]
    ContractViolation {
        /// The pool name
        pool: String,
        /// What the caller did wrong
        reason: String,
    },

    /// The factory failed to build a new instance
    #[error("Failed to create an instance for pool '{pool}'")]
    Creation {
        /// The pool name
        pool: String,
        /// The factory error
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a capacity error for `operation`
    pub fn capacity_exceeded(
        pool: impl Into<String>,
        operation: Operation,
        current: usize,
        max_size: usize,
    ) -> Self {
        Self::CapacityExceeded {
            pool: pool.into(),
            operation,
            current,
            max_size,
        }
    }

    /// Create a contract violation error
    pub fn contract_violation(pool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            pool: pool.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a factory failure
    pub fn creation(pool: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Creation {
            pool: pool.into(),
            source: source.into(),
        }
    }

    /// Whether this error comes from the capacity bound.
    ///
    /// Growth below `max_size` never produces an error, so this is the only
    /// signal a caller needs to decide whether to wait, drop or resize.
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }

    /// Get the pool name associated with this error (if any)
    #[must_use]
    pub fn pool_name(&self) -> Option<&str> {
        match self {
            Self::Configuration { .. } => None,
            Self::CapacityExceeded { pool, .. }
            | Self::ContractViolation { pool, .. }
            | Self::Creation { pool, .. } => Some(pool),
        }
    }
}
