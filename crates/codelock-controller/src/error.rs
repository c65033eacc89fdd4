use codelock_hardware::HardwareError;
use codelock_storage::StorageError;
use thiserror::Error;

/// Errors raised by the access controller and its event plumbing.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Persistent storage failed or holds an unusable record
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Pin I/O failed
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Domain invariant violated
    #[error(transparent)]
    Core(#[from] codelock_core::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The serialized event loop is no longer accepting events
    #[error("Event loop closed")]
    EventLoopClosed,

    /// The event loop task panicked or was cancelled
    #[error("Event loop task failed: {0}")]
    TaskFailed(String),
}

impl ControllerError {
    /// Whether the dispatcher may log this error and keep polling.
    ///
    /// Storage failures leave the controller in a fail-closed state and are
    /// reported on the diagnostic channel; anything else stops the loop.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Specialized result type for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;
