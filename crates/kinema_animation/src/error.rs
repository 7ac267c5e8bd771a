//! Animation error types

use thiserror::Error;

/// Errors raised by descriptors and the scheduler
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Descriptor cannot be played (non-finite target, zero-length repeat, ...)
    #[error("Invalid animation descriptor: {0}")]
    InvalidDescriptor(String),

    /// A full drain was requested while work that never finishes is pending
    #[error(
        "Cannot run all timers: {infinite_values} infinitely repeating animation(s) and \
         {frame_callbacks} active frame callback(s) never finish; advance by a bounded duration instead"
    )]
    UnboundedDrain {
        infinite_values: usize,
        frame_callbacks: usize,
    },

    /// The scheduler that owns a shared value has been dropped
    #[error("Animation scheduler has been dropped")]
    SchedulerDropped,

    /// A shared value was read or written with its own accessors from
    /// inside a derived style, where the reactive graph is already borrowed
    #[error(
        "Shared value {0} accessed with get/set inside an animated style; \
         read it through the style scope instead"
    )]
    InsideDerived(u64),

    /// The shared value's slot no longer exists
    #[error("Shared value {0} no longer exists")]
    ValueNotFound(u64),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
