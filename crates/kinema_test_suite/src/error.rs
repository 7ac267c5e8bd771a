//! Scenario runner errors

use std::time::Duration;

use kinema_animation::AnimationError;
use kinema_core::PropMismatch;
use kinema_layout::LayoutError;
use thiserror::Error;

/// Errors raised by [`TestContext`](crate::harness::TestContext) operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HarnessError {
    /// No mounted element carries this test id
    #[error("Unable to find an element with test id '{test_id}'")]
    NotFound { test_id: String },

    /// A snapshot differs from the expected style
    #[error("Snapshot of '{test_id}' does not match:{}", fmt_mismatches(.mismatches))]
    SnapshotMismatch {
        test_id: String,
        mismatches: Vec<PropMismatch>,
    },

    /// Neither the element nor any ancestor handles the event
    #[error("No {event} handler on '{test_id}' or its ancestors")]
    NoHandler { test_id: String, event: String },

    #[error("No component is mounted")]
    NotMounted,

    #[error("A component is already mounted")]
    AlreadyMounted,

    /// A single clock advance longer than the harness allows
    #[error("Cannot advance the clock by {requested:?}; the limit per advance is {max:?}")]
    AdvanceTooLong { requested: Duration, max: Duration },

    /// Scenario file could not be run as written
    #[error("Scenario error: {0}")]
    Scenario(String),

    /// One or more soft expectations failed
    #[error("{} expectation(s) failed:{}", .0.len(), fmt_failures(.0))]
    Expectations(Vec<HarnessError>),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Animation(#[from] AnimationError),
}

fn fmt_mismatches(mismatches: &[PropMismatch]) -> String {
    mismatches.iter().map(|m| format!("\n  {m}")).collect()
}

fn fmt_failures(failures: &[HarnessError]) -> String {
    failures.iter().map(|e| format!("\n- {e}")).collect()
}

/// Result type for scenario runner operations
pub type Result<T> = std::result::Result<T, HarnessError>;
