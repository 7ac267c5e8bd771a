//! Layout error types

use thiserror::Error;

/// Errors raised while building a render tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Two elements in one tree share a test id
    #[error("Duplicate test id '{0}'")]
    DuplicateTestId(String),

    /// Animated bindings were attached to an element that cannot animate
    #[error("{kind} element{} cannot take {what}; use an animated view", fmt_test_id(.test_id))]
    NotAnimatable {
        kind: &'static str,
        test_id: Option<String>,
        what: &'static str,
    },
}

fn fmt_test_id(test_id: &Option<String>) -> String {
    match test_id {
        Some(id) => format!(" '{id}'"),
        None => String::new(),
    }
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
