//! Kinema Scenario Runner
//!
//! Deterministic testing for components whose styles are driven by shared
//! values: mount a component, look up elements by test id, fire presses,
//! advance a virtual clock, and compare style snapshots.
//!
//! # Modules
//!
//! - [`harness`]: the per-scenario [`TestContext`]
//! - [`runner`]: suites of scenarios and result reporting
//! - [`scenario`]: JSON scenario files run against registered components
//! - [`tests`]: built-in suites

pub mod config;
pub mod error;
pub mod harness;
pub mod runner;
pub mod scenario;
pub mod tests;

pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
pub use harness::{
    ClockAdvance, NodeHandle, TestContext, TestHarness, TestResult, MAX_CLOCK_ADVANCE,
};
pub use runner::{RunResult, TestCase, TestRunner, TestSuite};
pub use scenario::{ComponentRegistry, Scenario, ScenarioStep};
