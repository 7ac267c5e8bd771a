//! Test runner for executing scenario suites
//!
//! Manages scenario execution, result collection, and reporting.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::HarnessConfig;
use crate::harness::{TestContext, TestFn, TestHarness, TestResult};

/// A single scenario
pub struct TestCase {
    pub name: String,
    pub category: String,
    pub test_fn: TestFn,
}

impl TestCase {
    pub fn new<F>(name: &str, category: &str, test_fn: F) -> Self
    where
        F: FnOnce(&mut TestContext) -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            test_fn: Box::new(test_fn),
        }
    }

    /// Qualified name, `category::name`
    pub fn full_name(&self) -> String {
        format!("{}::{}", self.category, self.name)
    }

    fn matches(&self, pattern: &str) -> bool {
        self.name.contains(pattern) || self.category.contains(pattern)
    }
}

/// Result of running a scenario
pub struct TestRun {
    pub name: String,
    pub category: String,
    pub result: TestResult,
    /// Wall time taken
    pub duration: Duration,
}

impl TestRun {
    pub fn is_passed(&self) -> bool {
        self.result.is_passed()
    }
}

/// Scenario suite containing multiple test cases
pub struct TestSuite {
    pub name: String,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cases: Vec::new(),
        }
    }

    pub fn add<F>(&mut self, name: &str, test_fn: F) -> &mut Self
    where
        F: FnOnce(&mut TestContext) -> anyhow::Result<()> + Send + 'static,
    {
        self.cases.push(TestCase::new(name, &self.name, test_fn));
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Test runner for executing suites
pub struct TestRunner {
    harness: TestHarness,
    suites: Vec<TestSuite>,
    /// Filter pattern (None = run all)
    filter: Option<String>,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    /// Create a new test runner with default settings
    pub fn new() -> Self {
        Self::with_harness(TestHarness::new())
    }

    pub fn with_config(config: HarnessConfig) -> Self {
        Self::with_harness(TestHarness::with_config(config))
    }

    /// Create with custom harness
    pub fn with_harness(harness: TestHarness) -> Self {
        Self {
            harness,
            suites: Vec::new(),
            filter: None,
        }
    }

    /// Add a test suite
    pub fn add_suite(&mut self, suite: TestSuite) -> &mut Self {
        self.suites.push(suite);
        self
    }

    /// Only run cases whose name or category contains `pattern`
    pub fn filter(&mut self, pattern: &str) -> &mut Self {
        self.filter = Some(pattern.to_string());
        self
    }

    /// Run every queued suite, consuming them
    pub fn run(&mut self) -> RunResult {
        let start = Instant::now();
        let mut results = Vec::new();

        for suite in self.suites.drain(..) {
            tracing::info!("suite {} ({} scenario(s))", suite.name, suite.len());

            for case in suite.cases {
                if let Some(ref pattern) = self.filter {
                    if !case.matches(pattern) {
                        continue;
                    }
                }

                let started = Instant::now();
                let full_name = case.full_name();
                tracing::debug!("scenario {}", full_name);

                let result = self.harness.run_test(&full_name, case.test_fn);
                let duration = started.elapsed();

                match &result {
                    TestResult::Passed => tracing::info!("  ✓ {} ({:?})", case.name, duration),
                    TestResult::Failed { reason } => {
                        tracing::error!("  ✗ {} ({:?}): {}", case.name, duration, reason)
                    }
                }

                results.push(TestRun {
                    name: case.name,
                    category: case.category,
                    result,
                    duration,
                });
            }
        }

        RunResult::new(results, start.elapsed())
    }

    pub fn harness(&self) -> &TestHarness {
        &self.harness
    }
}

/// Results from running scenarios
pub struct RunResult {
    pub results: Vec<TestRun>,
    /// Total wall time taken
    pub duration: Duration,
}

impl RunResult {
    pub fn new(results: Vec<TestRun>, duration: Duration) -> Self {
        Self { results, duration }
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.is_passed()).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.is_passed())
    }

    /// Runs grouped by suite name
    pub fn by_category(&self) -> HashMap<&str, Vec<&TestRun>> {
        self.results.iter().fold(HashMap::new(), |mut groups, run| {
            groups.entry(run.category.as_str()).or_default().push(run);
            groups
        })
    }

    /// Print per-suite counts, totals and failure reasons
    pub fn print_summary(&self) {
        let mut suites: Vec<_> = self.by_category().into_iter().collect();
        suites.sort_by_key(|(name, _)| *name);

        println!("\n╔══════════════════════════════════════════╗");
        println!("║              SCENARIO RESULTS            ║");
        println!("╠══════════════════════════════════════════╣");
        for (name, runs) in &suites {
            let passed = runs.iter().filter(|r| r.is_passed()).count();
            println!("║  {:<24} {:>5}/{:<5}    ║", name, passed, runs.len());
        }
        println!("╠══════════════════════════════════════════╣");
        println!("║  passed {:>4}  failed {:>4}  in {:>9.2?}  ║", self.passed(), self.failed(), self.duration);
        println!("╚══════════════════════════════════════════╝");

        if self.failed() > 0 {
            println!("\nFailed scenarios:");
            for run in &self.results {
                if let TestResult::Failed { reason } = &run.result {
                    println!("  ✗ {}::{}", run.category, run.name);
                    for line in reason.lines() {
                        println!("      {line}");
                    }
                }
            }
        }
    }
}
