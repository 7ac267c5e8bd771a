//! Built-in scenarios organized by category

pub mod animated_props;
pub mod animated_style;
pub mod components;
pub mod inline_styles;
pub mod timing;

use crate::runner::TestSuite;

/// Create all test suites
pub fn all_suites() -> Vec<TestSuite> {
    vec![
        inline_styles::suite(),
        animated_style::suite(),
        animated_props::suite(),
        timing::suite(),
    ]
}

#[cfg(test)]
mod run_all {
    use super::*;
    use crate::harness::TestResult;
    use crate::runner::TestRunner;

    #[test]
    fn test_every_builtin_scenario_passes() {
        let mut runner = TestRunner::new();
        for suite in all_suites() {
            runner.add_suite(suite);
        }
        let result = runner.run();

        let failures: Vec<String> = result
            .results
            .iter()
            .filter_map(|run| match &run.result {
                TestResult::Failed { reason } => {
                    Some(format!("{}::{}: {}", run.category, run.name, reason))
                }
                TestResult::Passed => None,
            })
            .collect();
        assert!(failures.is_empty(), "failed scenarios:\n{}", failures.join("\n"));
        let expected: usize = all_suites().iter().map(TestSuite::len).sum();
        assert_eq!(result.total(), expected);
    }

    #[test]
    fn test_suite_names_are_unique() {
        let mut names: Vec<String> = all_suites().into_iter().map(|s| s.name).collect();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }
}
