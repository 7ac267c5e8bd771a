//! JSON scenario files
//!
//! A scenario names a registered component and lists the steps to run
//! against it:
//!
//! ```json
//! {
//!   "component": "inline_style_timing",
//!   "steps": [
//!     { "type": "press", "id": "button" },
//!     { "type": "assert_snapshot", "id": "view", "expected": { "width": 100 } },
//!     { "type": "run_all_timers" },
//!     { "type": "assert_snapshot", "id": "view", "expected": { "width": 150 } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use kinema_core::{parse_event_name, Style};
use serde::Deserialize;

use crate::error::HarnessError;
use crate::harness::{ClockAdvance, TestContext};
use crate::tests::components::{self, Component};

/// A scripted scenario
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Registered component to mount
    pub component: String,
    pub steps: Vec<ScenarioStep>,
}

/// One scenario step
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    Press { id: String },
    Fire { id: String, event: String },
    Advance { ms: u64 },
    RunAllTimers,
    AssertSnapshot { id: String, expected: Style },
    AssertProps { id: String, expected: Style },
    ExpectNotFound { id: String },
}

impl Scenario {
    /// Load a scenario from JSON text
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut scenario = Self::from_json(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if scenario.name.is_none() {
            scenario.name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        }
        Ok(scenario)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.component)
    }

    /// Mount the component and run every step
    pub fn run(&self, ctx: &mut TestContext, registry: &ComponentRegistry) -> Result<()> {
        let component = registry
            .get(&self.component)
            .ok_or_else(|| HarnessError::Scenario(format!("unknown component '{}'", self.component)))?;
        ctx.mount(component)?;

        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!("{}: step {} {:?}", self.display_name(), index + 1, step);
            run_step(ctx, step).with_context(|| format!("step {} ({})", index + 1, step.kind()))?;
        }
        Ok(())
    }
}

impl ScenarioStep {
    fn kind(&self) -> &'static str {
        match self {
            ScenarioStep::Press { .. } => "press",
            ScenarioStep::Fire { .. } => "fire",
            ScenarioStep::Advance { .. } => "advance",
            ScenarioStep::RunAllTimers => "run_all_timers",
            ScenarioStep::AssertSnapshot { .. } => "assert_snapshot",
            ScenarioStep::AssertProps { .. } => "assert_props",
            ScenarioStep::ExpectNotFound { .. } => "expect_not_found",
        }
    }
}

fn run_step(ctx: &mut TestContext, step: &ScenarioStep) -> crate::error::Result<()> {
    match step {
        ScenarioStep::Press { id } => ctx.press(&ctx.get_by_test_id(id)?),
        ScenarioStep::Fire { id, event } => {
            let event_type = parse_event_name(event)
                .ok_or_else(|| HarnessError::Scenario(format!("unknown event '{event}'")))?;
            ctx.interact(&ctx.get_by_test_id(id)?, event_type)
        }
        ScenarioStep::Advance { ms } => ctx.advance_clock(ClockAdvance::ms(*ms)).map(|_| ()),
        ScenarioStep::RunAllTimers => ctx.advance_clock(ClockAdvance::All).map(|_| ()),
        ScenarioStep::AssertSnapshot { id, expected } => {
            ctx.assert_snapshot_eq(&ctx.get_by_test_id(id)?, expected)
        }
        ScenarioStep::AssertProps { id, expected } => {
            let handle = ctx.get_by_test_id(id)?;
            let actual = ctx.props_snapshot(&handle)?;
            let mismatches = actual.diff(expected, ctx.config().number_epsilon);
            if mismatches.is_empty() {
                Ok(())
            } else {
                Err(HarnessError::SnapshotMismatch {
                    test_id: id.clone(),
                    mismatches,
                })
            }
        }
        ScenarioStep::ExpectNotFound { id } => match ctx.query_by_test_id(id)? {
            None => Ok(()),
            Some(_) => Err(HarnessError::Scenario(format!("'{id}' was found"))),
        },
    }
}

/// Components scenario files can mount, by name
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<String, Component>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in component
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (name, component) in components::all() {
            registry.register(name, component);
        }
        registry
    }

    pub fn register(&mut self, name: &str, component: Component) -> &mut Self {
        self.components.insert(name.to_string(), component);
        self
    }

    pub fn get(&self, name: &str) -> Option<Component> {
        self.components.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INLINE_TIMING: &str = include_str!("../scenarios/inline_style_timing.json");
    const PING_PONG: &str = include_str!("../scenarios/ping_pong.json");
    const ANIMATED_PROPS: &str = include_str!("../scenarios/animated_props.json");

    fn run(json: &str) -> Result<()> {
        let scenario = Scenario::from_json(json)?;
        let mut ctx = TestContext::new(scenario.display_name());
        scenario.run(&mut ctx, &ComponentRegistry::builtin())
    }

    #[test]
    fn test_bundled_scenarios_pass() {
        run(INLINE_TIMING).unwrap();
        run(PING_PONG).unwrap();
        run(ANIMATED_PROPS).unwrap();
    }

    #[test]
    fn test_oversized_advance_step_fails() {
        let err = run(&format!(
            r#"{{ "component": "inline_style", "steps": [{{ "type": "advance", "ms": {} }}] }}"#,
            u64::MAX
        ))
        .unwrap_err();
        assert!(format!("{err:#}").contains("step 1 (advance)"));
        assert!(format!("{err:#}").contains("limit per advance"));
    }

    #[test]
    fn test_step_parsing() {
        let scenario = Scenario::from_json(
            r#"{
                "component": "inline_style",
                "steps": [
                    { "type": "fire", "id": "button", "event": "press" },
                    { "type": "advance", "ms": 16 },
                    { "type": "expect_not_found", "id": "missing" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.display_name(), "inline_style");
        assert!(matches!(scenario.steps[1], ScenarioStep::Advance { ms: 16 }));
        let mut ctx = TestContext::new("parse");
        scenario.run(&mut ctx, &ComponentRegistry::builtin()).unwrap();
    }

    #[test]
    fn test_failing_step_reports_its_position() {
        let err = run(
            r#"{
                "component": "inline_style",
                "steps": [
                    { "type": "press", "id": "button" },
                    { "type": "assert_snapshot", "id": "view",
                      "expected": { "width": 100, "height": 100, "backgroundColor": "violet" } }
                ]
            }"#,
        )
        .unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("step 2 (assert_snapshot)"));
        assert!(message.contains("width: expected 100, actual 150"));
    }

    #[test]
    fn test_unknown_component_and_event() {
        let err = run(r#"{ "component": "nope", "steps": [] }"#).unwrap_err();
        assert!(err.to_string().contains("unknown component 'nope'"));

        let err = run(
            r#"{ "component": "inline_style",
                 "steps": [{ "type": "fire", "id": "button", "event": "swipe" }] }"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("unknown event 'swipe'"));
    }

    #[test]
    fn test_run_all_timers_against_infinite_repeat_fails() {
        let err = run(r#"{ "component": "ping_pong", "steps": [{ "type": "run_all_timers" }] }"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("Cannot run all timers"));
    }
}
