//! Animated props tests
//!
//! Props derived from a shared value, with the `style` entry merged into the
//! element's snapshot.

use kinema_core::style;

use super::components::{self, BUTTON, VIEW};
use crate::runner::TestSuite;

/// Create the animated props test suite
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("animated_props");

    suite.add("direct_assignment", |ctx| {
        ctx.mount(components::animated_props)?;
        let view = ctx.get_by_test_id(VIEW)?;
        let button = ctx.get_by_test_id(BUTTON)?;

        ctx.assert_snapshot_eq(&view, &style! { "width" => 100.0 })?;
        ctx.press(&button)?;
        ctx.run_all_timers()?;
        ctx.assert_snapshot_eq(&view, &style! { "width" => 150.0 })?;
        Ok(())
    });

    suite.add("with_timing_run_all", |ctx| {
        ctx.mount(components::animated_props_timing)?;
        let view = ctx.get_by_test_id(VIEW)?;
        let button = ctx.get_by_test_id(BUTTON)?;

        ctx.assert_snapshot_eq(&view, &style! { "width" => 100.0 })?;
        ctx.press(&button)?;
        ctx.run_all_timers()?;
        ctx.assert_snapshot_eq(&view, &style! { "width" => 150.0 })?;
        Ok(())
    });

    suite.add("style_entry_is_not_a_prop", |ctx| {
        ctx.mount(components::animated_props)?;
        let view = ctx.get_by_test_id(VIEW)?;
        let props = ctx.props_snapshot(&view)?;
        anyhow::ensure!(props.is_empty(), "unexpected props {props}");
        Ok(())
    });

    suite
}
