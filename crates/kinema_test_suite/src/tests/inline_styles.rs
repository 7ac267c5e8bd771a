//! Inline style tests
//!
//! A shared value bound straight into an animated view's style, next to
//! static entries.

use kinema_core::style;

use super::components::{self, BUTTON, GROW_MS, VIEW};
use crate::runner::TestSuite;

/// Create the inline styles test suite
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("inline_styles");

    // Direct assignment is visible without touching the clock
    suite.add("direct_assignment", |ctx| {
        ctx.mount(components::inline_style)?;
        let handles = ctx.require(&[VIEW, BUTTON])?;
        let (view, button) = (&handles[0], &handles[1]);

        ctx.assert_snapshot_eq(
            view,
            &style! { "width" => 100.0, "height" => 100.0, "backgroundColor" => "violet" },
        )?;

        ctx.press(button)?;

        ctx.assert_snapshot_eq(
            view,
            &style! { "width" => 150.0, "height" => 100.0, "backgroundColor" => "violet" },
        )?;
        anyhow::ensure!(ctx.now().is_zero(), "clock moved");
        Ok(())
    });

    suite.add("with_timing_run_all", |ctx| {
        ctx.mount(components::inline_style_timing)?;
        let view = ctx.get_by_test_id(VIEW)?;
        let button = ctx.get_by_test_id(BUTTON)?;

        ctx.assert_snapshot_eq(
            &view,
            &style! { "width" => 100.0, "height" => 100.0, "backgroundColor" => "violet" },
        )?;

        ctx.press(&button)?;
        ctx.run_all_timers()?;

        ctx.assert_snapshot_eq(
            &view,
            &style! { "width" => 150.0, "height" => 100.0, "backgroundColor" => "violet" },
        )?;
        Ok(())
    });

    // Timed assignment is invisible until the clock reaches the duration
    suite.add("with_timing_bounded_advance", |ctx| {
        ctx.mount(components::inline_style_timing)?;
        let view = ctx.get_by_test_id(VIEW)?;
        ctx.press(&ctx.get_by_test_id(BUTTON)?)?;

        ctx.expect_snapshot(
            &view,
            &style! { "width" => 100.0, "height" => 100.0, "backgroundColor" => "violet" },
        );
        ctx.advance_ms(GROW_MS)?;
        ctx.expect_snapshot(
            &view,
            &style! { "width" => 150.0, "height" => 100.0, "backgroundColor" => "violet" },
        );
        Ok(())
    });

    suite.add("repeated_presses_accumulate", |ctx| {
        ctx.mount(components::inline_style)?;
        let view = ctx.get_by_test_id(VIEW)?;
        let button = ctx.get_by_test_id(BUTTON)?;

        for _ in 0..3 {
            ctx.press(&button)?;
        }
        let width = ctx.snapshot(&view)?.number("width");
        anyhow::ensure!(width == Some(250.0), "width was {width:?}");
        Ok(())
    });

    suite
}
