//! Animated style tests
//!
//! A style derived from a shared value by a closure.

use kinema_core::style;

use super::components::{self, BUTTON, GROW_MS, VIEW};
use crate::runner::TestSuite;

/// Create the animated style test suite
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("animated_style");

    suite.add("direct_assignment", |ctx| {
        ctx.mount(components::animated_style)?;
        let view = ctx.get_by_test_id(VIEW)?;
        let button = ctx.get_by_test_id(BUTTON)?;

        ctx.assert_snapshot_eq(&view, &style! { "width" => 100.0 })?;
        ctx.press(&button)?;
        ctx.run_all_timers()?;
        ctx.assert_snapshot_eq(&view, &style! { "width" => 150.0 })?;
        Ok(())
    });

    suite.add("with_timing_run_all", |ctx| {
        ctx.mount(components::animated_style_timing)?;
        let view = ctx.get_by_test_id(VIEW)?;
        let button = ctx.get_by_test_id(BUTTON)?;

        ctx.assert_snapshot_eq(&view, &style! { "width" => 100.0 })?;
        ctx.press(&button)?;
        ctx.run_all_timers()?;
        ctx.assert_snapshot_eq(&view, &style! { "width" => 150.0 })?;
        anyhow::ensure!(ctx.now().as_millis() == u128::from(GROW_MS), "drained to {:?}", ctx.now());
        Ok(())
    });

    // Width rises monotonically from start to target while the clock advances
    suite.add("with_timing_is_monotonic", |ctx| {
        ctx.mount(components::animated_style_timing)?;
        let view = ctx.get_by_test_id(VIEW)?;
        ctx.press(&ctx.get_by_test_id(BUTTON)?)?;

        let mut previous = 100.0;
        for _ in 0..(GROW_MS / 50) {
            ctx.advance_ms(50)?;
            let width = ctx
                .snapshot(&view)?
                .number("width")
                .ok_or_else(|| anyhow::anyhow!("width missing"))?;
            anyhow::ensure!(
                (100.0..=150.0).contains(&width) && width >= previous,
                "width {width} after {previous} at {:?}",
                ctx.now()
            );
            previous = width;
        }
        ctx.assert_snapshot_eq(&view, &style! { "width" => 150.0 })?;
        Ok(())
    });

    // Snapshots between changes are served from the derived cache
    suite.add("snapshot_is_cached", |ctx| {
        ctx.mount(components::animated_style)?;
        let view = ctx.get_by_test_id(VIEW)?;

        let before = ctx.snapshot(&view)?;
        let dirty = ctx
            .scheduler()
            .reactive()
            .lock()
            .map(|graph| graph.stats().dirty_derived)
            .unwrap_or(usize::MAX);
        let again = ctx.snapshot(&view)?;
        anyhow::ensure!(before == again, "snapshots differ");
        anyhow::ensure!(dirty == 0, "style left dirty after read");
        Ok(())
    });

    suite
}
