//! Timing tests
//!
//! Descriptor playback against the virtual clock: repeats, springs,
//! sequences, reassignment and frame callbacks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kinema_animation::{
    with_delay, with_repeat, with_sequence, with_spring, with_timing, AnimationError,
    SpringConfig, TimingConfig,
};
use kinema_core::style;
use kinema_layout::prelude::*;

use super::components::{self, VIEW};
use crate::error::HarnessError;
use crate::harness::TestContext;
use crate::runner::TestSuite;

fn translate_x(ctx: &TestContext) -> anyhow::Result<f32> {
    let view = ctx.get_by_test_id(VIEW)?;
    ctx.snapshot(&view)?
        .number("translateX")
        .ok_or_else(|| anyhow::anyhow!("translateX missing"))
}

/// Create the timing test suite
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("timing");

    // Alternating repeat returns to start after even half-cycles
    suite.add("alternating_repeat", |ctx| {
        ctx.mount(components::ping_pong)?;
        let view = ctx.get_by_test_id(VIEW)?;

        ctx.assert_snapshot_eq(&view, &style! { "translateX" => 100.0 })?;
        for half_cycle in 1..=6 {
            ctx.advance_ms(500)?;
            let expected = if half_cycle % 2 == 1 { -100.0 } else { 100.0 };
            ctx.assert_snapshot_eq(&view, &style! { "translateX" => expected })?;
        }
        Ok(())
    });

    suite.add("alternating_repeat_midpoint", |ctx| {
        ctx.mount(components::ping_pong)?;
        ctx.advance_ms(250)?;
        let outbound = translate_x(ctx)?;
        ctx.advance_ms(500)?;
        let inbound = translate_x(ctx)?;
        anyhow::ensure!(outbound.abs() < 1.0, "outbound midpoint {outbound}");
        anyhow::ensure!(inbound.abs() < 1.0, "inbound midpoint {inbound}");
        Ok(())
    });

    suite.add("run_all_refuses_infinite_repeat", |ctx| {
        ctx.mount(components::ping_pong)?;
        match ctx.run_all_timers() {
            Err(HarnessError::Animation(AnimationError::UnboundedDrain {
                infinite_values: 1,
                frame_callbacks: 0,
            })) => {}
            other => anyhow::bail!("expected unbounded drain, got {other:?}"),
        }
        anyhow::ensure!(ctx.now().is_zero(), "clock moved on refused drain");
        Ok(())
    });

    // A finite non-alternating repeat restarts from the start each cycle
    suite.add("finite_repeat_drains", |ctx| {
        ctx.mount(|cx| {
            let x = cx.use_shared_value(0.0);
            let start = x.clone();
            cx.on_mount(move || {
                start.animate(with_repeat(
                    with_timing(10.0, TimingConfig::duration_ms(100)),
                    3,
                    false,
                ))
            });
            animated_view().test_id(VIEW).bind("translateX", &x)
        })?;

        ctx.advance_ms(100)?;
        anyhow::ensure!(translate_x(ctx)? == 0.0, "second cycle did not restart");
        let moved = ctx.run_all_timers()?;
        anyhow::ensure!(moved == Duration::from_millis(200), "drained {moved:?}");
        anyhow::ensure!(translate_x(ctx)? == 10.0, "did not end on target");
        Ok(())
    });

    suite.add("spring_settles", |ctx| {
        ctx.mount(|cx| {
            let x = cx.use_shared_value(0.0);
            let start = x.clone();
            cx.on_mount(move || start.animate(with_spring(100.0, SpringConfig::stiff())));
            animated_view().test_id(VIEW).bind("translateX", &x)
        })?;

        ctx.advance_ms(16)?;
        let early = translate_x(ctx)?;
        anyhow::ensure!(early > 0.0 && early < 100.0, "spring at {early} after one frame");
        ctx.run_all_timers()?;
        ctx.assert_snapshot_eq(&ctx.get_by_test_id(VIEW)?, &style! { "translateX" => 100.0 })?;
        Ok(())
    });

    suite.add("delay_then_sequence", |ctx| {
        ctx.mount(|cx| {
            let x = cx.use_shared_value(0.0);
            let start = x.clone();
            cx.on_mount(move || {
                start.animate(with_delay(
                    Duration::from_millis(100),
                    with_sequence([
                        with_timing(50.0, TimingConfig::duration_ms(100)),
                        with_timing(20.0, TimingConfig::duration_ms(100)),
                    ]),
                ))
            });
            animated_view().test_id(VIEW).bind("translateX", &x)
        })?;

        ctx.advance_ms(100)?;
        anyhow::ensure!(translate_x(ctx)? == 0.0, "moved during delay");
        ctx.advance_ms(100)?;
        anyhow::ensure!(translate_x(ctx)? == 50.0, "first leg did not land");
        ctx.advance_ms(100)?;
        anyhow::ensure!(translate_x(ctx)? == 20.0, "second leg did not land");
        Ok(())
    });

    // Plain assignment discards the in-flight animation
    suite.add("reassignment_discards_animation", |ctx| {
        ctx.mount(|cx| {
            let x = cx.use_shared_value(0.0);
            let animate = x.clone();
            let reset = x.clone();
            view()
                .child(animated_view().test_id(VIEW).bind("translateX", &x))
                .child(button("go").test_id("go").on_press(move |_| {
                    animate.animate(with_timing(100.0, TimingConfig::duration_ms(500)))
                }))
                .child(button("reset").test_id("reset").on_press(move |_| reset.set(-5.0)))
        })?;

        ctx.press(&ctx.get_by_test_id("go")?)?;
        ctx.advance_ms(200)?;
        ctx.press(&ctx.get_by_test_id("reset")?)?;
        ctx.advance_ms(500)?;
        anyhow::ensure!(translate_x(ctx)? == -5.0, "animation kept running");
        Ok(())
    });

    suite.add("frame_callback_runs_each_frame", |ctx| {
        let frames = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&frames);
        ctx.mount(move |cx| {
            cx.use_frame_callback(
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                true,
            );
            view()
        })?;

        ctx.advance_ms(160)?;
        anyhow::ensure!(frames.load(Ordering::SeqCst) == 10, "ran {frames:?} times");
        anyhow::ensure!(ctx.run_all_timers().is_err(), "drain allowed with active callback");
        Ok(())
    });

    suite
}
