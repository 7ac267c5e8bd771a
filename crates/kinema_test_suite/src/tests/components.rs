//! Components exercised by the built-in suites and scenario files
//!
//! Each renders a `view` test id whose width starts at 100, and a `button`
//! test id that grows it by 50 when pressed, either directly or over 500ms.

use kinema_animation::{with_repeat, with_timing, SharedValue, TimingConfig};
use kinema_core::style;
use kinema_layout::prelude::*;

/// A renderable component
pub type Component = fn(&mut MountContext<'_>) -> Element;

pub const VIEW: &str = "view";
pub const BUTTON: &str = "button";

/// Duration of the timed grow animation
pub const GROW_MS: u64 = 500;

fn grow_on_press(width: &SharedValue, timed: bool) -> impl Fn(&EventContext) + 'static {
    let width = width.clone();
    move |_| {
        let target = width.get() + 50.0;
        if timed {
            width.animate(with_timing(target, TimingConfig::duration_ms(GROW_MS)));
        } else {
            width.set(target);
        }
    }
}

fn screen(animated: Element, width: &SharedValue, timed: bool) -> Element {
    view()
        .style(style! { "flex" => 1.0, "alignItems" => "center" })
        .child(animated.test_id(VIEW))
        .child(
            button("Click me")
                .test_id(BUTTON)
                .on_press(grow_on_press(width, timed)),
        )
}

fn inline(cx: &mut MountContext<'_>, timed: bool) -> Element {
    let width = cx.use_shared_value(100.0);
    let animated = animated_view()
        .bind("width", &width)
        .style(style! { "height" => 100.0, "backgroundColor" => "violet" });
    screen(animated, &width, timed)
}

fn derived_style(cx: &mut MountContext<'_>, timed: bool) -> Element {
    let width = cx.use_shared_value(100.0);
    let tracked = width.clone();
    let animated_style = cx.use_animated_style(move |s| style! { "width" => s.get(&tracked) });
    screen(animated_view().animated_style(animated_style), &width, timed)
}

fn derived_props(cx: &mut MountContext<'_>, timed: bool) -> Element {
    let width = cx.use_shared_value(100.0);
    let tracked = width.clone();
    let animated_props = cx.use_animated_props(move |s| {
        style! { "style" => style! { "width" => s.get(&tracked) } }
    });
    screen(animated_view().animated_props(animated_props), &width, timed)
}

/// Width bound straight into the style, set on press
pub fn inline_style(cx: &mut MountContext<'_>) -> Element {
    inline(cx, false)
}

/// Width bound straight into the style, animated over 500ms on press
pub fn inline_style_timing(cx: &mut MountContext<'_>) -> Element {
    inline(cx, true)
}

/// Width read by an animated style, set on press
pub fn animated_style(cx: &mut MountContext<'_>) -> Element {
    derived_style(cx, false)
}

/// Width read by an animated style, animated over 500ms on press
pub fn animated_style_timing(cx: &mut MountContext<'_>) -> Element {
    derived_style(cx, true)
}

/// Width read by animated props under `style`, set on press
pub fn animated_props(cx: &mut MountContext<'_>) -> Element {
    derived_props(cx, false)
}

/// Width read by animated props under `style`, animated over 500ms on press
pub fn animated_props_timing(cx: &mut MountContext<'_>) -> Element {
    derived_props(cx, true)
}

/// translateX starts at 100 and swings to -100 and back every 500ms, forever
pub fn ping_pong(cx: &mut MountContext<'_>) -> Element {
    let offset = cx.use_shared_value(100.0);
    let tracked = offset.clone();
    let animated_style = cx.use_animated_style(move |s| style! { "translateX" => s.get(&tracked) });

    let start = offset.clone();
    cx.on_mount(move || {
        start.animate(with_repeat(
            with_timing(-start.get(), TimingConfig::duration_ms(500)),
            -1,
            true,
        ));
    });

    view().child(animated_view().test_id(VIEW).animated_style(animated_style))
}

/// Every built-in component by name
pub fn all() -> Vec<(&'static str, Component)> {
    vec![
        ("inline_style", inline_style as Component),
        ("inline_style_timing", inline_style_timing),
        ("animated_style", animated_style),
        ("animated_style_timing", animated_style_timing),
        ("animated_props", animated_props),
        ("animated_props_timing", animated_props_timing),
        ("ping_pong", ping_pong),
    ]
}
