//! Interaction event types
//!
//! Events are identified by a small integer type so handlers can be stored
//! in flat maps on elements.

/// Event type identifier
pub type EventType = u32;

/// Built-in event types
pub mod event_types {
    use super::EventType;

    /// A completed press (pointer down + up on the same element)
    pub const PRESS: EventType = 1;
    /// Pointer went down on the element
    pub const PRESS_IN: EventType = 2;
    /// Pointer was released or left the element
    pub const PRESS_OUT: EventType = 3;
    /// Press held past the long-press threshold
    pub const LONG_PRESS: EventType = 4;
}

/// Human-readable name of an event type
pub fn event_name(event: EventType) -> &'static str {
    match event {
        event_types::PRESS => "press",
        event_types::PRESS_IN => "pressIn",
        event_types::PRESS_OUT => "pressOut",
        event_types::LONG_PRESS => "longPress",
        _ => "unknown",
    }
}

/// Parse an event name as written in scenario files
pub fn parse_event_name(name: &str) -> Option<EventType> {
    match name {
        "press" => Some(event_types::PRESS),
        "pressIn" | "press_in" => Some(event_types::PRESS_IN),
        "pressOut" | "press_out" => Some(event_types::PRESS_OUT),
        "longPress" | "long_press" => Some(event_types::LONG_PRESS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for event in [
            event_types::PRESS,
            event_types::PRESS_IN,
            event_types::PRESS_OUT,
            event_types::LONG_PRESS,
        ] {
            assert_eq!(parse_event_name(event_name(event)), Some(event));
        }
        assert_eq!(parse_event_name("swipe"), None);
    }
}
