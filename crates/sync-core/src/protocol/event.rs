//! Playback-control event types.

use std::fmt;

/// Number of distinct event kinds on the wire.
///
/// Kind codes are `0..EVENT_KIND_COUNT`; anything outside that range is
/// rejected by the codec.
pub const EVENT_KIND_COUNT: u8 = 3;

/// The type of playback-control action being synchronised.
///
/// The discriminant values are the wire kind codes and must not change:
/// `0` = Play, `1` = Pause, `2` = Seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    /// Resume playback at the given position.
    Play = 0,
    /// Stop playback at the given position.
    Pause = 1,
    /// Jump to the given position.
    Seek = 2,
}

impl EventKind {
    /// Returns the wire kind code for this event kind.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for EventKind {
    type Error = u8;

    /// Converts a wire kind code back into an [`EventKind`].
    ///
    /// Returns the offending code as the error for out-of-range values so
    /// the caller can include it in diagnostics.
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(EventKind::Play),
            1 => Ok(EventKind::Pause),
            2 => Ok(EventKind::Seek),
            other => Err(other),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Play => "play",
            EventKind::Pause => "pause",
            EventKind::Seek => "seek",
        };
        f.write_str(name)
    }
}

/// One playback-control event: what happened and where in the media.
///
/// Events are transient — constructed on read, consumed immediately by the
/// broadcast, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncEvent {
    /// The playback action.
    pub kind: EventKind,
    /// Playback offset in seconds.  Most meaningful for [`EventKind::Seek`];
    /// for Play and Pause it carries the sender's current position.
    ///
    /// The codec performs no semantic bounds check: a negative or absurdly
    /// large position is accepted as long as it parses as a float.
    pub position: f64,
}

impl SyncEvent {
    pub fn new(kind: EventKind, position: f64) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}s", self.kind, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_codes_match_wire_values() {
        assert_eq!(EventKind::Play.code(), 0);
        assert_eq!(EventKind::Pause.code(), 1);
        assert_eq!(EventKind::Seek.code(), 2);
    }

    #[test]
    fn test_event_kind_try_from_round_trips_all_kinds() {
        for kind in [EventKind::Play, EventKind::Pause, EventKind::Seek] {
            assert_eq!(EventKind::try_from(kind.code()), Ok(kind));
        }
    }

    #[test]
    fn test_event_kind_try_from_rejects_out_of_range_codes() {
        assert_eq!(EventKind::try_from(EVENT_KIND_COUNT), Err(3));
        assert_eq!(EventKind::try_from(255), Err(255));
    }

    #[test]
    fn test_sync_event_display_includes_kind_and_position() {
        let event = SyncEvent::new(EventKind::Seek, 42.5);
        assert_eq!(event.to_string(), "seek @ 42.5s");
    }
}
