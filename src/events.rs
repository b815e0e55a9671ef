//! Structured decode diagnostics.
//!
//! The format carries a number of fields that are not exposed on a [crate::Dive] but
//! are still useful when investigating a file. Rather than logging them the decoder
//! returns them as [DecodeEvent]s alongside the decoded value.
use serde::Serialize;
use tracing::debug;

/// Which preamble string an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    SuitType,
    Weather,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum DecodeEvent {
    /// A diagnostic-only string from the file preamble.
    HeaderText { field: HeaderField, value: String },
    /// Value of one of the `0xF0`..`0xF9` diagnostic tags. `offset` is the position of
    /// the tag in the timeseries block.
    Diagnostic { tag: u8, offset: usize, value: u32 },
    /// `0xFB` sub-type 32.
    GasMixture {
        percent_o2: u16,
        percent_he: u16,
        /// Not certain this is the max pO₂.
        max_po2: u16,
    },
    /// `0xFB` sub-type 26.
    NoStopLimits { no_stop_min: u8, no_stop_mb_min: u8 },
    /// `0xFB` block with a sub-type that is not understood; payload skipped.
    UnknownBlock {
        sub_type: u8,
        offset: usize,
        payload_len: usize,
    },
    /// Control byte inside a profile run that matched no instruction; skipped.
    UnknownControlByte { byte: u8, offset: usize },
    /// Bytes left over after a dive decoded from a slice.
    TrailingBytes { count: usize },
}

/// Collects [DecodeEvent]s for a single decode.
///
/// All events are traced at `debug`, but only kept when collection is enabled.
#[derive(Debug, Default)]
pub(crate) struct Events {
    enabled: bool,
    events: Vec<DecodeEvent>,
}

impl Events {
    pub(crate) fn new(enabled: bool) -> Self {
        Events {
            enabled,
            events: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, event: DecodeEvent) {
        debug!(?event, "decode event");
        if self.enabled {
            self.events.push(event);
        }
    }

    pub(crate) fn into_vec(self) -> Vec<DecodeEvent> {
        self.events
    }
}

/// A decoded value and the events produced while decoding it.
#[derive(Debug, Clone, Serialize)]
pub struct Decoded<T> {
    pub value: T,
    pub events: Vec<DecodeEvent>,
}

impl<T> Decoded<T> {
    pub(crate) fn new(value: T, events: Events) -> Self {
        Decoded {
            value,
            events: events.into_vec(),
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
